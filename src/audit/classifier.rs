//! Result classification
//!
//! Turns the raw rule engine output for one page into a compliance tier, a
//! severity histogram, and one detail draft per finding.

use crate::audit::page_auditor::RawFindings;
use crate::audit::tier::{ComplianceTier, SeverityBucket};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Tags that count a finding toward level A
const LEVEL_A_TAGS: &[&str] = &["wcag2a", "wcag21a"];

/// Tags that count a finding toward level AA
const LEVEL_AA_TAGS: &[&str] = &["wcag2aa", "wcag21aa"];

/// Tags that count a finding toward level AAA
const LEVEL_AAA_TAGS: &[&str] = &["wcag2aaa", "wcag21aaa"];

/// Errors raised when rule engine output cannot be classified
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("rule engine output has no violations collection")]
    MissingViolations,

    #[error("malformed finding at index {index}: {message}")]
    MalformedFinding { index: usize, message: String },
}

/// One finding as reported by the rule engine
///
/// Fields are kept loosely typed: a text field holding a non-string is read
/// as absent, and non-string tags are ignored.
#[derive(Debug, Deserialize)]
struct RawFinding {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    impact: Option<Value>,
    #[serde(default)]
    description: Option<Value>,
    #[serde(default)]
    tags: Option<Value>,
    #[serde(default, rename = "helpUrl")]
    help_url: Option<Value>,
}

impl RawFinding {
    fn tags(&self) -> Vec<&str> {
        self.tags
            .as_ref()
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

fn text(field: Option<Value>) -> Option<String> {
    match field {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

/// Per-finding details kept for the `ViolationDetails` worksheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindingDetail {
    pub rule_id: Option<String>,
    pub impact: Option<String>,
    pub description: Option<String>,
    pub help_url: Option<String>,
}

/// Violation counts per WCAG level
///
/// A finding tagged at several levels counts once per level, so `total` is the
/// sum of the three levels rather than the number of findings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViolationCounts {
    pub a: u32,
    pub aa: u32,
    pub aaa: u32,
    pub total: u32,
}

/// Severity histogram over WCAG-tagged findings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityHistogram {
    pub severe: u32,
    pub moderate: u32,
    pub mild: u32,
    pub unknown: u32,
}

impl SeverityHistogram {
    pub fn record(&mut self, bucket: SeverityBucket) {
        match bucket {
            SeverityBucket::Severe => self.severe += 1,
            SeverityBucket::Moderate => self.moderate += 1,
            SeverityBucket::Mild => self.mild += 1,
            SeverityBucket::Unknown => self.unknown += 1,
        }
    }
}

/// Classified outcome of one page audit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedResult {
    pub tier: ComplianceTier,
    pub counts: ViolationCounts,
    pub severity: SeverityHistogram,
    pub details: Vec<FindingDetail>,
}

/// Classifies raw rule engine output
///
/// Every finding produces a detail draft. Only findings carrying at least one
/// WCAG level tag contribute to the level counts and, once each, to the
/// severity histogram.
pub fn classify(findings: &RawFindings) -> Result<ClassifiedResult, ClassificationError> {
    let violations = findings
        .as_value()
        .get("violations")
        .and_then(Value::as_array)
        .ok_or(ClassificationError::MissingViolations)?;

    let mut counts = ViolationCounts::default();
    let mut severity = SeverityHistogram::default();
    let mut details = Vec::with_capacity(violations.len());

    for (index, raw) in violations.iter().enumerate() {
        let finding = RawFinding::deserialize(raw).map_err(|e| {
            ClassificationError::MalformedFinding {
                index,
                message: e.to_string(),
            }
        })?;

        let tags = finding.tags();
        let mut is_wcag = false;
        if has_any_tag(&tags, LEVEL_A_TAGS) {
            counts.a += 1;
            is_wcag = true;
        }
        if has_any_tag(&tags, LEVEL_AA_TAGS) {
            counts.aa += 1;
            is_wcag = true;
        }
        if has_any_tag(&tags, LEVEL_AAA_TAGS) {
            counts.aaa += 1;
            is_wcag = true;
        }

        let impact = text(finding.impact);
        if is_wcag {
            severity.record(SeverityBucket::from_impact(impact.as_deref()));
        }

        details.push(FindingDetail {
            rule_id: text(finding.id),
            impact,
            description: text(finding.description),
            help_url: text(finding.help_url),
        });
    }

    counts.total = counts.a + counts.aa + counts.aaa;

    Ok(ClassifiedResult {
        tier: ComplianceTier::from_counts(counts.a, counts.aa, counts.aaa),
        counts,
        severity,
        details,
    })
}

fn has_any_tag(tags: &[&str], wanted: &[&str]) -> bool {
    tags.iter().any(|tag| wanted.contains(tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn findings(value: Value) -> RawFindings {
        RawFindings::new(value)
    }

    #[test]
    fn test_missing_violations_is_error() {
        let result = classify(&findings(json!({ "passes": [] })));
        assert!(matches!(result.unwrap_err(), ClassificationError::MissingViolations));

        let result = classify(&findings(Value::Null));
        assert!(matches!(result.unwrap_err(), ClassificationError::MissingViolations));
    }

    #[test]
    fn test_violations_not_an_array_is_error() {
        let result = classify(&findings(json!({ "violations": "oops" })));
        assert!(matches!(result.unwrap_err(), ClassificationError::MissingViolations));
    }

    #[test]
    fn test_non_object_finding_is_error() {
        let result = classify(&findings(json!({ "violations": [42] })));
        assert!(matches!(
            result.unwrap_err(),
            ClassificationError::MalformedFinding { index: 0, .. }
        ));
    }

    #[test]
    fn test_non_string_fields_are_read_as_absent() {
        let result = classify(&findings(json!({
            "violations": [{
                "id": 7,
                "impact": 3,
                "description": null,
                "tags": ["wcag2aa", 12],
                "helpUrl": false
            }]
        })))
        .unwrap();

        assert_eq!(result.tier, ComplianceTier::LevelA);
        assert_eq!(result.counts.aa, 1);
        assert_eq!(result.severity.unknown, 1);
        assert_eq!(
            result.details,
            vec![FindingDetail {
                rule_id: None,
                impact: None,
                description: None,
                help_url: None,
            }]
        );
    }

    #[test]
    fn test_empty_violations_is_best_tier() {
        let result = classify(&findings(json!({ "violations": [] }))).unwrap();
        assert_eq!(result.tier, ComplianceTier::LevelAAA);
        assert_eq!(result.counts, ViolationCounts::default());
        assert!(result.details.is_empty());
    }

    #[test]
    fn test_multi_tag_finding_counts_each_level_but_one_severity() {
        let result = classify(&findings(json!({
            "violations": [{
                "id": "image-alt",
                "impact": "critical",
                "description": "Images must have alternate text",
                "tags": ["wcag2a", "wcag2aa", "section508"],
                "helpUrl": "https://dequeuniversity.com/rules/axe/image-alt"
            }]
        })))
        .unwrap();

        assert_eq!(result.counts.a, 1);
        assert_eq!(result.counts.aa, 1);
        assert_eq!(result.counts.aaa, 0);
        assert_eq!(result.counts.total, 2);
        assert_eq!(result.severity.severe, 1);
        assert_eq!(
            result.severity.severe
                + result.severity.moderate
                + result.severity.mild
                + result.severity.unknown,
            1
        );
        assert_eq!(result.tier, ComplianceTier::BelowA);
    }

    #[test]
    fn test_untagged_finding_kept_as_detail_only() {
        let result = classify(&findings(json!({
            "violations": [
                { "id": "region", "impact": "moderate", "tags": ["best-practice"] },
                { "id": "color-contrast", "impact": "serious", "tags": ["wcag2aa"] }
            ]
        })))
        .unwrap();

        assert_eq!(result.details.len(), 2);
        assert_eq!(result.details[0].rule_id.as_deref(), Some("region"));
        assert_eq!(result.counts.total, 1);
        assert_eq!(result.severity.moderate, 0);
        assert_eq!(result.severity.severe, 1);
        assert_eq!(result.tier, ComplianceTier::LevelA);
    }

    #[test]
    fn test_aaa_only_yields_aa() {
        let result = classify(&findings(json!({
            "violations": [
                { "id": "x", "tags": ["wcag21aaa"] },
                { "id": "y", "impact": "minor", "tags": ["wcag2aaa"] },
                { "id": "z", "impact": null, "tags": ["wcag2aaa"] }
            ]
        })))
        .unwrap();

        assert_eq!(result.counts.aaa, 3);
        assert_eq!(result.tier, ComplianceTier::LevelAA);
        assert_eq!(result.severity.unknown, 2);
        assert_eq!(result.severity.mild, 1);
    }

    #[test]
    fn test_missing_fields_are_tolerated() {
        let result = classify(&findings(json!({ "violations": [{}] }))).unwrap();
        assert_eq!(result.details.len(), 1);
        assert_eq!(result.details[0].rule_id, None);
        assert_eq!(result.tier, ComplianceTier::LevelAAA);
    }
}
