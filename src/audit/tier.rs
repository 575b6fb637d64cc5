//! Compliance tier and severity bucket definitions

use std::fmt;

/// Coarse compliance label assigned to one page audit
///
/// Variants are declared worst to best, so `Ord` sorts `BelowA` first and a
/// site's overall tier is the minimum over its pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComplianceTier {
    BelowA,
    LevelA,
    LevelAA,
    LevelAAA,
}

impl ComplianceTier {
    /// Derives the tier from per-level violation counts
    ///
    /// Any A-level violation yields `Below A`; otherwise AA-level violations
    /// yield `A`, AAA-level violations yield `AA`, and a page with none of the
    /// three yields `AAA`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wcag_auditor::ComplianceTier;
    ///
    /// assert_eq!(ComplianceTier::from_counts(0, 0, 0), ComplianceTier::LevelAAA);
    /// assert_eq!(ComplianceTier::from_counts(0, 2, 0), ComplianceTier::LevelA);
    /// ```
    pub fn from_counts(a: u32, aa: u32, aaa: u32) -> Self {
        if a > 0 {
            Self::BelowA
        } else if aa > 0 {
            Self::LevelA
        } else if aaa > 0 {
            Self::LevelAA
        } else {
            Self::LevelAAA
        }
    }

    /// Label written to the `Compliance_Level` column
    pub fn label(&self) -> &'static str {
        match self {
            Self::BelowA => "Below A",
            Self::LevelA => "A",
            Self::LevelAA => "AA",
            Self::LevelAAA => "AAA",
        }
    }

    /// Parses a `Compliance_Level` cell
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim() {
            "Below A" => Some(Self::BelowA),
            "A" => Some(Self::LevelA),
            "AA" => Some(Self::LevelAA),
            "AAA" => Some(Self::LevelAAA),
            _ => None,
        }
    }
}

impl fmt::Display for ComplianceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse grouping of a finding's impact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeverityBucket {
    Severe,
    Moderate,
    Mild,
    Unknown,
}

impl SeverityBucket {
    /// Maps a rule engine impact label to its bucket
    pub fn from_impact(impact: Option<&str>) -> Self {
        match impact {
            Some("critical") | Some("serious") => Self::Severe,
            Some("moderate") => Self::Moderate,
            Some("minor") => Self::Mild,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Severe => "severe",
            Self::Moderate => "moderate",
            Self::Mild => "mild",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SeverityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
