//! Markdown summary generation
//!
//! This module renders the per-site compliance roll-up as a markdown table.

use crate::audit::ComplianceTier;
use crate::output::stats::SiteSummary;
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Generates a markdown summary file
///
/// # Arguments
///
/// * `summaries` - Per-site summaries, in display order
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summaries: &[SiteSummary], output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summaries);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats site summaries as markdown
pub fn format_markdown_summary(summaries: &[SiteSummary]) -> String {
    let mut md = String::new();

    md.push_str("# WCAG Compliance Summary\n\n");

    if summaries.is_empty() {
        md.push_str("No audit records found.\n");
        return md;
    }

    let pages: u64 = summaries.iter().map(|s| s.pages_analyzed).sum();
    md.push_str(&format!("- **Sites**: {}\n", summaries.len()));
    md.push_str(&format!("- **Pages Analyzed**: {}\n\n", pages));

    md.push_str("## Tier Distribution\n\n");
    for tier in [
        ComplianceTier::LevelAAA,
        ComplianceTier::LevelAA,
        ComplianceTier::LevelA,
        ComplianceTier::BelowA,
    ] {
        let count = summaries.iter().filter(|s| s.overall == tier).count();
        md.push_str(&format!("- **{}**: {}\n", tier, count));
    }
    md.push('\n');

    md.push_str("## Sites\n\n");
    md.push_str(
        "| Website | Overall Compliance | Pages Analyzed | Total Violations | Severe | Moderate | Mild |\n",
    );
    md.push_str("|---------|--------------------|----------------|------------------|--------|----------|------|\n");
    for summary in summaries {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            escape_cell(&summary.site_url),
            summary.overall,
            summary.pages_analyzed,
            summary.total_violations,
            summary.severe,
            summary.moderate,
            summary.mild
        ));
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
