//! Page auditing
//!
//! This module contains:
//! - Rendering seams ([`Renderer`], [`RenderSession`], [`RuleEngine`])
//! - The Chrome renderer and axe-core rule engine
//! - The [`PageAuditor`] that audits one page
//! - Classification of raw findings into tiers and severity buckets

mod axe;
mod chrome;
mod classifier;
mod page_auditor;
mod render;
mod tier;

pub use axe::AxeRuleEngine;
pub use chrome::ChromeRenderer;
pub use classifier::{
    classify, ClassificationError, ClassifiedResult, FindingDetail, SeverityHistogram,
    ViolationCounts,
};
pub use page_auditor::{AuditFailure, PageAuditor, RawFindings};
pub use render::{RenderError, RenderSession, Renderer, RuleEngine};
pub use tier::{ComplianceTier, SeverityBucket};
