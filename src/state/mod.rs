//! State module for tracking audit progress
//!
//! # Components
//!
//! - `SiteState`: Tracks where each site is in the current run
//! - `ProgressLedger`: Rebuilds "already audited" state from persisted rows

mod ledger;
mod site_state;

// Re-export main types
pub use ledger::ProgressLedger;
pub use site_state::SiteState;
