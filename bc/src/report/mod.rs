//! Report lifecycle
//!
//! Saving recommendation documents as reports, publishing their workflow and
//! role items as tasks, cancelling and deleting, plus plain-text export.

pub mod export;
mod manager;
pub mod task;

pub use manager::{CancelOutcome, DEFAULT_RELOAD_DELAY, PublishOutcome, ReportEvent, ReportManager};
pub use task::TaskSource;
