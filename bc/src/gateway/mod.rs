//! Transport gateway for bizconsult
//!
//! The [`Gateway`] trait is the single boundary to the external advisory,
//! report, tag identification, task and identity services. [`HttpGateway`]
//! is the production implementation.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod http;
mod types;

pub use client::Gateway;
pub use error::GatewayError;
pub use http::HttpGateway;
pub use types::{
    AdvisoryReply, ChatRequest, CreatedTask, Envelope, ProjectList, RawAdvisoryReply, SaveReportRequest, SavedReport,
    TagRequest, TagResponse, TaskDraft,
};

use crate::config::Config;
use crate::session::Session;

/// Create the production gateway from config
pub fn create_gateway(config: &Config, session: Session) -> Result<Arc<dyn Gateway>, GatewayError> {
    debug!("create_gateway: called");
    Ok(Arc::new(HttpGateway::from_config(&config.endpoints, &config.http, session)?))
}
