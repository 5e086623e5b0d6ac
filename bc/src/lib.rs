//! bizconsult - one-person company business consultant client
//!
//! Conducts a staged advisory conversation, turns its outcome into a
//! structured recommendation document, saves that as a report, and publishes
//! individual report items as tasks in an external task system.
//!
//! # Modules
//!
//! - [`conversation`] - Dialogue state machine and reply rendering
//! - [`domain`] - Messages, recommendation documents, reports
//! - [`report`] - Report save/publish/cancel/delete lifecycle and export
//! - [`gateway`] - Transport boundary to the external services
//! - [`session`] - Stored bearer credential and identity
//! - [`project`] - Project listing and selection
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod conversation;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod project;
pub mod repl;
pub mod report;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use conversation::{ConversationEngine, ConversationState};
pub use domain::{ItemId, ItemState, ItemStatus, Message, Project, RecommendationDocument, Report, Stage};
pub use error::{ConsultError, ValidationError};
pub use gateway::{AdvisoryReply, Gateway, GatewayError, HttpGateway, create_gateway};
pub use project::ProjectContext;
pub use report::{PublishOutcome, ReportEvent, ReportManager};
pub use session::{Session, UserInfo};
