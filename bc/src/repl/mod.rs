//! Interactive chat with the business consultant
//!
//! Line editing via rustyline, slash commands for saving, exporting and
//! restarting. The conversation survives restarts through the session store.

mod session;

pub use session::ChatSession;

use std::sync::Arc;

use eyre::Result;
use sessionstore::KeyValueStore;

use crate::config::Config;
use crate::conversation::ConversationEngine;
use crate::domain::Project;
use crate::gateway::Gateway;
use crate::report::ReportManager;

/// Run the interactive chat
///
/// This is the main entry point for `bizc chat`.
pub async fn run_interactive(
    config: &Config,
    gateway: Arc<dyn Gateway>,
    store: Arc<dyn KeyValueStore>,
    reports: ReportManager,
    project: Project,
    start_new: bool,
) -> Result<()> {
    let mut engine =
        ConversationEngine::initialize(gateway, store).with_history_window(config.conversation.history_window);
    engine.bind_project(Some(project));
    if start_new {
        engine.reset();
    }

    let export_dir = std::env::current_dir()?;
    let mut session = ChatSession::new(engine, reports, export_dir);
    session.run().await
}
