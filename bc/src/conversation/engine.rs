//! ConversationEngine - owns the staged dialogue with the advisory service
//!
//! Each submitted message goes out with only the most recent slice of
//! history (the advisory service sits behind a hard upstream timeout), and
//! the reply is folded back in as exactly one assistant message.

use std::sync::Arc;

use sessionstore::{CONVERSATION_KEY, KeyValueStore, get_json, set_json};
use tracing::{debug, info, warn};

use super::render::{render_other, render_questions, render_recommendations};
use super::state::{ConversationState, history_window};
use crate::domain::{Message, Project, RecommendationDocument, Report, Stage};
use crate::error::{ConsultError, ValidationError};
use crate::gateway::{AdvisoryReply, ChatRequest, Gateway};
use crate::report::ReportManager;

/// Default number of messages sent per turn (three exchanges)
pub const DEFAULT_HISTORY_WINDOW: usize = 6;

/// Dialogue state machine over an injected gateway and store
pub struct ConversationEngine {
    gateway: Arc<dyn Gateway>,
    store: Arc<dyn KeyValueStore>,
    project: Option<Project>,
    state: ConversationState,
    resume_pending: bool,
    history_window: usize,
}

impl ConversationEngine {
    /// Restore the persisted conversation or start a new one
    ///
    /// A restored conversation with at least one message raises the resume
    /// prompt; the caller answers it with [`resume`](Self::resume) or
    /// [`reset`](Self::reset).
    pub fn initialize(gateway: Arc<dyn Gateway>, store: Arc<dyn KeyValueStore>) -> Self {
        debug!("initialize: called");
        let mut engine = Self {
            gateway,
            store,
            project: None,
            state: ConversationState::default(),
            resume_pending: false,
            history_window: DEFAULT_HISTORY_WINDOW,
        };

        match get_json::<ConversationState>(engine.store.as_ref(), CONVERSATION_KEY) {
            Ok(Some(mut saved)) if !saved.messages.is_empty() => {
                saved.normalize();
                info!(
                    messages = saved.messages.len(),
                    stage = %saved.stage,
                    "initialize: restored previous conversation"
                );
                engine.state = saved;
                engine.resume_pending = true;
            }
            Ok(_) => {
                debug!("initialize: nothing to restore");
                engine.reset();
            }
            Err(e) => {
                warn!(error = %e, "initialize: saved conversation unreadable, starting fresh");
                engine.reset();
            }
        }

        engine
    }

    /// Override how many recent messages go out with each turn, never more
    /// than [`DEFAULT_HISTORY_WINDOW`]
    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window.clamp(1, DEFAULT_HISTORY_WINDOW);
        self
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn stage(&self) -> Stage {
        self.state.stage
    }

    pub fn recommendations(&self) -> Option<&RecommendationDocument> {
        self.state.recommendations.as_ref()
    }

    /// Is a restored conversation waiting for a resume-or-restart decision?
    pub fn resume_pending(&self) -> bool {
        self.resume_pending
    }

    /// Keep the restored conversation and dismiss the prompt
    pub fn resume(&mut self) {
        debug!("resume: called");
        self.resume_pending = false;
    }

    /// Discard the conversation, persisted copy included, and greet again
    pub fn reset(&mut self) {
        debug!("reset: called");
        if let Err(e) = self.store.clear(CONVERSATION_KEY) {
            warn!(error = %e, "reset: failed to clear saved conversation");
        }
        self.state = ConversationState::seeded();
        self.resume_pending = false;
    }

    pub fn bind_project(&mut self, project: Option<Project>) {
        debug!(project = ?project.as_ref().map(|p| &p.project_id), "bind_project: called");
        self.project = project;
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Send one user message and fold the advisor's reply into the state
    ///
    /// Returns the new assistant message. On failure the user message stays
    /// in the conversation, no assistant message is added, and the stage and
    /// recommendations are untouched.
    pub async fn submit(&mut self, text: &str) -> Result<Message, ConsultError> {
        let text = text.trim();
        debug!(text_len = text.len(), "submit: called");
        if text.is_empty() {
            return Err(ValidationError::EmptyInput.into());
        }
        let project_id = match &self.project {
            Some(project) => project.project_id.clone(),
            None => return Err(ConsultError::MissingContext),
        };

        self.state.messages.push(Message::user(text));
        self.persist();

        let request = ChatRequest {
            messages: history_window(&self.state.messages, self.history_window).to_vec(),
            project_id,
            stream: false,
        };

        let reply = match self.gateway.send_chat(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "submit: advisory request failed");
                return Err(e.into());
            }
        };

        let content = match reply {
            AdvisoryReply::Recommending {
                message,
                recommendations,
            } => {
                let content = render_recommendations(message.as_deref(), &recommendations);
                self.state.business_goal = self.infer_business_goal(&recommendations);
                self.state.recommendations = Some(recommendations);
                self.state.stage = Stage::Recommending;
                info!(business_goal = %self.state.business_goal, "submit: recommendations received");
                content
            }
            AdvisoryReply::Questioning { message, questions } => {
                self.state.stage = self.state.stage.max(Stage::Questioning);
                debug!(question_count = questions.len(), "submit: questioning");
                render_questions(&message, &questions)
            }
            AdvisoryReply::Other { message } => {
                debug!("submit: plain reply, stage unchanged");
                render_other(message.as_deref())
            }
        };

        let assistant = Message::assistant(content);
        self.state.messages.push(assistant.clone());
        self.persist();

        Ok(assistant)
    }

    /// Save the current recommendations as a report for the bound project
    pub async fn save_report(&self, reports: &ReportManager) -> Result<Report, ConsultError> {
        debug!("save_report: called");
        reports
            .save(
                self.project.as_ref(),
                &self.state.business_goal,
                self.state.recommendations.as_ref(),
            )
            .await
    }

    /// Goal stated in the plan, else the one already known, else the user's
    /// first answer
    fn infer_business_goal(&self, doc: &RecommendationDocument) -> String {
        if let Some(goal) = doc.business_goal.as_deref().filter(|g| !g.trim().is_empty()) {
            return goal.to_string();
        }
        if !self.state.business_goal.is_empty() {
            return self.state.business_goal.clone();
        }
        self.state
            .messages
            .iter()
            .find(|m| m.is_user())
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }

    /// Best-effort write of the conversation; failures are only logged
    fn persist(&self) {
        if self.state.messages.is_empty() {
            return;
        }
        if let Err(e) = set_json(self.store.as_ref(), CONVERSATION_KEY, &self.state) {
            warn!(error = %e, "persist: failed to save conversation");
        }
    }
}
