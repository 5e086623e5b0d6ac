//! Conversation state

use serde::{Deserialize, Serialize};

use crate::domain::{Message, RecommendationDocument, Stage};

/// Opening line of every new conversation
pub const GREETING: &str =
    "您好！我是您的一人公司商业顾问。请告诉我您的商业目标是什么？例如：跨境电商、SaaS产品、内容创作等。";

/// Everything the conversation engine tracks for one session
///
/// Invariant: `recommendations.is_some()` implies `stage == Recommending`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversationState {
    /// Chronological, append-only within a session
    pub messages: Vec<Message>,
    pub stage: Stage,
    pub business_goal: String,
    pub recommendations: Option<RecommendationDocument>,
}

impl ConversationState {
    /// Fresh conversation holding only the greeting
    pub fn seeded() -> Self {
        Self {
            messages: vec![Message::assistant(GREETING)],
            ..Default::default()
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.recommendations.is_none() || self.stage == Stage::Recommending
    }

    /// Repair a restored state so the recommendations invariant holds
    pub(crate) fn normalize(&mut self) {
        if self.recommendations.is_some() {
            self.stage = Stage::Recommending;
        }
    }

    /// Number of messages the user has sent
    pub fn user_turns(&self) -> usize {
        self.messages.iter().filter(|m| m.is_user()).count()
    }
}

/// The most recent `window` messages, oldest first
pub fn history_window(messages: &[Message], window: usize) -> &[Message] {
    let start = messages.len().saturating_sub(window);
    &messages[start..]
}
