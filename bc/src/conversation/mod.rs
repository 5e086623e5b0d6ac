//! Staged advisory conversation
//!
//! `initial -> questioning -> recommending`. The engine sends recent history
//! to the advisory service, renders each reply as one assistant message and
//! keeps the conversation in the session store so it can be resumed.

mod engine;
pub mod render;
mod state;

pub use engine::{ConversationEngine, DEFAULT_HISTORY_WINDOW};
pub use state::{ConversationState, GREETING, history_window};
