//! Wire types for the external services
//!
//! Replies are decoded once here; everything past the gateway works with
//! typed values only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::GatewayError;
use crate::domain::{Message, Project, RecommendationDocument};

/// Standard `{success, data, error}` response wrapper
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, turning `success: false` into a rejection
    pub fn into_data(self) -> Result<T, GatewayError> {
        if !self.success {
            debug!(error = ?self.error, "Envelope::into_data: rejected");
            return Err(GatewayError::Rejected(self.error.unwrap_or_default()));
        }
        self.data
            .ok_or_else(|| GatewayError::InvalidResponse("response has no data".to_string()))
    }

    /// Check success without requiring a payload
    pub fn into_unit(self) -> Result<(), GatewayError> {
        if self.success {
            Ok(())
        } else {
            Err(GatewayError::Rejected(self.error.unwrap_or_default()))
        }
    }
}

/// Body sent to the advisory service
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub project_id: String,
    pub stream: bool,
}

/// Advisory reply exactly as it arrives
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawAdvisoryReply {
    pub stage: Option<String>,
    pub message: Option<String>,
    pub content: Option<String>,
    pub questions: Option<Vec<String>>,
    pub recommendations: Option<serde_json::Value>,
}

/// Advisory reply interpreted into the stage it drives
#[derive(Debug, Clone, PartialEq)]
pub enum AdvisoryReply {
    /// The advisor needs more information
    Questioning { message: String, questions: Vec<String> },
    /// The advisor produced a full plan
    Recommending {
        message: Option<String>,
        recommendations: RecommendationDocument,
    },
    /// Anything else: free text, stage unchanged
    Other { message: Option<String> },
}

impl From<RawAdvisoryReply> for AdvisoryReply {
    /// First match wins: recommending with a plan, then questioning, then other
    fn from(raw: RawAdvisoryReply) -> Self {
        let stage = raw.stage.as_deref().unwrap_or("");
        debug!(%stage, "AdvisoryReply::from: called");

        if stage == "recommending" {
            let recommendations = raw
                .recommendations
                .filter(|v| !v.is_null())
                .and_then(|v| match serde_json::from_value::<RecommendationDocument>(v) {
                    Ok(doc) => Some(doc),
                    Err(e) => {
                        warn!(error = %e, "AdvisoryReply::from: recommendations did not parse");
                        None
                    }
                });
            if let Some(recommendations) = recommendations {
                return Self::Recommending {
                    message: non_empty(raw.message),
                    recommendations,
                };
            }
        }

        if stage == "questioning" {
            return Self::Questioning {
                message: raw.message.unwrap_or_default(),
                questions: raw.questions.unwrap_or_default(),
            };
        }

        Self::Other {
            message: non_empty(raw.message).or_else(|| non_empty(raw.content)),
        }
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

/// Body for saving a report
#[derive(Debug, Clone, Serialize)]
pub struct SaveReportRequest {
    pub project_id: String,
    pub business_goal: String,
    pub recommendations: RecommendationDocument,
}

/// What the report service returns after a save
#[derive(Debug, Clone, Deserialize)]
pub struct SavedReport {
    pub report_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for the tag identification service
#[derive(Debug, Clone, Serialize)]
pub struct TagRequest {
    pub task_description: String,
}

/// Tags identified for a task description
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagResponse {
    #[serde(default)]
    pub profession_tags: Vec<String>,
}

/// Task creation payload for the task service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDraft {
    pub project_id: String,
    pub task_name: String,
    pub task_description: String,
    pub acceptance_criteria: String,
    pub reward_amount: String,
    pub visibility: String,
    pub profession_tags: Vec<String>,
}

/// A task created by the task service
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedTask {
    pub task_id: String,
}

/// Project listing; this service does not send a success flag
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectList {
    #[serde(default)]
    pub data: Vec<Project>,
}
