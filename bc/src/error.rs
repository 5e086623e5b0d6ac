//! User-facing error taxonomy
//!
//! Every failure the conversation engine or report manager surfaces is one of
//! these. None are fatal: state is left as it was and the user may retry.
//! Tag classification failures during publish never appear here.

use thiserror::Error;

use crate::domain::ItemId;
use crate::gateway::GatewayError;

/// Input rejected before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Message is empty")]
    EmptyInput,

    #[error("No recommendations have been generated yet")]
    NoRecommendations,

    #[error("Unknown project: {0}")]
    UnknownProject(String),

    #[error("Report has no item {0}")]
    UnknownItem(ItemId),

    #[error("Item {0} is busy; try again when the current update finishes")]
    ItemBusy(ItemId),

    #[error("Item {0} already has a task; cancel it before publishing again")]
    AlreadyPublished(ItemId),
}

/// Errors surfaced by conversation and report operations
#[derive(Debug, Error)]
pub enum ConsultError {
    #[error("No project selected")]
    MissingContext,

    #[error("Not signed in")]
    Unauthenticated,

    #[error("{0}")]
    UpstreamFailure(String),

    #[error("{0}")]
    ValidationFailure(#[from] ValidationError),
}

impl ConsultError {
    /// Did this failure tear down (or find no) session?
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }
}

impl From<GatewayError> for ConsultError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unauthorized => Self::Unauthenticated,
            other => Self::UpstreamFailure(other.user_message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_maps_to_unauthenticated() {
        let err: ConsultError = GatewayError::Unauthorized.into();
        assert!(matches!(err, ConsultError::Unauthenticated));
        assert!(err.requires_login());
    }

    #[test]
    fn test_upstream_message_is_preserved() {
        let err: ConsultError = GatewayError::Api {
            status: 500,
            message: "数据库错误".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "数据库错误");

        let err: ConsultError = GatewayError::Rejected("发送消息失败".to_string()).into();
        assert!(matches!(err, ConsultError::UpstreamFailure(ref m) if m == "发送消息失败"));
    }

    #[test]
    fn test_validation_display() {
        let err: ConsultError = ValidationError::ItemBusy(ItemId::workflow(2)).into();
        assert_eq!(err.to_string(), "Item wf-2 is busy; try again when the current update finishes");
        assert!(!err.requires_login());
    }
}
