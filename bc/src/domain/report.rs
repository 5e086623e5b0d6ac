//! Persisted reports and projects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RecommendationDocument;

/// A saved recommendation document, owned by the report service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Server-assigned identifier
    pub report_id: String,

    #[serde(default, deserialize_with = "super::null_default")]
    pub project_id: String,

    #[serde(default, deserialize_with = "super::null_default")]
    pub business_goal: String,

    /// `null` when the stored document could not be parsed server-side
    #[serde(default, deserialize_with = "super::null_default")]
    pub recommendations: RecommendationDocument,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A project the signed-in user can attach reports to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: String,

    #[serde(default)]
    pub project_name: String,
}

impl std::fmt::Display for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.project_name.is_empty() {
            write!(f, "{}", self.project_id)
        } else {
            write!(f, "{} ({})", self.project_name, self.project_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_tolerates_sparse_payload() {
        let report: Report = serde_json::from_str(r#"{"report_id": "r-1"}"#).unwrap();
        assert_eq!(report.report_id, "r-1");
        assert!(report.recommendations.ai_workflows.is_empty());
        assert!(report.created_at.is_none());
    }

    #[test]
    fn test_unparseable_document_does_not_sink_listing() {
        let reports: Vec<Report> = serde_json::from_str(
            r#"[{"report_id": "r-1", "business_goal": "g", "recommendations": {"summary": "S"}},
                {"report_id": "r-2", "business_goal": null, "recommendations": null}]"#,
        )
        .unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].recommendations.summary, "S");
        assert_eq!(reports[1].recommendations, RecommendationDocument::default());
        assert!(reports[1].business_goal.is_empty());
    }

    #[test]
    fn test_report_parses_created_at() {
        let report: Report = serde_json::from_str(
            r#"{"report_id": "r-1", "project_id": "p", "business_goal": "g",
                "recommendations": {"summary": "S"}, "created_at": "2025-01-02T03:04:05Z"}"#,
        )
        .unwrap();
        assert_eq!(report.recommendations.summary, "S");
        assert!(report.created_at.is_some());
    }

    #[test]
    fn test_project_display() {
        let named = Project {
            project_id: "p-1".to_string(),
            project_name: "Shop".to_string(),
        };
        assert_eq!(named.to_string(), "Shop (p-1)");

        let bare = Project {
            project_id: "p-2".to_string(),
            project_name: String::new(),
        };
        assert_eq!(bare.to_string(), "p-2");
    }
}
