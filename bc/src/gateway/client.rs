//! Gateway trait definition

use async_trait::async_trait;

use super::{AdvisoryReply, ChatRequest, CreatedTask, GatewayError, SaveReportRequest, SavedReport, TaskDraft};
use crate::domain::{ItemId, ItemState, Project, Report};

/// Request/response boundary to the advisory, report, tag and task services
///
/// Implementations attach credentials and translate a 401 from any
/// authenticated service into [`GatewayError::Unauthorized`] after tearing
/// down the local session.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Send recent history to the advisory service
    async fn send_chat(&self, request: &ChatRequest) -> Result<AdvisoryReply, GatewayError>;

    /// Persist a recommendation document as a new report
    async fn save_report(&self, request: &SaveReportRequest) -> Result<SavedReport, GatewayError>;

    /// All reports for a project
    async fn list_reports(&self, project_id: &str) -> Result<Vec<Report>, GatewayError>;

    async fn get_report(&self, report_id: &str) -> Result<Report, GatewayError>;

    async fn delete_report(&self, report_id: &str) -> Result<(), GatewayError>;

    /// Record the status and task link of one report item
    async fn update_report_item(&self, report_id: &str, item_id: ItemId, state: &ItemState)
    -> Result<(), GatewayError>;

    /// Classify a free-text task description into profession tags
    async fn identify_tags(&self, description: &str) -> Result<Vec<String>, GatewayError>;

    /// Create a task in the task system using an explicit bearer credential
    async fn create_task(&self, token: &str, draft: &TaskDraft) -> Result<CreatedTask, GatewayError>;

    /// Projects visible to the signed-in user
    async fn list_projects(&self) -> Result<Vec<Project>, GatewayError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::debug;

    type Scripted<T> = Mutex<VecDeque<Result<T, GatewayError>>>;

    /// Scripted gateway for unit tests
    ///
    /// Each call pops the next scripted result for its endpoint; an endpoint
    /// with nothing scripted fails with `InvalidResponse`. Every call is
    /// counted and its request recorded.
    #[derive(Default)]
    pub struct MockGateway {
        chat: Scripted<AdvisoryReply>,
        tags: Scripted<Vec<String>>,
        tasks: Scripted<CreatedTask>,
        updates: Scripted<()>,
        reports: Mutex<HashMap<String, Report>>,
        projects: Mutex<Vec<Project>>,
        call_count: AtomicUsize,
        pub chat_requests: Mutex<Vec<ChatRequest>>,
        pub task_drafts: Mutex<Vec<TaskDraft>>,
        pub tag_requests: Mutex<Vec<String>>,
        pub item_updates: Mutex<Vec<(String, ItemId, ItemState)>>,
        pub saved: Mutex<Vec<SaveReportRequest>>,
    }

    fn next<T>(queue: &Scripted<T>, endpoint: &str) -> Result<T, GatewayError> {
        queue.lock().unwrap().pop_front().unwrap_or_else(|| {
            debug!(%endpoint, "MockGateway: nothing scripted");
            Err(GatewayError::InvalidResponse(format!("No scripted {} response", endpoint)))
        })
    }

    impl MockGateway {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        pub fn push_chat(&self, reply: Result<AdvisoryReply, GatewayError>) {
            self.chat.lock().unwrap().push_back(reply);
        }

        pub fn push_tags(&self, reply: Result<Vec<String>, GatewayError>) {
            self.tags.lock().unwrap().push_back(reply);
        }

        pub fn push_task(&self, reply: Result<CreatedTask, GatewayError>) {
            self.tasks.lock().unwrap().push_back(reply);
        }

        pub fn push_update(&self, reply: Result<(), GatewayError>) {
            self.updates.lock().unwrap().push_back(reply);
        }

        pub fn insert_report(&self, report: Report) {
            self.reports.lock().unwrap().insert(report.report_id.clone(), report);
        }

        pub fn stored_report(&self, report_id: &str) -> Option<Report> {
            self.reports.lock().unwrap().get(report_id).cloned()
        }

        pub fn set_projects(&self, projects: Vec<Project>) {
            *self.projects.lock().unwrap() = projects;
        }

        fn count(&self) {
            self.call_count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl Gateway for MockGateway {
        async fn send_chat(&self, request: &ChatRequest) -> Result<AdvisoryReply, GatewayError> {
            self.count();
            self.chat_requests.lock().unwrap().push(request.clone());
            next(&self.chat, "chat")
        }

        async fn save_report(&self, request: &SaveReportRequest) -> Result<SavedReport, GatewayError> {
            self.count();
            self.saved.lock().unwrap().push(request.clone());
            let mut reports = self.reports.lock().unwrap();
            let report_id = format!("r-{}", reports.len() + 1);
            reports.insert(
                report_id.clone(),
                Report {
                    report_id: report_id.clone(),
                    project_id: request.project_id.clone(),
                    business_goal: request.business_goal.clone(),
                    recommendations: request.recommendations.clone(),
                    created_at: None,
                },
            );
            Ok(SavedReport {
                report_id,
                created_at: None,
            })
        }

        async fn list_reports(&self, project_id: &str) -> Result<Vec<Report>, GatewayError> {
            self.count();
            let reports = self.reports.lock().unwrap();
            let mut found: Vec<Report> = reports.values().filter(|r| r.project_id == project_id).cloned().collect();
            found.sort_by(|a, b| a.report_id.cmp(&b.report_id));
            Ok(found)
        }

        async fn get_report(&self, report_id: &str) -> Result<Report, GatewayError> {
            self.count();
            self.stored_report(report_id).ok_or_else(|| GatewayError::Api {
                status: 404,
                message: "Report not found".to_string(),
            })
        }

        async fn delete_report(&self, report_id: &str) -> Result<(), GatewayError> {
            self.count();
            match self.reports.lock().unwrap().remove(report_id) {
                Some(_) => Ok(()),
                None => Err(GatewayError::Api {
                    status: 404,
                    message: "Report not found".to_string(),
                }),
            }
        }

        async fn update_report_item(
            &self,
            report_id: &str,
            item_id: ItemId,
            state: &ItemState,
        ) -> Result<(), GatewayError> {
            self.count();
            self.item_updates
                .lock()
                .unwrap()
                .push((report_id.to_string(), item_id, state.clone()));
            let scripted = self.updates.lock().unwrap().pop_front();
            if let Some(Err(e)) = scripted {
                return Err(e);
            }
            if let Some(report) = self.reports.lock().unwrap().get_mut(report_id) {
                report.recommendations.apply_item_state(item_id, state);
            }
            Ok(())
        }

        async fn identify_tags(&self, description: &str) -> Result<Vec<String>, GatewayError> {
            self.count();
            self.tag_requests.lock().unwrap().push(description.to_string());
            next(&self.tags, "tags")
        }

        async fn create_task(&self, _token: &str, draft: &TaskDraft) -> Result<CreatedTask, GatewayError> {
            self.count();
            self.task_drafts.lock().unwrap().push(draft.clone());
            next(&self.tasks, "task")
        }

        async fn list_projects(&self) -> Result<Vec<Project>, GatewayError> {
            self.count();
            Ok(self.projects.lock().unwrap().clone())
        }
    }
}
