//! HTTP gateway implementation
//!
//! Talks JSON to the report/tag service, the advisory service (on its own
//! client with an extended timeout), the task service and the identity
//! service. Bearer credentials come from the [`Session`].

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{
    AdvisoryReply, ChatRequest, CreatedTask, Envelope, Gateway, GatewayError, ProjectList, RawAdvisoryReply,
    SaveReportRequest, SavedReport, TagRequest, TagResponse, TaskDraft,
};
use crate::config::{EndpointsConfig, HttpConfig};
use crate::domain::{ItemId, ItemState, Project, Report};
use crate::session::Session;

/// reqwest-backed [`Gateway`]
pub struct HttpGateway {
    endpoints: EndpointsConfig,
    session: Session,
    http: Client,
    chat_http: Client,
}

impl HttpGateway {
    /// Create a gateway from configuration
    pub fn from_config(endpoints: &EndpointsConfig, http: &HttpConfig, session: Session) -> Result<Self, GatewayError> {
        debug!(?endpoints, "from_config: called");
        let client = Client::builder().timeout(http.timeout()).build()?;
        let chat_client = Client::builder().timeout(http.chat_timeout()).build()?;

        Ok(Self {
            endpoints: endpoints.clone(),
            session,
            http: client,
            chat_http: chat_client,
        })
    }

    fn api_url(&self, path: &str) -> String {
        join_url(&self.endpoints.api_base_url, path)
    }

    /// Attach the session's bearer credential, if any
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request, tearing down the session on 401 and surfacing the
    /// server's error text on any other failure status
    async fn execute(&self, request: RequestBuilder) -> Result<Response, GatewayError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("execute: 401 from upstream, invalidating session");
            self.session.invalidate();
            return Err(GatewayError::Unauthorized);
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!(%status, "execute: API error");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GatewayError> {
        let response = self.execute(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Join a base URL and a path without doubling slashes
fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Extract `error` from a JSON error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn send_chat(&self, request: &ChatRequest) -> Result<AdvisoryReply, GatewayError> {
        debug!(message_count = request.messages.len(), project_id = %request.project_id, "send_chat: called");
        let url = join_url(&self.endpoints.chat_api_url, "/");
        let envelope: Envelope<RawAdvisoryReply> =
            self.fetch(self.authorize(self.chat_http.post(url).json(request))).await?;
        Ok(envelope.into_data()?.into())
    }

    async fn save_report(&self, request: &SaveReportRequest) -> Result<SavedReport, GatewayError> {
        debug!(project_id = %request.project_id, "save_report: called");
        let url = self.api_url("/save-report");
        let envelope: Envelope<SavedReport> = self.fetch(self.authorize(self.http.post(url).json(request))).await?;
        envelope.into_data()
    }

    async fn list_reports(&self, project_id: &str) -> Result<Vec<Report>, GatewayError> {
        debug!(%project_id, "list_reports: called");
        let url = self.api_url("/reports");
        let envelope: Envelope<Vec<Report>> = self
            .fetch(self.authorize(self.http.get(url).query(&[("project_id", project_id)])))
            .await?;
        // A project without reports may come back with `data: null`
        if envelope.success && envelope.data.is_none() {
            return Ok(Vec::new());
        }
        envelope.into_data()
    }

    async fn get_report(&self, report_id: &str) -> Result<Report, GatewayError> {
        debug!(%report_id, "get_report: called");
        let url = self.api_url(&format!("/report/{}", report_id));
        let envelope: Envelope<Report> = self.fetch(self.authorize(self.http.get(url))).await?;
        envelope.into_data()
    }

    async fn delete_report(&self, report_id: &str) -> Result<(), GatewayError> {
        debug!(%report_id, "delete_report: called");
        let url = self.api_url(&format!("/report/{}", report_id));
        let envelope: Envelope<serde_json::Value> = self.fetch(self.authorize(self.http.delete(url))).await?;
        envelope.into_unit()
    }

    async fn update_report_item(
        &self,
        report_id: &str,
        item_id: ItemId,
        state: &ItemState,
    ) -> Result<(), GatewayError> {
        debug!(%report_id, %item_id, ?state, "update_report_item: called");
        let url = self.api_url(&format!("/report/{}/item/{}", report_id, item_id));
        let envelope: Envelope<serde_json::Value> =
            self.fetch(self.authorize(self.http.patch(url).json(state))).await?;
        envelope.into_unit()
    }

    async fn identify_tags(&self, description: &str) -> Result<Vec<String>, GatewayError> {
        debug!(description_len = description.len(), "identify_tags: called");
        let url = self.api_url("/identify-profession-tags");
        let body = TagRequest {
            task_description: description.to_string(),
        };
        let envelope: Envelope<TagResponse> = self.fetch(self.authorize(self.http.post(url).json(&body))).await?;
        Ok(envelope.into_data()?.profession_tags)
    }

    async fn create_task(&self, token: &str, draft: &TaskDraft) -> Result<CreatedTask, GatewayError> {
        debug!(task_name = %draft.task_name, "create_task: called");
        let url = join_url(&self.endpoints.task_api_url, "/tasks");
        let envelope: Envelope<CreatedTask> = self.fetch(self.http.post(url).bearer_auth(token).json(draft)).await?;
        envelope.into_data()
    }

    async fn list_projects(&self) -> Result<Vec<Project>, GatewayError> {
        debug!("list_projects: called");
        let url = join_url(&self.endpoints.identity_api_url, "/api/projects");
        let list: ProjectList = self.fetch(self.authorize(self.http.get(url))).await?;
        Ok(list.data)
    }
}
