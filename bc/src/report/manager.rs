//! ReportManager - owns saved reports and the per-item publish lifecycle
//!
//! Publishing an item is two side effects in sequence: classify the item into
//! profession tags (best-effort), then create a task. Only the second one can
//! fail the operation. Each item is guarded by an in-flight set so the same
//! item is never published or cancelled twice at once; different items are
//! independent.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::task::TaskSource;
use crate::config::Config;
use crate::domain::{ItemId, ItemState, Project, RecommendationDocument, Report};
use crate::error::{ConsultError, ValidationError};
use crate::gateway::{Gateway, SaveReportRequest};
use crate::session::Session;

/// Default delay before re-reading a report after a publish
pub const DEFAULT_RELOAD_DELAY: Duration = Duration::from_secs(1);

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Change notifications for subscribers (the REPL, tests)
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    Saved { report_id: String },
    Published { report_id: String, item_id: ItemId, task_id: String },
    Cancelled { report_id: String, item_id: ItemId },
    /// Deferred re-read after a publish completed
    Reloaded { report_id: String },
    ReloadFailed { report_id: String, error: String },
    Deleted { report_id: String },
}

/// Result of a successful publish
#[derive(Debug, Clone, PartialEq)]
pub struct PublishOutcome {
    pub item_id: ItemId,
    pub task_id: String,
    /// Profession tags attached to the task; empty if classification failed
    pub tags: Vec<String>,
    pub task_url: String,
}

/// Result of a cancel
#[derive(Debug, Clone, PartialEq)]
pub struct CancelOutcome {
    pub item_id: ItemId,
    /// Task the item pointed at before the cancel, if any
    pub previous_task_id: Option<String>,
    /// False when the item was already unpublished
    pub changed: bool,
}

type InFlight = Arc<Mutex<HashSet<(String, ItemId)>>>;

/// Marks one item as busy until dropped
struct InFlightGuard {
    set: InFlight,
    key: (String, ItemId),
}

impl InFlightGuard {
    fn acquire(set: &InFlight, report_id: &str, item_id: ItemId) -> Result<Self, ValidationError> {
        let key = (report_id.to_string(), item_id);
        if !lock(set).insert(key.clone()) {
            debug!(%report_id, %item_id, "InFlightGuard::acquire: item busy");
            return Err(ValidationError::ItemBusy(item_id));
        }
        Ok(Self { set: set.clone(), key })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.set).remove(&self.key);
    }
}

/// Lock, recovering from poisoning
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Handle to the report lifecycle; cheap to clone
#[derive(Clone)]
pub struct ReportManager {
    gateway: Arc<dyn Gateway>,
    session: Session,
    reports: Arc<Mutex<HashMap<String, Report>>>,
    in_flight: InFlight,
    events: broadcast::Sender<ReportEvent>,
    reload_delay: Duration,
    task_ui_url: String,
}

impl ReportManager {
    pub fn new(gateway: Arc<dyn Gateway>, session: Session) -> Self {
        debug!("ReportManager::new: called");
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            gateway,
            session,
            reports: Arc::new(Mutex::new(HashMap::new())),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            events,
            reload_delay: DEFAULT_RELOAD_DELAY,
            task_ui_url: String::new(),
        }
    }

    pub fn from_config(gateway: Arc<dyn Gateway>, session: Session, config: &Config) -> Self {
        Self::new(gateway, session)
            .with_reload_delay(config.reports.reload_delay())
            .with_task_ui_url(&config.endpoints.task_ui_url)
    }

    pub fn with_reload_delay(mut self, delay: Duration) -> Self {
        self.reload_delay = delay;
        self
    }

    pub fn with_task_ui_url(mut self, url: &str) -> Self {
        self.task_ui_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Subscribe to report change events
    pub fn subscribe_events(&self) -> broadcast::Receiver<ReportEvent> {
        self.events.subscribe()
    }

    /// Link to a task in the task center UI
    pub fn task_url(&self, task_id: &str) -> String {
        format!("{}/tasks/{}", self.task_ui_url, task_id)
    }

    /// Cached copy of a report, if one has been loaded
    pub fn report(&self, report_id: &str) -> Option<Report> {
        lock(&self.reports).get(report_id).cloned()
    }

    /// Save a recommendation document as a new report
    ///
    /// Both preconditions are checked before anything is sent.
    pub async fn save(
        &self,
        project: Option<&Project>,
        business_goal: &str,
        doc: Option<&RecommendationDocument>,
    ) -> Result<Report, ConsultError> {
        debug!(%business_goal, "save: called");
        let doc = doc.ok_or(ValidationError::NoRecommendations)?;
        let project = project.ok_or(ConsultError::MissingContext)?;

        let request = SaveReportRequest {
            project_id: project.project_id.clone(),
            business_goal: business_goal.to_string(),
            recommendations: doc.clone(),
        };
        let saved = self.gateway.save_report(&request).await.map_err(|e| {
            warn!(error = %e, "save: report service failed");
            ConsultError::from(e)
        })?;

        let report = Report {
            report_id: saved.report_id,
            project_id: request.project_id,
            business_goal: request.business_goal,
            recommendations: request.recommendations,
            created_at: saved.created_at,
        };
        info!(report_id = %report.report_id, "save: report saved");
        self.cache(report.clone());
        self.emit(ReportEvent::Saved {
            report_id: report.report_id.clone(),
        });
        Ok(report)
    }

    /// All reports of a project, newest state from the server
    pub async fn list(&self, project: Option<&Project>) -> Result<Vec<Report>, ConsultError> {
        let project = project.ok_or(ConsultError::MissingContext)?;
        debug!(project_id = %project.project_id, "list: called");
        let reports = self.gateway.list_reports(&project.project_id).await?;
        let mut cache = lock(&self.reports);
        for report in &reports {
            cache.insert(report.report_id.clone(), report.clone());
        }
        Ok(reports)
    }

    /// Fetch a report from the server and refresh the cache
    pub async fn load(&self, report_id: &str) -> Result<Report, ConsultError> {
        debug!(%report_id, "load: called");
        let report = self.gateway.get_report(report_id).await?;
        self.cache(report.clone());
        Ok(report)
    }

    /// Turn one workflow or role item into a task
    ///
    /// Only an unpublished item can be published. Classification failures
    /// only cost the tags. A task creation failure
    /// leaves the item untouched. After success the report is re-read in the
    /// background and a [`ReportEvent::Reloaded`] follows.
    pub async fn publish(&self, report_id: &str, item_id: ItemId) -> Result<PublishOutcome, ConsultError> {
        debug!(%report_id, %item_id, "publish: called");
        let _guard = InFlightGuard::acquire(&self.in_flight, report_id, item_id)?;
        let token = self.session.token().ok_or(ConsultError::Unauthenticated)?;

        let report = self.cached_or_load(report_id).await?;
        let current = report
            .recommendations
            .item_state(item_id)
            .ok_or(ValidationError::UnknownItem(item_id))?;
        if !current.is_unpublished() {
            debug!(%report_id, %item_id, status = ?current.status, "publish: item already has a task");
            return Err(ValidationError::AlreadyPublished(item_id).into());
        }
        let source =
            TaskSource::lookup(&report.recommendations, item_id).ok_or(ValidationError::UnknownItem(item_id))?;

        let tags = self.classify(&source.classification_text()).await;
        let draft = source.draft(&report.project_id, tags.clone());

        let created = self.gateway.create_task(&token, &draft).await.map_err(|e| {
            warn!(%report_id, %item_id, error = %e, "publish: task creation failed");
            ConsultError::from(e)
        })?;
        info!(%report_id, %item_id, task_id = %created.task_id, "publish: task created");

        let state = ItemState::published(&created.task_id);
        self.gateway
            .update_report_item(report_id, item_id, &state)
            .await
            .map_err(|e| {
                warn!(%report_id, %item_id, task_id = %created.task_id, error = %e, "publish: task created but item update failed");
                ConsultError::from(e)
            })?;
        self.apply(report_id, item_id, &state);

        self.emit(ReportEvent::Published {
            report_id: report_id.to_string(),
            item_id,
            task_id: created.task_id.clone(),
        });
        self.schedule_reload(report_id.to_string());

        Ok(PublishOutcome {
            item_id,
            task_url: self.task_url(&created.task_id),
            task_id: created.task_id,
            tags,
        })
    }

    /// Clear an item's task link; an unpublished item is left alone
    pub async fn cancel(&self, report_id: &str, item_id: ItemId) -> Result<CancelOutcome, ConsultError> {
        debug!(%report_id, %item_id, "cancel: called");
        let _guard = InFlightGuard::acquire(&self.in_flight, report_id, item_id)?;

        let report = self.cached_or_load(report_id).await?;
        let current = report
            .recommendations
            .item_state(item_id)
            .ok_or(ValidationError::UnknownItem(item_id))?;

        if current.is_unpublished() {
            debug!(%report_id, %item_id, "cancel: already unpublished");
            return Ok(CancelOutcome {
                item_id,
                previous_task_id: None,
                changed: false,
            });
        }

        let state = ItemState::unpublished();
        self.gateway.update_report_item(report_id, item_id, &state).await?;
        self.apply(report_id, item_id, &state);
        info!(%report_id, %item_id, "cancel: item unpublished");

        self.emit(ReportEvent::Cancelled {
            report_id: report_id.to_string(),
            item_id,
        });
        Ok(CancelOutcome {
            item_id,
            previous_task_id: current.task_id,
            changed: true,
        })
    }

    /// Delete a report remotely and forget it locally
    pub async fn delete(&self, report_id: &str) -> Result<(), ConsultError> {
        debug!(%report_id, "delete: called");
        self.gateway.delete_report(report_id).await?;
        lock(&self.reports).remove(report_id);
        info!(%report_id, "delete: report deleted");
        self.emit(ReportEvent::Deleted {
            report_id: report_id.to_string(),
        });
        Ok(())
    }

    /// Best-effort, never retried
    async fn classify(&self, text: &str) -> Vec<String> {
        match self.gateway.identify_tags(text).await {
            Ok(tags) => {
                debug!(?tags, "classify: tags identified");
                tags
            }
            Err(e) => {
                warn!(error = %e, "classify: tag identification failed, continuing without tags");
                Vec::new()
            }
        }
    }

    async fn cached_or_load(&self, report_id: &str) -> Result<Report, ConsultError> {
        match self.report(report_id) {
            Some(report) => Ok(report),
            None => self.load(report_id).await,
        }
    }

    fn cache(&self, report: Report) {
        lock(&self.reports).insert(report.report_id.clone(), report);
    }

    fn apply(&self, report_id: &str, item_id: ItemId, state: &ItemState) {
        if let Some(report) = lock(&self.reports).get_mut(report_id) {
            report.recommendations.apply_item_state(item_id, state);
        }
    }

    fn emit(&self, event: ReportEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Re-read a report after the server has had time to reconcile
    fn schedule_reload(&self, report_id: String) {
        let manager = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(manager.reload_delay).await;
            match manager.gateway.get_report(&report_id).await {
                Ok(report) => {
                    debug!(%report_id, "schedule_reload: reloaded");
                    manager.cache(report);
                    manager.emit(ReportEvent::Reloaded { report_id });
                }
                Err(e) => {
                    warn!(%report_id, error = %e, "schedule_reload: reload failed");
                    manager.emit(ReportEvent::ReloadFailed {
                        report_id,
                        error: e.user_message(),
                    });
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Amount, HumanRole, ItemStatus, Workflow};
    use crate::gateway::client::mock::MockGateway;
    use crate::gateway::{CreatedTask, GatewayError};
    use sessionstore::MemoryStore;

    fn signed_in_session() -> Session {
        let session = Session::new(Arc::new(MemoryStore::new()));
        session.sign_in("header.e30.sig").unwrap();
        session
    }

    fn project() -> Project {
        Project {
            project_id: "p-1".to_string(),
            project_name: "Shop".to_string(),
        }
    }

    fn doc() -> RecommendationDocument {
        RecommendationDocument {
            summary: "S".to_string(),
            ai_workflows: vec![
                Workflow {
                    name: "W1".to_string(),
                    description: "写文案".to_string(),
                    estimated_cost: Some(Amount::from(100)),
                    ..Default::default()
                },
                Workflow {
                    name: "W2".to_string(),
                    ..Default::default()
                },
            ],
            human_roles: vec![HumanRole {
                title: "运营".to_string(),
                responsibilities: vec!["选品".to_string()],
                monthly_budget: Some(Amount::from(3000)),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn report() -> Report {
        Report {
            report_id: "r-1".to_string(),
            project_id: "p-1".to_string(),
            business_goal: "跨境电商".to_string(),
            recommendations: doc(),
            created_at: None,
        }
    }

    fn manager(gateway: &Arc<MockGateway>, session: Session) -> ReportManager {
        ReportManager::new(gateway.clone(), session)
            .with_reload_delay(Duration::from_millis(10))
            .with_task_ui_url("https://tasks.example.com/")
    }

    fn task(id: &str) -> Result<CreatedTask, GatewayError> {
        Ok(CreatedTask {
            task_id: id.to_string(),
        })
    }

    #[tokio::test]
    async fn test_publish_proceeds_when_classification_fails() {
        let gateway = Arc::new(MockGateway::new());
        gateway.insert_report(report());
        gateway.push_tags(Err(GatewayError::Rejected("tag service down".to_string())));
        gateway.push_task(task("T1"));
        let reports = manager(&gateway, signed_in_session());

        let outcome = reports.publish("r-1", ItemId::workflow(0)).await.unwrap();

        assert_eq!(outcome.task_id, "T1");
        assert!(outcome.tags.is_empty());
        assert_eq!(outcome.task_url, "https://tasks.example.com/tasks/T1");

        let state = reports.report("r-1").unwrap().recommendations.item_state(ItemId::workflow(0));
        assert_eq!(state, Some(ItemState::published("T1")));

        let drafts = gateway.task_drafts.lock().unwrap();
        assert_eq!(drafts[0].task_name, "开发AI工作流：W1");
        assert_eq!(drafts[0].reward_amount, "100");
        assert!(drafts[0].profession_tags.is_empty());

        let updates = gateway.item_updates.lock().unwrap();
        assert_eq!(updates[0], ("r-1".to_string(), ItemId::workflow(0), ItemState::published("T1")));
    }

    #[tokio::test]
    async fn test_publish_without_credential_makes_no_calls() {
        let gateway = Arc::new(MockGateway::new());
        gateway.insert_report(report());
        let reports = manager(&gateway, Session::new(Arc::new(MemoryStore::new())));

        let err = reports.publish("r-1", ItemId::workflow(0)).await.unwrap_err();

        assert!(matches!(err, ConsultError::Unauthenticated));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_publish_attaches_tags_to_role_task() {
        let gateway = Arc::new(MockGateway::new());
        gateway.insert_report(report());
        gateway.push_tags(Ok(vec!["电商运营".to_string()]));
        gateway.push_task(task("T7"));
        let reports = manager(&gateway, signed_in_session());

        let outcome = reports.publish("r-1", ItemId::role(0)).await.unwrap();

        assert_eq!(outcome.tags, vec!["电商运营".to_string()]);
        assert_eq!(gateway.tag_requests.lock().unwrap()[0], "运营\n职责：选品\n要求：");
        let drafts = gateway.task_drafts.lock().unwrap();
        assert_eq!(drafts[0].task_name, "招聘：运营");
        assert_eq!(drafts[0].reward_amount, "3000");
        assert_eq!(drafts[0].profession_tags, vec!["电商运营".to_string()]);
        assert_eq!(drafts[0].project_id, "p-1");
    }

    #[tokio::test]
    async fn test_task_failure_leaves_item_unpublished() {
        let gateway = Arc::new(MockGateway::new());
        gateway.insert_report(report());
        gateway.push_tags(Ok(Vec::new()));
        gateway.push_task(Err(GatewayError::Api {
            status: 400,
            message: "余额不足".to_string(),
        }));
        let reports = manager(&gateway, signed_in_session());

        let err = reports.publish("r-1", ItemId::workflow(0)).await.unwrap_err();

        assert_eq!(err.to_string(), "余额不足");
        let state = reports.report("r-1").unwrap().recommendations.item_state(ItemId::workflow(0));
        assert_eq!(state, Some(ItemState::unpublished()));
        assert!(gateway.item_updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_rejects_item_with_task() {
        let gateway = Arc::new(MockGateway::new());
        let mut existing = report();
        existing
            .recommendations
            .apply_item_state(ItemId::workflow(0), &ItemState::published("T1"));
        existing.recommendations.apply_item_state(
            ItemId::role(0),
            &ItemState {
                status: Some(ItemStatus::DraftCreated),
                task_id: Some("D1".to_string()),
            },
        );
        gateway.insert_report(existing);
        gateway.push_task(task("T2"));
        let reports = manager(&gateway, signed_in_session());

        let err = reports.publish("r-1", ItemId::workflow(0)).await.unwrap_err();
        assert!(matches!(
            err,
            ConsultError::ValidationFailure(ValidationError::AlreadyPublished(id)) if id == ItemId::workflow(0)
        ));

        let err = reports.publish("r-1", ItemId::role(0)).await.unwrap_err();
        assert!(matches!(
            err,
            ConsultError::ValidationFailure(ValidationError::AlreadyPublished(id)) if id == ItemId::role(0)
        ));

        assert!(gateway.task_drafts.lock().unwrap().is_empty());
        assert!(gateway.tag_requests.lock().unwrap().is_empty());
        assert!(gateway.item_updates.lock().unwrap().is_empty());
        let state = reports.report("r-1").unwrap().recommendations.item_state(ItemId::workflow(0));
        assert_eq!(state, Some(ItemState::published("T1")));
    }

    #[tokio::test]
    async fn test_publish_unknown_item() {
        let gateway = Arc::new(MockGateway::new());
        gateway.insert_report(report());
        let reports = manager(&gateway, signed_in_session());

        let err = reports.publish("r-1", ItemId::role(5)).await.unwrap_err();

        assert!(matches!(
            err,
            ConsultError::ValidationFailure(ValidationError::UnknownItem(id)) if id == ItemId::role(5)
        ));
        assert!(gateway.task_drafts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_busy_item_is_rejected() {
        let gateway = Arc::new(MockGateway::new());
        gateway.insert_report(report());
        gateway.push_tags(Ok(Vec::new()));
        gateway.push_task(task("T1"));
        let reports = manager(&gateway, signed_in_session());

        let guard = InFlightGuard::acquire(&reports.in_flight, "r-1", ItemId::workflow(0)).unwrap();
        let err = reports.publish("r-1", ItemId::workflow(0)).await.unwrap_err();
        assert!(matches!(
            err,
            ConsultError::ValidationFailure(ValidationError::ItemBusy(_))
        ));
        assert_eq!(gateway.call_count(), 0);

        drop(guard);
        assert!(reports.publish("r-1", ItemId::workflow(0)).await.is_ok());
        assert!(lock(&reports.in_flight).is_empty());
    }

    #[tokio::test]
    async fn test_different_items_publish_concurrently() {
        let gateway = Arc::new(MockGateway::new());
        gateway.insert_report(report());
        gateway.push_tags(Ok(Vec::new()));
        gateway.push_tags(Ok(Vec::new()));
        gateway.push_task(task("T1"));
        gateway.push_task(task("T2"));
        let reports = manager(&gateway, signed_in_session());

        let (a, b) = futures::join!(
            reports.publish("r-1", ItemId::workflow(0)),
            reports.publish("r-1", ItemId::workflow(1))
        );
        let mut task_ids = vec![a.unwrap().task_id, b.unwrap().task_id];
        task_ids.sort();
        assert_eq!(task_ids, vec!["T1".to_string(), "T2".to_string()]);

        let doc = reports.report("r-1").unwrap().recommendations;
        assert_eq!(doc.published_count(), 2);
    }

    #[tokio::test]
    async fn test_publish_schedules_reload() {
        let gateway = Arc::new(MockGateway::new());
        gateway.insert_report(report());
        gateway.push_tags(Ok(Vec::new()));
        gateway.push_task(task("T1"));
        let reports = manager(&gateway, signed_in_session());
        let mut events = reports.subscribe_events();

        reports.publish("r-1", ItemId::workflow(0)).await.unwrap();

        let published = events.recv().await.unwrap();
        assert!(matches!(published, ReportEvent::Published { ref task_id, .. } if task_id == "T1"));
        let reloaded = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            reloaded,
            ReportEvent::Reloaded {
                report_id: "r-1".to_string()
            }
        );
        // The server copy was updated by the item PATCH
        let doc = reports.report("r-1").unwrap().recommendations;
        assert_eq!(doc.ai_workflows[0].status, Some(ItemStatus::Published));
    }

    #[tokio::test]
    async fn test_cancel_published_item() {
        let gateway = Arc::new(MockGateway::new());
        let mut published = report();
        published
            .recommendations
            .apply_item_state(ItemId::workflow(0), &ItemState::published("T1"));
        gateway.insert_report(published);
        let reports = manager(&gateway, signed_in_session());

        let outcome = reports.cancel("r-1", ItemId::workflow(0)).await.unwrap();

        assert!(outcome.changed);
        assert_eq!(outcome.previous_task_id.as_deref(), Some("T1"));
        let state = reports.report("r-1").unwrap().recommendations.item_state(ItemId::workflow(0));
        assert_eq!(state, Some(ItemState::unpublished()));
        let updates = gateway.item_updates.lock().unwrap();
        assert_eq!(updates[0].2, ItemState::unpublished());
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let gateway = Arc::new(MockGateway::new());
        gateway.insert_report(report());
        let reports = manager(&gateway, signed_in_session());
        reports.load("r-1").await.unwrap();
        let calls = gateway.call_count();

        let first = reports.cancel("r-1", ItemId::role(0)).await.unwrap();
        let second = reports.cancel("r-1", ItemId::role(0)).await.unwrap();

        assert!(!first.changed && !second.changed);
        assert_eq!(gateway.call_count(), calls);
        let state = reports.report("r-1").unwrap().recommendations.item_state(ItemId::role(0));
        assert_eq!(state.unwrap().task_id, None);
    }

    #[tokio::test]
    async fn test_save_without_recommendations_makes_no_calls() {
        let gateway = Arc::new(MockGateway::new());
        let reports = manager(&gateway, signed_in_session());

        let err = reports.save(Some(&project()), "跨境电商", None).await.unwrap_err();
        assert!(matches!(
            err,
            ConsultError::ValidationFailure(ValidationError::NoRecommendations)
        ));

        let err = reports.save(None, "跨境电商", Some(&doc())).await.unwrap_err();
        assert!(matches!(err, ConsultError::MissingContext));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_saved_report_reloads_identical() {
        let gateway = Arc::new(MockGateway::new());
        let reports = manager(&gateway, signed_in_session());

        let saved = reports.save(Some(&project()), "跨境电商", Some(&doc())).await.unwrap();
        let loaded = reports.load(&saved.report_id).await.unwrap();

        assert_eq!(loaded.recommendations, doc());
        assert_eq!(loaded.business_goal, "跨境电商");
        assert_eq!(gateway.saved.lock().unwrap()[0].project_id, "p-1");
    }

    #[tokio::test]
    async fn test_list_requires_project() {
        let gateway = Arc::new(MockGateway::new());
        gateway.insert_report(report());
        let reports = manager(&gateway, signed_in_session());

        assert!(matches!(reports.list(None).await, Err(ConsultError::MissingContext)));
        let listed = reports.list(Some(&project())).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(reports.report("r-1").is_some());
    }

    #[tokio::test]
    async fn test_delete_drops_cached_report() {
        let gateway = Arc::new(MockGateway::new());
        gateway.insert_report(report());
        let reports = manager(&gateway, signed_in_session());
        reports.load("r-1").await.unwrap();

        reports.delete("r-1").await.unwrap();

        assert!(reports.report("r-1").is_none());
        assert!(gateway.stored_report("r-1").is_none());
        assert!(reports.delete("r-1").await.is_err());
    }
}
