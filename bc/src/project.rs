//! Project context: which project conversations and reports belong to

use std::sync::Arc;

use sessionstore::{KeyValueStore, LAST_PROJECT_KEY};
use tracing::{debug, info, warn};

use crate::domain::Project;
use crate::error::{ConsultError, ValidationError};
use crate::gateway::Gateway;

/// Projects visible to the user and the one currently selected
pub struct ProjectContext {
    store: Arc<dyn KeyValueStore>,
    projects: Vec<Project>,
    selected: Option<Project>,
}

impl ProjectContext {
    /// List projects and select the last used one if it still exists,
    /// otherwise the first
    pub async fn load(gateway: &dyn Gateway, store: Arc<dyn KeyValueStore>) -> Result<Self, ConsultError> {
        debug!("ProjectContext::load: called");
        let projects = gateway.list_projects().await?;

        let last = match store.get(LAST_PROJECT_KEY) {
            Ok(last) => last,
            Err(e) => {
                warn!(error = %e, "ProjectContext::load: failed to read last project");
                None
            }
        };
        let selected = last
            .and_then(|id| projects.iter().find(|p| p.project_id == id).cloned())
            .or_else(|| projects.first().cloned());

        info!(
            count = projects.len(),
            selected = ?selected.as_ref().map(|p| &p.project_id),
            "ProjectContext::load: projects loaded"
        );
        Ok(Self {
            store,
            projects,
            selected,
        })
    }

    /// Like [`load`](Self::load), but a listing failure leaves nothing
    /// selected instead of failing
    pub async fn restore(gateway: &dyn Gateway, store: Arc<dyn KeyValueStore>) -> Self {
        match Self::load(gateway, store.clone()).await {
            Ok(context) => context,
            Err(e) => {
                warn!(error = %e, "ProjectContext::restore: could not list projects");
                Self {
                    store,
                    projects: Vec::new(),
                    selected: None,
                }
            }
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn selected(&self) -> Option<&Project> {
        self.selected.as_ref()
    }

    /// Select a project by id and remember the choice
    pub fn select(&mut self, project_id: &str) -> Result<&Project, ConsultError> {
        debug!(%project_id, "select: called");
        let project = self
            .projects
            .iter()
            .find(|p| p.project_id == project_id)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownProject(project_id.to_string()))?;

        if let Err(e) = self.store.set(LAST_PROJECT_KEY, &project.project_id) {
            warn!(error = %e, "select: failed to remember project");
        }
        info!(%project_id, "select: project selected");
        Ok(&*self.selected.insert(project))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::client::mock::MockGateway;
    use sessionstore::MemoryStore;

    fn project(id: &str) -> Project {
        Project {
            project_id: id.to_string(),
            project_name: format!("Project {}", id),
        }
    }

    fn gateway() -> MockGateway {
        let gateway = MockGateway::new();
        gateway.set_projects(vec![project("p-1"), project("p-2")]);
        gateway
    }

    #[tokio::test]
    async fn test_first_project_selected_by_default() {
        let context = ProjectContext::load(&gateway(), Arc::new(MemoryStore::new())).await.unwrap();
        assert_eq!(context.projects().len(), 2);
        assert_eq!(context.selected().unwrap().project_id, "p-1");
    }

    #[tokio::test]
    async fn test_last_project_restored() {
        let store = Arc::new(MemoryStore::new());
        store.set(LAST_PROJECT_KEY, "p-2").unwrap();

        let context = ProjectContext::load(&gateway(), store).await.unwrap();
        assert_eq!(context.selected().unwrap().project_id, "p-2");
    }

    #[tokio::test]
    async fn test_stale_last_project_falls_back_to_first() {
        let store = Arc::new(MemoryStore::new());
        store.set(LAST_PROJECT_KEY, "p-gone").unwrap();

        let context = ProjectContext::load(&gateway(), store).await.unwrap();
        assert_eq!(context.selected().unwrap().project_id, "p-1");
    }

    #[tokio::test]
    async fn test_select_persists_choice() {
        let store = Arc::new(MemoryStore::new());
        let mut context = ProjectContext::load(&gateway(), store.clone()).await.unwrap();

        let selected = context.select("p-2").unwrap();
        assert_eq!(selected.project_id, "p-2");
        assert_eq!(store.get(LAST_PROJECT_KEY).unwrap().as_deref(), Some("p-2"));

        let err = context.select("p-9").unwrap_err();
        assert!(matches!(
            err,
            ConsultError::ValidationFailure(ValidationError::UnknownProject(ref id)) if id == "p-9"
        ));
        assert_eq!(context.selected().unwrap().project_id, "p-2");
    }

    #[tokio::test]
    async fn test_no_projects() {
        let context = ProjectContext::restore(&MockGateway::new(), Arc::new(MemoryStore::new())).await;
        assert!(context.selected().is_none());
        assert!(context.projects().is_empty());
    }
}
