//! Application State Container
//!
//! `AppStore` owns the single [`AppState`] for a UI session. It is built
//! explicitly and handed around as `Arc<AppStore>`; callers read snapshots
//! and call actions, never mutate state directly.
//!
//! Actions orchestrate [`ProjectStorage`] calls and [`AppAction`] dispatches.
//! Storage failures stop at this boundary: the cause is logged and state
//! receives a fixed message for the action. The one failure that propagates
//! is a missing project on [`AppStore::load_project`], since the caller has
//! to navigate away.
//!
//! Every applied action is published on a broadcast channel so views can
//! re-render.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use crate::config::{Messages, MindMapConfig};
use crate::db::{KeyValueStore, ProjectStorage};
use crate::error::AppError;
use crate::models::Project;
use crate::state::reducer::{reduce, AppAction, AppState};

const EVENT_CHANNEL_CAPACITY: usize = 256;

pub struct AppStore {
    state: Mutex<AppState>,
    storage: ProjectStorage,
    config: MindMapConfig,
    events: broadcast::Sender<AppAction>,
}

impl AppStore {
    pub fn new(storage: ProjectStorage, config: MindMapConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(AppState::default()),
            storage,
            config,
            events,
        }
    }

    /// Store over a key-value backend, configured from `config`
    pub fn from_config(store: Arc<dyn KeyValueStore + Send + Sync>, config: MindMapConfig) -> Self {
        let storage =
            ProjectStorage::new(store, config.messages()).with_key_prefix(config.key_prefix.clone());
        Self::new(storage, config)
    }

    pub fn storage(&self) -> &ProjectStorage {
        &self.storage
    }

    pub fn config(&self) -> &MindMapConfig {
        &self.config
    }

    fn messages(&self) -> &'static Messages {
        self.storage.messages()
    }

    pub fn state(&self) -> AppState {
        match self.state.lock() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppAction> {
        self.events.subscribe()
    }

    /// Apply one transition and notify subscribers
    pub fn dispatch(&self, action: AppAction) {
        {
            let mut state = match self.state.lock() {
                Ok(state) => state,
                Err(poisoned) => poisoned.into_inner(),
            };
            let current = std::mem::take(&mut *state);
            *state = reduce(current, &action);
        }

        tracing::debug!("Dispatched {}", action.action_type());
        // No subscribers is fine
        let _ = self.events.send(action);
    }

    pub fn load_projects(&self) {
        self.dispatch(AppAction::SetLoading(true));

        match self.storage.get_all() {
            Ok(projects) => self.dispatch(AppAction::SetProjects(projects)),
            Err(e) => {
                tracing::error!("Failed to load projects: {}", e);
                self.dispatch(AppAction::SetError(Some(
                    self.messages().load_projects_failed.to_string(),
                )));
            }
        }

        self.dispatch(AppAction::SetLoading(false));
    }

    /// Open a project by id
    ///
    /// A missing project leaves `current_project` untouched, records the
    /// load-failed message and returns [`AppError::ProjectNotFound`].
    pub fn load_project(&self, id: &str) -> Result<Project, AppError> {
        self.dispatch(AppAction::SetLoading(true));

        let result = match self.storage.get(id) {
            Some(project) => {
                self.dispatch(AppAction::SetCurrentProject(Some(project.clone())));
                Ok(project)
            }
            None => {
                tracing::warn!("Project {} not found", id);
                self.dispatch(AppAction::SetError(Some(
                    self.messages().load_project_failed.to_string(),
                )));
                Err(AppError::project_not_found(id))
            }
        };

        self.dispatch(AppAction::SetLoading(false));
        result
    }

    /// Create, persist and open a new project; `None` on failure
    pub fn create_project(&self, title: Option<&str>) -> Option<Project> {
        self.dispatch(AppAction::SetLoading(true));

        let project = self.storage.create_new(title);
        let created = match self.storage.save(&project) {
            Ok(()) => {
                self.dispatch(AppAction::AddProject(project.clone()));
                self.dispatch(AppAction::SetCurrentProject(Some(project.clone())));
                Some(project)
            }
            Err(e) => {
                tracing::error!("Failed to create project: {}", e);
                self.dispatch(AppAction::SetError(Some(
                    self.messages().create_project_failed.to_string(),
                )));
                None
            }
        };

        self.dispatch(AppAction::SetLoading(false));
        created
    }

    /// Persist a project and refresh both the current view and the list
    ///
    /// `updated_at` is refreshed on write; the stamped project is returned.
    /// On failure the caller's project value is unaffected and `None` is
    /// returned.
    pub fn save_current_project(&self, project: &Project) -> Option<Project> {
        match self.storage.update(project) {
            Ok(saved) => {
                self.dispatch(AppAction::SetCurrentProject(Some(saved.clone())));
                self.dispatch(AppAction::UpdateProject(saved.clone()));
                Some(saved)
            }
            Err(e) => {
                tracing::error!("Failed to save project {}: {}", project.id, e);
                self.dispatch(AppAction::SetError(Some(
                    self.messages().save_project_failed.to_string(),
                )));
                None
            }
        }
    }

    pub fn delete_project(&self, id: &str) {
        match self.storage.delete(id) {
            Ok(()) => self.dispatch(AppAction::DeleteProject(id.to_string())),
            Err(e) => {
                tracing::error!("Failed to delete project {}: {}", id, e);
                self.dispatch(AppAction::SetError(Some(
                    self.messages().delete_project_failed.to_string(),
                )));
            }
        }
    }

    pub fn set_current_project(&self, project: Option<Project>) {
        self.dispatch(AppAction::SetCurrentProject(project));
    }

    pub fn set_selected_node(&self, node_id: Option<String>) {
        self.dispatch(AppAction::SetSelectedNode(node_id));
    }

    pub fn clear_error(&self) {
        self.dispatch(AppAction::ClearError);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Locale;
    use crate::db::MemoryStore;
    use crate::error::StorageError;

    fn app_store() -> AppStore {
        AppStore::from_config(Arc::new(MemoryStore::new()), MindMapConfig::default())
    }

    /// Backend whose listing and removal always fail; reads and writes work
    struct BrokenListingStore {
        inner: MemoryStore,
    }

    impl KeyValueStore for BrokenListingStore {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.inner.set_item(key, value)
        }

        fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::backend("remove rejected"))
        }

        fn keys(&self) -> Result<Vec<String>, StorageError> {
            Err(StorageError::backend("listing rejected"))
        }
    }

    fn broken_store(locale: Locale) -> AppStore {
        let config = MindMapConfig {
            locale,
            ..Default::default()
        };
        let backend = BrokenListingStore {
            inner: MemoryStore::new(),
        };
        AppStore::from_config(Arc::new(backend), config)
    }

    #[test]
    fn test_create_project_adds_and_opens() {
        let store = app_store();
        let project = store.create_project(Some("Trip Plan")).unwrap();

        let state = store.state();
        assert_eq!(state.projects.len(), 1);
        assert_eq!(state.current_project.as_ref().unwrap().id, project.id);
        assert!(!state.is_loading);
        assert!(store.storage().get(&project.id).is_some());
    }

    #[test]
    fn test_create_project_failure_returns_none() {
        let config = MindMapConfig {
            locale: Locale::En,
            ..Default::default()
        };
        let store = AppStore::from_config(Arc::new(MemoryStore::with_quota(8)), config);

        assert!(store.create_project(None).is_none());
        let state = store.state();
        assert_eq!(state.error.as_deref(), Some("Failed to create project"));
        assert!(state.projects.is_empty());
        assert!(!state.is_loading);
    }

    #[test]
    fn test_load_project_missing_propagates() {
        let store = app_store();
        let existing = store.create_project(Some("Keep")).unwrap();

        let result = store.load_project("nonexistent");

        assert!(matches!(result, Err(AppError::ProjectNotFound { .. })));
        let state = store.state();
        assert_eq!(state.current_project.unwrap().id, existing.id);
        assert_eq!(state.error.as_deref(), Some("加载项目失败"));
    }

    #[test]
    fn test_successful_action_clears_previous_error() {
        let store = app_store();
        let _ = store.load_project("nonexistent");
        assert!(store.state().error.is_some());

        store.load_projects();
        assert!(store.state().error.is_none());
    }

    #[test]
    fn test_delete_project_removes_from_list_and_current() {
        let store = app_store();
        let project = store.create_project(Some("Gone")).unwrap();

        store.delete_project(&project.id);
        store.delete_project(&project.id);

        let state = store.state();
        assert!(state.projects.is_empty());
        assert!(state.current_project.is_none());
        assert!(state.error.is_none());
    }

    #[test]
    fn test_load_projects_failure_keeps_list() {
        let store = broken_store(Locale::Zh);
        let project = store.create_project(Some("Kept")).unwrap();

        store.load_projects();

        let state = store.state();
        assert!(!state.is_loading);
        assert_eq!(state.error.as_deref(), Some("加载项目失败"));
        assert_eq!(state.projects, vec![project.clone()]);
        assert_eq!(state.current_project, Some(project));
    }

    #[test]
    fn test_delete_project_failure_keeps_project() {
        let store = broken_store(Locale::En);
        let project = store.create_project(Some("Stays")).unwrap();

        store.delete_project(&project.id);

        let state = store.state();
        assert_eq!(state.error.as_deref(), Some("Failed to delete project"));
        assert_eq!(state.projects, vec![project.clone()]);
        assert_eq!(state.current_project, Some(project.clone()));
        assert!(store.storage().get(&project.id).is_some());
    }

    #[test]
    fn test_dispatch_publishes_action() {
        let store = app_store();
        let mut rx = store.subscribe();

        store.set_selected_node(Some("n1".to_string()));

        let action = rx.try_recv().unwrap();
        assert_eq!(action.action_type(), "SET_SELECTED_NODE");
        assert_eq!(store.state().selected_node_id.as_deref(), Some("n1"));
    }
}
