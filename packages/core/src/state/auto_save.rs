//! Debounced fire-and-forget saves
//!
//! An edit schedules a save after a fixed delay. Scheduled saves are not
//! coordinated with each other: when two land close together both run, and
//! the later write is what storage keeps.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::models::Project;
use crate::state::AppStore;

pub struct AutoSaver {
    store: Arc<AppStore>,
    delay: Duration,
}

impl AutoSaver {
    pub fn new(store: Arc<AppStore>) -> Self {
        let delay = Duration::from_millis(store.config().auto_save_delay_ms);
        Self { store, delay }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Save `project` after the delay; must be called inside a tokio runtime
    ///
    /// The handle resolves to the stamped project, or `None` if the save
    /// failed (the failure is already recorded in application state).
    pub fn schedule(&self, project: Project) -> JoinHandle<Option<Project>> {
        let store = Arc::clone(&self.store);
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::debug!("Auto-saving project {}", project.id);
            store.save_current_project(&project)
        })
    }
}
