//! Application state: pure transitions, the owning container, auto-save

mod app_store;
mod auto_save;
mod reducer;

pub use app_store::AppStore;
pub use auto_save::AutoSaver;
pub use reducer::{reduce, AppAction, AppState};
