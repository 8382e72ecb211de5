//! Application state and its transitions
//!
//! `reduce` is the only way state changes. It is pure and total: every
//! action is defined for every state. All non-transient transitions clear
//! `error` as part of the transition itself; `SetLoading`, `SetError` and
//! `ClearError` only touch the flags they name (`SetError` also ends
//! loading).

use crate::models::Project;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub current_project: Option<Project>,
    pub projects: Vec<Project>,
    pub selected_node_id: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Named state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    SetProjects(Vec<Project>),
    SetCurrentProject(Option<Project>),
    AddProject(Project),
    UpdateProject(Project),
    DeleteProject(String),
    SetSelectedNode(Option<String>),
    SetLoading(bool),
    SetError(Option<String>),
    ClearError,
}

impl AppAction {
    pub fn action_type(&self) -> &'static str {
        match self {
            AppAction::SetProjects(_) => "SET_PROJECTS",
            AppAction::SetCurrentProject(_) => "SET_CURRENT_PROJECT",
            AppAction::AddProject(_) => "ADD_PROJECT",
            AppAction::UpdateProject(_) => "UPDATE_PROJECT",
            AppAction::DeleteProject(_) => "DELETE_PROJECT",
            AppAction::SetSelectedNode(_) => "SET_SELECTED_NODE",
            AppAction::SetLoading(_) => "SET_LOADING",
            AppAction::SetError(_) => "SET_ERROR",
            AppAction::ClearError => "CLEAR_ERROR",
        }
    }
}

pub fn reduce(state: AppState, action: &AppAction) -> AppState {
    match action {
        AppAction::SetProjects(projects) => AppState {
            projects: projects.clone(),
            error: None,
            ..state
        },
        AppAction::SetCurrentProject(project) => AppState {
            current_project: project.clone(),
            error: None,
            ..state
        },
        AppAction::AddProject(project) => {
            let mut projects = Vec::with_capacity(state.projects.len() + 1);
            projects.push(project.clone());
            projects.extend(state.projects);
            AppState {
                projects,
                error: None,
                ..state
            }
        }
        AppAction::UpdateProject(project) => {
            let current_project = match state.current_project {
                Some(current) if current.id == project.id => Some(project.clone()),
                other => other,
            };
            let projects = state
                .projects
                .into_iter()
                .map(|p| if p.id == project.id { project.clone() } else { p })
                .collect();
            AppState {
                current_project,
                projects,
                error: None,
                ..state
            }
        }
        AppAction::DeleteProject(id) => {
            let current_project = state.current_project.filter(|current| &current.id != id);
            let projects = state.projects.into_iter().filter(|p| &p.id != id).collect();
            AppState {
                current_project,
                projects,
                error: None,
                ..state
            }
        }
        AppAction::SetSelectedNode(node_id) => AppState {
            selected_node_id: node_id.clone(),
            error: None,
            ..state
        },
        AppAction::SetLoading(is_loading) => AppState {
            is_loading: *is_loading,
            ..state
        },
        AppAction::SetError(error) => AppState {
            error: error.clone(),
            is_loading: false,
            ..state
        },
        AppAction::ClearError => AppState { error: None, ..state },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn project(id: &str, title: &str) -> Project {
        let now = Utc::now();
        Project {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            created_at: now,
            updated_at: now,
            thumbnail: None,
        }
    }

    fn errored() -> AppState {
        AppState {
            error: Some("boom".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_project_prepends() {
        let state = reduce(
            AppState::default(),
            &AppAction::SetProjects(vec![project("a", "A")]),
        );
        let state = reduce(state, &AppAction::AddProject(project("b", "B")));

        let ids: Vec<&str> = state.projects.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_update_project_not_current_leaves_current_alone() {
        let state = AppState {
            current_project: Some(project("a", "A")),
            projects: vec![project("a", "A"), project("b", "B")],
            ..Default::default()
        };

        let state = reduce(state, &AppAction::UpdateProject(project("b", "B2")));

        assert_eq!(state.current_project.as_ref().unwrap().title, "A");
        assert_eq!(state.projects[1].title, "B2");
    }

    #[test]
    fn test_update_project_matching_current_updates_both() {
        let state = AppState {
            current_project: Some(project("a", "A")),
            projects: vec![project("a", "A")],
            ..Default::default()
        };

        let state = reduce(state, &AppAction::UpdateProject(project("a", "A2")));

        assert_eq!(state.current_project.as_ref().unwrap().title, "A2");
        assert_eq!(state.projects[0].title, "A2");
    }

    #[test]
    fn test_delete_project_clears_current_only_when_matching() {
        let state = AppState {
            current_project: Some(project("a", "A")),
            projects: vec![project("a", "A"), project("b", "B")],
            ..Default::default()
        };

        let state = reduce(state, &AppAction::DeleteProject("b".to_string()));
        assert!(state.current_project.is_some());
        assert_eq!(state.projects.len(), 1);

        let state = reduce(state, &AppAction::DeleteProject("a".to_string()));
        assert!(state.current_project.is_none());
        assert!(state.projects.is_empty());
    }

    #[test]
    fn test_state_changing_transitions_clear_error() {
        let actions = [
            AppAction::SetProjects(Vec::new()),
            AppAction::SetCurrentProject(None),
            AppAction::AddProject(project("a", "A")),
            AppAction::UpdateProject(project("a", "A")),
            AppAction::DeleteProject("a".to_string()),
            AppAction::SetSelectedNode(Some("n1".to_string())),
            AppAction::ClearError,
        ];
        for action in &actions {
            let state = reduce(errored(), action);
            assert!(state.error.is_none(), "{} kept the error", action.action_type());
        }
    }

    #[test]
    fn test_set_loading_keeps_error() {
        let state = reduce(errored(), &AppAction::SetLoading(true));
        assert!(state.is_loading);
        assert_eq!(state.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_set_error_ends_loading() {
        let state = reduce(AppState::default(), &AppAction::SetLoading(true));
        let state = reduce(state, &AppAction::SetError(Some("failed".to_string())));

        assert!(!state.is_loading);
        assert_eq!(state.error.as_deref(), Some("failed"));
    }
}
