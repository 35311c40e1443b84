//! Route gating by session and role.

use crate::models::Role;
use crate::session::{Session, SessionStore};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Home,
    Projects,
    CreateProject,
    Project(String),
    CreateTask { project_id: String },
    Teams,
    CreateTeam,
    Team(String),
    TeamWorkload(String),
    Task(String),
    AssignTask(String),
    Profile,
}

impl Route {
    /// Unknown paths resolve to `Home`, the catch-all.
    pub fn parse(path: &str) -> Route {
        Route::recognize(path).unwrap_or(Route::Home)
    }

    /// `None` for a path no page is mounted at.
    pub fn recognize(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let route = match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            ["projects"] => Route::Projects,
            ["projects", "create"] => Route::CreateProject,
            ["projects", id] => Route::Project(id.to_string()),
            ["projects", id, "tasks", "create"] => Route::CreateTask {
                project_id: id.to_string(),
            },
            ["teams"] => Route::Teams,
            ["teams", "create"] => Route::CreateTeam,
            ["teams", id] => Route::Team(id.to_string()),
            ["teams", id, "workload"] => Route::TeamWorkload(id.to_string()),
            ["tasks", id] => Route::Task(id.to_string()),
            ["tasks", id, "assign"] => Route::AssignTask(id.to_string()),
            ["profile"] => Route::Profile,
            _ => return None,
        };
        Some(route)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".into(),
            Route::Register => "/register".into(),
            Route::Home => "/".into(),
            Route::Projects => "/projects".into(),
            Route::CreateProject => "/projects/create".into(),
            Route::Project(id) => format!("/projects/{id}"),
            Route::CreateTask { project_id } => format!("/projects/{project_id}/tasks/create"),
            Route::Teams => "/teams".into(),
            Route::CreateTeam => "/teams/create".into(),
            Route::Team(id) => format!("/teams/{id}"),
            Route::TeamWorkload(id) => format!("/teams/{id}/workload"),
            Route::Task(id) => format!("/tasks/{id}"),
            Route::AssignTask(id) => format!("/tasks/{id}/assign"),
            Route::Profile => "/profile".into(),
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login | Route::Register)
    }

    pub fn required_role(&self) -> Option<Role> {
        match self {
            Route::CreateProject
            | Route::CreateTeam
            | Route::CreateTask { .. }
            | Route::AssignTask(_)
            | Route::TeamWorkload(_) => Some(Role::Manager),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    Redirect(Route),
}

/// No session sends the caller to login; a role mismatch sends them to the
/// landing route rather than an error page.
pub fn check(session: Option<&Session>, required: Option<Role>) -> GuardDecision {
    let Some(session) = session else {
        return GuardDecision::Redirect(Route::Login);
    };
    match required {
        Some(role) if session.user.role != role => GuardDecision::Redirect(Route::Home),
        _ => GuardDecision::Render,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Landing {
    Manager,
    Developer,
    Login,
}

/// Which dashboard the root route shows. Any role other than `MANAGER`
/// gets the developer view.
pub fn landing(session: Option<&Session>) -> Landing {
    match session.map(|s| s.user.role) {
        None => Landing::Login,
        Some(Role::Manager) => Landing::Manager,
        Some(_) => Landing::Developer,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Public(Route),
    ManagerDashboard,
    DeveloperDashboard,
    Page(Route),
    Redirect(Route),
}

#[derive(Clone)]
pub struct SessionGuard {
    store: Arc<SessionStore>,
}

impl SessionGuard {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Unknown paths redirect to `/`, which then branches on the session.
    pub fn resolve(&self, path: &str) -> Resolution {
        match Route::recognize(path) {
            Some(route) => resolve(self.store.get().as_ref(), &route),
            None => Resolution::Redirect(Route::Home),
        }
    }

    pub fn allows(&self, required: Option<Role>) -> GuardDecision {
        check(self.store.get().as_ref(), required)
    }
}

pub fn resolve(session: Option<&Session>, route: &Route) -> Resolution {
    if route.is_public() {
        return Resolution::Public(route.clone());
    }
    if let GuardDecision::Redirect(to) = check(session, route.required_role()) {
        return Resolution::Redirect(to);
    }
    match route {
        Route::Home => match landing(session) {
            Landing::Manager => Resolution::ManagerDashboard,
            Landing::Developer => Resolution::DeveloperDashboard,
            Landing::Login => Resolution::Redirect(Route::Login),
        },
        other => Resolution::Page(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::user;

    fn session(role: Role) -> Session {
        Session::new("tok", user("u-1", role))
    }

    #[test]
    fn parse_and_path_agree_for_every_route() {
        let routes = [
            Route::Login,
            Route::Register,
            Route::Home,
            Route::Projects,
            Route::CreateProject,
            Route::Project("p1".into()),
            Route::CreateTask {
                project_id: "p1".into(),
            },
            Route::Teams,
            Route::CreateTeam,
            Route::Team("t1".into()),
            Route::TeamWorkload("t1".into()),
            Route::Task("k1".into()),
            Route::AssignTask("k1".into()),
            Route::Profile,
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn unknown_paths_fall_back_to_home() {
        assert_eq!(Route::parse("/developer-dashboard"), Route::Home);
        assert_eq!(Route::parse("/tasks/1/extra/segments"), Route::Home);
        assert_eq!(Route::parse("/tasks/9?tab=comments"), Route::Task("9".into()));
        assert_eq!(Route::recognize("/developer-dashboard"), None);
        assert_eq!(Route::recognize(""), Some(Route::Home));
    }

    #[test]
    fn guard_redirects_unknown_paths_to_root() {
        let store = Arc::new(SessionStore::in_memory());
        let guard = SessionGuard::new(store.clone());
        assert_eq!(guard.resolve("/nowhere"), Resolution::Redirect(Route::Home));

        store.set(&session(Role::Developer)).expect("set");
        assert_eq!(guard.resolve("/nowhere"), Resolution::Redirect(Route::Home));
        assert_eq!(guard.resolve("/projects/4/extra"), Resolution::Redirect(Route::Home));
        assert_eq!(guard.resolve("/projects/4"), Resolution::Page(Route::Project("4".into())));
    }

    #[test]
    fn protected_routes_redirect_to_login_without_session() {
        for path in ["/", "/projects", "/tasks/9", "/teams/3/workload", "/profile", "/nowhere"] {
            assert_eq!(
                resolve(None, &Route::parse(path)),
                Resolution::Redirect(Route::Login),
                "{path}"
            );
        }
    }

    #[test]
    fn root_branches_on_role() {
        let manager = session(Role::Manager);
        let developer = session(Role::Developer);
        let other = session(Role::Other);

        assert_eq!(resolve(Some(&manager), &Route::Home), Resolution::ManagerDashboard);
        assert_eq!(resolve(Some(&developer), &Route::Home), Resolution::DeveloperDashboard);
        assert_eq!(resolve(Some(&other), &Route::Home), Resolution::DeveloperDashboard);
    }

    #[test]
    fn role_mismatch_redirects_to_landing() {
        let developer = session(Role::Developer);
        assert_eq!(
            resolve(Some(&developer), &Route::CreateProject),
            Resolution::Redirect(Route::Home)
        );
        assert_eq!(
            resolve(Some(&session(Role::Manager)), &Route::CreateProject),
            Resolution::Page(Route::CreateProject)
        );
    }

    #[test]
    fn public_routes_render_without_session() {
        assert_eq!(resolve(None, &Route::Login), Resolution::Public(Route::Login));
        assert_eq!(resolve(None, &Route::Register), Resolution::Public(Route::Register));
    }

    #[test]
    fn guard_reads_store_on_every_resolve() {
        let store = Arc::new(SessionStore::in_memory());
        let guard = SessionGuard::new(store.clone());
        assert_eq!(guard.resolve("/"), Resolution::Redirect(Route::Login));

        store.set(&session(Role::Manager)).expect("set");
        assert_eq!(guard.resolve("/"), Resolution::ManagerDashboard);

        store.clear();
        assert_eq!(guard.resolve("/projects"), Resolution::Redirect(Route::Login));
    }
}
