use crate::browser::{BrowserNavigator, LocalStorage};
use crate::components::layout::DashboardLayout;
use crate::pages::dashboard::{DeveloperDashboardPage, ManagerDashboardPage};
use crate::pages::login::LoginPage;
use crate::pages::profile::ProfilePage;
use crate::pages::projects::{CreateProjectPage, CreateTaskPage, ProjectDetailPage, ProjectsPage};
use crate::pages::register::RegisterPage;
use crate::pages::tasks::{AssignTaskPage, TaskDetailPage};
use crate::pages::teams::{CreateTeamPage, TeamDetailPage, TeamWorkloadPage, TeamsPage};
use flowdesk_core::guard::{self, GuardDecision, Landing, Resolution, SessionGuard};
use flowdesk_core::models::{Role, User};
use flowdesk_core::{ApiClient, ClientConfig, Session, SessionEvent, SessionStore};
use leptos::*;
use leptos_router::*;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppContext {
    pub api: ApiClient,
    pub guard: SessionGuard,
    pub config: ClientConfig,
    /// Mirrors the store; bumped on every sign-in and clear.
    pub session: RwSignal<Option<Session>>,
}

impl AppContext {
    pub fn store(&self) -> &Arc<SessionStore> {
        self.guard.store()
    }

    pub fn user(&self) -> Option<User> {
        self.session.get().map(|s| s.user)
    }
}

pub fn use_app() -> AppContext {
    expect_context::<AppContext>()
}

#[component]
pub fn App() -> impl IntoView {
    let config = ClientConfig::from_env();
    let store = Arc::new(SessionStore::new(LocalStorage));
    let api = ApiClient::standard(config.clone(), store.clone(), Arc::new(BrowserNavigator));

    let session = create_rw_signal(store.get());
    let subscription = store.subscribe(move |event| {
        let next = match event {
            SessionEvent::SignedIn(s) => Some(s.clone()),
            SessionEvent::Cleared => None,
        };
        session.try_set(next);
    });
    {
        let store = store.clone();
        on_cleanup(move || store.unsubscribe(subscription));
    }

    provide_context(AppContext {
        api,
        guard: SessionGuard::new(store),
        config,
        session,
    });

    view! {
      <Router>
        <main>
          <Routes>
            <Route path="/login" view=LoginPage/>
            <Route path="/register" view=RegisterPage/>
            <Route path="/" view=Home/>
            <Route path="/projects" view=|| view! { <Protected><ProjectsPage/></Protected> }/>
            <Route
              path="/projects/create"
              view=|| view! { <Protected role=Role::Manager><CreateProjectPage/></Protected> }
            />
            <Route path="/projects/:id" view=|| view! { <Protected><ProjectDetailPage/></Protected> }/>
            <Route
              path="/projects/:id/tasks/create"
              view=|| view! { <Protected role=Role::Manager><CreateTaskPage/></Protected> }
            />
            <Route path="/teams" view=|| view! { <Protected><TeamsPage/></Protected> }/>
            <Route
              path="/teams/create"
              view=|| view! { <Protected role=Role::Manager><CreateTeamPage/></Protected> }
            />
            <Route path="/teams/:id" view=|| view! { <Protected><TeamDetailPage/></Protected> }/>
            <Route
              path="/teams/:id/workload"
              view=|| view! { <Protected role=Role::Manager><TeamWorkloadPage/></Protected> }
            />
            <Route path="/tasks/:id" view=|| view! { <Protected><TaskDetailPage/></Protected> }/>
            <Route
              path="/tasks/:id/assign"
              view=|| view! { <Protected role=Role::Manager><AssignTaskPage/></Protected> }
            />
            <Route path="/profile" view=|| view! { <Protected><ProfilePage/></Protected> }/>
            <Route path="/*any" view=Fallback/>
          </Routes>
        </main>
      </Router>
    }
}

/// Renders `children` inside the dashboard layout when the persisted session
/// allows it, otherwise redirects.
#[component]
pub fn Protected(#[prop(optional)] role: Option<Role>, children: ChildrenFn) -> impl IntoView {
    let ctx = use_app();
    move || {
        ctx.session.track();
        match ctx.guard.allows(role) {
            GuardDecision::Render => {
                let children = children.clone();
                view! { <DashboardLayout>{children()}</DashboardLayout> }.into_view()
            }
            GuardDecision::Redirect(to) => view! { <Redirect path=to.path()/> }.into_view(),
        }
    }
}

/// Root route: the dashboard matching the signed-in role.
#[component]
fn Home() -> impl IntoView {
    let ctx = use_app();
    move || {
        ctx.session.track();
        match guard::landing(ctx.store().get().as_ref()) {
            Landing::Manager => view! {
              <DashboardLayout><ManagerDashboardPage/></DashboardLayout>
            }
            .into_view(),
            Landing::Developer => view! {
              <DashboardLayout><DeveloperDashboardPage/></DashboardLayout>
            }
            .into_view(),
            Landing::Login => view! { <Redirect path=guard::Route::Login.path()/> }.into_view(),
        }
    }
}

/// Paths no page is mounted at go back to `/` so the address bar changes too.
#[component]
fn Fallback() -> impl IntoView {
    let ctx = use_app();
    let path = use_location().pathname.get_untracked();
    let to = match ctx.guard.resolve(&path) {
        Resolution::Redirect(to) => to,
        _ => guard::Route::Home,
    };
    view! { <Redirect path=to.path()/> }
}
