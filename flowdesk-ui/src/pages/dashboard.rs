use crate::app::use_app;
use crate::components::widgets::{
    format_timestamp, or_dash, priority_class, risk_class, status_class, Loading, StatCard,
    WorkloadBar,
};
use flowdesk_core::models::{DeveloperDashboard, ManagerDashboard, Task, TaskStatus, TaskSummary};
use flowdesk_core::workload::group_by_status;
use leptos::*;
use leptos_router::{use_navigate, A};

#[component]
pub fn ManagerDashboardPage() -> impl IntoView {
    let ctx = use_app();
    let navigate = use_navigate();
    let data = create_rw_signal(None::<ManagerDashboard>);
    let failed = create_rw_signal(false);

    let api = ctx.api.clone();
    spawn_local(async move {
        match api.manager_dashboard().await {
            Ok(d) => {
                data.try_set(Some(d));
            }
            Err(e) => {
                logging::warn!("manager dashboard failed: {e}");
                failed.try_set(true);
            }
        }
    });

    let to_projects = {
        let navigate = navigate.clone();
        move |_| navigate("/projects", Default::default())
    };
    let to_teams = {
        let navigate = navigate.clone();
        move |_| navigate("/teams", Default::default())
    };
    let to_create = move |_| navigate("/projects/create", Default::default());

    view! {
      <h1>"Manager Dashboard"</h1>
      <div class="row spread actions">
        <div class="row">
          <button class="secondary" on:click=to_projects>"View All Projects"</button>
          <button class="secondary" on:click=to_teams>"View All Teams"</button>
        </div>
        <button class="primary" on:click=to_create>"+ Create Project"</button>
      </div>

      {move || match (data.get(), failed.get()) {
          (Some(d), _) => manager_body(d).into_view(),
          (None, true) => view! { <p class="empty">"Failed to load data"</p> }.into_view(),
          (None, false) => view! { <Loading label="Loading dashboard..."/> }.into_view(),
      }}
    }
}

fn manager_body(d: ManagerDashboard) -> impl IntoView {
    view! {
      <div class="grid four">
        <StatCard title="Active Projects" value=d.active_projects.to_string() color="#3b82f6"/>
        <StatCard title="Total Tasks" value=d.total_tasks.to_string() color="#10b981"/>
        <StatCard title="High-Risk Tasks" value=d.high_risk_tasks_count.to_string() color="#ef4444"/>
        <StatCard title="Completed Tasks" value=d.completed_tasks.to_string() color="#6366f1"/>
      </div>

      <div class="grid two">
        <div class="card">
          <h2>"Team Workload"</h2>
          {if d.team_workload.is_empty() {
              view! { <p class="empty">"No workload data."</p> }.into_view()
          } else {
              d.team_workload
                  .into_iter()
                  .map(|m| view! {
                    <WorkloadBar name=m.user.full_name() load=m.current_workload capacity=m.max_capacity/>
                  })
                  .collect_view()
          }}
        </div>
        <div class="card">
          <h2>"Upcoming Deadlines"</h2>
          <DeadlineTable tasks=d.upcoming_deadlines/>
        </div>
      </div>
    }
}

#[component]
fn DeadlineTable(tasks: Vec<TaskSummary>) -> impl IntoView {
    if tasks.is_empty() {
        return view! { <p class="empty">"No upcoming deadlines."</p> }.into_view();
    }
    view! {
      <table>
        <thead>
          <tr><th>"Task"</th><th>"Priority"</th><th>"Risk"</th><th>"Due"</th></tr>
        </thead>
        <tbody>
          {tasks
              .into_iter()
              .map(|t| {
                  let priority = t.priority.unwrap_or_default();
                  view! {
                    <tr>
                      <td><A href=format!("/tasks/{}", t.id)>{t.title.clone()}</A></td>
                      <td><span class=priority_class(priority)>{priority.as_str()}</span></td>
                      <td><span class=risk_class(t.risk_level)>{or_dash(t.risk_level.map(|r| r.as_str()))}</span></td>
                      <td>{or_dash(t.due_date.as_deref().map(format_timestamp))}</td>
                    </tr>
                  }
              })
              .collect_view()}
        </tbody>
      </table>
    }
    .into_view()
}

#[component]
pub fn DeveloperDashboardPage() -> impl IntoView {
    let ctx = use_app();
    let data = create_rw_signal(None::<DeveloperDashboard>);
    let tasks = create_rw_signal(Vec::<Task>::new());
    let loading = create_rw_signal(true);

    match ctx.user() {
        Some(user) => {
            let api = ctx.api.clone();
            spawn_local(async move {
                let (dash, mine) =
                    futures::join!(api.developer_dashboard(), api.user_tasks(&user.id));
                match (dash, mine) {
                    (Ok(d), Ok(t)) => {
                        data.try_set(Some(d));
                        tasks.try_set(t);
                    }
                    (Err(e), _) | (_, Err(e)) => logging::warn!("developer dashboard failed: {e}"),
                }
                loading.try_set(false);
            });
        }
        None => loading.set(false),
    }

    view! {
      {move || {
          if loading.get() {
              return view! { <Loading label="Loading dashboard..."/> }.into_view();
          }
          let Some(d) = data.get() else {
              return view! { <p class="empty">"Failed to load data"</p> }.into_view();
          };
          let groups = group_by_status(&tasks.get());
          view! {
            <h1>"My Dashboard"</h1>
            <div class="grid four">
              <StatCard title="My Tasks" value=d.my_tasks_count.to_string() color="#3b82f6"/>
              <StatCard title="Current Workload" value=format!("{} pts", d.current_workload) color="#f59e0b"/>
              <StatCard title="Completed This Week" value=d.completed_this_week.to_string() color="#10b981"/>
              <StatCard title="Upcoming Deadlines" value=d.upcoming_deadlines.len().to_string() color="#ef4444"/>
            </div>

            <div class="grid four">
              {TaskStatus::ALL
                  .into_iter()
                  .map(|s| view! {
                    <div class="card">
                      <h3>{s.label()}</h3>
                      <p class="big">{groups.get(&s).map_or(0, Vec::len)}</p>
                    </div>
                  })
                  .collect_view()}
            </div>

            {TaskStatus::ALL
                .into_iter()
                .map(|s| {
                    let list = groups.get(&s).cloned().unwrap_or_default();
                    view! { <TaskSection status=s tasks=list/> }
                })
                .collect_view()}
          }
          .into_view()
      }}
    }
}

#[component]
fn TaskSection(status: TaskStatus, tasks: Vec<Task>) -> impl IntoView {
    let body = if tasks.is_empty() {
        view! { <p class="empty">{format!("No {} tasks assigned.", status.label())}</p> }.into_view()
    } else {
        tasks
            .into_iter()
            .map(|t| view! {
              <A href=format!("/tasks/{}", t.id) class="task-row">
                <span>{t.title.clone()}</span>
                <span class=status_class(t.status)>{t.status.label()}</span>
                <span class=priority_class(t.priority)>{t.priority.as_str()}</span>
                <span class="meta">{or_dash(t.story_points)}" pts"</span>
              </A>
            })
            .collect_view()
    };
    view! {
      <div class="card">
        <h2>{format!("My {} Tasks", status.label())}</h2>
        {body}
      </div>
    }
}
