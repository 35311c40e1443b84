use crate::app::use_app;
use crate::browser;
use crate::components::widgets::{
    format_timestamp, or_dash, priority_class, risk_class, status_class, Loading,
};
use flowdesk_core::models::{
    CreateProjectRequest, CreateTaskRequest, Project, Task, TaskPriority, Team,
};
use leptos::*;
use leptos_router::{use_navigate, use_params_map, A};

pub(crate) fn route_id() -> String {
    use_params_map().with_untracked(|p| p.get("id").cloned().unwrap_or_default())
}

fn optional(value: String) -> Option<String> {
    let value = value.trim().to_string();
    (!value.is_empty()).then_some(value)
}

#[component]
pub fn ProjectsPage() -> impl IntoView {
    let ctx = use_app();
    let projects = create_rw_signal(None::<Vec<Project>>);
    let is_manager = ctx.user().is_some_and(|u| u.is_manager());

    let api = ctx.api.clone();
    spawn_local(async move {
        match api.projects().await {
            Ok(p) => {
                projects.try_set(Some(p));
            }
            Err(e) => {
                logging::warn!("projects failed: {e}");
                projects.try_set(Some(Vec::new()));
            }
        }
    });

    view! {
      <div class="row spread">
        <h1>"Projects"</h1>
        <Show when=move || is_manager fallback=|| ()>
          <A href="/projects/create" class="button primary">"+ Create Project"</A>
        </Show>
      </div>
      {move || match projects.get() {
          None => view! { <Loading label="Loading projects..."/> }.into_view(),
          Some(list) if list.is_empty() => view! { <p class="empty">"No projects yet."</p> }.into_view(),
          Some(list) => view! {
            <div class="grid three">
              {list.into_iter().map(project_card).collect_view()}
            </div>
          }
          .into_view(),
      }}
    }
}

fn project_card(p: Project) -> impl IntoView {
    let percent = p.completion_percentage.unwrap_or(0.0);
    view! {
      <A href=format!("/projects/{}", p.id) class="card">
        <div class="row spread">
          <h3>{p.name.clone()}</h3>
          <span class=risk_class(p.risk_level)>{or_dash(p.risk_level.map(|r| r.as_str()))}</span>
        </div>
        <p class="meta">{p.description.clone().unwrap_or_default()}</p>
        <p class="meta">"Team: " {or_dash(p.team.as_ref().map(|t| t.name.clone()))}</p>
        <div class="bar">
          <div class="bar-fill low" style=format!("width: {:.0}%", percent.min(100.0))></div>
        </div>
        <p class="meta">{format!("{percent:.0}% complete")}</p>
      </A>
    }
}

#[component]
pub fn ProjectDetailPage() -> impl IntoView {
    let ctx = use_app();
    let id = route_id();
    let project = create_rw_signal(None::<Project>);
    let tasks = create_rw_signal(Vec::<Task>::new());
    let failed = create_rw_signal(false);
    let is_manager = ctx.user().is_some_and(|u| u.is_manager());

    let api = ctx.api.clone();
    let project_id = id.clone();
    spawn_local(async move {
        let (p, t) = futures::join!(api.project(&project_id), api.project_tasks(&project_id));
        match (p, t) {
            (Ok(p), Ok(t)) => {
                project.try_set(Some(p));
                tasks.try_set(t);
            }
            (Err(e), _) | (_, Err(e)) => {
                logging::warn!("project {project_id} failed: {e}");
                failed.try_set(true);
            }
        }
    });

    view! {
      {move || match (project.get(), failed.get()) {
          (Some(p), _) => {
              let create_href = format!("/projects/{}/tasks/create", id);
              view! {
                <div class="row spread">
                  <div>
                    <h1>{p.name.clone()}</h1>
                    <p class="meta">{p.description.clone().unwrap_or_default()}</p>
                  </div>
                  <Show when=move || is_manager fallback=|| ()>
                    <A href=create_href.clone() class="button primary">"+ Create Task"</A>
                  </Show>
                </div>
                <div class="grid four">
                  <div class="card"><p class="meta">"Status"</p><p>{or_dash(p.status.clone())}</p></div>
                  <div class="card"><p class="meta">"Team"</p><p>{or_dash(p.team.as_ref().map(|t| t.name.clone()))}</p></div>
                  <div class="card"><p class="meta">"Story Points"</p><p>{format!(
                      "{}/{}",
                      p.completed_story_points.unwrap_or(0),
                      p.total_story_points.unwrap_or(0)
                  )}</p></div>
                  <div class="card"><p class="meta">"End Date"</p><p>{or_dash(p.end_date.as_deref().map(format_timestamp))}</p></div>
                </div>
                <div class="card">
                  <h2>"Tasks"</h2>
                  {task_table(tasks.get())}
                </div>
              }
              .into_view()
          }
          (None, true) => view! { <p class="empty">"Project not found."</p> }.into_view(),
          (None, false) => view! { <Loading label="Loading project..."/> }.into_view(),
      }}
    }
}

fn task_table(tasks: Vec<Task>) -> View {
    if tasks.is_empty() {
        return view! { <p class="empty">"No tasks in this project."</p> }.into_view();
    }
    view! {
      <table>
        <thead>
          <tr><th>"Task"</th><th>"Status"</th><th>"Priority"</th><th>"Assignee"</th><th>"Points"</th></tr>
        </thead>
        <tbody>
          {tasks
              .into_iter()
              .map(|t| view! {
                <tr>
                  <td><A href=format!("/tasks/{}", t.id)>{t.title.clone()}</A></td>
                  <td><span class=status_class(t.status)>{t.status.label()}</span></td>
                  <td><span class=priority_class(t.priority)>{t.priority.as_str()}</span></td>
                  <td>{t.assigned_to.as_ref().map_or_else(|| "Unassigned".to_string(), |u| u.full_name())}</td>
                  <td>{or_dash(t.story_points)}</td>
                </tr>
              })
              .collect_view()}
        </tbody>
      </table>
    }
    .into_view()
}

#[component]
pub fn CreateProjectPage() -> impl IntoView {
    let ctx = use_app();
    let navigate = use_navigate();
    let teams = create_rw_signal(Vec::<Team>::new());
    let form = create_rw_signal(CreateProjectRequest::default());
    let error = create_rw_signal(None::<String>);
    let saving = create_rw_signal(false);

    let api = ctx.api.clone();
    spawn_local(async move {
        match api.teams().await {
            Ok(t) => {
                teams.try_set(t);
            }
            Err(e) => logging::warn!("teams failed: {e}"),
        }
    });

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let mut request = form.get_untracked();
        if request.name.trim().is_empty() || request.team_id.is_empty() {
            error.set(Some("Name and team are required.".into()));
            return;
        }
        request.start_date = request.start_date.and_then(optional);
        request.end_date = request.end_date.and_then(optional);
        request.github_repo_url = request.github_repo_url.and_then(optional);

        error.set(None);
        saving.set(true);
        let api = ctx.api.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            match api.create_project(&request).await {
                Ok(p) => navigate(&format!("/projects/{}", p.id), Default::default()),
                Err(e) => {
                    error.try_set(e.user_notice("Failed to create project.").map(ToString::to_string));
                }
            }
            saving.try_set(false);
        });
    };

    view! {
      <h1>"Create Project"</h1>
      <Show when=move || error.get().is_some() fallback=|| ()>
        <p class="error">{move || error.get().unwrap_or_default()}</p>
      </Show>
      <form class="card stack" on:submit=submit>
        <input
          placeholder="Project name"
          prop:value=move || form.with(|f| f.name.clone())
          on:input=move |ev| form.update(|f| f.name = event_target_value(&ev))
        />
        <textarea
          placeholder="Description"
          prop:value=move || form.with(|f| f.description.clone())
          on:input=move |ev| form.update(|f| f.description = event_target_value(&ev))
        ></textarea>
        <select on:change=move |ev| form.update(|f| f.team_id = event_target_value(&ev))>
          <option value="">"Select Team"</option>
          <For
            each=move || teams.get()
            key=|t| t.id.clone()
            children=|t: Team| view! { <option value=t.id.clone()>{t.name.clone()}</option> }
          />
        </select>
        <div class="grid two">
          <input
            type="date"
            on:input=move |ev| form.update(|f| f.start_date = Some(event_target_value(&ev)))
          />
          <input
            type="date"
            on:input=move |ev| form.update(|f| f.end_date = Some(event_target_value(&ev)))
          />
        </div>
        <input
          placeholder="GitHub repository URL"
          on:input=move |ev| form.update(|f| f.github_repo_url = Some(event_target_value(&ev)))
        />
        <button class="primary" type="submit" disabled=move || saving.get()>
          {move || if saving.get() { "Creating..." } else { "Create Project" }}
        </button>
      </form>
    }
}

#[derive(Clone, Default)]
struct TaskDraft {
    title: String,
    description: String,
    priority: TaskPriority,
    story_points: String,
    estimated_hours: String,
    due_date: String,
}

impl TaskDraft {
    fn into_request(self, project_id: String) -> CreateTaskRequest {
        CreateTaskRequest {
            project_id,
            title: self.title.trim().to_string(),
            description: self.description,
            priority: self.priority,
            story_points: self.story_points.trim().parse().ok(),
            estimated_hours: self.estimated_hours.trim().parse().ok(),
            due_date: optional(self.due_date),
            assigned_to_user_id: None,
        }
    }
}

#[component]
pub fn CreateTaskPage() -> impl IntoView {
    let ctx = use_app();
    let navigate = use_navigate();
    let project_id = route_id();
    let draft = create_rw_signal(TaskDraft::default());
    let error = create_rw_signal(None::<String>);
    let saving = create_rw_signal(false);

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let current = draft.get_untracked();
        if current.title.trim().is_empty() {
            error.set(Some("Title is required.".into()));
            return;
        }
        error.set(None);
        saving.set(true);

        let request = current.into_request(project_id.clone());
        let api = ctx.api.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            match api.create_task(&request).await {
                Ok(t) => navigate(&format!("/tasks/{}", t.id), Default::default()),
                Err(e) => {
                    browser::report_failure(&e, "Failed to create task.");
                }
            }
            saving.try_set(false);
        });
    };

    view! {
      <h1>"Create Task"</h1>
      <Show when=move || error.get().is_some() fallback=|| ()>
        <p class="error">{move || error.get().unwrap_or_default()}</p>
      </Show>
      <form class="card stack" on:submit=submit>
        <input
          placeholder="Title"
          prop:value=move || draft.with(|d| d.title.clone())
          on:input=move |ev| draft.update(|d| d.title = event_target_value(&ev))
        />
        <textarea
          placeholder="Description"
          prop:value=move || draft.with(|d| d.description.clone())
          on:input=move |ev| draft.update(|d| d.description = event_target_value(&ev))
        ></textarea>
        <select on:change=move |ev| {
            let picked = TaskPriority::parse(&event_target_value(&ev)).unwrap_or_default();
            draft.update(|d| d.priority = picked);
        }>
          {[TaskPriority::Low, TaskPriority::Medium, TaskPriority::High, TaskPriority::Critical]
              .into_iter()
              .map(|p| view! {
                <option value=p.as_str() selected=move || draft.with(|d| d.priority == p)>{p.as_str()}</option>
              })
              .collect_view()}
        </select>
        <div class="grid three">
          <input
            type="number"
            min="0"
            placeholder="Story points"
            on:input=move |ev| draft.update(|d| d.story_points = event_target_value(&ev))
          />
          <input
            type="number"
            min="0"
            placeholder="Estimated hours"
            on:input=move |ev| draft.update(|d| d.estimated_hours = event_target_value(&ev))
          />
          <input
            type="date"
            on:input=move |ev| draft.update(|d| d.due_date = event_target_value(&ev))
          />
        </div>
        <button class="primary" type="submit" disabled=move || saving.get()>
          {move || if saving.get() { "Creating..." } else { "Create Task" }}
        </button>
      </form>
    }
}
