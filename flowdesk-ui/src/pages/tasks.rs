use crate::app::use_app;
use crate::browser;
use crate::components::widgets::{
    format_timestamp, or_dash, priority_class, risk_class, status_class, Loading,
};
use crate::pages::projects::route_id;
use flowdesk_core::models::{
    AssigneeRecommendation, Comment, Role, SubmitForReviewRequest, Subtask, Task, TaskStatus, User,
};
use flowdesk_core::ApiClient;
use leptos::*;
use leptos_router::{use_navigate, A};

#[component]
pub fn TaskDetailPage() -> impl IntoView {
    let ctx = use_app();
    let id = route_id();
    let me = ctx.user();

    let task = create_rw_signal(None::<Task>);
    let subtasks = create_rw_signal(Vec::<Subtask>::new());
    let comments = create_rw_signal(Vec::<Comment>::new());
    let failed = create_rw_signal(false);

    let api = store_value(ctx.api.clone());
    let task_id = store_value(id.clone());

    spawn_local({
        let api = ctx.api.clone();
        async move {
            let (t, s, c) = futures::join!(api.task(&id), api.subtasks(&id), api.comments(&id));
            match t {
                Ok(t) => {
                    task.try_set(Some(t));
                }
                Err(e) => {
                    logging::warn!("task {id} failed: {e}");
                    failed.try_set(true);
                }
            }
            subtasks.try_set(s.unwrap_or_default());
            comments.try_set(c.unwrap_or_default());
        }
    });

    let change_status = move |status: TaskStatus| {
        let (Some(api), Some(id)) = (api.try_get_value(), task_id.try_get_value()) else {
            return;
        };
        spawn_local(async move {
            match api.update_task_status(&id, status).await {
                Ok(t) => {
                    task.try_set(Some(t));
                }
                Err(e) => browser::report_failure(&e, "Failed to update status."),
            }
        });
    };

    view! {
      {move || match (task.get(), failed.get()) {
          (None, true) => view! { <p class="empty">"Task not found."</p> }.into_view(),
          (None, false) => view! { <Loading label="Loading task..."/> }.into_view(),
          (Some(t), _) => {
              let me = me.clone();
              let is_manager = me.as_ref().is_some_and(User::is_manager);
              let is_assignee = me.as_ref().is_some_and(|u| t.is_assigned_to(&u.id));
              let can_change_status = is_manager || is_assignee;
              let can_submit = is_assignee && t.status == TaskStatus::InProgress;
              let can_approve = is_manager && t.status == TaskStatus::InReview;
              let current = t.status;
              view! {
                <div class="row spread">
                  <div>
                    <h1>{t.title.clone()}</h1>
                    <p class="meta">{t.description.clone().unwrap_or_default()}</p>
                  </div>
                  {is_manager.then(|| view! {
                    <A href=format!("/tasks/{}/assign", t.id) class="button secondary">"Assign"</A>
                  })}
                </div>

                <div class="grid four">
                  <div class="card">
                    <p class="meta">"Status"</p>
                    {if can_change_status {
                        view! {
                          <select on:change=move |ev| {
                              if let Some(s) = TaskStatus::parse(&event_target_value(&ev)) {
                                  change_status(s);
                              }
                          }>
                            {TaskStatus::ALL
                                .into_iter()
                                .map(|s| view! {
                                  <option value=s.as_str() selected={s == current}>{s.label()}</option>
                                })
                                .collect_view()}
                          </select>
                        }
                        .into_view()
                    } else {
                        view! { <span class=status_class(current)>{current.label()}</span> }.into_view()
                    }}
                  </div>
                  <div class="card">
                    <p class="meta">"Priority"</p>
                    <span class=priority_class(t.priority)>{t.priority.as_str()}</span>
                  </div>
                  <div class="card">
                    <p class="meta">"Risk"</p>
                    <span class=risk_class(t.risk_level)>{or_dash(t.risk_level.map(|r| r.as_str()))}</span>
                  </div>
                  <div class="card">
                    <p class="meta">"Assignee"</p>
                    <p>{t.assigned_to.as_ref().map_or_else(|| "Unassigned".to_string(), User::full_name)}</p>
                  </div>
                </div>

                <div class="grid three">
                  <div class="card"><p class="meta">"Story Points"</p><p>{or_dash(t.story_points)}</p></div>
                  <div class="card"><p class="meta">"Hours"</p><p>{format!(
                      "{} logged / {} estimated",
                      t.actual_hours_logged.unwrap_or(0),
                      or_dash(t.estimated_hours)
                  )}</p></div>
                  <div class="card"><p class="meta">"Due"</p><p>{or_dash(t.due_date.as_deref().map(format_timestamp))}</p></div>
                </div>

                {t.ai_generated_summary.clone().map(|summary| view! {
                  <div class="card"><h2>"Summary"</h2><p>{summary}</p></div>
                })}
                {t.pull_request_url.clone().map(|url| view! {
                  <div class="card">
                    <h2>"Pull Request"</h2>
                    <a href=url.clone() target="_blank" rel="noreferrer">{url}</a>
                  </div>
                })}

                {can_submit.then(|| view! { <SubmitForReview task=task/> })}
                {can_approve.then(|| view! { <Approve task=task/> })}
              }
              .into_view()
          }
      }}

      <Show when=move || task.with(Option::is_some) fallback=|| ()>
        <Subtasks subtasks=subtasks/>
        <Comments comments=comments/>
      </Show>
    }
}

/// Task id and client for a mutation started from a child of the task page.
fn target(task: RwSignal<Option<Task>>) -> Option<(ApiClient, String)> {
    let id = task.try_with_untracked(|t| t.as_ref().map(|t| t.id.clone())).flatten()?;
    Some((use_app().api, id))
}

#[component]
fn SubmitForReview(task: RwSignal<Option<Task>>) -> impl IntoView {
    let (api, id) = target(task).unzip();
    let pr_url = create_rw_signal(String::new());
    let hours = create_rw_signal(String::new());
    let note = create_rw_signal(String::new());
    let error = create_rw_signal(None::<String>);

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let url = pr_url.get_untracked().trim().to_string();
        if url.is_empty() {
            error.set(Some("Pull request URL is required.".into()));
            return;
        }
        let (Some(api), Some(id)) = (api.clone(), id.clone()) else {
            return;
        };
        let note = note.get_untracked().trim().to_string();
        let request = SubmitForReviewRequest {
            pull_request_url: url,
            actual_hours_logged: hours.get_untracked().trim().parse().ok(),
            comment: (!note.is_empty()).then_some(note),
        };
        error.set(None);
        spawn_local(async move {
            match api.submit_for_review(&id, &request).await {
                Ok(t) => {
                    task.try_set(Some(t));
                }
                Err(e) => browser::report_failure(&e, "Failed to submit for review."),
            }
        });
    };

    view! {
      <form class="card stack" on:submit=submit>
        <h2>"Submit for Review"</h2>
        {move || error.get().map(|e| view! { <p class="error">{e}</p> })}
        <input
          placeholder="Pull request URL"
          prop:value=move || pr_url.get()
          on:input=move |ev| pr_url.set(event_target_value(&ev))
        />
        <input
          type="number"
          min="0"
          placeholder="Hours logged"
          prop:value=move || hours.get()
          on:input=move |ev| hours.set(event_target_value(&ev))
        />
        <textarea
          placeholder="Notes for the reviewer"
          prop:value=move || note.get()
          on:input=move |ev| note.set(event_target_value(&ev))
        ></textarea>
        <button class="primary" type="submit">"Submit"</button>
      </form>
    }
}

#[component]
fn Approve(task: RwSignal<Option<Task>>) -> impl IntoView {
    let (api, id) = target(task).unzip();
    let note = create_rw_signal(String::new());

    let approve = move |_| {
        let (Some(api), Some(id)) = (api.clone(), id.clone()) else {
            return;
        };
        let note = note.get_untracked();
        spawn_local(async move {
            match api.approve_task(&id, &note).await {
                Ok(t) => {
                    task.try_set(Some(t));
                }
                Err(e) => browser::report_failure(&e, "Failed to approve task."),
            }
        });
    };

    view! {
      <div class="card stack">
        <h2>"Review"</h2>
        <textarea
          placeholder="Approval comment"
          prop:value=move || note.get()
          on:input=move |ev| note.set(event_target_value(&ev))
        ></textarea>
        <button class="primary" on:click=approve>"Approve"</button>
      </div>
    }
}

#[component]
fn Subtasks(subtasks: RwSignal<Vec<Subtask>>) -> impl IntoView {
    let ctx = use_app();
    let id = route_id();
    let api = store_value(ctx.api.clone());
    let title = create_rw_signal(String::new());

    let add = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let text = title.get_untracked();
        if text.trim().is_empty() {
            return;
        }
        let Some(api) = api.try_get_value() else {
            return;
        };
        let id = id.clone();
        spawn_local(async move {
            match api.create_subtask(&id, &text).await {
                Ok(s) => {
                    subtasks.try_update(|list| list.push(s));
                    title.try_set(String::new());
                }
                Err(e) => browser::report_failure(&e, "Failed to add subtask."),
            }
        });
    };

    let toggle = move |sub_id: String| {
        let Some(api) = api.try_get_value() else {
            return;
        };
        spawn_local(async move {
            match api.toggle_subtask(&sub_id).await {
                Ok(updated) => {
                    subtasks.try_update(|list| {
                        if let Some(s) = list.iter_mut().find(|s| s.id == updated.id) {
                            *s = updated;
                        }
                    });
                }
                Err(e) => browser::report_failure(&e, "Failed to update subtask."),
            }
        });
    };

    let remove = move |sub_id: String| {
        let Some(api) = api.try_get_value() else {
            return;
        };
        spawn_local(async move {
            match api.delete_subtask(&sub_id).await {
                Ok(()) => {
                    subtasks.try_update(|list| list.retain(|s| s.id != sub_id));
                }
                Err(e) => browser::report_failure(&e, "Failed to delete subtask."),
            }
        });
    };

    let progress = move || {
        subtasks.with(|list| {
            let done = list.iter().filter(|s| s.completed).count();
            format!("{done}/{}", list.len())
        })
    };

    view! {
      <div class="card">
        <div class="row spread">
          <h2>"Subtasks"</h2>
          <span class="meta">{progress}</span>
        </div>
        <Show
          when=move || subtasks.with(|s| !s.is_empty())
          fallback=|| view! { <p class="empty">"No subtasks yet."</p> }
        >
          <For
            each=move || subtasks.get()
            key=|s| (s.id.clone(), s.completed)
            children=move |s: Subtask| {
              let (toggled, removed) = (s.id.clone(), s.id.clone());
              view! {
                <div class="row spread subtask">
                  <label>
                    <input
                      type="checkbox"
                      prop:checked=s.completed
                      on:change=move |_| toggle(toggled.clone())
                    />
                    <span class:done=s.completed>{s.title.clone()}</span>
                  </label>
                  <button class="link danger" on:click=move |_| remove(removed.clone())>"Delete"</button>
                </div>
              }
            }
          />
        </Show>
        <form class="row" on:submit=add>
          <input
            placeholder="New subtask"
            prop:value=move || title.get()
            on:input=move |ev| title.set(event_target_value(&ev))
          />
          <button class="secondary" type="submit">"Add"</button>
        </form>
      </div>
    }
}

#[component]
fn Comments(comments: RwSignal<Vec<Comment>>) -> impl IntoView {
    let ctx = use_app();
    let id = route_id();
    let api = store_value(ctx.api.clone());
    let draft = create_rw_signal(String::new());

    let post = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let content = draft.get_untracked().trim().to_string();
        if content.is_empty() {
            return;
        }
        let Some(api) = api.try_get_value() else {
            return;
        };
        let id = id.clone();
        spawn_local(async move {
            match api.create_comment(&id, &content).await {
                Ok(c) => {
                    comments.try_update(|list| list.push(c));
                    draft.try_set(String::new());
                }
                Err(e) => browser::report_failure(&e, "Failed to add comment."),
            }
        });
    };

    view! {
      <div class="card">
        <h2>"Comments"</h2>
        <Show
          when=move || comments.with(|c| !c.is_empty())
          fallback=|| view! { <p class="empty">"No comments yet."</p> }
        >
          <For
            each=move || comments.get()
            key=|c| c.id.clone()
            children=|c: Comment| view! {
              <div class="comment">
                <p class="meta">
                  {or_dash(c.user.as_ref().map(User::full_name))}
                  " · "
                  {or_dash(c.created_at.as_deref().map(format_timestamp))}
                </p>
                <p>{c.content.clone()}</p>
              </div>
            }
          />
        </Show>
        <form class="stack" on:submit=post>
          <textarea
            placeholder="Write a comment"
            prop:value=move || draft.get()
            on:input=move |ev| draft.set(event_target_value(&ev))
          ></textarea>
          <button class="secondary" type="submit">"Post"</button>
        </form>
      </div>
    }
}

#[component]
pub fn AssignTaskPage() -> impl IntoView {
    let ctx = use_app();
    let navigate = use_navigate();
    let id = route_id();

    let task = create_rw_signal(None::<Task>);
    let developers = create_rw_signal(Vec::<User>::new());
    let recommendations = create_rw_signal(None::<Vec<AssigneeRecommendation>>);
    let picked = create_rw_signal(String::new());
    let saving = create_rw_signal(false);

    spawn_local({
        let api = ctx.api.clone();
        let id = id.clone();
        async move {
            let (t, u, r) =
                futures::join!(api.task(&id), api.users(), api.recommend_assignees(&id));
            match t {
                Ok(t) => {
                    if let Some(current) = &t.assigned_to {
                        picked.try_set(current.id.clone());
                    }
                    task.try_set(Some(t));
                }
                Err(e) => logging::warn!("task {id} failed: {e}"),
            }
            let users = u.unwrap_or_default();
            developers.try_set(users.into_iter().filter(|u| u.role == Role::Developer).collect());
            recommendations.try_set(Some(r.unwrap_or_default()));
        }
    });

    let assign = move |user_id: String| {
        if user_id.is_empty() {
            browser::alert("Select a developer first.");
            return;
        }
        saving.set(true);
        let api = ctx.api.clone();
        let id = id.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            match api.assign_task(&id, &user_id).await {
                Ok(_) => navigate(&format!("/tasks/{id}"), Default::default()),
                Err(e) => browser::report_failure(&e, "Failed to assign task."),
            }
            saving.try_set(false);
        });
    };

    let assign_recommended = assign.clone();

    view! {
      <h1>"Assign Task"</h1>
      {move || task.get().map(|t| view! {
        <p class="meta">{t.title.clone()}</p>
      })}

      <div class="card">
        <h2>"Recommended"</h2>
        {move || match recommendations.get() {
          None => view! { <Loading label="Ranking developers..."/> }.into_view(),
          Some(list) if list.is_empty() => {
              view! { <p class="empty">"No recommendations available."</p> }.into_view()
          }
          Some(list) => list
              .into_iter()
              .map(|r| {
                  let assign = assign_recommended.clone();
                  let user_id = r.user_id.clone();
                  view! {
                    <div class="row spread recommendation">
                      <div>
                        <p class="strong">{format!("{} {}", r.first_name, r.last_name)}</p>
                        <p class="meta">{format!(
                            "{:.0}% match · {}/{} pts",
                            r.match_percentage,
                            r.current_workload,
                            r.max_capacity
                        )}</p>
                        <div class="row wrap">
                          {r.matched_skills
                              .iter()
                              .map(|s| view! { <span class="pill blue">{s.clone()}</span> })
                              .collect_view()}
                        </div>
                      </div>
                      <button
                        class="primary"
                        disabled=move || saving.get()
                        on:click=move |_| assign(user_id.clone())
                      >
                        "Assign"
                      </button>
                    </div>
                  }
              })
              .collect_view(),
        }}
      </div>

      <div class="card row">
        <select on:change=move |ev| picked.set(event_target_value(&ev))>
          <option value="">"Select developer"</option>
          <For
            each=move || developers.get()
            key=|u| u.id.clone()
            children=move |u: User| {
              let value = u.id.clone();
              let is_current = picked.get_untracked() == value;
              view! { <option value=value selected={is_current}>{u.full_name()}</option> }
            }
          />
        </select>
        <button
          class="primary"
          disabled=move || saving.get()
          on:click=move |_| assign(picked.get_untracked())
        >
          {move || if saving.get() { "Assigning..." } else { "Assign" }}
        </button>
      </div>
    }
}
