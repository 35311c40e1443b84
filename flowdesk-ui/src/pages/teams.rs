use crate::app::use_app;
use crate::browser;
use crate::components::widgets::{or_dash, Loading, StatCard, WorkloadBar};
use crate::pages::projects::route_id;
use flowdesk_core::models::{CreateTeamRequest, Team, TeamWorkload, User};
use flowdesk_core::workload::{is_overloaded, is_underloaded, reassignment_suggestions, Reassignment};
use leptos::*;
use leptos_router::{use_navigate, A};

#[component]
pub fn TeamsPage() -> impl IntoView {
    let ctx = use_app();
    let teams = create_rw_signal(None::<Vec<Team>>);
    let is_manager = ctx.user().is_some_and(|u| u.is_manager());

    let api = ctx.api.clone();
    spawn_local(async move {
        let loaded = api.teams().await.unwrap_or_else(|e| {
            logging::warn!("teams failed: {e}");
            Vec::new()
        });
        teams.try_set(Some(loaded));
    });

    view! {
      <div class="row spread">
        <h1>"Teams"</h1>
        <Show when=move || is_manager fallback=|| ()>
          <A href="/teams/create" class="button primary">"+ Create Team"</A>
        </Show>
      </div>
      {move || match teams.get() {
          None => view! { <Loading label="Loading teams..."/> }.into_view(),
          Some(list) if list.is_empty() => view! { <p class="empty">"No teams yet."</p> }.into_view(),
          Some(list) => view! {
            <div class="grid three">
              {list
                  .into_iter()
                  .map(|t| view! {
                    <A href=format!("/teams/{}", t.id) class="card">
                      <h3>{t.name.clone()}</h3>
                      <p class="meta">{t.description.clone().unwrap_or_default()}</p>
                      <p class="meta">{format!("{} members", t.members.len())}</p>
                    </A>
                  })
                  .collect_view()}
            </div>
          }
          .into_view(),
      }}
    }
}

#[component]
pub fn TeamDetailPage() -> impl IntoView {
    let ctx = use_app();
    let id = route_id();
    let team = create_rw_signal(None::<Team>);
    let workload = create_rw_signal(None::<TeamWorkload>);
    let users = create_rw_signal(Vec::<User>::new());
    let picked = create_rw_signal(String::new());
    let failed = create_rw_signal(false);
    let is_manager = ctx.user().is_some_and(|u| u.is_manager());

    let api = ctx.api.clone();
    let team_id = id.clone();
    spawn_local(async move {
        let (t, w, u) = futures::join!(api.team(&team_id), api.team_workload(&team_id), api.users());
        match t {
            Ok(t) => {
                team.try_set(Some(t));
            }
            Err(e) => {
                logging::warn!("team {team_id} failed: {e}");
                failed.try_set(true);
            }
        }
        if let Ok(w) = w {
            workload.try_set(Some(w));
        }
        if let Ok(u) = u {
            users.try_set(u);
        }
    });

    let add_member = {
        let api = ctx.api.clone();
        let team_id = id.clone();
        move |_| {
            let user_id = picked.get_untracked();
            if user_id.is_empty() {
                return;
            }
            let api = api.clone();
            let team_id = team_id.clone();
            spawn_local(async move {
                match api.add_team_member(&team_id, &user_id).await {
                    Ok(t) => {
                        team.try_set(Some(t));
                        picked.try_set(String::new());
                    }
                    Err(e) => browser::report_failure(&e, "Failed to add member."),
                }
            });
        }
    };

    // Users not already on the team.
    let candidates = move || {
        let members: Vec<String> =
            team.with(|t| t.iter().flat_map(|t| t.members.iter().map(|m| m.id.clone())).collect());
        users.with(|all| {
            all.iter()
                .filter(|u| !members.contains(&u.id))
                .cloned()
                .collect::<Vec<_>>()
        })
    };

    let workload_href = format!("/teams/{id}/workload");

    view! {
      {move || match (team.get(), failed.get()) {
          (None, true) => view! { <p class="empty">"Team not found."</p> }.into_view(),
          (None, false) => view! { <Loading label="Loading team..."/> }.into_view(),
          (Some(t), _) => {
              let href = workload_href.clone();
              view! {
                <div class="row spread">
                  <div>
                    <h1>{t.name.clone()}</h1>
                    <p class="meta">{t.description.clone().unwrap_or_default()}</p>
                  </div>
                  <Show when=move || is_manager fallback=|| ()>
                    <A href=href.clone() class="button secondary">"Workload Balance"</A>
                  </Show>
                </div>
                <div class="card">
                  <h2>"Members"</h2>
                  {if t.members.is_empty() {
                      view! { <p class="empty">"No members yet."</p> }.into_view()
                  } else {
                      t.members
                          .iter()
                          .map(|m| view! {
                            <div class="row spread member">
                              <span>{m.full_name()}</span>
                              <span class="meta">{m.email.clone()}</span>
                              <span class="pill gray">{m.role.as_str()}</span>
                            </div>
                          })
                          .collect_view()
                  }}
                </div>
              }
              .into_view()
          }
      }}

      <Show when=move || is_manager && team.with(Option::is_some) fallback=|| ()>
        <div class="card row">
          <select on:change=move |ev| picked.set(event_target_value(&ev))>
            <option value="">"Add member..."</option>
            <For
              each=candidates
              key=|u| u.id.clone()
              children=|u: User| view! { <option value=u.id.clone()>{u.full_name()}</option> }
            />
          </select>
          <button class="primary" on:click=add_member.clone()>"Add"</button>
        </div>
      </Show>

      {move || workload.get().map(|w| view! {
        <div class="card">
          <h2>"Workload"</h2>
          {w.members
              .into_iter()
              .map(|m| view! {
                <WorkloadBar name=m.user.full_name() load=m.current_workload capacity=m.max_capacity/>
              })
              .collect_view()}
        </div>
      })}
    }
}

#[component]
pub fn CreateTeamPage() -> impl IntoView {
    let ctx = use_app();
    let navigate = use_navigate();
    let form = create_rw_signal(CreateTeamRequest::default());
    let error = create_rw_signal(None::<String>);
    let saving = create_rw_signal(false);

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let request = form.get_untracked();
        if request.name.trim().is_empty() {
            error.set(Some("Team name is required.".into()));
            return;
        }
        error.set(None);
        saving.set(true);
        let api = ctx.api.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            match api.create_team(&request).await {
                Ok(t) => navigate(&format!("/teams/{}", t.id), Default::default()),
                Err(e) => {
                    error.try_set(e.user_notice("Failed to create team.").map(ToString::to_string));
                }
            }
            saving.try_set(false);
        });
    };

    view! {
      <h1>"Create Team"</h1>
      <Show when=move || error.get().is_some() fallback=|| ()>
        <p class="error">{move || error.get().unwrap_or_default()}</p>
      </Show>
      <form class="card stack" on:submit=submit>
        <input
          placeholder="Team name"
          prop:value=move || form.with(|f| f.name.clone())
          on:input=move |ev| form.update(|f| f.name = event_target_value(&ev))
        />
        <textarea
          placeholder="Description"
          prop:value=move || form.with(|f| f.description.clone())
          on:input=move |ev| form.update(|f| f.description = event_target_value(&ev))
        ></textarea>
        <button class="primary" type="submit" disabled=move || saving.get()>
          {move || if saving.get() { "Creating..." } else { "Create Team" }}
        </button>
      </form>
    }
}

#[component]
pub fn TeamWorkloadPage() -> impl IntoView {
    let ctx = use_app();
    let id = route_id();
    let workload = create_rw_signal(None::<TeamWorkload>);
    let failed = create_rw_signal(false);

    let load = {
        let api = ctx.api.clone();
        let id = id.clone();
        move || {
            let api = api.clone();
            let id = id.clone();
            spawn_local(async move {
                match api.team_workload(&id).await {
                    Ok(w) => {
                        workload.try_set(Some(w));
                    }
                    Err(e) => {
                        logging::warn!("workload for team {id} failed: {e}");
                        failed.try_set(true);
                    }
                }
            });
        }
    };
    load();

    let apply = {
        let api = ctx.api.clone();
        let load = load.clone();
        move |r: Reassignment| {
            let prompt = format!(
                "Reassign \"{}\" from {} to {}?",
                r.task.title,
                r.from.full_name(),
                r.to.full_name()
            );
            if !browser::confirm(&prompt) {
                return;
            }
            let api = api.clone();
            let load = load.clone();
            spawn_local(async move {
                match api.assign_task(&r.task.id, &r.to.id).await {
                    Ok(_) => {
                        browser::alert("Task reassigned.");
                        load();
                    }
                    Err(e) => browser::report_failure(&e, "Failed to reassign task."),
                }
            });
        }
    };

    view! {
      <h1>"Workload Balance"</h1>
      {move || match (workload.get(), failed.get()) {
          (None, true) => view! { <p class="empty">"Failed to load workload."</p> }.into_view(),
          (None, false) => view! { <Loading label="Loading workload..."/> }.into_view(),
          (Some(w), _) => {
              let suggestions = reassignment_suggestions(&w);
              let apply = apply.clone();
              view! {
                <div class="grid three">
                  <StatCard title="Team" value=or_dash(w.team_name.clone()) color="#3b82f6"/>
                  <StatCard
                    title="Average Utilization"
                    value=format!("{:.0}%", w.average_utilization)
                    color="#f59e0b"
                  />
                  <StatCard
                    title="Balanced"
                    value=if w.balanced { "Yes" } else { "No" }
                    color=if w.balanced { "#10b981" } else { "#ef4444" }
                  />
                </div>

                <div class="card">
                  <h2>"Members"</h2>
                  {w.members
                      .iter()
                      .map(|m| {
                          let tag = if is_overloaded(m) {
                              Some(("Overloaded", "pill red"))
                          } else if is_underloaded(m) {
                              Some(("Available", "pill green"))
                          } else {
                              None
                          };
                          view! {
                            <div class="row spread">
                              <WorkloadBar
                                name=m.user.full_name()
                                load=m.current_workload
                                capacity=m.max_capacity
                              />
                              {tag.map(|(label, class)| view! { <span class=class>{label}</span> })}
                            </div>
                          }
                      })
                      .collect_view()}
                </div>

                <div class="card">
                  <h2>"Suggested Reassignments"</h2>
                  {if suggestions.is_empty() {
                      view! { <p class="empty">"No reassignments needed."</p> }.into_view()
                  } else {
                      suggestions
                          .into_iter()
                          .map(|r| {
                              let apply = apply.clone();
                              let picked = r.clone();
                              view! {
                                <div class="row spread">
                                  <span>{r.task.title.clone()}</span>
                                  <span class="meta">{format!(
                                      "{} pts: {} → {}",
                                      r.task.story_points.unwrap_or(0),
                                      r.from.full_name(),
                                      r.to.full_name()
                                  )}</span>
                                  <button class="primary" on:click=move |_| apply(picked.clone())>"Apply"</button>
                                </div>
                              }
                          })
                          .collect_view()
                  }}
                </div>
              }
              .into_view()
          }
      }}
    }
}
