use crate::app::use_app;
use crate::browser;
use flowdesk_core::models::{Role, UpdateUserRequest};
use flowdesk_core::Session;
use leptos::*;

#[component]
pub fn ProfilePage() -> impl IntoView {
    let ctx = use_app();
    let Some(user) = ctx.user() else {
        return view! { <p class="empty">"Not signed in."</p> }.into_view();
    };

    let form = create_rw_signal(UpdateUserRequest {
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        skills: user.skills.clone(),
    });
    let skill_input = create_rw_signal(String::new());
    let saving = create_rw_signal(false);
    let is_developer = user.role == Role::Developer;

    let add_skill = move || {
        let skill = skill_input.get_untracked().trim().to_string();
        if skill.is_empty() || form.with_untracked(|f| f.skills.contains(&skill)) {
            return;
        }
        form.update(|f| f.skills.push(skill));
        skill_input.set(String::new());
    };

    let save = {
        let ctx = ctx.clone();
        let user_id = user.id.clone();
        move |ev: ev::SubmitEvent| {
            ev.prevent_default();
            let request = form.get_untracked();
            saving.set(true);
            let api = ctx.api.clone();
            let store = ctx.store().clone();
            let user_id = user_id.clone();
            spawn_local(async move {
                match api.update_user(&user_id, &request).await {
                    Ok(updated) => {
                        // Keep the persisted user in step with the server copy.
                        if let Some(token) = store.token() {
                            if let Err(e) = store.set(&Session::new(token, updated)) {
                                logging::warn!("profile not persisted: {e}");
                            }
                        }
                        browser::alert("Profile updated.");
                    }
                    Err(e) => browser::report_failure(&e, "Failed to update profile."),
                }
                saving.try_set(false);
            });
        }
    };

    view! {
      <h1>"Profile"</h1>
      <div class="card">
        <p class="strong">{user.email.clone()}</p>
        <p class="meta upper">{user.role.as_str()}</p>
        {user.current_workload_points.map(|load| view! {
          <p class="meta">{format!(
              "Workload: {load}/{} pts",
              user.max_capacity_points.unwrap_or(0)
          )}</p>
        })}
      </div>
      <form class="card stack" on:submit=save>
        <div class="grid two">
          <input
            placeholder="First name"
            prop:value=move || form.with(|f| f.first_name.clone())
            on:input=move |ev| form.update(|f| f.first_name = event_target_value(&ev))
          />
          <input
            placeholder="Last name"
            prop:value=move || form.with(|f| f.last_name.clone())
            on:input=move |ev| form.update(|f| f.last_name = event_target_value(&ev))
          />
        </div>

        <Show when=move || is_developer fallback=|| ()>
          <div class="row">
            <input
              placeholder="Add a skill"
              prop:value=move || skill_input.get()
              on:input=move |ev| skill_input.set(event_target_value(&ev))
            />
            <button type="button" on:click=move |_| add_skill()>"Add"</button>
          </div>
          <div class="row wrap">
            <For
              each=move || form.with(|f| f.skills.clone())
              key=|s| s.clone()
              children=move |skill: String| {
                let removed = skill.clone();
                view! {
                  <span class="pill blue">
                    {skill}
                    <button
                      type="button"
                      class="link"
                      on:click=move |_| form.update(|f| f.skills.retain(|s| *s != removed))
                    >
                      "×"
                    </button>
                  </span>
                }
              }
            />
          </div>
        </Show>

        <button class="primary" type="submit" disabled=move || saving.get()>
          {move || if saving.get() { "Saving..." } else { "Save" }}
        </button>
      </form>
    }
    .into_view()
}
