use crate::app::use_app;
use crate::components::layout::AuthLayout;
use flowdesk_core::auth::{register, RegisterForm};
use flowdesk_core::models::Role;
use leptos::*;
use leptos_router::{use_navigate, A};

#[component]
pub fn RegisterPage() -> impl IntoView {
    let ctx = use_app();
    let navigate = use_navigate();
    let form = create_rw_signal(RegisterForm::default());
    let skill_input = create_rw_signal(String::new());
    let error = create_rw_signal(None::<String>);
    let loading = create_rw_signal(false);

    let add_skill = move || {
        let skill = skill_input.get_untracked();
        form.update(|f| {
            if f.add_skill(&skill) {
                skill_input.set(String::new());
            }
        });
    };

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        error.set(None);
        loading.set(true);

        let api = ctx.api.clone();
        let store = ctx.store().clone();
        let navigate = navigate.clone();
        let current = form.get_untracked();
        spawn_local(async move {
            match register(&api, &store, &current).await {
                Ok(_) => navigate("/", Default::default()),
                Err(e) => {
                    error.try_set(Some(e.to_string()));
                }
            }
            loading.try_set(false);
        });
    };

    view! {
      <AuthLayout title="Create Your Account" subtitle="Join FlowDesk and manage tasks effortlessly.">
        <Show when=move || error.get().is_some() fallback=|| ()>
          <p class="error">{move || error.get().unwrap_or_default()}</p>
        </Show>
        <form class="stack" on:submit=submit>
          <div class="grid two">
            {text_input(form, "text", "First Name", |f| &f.first_name, |f, v| f.first_name = v)}
            {text_input(form, "text", "Last Name", |f| &f.last_name, |f, v| f.last_name = v)}
          </div>
          {text_input(form, "email", "Email", |f| &f.email, |f, v| f.email = v)}
          <div class="grid two">
            {text_input(form, "password", "Password", |f| &f.password, |f, v| f.password = v)}
            {text_input(form, "password", "Confirm Password", |f| &f.confirm_password, |f, v| f.confirm_password = v)}
          </div>
          <select on:change=move |ev| {
              let role = match event_target_value(&ev).as_str() {
                  "MANAGER" => Some(Role::Manager),
                  "DEVELOPER" => Some(Role::Developer),
                  _ => None,
              };
              form.update(|f| f.role = role);
          }>
            <option value="">"Select Role"</option>
            <option value="MANAGER">"Manager"</option>
            <option value="DEVELOPER">"Developer"</option>
          </select>

          <Show when=move || form.with(|f| f.role == Some(Role::Developer)) fallback=|| ()>
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
                      <button type="button" class="link" on:click=move |_| form.update(|f| f.remove_skill(&removed))>"×"</button>
                    </span>
                  }
                }
              />
            </div>
          </Show>

          <button class="primary" type="submit" disabled=move || loading.get()>
            {move || if loading.get() { "Creating..." } else { "Register" }}
          </button>
        </form>
        <p class="meta">"Already have an account? " <A href="/login">"Login"</A></p>
      </AuthLayout>
    }
}

fn text_input(
    form: RwSignal<RegisterForm>,
    kind: &'static str,
    placeholder: &'static str,
    get: fn(&RegisterForm) -> &String,
    set: fn(&mut RegisterForm, String),
) -> impl IntoView {
    view! {
      <input
        type=kind
        placeholder=placeholder
        prop:value=move || form.with(|f| get(f).clone())
        on:input=move |ev| form.update(|f| set(f, event_target_value(&ev)))
      />
    }
}
