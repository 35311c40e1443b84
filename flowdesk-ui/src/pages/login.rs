use crate::app::use_app;
use crate::components::layout::AuthLayout;
use flowdesk_core::auth::sign_in;
use leptos::*;
use leptos_router::{use_navigate, A};

#[component]
pub fn LoginPage() -> impl IntoView {
    let ctx = use_app();
    let navigate = use_navigate();
    let email = create_rw_signal(String::new());
    let password = create_rw_signal(String::new());
    let error = create_rw_signal(None::<String>);
    let loading = create_rw_signal(false);

    let submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        error.set(None);
        loading.set(true);

        let api = ctx.api.clone();
        let store = ctx.store().clone();
        let navigate = navigate.clone();
        let (email, password) = (email.get_untracked(), password.get_untracked());
        spawn_local(async move {
            match sign_in(&api, &store, &email, &password).await {
                Ok(session) => {
                    logging::log!("signed in as {}", session.user.role.as_str());
                    navigate("/", Default::default());
                }
                Err(e) => {
                    logging::warn!("login failed: {e:?}");
                    error.try_set(Some(e.to_string()));
                }
            }
            loading.try_set(false);
        });
    };

    view! {
      <AuthLayout title="Welcome Back" subtitle="Sign in to continue to FlowDesk">
        <Show when=move || error.get().is_some() fallback=|| ()>
          <p class="error">{move || error.get().unwrap_or_default()}</p>
        </Show>
        <form class="stack" on:submit=submit>
          <input
            type="email"
            placeholder="Email"
            required=true
            prop:value=move || email.get()
            on:input=move |ev| email.set(event_target_value(&ev))
          />
          <input
            type="password"
            placeholder="Password"
            required=true
            prop:value=move || password.get()
            on:input=move |ev| password.set(event_target_value(&ev))
          />
          <button class="primary" type="submit" disabled=move || loading.get()>
            {move || if loading.get() { "Signing in..." } else { "Login" }}
          </button>
        </form>
        <p class="meta">"Don't have an account? " <A href="/register">"Register"</A></p>
      </AuthLayout>
    }
}
