use crate::components::header::Header;
use leptos::*;

#[component]
pub fn DashboardLayout(children: Children) -> impl IntoView {
    view! {
      <div class="dashboard">
        <Header/>
        <section class="content">{children()}</section>
      </div>
    }
}

/// Centered card used by the login and register pages.
#[component]
pub fn AuthLayout(title: &'static str, subtitle: &'static str, children: Children) -> impl IntoView {
    view! {
      <div class="auth-screen">
        <div class="auth-card">
          <h1>{title}</h1>
          <p class="meta">{subtitle}</p>
          {children()}
        </div>
      </div>
    }
}
