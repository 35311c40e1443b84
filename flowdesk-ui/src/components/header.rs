use crate::app::use_app;
use crate::browser::Chime;
use crate::components::widgets::format_timestamp;
use flowdesk_core::auth::sign_out;
use flowdesk_core::models::Notification;
use flowdesk_core::NotificationPoller;
use leptos::*;
use leptos_router::use_navigate;
use std::sync::Arc;

#[component]
pub fn Header() -> impl IntoView {
    let ctx = use_app();
    let navigate = store_value(use_navigate());
    let store = store_value(ctx.store().clone());

    let profile_open = create_rw_signal(false);
    let bell_open = create_rw_signal(false);
    let notifications = create_rw_signal(Vec::<Notification>::new());
    let unread = create_rw_signal(0u64);

    let poller = store_value(Arc::new(NotificationPoller::new(ctx.api.clone())));
    let chime = store_value(Chime::new(
        &ctx.config.notification_sound,
        ctx.config.sound_volume,
    ));

    // Async completions may land after unmount, hence try_set.
    let sync = move |p: &NotificationPoller| {
        let snap = p.snapshot();
        unread.try_set(snap.unread_count);
        notifications.try_set(snap.notifications);
    };

    let initial = poller.get_value();
    spawn_local(async move {
        initial.load().await;
        sync(&initial);
    });

    let started = set_interval_with_handle(
        move || {
            let Some(p) = poller.try_get_value() else {
                return;
            };
            spawn_local(async move {
                let outcome = p.tick().await;
                sync(&p);
                if outcome.is_arrival() {
                    chime.try_with_value(Chime::play);
                }
            });
        },
        ctx.config.poll_interval,
    );
    match started {
        Ok(handle) => on_cleanup(move || handle.clear()),
        Err(e) => logging::error!("notification polling not started: {e:?}"),
    }

    let open_notification = move |n: Notification| {
        bell_open.set(false);
        let Some(p) = poller.try_get_value() else {
            return;
        };
        spawn_local(async move {
            let target = p.open(&n).await;
            sync(&p);
            if let Some(route) = target {
                navigate.try_with_value(|go| go(&route.path(), Default::default()));
            }
        });
    };

    let mark_all = move |_| {
        let p = poller.get_value();
        unread.set(0);
        spawn_local(async move {
            let result = p.mark_all_read().await;
            sync(&p);
            if let Err(e) = result {
                logging::warn!("mark all read failed: {e}");
            }
        });
    };

    let logout = move |_| {
        store.with_value(|s| sign_out(s));
        navigate.with_value(|go| go("/login", Default::default()));
    };

    let user = ctx.user();
    let first_name = user
        .as_ref()
        .map(|u| u.first_name.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "User".into());
    let go_home = move |_| navigate.with_value(|go| go("/", Default::default()));

    view! {
      <header class="header">
        <div class="brand" on:click=go_home>
          <h1>"FlowDesk"</h1>
        </div>

        <nav class="header-actions">
          <button class="link" on:click=go_home>"Dashboard"</button>

          <div class="dropdown">
            <div class="bell" on:click=move |_| bell_open.update(|o| *o = !*o)>
              <span class="icon">"🔔"</span>
              <Show when=move || { unread.get() > 0 } fallback=|| ()>
                <span class="badge-count">{move || unread.get()}</span>
              </Show>
            </div>

            <Show when=move || bell_open.get() fallback=|| ()>
              <div class="dropdown-panel notifications">
                <div class="dropdown-head">
                  <h3>"Notifications"</h3>
                  <button class="link" on:click=mark_all>"Mark all as read"</button>
                </div>
                <Show
                  when=move || notifications.with(|n| !n.is_empty())
                  fallback=|| view! { <p class="empty">"No notifications"</p> }
                >
                  <For
                    each=move || notifications.get()
                    key=|n| (n.id.clone(), n.read)
                    children=move |n: Notification| {
                      let class = if n.read { "notification" } else { "notification unread" };
                      let clicked = n.clone();
                      view! {
                        <div class=class on:click=move |_| open_notification(clicked.clone())>
                          <p>{n.message.clone()}</p>
                          <p class="meta">{format_timestamp(&n.created_at)}</p>
                        </div>
                      }
                    }
                  />
                </Show>
              </div>
            </Show>
          </div>

          <div class="dropdown">
            <div class="profile" on:click=move |_| profile_open.update(|o| *o = !*o)>
              <span class="icon">"👤"</span>
              <span>{first_name}</span>
            </div>
            <Show when=move || profile_open.get() fallback=|| ()>
              {
                let user = user.clone();
                view! {
                  <div class="dropdown-panel profile-menu">
                    {user.map(|u| view! {
                      <div class="profile-head">
                        <p class="strong">{u.full_name()}</p>
                        <p class="meta">{u.email.clone()}</p>
                        <p class="meta upper">{u.role.as_str()}</p>
                      </div>
                    })}
                    <a href="/profile">"Profile"</a>
                    <button class="danger" on:click=logout>"Logout"</button>
                  </div>
                }
              }
            </Show>
          </div>
        </nav>
      </header>
    }
}
