//! Terminal notifier: keeps a FlowDesk session on disk, polls for unread
//! notifications and rings the bell when new ones arrive.

use flowdesk_core::auth::sign_in;
use flowdesk_core::session::FileStorage;
use flowdesk_core::{
    poller, ApiClient, ClientConfig, LoginError, Navigator, NotificationPoller, SessionStore,
    SoundCue, StorageError,
};
use std::future::Future;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

const DEFAULT_SESSION_FILE: &str = ".flowdesk/session.json";

#[derive(Debug, thiserror::Error)]
enum WatchError {
    #[error("session file: {0}")]
    Storage(#[from] StorageError),
    #[error("no stored session and FLOWDESK_EMAIL / FLOWDESK_PASSWORD are not set")]
    MissingCredentials,
    #[error("sign in failed: {0}")]
    Login(#[from] LoginError),
}

/// There is no page to go to; a redirect to the login route means the
/// session is gone and the watcher should stop.
struct ExpiryNavigator {
    expired: Arc<Notify>,
}

impl Navigator for ExpiryNavigator {
    fn navigate(&self, path: &str) {
        tracing::warn!(path, "session expired");
        self.expired.notify_waiters();
    }
}

struct TerminalBell;

impl SoundCue for TerminalBell {
    fn play(&self) {
        let mut out = std::io::stdout();
        let _ = out.write_all(b"\x07").and_then(|()| out.flush());
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "flowdesk-watch stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), WatchError> {
    let config = ClientConfig::from_env();
    let session_file =
        std::env::var("FLOWDESK_SESSION_FILE").unwrap_or_else(|_| DEFAULT_SESSION_FILE.into());
    let store = Arc::new(SessionStore::new(FileStorage::open(&session_file)?));

    let expired = Arc::new(Notify::new());
    let navigator = Arc::new(ExpiryNavigator {
        expired: expired.clone(),
    });
    let api = ApiClient::standard(config.clone(), store.clone(), navigator);

    ensure_session(&api, &store).await?;
    if let Some(user) = store.user() {
        tracing::info!(user = %user.email, base = %config.base_url, "watching notifications");
    }

    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "no Ctrl-C handler; waiting for expiry only");
            std::future::pending::<()>().await;
        }
    };
    let watcher = Arc::new(NotificationPoller::new(api));
    let stop = watch(
        watcher.clone(),
        config.poll_interval,
        Arc::new(TerminalBell),
        &expired,
        interrupt,
    )
    .await;
    match stop {
        Stop::Interrupted => tracing::info!("interrupted"),
        Stop::Expired => tracing::info!("sign in again to resume"),
    }
    tracing::info!(unread = watcher.unread_count(), "stopped");
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Stop {
    Interrupted,
    Expired,
}

/// Polls until `interrupt` completes or the session expires. The expiry
/// subscription exists before the first request goes out, so a 401 on the
/// initial load is not missed.
async fn watch(
    watcher: Arc<NotificationPoller>,
    every: Duration,
    sound: Arc<dyn SoundCue>,
    expired: &Notify,
    interrupt: impl Future<Output = ()>,
) -> Stop {
    let expiry = expired.notified();
    let handle = poller::spawn(watcher, every, sound);
    let stop = tokio::select! {
        _ = interrupt => Stop::Interrupted,
        _ = expiry => Stop::Expired,
    };
    handle.cancel();
    stop
}

/// Reuses the stored session when the backend still accepts it, otherwise
/// signs in with the credentials from the environment.
async fn ensure_session(api: &ApiClient, store: &SessionStore) -> Result<(), WatchError> {
    if store.is_authenticated() {
        match api.me().await {
            Ok(_) => return Ok(()),
            Err(err) => tracing::info!(error = %err, "stored session rejected"),
        }
    }

    let (Ok(email), Ok(password)) = (
        std::env::var("FLOWDESK_EMAIL"),
        std::env::var("FLOWDESK_PASSWORD"),
    ) else {
        return Err(WatchError::MissingCredentials);
    };
    sign_in(api, store, &email, &password).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowdesk_core::api::{ApiRequest, ApiResponse, HttpTransport};
    use flowdesk_core::models::{Role, User};
    use flowdesk_core::{ApiError, Session};

    /// Every call is answered with 401.
    struct Expired;

    #[async_trait::async_trait]
    impl HttpTransport for Expired {
        async fn execute(&self, _url: &str, _request: &ApiRequest) -> Result<ApiResponse, ApiError> {
            Ok(ApiResponse::new(401, r#"{"message":"Token expired"}"#))
        }
    }

    fn signed_in_store() -> Arc<SessionStore> {
        let store = Arc::new(SessionStore::in_memory());
        let user = User {
            id: "u-1".into(),
            first_name: "Sam".into(),
            last_name: "Rivera".into(),
            email: "sam@flowdesk.io".into(),
            role: Role::Developer,
            skills: Vec::new(),
            current_workload_points: None,
            max_capacity_points: None,
            created_at: None,
        };
        store.set(&Session::new("jwt-1", user)).expect("set");
        store
    }

    #[tokio::test]
    async fn stops_when_the_first_load_is_rejected() {
        let store = signed_in_store();
        let expired = Arc::new(Notify::new());
        let api = ApiClient::builder(ClientConfig::new("http://flowdesk.test/api"))
            .transport(Expired)
            .session(
                store.clone(),
                Arc::new(ExpiryNavigator {
                    expired: expired.clone(),
                }),
            )
            .build();

        let stop = tokio::time::timeout(
            Duration::from_secs(5),
            watch(
                Arc::new(NotificationPoller::new(api)),
                Duration::from_secs(3600),
                Arc::new(flowdesk_core::poller::Silent),
                &expired,
                std::future::pending(),
            ),
        )
        .await
        .expect("watch should stop on expiry");

        assert_eq!(stop, Stop::Expired);
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn interrupt_stops_polling() {
        let expired = Notify::new();
        let api = ApiClient::builder(ClientConfig::new("http://flowdesk.test/api"))
            .transport(Expired)
            .build();

        let stop = watch(
            Arc::new(NotificationPoller::new(api)),
            Duration::from_secs(3600),
            Arc::new(flowdesk_core::poller::Silent),
            &expired,
            async {},
        )
        .await;
        assert_eq!(stop, Stop::Interrupted);
    }
}
