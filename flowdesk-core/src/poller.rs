//! Unread-notification polling.
//!
//! Every fetch is tagged with the next value of a monotonic counter. The list
//! and the count each keep the sequence of the last applied result, and a
//! completion carrying an older sequence is dropped, so a slow response can
//! never overwrite a newer one.

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::guard::Route;
use crate::models::Notification;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The unread count went up; the host should play its cue once.
    Arrived { previous: u64, current: u64 },
    Updated(u64),
    Stale,
    Failed,
}

impl TickOutcome {
    pub fn is_arrival(&self) -> bool {
        matches!(self, TickOutcome::Arrived { .. })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PollerSnapshot {
    pub notifications: Vec<Notification>,
    pub unread_count: u64,
}

#[derive(Default)]
struct State {
    notifications: Vec<Notification>,
    unread_count: u64,
    list_seq: u64,
    count_seq: u64,
}

pub struct NotificationPoller {
    api: ApiClient,
    seq: AtomicU64,
    state: Mutex<State>,
}

impl NotificationPoller {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            seq: AtomicU64::new(0),
            state: Mutex::new(State::default()),
        }
    }

    pub fn unread_count(&self) -> u64 {
        self.state().unread_count
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state().notifications.clone()
    }

    pub fn snapshot(&self) -> PollerSnapshot {
        let state = self.state();
        PollerSnapshot {
            notifications: state.notifications.clone(),
            unread_count: state.unread_count,
        }
    }

    /// Fetches the list and the count concurrently. Failures keep the
    /// previous values.
    pub async fn load(&self) {
        let seq = self.next_seq();
        let (list, count) = futures::join!(self.api.notifications(), self.api.unread_count());

        match list {
            Ok(list) => {
                let mut state = self.state();
                if seq > state.list_seq {
                    state.list_seq = seq;
                    state.notifications = list;
                }
            }
            Err(err) => tracing::warn!(error = %err, "notification list refresh failed"),
        }
        match count {
            Ok(count) => {
                self.apply_count(seq, count);
            }
            Err(err) => tracing::warn!(error = %err, "unread count refresh failed"),
        }
    }

    /// One polling step: refreshes only the unread count.
    pub async fn tick(&self) -> TickOutcome {
        let seq = self.next_seq();
        match self.api.unread_count().await {
            Ok(count) => self.apply_count(seq, count),
            Err(err) => {
                tracing::warn!(error = %err, "unread count poll failed");
                TickOutcome::Failed
            }
        }
    }

    /// Marks one notification read (failure is only logged), reloads, and
    /// returns the task it links to.
    pub async fn open(&self, notification: &Notification) -> Option<Route> {
        if let Err(err) = self.api.mark_notification_read(&notification.id).await {
            tracing::warn!(id = %notification.id, error = %err, "mark read failed");
        }
        self.load().await;
        notification.task_id.clone().map(Route::Task)
    }

    /// Zeroes the count immediately, then reconciles with the server whether
    /// or not the request succeeded.
    pub async fn mark_all_read(&self) -> Result<(), ApiError> {
        let seq = self.next_seq();
        {
            let mut state = self.state();
            state.count_seq = state.count_seq.max(seq);
            state.unread_count = 0;
            state.list_seq = state.list_seq.max(seq);
            for n in &mut state.notifications {
                n.read = true;
            }
        }

        let result = self.api.mark_all_notifications_read().await;
        if let Err(err) = &result {
            tracing::warn!(error = %err, "mark all read failed");
        }
        self.load().await;
        result
    }

    fn apply_count(&self, seq: u64, count: u64) -> TickOutcome {
        let mut state = self.state();
        if seq <= state.count_seq {
            tracing::debug!(seq, latest = state.count_seq, "discarding stale unread count");
            return TickOutcome::Stale;
        }
        let previous = state.unread_count;
        state.count_seq = seq;
        state.unread_count = count;
        if count > previous {
            TickOutcome::Arrived {
                previous,
                current: count,
            }
        } else {
            TickOutcome::Updated(count)
        }
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Plays the new-notification sound. One instance lives for the whole
/// polling lifetime.
pub trait SoundCue: Send + Sync + 'static {
    fn play(&self);
}

pub struct Silent;

impl SoundCue for Silent {
    fn play(&self) {}
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::{spawn, PollerHandle};

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use super::{NotificationPoller, SoundCue};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::task::JoinHandle;
    use tokio::time::MissedTickBehavior;

    /// Owns the polling task. Dropping the handle stops it.
    pub struct PollerHandle {
        task: JoinHandle<()>,
    }

    impl PollerHandle {
        pub fn cancel(&self) {
            self.task.abort();
        }

        pub fn is_finished(&self) -> bool {
            self.task.is_finished()
        }
    }

    impl Drop for PollerHandle {
        fn drop(&mut self) {
            self.task.abort();
        }
    }

    /// Loads once, then ticks every `every`. Ticks run one after another.
    pub fn spawn(
        poller: Arc<NotificationPoller>,
        every: Duration,
        sound: Arc<dyn SoundCue>,
    ) -> PollerHandle {
        let task = tokio::spawn(async move {
            poller.load().await;
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if poller.tick().await.is_arrival() {
                    sound.play();
                }
            }
        });
        PollerHandle { task }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{harness, signed_in, Harness};
    use crate::api::{ApiRequest, ApiResponse, HttpTransport};
    use crate::config::ClientConfig;
    use crate::models::Role;
    use futures::channel::oneshot;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::time::Duration;

    fn notification(id: &str, task: Option<&str>) -> serde_json::Value {
        json!({
            "id": id,
            "type": "TASK_ASSIGNED",
            "message": "You were assigned a task",
            "taskId": task,
            "isRead": false,
            "createdAt": "2024-05-01T10:00:00"
        })
    }

    fn signed_in_harness() -> Harness {
        let h = harness();
        signed_in(&h, Role::Developer);
        h
    }

    #[tokio::test]
    async fn load_fills_list_and_count() {
        let h = signed_in_harness();
        h.transport
            .reply(200, json!([notification("n-1", Some("t-1"))]))
            .reply(200, json!({"count": 1}));

        let poller = NotificationPoller::new(h.api.clone());
        poller.load().await;

        let snap = poller.snapshot();
        assert_eq!(snap.unread_count, 1);
        assert_eq!(snap.notifications.len(), 1);
        assert!(!snap.notifications[0].read);
        let paths: Vec<String> = h.transport.sent().iter().map(|(u, _)| u.clone()).collect();
        assert!(paths.iter().any(|u| u.ends_with("/notifications")));
        assert!(paths.iter().any(|u| u.ends_with("/notifications/unread-count")));
    }

    #[tokio::test]
    async fn sound_fires_only_on_strict_increase() {
        let h = signed_in_harness();
        h.transport.reply(200, json!([])).reply(200, json!({"count": 2}));
        for count in [2, 5, 5, 3] {
            h.transport.reply(200, json!({ "count": count }));
        }

        let poller = NotificationPoller::new(h.api.clone());
        poller.load().await;
        let mut outcomes = Vec::new();
        for _ in 0..4 {
            outcomes.push(poller.tick().await);
        }

        assert_eq!(
            outcomes,
            vec![
                TickOutcome::Updated(2),
                TickOutcome::Arrived {
                    previous: 2,
                    current: 5
                },
                TickOutcome::Updated(5),
                TickOutcome::Updated(3),
            ]
        );
        assert_eq!(outcomes.iter().filter(|o| o.is_arrival()).count(), 1);
        assert_eq!(poller.unread_count(), 3);
    }

    #[tokio::test]
    async fn failed_poll_keeps_previous_count() {
        let h = signed_in_harness();
        h.transport
            .reply(200, json!([]))
            .reply(200, json!({"count": 4}))
            .fail(ApiError::Network("offline".into()))
            .reply(503, json!({}));

        let poller = NotificationPoller::new(h.api.clone());
        poller.load().await;
        assert_eq!(poller.tick().await, TickOutcome::Failed);
        assert_eq!(poller.tick().await, TickOutcome::Failed);
        assert_eq!(poller.unread_count(), 4);
        assert!(h.store.is_authenticated());
    }

    #[tokio::test]
    async fn mark_all_read_twice_stays_at_zero() {
        let h = signed_in_harness();
        h.transport
            .reply(200, json!([notification("n-1", None)]))
            .reply(200, json!({"count": 3}));
        for _ in 0..2 {
            h.transport
                .reply(200, json!(null))
                .reply(200, json!([]))
                .reply(200, json!({"count": 0}));
        }

        let poller = NotificationPoller::new(h.api.clone());
        poller.load().await;
        assert_eq!(poller.unread_count(), 3);

        poller.mark_all_read().await.expect("first");
        assert_eq!(poller.unread_count(), 0);
        poller.mark_all_read().await.expect("second");
        assert_eq!(poller.unread_count(), 0);

        let posts = h
            .transport
            .sent()
            .into_iter()
            .filter(|(u, _)| u.ends_with("/notifications/mark-all-read"))
            .count();
        assert_eq!(posts, 2);
    }

    #[tokio::test]
    async fn open_marks_read_reloads_and_links_task() {
        let h = signed_in_harness();
        h.transport
            .fail(ApiError::Network("blip".into()))
            .reply(200, json!([]))
            .reply(200, json!({"count": 0}));

        let poller = NotificationPoller::new(h.api.clone());
        let n: Notification =
            serde_json::from_value(notification("n-9", Some("t-4"))).expect("decode");

        assert_eq!(poller.open(&n).await, Some(Route::Task("t-4".into())));
        let sent = h.transport.sent();
        assert!(sent[0].0.ends_with("/notifications/n-9/mark-read"));
        assert_eq!(sent.len(), 3);
    }

    /// Each request waits until the test releases its response.
    #[derive(Default)]
    struct GatedTransport {
        gates: Mutex<VecDeque<oneshot::Receiver<ApiResponse>>>,
    }

    #[async_trait::async_trait]
    impl HttpTransport for GatedTransport {
        async fn execute(&self, _url: &str, _req: &ApiRequest) -> Result<ApiResponse, ApiError> {
            let gate = self.gates.lock().expect("lock").pop_front();
            match gate {
                Some(rx) => rx.await.map_err(|_| ApiError::Network("gate dropped".into())),
                None => Err(ApiError::Network("no gate".into())),
            }
        }
    }

    #[tokio::test]
    async fn stale_completion_is_discarded() {
        let transport = Arc::new(GatedTransport::default());
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        transport
            .gates
            .lock()
            .expect("lock")
            .extend([first_rx, second_rx]);

        let api = ApiClient::builder(ClientConfig::new("http://backend.test/api"))
            .shared_transport(transport)
            .build();
        let poller = NotificationPoller::new(api);

        let (older, newer, ()) = futures::join!(poller.tick(), poller.tick(), async {
            second_tx
                .send(ApiResponse::new(200, r#"{"count":5}"#))
                .expect("send");
            tokio::task::yield_now().await;
            first_tx
                .send(ApiResponse::new(200, r#"{"count":2}"#))
                .expect("send");
        });

        assert_eq!(
            newer,
            TickOutcome::Arrived {
                previous: 0,
                current: 5
            }
        );
        assert_eq!(older, TickOutcome::Stale);
        assert_eq!(poller.unread_count(), 5);
    }

    struct CountingSound(AtomicUsize);

    impl SoundCue for CountingSound {
        fn play(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_poller_plays_and_stops_on_cancel() {
        let h = signed_in_harness();
        h.transport
            .reply(200, json!([]))
            .reply(200, json!({"count": 1}))
            .reply(200, json!({"count": 3}));

        let sound = Arc::new(CountingSound(AtomicUsize::new(0)));
        let poller = Arc::new(NotificationPoller::new(h.api.clone()));
        let handle = spawn(poller.clone(), Duration::from_secs(5), sound.clone());

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(sound.0.load(Ordering::SeqCst), 1);
        assert_eq!(poller.unread_count(), 3);
        assert_eq!(h.transport.sent().len(), 3);

        handle.cancel();
        tokio::time::sleep(Duration::from_secs(1)).await;
        let before = h.transport.sent().len();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(h.transport.sent().len(), before);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_stops_polling() {
        let h = signed_in_harness();
        let poller = Arc::new(NotificationPoller::new(h.api.clone()));
        let handle = spawn(poller, Duration::from_secs(5), Arc::new(Silent));

        tokio::time::sleep(Duration::from_secs(11)).await;
        let before = h.transport.sent().len();
        assert!(before >= 3);

        drop(handle);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(h.transport.sent().len(), before);
    }
}
