//! Persisted client session.
//!
//! The bearer token and the serialized user live under two storage keys
//! (`token`, `currentUser`). They are only ever written or removed together
//! while holding the store's write lock, and a read that finds one without the
//! other treats the session as absent and removes the leftover.

use crate::error::StorageError;
use crate::models::{AuthResponse, Role, User};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "currentUser";

/// String key/value persistence (browser `localStorage`, a file, memory).
pub trait KeyValueStorage: Send + Sync + 'static {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str);
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    pub fn role(&self) -> Role {
        self.user.role
    }
}

impl From<AuthResponse> for Session {
    fn from(resp: AuthResponse) -> Self {
        Session::new(resp.access_token, resp.user)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    SignedIn(Session),
    Cleared,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
    lock: RwLock<()>,
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
    next_subscription: Mutex<u64>,
}

impl SessionStore {
    pub fn new(storage: impl KeyValueStorage) -> Self {
        Self::with_storage(Arc::new(storage))
    }

    pub fn with_storage(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            lock: RwLock::new(()),
            subscribers: Mutex::new(Vec::new()),
            next_subscription: Mutex::new(0),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::default())
    }

    /// The persisted session, or `None` when absent, malformed or half
    /// written.
    pub fn get(&self) -> Option<Session> {
        let (token, raw_user) = {
            let _read = self.lock.read().unwrap_or_else(|e| e.into_inner());
            (
                self.storage.get_item(TOKEN_KEY),
                self.storage.get_item(USER_KEY),
            )
        };

        match (token.as_deref(), raw_user.as_deref()) {
            (None, None) => None,
            (Some(tok), Some(raw)) if !tok.is_empty() => match serde_json::from_str::<User>(raw) {
                Ok(user) => Some(Session {
                    token: tok.to_string(),
                    user,
                }),
                Err(err) => {
                    tracing::warn!(error = %err, "discarding unreadable persisted user");
                    self.discard_if_unchanged(&token, &raw_user);
                    None
                }
            },
            _ => {
                tracing::warn!("discarding half-written session");
                self.discard_if_unchanged(&token, &raw_user);
                None
            }
        }
    }

    /// Raw bearer token as currently persisted.
    pub fn token(&self) -> Option<String> {
        let _read = self.lock.read().unwrap_or_else(|e| e.into_inner());
        self.storage.get_item(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn user(&self) -> Option<User> {
        self.get().map(|s| s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }

    pub fn set(&self, session: &Session) -> Result<(), StorageError> {
        let raw_user =
            serde_json::to_string(&session.user).map_err(|e| StorageError::Encode(e.to_string()))?;
        {
            let _write = self.lock.write().unwrap_or_else(|e| e.into_inner());
            self.storage.set_item(TOKEN_KEY, &session.token)?;
            if let Err(err) = self.storage.set_item(USER_KEY, &raw_user) {
                self.storage.remove_item(TOKEN_KEY);
                return Err(err);
            }
        }
        tracing::info!(user_id = %session.user.id, role = session.user.role.as_str(), "session stored");
        self.notify(&SessionEvent::SignedIn(session.clone()));
        Ok(())
    }

    pub fn clear(&self) {
        self.remove_pair();
        tracing::info!("session cleared");
        self.notify(&SessionEvent::Cleared);
    }

    pub fn subscribe(&self, callback: impl Fn(&SessionEvent) + Send + Sync + 'static) -> SubscriptionId {
        let id = {
            let mut next = self.next_subscription.lock().unwrap_or_else(|e| e.into_inner());
            *next += 1;
            SubscriptionId(*next)
        };
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|(sid, _)| *sid != id);
    }

    /// Removes what `get` observed, unless a writer replaced it meanwhile.
    fn discard_if_unchanged(&self, token: &Option<String>, raw_user: &Option<String>) {
        let _write = self.lock.write().unwrap_or_else(|e| e.into_inner());
        if self.storage.get_item(TOKEN_KEY) == *token && self.storage.get_item(USER_KEY) == *raw_user {
            self.storage.remove_item(TOKEN_KEY);
            self.storage.remove_item(USER_KEY);
        }
    }

    fn remove_pair(&self) {
        let _write = self.lock.write().unwrap_or_else(|e| e.into_inner());
        self.storage.remove_item(TOKEN_KEY);
        self.storage.remove_item(USER_KEY);
    }

    fn notify(&self, event: &SessionEvent) {
        // Callbacks run outside the lock so they may read the store again.
        let subscribers: Vec<Subscriber> = self
            .subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for cb in subscribers {
            cb(event);
        }
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn with_items<'a>(items: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            items: Mutex::new(
                items
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }
}

impl<T: KeyValueStorage> KeyValueStorage for Arc<T> {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) {
        (**self).remove_item(key)
    }
}

/// JSON object on disk, rewritten whole on every change.
#[cfg(not(target_arch = "wasm32"))]
pub struct FileStorage {
    path: std::path::PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStorage {
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StorageError::Unavailable(e.to_string()))?;
            }
        }

        let items = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable session file");
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(StorageError::Unavailable(err.to_string())),
        };

        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    fn flush(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(items).map_err(|e| StorageError::Encode(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| StorageError::Write(e.to_string()))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        let previous = items.insert(key.to_string(), value.to_string());
        if let Err(err) = self.flush(&items) {
            match previous {
                Some(old) => items.insert(key.to_string(), old),
                None => items.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        if items.remove(key).is_some() {
            if let Err(err) = self.flush(&items) {
                tracing::warn!(key, error = %err, "failed to persist removal");
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn user(id: &str, role: Role) -> User {
        User {
            id: id.into(),
            first_name: "Test".into(),
            last_name: "User".into(),
            email: format!("{id}@flowdesk.dev"),
            role,
            skills: vec![],
            current_workload_points: None,
            max_capacity_points: None,
            created_at: None,
        }
    }

    struct FailingUserWrites(MemoryStorage);

    impl KeyValueStorage for FailingUserWrites {
        fn get_item(&self, key: &str) -> Option<String> {
            self.0.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == USER_KEY {
                return Err(StorageError::Write("quota exceeded".into()));
            }
            self.0.set_item(key, value)
        }

        fn remove_item(&self, key: &str) {
            self.0.remove_item(key)
        }
    }

    #[test]
    fn set_then_get_returns_same_session() {
        let store = SessionStore::in_memory();
        let session = Session::new("tok-1", user("u-1", Role::Manager));
        store.set(&session).expect("set");

        assert_eq!(store.get(), Some(session));
        assert_eq!(store.token().as_deref(), Some("tok-1"));
    }

    #[test]
    fn malformed_user_fails_closed() {
        let storage = Arc::new(MemoryStorage::with_items([
            (TOKEN_KEY, "tok"),
            (USER_KEY, "{not json"),
        ]));
        let store = SessionStore::new(storage.clone());

        assert_eq!(store.get(), None);
        assert_eq!(storage.get_item(TOKEN_KEY), None);
        assert_eq!(storage.get_item(USER_KEY), None);
    }

    #[test]
    fn token_without_user_is_removed_on_read() {
        let storage = Arc::new(MemoryStorage::with_items([(TOKEN_KEY, "tok")]));
        let store = SessionStore::new(storage.clone());

        assert!(!store.is_authenticated());
        assert_eq!(storage.get_item(TOKEN_KEY), None);
    }

    #[test]
    fn failed_user_write_rolls_back_token() {
        let store = SessionStore::new(FailingUserWrites(MemoryStorage::default()));
        let err = store
            .set(&Session::new("tok", user("u-1", Role::Developer)))
            .expect_err("user write must fail");

        assert_eq!(err, StorageError::Write("quota exceeded".into()));
        assert_eq!(store.token(), None);
    }

    #[test]
    fn clear_removes_both_keys_and_notifies() {
        let store = SessionStore::in_memory();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |e| sink.lock().expect("lock").push(e.clone()));

        let session = Session::new("tok", user("u-1", Role::Developer));
        store.set(&session).expect("set");
        store.clear();

        assert_eq!(store.get(), None);
        assert_eq!(store.token(), None);
        assert_eq!(
            *seen.lock().expect("lock"),
            vec![SessionEvent::SignedIn(session), SessionEvent::Cleared]
        );
    }

    #[test]
    fn unsubscribed_callbacks_stop_firing() {
        let store = SessionStore::in_memory();
        let hits = Arc::new(Mutex::new(0));
        let counter = hits.clone();
        let id = store.subscribe(move |_| *counter.lock().expect("lock") += 1);

        store.clear();
        store.unsubscribe(id);
        store.clear();

        assert_eq!(*hits.lock().expect("lock"), 1);
    }

    #[test]
    fn file_storage_survives_reopen() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("flowdesk-tests/session-{nanos}.json"));

        let store = SessionStore::new(FileStorage::open(&path).expect("open"));
        let session = Session::new("tok-file", user("u-7", Role::Manager));
        store.set(&session).expect("set");

        let reopened = SessionStore::new(FileStorage::open(&path).expect("reopen"));
        assert_eq!(reopened.get(), Some(session));

        reopened.clear();
        let again = SessionStore::new(FileStorage::open(&path).expect("reopen"));
        assert_eq!(again.get(), None);
    }
}
