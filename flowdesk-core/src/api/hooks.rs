use super::transport::ApiRequest;
use crate::error::ApiError;
use crate::guard::Route;
use crate::session::SessionStore;
use std::sync::Arc;

/// Runs on every outgoing request, before it is handed to the transport.
pub trait RequestHook: Send + Sync + 'static {
    fn decorate(&self, request: &mut ApiRequest);
}

/// Runs once for every failed call, before the error reaches the caller.
pub trait ErrorHook: Send + Sync + 'static {
    fn on_error(&self, request: &ApiRequest, error: &ApiError);
}

/// Moves the user to another location (browser address, CLI state, ...).
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, path: &str);
}

/// Attaches `Authorization: Bearer <token>` whenever a token is persisted.
pub struct BearerAuth {
    session: Arc<SessionStore>,
}

impl BearerAuth {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }
}

impl RequestHook for BearerAuth {
    fn decorate(&self, request: &mut ApiRequest) {
        match self.session.token() {
            Some(token) => request.set_header("Authorization", format!("Bearer {token}")),
            None => request
                .headers
                .retain(|(k, _)| !k.eq_ignore_ascii_case("Authorization")),
        }
    }
}

/// The global 401 policy: drop the session and send the user to login.
pub struct SessionExpiry {
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl SessionExpiry {
    pub fn new(session: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }
}

impl ErrorHook for SessionExpiry {
    fn on_error(&self, request: &ApiRequest, error: &ApiError) {
        if !error.is_unauthorized() {
            return;
        }
        tracing::warn!(path = %request.path, "unauthorized response, clearing session");
        self.session.clear();
        self.navigator.navigate(&Route::Login.path());
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::Role;
    use crate::session::tests::user;
    use crate::session::Session;
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct RecordingNavigator {
        pub(crate) visits: Mutex<Vec<String>>,
    }

    impl RecordingNavigator {
        pub(crate) fn visits(&self) -> Vec<String> {
            self.visits.lock().expect("lock").clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, path: &str) {
            self.visits.lock().expect("lock").push(path.to_string());
        }
    }

    #[test]
    fn bearer_header_tracks_current_token() {
        let store = Arc::new(SessionStore::in_memory());
        let hook = BearerAuth::new(store.clone());

        let mut req = ApiRequest::get("/projects");
        hook.decorate(&mut req);
        assert_eq!(req.header("Authorization"), None);

        store
            .set(&Session::new("abc.def", user("u-1", Role::Developer)))
            .expect("set");
        let mut req = ApiRequest::get("/projects");
        hook.decorate(&mut req);
        assert_eq!(req.header("authorization"), Some("Bearer abc.def"));
    }

    #[test]
    fn expiry_ignores_other_errors() {
        let store = Arc::new(SessionStore::in_memory());
        store
            .set(&Session::new("tok", user("u-1", Role::Developer)))
            .expect("set");
        let nav = Arc::new(RecordingNavigator::default());
        let hook = SessionExpiry::new(store.clone(), nav.clone());

        let req = ApiRequest::get("/tasks/1");
        hook.on_error(&req, &ApiError::from_status(403, ""));
        hook.on_error(&req, &ApiError::Network("down".into()));

        assert!(store.is_authenticated());
        assert!(nav.visits().is_empty());
    }
}
