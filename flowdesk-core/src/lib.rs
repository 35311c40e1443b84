//! Client core for the FlowDesk dashboard: session storage and route gating,
//! the authenticated REST client, and unread-notification polling.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod models;
pub mod poller;
pub mod session;
pub mod workload;

pub use api::{ApiClient, Navigator};
pub use config::ClientConfig;
pub use error::{ApiError, LoginError, RegisterError, StorageError};
pub use guard::{Resolution, Route, SessionGuard};
pub use poller::{NotificationPoller, SoundCue, TickOutcome};
pub use session::{KeyValueStorage, Session, SessionEvent, SessionStore};
