mod history;
mod locks;
mod store;

pub use history::{MAX_SESSION_TURNS, SessionHistory, Turn, TurnRole};
pub use locks::{SessionGuard, SessionLocks};
pub use store::{InMemorySessionStore, SessionStore, SessionStoreError, SessionStoreFuture};

/// Session id used when the caller does not supply one.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Resolves a caller-supplied session id. Only an absent id falls back to
/// [`DEFAULT_SESSION_ID`]; supplied ids are opaque keys and kept verbatim.
pub fn resolve_session_id(session_id: Option<&str>) -> String {
    session_id.unwrap_or(DEFAULT_SESSION_ID).to_string()
}
