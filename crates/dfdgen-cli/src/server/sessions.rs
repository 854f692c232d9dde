//! Browser sessions keyed by a cookie.
//!
//! Each session owns one [`SessionState`] behind an async mutex. A trigger
//! holds the lock until the controller returns, so a second request for the
//! same session waits until the first generation has been committed.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::http::{HeaderMap, HeaderValue, header};
use log::debug;
use tokio::sync::Mutex;
use uuid::Uuid;

use dfdgen::session::SessionState;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "dfdgen_session";

/// One browser session.
#[derive(Debug, Default)]
pub struct Session {
    state: Mutex<SessionState>,
}

impl Session {
    pub fn state(&self) -> &Mutex<SessionState> {
        &self.state
    }
}

#[derive(Debug)]
struct Entry {
    session: Arc<Session>,
    last_seen: Instant,
}

/// A session looked up or created for a request.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub id: Uuid,
    pub session: Arc<Session>,
    /// Whether the session was created for this request.
    pub fresh: bool,
}

impl Resolved {
    /// The `Set-Cookie` value to send back, only for fresh sessions.
    pub fn set_cookie(&self) -> Option<HeaderValue> {
        if !self.fresh {
            return None;
        }
        HeaderValue::from_str(&format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            self.id
        ))
        .ok()
    }
}

/// All live sessions.
///
/// Sessions not seen for longer than the idle timeout are dropped on the
/// next lookup, which releases their artifacts.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, Entry>>>,
    idle_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// Returns the session for `id`, creating a fresh one when it is unknown.
    pub async fn resolve(&self, id: Option<Uuid>) -> Resolved {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();
        self.evict_idle(&mut sessions, now);

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_seen = now;
                return Resolved {
                    id,
                    session: entry.session.clone(),
                    fresh: false,
                };
            }
        }

        let id = Uuid::new_v4();
        let session = Arc::new(Session::default());
        sessions.insert(
            id,
            Entry {
                session: session.clone(),
                last_seen: now,
            },
        );
        debug!(session_id:% = id, live = sessions.len(); "Created session");

        Resolved {
            id,
            session,
            fresh: true,
        }
    }

    /// Returns an existing session without creating one.
    pub async fn get(&self, id: Uuid) -> Option<Arc<Session>> {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();
        self.evict_idle(&mut sessions, now);

        sessions.get_mut(&id).map(|entry| {
            entry.last_seen = now;
            entry.session.clone()
        })
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    fn evict_idle(&self, sessions: &mut HashMap<Uuid, Entry>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) <= self.idle_timeout);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted; "Evicted idle sessions");
        }
    }
}

/// Reads the session id from the request's cookies.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_creates_then_reuses() {
        let registry = SessionRegistry::new(Duration::from_secs(60));

        let first = registry.resolve(None).await;
        assert!(first.fresh);
        assert!(first.set_cookie().is_some());

        let second = registry.resolve(Some(first.id)).await;
        assert!(!second.fresh);
        assert!(second.set_cookie().is_none());
        assert!(Arc::ptr_eq(&first.session, &second.session));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_id_gets_fresh_session() {
        let registry = SessionRegistry::new(Duration::from_secs(60));

        let resolved = registry.resolve(Some(Uuid::new_v4())).await;

        assert!(resolved.fresh);
        assert!(registry.get(resolved.id).await.is_some());
    }

    #[tokio::test]
    async fn test_idle_sessions_are_evicted() {
        let registry = SessionRegistry::new(Duration::ZERO);
        let resolved = registry.resolve(None).await;

        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(registry.get(resolved.id).await.is_none());
        assert_eq!(registry.len().await, 0);
    }

    #[test]
    fn test_session_id_from_cookie_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}")).unwrap(),
        );
        assert_eq!(session_id(&headers), Some(id));
    }

    #[test]
    fn test_session_id_ignores_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("dfdgen_session=not-a-uuid"),
        );
        assert_eq!(session_id(&headers), None);
        assert_eq!(session_id(&HeaderMap::new()), None);
    }
}
