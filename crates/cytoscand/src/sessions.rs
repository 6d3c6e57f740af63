//! Per-client wizard sessions keyed by a cookie.
//!
//! Each session owns one `SessionState`. Lifecycle: created on first contact
//! (or when the cookie names an unknown/expired id), cleared on wizard entry,
//! expired after `ttl` of inactivity by the periodic sweep.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use cytoscan_common::SessionState;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

/// Session id resolved for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionHandle {
    pub id: Uuid,
    /// True when the id was minted for this request and must be sent back
    pub created: bool,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionState>>>,
    ttl: Duration,
    cookie_name: String,
}

impl SessionStore {
    pub fn new(ttl: Duration, cookie_name: impl Into<String>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            cookie_name: cookie_name.into(),
        }
    }

    /// Find the live session named by the request cookie, or start a new one
    pub async fn resolve(&self, headers: &HeaderMap) -> SessionHandle {
        let mut sessions = self.sessions.write().await;

        if let Some(id) = session_id_from_headers(headers, &self.cookie_name) {
            match sessions.get_mut(&id) {
                Some(state) if !state.is_expired(self.ttl) => {
                    state.touch();
                    return SessionHandle { id, created: false };
                }
                Some(_) => {
                    debug!("Session {} expired, starting a new one", id);
                    sessions.remove(&id);
                }
                None => {}
            }
        }

        let id = Uuid::new_v4();
        sessions.insert(id, SessionState::new());
        debug!("Created session {}", id);
        SessionHandle { id, created: true }
    }

    /// Run `f` against a session, creating it if it vanished meanwhile
    pub async fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut sessions = self.sessions.write().await;
        let state = sessions.entry(id).or_default();
        f(state)
    }

    /// Copy of a session's state, for work done outside the lock
    pub async fn snapshot(&self, id: Uuid) -> Option<SessionState> {
        let sessions = self.sessions.read().await;
        sessions.get(&id).cloned()
    }

    pub async fn clear(&self, id: Uuid) {
        self.with_session(id, SessionState::clear).await;
    }

    /// Drop sessions idle for longer than the ttl; returns how many were removed
    pub async fn sweep(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, state| !state.is_expired(self.ttl));
        let removed = before - sessions.len();

        debug!(
            "Session sweep: {} removed, {} active",
            removed,
            sessions.len()
        );
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Send the session cookie back when the id is new
    pub fn attach_cookie(&self, handle: SessionHandle, response: &mut Response) {
        if !handle.created {
            return;
        }
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            self.cookie_name, handle.id
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => warn!("Cannot encode session cookie '{}': {}", self.cookie_name, e),
        }
    }
}

/// Extract the session id from `Cookie` headers
pub fn session_id_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}
