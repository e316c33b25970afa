//! Server-side session store for the single-admin login.
//!
//! Sessions live in a process-wide map keyed by a random id that travels in
//! an HttpOnly cookie. A session is created on login, removed on logout and
//! dropped after an inactivity timeout.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "sid";

struct Session {
    user: String,
    last_seen: Instant,
}

pub struct SessionStore {
    ttl: Duration,
    inner: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Create a session for `user` and return its id.
    pub fn create(&self, user: &str) -> String {
        let id = Uuid::new_v4().simple().to_string();
        let mut sessions = self.inner.lock().unwrap();
        sessions.insert(
            id.clone(),
            Session {
                user: user.to_string(),
                last_seen: Instant::now(),
            },
        );
        id
    }

    /// Look up the user behind a session id, refreshing its activity stamp.
    /// Expired sessions are removed on access.
    pub fn user_for(&self, id: &str) -> Option<String> {
        let mut sessions = self.inner.lock().unwrap();
        match sessions.get_mut(id) {
            Some(session) if session.last_seen.elapsed() <= self.ttl => {
                session.last_seen = Instant::now();
                Some(session.user.clone())
            }
            Some(_) => {
                sessions.remove(id);
                None
            }
            None => None,
        }
    }

    pub fn remove(&self, id: &str) {
        self.inner.lock().unwrap().remove(id);
    }
}

/// Pull the session id out of the request's `Cookie` header, if any.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// `Set-Cookie` value establishing a session.
pub fn set_cookie(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value clearing the session cookie.
pub fn clear_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn create_then_lookup() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create("admin");
        assert_eq!(store.user_for(&id).as_deref(), Some("admin"));
    }

    #[test]
    fn unknown_id_is_none() {
        let store = SessionStore::new(Duration::from_secs(60));
        assert!(store.user_for("nope").is_none());
    }

    #[test]
    fn remove_clears_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.create("admin");
        store.remove(&id);
        assert!(store.user_for(&id).is_none());
    }

    #[test]
    fn sessions_expire_after_inactivity() {
        let store = SessionStore::new(Duration::ZERO);
        let id = store.create("admin");
        std::thread::sleep(Duration::from_millis(5));
        assert!(store.user_for(&id).is_none());
    }

    #[test]
    fn cookie_header_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; sid=abc123; lang=de"),
        );
        assert_eq!(session_id(&headers).as_deref(), Some("abc123"));

        headers.insert(COOKIE, HeaderValue::from_static("theme=dark"));
        assert!(session_id(&headers).is_none());
    }
}
