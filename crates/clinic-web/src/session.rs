//! Server-side sessions for the staff and admin portals.
//!
//! A signed-in user holds only a random session id in an `HttpOnly` cookie.
//! The session itself, including the principal used for backend calls, stays
//! in a moka cache whose TTL bounds how long a sign-in is valid.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use clinic_core::Principal;
use moka::future::Cache;

use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "clinic_session";

/// Upper bound on concurrent sessions.
const SESSION_CAPACITY: u64 = 10_000;

/// Which portal the session was opened from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Staff,
    Admin,
}

impl SessionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Admin => "admin",
        }
    }
}

/// A signed-in portal user.
///
/// Admin pages still ask the backend for the caller's role on every request;
/// `kind` only records which sign-in form was used.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub principal: Principal,
    pub kind: SessionKind,
}

/// Session storage keyed by session id.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, Session>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(SESSION_CAPACITY)
            .time_to_live(ttl)
            .build();
        Self { sessions, ttl }
    }

    /// Open a session for an authenticated staff account.
    pub async fn create(&self, user_id: &str, kind: SessionKind) -> Session {
        let session = Session {
            id: uuid::Uuid::new_v4().simple().to_string(),
            user_id: user_id.to_string(),
            principal: Principal::for_staff(user_id),
            kind,
        };
        self.sessions
            .insert(session.id.clone(), session.clone())
            .await;
        tracing::info!(user_id = %user_id, kind = kind.as_str(), "session opened");
        session
    }

    pub async fn get(&self, id: &str) -> Option<Session> {
        self.sessions.get(id).await
    }

    pub async fn remove(&self, id: &str) -> Option<Session> {
        let removed = self.sessions.remove(id).await;
        if let Some(session) = &removed {
            tracing::info!(user_id = %session.user_id, "session closed");
        }
        removed
    }

    /// `Set-Cookie` value that stores `session` in the browser.
    pub fn cookie(&self, session: &Session) -> String {
        format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            session.id,
            self.ttl.as_secs()
        )
    }
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Find the session id among the request's `Cookie` headers.
fn session_id(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// The caller's session, if they are signed in.
///
/// Never rejects: handlers decide whether a missing session means a login
/// form or a redirect.
pub struct CurrentSession(pub Option<Session>);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = match session_id(parts) {
            Some(id) => state.sessions.get(id).await,
            None => None,
        };
        Ok(Self(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_cookies(cookies: &[&str]) -> Parts {
        let mut builder = Request::builder().uri("/staff");
        for cookie in cookies {
            builder = builder.header(COOKIE, *cookie);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn finds_session_among_other_cookies() {
        let parts = parts_with_cookies(&["theme=dark; clinic_session=abc123; lang=en"]);
        assert_eq!(session_id(&parts), Some("abc123"));
    }

    #[test]
    fn finds_session_in_second_header() {
        let parts = parts_with_cookies(&["theme=dark", "clinic_session=xyz"]);
        assert_eq!(session_id(&parts), Some("xyz"));
    }

    #[test]
    fn ignores_missing_or_empty_session() {
        assert_eq!(session_id(&parts_with_cookies(&[])), None);
        assert_eq!(session_id(&parts_with_cookies(&["clinic_session="])), None);
        assert_eq!(
            session_id(&parts_with_cookies(&["other_clinic_session=1"])),
            None
        );
    }

    #[tokio::test]
    async fn create_get_remove() {
        let store = SessionStore::new(Duration::from_secs(60));
        let session = store.create("nurse", SessionKind::Staff).await;
        assert_eq!(session.principal, Principal::for_staff("nurse"));

        let found = store.get(&session.id).await.unwrap();
        assert_eq!(found.user_id, "nurse");
        assert_eq!(found.kind, SessionKind::Staff);

        assert!(store.remove(&session.id).await.is_some());
        assert!(store.get(&session.id).await.is_none());
    }

    #[tokio::test]
    async fn session_ids_are_unique() {
        let store = SessionStore::new(Duration::from_secs(60));
        let a = store.create("nurse", SessionKind::Staff).await;
        let b = store.create("nurse", SessionKind::Staff).await;
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn cookies_are_http_only() {
        let store = SessionStore::new(Duration::from_secs(86_400));
        let session = Session {
            id: "abc".to_string(),
            user_id: "nurse".to_string(),
            principal: Principal::for_staff("nurse"),
            kind: SessionKind::Staff,
        };
        let cookie = store.cookie(&session);
        assert!(cookie.starts_with("clinic_session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(clear_cookie().contains("Max-Age=0"));
    }
}
