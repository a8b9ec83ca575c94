use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRequest, RequestParts};
use axum::headers::{Cookie, HeaderMapExt};
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use bank_core::AccountNo;
use chrono::{DateTime, Duration, Utc};
use miette::Diagnostic;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "bank.sid";

#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    #[error("session {0} does not exist or has expired")]
    #[diagnostic(code(bank::error::session))]
    NotFound(SessionId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// The most recently opened account, announced once on the banking page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedAccount {
    pub account_type: String,
    pub account_no: AccountNo,
}

/// One-shot message for the next banking page render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    AccountOpened(OpenedAccount),
    InsufficientFunds,
}

/// Everything the server remembers about a browser between requests.
///
/// `username` lives until logout. `account` and `limit_fund` are notices:
/// [`SessionState::take_notice`] clears both when the banking page shows
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub username: Option<String>,
    pub account: Option<OpenedAccount>,
    pub limit_fund: bool,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(&self.username, Some(username) if !username.is_empty())
    }

    /// Removes the pending notices, returning the one to display. A newly
    /// opened account wins over an insufficient funds warning.
    pub fn take_notice(&mut self) -> Option<Notice> {
        let account = self.account.take();
        let limit_fund = std::mem::take(&mut self.limit_fund);
        match account {
            Some(account) => Some(Notice::AccountOpened(account)),
            None if limit_fund => Some(Notice::InsufficientFunds),
            None => None,
        }
    }
}

struct SessionEntry {
    state: SessionState,
    last_seen: DateTime<Utc>,
}

/// In-memory session storage. Contents are lost on restart, which logs
/// every browser out.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::max_value()),
        }
    }

    fn is_expired(&self, entry: &SessionEntry, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.last_seen) > self.ttl
    }

    pub async fn create(&self) -> SessionId {
        let id = SessionId::new();
        self.sessions.write().await.insert(
            id,
            SessionEntry {
                state: SessionState::default(),
                last_seen: Utc::now(),
            },
        );
        tracing::trace!(session = %id, "session created");
        id
    }

    /// Refreshes the expiry of a live session. Returns `false` if the
    /// session is unknown or already expired.
    pub async fn touch(&self, id: &SessionId) -> bool {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let expired = match sessions.get_mut(id) {
            Some(entry) if !self.is_expired(entry, now) => {
                entry.last_seen = now;
                return true;
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            sessions.remove(id);
            tracing::trace!(session = %id, "session expired");
        }
        false
    }

    pub async fn contains(&self, id: &SessionId) -> bool {
        let sessions = self.sessions.read().await;
        matches!(sessions.get(id), Some(entry) if !self.is_expired(entry, Utc::now()))
    }

    pub async fn get(&self, id: &SessionId) -> Option<SessionState> {
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .filter(|entry| !self.is_expired(entry, Utc::now()))
            .map(|entry| entry.state.clone())
    }

    pub async fn update<F, T>(&self, id: &SessionId, f: F) -> Result<T, SessionError>
    where
        F: FnOnce(&mut SessionState) -> T,
    {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(entry) if !self.is_expired(entry, now) => {
                entry.last_seen = now;
                Ok(f(&mut entry.state))
            }
            _ => Err(SessionError::NotFound(*id)),
        }
    }

    pub async fn destroy(&self, id: &SessionId) -> Result<(), SessionError> {
        match self.sessions.write().await.remove(id) {
            Some(_) => {
                tracing::trace!(session = %id, "session destroyed");
                Ok(())
            }
            None => Err(SessionError::NotFound(*id)),
        }
    }

    /// Drops every expired session, returning how many were removed.
    pub async fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry, now));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Handle on the current request's session, placed in the request
/// extensions by [`session_middleware`].
#[derive(Clone)]
pub struct Session {
    id: SessionId,
    store: SessionStore,
}

impl Session {
    /// Snapshot of the session state; empty if the session is gone.
    pub async fn state(&self) -> SessionState {
        self.store.get(&self.id).await.unwrap_or_default()
    }

    pub async fn update<F, T>(&self, f: F) -> Result<T, SessionError>
    where
        F: FnOnce(&mut SessionState) -> T,
    {
        self.store.update(&self.id, f).await
    }

    /// Like [`Session::update`], but a failure is only logged. For state the
    /// user can live without, such as notices.
    pub async fn save<F>(&self, f: F)
    where
        F: FnOnce(&mut SessionState),
    {
        if let Err(e) = self.update(f).await {
            tracing::info!(err = format!("{:?}", e), "error when saving session");
        }
    }

    pub async fn destroy(&self) -> Result<(), SessionError> {
        self.store.destroy(&self.id).await
    }
}

#[async_trait]
impl<B> FromRequest<B> for Session
where
    B: Send,
{
    type Rejection = StatusCode;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        req.extensions()
            .get::<Session>()
            .cloned()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Attaches a [`Session`] to every request, starting a new one (and sending
/// its cookie) when the browser has no live session.
pub async fn session_middleware<B>(
    mut req: Request<B>,
    next: Next<B>,
) -> Result<Response, StatusCode> {
    let store = req
        .extensions()
        .get::<SessionStore>()
        .cloned()
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    let existing = match cookie_session_id(req.headers()) {
        Some(id) if store.touch(&id).await => Some(id),
        _ => None,
    };
    let (id, is_new) = match existing {
        Some(id) => (id, false),
        None => (store.create().await, true),
    };

    req.extensions_mut().insert(Session {
        id,
        store: store.clone(),
    });

    let mut response = next.run(req).await;

    if is_new && store.contains(&id).await {
        if let Ok(cookie) = HeaderValue::from_str(&session_cookie(&id)) {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
    }

    Ok(response)
}

fn cookie_session_id(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .typed_get::<Cookie>()
        .and_then(|cookie| cookie.get(SESSION_COOKIE).and_then(|v| v.parse().ok()))
}

fn session_cookie(id: &SessionId) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; Secure; SameSite=None",
        SESSION_COOKIE, id
    )
}

/// `Set-Cookie` value telling the browser to forget its session cookie.
pub fn expired_session_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; Secure; SameSite=None; Max-Age=0",
        SESSION_COOKIE
    )
}
