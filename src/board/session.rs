use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::{header, HeaderMap};
use uuid::Uuid;

use super::domain::{AccountId, Role};

/// Authenticated caller identity, constructed once at request entry and passed
/// explicitly to every operation. There is no process-global current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub account_id: AccountId,
    pub role: Role,
}

/// Opaque bearer token handed out at registration and login.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(pub String);

impl SessionToken {
    fn generate() -> Self {
        SessionToken(Uuid::new_v4().to_string())
    }
}

/// Maps opaque tokens back to sessions. Token expiry and refresh are out of
/// scope; the contract is issue-then-fetch.
pub trait SessionStore: Send + Sync {
    fn issue(&self, session: Session) -> Result<SessionToken, SessionError>;
    fn fetch(&self, token: &str) -> Result<Option<Session>, SessionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// In-memory session store used by the binary and the tests.
#[derive(Default, Clone)]
pub struct MemorySessions {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
}

impl SessionStore for MemorySessions {
    fn issue(&self, session: Session) -> Result<SessionToken, SessionError> {
        let token = SessionToken::generate();
        let mut guard = self
            .sessions
            .lock()
            .map_err(|_| SessionError::Unavailable("session store poisoned".to_string()))?;
        guard.insert(token.0.clone(), session);
        Ok(token)
    }

    fn fetch(&self, token: &str) -> Result<Option<Session>, SessionError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|_| SessionError::Unavailable("session store poisoned".to_string()))?;
        Ok(guard.get(token).copied())
    }
}

/// Extract the bearer token from an `Authorization` header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
