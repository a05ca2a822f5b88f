use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cli::client::LoginReply;
use crate::cli::store::{KeyValueStore, StorageError};
use crate::database::models::Role;

/// Key under which the session blob is persisted
pub const SESSION_KEY: &str = "session";

/// Credentials kept between invocations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub name: String,
    pub email: String,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<LoginReply> for Session {
    fn from(reply: LoginReply) -> Self {
        Self {
            token: reply.token,
            role: reply.role,
            name: reply.name,
            email: reply.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(Session),
}

/// Two-state session machine over a `KeyValueStore`.
///
/// The only way in is `establish` with a login reply. The way out is
/// `logout`, or `handle_auth_failure` once the server rejects the token.
/// Token expiry is never checked locally; the server decides.
pub struct SessionManager<S: KeyValueStore> {
    store: S,
    state: SessionState,
}

impl<S: KeyValueStore> SessionManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: SessionState::Unauthenticated,
        }
    }

    /// Restore the persisted session. A blob that does not parse is
    /// cleared and leaves the manager unauthenticated.
    pub fn hydrate(&mut self) -> Result<&SessionState, StorageError> {
        let raw = match self.store.get(SESSION_KEY) {
            Ok(raw) => raw,
            Err(StorageError::Corrupt { path, source }) => {
                warn!("Session store {} is unreadable: {}", path.display(), source);
                self.clear()?;
                return Ok(&self.state);
            }
            Err(e) => return Err(e),
        };

        self.state = match raw.map(|blob| serde_json::from_str::<Session>(&blob)) {
            Some(Ok(session)) => {
                debug!("Restored session for {}", session.email);
                SessionState::Authenticated(session)
            }
            Some(Err(e)) => {
                warn!("Discarding unreadable session: {}", e);
                self.store.remove(SESSION_KEY)?;
                SessionState::Unauthenticated
            }
            None => SessionState::Unauthenticated,
        };
        Ok(&self.state)
    }

    /// Persist a fresh login and become authenticated
    pub fn establish(&mut self, reply: LoginReply) -> Result<Session, StorageError> {
        let session = Session::from(reply);
        let blob = serde_json::to_string(&session).map_err(|source| StorageError::Corrupt {
            path: SESSION_KEY.into(),
            source,
        })?;
        self.store.set(SESSION_KEY, &blob)?;
        self.state = SessionState::Authenticated(session.clone());
        Ok(session)
    }

    pub fn logout(&mut self) -> Result<(), StorageError> {
        self.clear()
    }

    /// Called when a protected request came back 401 or 403
    pub fn handle_auth_failure(&mut self) -> Result<(), StorageError> {
        if let SessionState::Authenticated(session) = &self.state {
            warn!("Server rejected the session for {}; logging out", session.email);
        }
        self.clear()
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.state = SessionState::Unauthenticated;
        self.store.remove(SESSION_KEY)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            SessionState::Authenticated(session) => Some(session),
            SessionState::Unauthenticated => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.session().map(|s| s.token.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
