//! Session holder with local persistence.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use super::{AuthSession, SessionError};
use crate::models::User;
use crate::storage::{LocalStorage, keys};

/// Message recorded when the backend rejects the credential.
pub const SESSION_EXPIRED_MESSAGE: &str = "session expired, please sign in again";

/// Tracks the signed-in identity and credential.
///
/// The pair is persisted under [`keys::AUTH_TOKEN`] (raw token) and
/// [`keys::USER`] (JSON) so it survives restarts. A transient error message
/// (e.g. a failed login) is held alongside but never persisted.
pub struct SessionHolder {
    session: Option<AuthSession>,
    error: Option<String>,
    storage: Arc<dyn LocalStorage>,
}

impl std::fmt::Debug for SessionHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHolder")
            .field("session", &self.session)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl SessionHolder {
    /// Create a holder and restore any persisted session.
    ///
    /// Both entries must be present and well-formed. Anything else (one entry
    /// missing, an empty token, a user record that does not parse) leaves the
    /// holder empty and deletes whatever was persisted.
    #[must_use]
    pub fn init(storage: Arc<dyn LocalStorage>) -> Self {
        let mut holder = Self {
            session: None,
            error: None,
            storage,
        };
        holder.session = holder.read_persisted();
        if let Some(session) = &holder.session {
            tracing::debug!(user_id = %session.user.id, "Session restored");
        }
        holder
    }

    /// Tear the holder down, handing back the session it held.
    #[must_use]
    pub fn dispose(self) -> Option<AuthSession> {
        self.session
    }

    /// The current session, if signed in.
    #[must_use]
    pub const fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|session| &session.user)
    }

    /// Whether someone is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Credential to attach to authorized requests.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&SecretString> {
        self.session.as_ref().map(|session| &session.token)
    }

    /// The last recorded error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The signed-in user.
    ///
    /// # Errors
    ///
    /// `SessionError::NotSignedIn` when empty.
    pub fn require_user(&self) -> Result<&User, SessionError> {
        self.user().ok_or(SessionError::NotSignedIn)
    }

    /// The signed-in user, if they are an administrator.
    ///
    /// # Errors
    ///
    /// `NotSignedIn` when empty, `Forbidden` for non-admin roles.
    pub fn require_admin(&self) -> Result<&User, SessionError> {
        let user = self.require_user()?;
        if user.is_admin() {
            Ok(user)
        } else {
            Err(SessionError::Forbidden)
        }
    }

    /// Store a new session and clear any previous error.
    pub fn set_session(&mut self, user: User, token: SecretString) {
        self.persist(&user, &token);
        tracing::info!(user_id = %user.id, role = %user.role, "Signed in");
        self.session = Some(AuthSession { user, token });
        self.error = None;
    }

    /// Sign out: drop the session and its persisted entries.
    pub fn clear_session(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!(user_id = %session.user.id, "Signed out");
        }
        self.purge();
    }

    /// Record a transient error. The session is left as it is.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Forget the recorded error.
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// React to the backend rejecting the credential (HTTP 401).
    pub fn handle_unauthorized(&mut self) {
        tracing::warn!("Credential rejected by backend, clearing session");
        self.clear_session();
        self.set_error(SESSION_EXPIRED_MESSAGE);
    }

    fn persist(&self, user: &User, token: &SecretString) {
        let user_json = match serde_json::to_string(user) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize user");
                return;
            }
        };

        let result = self
            .storage
            .set_item(keys::AUTH_TOKEN, token.expose_secret())
            .and_then(|()| self.storage.set_item(keys::USER, &user_json));
        if let Err(e) = result {
            tracing::error!(error = %e, "Failed to persist session");
        }
    }

    fn purge(&self) {
        for key in [keys::AUTH_TOKEN, keys::USER] {
            if let Err(e) = self.storage.remove_item(key) {
                tracing::error!(error = %e, key, "Failed to remove session entry");
            }
        }
    }

    fn read_persisted(&self) -> Option<AuthSession> {
        let token = self.read_entry(keys::AUTH_TOKEN);
        let user = self.read_entry(keys::USER);

        match (token, user) {
            (None, None) => None,
            (Some(token), Some(user_json)) if !token.trim().is_empty() => {
                match serde_json::from_str::<User>(&user_json) {
                    Ok(user) => Some(AuthSession {
                        user,
                        token: SecretString::from(token),
                    }),
                    Err(e) => {
                        tracing::warn!(error = %e, "Discarding corrupted persisted user");
                        self.purge();
                        None
                    }
                }
            }
            _ => {
                tracing::warn!("Discarding incomplete persisted session");
                self.purge();
                None
            }
        }
    }

    fn read_entry(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).unwrap_or_else(|e| {
            tracing::warn!(error = %e, key, "Failed to read session entry");
            None
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use savat_core::{UserId, UserRole};

    use super::*;
    use crate::storage::MemoryStorage;

    fn user(role: UserRole) -> User {
        User {
            id: UserId::new(1),
            name: Some("Dilnoza".to_string()),
            email: "dilnoza@example.uz".to_string(),
            role,
        }
    }

    fn signed_in(role: UserRole) -> (Arc<MemoryStorage>, SessionHolder) {
        let storage = Arc::new(MemoryStorage::new());
        let mut holder = SessionHolder::init(storage.clone());
        holder.set_session(user(role), SecretString::from("tok-123"));
        (storage, holder)
    }

    #[test]
    fn test_set_session_persists_both() {
        let (storage, holder) = signed_in(UserRole::Customer);
        assert!(holder.is_authenticated());
        assert_eq!(
            storage.get_item(keys::AUTH_TOKEN).unwrap().as_deref(),
            Some("tok-123")
        );
        let user_json = storage.get_item(keys::USER).unwrap().unwrap();
        let restored: User = serde_json::from_str(&user_json).unwrap();
        assert_eq!(restored, user(UserRole::Customer));
    }

    #[test]
    fn test_set_session_clears_error() {
        let storage = Arc::new(MemoryStorage::new());
        let mut holder = SessionHolder::init(storage);
        holder.set_error("invalid credentials");
        holder.set_session(user(UserRole::Customer), SecretString::from("t"));
        assert_eq!(holder.error(), None);
    }

    #[test]
    fn test_set_error_keeps_session() {
        let (_, mut holder) = signed_in(UserRole::Customer);
        holder.set_error("order failed");
        assert!(holder.is_authenticated());
        assert_eq!(holder.error(), Some("order failed"));
    }

    #[test]
    fn test_clear_session_purges() {
        let (storage, mut holder) = signed_in(UserRole::Customer);
        holder.clear_session();
        assert!(holder.user().is_none());
        assert!(holder.bearer_token().is_none());
        assert!(!storage.contains(keys::AUTH_TOKEN));
        assert!(!storage.contains(keys::USER));
    }

    #[test]
    fn test_restore_on_init() {
        let (storage, holder) = signed_in(UserRole::Admin);
        drop(holder);

        let restored = SessionHolder::init(storage);
        assert_eq!(restored.require_admin().unwrap().id, UserId::new(1));
        assert_eq!(
            restored.bearer_token().unwrap().expose_secret(),
            "tok-123"
        );
    }

    #[test]
    fn test_partial_entries_are_purged() {
        let storage = Arc::new(MemoryStorage::with_entries([(keys::AUTH_TOKEN, "orphan")]));
        let holder = SessionHolder::init(storage.clone());
        assert!(!holder.is_authenticated());
        assert!(!storage.contains(keys::AUTH_TOKEN));
    }

    #[test]
    fn test_corrupted_user_is_purged() {
        let storage = Arc::new(MemoryStorage::with_entries([
            (keys::AUTH_TOKEN, "tok"),
            (keys::USER, "{\"id\": \"not a number\"}"),
        ]));
        let holder = SessionHolder::init(storage.clone());
        assert!(!holder.is_authenticated());
        assert!(!storage.contains(keys::AUTH_TOKEN));
        assert!(!storage.contains(keys::USER));
    }

    #[test]
    fn test_empty_token_is_purged() {
        let storage = Arc::new(MemoryStorage::with_entries([
            (keys::AUTH_TOKEN, "  "),
            (keys::USER, r#"{"id": 1, "email": "a@b.co"}"#),
        ]));
        let holder = SessionHolder::init(storage.clone());
        assert!(!holder.is_authenticated());
        assert!(!storage.contains(keys::USER));
    }

    #[test]
    fn test_role_gating() {
        let storage = Arc::new(MemoryStorage::new());
        let holder = SessionHolder::init(storage);
        assert_eq!(holder.require_admin().unwrap_err(), SessionError::NotSignedIn);

        let (_, customer) = signed_in(UserRole::Customer);
        assert!(customer.require_user().is_ok());
        assert_eq!(customer.require_admin().unwrap_err(), SessionError::Forbidden);
    }

    #[test]
    fn test_handle_unauthorized() {
        let (storage, mut holder) = signed_in(UserRole::Customer);
        holder.handle_unauthorized();
        assert!(!holder.is_authenticated());
        assert_eq!(holder.error(), Some(SESSION_EXPIRED_MESSAGE));
        assert!(!storage.contains(keys::AUTH_TOKEN));
    }
}
