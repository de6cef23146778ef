//! Authenticated session.
//!
//! [`SessionHolder`] caches who is signed in and the bearer credential used
//! on authorized requests. User and token only ever exist together, which
//! [`AuthSession`] makes structural.

mod holder;

pub use holder::{SESSION_EXPIRED_MESSAGE, SessionHolder};

use secrecy::SecretString;
use thiserror::Error;

use crate::models::User;

/// A signed-in identity paired with its credential.
#[derive(Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: SecretString,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Access checks that can fail against the current session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No one is signed in.
    #[error("sign in required")]
    NotSignedIn,

    /// Signed in, but the role does not allow the operation.
    #[error("administrator access required")]
    Forbidden,
}
