//! Signed-in identity record.

use serde::{Deserialize, Serialize};

use savat_core::{UserId, UserRole};

/// The identity the backend returns on login or registration.
///
/// Persisted as JSON under the `user` storage key alongside the bearer token.
/// The email is kept as the backend sent it; only locally typed addresses
/// are validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
}

impl User {
    /// Name to greet the user with, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }

    /// Whether this identity may reach admin-only operations.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
