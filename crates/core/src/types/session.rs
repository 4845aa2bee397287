//! Session identity, normalized from login responses of unknown shape.

use serde::{Deserialize, Serialize};

use crate::types::id::UserId;

/// The identity extracted from a login response or token claims.
///
/// Created on successful login or token refresh; cleared on logout or
/// detected expiry. Roles are always a list of strings regardless of
/// whether the source was a native list, a JSON-array-shaped string, or a
/// comma-joined string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    /// Backend user ID, when any source supplied one.
    pub user_id: Option<UserId>,
    /// Display username.
    pub username: Option<String>,
    /// Account email.
    pub email: Option<String>,
    /// Normalized role list, in source order.
    pub roles: Vec<String>,
    /// Token `exp` claim in seconds since the epoch, when decodable.
    pub token_expiry: Option<i64>,
}

impl SessionIdentity {
    /// Whether this identity carries the given role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Best display name: username, falling back to email.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.username.as_deref().or(self.email.as_deref())
    }
}
