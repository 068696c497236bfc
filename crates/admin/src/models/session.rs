//! Session-related types for admin authentication.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use folio_core::{AdminRole, Email};

use super::admin_user::AdminUser;

/// Session-stored admin identity.
///
/// Minimal data stored in the session to identify the logged-in admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Identity-provider user id.
    pub uid: String,
    /// Admin's email address.
    pub email: Email,
    /// Admin's display name.
    pub display_name: String,
    /// Admin's role/permission level.
    pub role: AdminRole,
    /// Random id generated at sign-in, stamped on activity records.
    pub console_session_id: String,
}

impl CurrentAdmin {
    #[must_use]
    pub fn from_user(user: &AdminUser, console_session_id: String) -> Self {
        Self {
            uid: user.uid.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            role: user.role,
            console_session_id,
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    pub use folio_core::lockout::{CONSOLE_SESSION_KEY, LOCKOUT_KEY, REMEMBERED_ADMIN_KEY};
}
