//! HTTP middleware and extractors for admin.
//!
//! # Layer Order (outermost first, see `main.rs`)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! Access control is done per handler through the extractors in [`auth`].

pub mod auth;
pub mod session;

pub use auth::{AdminAuthRejection, OptionalAdminAuth, RequireAdminAuth, RequireOwner};
pub use session::{
    BrowserStorage, SESSION_COOKIE_NAME, clear_current_admin, create_session_layer,
    set_current_admin,
};
