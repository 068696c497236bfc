//! Core types for Folio.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod password;
pub mod slug;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use password::{PasswordRequirement, PasswordStrength};
pub use slug::{Slug, SlugError};
pub use status::*;
