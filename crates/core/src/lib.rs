//! Folio Core - Shared types library.
//!
//! This crate provides the types used across the Folio components:
//! - `admin` - The admin console service (auth gate, content, media)
//! - `cli` - Command-line tools for migrations and admin grants
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure functions - no
//! database access and no HTTP clients. The login lockout guard lives here
//! so it can be tested without a browser session or identity provider.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, slugs, statuses and passwords
//! - [`lockout`] - Advisory login lockout guard and its key-value store seam
//! - [`auth_error`] - Identity-provider error kinds and their user-facing messages
//! - [`media`] - Upload validation rules for the media library

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth_error;
pub mod lockout;
pub mod media;
pub mod types;

pub use auth_error::AuthErrorKind;
pub use lockout::{
    KeyValueStore, LockoutDecision, LockoutPolicy, LockoutState, LockoutStore, MemoryStore,
    minutes_remaining,
};
pub use media::{MediaKind, UploadValidationError};
pub use types::*;
