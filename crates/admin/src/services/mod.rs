//! Business logic services for admin.
//!
//! # Services
//!
//! - `activity` - Best-effort audit log of console actions
//! - `auth` - Email/password sign-in gate with browser lockout
//! - `identity` - Hosted identity provider client (Firebase Auth REST)
//! - `media` - Cloudinary client for the media library

pub mod activity;
pub mod auth;
pub mod identity;
pub mod media;

pub use activity::{ActivityLogger, ActivitySink};
pub use auth::{AdminDirectory, AuthGate, LoginError};
pub use identity::{AuthProviderError, FirebaseAuthClient, IdentityProvider, ProviderSession};
pub use media::{CloudinaryClient, MediaAsset, MediaError, MediaPage, Transformation};
