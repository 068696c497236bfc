//! Folio Admin library.
//!
//! The admin console for the Folio portfolio site as a library, so the
//! binary stays thin and handlers can be tested without a server.
//!
//! # Security
//!
//! The console holds privileged credentials:
//! - Cloudinary API secret (upload/delete on the media library)
//! - Write access to the `admin` schema (submissions, projects, settings)
//!
//! Sign-in goes through the hosted identity provider; the browser lockout
//! in [`services::auth`] only slows down password guessing from one
//! browser and is not a substitute for provider-side throttling.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
