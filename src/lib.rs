//! Gatherkit - client library for the Gather event-enrollment platform.
//!
//! This crate implements the authenticated request layer the UI builds on:
//! a durable [`TokenStore`] holding the access/refresh token pair, an
//! [`ApiClient`] that attaches the bearer token to outgoing calls and
//! transparently renews it once on a 401, a [`RefreshCoordinator`] that
//! coalesces concurrent renewals into a single in-flight exchange, and a
//! [`Session`] bootstrapper that restores the signed-in user at startup.
//!
//! The library never renders UI and installs no tracing subscriber; it
//! returns typed results (`ApiError`, `RefreshError`) that the embedding
//! application reacts to - in particular, `ApiError::SessionExpired` is the
//! signal to navigate back to the login view.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, ErrorDetail};
pub use auth::{RefreshCoordinator, RefreshError, Session, TokenStore};
pub use config::Config;
pub use models::{
    Enrollment, EnrollmentStatus, Event, EventDraft, EventFilter, Role, UserProfile,
};
