//! REST API client module for the Gather platform.
//!
//! This module provides the `ApiClient` for communicating with the platform
//! API: auth endpoints, event CRUD, and enrollments. The API uses JWT bearer
//! authentication; an expired access token is renewed transparently through
//! the refresh coordinator and the failed request is replayed exactly once.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::{ApiError, ErrorDetail};
