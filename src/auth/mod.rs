//! Authentication module: token storage, renewal, and session bootstrap.
//!
//! This module provides:
//! - `TokenStore`: durable storage for the access/refresh token pair
//! - `RefreshCoordinator`: single-flight exchange of the refresh token for
//!   a fresh access token
//! - `Session`: startup restoration of the signed-in user
//!
//! Tokens are persisted to disk and survive application restarts; logout or
//! an unrecoverable renewal failure tears both down.

pub mod refresh;
pub mod session;
pub mod store;

pub use refresh::{RefreshCoordinator, RefreshError};
pub use session::Session;
pub use store::TokenStore;
