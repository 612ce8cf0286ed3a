//! Session bootstrap: restore the signed-in user at application start.

use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::models::UserProfile;

/// Resolves the startup session state. The embedding application holds a
/// loading state while `bootstrap` runs and must not render any role-gated
/// view until it resolves.
pub struct Session {
    client: ApiClient,
}

impl Session {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Validate any stored credentials and return the current user.
    ///
    /// With no stored access token this resolves immediately to `None`, with
    /// zero network calls, so an anonymous start shows no loading delay. With
    /// a token, the profile is fetched through the dispatcher - an expired
    /// access token is renewed transparently on the way. Any failure tears
    /// the stored session down and resolves to `None`.
    pub async fn bootstrap(&self) -> Option<UserProfile> {
        if !self.client.store().has_session() {
            debug!("no stored access token, starting anonymous");
            return None;
        }

        match self.client.profile().await {
            Ok(profile) => {
                info!(email = %profile.email, role = %profile.role, "session restored");
                Some(profile)
            }
            Err(err) => {
                warn!(error = %err, "stored session rejected, clearing tokens");
                if let Err(err) = self.client.store().clear() {
                    warn!(error = %err, "failed to clear token store");
                }
                None
            }
        }
    }
}
