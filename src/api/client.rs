//! API client for the Gather event-enrollment platform.
//!
//! `ApiClient` is the single path every outbound call takes. It attaches the
//! stored bearer token, and on a 401 delegates to the refresh coordinator and
//! replays the request exactly once with the renewed token. A 401 that
//! survives the replay is surfaced; nothing is ever retried a second time.

use std::time::Duration;

use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::{RefreshCoordinator, TokenStore};
use crate::models::{Enrollment, Event, EventDraft, EventFilter, Role, UserProfile};

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access: String,
    refresh: String,
}

/// API client for the Gather platform.
/// Clone is cheap - reqwest::Client uses Arc internally for connection
/// pooling, and the token store and refresh coordinator are shared handles.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    store: TokenStore,
    refresher: RefreshCoordinator,
}

impl ApiClient {
    /// Create a client against the given API root (e.g.
    /// `http://localhost:8000/api`), reading and writing tokens through the
    /// injected store.
    pub fn new(base_url: impl Into<String>, store: TokenStore) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let refresher = RefreshCoordinator::new(http.clone(), &base_url, store.clone());

        Ok(Self {
            http,
            base_url,
            store,
            refresher,
        })
    }

    /// The token store this client reads from and writes to.
    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    // ===== Dispatch =====

    /// Issue one request, attaching the current access token if present.
    /// The token is read from the store at send time, so a replay after
    /// renewal picks up the fresh one rather than a stale capture.
    async fn issue<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let mut request = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(access) = self.store.access() {
            request = request.bearer_auth(access);
        }
        Ok(request.send().await?)
    }

    /// Send an authorized request. On 401, renew the access token through the
    /// coordinator and replay once; the `retried` flag is what makes the
    /// exactly-once rule hold. Renewal failure surfaces as `SessionExpired`
    /// and the caller owns the transition back to the login view.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let mut retried = false;
        loop {
            let response = self.issue(method.clone(), path, query, body).await?;
            if response.status() == StatusCode::UNAUTHORIZED && !retried {
                retried = true;
                debug!(path, "access token rejected, renewing");
                self.refresher.renew().await?;
                continue;
            }
            return Ok(response);
        }
    }

    /// Send without the 401 renewal machinery. Used by the endpoints that
    /// establish sessions (`login`, `signup`, `verify-email`), where a 401
    /// means bad credentials and the server's message must reach the user.
    async fn send_no_renew<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        self.issue(method, path, &[], body).await
    }

    /// Check if a response is successful, mapping the status and body to the
    /// error taxonomy if not.
    async fn check(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        let response = self.send(Method::GET, path, query, None::<&()>).await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.send(Method::POST, path, &[], Some(body)).await?;
        Ok(Self::check(response).await?.json().await?)
    }

    // ===== Auth endpoints =====

    /// Log in with email and password, store the issued token pair, and
    /// return the user's profile.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self
            .send_no_renew(Method::POST, "/auth/login/", Some(&body))
            .await?;
        let tokens: LoginResponse = Self::check(response).await?.json().await?;

        if let Err(err) = self.store.set(tokens.access, Some(tokens.refresh)) {
            // The session works for this run; it just won't survive a restart.
            warn!(error = %err, "failed to persist login tokens");
        }

        let profile = self.profile().await?;
        info!(email = %profile.email, role = %profile.role, "logged in");
        Ok(profile)
    }

    /// Register a new account. No session is created; the user must verify
    /// their email with the OTP sent to it, then log in.
    pub async fn signup(&self, email: &str, password: &str, role: Role) -> Result<(), ApiError> {
        let body = serde_json::json!({ "email": email, "password": password, "role": role });
        let response = self
            .send_no_renew(Method::POST, "/auth/signup/", Some(&body))
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Confirm an account with the 6-digit OTP from the signup email.
    pub async fn verify_email(&self, email: &str, otp: &str) -> Result<(), ApiError> {
        let body = serde_json::json!({ "email": email, "otp": otp });
        let response = self
            .send_no_renew(Method::POST, "/auth/verify-email/", Some(&body))
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Fetch the signed-in user's profile.
    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.get_json("/auth/profile/", &[]).await
    }

    /// Drop the stored tokens. Local only; the server keeps no session state
    /// worth revoking.
    pub fn logout(&self) {
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to clear token store on logout");
        }
        info!("logged out");
    }

    // ===== Events =====

    /// List events. Facilitators get their own events; seekers get the
    /// catalog narrowed by the filter.
    pub async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>, ApiError> {
        self.get_json("/events/", &filter.to_query()).await
    }

    pub async fn event(&self, event_id: i64) -> Result<Event, ApiError> {
        self.get_json(&format!("/events/{}/", event_id), &[]).await
    }

    /// Create an event (facilitator only).
    pub async fn create_event(&self, draft: &EventDraft) -> Result<Event, ApiError> {
        self.post_json("/events/", draft).await
    }

    /// Replace an event's fields (facilitator only, own events).
    pub async fn update_event(&self, event_id: i64, draft: &EventDraft) -> Result<Event, ApiError> {
        let response = self
            .send(Method::PUT, &format!("/events/{}/", event_id), &[], Some(draft))
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Delete an event (facilitator only, own events).
    pub async fn delete_event(&self, event_id: i64) -> Result<(), ApiError> {
        let response = self
            .send(
                Method::DELETE,
                &format!("/events/{}/", event_id),
                &[],
                None::<&()>,
            )
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// List active enrollments for one of the facilitator's events.
    pub async fn event_enrollments(&self, event_id: i64) -> Result<Vec<Enrollment>, ApiError> {
        self.get_json(&format!("/events/{}/enrollments/", event_id), &[])
            .await
    }

    // ===== Enrollments (seeker) =====

    /// Enroll the signed-in seeker in an event.
    pub async fn enroll(&self, event_id: i64) -> Result<Enrollment, ApiError> {
        let body = serde_json::json!({ "event": event_id });
        self.post_json("/enrollments/", &body).await
    }

    pub async fn my_enrollments(&self) -> Result<Vec<Enrollment>, ApiError> {
        self.get_json("/enrollments/", &[]).await
    }

    pub async fn upcoming_enrollments(&self) -> Result<Vec<Enrollment>, ApiError> {
        self.get_json("/enrollments/upcoming/", &[]).await
    }

    pub async fn past_enrollments(&self) -> Result<Vec<Enrollment>, ApiError> {
        self.get_json("/enrollments/past/", &[]).await
    }

    /// Cancel an enrollment. The record stays behind with status `canceled`.
    pub async fn cancel_enrollment(&self, enrollment_id: i64) -> Result<Enrollment, ApiError> {
        let body = serde_json::json!({ "status": "canceled" });
        let response = self
            .send(
                Method::PATCH,
                &format!("/enrollments/{}/", enrollment_id),
                &[],
                Some(&body),
            )
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}
