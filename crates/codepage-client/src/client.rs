//! Authenticated request client with token caching and a retry ladder.

use std::sync::Arc;

use serde_json::Value;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use codepage_cache::TokenCache;
use codepage_core::error::{AppError, ErrorKind};
use codepage_core::result::AppResult;
use codepage_core::traits::clock::{Sleeper, TokioSleeper};
use codepage_core::traits::transport::{HttpRequest, HttpResponse, HttpTransport, Method};

use crate::auth::Authenticator;
use crate::retry::RetryPolicy;
use crate::wire::TokenResponse;

/// Header carrying the realm every request is addressed to.
const REALM_HEADER: &str = "QB-Realm-Hostname";

/// Every call to the remote store goes through this client.
///
/// A call resolves a temporary token for its resource id, sends the
/// request, refreshes the token once if the first attempt is rejected
/// with 401, and retries transient failures along the policy's ladder.
#[derive(Debug)]
pub struct RequestClient {
    transport: Arc<dyn HttpTransport>,
    authenticator: Authenticator,
    tokens: Arc<TokenCache>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    realm: Option<String>,
}

impl RequestClient {
    /// Create a client that sleeps on the tokio timer between attempts.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        authenticator: Authenticator,
        tokens: Arc<TokenCache>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            authenticator,
            tokens,
            policy,
            sleeper: Arc::new(TokioSleeper),
            realm: None,
        }
    }

    /// Replace the sleeper used for backoff delays.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Address every request to a realm. Blank values are ignored.
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        let realm = realm.into();
        self.realm = (!realm.trim().is_empty()).then_some(realm);
        self
    }

    /// The token cache shared by this client.
    pub fn tokens(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    /// The retry policy in effect.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// `GET` a resource.
    pub async fn get(&self, path: &str, resource_id: &str) -> AppResult<Value> {
        self.request(Method::Get, path, None, resource_id).await
    }

    /// `POST` a JSON payload.
    pub async fn post(&self, path: &str, payload: Value, resource_id: &str) -> AppResult<Value> {
        self.request(Method::Post, path, Some(payload), resource_id).await
    }

    /// `PATCH` a JSON payload.
    pub async fn patch(&self, path: &str, payload: Value, resource_id: &str) -> AppResult<Value> {
        self.request(Method::Patch, path, Some(payload), resource_id)
            .await
    }

    /// `DELETE`, optionally with a JSON payload.
    pub async fn delete(
        &self,
        path: &str,
        payload: Option<Value>,
        resource_id: &str,
    ) -> AppResult<Value> {
        self.request(Method::Delete, path, payload, resource_id)
            .await
    }

    /// Perform one logical call and return the parsed response body.
    ///
    /// An empty success body parses as `null`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        payload: Option<Value>,
        resource_id: &str,
    ) -> AppResult<Value> {
        let span = info_span!(
            "store_request",
            request_id = %Uuid::new_v4(),
            method = %method,
            path,
            resource_id,
        );
        self.run(method, path, payload, resource_id)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        method: Method,
        path: &str,
        payload: Option<Value>,
        resource_id: &str,
    ) -> AppResult<Value> {
        let mut attempt = 1u32;
        let mut refreshed = false;

        loop {
            let token = self.token_for(resource_id).await?;
            debug!(method = %method, path, attempt, "Sending request");

            let err = match self.send_once(method, path, payload.clone(), &token).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if err.is_unauthorized() && attempt == 1 && !refreshed {
                info!(path, resource_id, "Temporary token rejected, refreshing once");
                self.tokens.invalidate_if(resource_id, &token).await;
                refreshed = true;
                continue;
            }

            if !self.policy.should_retry(&err, attempt) {
                return Err(surface(err));
            }

            let delay = self.policy.delay_for(attempt);
            warn!(
                method = %method,
                path,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "Request failed, backing off"
            );
            self.sleeper.sleep(delay).await;
            attempt += 1;
        }
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        payload: Option<Value>,
        token: &str,
    ) -> AppResult<Value> {
        let request = self
            .with_realm_header(HttpRequest::new(method, path))
            .header("Authorization", format!("QB-TEMP-TOKEN {token}"))
            .json(payload);

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(AppError::http(response.status, response.body));
        }
        parse_body(&response)
    }

    async fn token_for(&self, resource_id: &str) -> AppResult<String> {
        self.tokens
            .get_or_acquire(resource_id, || self.issue_token(resource_id))
            .await
    }

    /// Ask the issuance endpoint for a token scoped to `resource_id`.
    async fn issue_token(&self, resource_id: &str) -> AppResult<String> {
        let mut request =
            HttpRequest::new(Method::Get, format!("/auth/temporary/{resource_id}"));
        for (name, value) in self.authenticator.credential_headers() {
            request = request.header(name, value);
        }
        let request = self.with_realm_header(request);

        debug!(resource_id, mode = ?self.authenticator.mode(), "Requesting temporary token");
        let response = self.transport.send(request).await.map_err(|e| {
            AppError::authentication(format!(
                "Could not obtain a temporary token for {resource_id}: {}",
                e.message
            ))
        })?;

        if !response.is_success() {
            return Err(AppError {
                status: Some(response.status),
                body: Some(response.body),
                ..AppError::authentication(format!(
                    "Token issuance for {resource_id} was refused with status {}",
                    response.status
                ))
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&response.body).map_err(|e| {
            AppError::with_source(
                ErrorKind::Authentication,
                format!("Token issuance for {resource_id} returned an unreadable body"),
                e,
            )
        })?;
        Ok(parsed.temporary_authorization)
    }

    fn with_realm_header(&self, request: HttpRequest) -> HttpRequest {
        match &self.realm {
            Some(realm) => request.header(REALM_HEADER, realm.clone()),
            None => request,
        }
    }
}

fn parse_body(response: &HttpResponse) -> AppResult<Value> {
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(|e| {
        AppError::with_source(
            ErrorKind::Serialization,
            format!("Remote store returned invalid JSON: {e}"),
            e,
        )
    })
}

/// A 401 that outlived the refresh is an authentication failure.
fn surface(err: AppError) -> AppError {
    if err.is_unauthorized() {
        AppError {
            kind: ErrorKind::Authentication,
            message: "Temporary token was rejected after refresh".to_string(),
            ..err
        }
    } else {
        err
    }
}
