//! Azure Resource Manager request plumbing shared by both clients.

use crate::{Credentials, ProvisionError, Result};
use azure_core::auth::TokenCredential;
use azure_identity::ClientSecretCredential;
use reqwest::header::{HeaderMap, LOCATION, RETRY_AFTER};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;
use uuid::Uuid;

/// Public cloud management endpoint.
pub const MANAGEMENT_ENDPOINT: &str = "https://management.azure.com/";

/// Public cloud Azure AD authority.
pub const AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Token scope for management requests.
const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

/// Poll interval when a long-running operation gives no `Retry-After`.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Authenticated ARM client scoped to one subscription.
pub struct ArmClient {
    http: reqwest::Client,
    credential: Arc<dyn TokenCredential>,
    endpoint: Url,
    subscription_id: String,
}

impl std::fmt::Debug for ArmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("subscription_id", &self.subscription_id)
            .finish_non_exhaustive()
    }
}

impl ArmClient {
    /// Creates a client that authenticates as the service principal in
    /// `credentials`.
    pub fn new(credentials: &Credentials) -> Result<Self> {
        let authority = Url::parse(AUTHORITY_HOST)
            .map_err(|e| ProvisionError::Other(anyhow::anyhow!("invalid authority host: {}", e)))?;

        let credential = ClientSecretCredential::new(
            azure_core::new_http_client(),
            authority,
            credentials.tenant_id.clone(),
            credentials.client_id.clone(),
            credentials.client_secret.clone(),
        );

        Self::with_credential(
            Arc::new(credential),
            MANAGEMENT_ENDPOINT,
            credentials.subscription_id.clone(),
        )
    }

    /// Creates a client with an explicit token source and endpoint.
    pub fn with_credential(
        credential: Arc<dyn TokenCredential>,
        endpoint: &str,
        subscription_id: String,
    ) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            ProvisionError::Other(anyhow::anyhow!("invalid management endpoint {}: {}", endpoint, e))
        })?;

        Ok(Self {
            http: reqwest::Client::new(),
            credential,
            endpoint,
            subscription_id,
        })
    }

    /// Subscription the client is scoped to.
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Builds `{endpoint}/subscriptions/{id}{path}?api-version=...`.
    pub fn subscription_url(&self, path: &str, api_version: &str) -> Result<Url> {
        let full = format!("subscriptions/{}{}", self.subscription_id, path);
        let mut url = self.endpoint.join(&full).map_err(|e| {
            ProvisionError::Other(anyhow::anyhow!("invalid request path {}: {}", full, e))
        })?;
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    async fn token(&self) -> Result<String> {
        let token = self
            .credential
            .get_token(&[MANAGEMENT_SCOPE])
            .await
            .map_err(|e| ProvisionError::Authentication(e.to_string()))?;
        Ok(token.token.secret().to_string())
    }

    /// Sends a request and maps non-success statuses to errors.
    ///
    /// `target` names the resource in a [`ProvisionError::NotFound`].
    pub async fn send<B>(&self, method: Method, url: Url, body: Option<&B>, target: &str) -> Result<Response>
    where
        B: Serialize + ?Sized + Sync,
    {
        let token = self.token().await?;
        let request_id = Uuid::new_v4().to_string();
        debug!(%method, %url, request_id = %request_id, "ARM request");

        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(token)
            .header("x-ms-client-request-id", request_id);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        check_status(response, target).await
    }

    /// Sends a request and decodes the JSON response body.
    pub async fn send_json<B, T>(&self, method: Method, url: Url, body: Option<&B>, target: &str) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.send(method, url, body, target).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Waits for a long-running operation started by `response` to finish.
    ///
    /// Anything other than `202 Accepted` is already complete. Otherwise the
    /// `Location` header is polled until it stops answering 202.
    pub async fn wait_for_completion(&self, response: Response, target: &str) -> Result<()> {
        if response.status() != StatusCode::ACCEPTED {
            return Ok(());
        }

        let mut location = match location_header(response.headers()) {
            Some(url) => url,
            None => return Ok(()),
        };
        let mut delay = retry_after(response.headers());

        loop {
            debug!(resource = %target, delay_secs = delay.as_secs(), "operation in progress");
            tokio::time::sleep(delay).await;

            let poll = self
                .send::<()>(Method::GET, location.clone(), None, target)
                .await?;
            if poll.status() != StatusCode::ACCEPTED {
                return Ok(());
            }

            delay = retry_after(poll.headers());
            if let Some(next) = location_header(poll.headers()) {
                location = next;
            }
        }
    }
}

fn location_header(headers: &HeaderMap) -> Option<Url> {
    headers
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Url::parse(v).ok())
}

fn retry_after(headers: &HeaderMap) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_POLL_INTERVAL)
}

async fn check_status(response: Response, target: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body, target))
}

/// Maps an error status and body to a [`ProvisionError`].
pub(crate) fn status_error(status: StatusCode, body: &str, target: &str) -> ProvisionError {
    let (code, message) = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => (parsed.error.code, parsed.error.message),
        Err(_) => (
            status.canonical_reason().unwrap_or("Unknown").to_string(),
            body.to_string(),
        ),
    };

    match status {
        StatusCode::NOT_FOUND => ProvisionError::NotFound(target.to_string()),
        StatusCode::UNAUTHORIZED => ProvisionError::Authentication(format!("{}: {}", code, message)),
        _ => ProvisionError::Api {
            status: status.as_u16(),
            code,
            message,
        },
    }
}
