use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),

    #[error("upstream request failed: {0}")]
    Unreachable(String),

    #[error("failed to decode upstream response: {0}")]
    Decode(String),
}

/// A user record as served by the upstream
///
/// Fields beyond these four are dropped on decode. Missing or `null` fields
/// decode to zero values (`0`, `""`) and the record is still served.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Source of user records
///
/// Production code uses `HttpUserSource`. Tests plug in in-memory sources.
#[async_trait]
pub trait UserSource: Send + Sync {
    /// Fetch the full user list. Called once per request, never retried.
    async fn fetch_users(&self) -> Result<Vec<User>, UpstreamError>;
}

/// Fetches users with a single bounded GET against a fixed URL
pub struct HttpUserSource {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpUserSource {
    pub fn new(url: String, timeout: Duration) -> Self {
        let client = match reqwest::Client::builder().timeout(timeout).build() {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build upstream HTTP client, using default");
                reqwest::Client::new()
            }
        };
        Self::with_client(client, url, timeout)
    }

    /// Use an existing client. `timeout` is enforced per request, whatever
    /// the client's own settings.
    pub fn with_client(client: reqwest::Client, url: String, timeout: Duration) -> Self {
        Self {
            client,
            url,
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn classify(&self, e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else {
            UpstreamError::Unreachable(e.to_string())
        }
    }
}

#[async_trait]
impl UserSource for HttpUserSource {
    async fn fetch_users(&self) -> Result<Vec<User>, UpstreamError> {
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        // Status is not checked: whatever body comes back must decode as users.
        // `bytes()` consumes the response, so the connection is released on
        // both the read-error and the decode-error path.
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        decode_users(&body)
    }
}

/// Decode an upstream body into user records
pub fn decode_users(body: &[u8]) -> Result<Vec<User>, UpstreamError> {
    serde_json::from_slice(body).map_err(|e| UpstreamError::Decode(e.to_string()))
}
