//! HTTP client for the Commissaire REST API.
//!
//! A thin, resilient wrapper over `reqwest`: builds requests against the
//! configured server, attaches authentication, retries transient
//! failures with exponential backoff, and translates HTTP and transport
//! outcomes into [`ApiResult`] / [`ApiError`].
//!
//! # Example
//!
//! ```rust,no_run
//! use commctl_client::ApiClient;
//! use commctl_config::{AuthMode, SessionConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SessionConfig::new(
//!     "http://127.0.0.1:8080",
//!     AuthMode::Token("sekrit".to_string()),
//!     true,
//!     30,
//! )?;
//! let client = ApiClient::new(&config)?;
//! let hosts = client.list_hosts().await?;
//! println!("{} host(s)", hosts.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use rand::Rng;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};

use commctl_config::{AuthMode, SessionConfig};

use crate::error::ApiError;
use crate::models::{Cluster, ClusterDetail, ClusterSpec, Host, HostSpec};

/// Maximum attempts per call, including the first.
pub const MAX_ATTEMPTS: u32 = 3;

/// First backoff delay; doubles per failed attempt.
const BACKOFF_BASE: Duration = Duration::from_millis(200);

/// Backoff ceiling.
const BACKOFF_CAP: Duration = Duration::from_secs(2);

/// Upper bound of the random jitter added to each backoff delay.
const JITTER_MAX_MS: u64 = 50;

/// Outcome of a successful API call.
///
/// Every call returns exactly one of [`ApiResult`] or [`ApiError`].
#[derive(Debug, Clone)]
pub struct ApiResult {
    /// HTTP status code of the final attempt.
    pub status: u16,
    /// Response body.
    pub body: ResponseBody,
}

/// Response body, parsed as JSON when the server says it is JSON.
#[derive(Debug, Clone)]
pub enum ResponseBody {
    /// Parsed JSON document.
    Json(Value),
    /// Anything else, kept as raw bytes.
    Raw(Vec<u8>),
}

impl ApiResult {
    /// Whether the response carried no content (204 or an empty body).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.body {
            ResponseBody::Json(value) => value.is_null(),
            ResponseBody::Raw(bytes) => bytes.is_empty(),
        }
    }

    /// Decodes the JSON body into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`] if the body is not JSON or does not
    /// match the expected shape.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self.body {
            ResponseBody::Json(value) => {
                serde_json::from_value(value).map_err(|e| ApiError::Invalid {
                    reason: format!("unexpected response shape: {e}"),
                })
            }
            ResponseBody::Raw(_) => Err(ApiError::Invalid {
                reason: "expected a JSON response".to_string(),
            }),
        }
    }
}

/// One attempt's disposition inside the retry loop.
enum Outcome {
    Done(ApiResult),
    Fatal(ApiError),
    Retry(ApiError),
}

/// Client for the Commissaire REST API.
///
/// Holds no mutable state across calls; the underlying connection pool
/// is reused within one invocation purely as a performance optimization.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth: AuthMode,
}

impl ApiClient {
    /// Builds a client from a resolved session configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: &SessionConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.timeout());
        if !config.tls_verify() {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder.build().map_err(|e| ApiError::Invalid {
            reason: format!("could not build HTTP client: {e}"),
        })?;
        Ok(Self {
            http,
            base_url: config.server_url().to_string(),
            auth: config.auth().clone(),
        })
    }

    /// Issues one API call with the retry policy applied.
    ///
    /// Transport failures and HTTP 5xx responses are retried up to
    /// [`MAX_ATTEMPTS`] total attempts with exponential backoff
    /// (200ms doubling, capped at 2s, plus up to 50ms of jitter).
    /// 4xx responses are caller errors and are never retried.
    ///
    /// # Errors
    ///
    /// See [`ApiError`] for the classification.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResult, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut failures = 0u32;
        loop {
            debug!(%url, method = %method, attempt = failures + 1, "issuing request");
            match self.attempt(method.clone(), &url, body).await {
                Outcome::Done(result) => return Ok(result),
                Outcome::Fatal(err) => return Err(err),
                Outcome::Retry(err) => {
                    failures += 1;
                    if failures >= MAX_ATTEMPTS {
                        return Err(err);
                    }
                    let delay = backoff_delay(failures);
                    warn!(
                        %url,
                        failed_attempts = failures,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient failure, backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    async fn attempt(&self, method: Method, url: &str, body: Option<&Value>) -> Outcome {
        let mut request = self.http.request(method, url);
        request = match &self.auth {
            AuthMode::Basic { username, password } => request.basic_auth(username, Some(password)),
            AuthMode::Token(token) => request.bearer_auth(token),
            AuthMode::None => request,
        };
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                return Outcome::Retry(ApiError::Unreachable {
                    reason: transport_reason(&e),
                });
            }
        };

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("json"));
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                return Outcome::Retry(ApiError::Unreachable {
                    reason: transport_reason(&e),
                });
            }
        };

        if status.is_success() {
            let body = if is_json && !bytes.is_empty() {
                match serde_json::from_slice(&bytes) {
                    Ok(value) => ResponseBody::Json(value),
                    Err(e) => {
                        return Outcome::Fatal(ApiError::Invalid {
                            reason: format!("malformed JSON response: {e}"),
                        });
                    }
                }
            } else {
                ResponseBody::Raw(bytes.to_vec())
            };
            return Outcome::Done(ApiResult {
                status: status.as_u16(),
                body,
            });
        }

        let text = String::from_utf8_lossy(&bytes).into_owned();
        if status.is_client_error() {
            Outcome::Fatal(ApiError::Client {
                status: status.as_u16(),
                body: text,
            })
        } else if status.is_server_error() {
            Outcome::Retry(ApiError::Server {
                status: status.as_u16(),
                body: text,
            })
        } else {
            Outcome::Fatal(ApiError::Invalid {
                reason: format!("unexpected HTTP status {status}"),
            })
        }
    }

    // ========================================================================
    // Host Operations
    // ========================================================================

    /// Lists all hosts known to the service.
    ///
    /// An empty or 204 response is an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_hosts(&self) -> Result<Vec<Host>, ApiError> {
        let result = self.call(Method::GET, "/api/v0/hosts", None).await?;
        if result.is_empty() {
            return Ok(Vec::new());
        }
        result.decode()
    }

    /// Lists the host addresses belonging to one cluster.
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster is not found or the request fails.
    pub async fn list_cluster_hosts(&self, name: &str) -> Result<Vec<String>, ApiError> {
        let result = self
            .call(Method::GET, &format!("/api/v0/cluster/{name}/hosts"), None)
            .await?;
        if result.is_empty() {
            return Ok(Vec::new());
        }
        result.decode()
    }

    /// Fetches one host by address.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not found or the request fails.
    pub async fn get_host(&self, address: &str) -> Result<Host, ApiError> {
        self.call(Method::GET, &format!("/api/v0/host/{address}"), None)
            .await?
            .decode()
    }

    /// Registers a host with the service.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the spec or the request
    /// fails.
    pub async fn create_host(&self, spec: &HostSpec) -> Result<(), ApiError> {
        self.call(
            Method::PUT,
            &format!("/api/v0/host/{}", spec.address),
            Some(&spec.to_body()),
        )
        .await?;
        Ok(())
    }

    /// Removes a host from the service.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not found or the request fails.
    pub async fn delete_host(&self, address: &str) -> Result<(), ApiError> {
        self.call(Method::DELETE, &format!("/api/v0/host/{address}"), None)
            .await?;
        Ok(())
    }

    // ========================================================================
    // Cluster Operations
    // ========================================================================

    /// Lists the names of all clusters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_clusters(&self) -> Result<Vec<String>, ApiError> {
        let result = self.call(Method::GET, "/api/v0/clusters", None).await?;
        if result.is_empty() {
            return Ok(Vec::new());
        }
        result.decode()
    }

    /// Fetches one cluster by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster is not found or the request fails.
    pub async fn get_cluster(&self, name: &str) -> Result<Cluster, ApiError> {
        let detail: ClusterDetail = self
            .call(Method::GET, &format!("/api/v0/cluster/{name}"), None)
            .await?
            .decode()?;
        Ok(detail.into_cluster(name))
    }

    /// Creates a cluster.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the spec or the request
    /// fails.
    pub async fn create_cluster(&self, spec: &ClusterSpec) -> Result<(), ApiError> {
        self.call(
            Method::PUT,
            &format!("/api/v0/cluster/{}", spec.name),
            Some(&spec.to_body()),
        )
        .await?;
        Ok(())
    }

    /// Deletes a cluster. Member hosts are disassociated, not deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster is not found or the request fails.
    pub async fn delete_cluster(&self, name: &str) -> Result<(), ApiError> {
        self.call(Method::DELETE, &format!("/api/v0/cluster/{name}"), None)
            .await?;
        Ok(())
    }
}

/// Delay before the next attempt after `failed_attempts` failures.
fn backoff_delay(failed_attempts: u32) -> Duration {
    let doubled = BACKOFF_BASE.saturating_mul(1 << (failed_attempts - 1));
    let jitter = rand::thread_rng().gen_range(0..=JITTER_MAX_MS);
    doubled.min(BACKOFF_CAP) + Duration::from_millis(jitter)
}

/// Human-readable reason for a transport failure. Secrets never appear
/// here; credentials live in headers, which reqwest does not echo.
fn transport_reason(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        // Jitter adds at most 50ms on top of the deterministic part.
        let first = backoff_delay(1);
        assert!(first >= Duration::from_millis(200));
        assert!(first <= Duration::from_millis(250));

        let second = backoff_delay(2);
        assert!(second >= Duration::from_millis(400));
        assert!(second <= Duration::from_millis(450));

        let huge = backoff_delay(10);
        assert!(huge >= Duration::from_secs(2));
        assert!(huge <= Duration::from_millis(2050));
    }

    #[test]
    fn api_result_empty_detection() {
        let empty = ApiResult {
            status: 204,
            body: ResponseBody::Raw(Vec::new()),
        };
        assert!(empty.is_empty());

        let json = ApiResult {
            status: 200,
            body: ResponseBody::Json(serde_json::json!([])),
        };
        assert!(!json.is_empty());

        let null = ApiResult {
            status: 200,
            body: ResponseBody::Json(Value::Null),
        };
        assert!(null.is_empty());
    }

    #[test]
    fn api_result_decode_rejects_raw() {
        let raw = ApiResult {
            status: 200,
            body: ResponseBody::Raw(b"not json".to_vec()),
        };
        let err = raw.decode::<Vec<String>>().expect_err("should fail");
        assert!(matches!(err, ApiError::Invalid { .. }));
    }
}
