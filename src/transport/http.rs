//! HTTP plumbing shared by the NetWeaver clients.

use reqwest::{Certificate, Client, Method, Response};
use std::time::Duration;
use tracing::{debug, error};

use crate::config::ConnectionConfig;
use crate::error::{DeployerError, Result, TransportError};

/// Request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Header carrying the CSRF token.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Content type of raw uploads.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Builds the HTTP client for a connection.
///
/// Cookies are kept for the lifetime of the client so the session
/// established during connect is reused by later calls.
///
/// # Errors
///
/// Returns an error if the CA certificate cannot be read or the client
/// cannot be created.
pub fn build_client(connection: &ConnectionConfig) -> Result<Client> {
    let mut builder = Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .danger_accept_invalid_certs(!connection.strict_ssl);

    if connection.strict_ssl
        && let Some(path) = connection.ssl_certificate_path.as_deref()
    {
        debug!("Adding CA certificate from {path}");
        let pem = std::fs::read(path)?;
        let certificate = Certificate::from_pem(&pem).map_err(|e| {
            TransportError::connection(&connection.url, format!("Invalid certificate {path}: {e}"))
        })?;
        builder = builder.add_root_certificate(certificate);
    }

    builder.build().map_err(|e| {
        DeployerError::Transport(TransportError::connection(
            &connection.url,
            format!("Failed to create HTTP client: {e}"),
        ))
    })
}

/// Joins the connection URL and a service path.
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Maps a send failure to a connection error.
#[must_use]
pub fn send_error(url: &str, err: &reqwest::Error) -> DeployerError {
    DeployerError::Transport(TransportError::connection(url, err.to_string()))
}

/// Passes successful responses through and turns the rest into errors.
///
/// Failed responses are logged with their status, URL and body before the
/// error is returned.
///
/// # Errors
///
/// Returns `AuthenticationFailed` for 401 and 403 and `RequestFailed` for
/// every other non-success status.
pub async fn check_response(method: &Method, url: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let reason = status.canonical_reason().unwrap_or("Unknown status");
    let body = response.text().await.unwrap_or_default();
    error!("{} {reason}", status.as_u16());
    error!("Request: {method} {url}");
    if !body.is_empty() {
        error!("Response body: {body}");
    }

    let err = match status.as_u16() {
        401 | 403 => TransportError::AuthenticationFailed {
            url: url.to_string(),
            message: format!("{} {reason}", status.as_u16()),
        },
        code => TransportError::request(method.as_str(), url, code, reason),
    };
    Err(DeployerError::Transport(err))
}
