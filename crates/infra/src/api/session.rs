//! Authenticated session against one remote org
//!
//! A `Session` is the transport boundary every remote operation goes
//! through. It never refreshes its token and has no logout; an
//! unauthenticated session rejects each call before any network I/O.

use reqwest::multipart::Form;
use reqwest::{Method, StatusCode};
use scratchforce_domain::{ForceConfig, ForceError, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::errors::InfraError;
use crate::http::HttpClient;

/// Token endpoint response of the authorization-code grant
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    instance_url: String,
}

/// Error body of the token endpoint
#[derive(Debug, Deserialize)]
struct TokenError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Session with an instance URL, bearer token and API version
#[derive(Clone)]
pub struct Session {
    http: HttpClient,
    instance_url: String,
    access_token: String,
    api_version: String,
}

const USER_AGENT: &str = concat!("scratchforce/", env!("CARGO_PKG_VERSION"));

fn http_client(config: &ForceConfig) -> Result<HttpClient> {
    HttpClient::builder().timeout(config.http_timeout()).user_agent(USER_AGENT).build()
}

impl Session {
    /// Session from an already issued access token.
    pub fn with_token(
        instance_url: impl Into<String>,
        access_token: impl Into<String>,
        config: &ForceConfig,
    ) -> Result<Self> {
        let http = http_client(config)?;
        Ok(Self::from_parts(http, instance_url.into(), access_token.into(), config))
    }

    /// Session holding no credentials. Every remote call fails with `Auth`.
    pub fn unauthenticated(config: &ForceConfig) -> Result<Self> {
        Self::with_token(String::new(), String::new(), config)
    }

    /// Exchange a one-time authorization code for a session.
    ///
    /// Posts the code to `{login_url}/services/oauth2/token` using the
    /// configured connected app.
    #[instrument(skip(config, login_url, auth_code), fields(login_url = %login_url))]
    pub async fn login_with_auth_code(
        config: &ForceConfig,
        login_url: &str,
        auth_code: &str,
    ) -> Result<Self> {
        if auth_code.is_empty() {
            return Err(ForceError::Auth("authorization code is empty".into()));
        }

        let http = http_client(config)?;
        let url = format!("{}/services/oauth2/token", login_url.trim_end_matches('/'));
        let form = [
            ("grant_type", "authorization_code"),
            ("code", auth_code),
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
        ];

        let response = http.send(http.request(Method::POST, &url).form(&form)).await?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| ForceError::from(InfraError::from(e)))?;

        if !status.is_success() {
            let message = match serde_json::from_slice::<TokenError>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => format!("token endpoint returned status {status}"),
            };
            warn!(%status, "Authorization code exchange rejected");
            return Err(ForceError::Auth(message));
        }

        let token: TokenResponse =
            serde_json::from_slice(&body).map_err(|e| ForceError::from(InfraError::from(e)))?;
        info!(instance_url = %token.instance_url, "Logged in with authorization code");

        Ok(Self::from_parts(http, token.instance_url, token.access_token, config))
    }

    fn from_parts(
        http: HttpClient,
        instance_url: String,
        access_token: String,
        config: &ForceConfig,
    ) -> Self {
        Self {
            http,
            instance_url: instance_url.trim_end_matches('/').to_string(),
            access_token,
            api_version: config.api_version.clone(),
        }
    }

    /// True iff both the token and the instance URL are present.
    pub fn is_authenticated(&self) -> bool {
        !self.access_token.is_empty() && !self.instance_url.is_empty()
    }

    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Absolute URL under the versioned data API, e.g. `/query`.
    pub fn data_url(&self, path: &str) -> String {
        format!("{}/services/data/v{}{}", self.instance_url, self.api_version, path)
    }

    /// Absolute URL for a server-relative path such as `nextRecordsUrl`.
    pub fn instance_path(&self, path: &str) -> String {
        format!("{}{}", self.instance_url, path)
    }

    /// Send an authenticated request and return the raw response body.
    ///
    /// Any 2xx status is success. A JSON `body` is sent with its content type.
    pub async fn authenticated_request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Vec<u8>> {
        self.ensure_authenticated()?;

        let mut request = self.http.request(method, url).bearer_auth(&self.access_token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self.http.send(request).await?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| ForceError::from(InfraError::from(e)))?;

        if !status.is_success() {
            return Err(map_status_error(status, url, &bytes));
        }
        Ok(bytes.to_vec())
    }

    /// Post an authenticated multipart form and return the raw response body.
    ///
    /// Only `201 Created` counts as success.
    pub async fn authenticated_multipart(&self, url: &str, form: Form) -> Result<Vec<u8>> {
        self.ensure_authenticated()?;

        let request =
            self.http.request(Method::POST, url).bearer_auth(&self.access_token).multipart(form);

        let response = self.http.send(request).await?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| ForceError::from(InfraError::from(e)))?;

        if status != StatusCode::CREATED {
            debug!(%status, "Multipart submission not accepted");
            return Err(map_status_error(status, url, &bytes));
        }
        Ok(bytes.to_vec())
    }

    pub(crate) fn ensure_authenticated(&self) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(ForceError::not_authenticated())
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("instance_url", &self.instance_url)
            .field("access_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Classify a non-success HTTP response.
///
/// The remote side reports errors as `[{"errorCode": ..., "message": ...}]`;
/// when that shape is present its code and message are kept verbatim.
fn map_status_error(status: StatusCode, url: &str, body: &[u8]) -> ForceError {
    let details: Option<Value> = serde_json::from_slice(body).ok();
    let first = details.as_ref().and_then(|d| d.get(0));
    let code = first
        .and_then(|e| e.get("errorCode"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let remote_message = first.and_then(|e| e.get("message")).and_then(Value::as_str);

    let text = String::from_utf8_lossy(body);
    let message = match remote_message {
        Some(message) => message.to_string(),
        None if text.is_empty() => format!("{} returned status {}", url, status),
        None => format!("{} returned status {}: {}", url, status, text),
    };

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        ForceError::Auth(message)
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        ForceError::Network(message)
    } else {
        ForceError::Remote { operation: format!("HTTP {}", status.as_u16()), code, message, details }
    }
}
