//! Credential selection and token acquisition.
//!
//! Two flows exist and exactly one runs per invocation:
//!
//! - **OAuth**: client-credentials grant against the Atlassian token
//!   endpoint; reports go through the Cloud API gateway.
//! - **Connect**: a connect key is exchanged for a JWT at a token service;
//!   reports go straight to the Jira site.

use std::fmt;

use tracing::debug;

use crate::client::JiraClient;
use crate::context::AuthMaterial;
use crate::error::{ReportError, Result};

/// Token service used when no connect hostname is configured.
pub const DEFAULT_CONNECT_HOSTNAME: &str = "https://jira-ci.harness.io";

/// Which flow produced a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    OAuth,
    Connect,
}

impl AuthScheme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OAuth => "oauth",
            Self::Connect => "connect",
        }
    }
}

/// Bearer token valid for the current run only.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    pub scheme: AuthScheme,
    value: String,
}

impl AuthToken {
    #[must_use]
    pub fn new(scheme: AuthScheme, value: impl Into<String>) -> Self {
        Self {
            scheme,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("scheme", &self.scheme)
            .field("value", &"***")
            .finish()
    }
}

/// Credentials selected for the run.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    OAuth {
        client_id: String,
        client_secret: String,
    },
    Connect {
        key: String,
        hostname: String,
    },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OAuth { client_id, .. } => f
                .debug_struct("OAuth")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
            Self::Connect { hostname, .. } => f
                .debug_struct("Connect")
                .field("hostname", hostname)
                .finish_non_exhaustive(),
        }
    }
}

impl Credentials {
    /// Pick the flow from configured material.
    ///
    /// A complete OAuth pair wins; otherwise a connect key is required. The
    /// connect hostname falls back to [`DEFAULT_CONNECT_HOSTNAME`].
    pub fn select(auth: &AuthMaterial) -> Result<Self> {
        if !auth.client_id.is_empty() && !auth.client_secret.is_empty() {
            return Ok(Self::OAuth {
                client_id: auth.client_id.clone(),
                client_secret: auth.client_secret.clone(),
            });
        }

        if auth.connect_key.is_empty() {
            debug!("Client id and secret are empty; specify them or a connect key");
            return Err(ReportError::MissingCredentials);
        }

        let hostname = if auth.connect_hostname.is_empty() {
            DEFAULT_CONNECT_HOSTNAME.to_string()
        } else {
            auth.connect_hostname.clone()
        };

        Ok(Self::Connect {
            key: auth.connect_key.clone(),
            hostname,
        })
    }

    #[must_use]
    pub const fn scheme(&self) -> AuthScheme {
        match self {
            Self::OAuth { .. } => AuthScheme::OAuth,
            Self::Connect { .. } => AuthScheme::Connect,
        }
    }

    /// Acquire a bearer token with the selected flow.
    pub async fn authenticate(&self, client: &JiraClient) -> Result<AuthToken> {
        let value = match self {
            Self::OAuth {
                client_id,
                client_secret,
            } => {
                debug!("Creating OAuth token for deployment");
                client.request_oauth_token(client_id, client_secret).await?
            }
            Self::Connect { key, hostname } => {
                debug!(hostname = %hostname, "Creating JWT token from connect key");
                client.request_connect_token(key, hostname).await?
            }
        };
        Ok(AuthToken::new(self.scheme(), value))
    }
}
