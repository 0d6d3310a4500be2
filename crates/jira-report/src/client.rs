//! HTTP client for the Atlassian endpoints a run talks to.

use std::future::Future;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, FROM};
use reqwest::{Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::error::{ReportError, Result};

/// OAuth token endpoint
const OAUTH_TOKEN_URL: &str = "https://api.atlassian.com/oauth/token";

/// Jira Cloud API gateway
const CLOUD_API_BASE: &str = "https://api.atlassian.com";

/// Site URL, `{instance}` is replaced by the instance name
const SITE_URL_TEMPLATE: &str = "https://{instance}.atlassian.net";

/// Base URLs for every outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub oauth_token_url: String,
    pub cloud_api_base: String,
    pub site_url_template: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            oauth_token_url: OAUTH_TOKEN_URL.to_string(),
            cloud_api_base: CLOUD_API_BASE.to_string(),
            site_url_template: SITE_URL_TEMPLATE.to_string(),
        }
    }
}

impl Endpoints {
    /// Route every call to one base URL (for testing against a mock server).
    #[must_use]
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            oauth_token_url: format!("{base}/oauth/token"),
            cloud_api_base: base.to_string(),
            site_url_template: base.to_string(),
        }
    }

    #[must_use]
    pub fn site_url(&self, instance: &str) -> String {
        self.site_url_template.replace("{instance}", instance)
    }

    #[must_use]
    pub fn tenant_info_url(&self, instance: &str) -> String {
        format!("{}/_edge/tenant_info", self.site_url(instance))
    }

    #[must_use]
    pub fn browse_url(&self, instance: &str, issue: &str) -> String {
        format!("{}/browse/{issue}", self.site_url(instance))
    }

    /// Issue resource on the Cloud API gateway.
    ///
    /// The cloud id and issue key are pushed as single path segments, so a
    /// key containing `/` cannot address another resource. `None` when the
    /// base URL cannot carry a path.
    #[must_use]
    pub fn issue_url(&self, cloud_id: &str, issue: &str) -> Option<Url> {
        let mut url = Url::parse(&self.cloud_api_base).ok()?;
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(["ex", "jira", cloud_id, "rest", "api", "3", "issue", issue]);
        Some(url)
    }

    #[must_use]
    pub fn cloud_deployments_url(&self, cloud_id: &str) -> String {
        format!(
            "{}/jira/deployments/0.1/cloud/{cloud_id}/bulk",
            self.cloud_api_base
        )
    }

    #[must_use]
    pub fn connect_deployments_url(&self, instance: &str) -> String {
        format!("{}/rest/deployments/0.1/bulk", self.site_url(instance))
    }

    #[must_use]
    pub fn connect_builds_url(&self, instance: &str) -> String {
        format!("{}/rest/builds/0.1/bulk", self.site_url(instance))
    }
}

/// Tenant info answered by a Jira site.
#[derive(Debug, Clone, Deserialize)]
pub struct Tenant {
    #[serde(rename = "cloudId")]
    pub cloud_id: String,
}

/// OAuth client-credentials grant
#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    audience: &'static str,
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IssueResponse {
    fields: Option<IssueFields>,
}

#[derive(Debug, Deserialize)]
struct IssueFields {
    status: Option<IssueStatus>,
}

#[derive(Debug, Deserialize)]
struct IssueStatus {
    name: Option<String>,
}

/// Client for the Atlassian APIs used by one run.
///
/// Every call races the run's cancellation token.
#[derive(Debug, Clone)]
pub struct JiraClient {
    client: reqwest::Client,
    endpoints: Endpoints,
    cancel: CancellationToken,
    dump_responses: bool,
}

impl JiraClient {
    /// Create a client.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(endpoints: Endpoints, cancel: CancellationToken) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(FROM, HeaderValue::from_static("noreply@localhost"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoints,
            cancel,
            dump_responses: false,
        })
    }

    /// Log full report responses (status, headers, body).
    #[must_use]
    pub fn with_response_dump(mut self, enabled: bool) -> Self {
        self.dump_responses = enabled;
        self
    }

    #[must_use]
    pub const fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Run a request future unless the run is cancelled first.
    async fn guarded<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(ReportError::Cancelled),
            result = fut => result,
        }
    }

    // =========================================================================
    // Tenant
    // =========================================================================

    /// Look up the cloud id of a Jira site.
    #[instrument(skip(self))]
    pub async fn lookup_tenant(&self, instance: &str) -> Result<Tenant> {
        let url = self.endpoints.tenant_info_url(instance);
        let failed = |reason: String| ReportError::TenantLookupFailed {
            instance: instance.to_string(),
            reason,
        };

        self.guarded(async {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| failed(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(failed(format!("errorCode {}", status.as_u16())));
            }

            response
                .json::<Tenant>()
                .await
                .map_err(|e| failed(e.to_string()))
        })
        .await
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    /// Exchange OAuth client credentials for an access token.
    #[instrument(skip(self, client_secret))]
    pub async fn request_oauth_token(&self, client_id: &str, client_secret: &str) -> Result<String> {
        let body = TokenRequest {
            audience: "api.atlassian.com",
            grant_type: "client_credentials",
            client_id,
            client_secret,
        };

        self.guarded(async {
            let response = self
                .client
                .post(&self.endpoints.oauth_token_url)
                .json(&body)
                .send()
                .await
                .map_err(|e| ReportError::TokenRequestFailed(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ReportError::TokenRequestFailed(format!(
                    "errorCode {}",
                    status.as_u16()
                )));
            }

            let token: TokenResponse = response
                .json()
                .await
                .map_err(|e| ReportError::TokenRequestFailed(e.to_string()))?;

            token
                .access_token
                .filter(|t| !t.is_empty())
                .ok_or_else(|| {
                    ReportError::TokenRequestFailed("access_token missing from response".to_string())
                })
        })
        .await
    }

    /// Fetch a JWT from the connect token service. The raw body is the token.
    #[instrument(skip(self, connect_key))]
    pub async fn request_connect_token(&self, connect_key: &str, hostname: &str) -> Result<String> {
        let url = format!("{}/token", hostname.trim_end_matches('/'));

        self.guarded(async {
            let response = self
                .client
                .get(&url)
                .bearer_auth(connect_key)
                .send()
                .await
                .map_err(|e| ReportError::TokenRequestFailed(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ReportError::TokenRequestFailed(format!(
                    "errorCode {}",
                    status.as_u16()
                )));
            }

            response
                .text()
                .await
                .map_err(|e| ReportError::TokenRequestFailed(e.to_string()))
        })
        .await
    }

    // =========================================================================
    // Issues
    // =========================================================================

    /// Status name of an issue, `None` when the response carries none.
    #[instrument(skip(self, token))]
    pub async fn issue_status(
        &self,
        cloud_id: &str,
        issue: &str,
        token: &str,
    ) -> Result<Option<String>> {
        let failed = |reason: String| ReportError::IssueLookupFailed {
            issue: issue.to_string(),
            reason,
        };
        let url = self
            .endpoints
            .issue_url(cloud_id, issue)
            .ok_or_else(|| failed(format!("invalid API base {}", self.endpoints.cloud_api_base)))?;

        self.guarded(async {
            let response = self
                .client
                .get(url)
                .query(&[("fields", "status")])
                .bearer_auth(token)
                .send()
                .await
                .map_err(|e| failed(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(failed(format!("errorCode {}", status.as_u16())));
            }

            let issue: IssueResponse = response.json().await.map_err(|e| failed(e.to_string()))?;
            Ok(issue
                .fields
                .and_then(|f| f.status)
                .and_then(|s| s.name))
        })
        .await
    }

    // =========================================================================
    // Bulk reports
    // =========================================================================

    /// POST a bulk payload. Any non-success status is a rejection.
    #[instrument(skip(self, token, payload))]
    pub async fn post_bulk<P: Serialize + Sync>(
        &self,
        url: &str,
        token: &str,
        payload: &P,
    ) -> Result<StatusCode> {
        self.guarded(async {
            let response = self
                .client
                .post(url)
                .bearer_auth(token)
                .header(CONTENT_TYPE, "application/json")
                .json(payload)
                .send()
                .await
                .map_err(ReportError::ReportFailed)?;

            let status = response.status();
            if self.dump_responses {
                dump_response(response).await;
            }

            if !status.is_success() {
                return Err(ReportError::ReportRejected { status });
            }
            debug!(status = status.as_u16(), "Bulk report accepted");
            Ok(status)
        })
        .await
    }
}

/// Log a response in full. Diagnostics only; read failures are ignored.
async fn dump_response(response: Response) {
    let status = response.status();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| format!("{name}: {}", value.to_str().unwrap_or("<binary>")))
        .collect::<Vec<_>>()
        .join("\n");
    let body = response.text().await.unwrap_or_default();

    info!(
        status = %status,
        response = %format!("{status}\n{headers}\n\n{body}"),
        "request complete"
    );
}
