//! Bulk report submission.

use tracing::info;

use crate::auth::AuthToken;
use crate::client::{Endpoints, JiraClient};
use crate::error::Result;
use crate::payload::BulkPayload;

/// Where the bulk report goes, by auth flow and payload kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportTarget {
    /// OAuth flow, Cloud API gateway
    CloudDeployments { cloud_id: String },
    /// Connect flow, site deployments API
    ConnectDeployments { instance: String },
    /// Connect flow, site builds API
    ConnectBuilds { instance: String },
}

impl ReportTarget {
    #[must_use]
    pub fn url(&self, endpoints: &Endpoints) -> String {
        match self {
            Self::CloudDeployments { cloud_id } => endpoints.cloud_deployments_url(cloud_id),
            Self::ConnectDeployments { instance } => endpoints.connect_deployments_url(instance),
            Self::ConnectBuilds { instance } => endpoints.connect_builds_url(instance),
        }
    }
}

/// Send the one bulk report of the run.
pub async fn submit(
    client: &JiraClient,
    target: &ReportTarget,
    token: &AuthToken,
    payload: &BulkPayload,
) -> Result<()> {
    let url = target.url(client.endpoints());
    info!(kind = payload.kind(), scheme = token.scheme.as_str(), "Creating {}", payload.kind());
    client.post_bulk(&url, token.as_str(), payload).await?;
    Ok(())
}
