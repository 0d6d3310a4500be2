//! Error types for a reporting run.

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = ReportError> = std::result::Result<T, E>;

/// Errors that end a reporting run. None are retried.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Neither an OAuth client id/secret pair nor a connect key was given
    #[error("no client id & secret or connect key provided")]
    MissingCredentials,

    /// No issue key was supplied or found in the commit details
    #[error("failed to extract issue number for project {project}")]
    IssueNotFound { project: String },

    /// The instance's tenant info endpoint could not be read
    #[error("cannot get cloud id from instance {instance}: {reason}")]
    TenantLookupFailed { instance: String, reason: String },

    /// Neither an instance name nor a cloud id was given
    #[error("cloud id is empty, specify the cloud id or instance name")]
    MissingCloudId,

    /// Access token acquisition failed
    #[error("token request failed: {0}")]
    TokenRequestFailed(String),

    /// Issue status lookup failed
    #[error("cannot look up issue {issue}: {reason}")]
    IssueLookupFailed { issue: String, reason: String },

    /// The issue is closed, reporting against it is refused
    #[error("issue {issue} is closed")]
    IssueClosed { issue: String },

    /// Jira answered the bulk report with a non-success status
    #[error("report rejected with status {status}")]
    ReportRejected { status: StatusCode },

    /// Transport failure while sending the bulk report
    #[error("report request failed: {0}")]
    ReportFailed(#[source] reqwest::Error),

    /// The report succeeded but the status card could not be written
    #[error("could not create status card: {0}")]
    CardWriteFailed(#[from] card::CardError),

    /// The run was cancelled or timed out
    #[error("run cancelled")]
    Cancelled,

    /// HTTP client construction failed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ReportError {
    /// Short machine-readable name of the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "missing_credentials",
            Self::IssueNotFound { .. } => "issue_not_found",
            Self::TenantLookupFailed { .. } => "tenant_lookup_failed",
            Self::MissingCloudId => "missing_cloud_id",
            Self::TokenRequestFailed(_) => "token_request_failed",
            Self::IssueLookupFailed { .. } => "issue_lookup_failed",
            Self::IssueClosed { .. } => "issue_closed",
            Self::ReportRejected { .. } => "report_rejected",
            Self::ReportFailed(_) => "report_failed",
            Self::CardWriteFailed(_) => "card_write_failed",
            Self::Cancelled => "cancelled",
            Self::Http(_) => "http",
        }
    }
}
