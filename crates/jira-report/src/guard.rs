//! Refuse to report against closed issues.

use tracing::{debug, warn};

use crate::auth::AuthToken;
use crate::client::JiraClient;
use crate::error::{ReportError, Result};

/// Whether an issue with this status must not be reported against.
///
/// A missing status counts as closed.
#[must_use]
pub fn is_closed(status: Option<&str>) -> bool {
    status.map_or(true, |name| name.eq_ignore_ascii_case("closed"))
}

/// Check every issue, failing on the first closed one.
pub async fn ensure_open(
    client: &JiraClient,
    cloud_id: &str,
    token: &AuthToken,
    issues: &[String],
) -> Result<()> {
    for issue in issues {
        let status = client.issue_status(cloud_id, issue, token.as_str()).await?;
        if is_closed(status.as_deref()) {
            warn!(issue = %issue, status = ?status, "Issue is closed, refusing to report");
            return Err(ReportError::IssueClosed {
                issue: issue.clone(),
            });
        }
        debug!(issue = %issue, status = ?status, "Issue is open");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_any_case() {
        assert!(is_closed(Some("Closed")));
        assert!(is_closed(Some("CLOSED")));
        assert!(is_closed(Some("closed")));
    }

    #[test]
    fn test_missing_status_is_closed() {
        assert!(is_closed(None));
    }

    #[test]
    fn test_open_statuses() {
        for status in ["Open", "In Progress", "Done", "Closed Loop", ""] {
            assert!(!is_closed(Some(status)), "status: {status}");
        }
    }
}
