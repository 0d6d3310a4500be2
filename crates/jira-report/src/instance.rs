//! Jira site name and cloud id resolution.

use reqwest::Url;
use tracing::{debug, warn};

use crate::client::JiraClient;
use crate::error::{ReportError, Result};

fn first_label(host: &str) -> &str {
    host.split('.').next().unwrap_or_default()
}

/// Host part of a `scheme://authority/...` string the URL parser rejected.
fn authority_host(raw: &str) -> &str {
    let rest = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = authority.rsplit('@').next().unwrap_or_default();
    host.split(':').next().unwrap_or_default()
}

/// Bare site name from a URL, hostname or name.
///
/// `https://acme.atlassian.net` and `acme.atlassian.net` both give `acme`;
/// a name without dots is returned unchanged.
#[must_use]
pub fn extract_instance_name(raw: &str) -> String {
    if raw.contains("://") {
        return match Url::parse(raw) {
            Ok(url) => first_label(url.host_str().unwrap_or_default()).to_string(),
            Err(err) => {
                warn!(instance = %raw, error = %err, "Error parsing URL");
                first_label(authority_host(raw)).to_string()
            }
        };
    }
    first_label(raw).to_string()
}

/// Cloud id for the run.
///
/// A non-empty instance name is always looked up on the site; otherwise the
/// supplied cloud id is used.
pub async fn resolve_cloud_id(client: &JiraClient, instance: &str, supplied: &str) -> Result<String> {
    if !instance.is_empty() {
        let tenant = client.lookup_tenant(instance).await?;
        debug!(instance, cloud_id = %tenant.cloud_id, "Resolved cloud id from instance");
        return Ok(tenant.cloud_id);
    }
    if supplied.is_empty() {
        return Err(ReportError::MissingCloudId);
    }
    Ok(supplied.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Endpoints;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn test_extract_instance_name() {
        let cases = [
            ("http://test.com", "test"),
            ("https://subdomain.test.com", "subdomain"),
            ("ftp://ftp.test.org", "ftp"),
            ("https://acme.atlassian.net/jira/software", "acme"),
            ("instance.test.com", "instance"),
            ("subdomain.instance.test.org", "subdomain"),
            ("localhost", "localhost"),
            ("http://", ""),
            ("invalid-url", "invalid-url"),
            ("", ""),
        ];
        for (input, want) in cases {
            assert_eq!(extract_instance_name(input), want, "input: {input}");
        }
    }

    // Deliberate: an unparseable URL yields its host label rather than the
    // raw input, so the result is still usable as a site name.
    #[test]
    fn test_unparseable_url_falls_back_to_host() {
        assert_eq!(extract_instance_name("https://acme.atlassian.net:99999"), "acme");
    }

    #[test]
    fn test_extract_is_idempotent() {
        for input in [
            "https://subdomain.test.com",
            "instance.test.com",
            "localhost",
            "http://",
            "user@host.example.com",
        ] {
            let once = extract_instance_name(input);
            assert_eq!(extract_instance_name(&once), once, "input: {input}");
        }
    }

    #[tokio::test]
    async fn test_supplied_cloud_id_used_without_instance() {
        let client = JiraClient::new(Endpoints::default(), CancellationToken::new()).unwrap();
        let cloud_id = resolve_cloud_id(&client, "", "cloud-1").await.unwrap();
        assert_eq!(cloud_id, "cloud-1");
    }

    #[tokio::test]
    async fn test_missing_cloud_id() {
        let client = JiraClient::new(Endpoints::default(), CancellationToken::new()).unwrap();
        let err = resolve_cloud_id(&client, "", "").await.unwrap_err();
        assert!(matches!(err, ReportError::MissingCloudId));
    }
}
