//! Event context describing the CI run being reported.
//!
//! [`EventContext`] is built once from configuration and never mutated.
//! Everything derived from it (instance name, normalized values, selected
//! credentials) lives in separate values computed by the run.

use serde::Serialize;

/// Commit details of the triggering event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit {
    pub message: String,
    pub branch: String,
    pub source: String,
    pub target: String,
    pub rev: String,
    pub link: String,
    pub author: String,
}

/// Build details of the triggering event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Build {
    pub number: u64,
    pub status: String,
    pub link: String,
}

/// Explicit overrides for the reported state and environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub state: String,
    pub environment_name: String,
    pub environment_id: String,
    pub environment_type: String,
    pub link: String,
}

/// Authentication material as supplied by configuration.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthMaterial {
    pub client_id: String,
    pub client_secret: String,
    pub connect_key: String,
    pub connect_hostname: String,
}

impl std::fmt::Debug for AuthMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthMaterial")
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("connect_key", &redact(&self.connect_key))
            .field("connect_hostname", &self.connect_hostname)
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        ""
    } else {
        "***"
    }
}

/// Immutable record of the event a run reports on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventContext {
    pub commit: Commit,
    pub build: Build,
    pub pull_request_title: String,
    pub deploy_target: String,
    pub tag: String,
    pub semver: String,
    pub overrides: Overrides,
    /// Explicit issue keys; when non-empty they replace extraction
    pub issue_keys: Vec<String>,
    pub project: String,
    pub pipeline: String,
    /// Instance name, hostname or site URL
    pub instance: String,
    pub cloud_id: String,
    pub auth: AuthMaterial,
    pub log_level: String,
    pub card_path: String,
}

impl EventContext {
    /// Whether the configured verbosity asks for full response dumps.
    #[must_use]
    pub fn wants_response_dump(&self) -> bool {
        matches!(
            self.log_level.to_ascii_lowercase().as_str(),
            "debug" | "trace"
        )
    }
}

/// Fields identifying a run in every log line.
///
/// Built once the inputs are normalized and passed explicitly to whatever
/// needs to log, instead of living in a process-wide logger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunFields {
    pub client_id: String,
    pub cloud_id: String,
    pub project: String,
    pub instance: String,
    pub pipeline: String,
    pub environment: String,
    pub environment_id: String,
    pub environment_type: String,
    pub state: String,
    pub issues: Vec<String>,
}

impl RunFields {
    /// Span carrying these fields; events logged inside it inherit them.
    #[must_use]
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "jira_report",
            client_id = %self.client_id,
            cloud_id = %self.cloud_id,
            project = %self.project,
            instance = %self.instance,
            pipeline = %self.pipeline,
            environment = %self.environment,
            environment_id = %self.environment_id,
            environment_type = %self.environment_type,
            state = %self.state,
            issues = %self.issues.join(","),
        )
    }
}
