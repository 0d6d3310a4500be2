//! Mapping of upstream CI vocabularies onto Jira's enumerations.

use serde::Serialize;

use crate::context::EventContext;
use crate::error::Result;
use crate::issues::resolve_issues;

/// Longest description Jira accepts.
const MAX_DESCRIPTION_CHARS: usize = 255;

/// Deployment/build state as Jira understands it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Pending,
    InProgress,
    Cancelled,
    Failed,
    RolledBack,
    Successful,
    Unknown,
}

impl State {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::RolledBack => "rolled_back",
            Self::Successful => "successful",
            Self::Unknown => "unknown",
        }
    }
}

/// Deployment environment type as Jira understands it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Production,
    Staging,
    Development,
    Testing,
    Unmapped,
}

impl Environment {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Unmapped => "unmapped",
        }
    }
}

/// Map any upstream state name onto a [`State`], ignoring case.
#[must_use]
pub fn normalize_state(s: &str) -> State {
    match s.to_lowercase().as_str() {
        "pending" | "waiting" => State::Pending,
        "running" | "in_progress" => State::InProgress,
        "cancelled" | "killed" | "stopped" | "terminated" => State::Cancelled,
        "failed" | "failure" | "error" | "errored" => State::Failed,
        "rollback" | "rolled_back" => State::RolledBack,
        "success" | "successful" => State::Successful,
        _ => State::Unknown,
    }
}

/// Map any upstream environment name onto an [`Environment`], ignoring case.
#[must_use]
pub fn normalize_environment(s: &str) -> Environment {
    match s.to_lowercase().as_str() {
        "prod" | "production" => Environment::Production,
        "stage" | "staging" => Environment::Staging,
        "dev" | "development" => Environment::Development,
        "testing" | "test" => Environment::Testing,
        _ => Environment::Unmapped,
    }
}

/// Explicit state if given, else the build status.
#[must_use]
pub fn resolve_state(ctx: &EventContext) -> State {
    if ctx.overrides.state.is_empty() {
        normalize_state(&ctx.build.status)
    } else {
        normalize_state(&ctx.overrides.state)
    }
}

/// Explicit environment name, else the deploy target, else production.
#[must_use]
pub fn resolve_environment(ctx: &EventContext) -> Environment {
    if !ctx.overrides.environment_name.is_empty() {
        return normalize_environment(&ctx.overrides.environment_name);
    }
    if !ctx.deploy_target.is_empty() {
        return normalize_environment(&ctx.deploy_target);
    }
    Environment::Production
}

/// Explicit environment id, else the resolved environment.
#[must_use]
pub fn resolve_environment_id(ctx: &EventContext) -> String {
    if ctx.overrides.environment_id.is_empty() {
        resolve_environment(ctx).as_str().to_string()
    } else {
        ctx.overrides.environment_id.clone()
    }
}

/// Explicit environment type, else empty.
///
/// Unlike the id this does not fall back to the resolved environment.
#[must_use]
pub fn resolve_environment_type(ctx: &EventContext) -> String {
    ctx.overrides.environment_type.clone()
}

/// Semantic version, else tag, else commit revision.
#[must_use]
pub fn resolve_version(ctx: &EventContext) -> String {
    [&ctx.semver, &ctx.tag, &ctx.commit.rev]
        .into_iter()
        .find(|v| !v.is_empty())
        .cloned()
        .unwrap_or_default()
}

/// Explicit link, else the build link, else the commit link.
#[must_use]
pub fn resolve_link(ctx: &EventContext) -> String {
    [&ctx.overrides.link, &ctx.build.link, &ctx.commit.link]
        .into_iter()
        .find(|v| !v.is_empty())
        .cloned()
        .unwrap_or_default()
}

/// Truncate to 255 characters, ending in `...` when shortened.
#[must_use]
pub fn truncate_description(message: &str) -> String {
    if message.chars().count() <= MAX_DESCRIPTION_CHARS {
        return message.to_string();
    }
    let mut truncated: String = message.chars().take(MAX_DESCRIPTION_CHARS - 3).collect();
    truncated.push_str("...");
    truncated
}

/// Everything the payloads need, derived from an [`EventContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedReport {
    pub issues: Vec<String>,
    pub state: State,
    pub environment: Environment,
    pub environment_id: String,
    pub environment_type: String,
    pub version: String,
    pub link: String,
    pub description: String,
}

impl NormalizedReport {
    /// Normalize an event. Fails when no issue key can be resolved.
    pub fn from_context(ctx: &EventContext) -> Result<Self> {
        let issues = resolve_issues(ctx)?;
        if ctx.commit.message.chars().count() > MAX_DESCRIPTION_CHARS {
            tracing::warn!("Commit message exceeds 255 characters; truncating to fit");
        }
        Ok(Self {
            issues,
            state: resolve_state(ctx),
            environment: resolve_environment(ctx),
            environment_id: resolve_environment_id(ctx),
            environment_type: resolve_environment_type(ctx),
            version: resolve_version(ctx),
            link: resolve_link(ctx),
            description: truncate_description(&ctx.commit.message),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_mapping() {
        let cases = [
            ("pending", State::Pending),
            ("WAITING", State::Pending),
            ("running", State::InProgress),
            ("In_Progress", State::InProgress),
            ("cancelled", State::Cancelled),
            ("killed", State::Cancelled),
            ("stopped", State::Cancelled),
            ("terminated", State::Cancelled),
            ("failed", State::Failed),
            ("Failure", State::Failed),
            ("error", State::Failed),
            ("errored", State::Failed),
            ("rollback", State::RolledBack),
            ("rolled_back", State::RolledBack),
            ("success", State::Successful),
            ("SUCCESSFUL", State::Successful),
            ("", State::Unknown),
            ("skipped", State::Unknown),
        ];
        for (input, want) in cases {
            assert_eq!(normalize_state(input), want, "input: {input}");
        }
    }

    #[test]
    fn test_environment_mapping() {
        let cases = [
            ("prod", Environment::Production),
            ("Production", Environment::Production),
            ("stage", Environment::Staging),
            ("STAGING", Environment::Staging),
            ("dev", Environment::Development),
            ("development", Environment::Development),
            ("test", Environment::Testing),
            ("testing", Environment::Testing),
            ("qa", Environment::Unmapped),
            ("", Environment::Unmapped),
        ];
        for (input, want) in cases {
            assert_eq!(normalize_environment(input), want, "input: {input}");
        }
    }

    #[test]
    fn test_unknown_input_never_leaks() {
        for input in ["Deployed", "prod-eu", "💥"] {
            assert_eq!(normalize_state(input).as_str(), "unknown");
            assert_eq!(normalize_environment(input).as_str(), "unmapped");
        }
    }

    #[test]
    fn test_state_override_wins() {
        let mut ctx = EventContext::default();
        ctx.build.status = "success".to_string();
        assert_eq!(resolve_state(&ctx), State::Successful);

        ctx.overrides.state = "rollback".to_string();
        assert_eq!(resolve_state(&ctx), State::RolledBack);
    }

    #[test]
    fn test_environment_fallbacks() {
        let mut ctx = EventContext::default();
        assert_eq!(resolve_environment(&ctx), Environment::Production);

        ctx.deploy_target = "stage".to_string();
        assert_eq!(resolve_environment(&ctx), Environment::Staging);

        ctx.overrides.environment_name = "dev".to_string();
        assert_eq!(resolve_environment(&ctx), Environment::Development);
    }

    #[test]
    fn test_environment_id_defaults_to_environment() {
        let mut ctx = EventContext::default();
        assert_eq!(resolve_environment_id(&ctx), "production");

        ctx.overrides.environment_id = "env-123".to_string();
        assert_eq!(resolve_environment_id(&ctx), "env-123");
    }

    #[test]
    fn test_environment_type_defaults_to_empty() {
        let mut ctx = EventContext::default();
        assert_eq!(resolve_environment_type(&ctx), "");

        ctx.overrides.environment_type = "prod".to_string();
        assert_eq!(resolve_environment_type(&ctx), "prod");
    }

    #[test]
    fn test_version_precedence() {
        let mut ctx = EventContext::default();
        ctx.commit.rev = "abc123".to_string();
        assert_eq!(resolve_version(&ctx), "abc123");

        ctx.tag = "v1.0.0".to_string();
        assert_eq!(resolve_version(&ctx), "v1.0.0");

        ctx.semver = "1.0.1".to_string();
        assert_eq!(resolve_version(&ctx), "1.0.1");
    }

    #[test]
    fn test_link_precedence() {
        let mut ctx = EventContext::default();
        assert_eq!(resolve_link(&ctx), "");

        ctx.commit.link = "https://git.example.com/c/1".to_string();
        assert_eq!(resolve_link(&ctx), "https://git.example.com/c/1");

        ctx.build.link = "https://ci.example.com/b/1".to_string();
        assert_eq!(resolve_link(&ctx), "https://ci.example.com/b/1");

        ctx.overrides.link = "https://deploy.example.com".to_string();
        assert_eq!(resolve_link(&ctx), "https://deploy.example.com");
    }

    #[test]
    fn test_truncate_description() {
        assert_eq!(truncate_description("short"), "short");

        let exact = "a".repeat(255);
        assert_eq!(truncate_description(&exact), exact);

        let long = "b".repeat(300);
        let truncated = truncate_description(&long);
        assert_eq!(truncated.chars().count(), 255);
        assert!(truncated.starts_with(&"b".repeat(252)));
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_truncate_multibyte() {
        let long = "é".repeat(260);
        let truncated = truncate_description(&long);
        assert_eq!(truncated.chars().count(), 255);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_report_from_context() {
        let mut ctx = EventContext {
            project: "TEST".to_string(),
            ..EventContext::default()
        };
        ctx.commit.message = "TEST-7 ship it".to_string();
        ctx.build.status = "success".to_string();

        let report = NormalizedReport::from_context(&ctx).unwrap();
        assert_eq!(report.issues, vec!["TEST-7"]);
        assert_eq!(report.state, State::Successful);
        assert_eq!(report.environment, Environment::Production);
        assert_eq!(report.environment_id, "production");
        assert_eq!(report.environment_type, "");
        assert_eq!(report.description, "TEST-7 ship it");
    }
}
