//! Command-line and environment configuration.
//!
//! Every option is bound to the variable the CI runner exports for a plugin
//! step (`DRONE_*` for pipeline metadata, `PLUGIN_*` for step settings), so
//! the binary runs with no arguments inside a pipeline.

use std::time::Duration;

use clap::Parser;

use crate::context::{AuthMaterial, Build, Commit, EventContext, Overrides};

/// Report a CI deployment or build against Jira issues.
#[derive(Debug, Clone, Parser)]
#[command(name = "jira-report")]
#[command(about = "Report CI deployments and builds to Jira")]
#[command(version)]
pub struct Args {
    // =========================================================================
    // Commit
    // =========================================================================
    #[arg(long, env = "DRONE_COMMIT_MESSAGE", default_value = "")]
    pub commit_message: String,

    #[arg(long, env = "DRONE_COMMIT_BRANCH", default_value = "")]
    pub commit_branch: String,

    #[arg(long, env = "DRONE_SOURCE_BRANCH", default_value = "")]
    pub source_branch: String,

    #[arg(long, env = "DRONE_TARGET_BRANCH", default_value = "")]
    pub target_branch: String,

    #[arg(long, env = "DRONE_COMMIT_SHA", default_value = "")]
    pub commit_sha: String,

    #[arg(long, env = "DRONE_COMMIT_LINK", default_value = "")]
    pub commit_link: String,

    #[arg(long, env = "DRONE_COMMIT_AUTHOR", default_value = "")]
    pub commit_author: String,

    #[arg(long, env = "DRONE_PULL_REQUEST_TITLE", default_value = "")]
    pub pull_request_title: String,

    // =========================================================================
    // Build
    // =========================================================================
    #[arg(long, env = "DRONE_BUILD_NUMBER", default_value_t = 0)]
    pub build_number: u64,

    #[arg(long, env = "DRONE_BUILD_STATUS", default_value = "")]
    pub build_status: String,

    #[arg(long, env = "DRONE_BUILD_LINK", default_value = "")]
    pub build_link: String,

    #[arg(long, env = "DRONE_DEPLOY_TO", default_value = "")]
    pub deploy_to: String,

    #[arg(long, env = "DRONE_TAG", default_value = "")]
    pub tag: String,

    #[arg(long, env = "DRONE_SEMVER", default_value = "")]
    pub semver: String,

    // =========================================================================
    // Plugin settings
    // =========================================================================
    /// Jira project key, e.g. `TEST`
    #[arg(long, env = "PLUGIN_PROJECT", default_value = "")]
    pub project: String,

    /// Pipeline name shown in Jira
    #[arg(long, env = "PLUGIN_PIPELINE", default_value = "")]
    pub pipeline: String,

    /// Jira site name, hostname or URL
    #[arg(long, env = "PLUGIN_INSTANCE", default_value = "")]
    pub instance: String,

    /// Atlassian cloud id (used when no instance is given)
    #[arg(long, env = "PLUGIN_CLOUD_ID", default_value = "")]
    pub cloud_id: String,

    /// Explicit state, overrides the build status
    #[arg(long, env = "PLUGIN_STATE", default_value = "")]
    pub state: String,

    #[arg(long, env = "PLUGIN_ENVIRONMENT_NAME", default_value = "")]
    pub environment_name: String,

    #[arg(long, env = "PLUGIN_ENVIRONMENT_ID", default_value = "")]
    pub environment_id: String,

    #[arg(long, env = "PLUGIN_ENVIRONMENT_TYPE", default_value = "")]
    pub environment_type: String,

    /// Link to the deployment
    #[arg(long, env = "PLUGIN_LINK", default_value = "")]
    pub link: String,

    /// Issue keys, comma separated; replaces extraction from the commit
    #[arg(long, env = "PLUGIN_ISSUEKEYS", value_delimiter = ',')]
    pub issue_keys: Vec<String>,

    // =========================================================================
    // Authentication
    // =========================================================================
    #[arg(long, env = "PLUGIN_CLIENT_ID", default_value = "")]
    pub client_id: String,

    #[arg(long, env = "PLUGIN_CLIENT_SECRET", default_value = "", hide_env_values = true)]
    pub client_secret: String,

    #[arg(long, env = "PLUGIN_CONNECT_KEY", default_value = "", hide_env_values = true)]
    pub connect_key: String,

    #[arg(long, env = "PLUGIN_CONNECT_HOSTNAME", default_value = "")]
    pub connect_hostname: String,

    // =========================================================================
    // Runtime
    // =========================================================================
    /// Log level: trace, debug, info, warn, error
    #[arg(long, env = "PLUGIN_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Abort the run after this many seconds
    #[arg(long, env = "PLUGIN_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Status card output path
    #[arg(long, env = "DRONE_CARD_PATH", default_value = "")]
    pub card_path: String,
}

impl Args {
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.filter(|secs| *secs > 0).map(Duration::from_secs)
    }

    /// `tracing` filter directive for the configured log level.
    #[must_use]
    pub fn filter_directive(&self) -> String {
        let level = match self.log_level.to_ascii_lowercase().as_str() {
            level @ ("trace" | "debug" | "info" | "warn" | "error") => level.to_string(),
            _ => "info".to_string(),
        };
        format!("jira_report={level},card={level},warn")
    }
}

impl From<Args> for EventContext {
    fn from(args: Args) -> Self {
        Self {
            commit: Commit {
                message: args.commit_message,
                branch: args.commit_branch,
                source: args.source_branch,
                target: args.target_branch,
                rev: args.commit_sha,
                link: args.commit_link,
                author: args.commit_author,
            },
            build: Build {
                number: args.build_number,
                status: args.build_status,
                link: args.build_link,
            },
            pull_request_title: args.pull_request_title,
            deploy_target: args.deploy_to,
            tag: args.tag,
            semver: args.semver,
            overrides: Overrides {
                state: args.state,
                environment_name: args.environment_name,
                environment_id: args.environment_id,
                environment_type: args.environment_type,
                link: args.link,
            },
            issue_keys: args
                .issue_keys
                .into_iter()
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty())
                .collect(),
            project: args.project,
            pipeline: args.pipeline,
            instance: args.instance,
            cloud_id: args.cloud_id,
            auth: AuthMaterial {
                client_id: args.client_id,
                client_secret: args.client_secret,
                connect_key: args.connect_key,
                connect_hostname: args.connect_hostname,
            },
            log_level: args.log_level,
            card_path: args.card_path,
        }
    }
}
