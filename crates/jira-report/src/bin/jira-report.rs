//! jira-report - CI plugin step reporting deployments and builds to Jira.
//!
//! Reads the pipeline metadata exported by the CI runner, finds the Jira
//! issues the commit refers to and reports the deployment (or build) state
//! against them.
//!
//! # Environment Variables
//!
//! - `PLUGIN_PROJECT` - Jira project key (required)
//! - `PLUGIN_PIPELINE` - Pipeline name shown in Jira
//! - `PLUGIN_INSTANCE` / `PLUGIN_CLOUD_ID` - Jira site or cloud id
//! - `PLUGIN_CLIENT_ID` + `PLUGIN_CLIENT_SECRET` - OAuth credentials, or
//! - `PLUGIN_CONNECT_KEY` (+ `PLUGIN_CONNECT_HOSTNAME`) - Connect credentials
//! - `PLUGIN_LOG_LEVEL` - trace, debug, info, warn, error
//! - `DRONE_CARD_PATH` - Status card output
//!
//! # Examples
//!
//! ```bash
//! PLUGIN_PROJECT=TEST PLUGIN_INSTANCE=acme PLUGIN_CONNECT_KEY=... \
//!   DRONE_COMMIT_MESSAGE="TEST-1 fix login" DRONE_BUILD_STATUS=success \
//!   jira-report
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use jira_report::{run, shutdown_signal, Args, Endpoints, EventContext, RunOptions};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.filter_directive()));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let timeout = args.timeout();
    let ctx = EventContext::from(args);
    let cancel = CancellationToken::new();
    let options = RunOptions {
        endpoints: Endpoints::default(),
        cancel: cancel.clone(),
    };

    let report = run(&ctx, options);
    tokio::pin!(report);

    let deadline = async {
        match timeout {
            Some(duration) => sleep(duration).await,
            None => std::future::pending().await,
        }
    };

    let result = tokio::select! {
        result = &mut report => result,
        signal = shutdown_signal() => {
            info!(signal, "Received {signal}, cancelling run");
            cancel.cancel();
            report.as_mut().await
        }
        () = deadline => {
            warn!(timeout_secs = timeout.map(|d| d.as_secs()), "Run timed out, cancelling");
            cancel.cancel();
            report.as_mut().await
        }
    };
    let outcome = result.context("Jira report failed")?;

    info!(
        kind = outcome.kind,
        scheme = outcome.scheme.as_str(),
        state = outcome.state.as_str(),
        issues = %outcome.issues.join(","),
        "Jira updated"
    );
    Ok(())
}
