//! Report CI deployments and builds against Jira issues.
//!
//! This crate provides:
//! - Issue key extraction from commit messages, PR titles and branch names
//! - Normalization of CI states and environments onto Jira's enumerations
//! - OAuth client-credentials and Connect JWT authentication
//! - A guard refusing to report against closed issues
//! - Deployment and build bulk payloads and their submission
//! - A status card summarizing the run
//!
//! # Flow
//!
//! ```text
//! EventContext ──► ResolvedContext ──► cloud id / token ──► closed-issue guard
//!                                                               │
//!                     status card ◄── bulk POST ◄── payload ◄───┘
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Every network step can fail

pub mod auth;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod guard;
pub mod instance;
pub mod issues;
pub mod normalize;
pub mod payload;
pub mod report;
pub mod run;
pub mod shutdown;

pub use auth::{AuthScheme, AuthToken, Credentials, DEFAULT_CONNECT_HOSTNAME};
pub use client::{Endpoints, JiraClient};
pub use config::Args;
pub use context::{EventContext, RunFields};
pub use error::{ReportError, Result};
pub use normalize::{normalize_environment, normalize_state, Environment, NormalizedReport, State};
pub use report::ReportTarget;
pub use run::{run, ResolvedContext, RunOptions, RunOutcome};
pub use shutdown::shutdown_signal;
