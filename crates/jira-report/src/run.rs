//! One reporting run, end to end.

use card::{Card, CardEmitter};
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, Instrument};

use crate::auth::{AuthScheme, Credentials};
use crate::client::{Endpoints, JiraClient};
use crate::context::{EventContext, RunFields};
use crate::error::Result;
use crate::guard::ensure_open;
use crate::instance::{extract_instance_name, resolve_cloud_id};
use crate::normalize::{NormalizedReport, State};
use crate::payload::{build_payload, deployment_payload, BulkPayload};
use crate::report::{submit, ReportTarget};

/// Knobs that are not part of the event itself.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub endpoints: Endpoints,
    pub cancel: CancellationToken,
}

/// Values derived from an [`EventContext`] before any network call.
#[derive(Debug, Clone)]
pub struct ResolvedContext {
    pub instance: String,
    pub report: NormalizedReport,
    pub credentials: Credentials,
}

impl ResolvedContext {
    /// Normalize the event and select credentials.
    ///
    /// Fails with `IssueNotFound` or `MissingCredentials` without touching
    /// the network.
    pub fn resolve(ctx: &EventContext) -> Result<Self> {
        let instance = extract_instance_name(&ctx.instance);
        let report = NormalizedReport::from_context(ctx)?;
        let credentials = Credentials::select(&ctx.auth)?;
        Ok(Self {
            instance,
            report,
            credentials,
        })
    }

    /// Fields identifying this run in logs.
    #[must_use]
    pub fn fields(&self, ctx: &EventContext) -> RunFields {
        RunFields {
            client_id: ctx.auth.client_id.clone(),
            cloud_id: ctx.cloud_id.clone(),
            project: ctx.project.clone(),
            instance: self.instance.clone(),
            pipeline: ctx.pipeline.clone(),
            environment: self.report.environment.as_str().to_string(),
            environment_id: self.report.environment_id.clone(),
            environment_type: self.report.environment_type.clone(),
            state: self.report.state.as_str().to_string(),
            issues: self.report.issues.clone(),
        }
    }

    /// Status card summarizing the run.
    #[must_use]
    pub fn card(&self, ctx: &EventContext, endpoints: &Endpoints) -> Card {
        let urls = if self.instance.is_empty() {
            Vec::new()
        } else {
            self.report
                .issues
                .iter()
                .map(|issue| endpoints.browse_url(&self.instance, issue))
                .collect()
        };

        Card {
            pipeline: ctx.pipeline.clone(),
            instance: self.instance.clone(),
            project: ctx.project.clone(),
            state: self.report.state.as_str().to_string(),
            version: self.report.version.clone(),
            environment: self.report.environment.as_str().to_string(),
            urls,
        }
    }
}

/// What a successful run reported.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub scheme: AuthScheme,
    pub target: ReportTarget,
    pub kind: &'static str,
    pub issues: Vec<String>,
    pub state: State,
    pub fields: RunFields,
}

/// Report the event to Jira and write the status card.
///
/// # Errors
/// Any failing step ends the run; nothing is retried.
pub async fn run(ctx: &EventContext, options: RunOptions) -> Result<RunOutcome> {
    let resolved = ResolvedContext::resolve(ctx)?;
    let fields = resolved.fields(ctx);
    let span = fields.span();

    execute(ctx, &resolved, fields, options).instrument(span).await
}

async fn execute(
    ctx: &EventContext,
    resolved: &ResolvedContext,
    fields: RunFields,
    options: RunOptions,
) -> Result<RunOutcome> {
    debug!("Successfully extracted all issues");

    let client = JiraClient::new(options.endpoints, options.cancel)?
        .with_response_dump(ctx.wants_response_dump());
    let report = &resolved.report;
    let now = Utc::now();

    let (target, payload, token) = match &resolved.credentials {
        Credentials::OAuth { .. } => {
            let cloud_id = resolve_cloud_id(&client, &resolved.instance, &ctx.cloud_id)
                .await
                .inspect_err(|_| debug!("Cannot get cloud id"))?;
            let token = resolved
                .credentials
                .authenticate(&client)
                .await
                .inspect_err(|_| debug!("Cannot create token from client id and secret"))?;
            ensure_open(&client, &cloud_id, &token, &report.issues).await?;

            (
                ReportTarget::CloudDeployments { cloud_id },
                BulkPayload::Deployments(deployment_payload(report, ctx, now)),
                token,
            )
        }
        Credentials::Connect { .. } => {
            let token = resolved
                .credentials
                .authenticate(&client)
                .await
                .inspect_err(|_| debug!("Cannot get JWT token from connect key"))?;
            let instance = resolved.instance.clone();

            if ctx.overrides.environment_name.is_empty() {
                (
                    ReportTarget::ConnectBuilds { instance },
                    BulkPayload::Builds(build_payload(report, ctx, now)),
                    token,
                )
            } else {
                (
                    ReportTarget::ConnectDeployments { instance },
                    BulkPayload::Deployments(deployment_payload(report, ctx, now)),
                    token,
                )
            }
        }
    };

    submit(&client, &target, &token, &payload)
        .await
        .inspect_err(|e| error!(error = %e, "Cannot create {}", payload.kind()))?;

    let card = resolved.card(ctx, client.endpoints());
    CardEmitter::for_path(&ctx.card_path)
        .emit(&card)
        .inspect_err(|e| error!(error = %e, "Could not create status card"))?;

    info!(kind = payload.kind(), "Report complete");

    Ok(RunOutcome {
        scheme: token.scheme,
        target,
        kind: payload.kind(),
        issues: report.issues.clone(),
        state: report.state,
        fields,
    })
}
