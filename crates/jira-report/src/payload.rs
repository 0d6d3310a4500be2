//! Deployment and build bulk payloads.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::context::EventContext;
use crate::normalize::{NormalizedReport, State};

/// Association type linking a deployment to issue keys.
const ASSOCIATION_ISSUE_KEYS: &str = "issueIdOrKeys";

/// Body of `POST .../deployments/0.1/.../bulk`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentPayload {
    pub deployments: Vec<Deployment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub deployment_sequence_number: u64,
    pub update_sequence_number: u64,
    pub associations: Vec<Association>,
    pub display_name: String,
    pub url: String,
    pub description: String,
    pub last_updated: DateTime<Utc>,
    pub state: State,
    pub pipeline: Pipeline,
    pub environment: EnvironmentRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Association {
    pub association_type: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: String,
    pub display_name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentRecord {
    pub id: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub environment_type: String,
}

/// Body of `POST .../builds/0.1/bulk`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPayload {
    pub builds: Vec<BuildRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRecord {
    pub build_number: u64,
    pub description: String,
    pub display_name: String,
    pub url: String,
    pub last_updated: DateTime<Utc>,
    pub pipeline_id: String,
    pub issue_keys: Vec<String>,
    pub state: State,
    pub update_sequence_number: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitRef>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<GitRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRef {
    pub id: String,
    pub repository_uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitRef {
    pub name: String,
    pub uri: String,
}

/// Either bulk body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BulkPayload {
    Deployments(DeploymentPayload),
    Builds(BuildPayload),
}

impl BulkPayload {
    /// Short name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Deployments(_) => "deployment",
            Self::Builds(_) => "build",
        }
    }
}

/// Single-deployment bulk body.
#[must_use]
pub fn deployment_payload(
    report: &NormalizedReport,
    ctx: &EventContext,
    now: DateTime<Utc>,
) -> DeploymentPayload {
    DeploymentPayload {
        deployments: vec![Deployment {
            deployment_sequence_number: ctx.build.number,
            update_sequence_number: ctx.build.number,
            associations: vec![Association {
                association_type: ASSOCIATION_ISSUE_KEYS.to_string(),
                values: report.issues.clone(),
            }],
            display_name: ctx.build.number.to_string(),
            url: report.link.clone(),
            description: report.description.clone(),
            last_updated: now,
            state: report.state,
            pipeline: Pipeline {
                id: ctx.pipeline.clone(),
                display_name: ctx.pipeline.clone(),
                url: report.link.clone(),
            },
            environment: EnvironmentRecord {
                id: report.environment_id.clone(),
                display_name: report.environment.as_str().to_string(),
                environment_type: report.environment_type.clone(),
            },
        }],
    }
}

/// Commit and branch references for a build, empty when nothing is known.
#[must_use]
pub fn build_references(ctx: &EventContext) -> Vec<Reference> {
    let commit = &ctx.commit;

    let mut reference = Reference::default();
    if !commit.rev.is_empty() || !commit.link.is_empty() {
        reference.commit = Some(CommitRef {
            id: commit.rev.clone(),
            repository_uri: commit.link.clone(),
        });
    }
    if !commit.branch.is_empty() && !commit.link.is_empty() {
        reference.git_ref = Some(GitRef {
            name: commit.branch.clone(),
            uri: format!("{}/refs/{}", commit.link, commit.branch),
        });
    }

    if reference.commit.is_none() && reference.git_ref.is_none() {
        Vec::new()
    } else {
        vec![reference]
    }
}

/// Single-build bulk body.
#[must_use]
pub fn build_payload(
    report: &NormalizedReport,
    ctx: &EventContext,
    now: DateTime<Utc>,
) -> BuildPayload {
    BuildPayload {
        builds: vec![BuildRecord {
            build_number: ctx.build.number,
            description: report.description.clone(),
            display_name: ctx.pipeline.clone(),
            url: report.link.clone(),
            last_updated: now,
            pipeline_id: ctx.pipeline.clone(),
            issue_keys: report.issues.clone(),
            state: report.state,
            update_sequence_number: ctx.build.number,
            references: build_references(ctx),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Environment;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn report() -> NormalizedReport {
        NormalizedReport {
            issues: vec!["TEST-1".to_string(), "TEST-2".to_string()],
            state: State::Successful,
            environment: Environment::Staging,
            environment_id: "stage-eu".to_string(),
            environment_type: String::new(),
            version: "1.0.0".to_string(),
            link: "https://ci.example.com/builds/42".to_string(),
            description: "TEST-1 TEST-2 release".to_string(),
        }
    }

    fn context() -> EventContext {
        let mut ctx = EventContext {
            pipeline: "deploy-app".to_string(),
            ..EventContext::default()
        };
        ctx.build.number = 42;
        ctx
    }

    #[test]
    fn test_deployment_payload_shape() {
        let payload = deployment_payload(&report(), &context(), fixed_now());
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            value,
            json!({
                "deployments": [{
                    "deploymentSequenceNumber": 42,
                    "updateSequenceNumber": 42,
                    "associations": [{
                        "associationType": "issueIdOrKeys",
                        "values": ["TEST-1", "TEST-2"]
                    }],
                    "displayName": "42",
                    "url": "https://ci.example.com/builds/42",
                    "description": "TEST-1 TEST-2 release",
                    "lastUpdated": "2024-05-01T12:00:00Z",
                    "state": "successful",
                    "pipeline": {
                        "id": "deploy-app",
                        "displayName": "deploy-app",
                        "url": "https://ci.example.com/builds/42"
                    },
                    "environment": {
                        "id": "stage-eu",
                        "displayName": "staging",
                        "type": ""
                    }
                }]
            })
        );
    }

    #[test]
    fn test_build_payload_without_references() {
        let payload = build_payload(&report(), &context(), fixed_now());
        let value = serde_json::to_value(&payload).unwrap();
        let build = &value["builds"][0];

        assert_eq!(build["buildNumber"], 42);
        assert_eq!(build["displayName"], "deploy-app");
        assert_eq!(build["pipelineId"], "deploy-app");
        assert_eq!(build["issueKeys"], json!(["TEST-1", "TEST-2"]));
        assert_eq!(build["state"], "successful");
        assert_eq!(build["updateSequenceNumber"], 42);
        assert!(build.get("references").is_none());
    }

    #[test]
    fn test_references_commit_only() {
        let mut ctx = context();
        ctx.commit.rev = "abc123".to_string();
        ctx.commit.branch = "main".to_string();

        let refs = build_references(&ctx);
        assert_eq!(refs.len(), 1);
        let value = serde_json::to_value(&refs[0]).unwrap();
        assert_eq!(value, json!({"commit": {"id": "abc123", "repositoryUri": ""}}));
    }

    #[test]
    fn test_references_commit_and_ref() {
        let mut ctx = context();
        ctx.commit.rev = "abc123".to_string();
        ctx.commit.branch = "main".to_string();
        ctx.commit.link = "https://git.example.com/repo".to_string();

        let payload = build_payload(&report(), &ctx, fixed_now());
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value["builds"][0]["references"],
            json!([{
                "commit": {"id": "abc123", "repositoryUri": "https://git.example.com/repo"},
                "ref": {"name": "main", "uri": "https://git.example.com/repo/refs/main"}
            }])
        );
    }

    #[test]
    fn test_references_branch_without_link() {
        let mut ctx = context();
        ctx.commit.branch = "main".to_string();
        assert!(build_references(&ctx).is_empty());
    }

    #[test]
    fn test_bulk_payload_serializes_inner_body() {
        let payload = BulkPayload::Builds(build_payload(&report(), &context(), fixed_now()));
        assert_eq!(payload.kind(), "build");
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("builds").is_some());
    }
}
