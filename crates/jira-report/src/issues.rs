//! Issue key extraction from commit and pull request text.

use regex::Regex;
use tracing::debug;

use crate::context::EventContext;
use crate::error::{ReportError, Result};

/// Pattern matching `<PROJECT>-<digits>` for one project key.
fn issue_pattern(project: &str) -> Option<Regex> {
    if project.is_empty() {
        return None;
    }
    Regex::new(&format!(r"{}-\d+", regex::escape(project))).ok()
}

/// Text searched for issue keys: commit message, pull request title,
/// source branch, target branch and commit branch, space separated.
fn search_text(ctx: &EventContext) -> String {
    let sources = [
        ctx.commit.message.as_str(),
        ctx.pull_request_title.as_str(),
        ctx.commit.source.as_str(),
        ctx.commit.target.as_str(),
        ctx.commit.branch.as_str(),
    ];
    let mut text = sources.join(" ");
    text.push('\n');
    text
}

/// First issue key of the project found in the commit details, or an
/// empty string.
#[must_use]
pub fn extract_issue(ctx: &EventContext) -> String {
    issue_pattern(&ctx.project)
        .and_then(|re| re.find(&search_text(ctx)).map(|m| m.as_str().to_string()))
        .unwrap_or_default()
}

/// Every issue key of the project found in the commit details, in order of
/// first occurrence. Duplicates are kept.
#[must_use]
pub fn extract_issues(ctx: &EventContext) -> Vec<String> {
    let Some(re) = issue_pattern(&ctx.project) else {
        return Vec::new();
    };
    re.find_iter(&search_text(ctx))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Issue keys to report against.
///
/// Explicit keys win over extraction. Finding none is fatal.
pub fn resolve_issues(ctx: &EventContext) -> Result<Vec<String>> {
    let explicit: Vec<String> = ctx
        .issue_keys
        .iter()
        .map(|key| key.trim())
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect();

    if !explicit.is_empty() {
        debug!(issues = ?explicit, "Using provided issue keys");
        return Ok(explicit);
    }

    let issues = extract_issues(ctx);
    if issues.is_empty() {
        debug!(project = %ctx.project, "Cannot find issue number");
        return Err(ReportError::IssueNotFound {
            project: ctx.project.clone(),
        });
    }
    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_message(project: &str, message: &str) -> EventContext {
        let mut ctx = EventContext {
            project: project.to_string(),
            ..EventContext::default()
        };
        ctx.commit.message = message.to_string();
        ctx
    }

    #[test]
    fn test_extract_single_issue() {
        let ctx = with_message("TEST", "TEST-1 this is a test");
        assert_eq!(extract_issue(&ctx), "TEST-1");
    }

    #[test]
    fn test_extract_single_returns_first_match() {
        let ctx = with_message("TEST", "[TEST-123] prefix [TEST-456]");
        assert_eq!(extract_issue(&ctx), "TEST-123");
    }

    #[test]
    fn test_extract_single_no_match() {
        let ctx = with_message("TEST", "no issue");
        assert_eq!(extract_issue(&ctx), "");
    }

    #[test]
    fn test_extract_multiple_issues() {
        let cases = [
            ("TEST-1 this is a test", vec!["TEST-1"]),
            ("suffix [TEST-123] [TEST-234]", vec!["TEST-123", "TEST-234"]),
            (
                "Multiple issues: TEST-123, TEST-234, TEST-456",
                vec!["TEST-123", "TEST-234", "TEST-456"],
            ),
            (
                "feature/TEST-123 [TEST-456] and [TEST-789]",
                vec!["TEST-123", "TEST-456", "TEST-789"],
            ),
            (
                "TEST-123 TEST-456 TEST-789",
                vec!["TEST-123", "TEST-456", "TEST-789"],
            ),
            ("no issue", vec![]),
        ];

        for (message, want) in cases {
            let ctx = with_message("TEST", message);
            assert_eq!(extract_issues(&ctx), want, "message: {message}");
        }
    }

    #[test]
    fn test_extract_across_sources_in_order() {
        let mut ctx = with_message("PROJ", "fix PROJ-3");
        ctx.pull_request_title = "PROJ-1 title".to_string();
        ctx.commit.source = "feature/PROJ-2".to_string();
        ctx.commit.branch = "PROJ-3-branch".to_string();

        assert_eq!(
            extract_issues(&ctx),
            vec!["PROJ-3", "PROJ-1", "PROJ-2", "PROJ-3"]
        );
    }

    #[test]
    fn test_other_projects_ignored() {
        let ctx = with_message("TEST", "OTHER-1 and test-2 and TEST-3");
        assert_eq!(extract_issues(&ctx), vec!["TEST-3"]);
    }

    #[test]
    fn test_project_key_is_literal() {
        let ctx = with_message("A.B", "AXB-1 A.B-2");
        assert_eq!(extract_issues(&ctx), vec!["A.B-2"]);
    }

    #[test]
    fn test_empty_project_extracts_nothing() {
        let ctx = with_message("", "TEST-1");
        assert!(extract_issues(&ctx).is_empty());
        assert_eq!(extract_issue(&ctx), "");
    }

    #[test]
    fn test_explicit_keys_win() {
        let mut ctx = with_message("TEST", "TEST-1");
        ctx.issue_keys = vec!["OPS-9".to_string(), " ".to_string()];
        assert_eq!(resolve_issues(&ctx).unwrap(), vec!["OPS-9"]);
    }

    #[test]
    fn test_resolve_fails_without_issues() {
        let ctx = with_message("TEST", "nothing here");
        let err = resolve_issues(&ctx).unwrap_err();
        assert!(matches!(err, ReportError::IssueNotFound { .. }));
    }
}
