use std::collections::{BTreeSet, HashSet};
use std::pin::pin;

use futures::TryStreamExt;

use crate::error::SyncResult;
use crate::github::{fetch, list, GitHubApi, ResourceFamily};
use crate::model::issue::{DesiredState, Issue, IssueState, TrackedIssue};
use crate::model::progress::ProgressRanking;
use crate::model::team::TeamDirectory;

/// Which issues a run looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueRef {
    /// A single issue by API URL, as delivered by a webhook event.
    Url(String),
    /// Every open issue in `repositories` assigned to a tracked member.
    Assigned { repositories: Vec<String> },
}

pub async fn fetch_issue_state(
    api: &dyn GitHubApi,
    directory: &TeamDirectory,
    ranking: &ProgressRanking,
    issue_ref: &IssueRef,
) -> SyncResult<IssueState> {
    let mut state = IssueState::default();

    match issue_ref {
        IssueRef::Url(url) => {
            let issue: Issue = fetch(api, url, ResourceFamily::Issues).await?;
            collect(&issue, directory, ranking, &mut state);
        }
        IssueRef::Assigned { repositories } => {
            let mut seen = HashSet::new();
            for login in directory.members() {
                for repository in repositories {
                    let url = format!(
                        "{}/issues?state=open&assignee={}",
                        repository.trim_end_matches('/'),
                        urlencoding::encode(login)
                    );
                    let mut issues = pin!(list::<Issue>(api, &url, ResourceFamily::Issues));
                    while let Some(issue) = issues.try_next().await? {
                        if seen.insert(issue.id) {
                            collect(&issue, directory, ranking, &mut state);
                        }
                    }
                }
            }
        }
    }

    tracing::info!(
        issues = state.issues.len(),
        records = state.desired.len(),
        "read issue state"
    );
    Ok(state)
}

fn collect(
    issue: &Issue,
    directory: &TeamDirectory,
    ranking: &ProgressRanking,
    state: &mut IssueState,
) {
    if let Some((tracked, desired)) = desired_states(issue, directory, ranking) {
        state.issues.push(tracked);
        state.desired.extend(desired);
    }
}

/// One record per tracked team among the issue's assignees, in assignee order.
/// Issues without a progress label produce nothing.
pub fn desired_states(
    issue: &Issue,
    directory: &TeamDirectory,
    ranking: &ProgressRanking,
) -> Option<(TrackedIssue, Vec<DesiredState>)> {
    let Some(label) = ranking.resolve_progress(issue.label_names()) else {
        tracing::info!(issue = %issue.html_url, "no progress label, skipping");
        return None;
    };
    let column = ranking.column_for(label)?;

    let mut teams = BTreeSet::new();
    let mut desired = Vec::new();
    for login in issue.assignee_logins() {
        let Some(team) = directory.team_of(login) else {
            continue;
        };
        if !teams.insert(team.to_string()) {
            continue;
        }
        desired.push(DesiredState {
            team: team.to_string(),
            issue_number: issue.number,
            issue_id: issue.id,
            url: issue.url.clone(),
            html_url: issue.html_url.clone(),
            column: column.to_string(),
        });
    }

    let tracked = TrackedIssue {
        number: issue.number,
        url: issue.url.clone(),
        html_url: issue.html_url.clone(),
        teams,
    };
    Some((tracked, desired))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use serde_json::{json, Value};

    use crate::config::{ProgressConfig, TeamConfig};
    use crate::github::mock::MockGitHub;

    const REPO: &str = "https://api.github.com/repos/acme/devops";

    fn directory() -> TeamDirectory {
        let mut teams = BTreeMap::new();
        teams.insert(
            "YNS".to_string(),
            TeamConfig {
                members: vec!["jsteiak".into(), "tacshooter".into()],
                board: Some("https://api.github.com/projects/1".into()),
            },
        );
        teams.insert(
            "BAS".to_string(),
            TeamConfig {
                members: vec!["bastamper".into()],
                board: Some("https://api.github.com/projects/2".into()),
            },
        );
        TeamDirectory::new(&teams)
    }

    fn ranking() -> ProgressRanking {
        ProgressRanking::from_config(&ProgressConfig::default())
    }

    fn issue_json(number: u64, labels: &[&str], assignees: &[&str]) -> Value {
        json!({
            "id": 1000 + number,
            "number": number,
            "url": format!("{REPO}/issues/{number}"),
            "html_url": format!("https://github.com/acme/devops/issues/{number}"),
            "labels": labels.iter().map(|l| json!({"name": l})).collect::<Vec<_>>(),
            "assignees": assignees.iter().map(|a| json!({"login": a})).collect::<Vec<_>>(),
        })
    }

    fn issue(number: u64, labels: &[&str], assignees: &[&str]) -> Issue {
        serde_json::from_value(issue_json(number, labels, assignees)).unwrap()
    }

    #[test]
    fn one_record_for_tracked_assignee() {
        let (tracked, desired) =
            desired_states(&issue(42, &["2 - Working"], &["jsteiak"]), &directory(), &ranking())
                .unwrap();
        assert_eq!(desired.len(), 1);
        assert_eq!(desired[0].team, "YNS");
        assert_eq!(desired[0].column, "working");
        assert_eq!(desired[0].issue_id, 1042);
        assert_eq!(desired[0].url, format!("{REPO}/issues/42"));
        assert_eq!(tracked.teams.len(), 1);
    }

    #[test]
    fn missing_progress_label_yields_nothing() {
        let result = desired_states(&issue(44, &["bug"], &["jsteiak"]), &directory(), &ranking());
        assert!(result.is_none());
    }

    #[test]
    fn assignees_on_two_teams_fan_out() {
        let (_, desired) = desired_states(
            &issue(45, &["1 - Ready"], &["bastamper", "jsteiak"]),
            &directory(),
            &ranking(),
        )
        .unwrap();
        let teams: Vec<&str> = desired.iter().map(|d| d.team.as_str()).collect();
        assert_eq!(teams, vec!["BAS", "YNS"]);
    }

    #[test]
    fn teammates_collapse_to_one_record() {
        let (_, desired) = desired_states(
            &issue(46, &["1 - Ready"], &["jsteiak", "tacshooter", "outsider"]),
            &directory(),
            &ranking(),
        )
        .unwrap();
        assert_eq!(desired.len(), 1);
    }

    #[test]
    fn untracked_assignees_still_track_the_issue() {
        let (tracked, desired) =
            desired_states(&issue(47, &["1 - Ready"], &["outsider"]), &directory(), &ranking())
                .unwrap();
        assert!(desired.is_empty());
        assert!(tracked.teams.is_empty());
    }

    #[tokio::test]
    async fn reads_single_issue_by_url() {
        let url = format!("{REPO}/issues/42");
        let api = MockGitHub::new().with_object(&url, issue_json(42, &["2 - Working"], &["jsteiak"]));

        let state = fetch_issue_state(&api, &directory(), &ranking(), &IssueRef::Url(url.clone()))
            .await
            .unwrap();

        assert_eq!(state.desired.len(), 1);
        assert_eq!(state.issues.len(), 1);
        assert_eq!(api.families_for(&url), vec![ResourceFamily::Issues]);
    }

    #[tokio::test]
    async fn sweep_queries_each_member_and_dedupes() {
        let shared = issue_json(45, &["1 - Ready"], &["bastamper", "jsteiak"]);
        let api = MockGitHub::new()
            .with_collection(
                &format!("{REPO}/issues?state=open&assignee=bastamper"),
                vec![shared.clone()],
            )
            .with_collection(
                &format!("{REPO}/issues?state=open&assignee=jsteiak"),
                vec![shared, issue_json(44, &["bug"], &["jsteiak"])],
            )
            .with_collection(&format!("{REPO}/issues?state=open&assignee=tacshooter"), vec![]);

        let issue_ref = IssueRef::Assigned {
            repositories: vec![REPO.to_string()],
        };
        let state = fetch_issue_state(&api, &directory(), &ranking(), &issue_ref)
            .await
            .unwrap();

        assert_eq!(state.issues.len(), 1);
        assert_eq!(state.desired.len(), 2);
        assert_eq!(api.requests.lock().unwrap().len(), 3);
    }
}
