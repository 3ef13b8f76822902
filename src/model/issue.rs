use std::collections::BTreeSet;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub number: u64,
    pub url: String,
    pub html_url: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub assignees: Vec<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
}

impl Issue {
    pub fn label_names(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|l| l.name.as_str())
    }

    pub fn assignee_logins(&self) -> impl Iterator<Item = &str> {
        self.assignees.iter().map(|u| u.login.as_str())
    }
}

/// The column an issue should occupy on one team's board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredState {
    pub team: String,
    pub issue_number: u64,
    pub issue_id: u64,
    pub url: String,
    pub html_url: String,
    /// Normalized column name.
    pub column: String,
}

/// An issue that took part in the run, with the teams it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedIssue {
    pub number: u64,
    pub url: String,
    pub html_url: String,
    pub teams: BTreeSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct IssueState {
    pub issues: Vec<TrackedIssue>,
    pub desired: Vec<DesiredState>,
}
