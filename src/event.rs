use anyhow::{Context, Result};
use serde::Deserialize;

/// The parts of a workflow `GITHUB_CONTEXT` this tool reads.
#[derive(Debug, Deserialize)]
pub struct ActionContext {
    pub event: IssueEvent,
}

#[derive(Debug, Deserialize)]
pub struct IssueEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub label: Option<EventLabel>,
    pub repository: EventResource,
    pub issue: EventResource,
}

#[derive(Debug, Deserialize)]
pub struct EventLabel {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct EventResource {
    pub url: String,
}

impl ActionContext {
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("GITHUB_CONTEXT is not an issue event payload")
    }

    pub fn issue_url(&self) -> &str {
        &self.event.issue.url
    }

    pub fn repository_url(&self) -> &str {
        &self.event.repository.url
    }
}
