use std::fmt;

use serde_json::{json, Value};

use crate::model::board::BoardIndex;
use crate::model::issue::IssueState;

/// A corrective write against a project board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CreateCard {
        team: String,
        issue_number: u64,
        html_url: String,
        content_id: u64,
        column: String,
        column_id: u64,
        column_url: String,
    },
    MoveCard {
        team: String,
        issue_number: u64,
        html_url: String,
        card_url: String,
        from_column: String,
        column: String,
        column_id: u64,
    },
}

impl Action {
    pub fn issue_number(&self) -> u64 {
        match self {
            Action::CreateCard { issue_number, .. } | Action::MoveCard { issue_number, .. } => {
                *issue_number
            }
        }
    }

    pub fn endpoint(&self) -> String {
        match self {
            Action::CreateCard { column_url, .. } => format!("{column_url}/cards"),
            Action::MoveCard { card_url, .. } => format!("{card_url}/moves"),
        }
    }

    pub fn body(&self) -> Value {
        match self {
            Action::CreateCard { content_id, .. } => {
                json!({ "content_id": content_id, "content_type": "Issue" })
            }
            Action::MoveCard { column_id, .. } => {
                json!({ "column_id": column_id, "position": "top" })
            }
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::CreateCard {
                team,
                html_url,
                column,
                ..
            } => write!(f, "add {html_url} to '{column}' in {team}"),
            Action::MoveCard {
                team,
                html_url,
                from_column,
                column,
                ..
            } => write!(f, "move {html_url} from '{from_column}' to '{column}' in {team}"),
        }
    }
}

/// Something the run could not fix. Reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A configured board identity matched no project.
    BoardUnresolved { team: String, board: String },
    /// The issue belongs on a team whose board was not read.
    MissingBoard { team: String, html_url: String },
    ColumnNotFound {
        team: String,
        html_url: String,
        column: String,
    },
    /// A card sits on a board whose team the issue is not assigned to.
    UnexpectedCard { team: String, html_url: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::BoardUnresolved { team, board } => {
                write!(f, "board {board} for {team} not found")
            }
            Diagnostic::MissingBoard { team, html_url } => {
                write!(f, "{html_url} belongs to {team} but {team} has no board")
            }
            Diagnostic::ColumnNotFound {
                team,
                html_url,
                column,
            } => write!(f, "column '{column}' for {html_url} not found in {team}"),
            Diagnostic::UnexpectedCard { team, html_url } => {
                write!(f, "{html_url} is unexpectedly present in {team}")
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub actions: Vec<Action>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Reconciliation {
    fn diagnose(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

/// Diff desired board placement against what the boards actually show and
/// compute the writes that bring `boards` in line with `issues`.
///
/// Actions come out in the order desired-state records were produced. Records
/// whose target column cannot be resolved are skipped with a diagnostic.
pub fn reconcile(boards: &BoardIndex, issues: &IssueState) -> Reconciliation {
    let mut out = Reconciliation::default();

    for desired in &issues.desired {
        let team = desired.team.as_str();
        if !boards.has_board(team) {
            out.diagnose(Diagnostic::MissingBoard {
                team: team.to_string(),
                html_url: desired.html_url.clone(),
            });
            continue;
        }

        let card = boards.card(team, desired.issue_number, &desired.url);
        if card.is_some_and(|c| c.column == desired.column) {
            continue;
        }

        let Some(target) = boards.column(team, &desired.column) else {
            out.diagnose(Diagnostic::ColumnNotFound {
                team: team.to_string(),
                html_url: desired.html_url.clone(),
                column: desired.column.clone(),
            });
            continue;
        };

        let action = match card {
            None => Action::CreateCard {
                team: team.to_string(),
                issue_number: desired.issue_number,
                html_url: desired.html_url.clone(),
                content_id: desired.issue_id,
                column: desired.column.clone(),
                column_id: target.id,
                column_url: target.url.clone(),
            },
            Some(card) => Action::MoveCard {
                team: team.to_string(),
                issue_number: desired.issue_number,
                html_url: desired.html_url.clone(),
                card_url: card.url.clone(),
                from_column: card.column.clone(),
                column: desired.column.clone(),
                column_id: target.id,
            },
        };
        tracing::debug!("planned: {action}");
        out.actions.push(action);
    }

    for issue in &issues.issues {
        for team in &boards.teams {
            if issue.teams.contains(team) {
                continue;
            }
            if boards.card(team, issue.number, &issue.url).is_some() {
                out.diagnose(Diagnostic::UnexpectedCard {
                    team: team.clone(),
                    html_url: issue.html_url.clone(),
                });
            }
        }
    }

    out
}
