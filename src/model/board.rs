use std::collections::HashMap;

use serde::Deserialize;

/// Project as returned by the projects API.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub name: String,
    pub columns_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Column {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub cards_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Card {
    pub url: String,
    /// Absent for note cards.
    #[serde(default)]
    pub content_url: Option<String>,
}

impl Card {
    /// Issue number encoded as the last path segment of `content_url`.
    pub fn issue_number(&self) -> Option<u64> {
        self.content_url
            .as_deref()?
            .trim_end_matches('/')
            .rsplit('/')
            .next()?
            .parse()
            .ok()
    }
}

/// Target of create and move operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub id: u64,
    pub url: String,
}

/// Where an issue's card currently sits on one team's board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRef {
    pub url: String,
    /// Normalized column name.
    pub column: String,
    /// API URL of the issue the card shows.
    pub content_url: String,
}

/// Issue API URLs compare equal regardless of a trailing slash.
pub fn same_issue(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}

/// Normalized view of every tracked board, keyed by team code.
#[derive(Debug, Clone, Default)]
pub struct BoardIndex {
    /// (team, normalized column name) -> column
    pub columns: HashMap<(String, String), ColumnRef>,
    /// (team, issue number) -> cards. Boards that collect issues from several
    /// repositories can hold more than one card per number.
    pub cards: HashMap<(String, u64), Vec<CardRef>>,
    /// Teams whose board was actually read.
    pub teams: Vec<String>,
}

impl BoardIndex {
    pub fn column(&self, team: &str, column: &str) -> Option<&ColumnRef> {
        self.columns.get(&(team.to_string(), column.to_string()))
    }

    pub fn add_card(&mut self, team: &str, issue_number: u64, card: CardRef) {
        self.cards
            .entry((team.to_string(), issue_number))
            .or_default()
            .push(card);
    }

    /// The card for the issue at `issue_url` on `team`'s board.
    pub fn card(&self, team: &str, issue_number: u64, issue_url: &str) -> Option<&CardRef> {
        self.cards
            .get(&(team.to_string(), issue_number))?
            .iter()
            .find(|card| same_issue(&card.content_url, issue_url))
    }

    pub fn has_board(&self, team: &str) -> bool {
        self.teams.iter().any(|t| t == team)
    }
}
