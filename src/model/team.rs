use std::collections::{BTreeMap, HashMap};

use crate::config::TeamConfig;

/// Where a team's project board lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardRef {
    /// Project API URL, fetched directly.
    Url(String),
    /// Project name, looked up among the synchronized repository's projects.
    Name(String),
}

impl BoardRef {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("https://") || raw.starts_with("http://") {
            BoardRef::Url(raw.to_string())
        } else {
            BoardRef::Name(raw.to_string())
        }
    }
}

impl std::fmt::Display for BoardRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoardRef::Url(url) => write!(f, "{url}"),
            BoardRef::Name(name) => write!(f, "project '{name}'"),
        }
    }
}

/// Static lookups from person to team and team to board.
#[derive(Debug, Clone, Default)]
pub struct TeamDirectory {
    member_to_team: HashMap<String, String>,
    team_to_board: BTreeMap<String, BoardRef>,
}

impl TeamDirectory {
    /// Teams are applied in code order, so a login listed under two teams ends up
    /// on the one that sorts last.
    pub fn new(teams: &BTreeMap<String, TeamConfig>) -> Self {
        let mut member_to_team = HashMap::new();
        let mut team_to_board = BTreeMap::new();

        for (code, team) in teams {
            for login in &team.members {
                if let Some(previous) = member_to_team.insert(login.clone(), code.clone()) {
                    tracing::debug!(login = %login, previous = %previous, team = %code, "member listed under two teams");
                }
            }
            if let Some(board) = &team.board {
                team_to_board.insert(code.clone(), BoardRef::parse(board));
            }
        }

        Self {
            member_to_team,
            team_to_board,
        }
    }

    pub fn team_of(&self, login: &str) -> Option<&str> {
        self.member_to_team.get(login).map(String::as_str)
    }

    /// Teams with a configured board, in code order.
    pub fn boards(&self) -> impl Iterator<Item = (&str, &BoardRef)> {
        self.team_to_board.iter().map(|(t, b)| (t.as_str(), b))
    }

    /// Every tracked login, sorted for stable query order.
    pub fn members(&self) -> Vec<&str> {
        let mut members: Vec<&str> = self.member_to_team.keys().map(String::as_str).collect();
        members.sort_unstable();
        members
    }

    pub fn is_empty(&self) -> bool {
        self.member_to_team.is_empty()
    }
}
