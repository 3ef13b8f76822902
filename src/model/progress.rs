use std::collections::HashMap;

use crate::config::ProgressConfig;

/// Canonical form of a project column name. Board columns and desired columns
/// are both passed through this so comparisons never depend on casing.
pub fn normalize_column(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Ranks progress labels and maps each to the board column it stands for.
#[derive(Debug, Clone)]
pub struct ProgressRanking {
    ranks: HashMap<String, i64>,
    columns: HashMap<String, String>,
}

impl ProgressRanking {
    pub fn new(ranks: HashMap<String, i64>, overrides: &HashMap<String, String>) -> Self {
        let columns = ranks
            .keys()
            .map(|label| {
                let column = overrides
                    .get(label)
                    .map(String::as_str)
                    .unwrap_or_else(|| default_column(label));
                (label.clone(), normalize_column(column))
            })
            .collect();
        Self { ranks, columns }
    }

    pub fn from_config(config: &ProgressConfig) -> Self {
        Self::new(config.ranks.clone(), &config.columns)
    }

    pub fn rank(&self, label: &str) -> Option<i64> {
        self.ranks.get(label).copied()
    }

    /// Highest-ranked label in `labels`. Among equal ranks the first one seen wins.
    pub fn resolve_progress<'a, I>(&self, labels: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut best: Option<(&'a str, i64)> = None;
        for label in labels {
            let Some(rank) = self.rank(label) else {
                continue;
            };
            if best.map_or(true, |(_, top)| rank > top) {
                best = Some((label, rank));
            }
        }
        best.map(|(label, _)| label)
    }

    /// Normalized column name for a ranked label.
    pub fn column_for(&self, label: &str) -> Option<&str> {
        self.columns.get(label).map(String::as_str)
    }
}

/// "2 - Working" -> "Working"; labels without the separator map to themselves.
fn default_column(label: &str) -> &str {
    label
        .split_once(" - ")
        .map(|(_, column)| column)
        .unwrap_or(label)
}
