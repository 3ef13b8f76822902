pub mod board_reader;
pub mod executor;
pub mod issue_reader;
pub mod reconcile;

use crate::config::AppConfig;
use crate::error::SyncResult;
use crate::github::GitHubApi;
use crate::model::progress::ProgressRanking;
use crate::model::team::TeamDirectory;

pub use executor::ExecutionSummary;
pub use issue_reader::IssueRef;
pub use reconcile::{Action, Diagnostic, Reconciliation};

#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub reconciliation: Reconciliation,
    pub summary: ExecutionSummary,
}

/// One synchronization pass with its static tables injected up front.
pub struct Synchronizer<'a> {
    api: &'a dyn GitHubApi,
    directory: TeamDirectory,
    ranking: ProgressRanking,
    dry_run: bool,
}

impl<'a> Synchronizer<'a> {
    pub fn new(
        api: &'a dyn GitHubApi,
        directory: TeamDirectory,
        ranking: ProgressRanking,
        dry_run: bool,
    ) -> Self {
        Self {
            api,
            directory,
            ranking,
            dry_run,
        }
    }

    pub fn from_config(api: &'a dyn GitHubApi, config: &AppConfig, dry_run: bool) -> Self {
        Self::new(
            api,
            TeamDirectory::new(&config.teams),
            ProgressRanking::from_config(&config.progress),
            dry_run || config.github.dry_run,
        )
    }

    /// Read boards, read issues, diff, and apply.
    ///
    /// `repositories` are searched for boards configured by project name.
    pub async fn run(&self, issue_ref: &IssueRef, repositories: &[String]) -> SyncResult<SyncReport> {
        if self.directory.is_empty() {
            tracing::warn!("no team members configured, nothing to synchronize");
        }

        let (boards, board_diagnostics) =
            board_reader::fetch_boards(self.api, &self.directory, repositories).await?;
        let issues =
            issue_reader::fetch_issue_state(self.api, &self.directory, &self.ranking, issue_ref)
                .await?;

        let mut reconciliation = reconcile::reconcile(&boards, &issues);
        let mut diagnostics = board_diagnostics;
        diagnostics.append(&mut reconciliation.diagnostics);
        reconciliation.diagnostics = diagnostics;

        let summary = executor::execute(self.api, &reconciliation.actions, self.dry_run).await?;
        tracing::info!(
            created = summary.created,
            moved = summary.moved,
            skipped = summary.skipped,
            diagnostics = reconciliation.diagnostics.len(),
            "synchronization finished"
        );

        Ok(SyncReport {
            reconciliation,
            summary,
        })
    }
}
