use super::reconcile::Action;
use crate::error::SyncResult;
use crate::github::{GitHubApi, ResourceFamily};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub created: usize,
    pub moved: usize,
    /// Actions not sent because of dry-run.
    pub skipped: usize,
}

/// Apply actions one at a time. The first failed write stops the run; whatever
/// was not applied is picked up again by the next reconciliation.
pub async fn execute(
    api: &dyn GitHubApi,
    actions: &[Action],
    dry_run: bool,
) -> SyncResult<ExecutionSummary> {
    let mut summary = ExecutionSummary::default();

    for action in actions {
        if dry_run {
            tracing::info!(issue = action.issue_number(), "dry run: would {action}");
            summary.skipped += 1;
            continue;
        }

        api.post_one(&action.endpoint(), ResourceFamily::Projects, &action.body())
            .await?;

        match action {
            Action::CreateCard { .. } => summary.created += 1,
            Action::MoveCard { .. } => summary.moved += 1,
        }
        tracing::info!(issue = action.issue_number(), "done: {action}");
    }

    Ok(summary)
}
