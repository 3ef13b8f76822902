use std::collections::HashMap;
use std::pin::pin;

use futures::TryStreamExt;

use super::reconcile::Diagnostic;
use crate::error::SyncResult;
use crate::github::{fetch, list, GitHubApi, ResourceFamily};
use crate::model::board::{BoardIndex, Card, CardRef, Column, ColumnRef, Project};
use crate::model::progress::normalize_column;
use crate::model::team::{BoardRef, TeamDirectory};

/// Read every configured team board into a [`BoardIndex`].
///
/// Named boards are looked up among the projects of `repositories`. A name that
/// matches nothing is reported and that team is skipped; any HTTP failure
/// aborts the whole read.
pub async fn fetch_boards(
    api: &dyn GitHubApi,
    directory: &TeamDirectory,
    repositories: &[String],
) -> SyncResult<(BoardIndex, Vec<Diagnostic>)> {
    let mut index = BoardIndex::default();
    let mut diagnostics = Vec::new();

    let needs_lookup = directory
        .boards()
        .any(|(_, board)| matches!(board, BoardRef::Name(_)));
    let named = if needs_lookup {
        repository_projects(api, repositories).await?
    } else {
        HashMap::new()
    };

    for (team, board) in directory.boards() {
        let project = match board {
            BoardRef::Url(url) => fetch::<Project>(api, url, ResourceFamily::Projects).await?,
            BoardRef::Name(name) => match named.get(name) {
                Some(project) => project.clone(),
                None => {
                    let diagnostic = Diagnostic::BoardUnresolved {
                        team: team.to_string(),
                        board: board.to_string(),
                    };
                    tracing::warn!("{diagnostic}");
                    diagnostics.push(diagnostic);
                    continue;
                }
            },
        };

        read_board(api, team, &project, &mut index).await?;
        index.teams.push(team.to_string());
    }

    tracing::info!(
        boards = index.teams.len(),
        columns = index.columns.len(),
        cards = index.cards.len(),
        "read project boards"
    );
    Ok((index, diagnostics))
}

/// Projects of each repository by name. The first repository listing a name wins.
async fn repository_projects(
    api: &dyn GitHubApi,
    repositories: &[String],
) -> SyncResult<HashMap<String, Project>> {
    let mut projects = HashMap::new();
    for repository in repositories {
        let url = format!("{}/projects", repository.trim_end_matches('/'));
        let mut listing = pin!(list::<Project>(api, &url, ResourceFamily::Projects));
        while let Some(project) = listing.try_next().await? {
            projects.entry(project.name.clone()).or_insert(project);
        }
    }
    Ok(projects)
}

async fn read_board(
    api: &dyn GitHubApi,
    team: &str,
    project: &Project,
    index: &mut BoardIndex,
) -> SyncResult<()> {
    let mut columns = pin!(list::<Column>(api, &project.columns_url, ResourceFamily::Projects));
    while let Some(column) = columns.try_next().await? {
        let name = normalize_column(&column.name);

        let mut cards = pin!(list::<Card>(api, &column.cards_url, ResourceFamily::Projects));
        while let Some(card) = cards.try_next().await? {
            let Some(number) = card.issue_number() else {
                continue;
            };
            let Some(content_url) = card.content_url else {
                continue;
            };
            index.add_card(
                team,
                number,
                CardRef {
                    url: card.url,
                    column: name.clone(),
                    content_url,
                },
            );
        }

        index.columns.insert(
            (team.to_string(), name),
            ColumnRef {
                id: column.id,
                url: column.url,
            },
        );
    }
    Ok(())
}
