//! Issue deletion orchestrator
//!
//! Looks up the issue's file rows, attempts the remote deletes, then removes
//! the metadata rows and nulls the requested issue URL fields. The remote
//! deletes run first so the metadata record of what should exist remotely is
//! not lost before they are attempted; a remote failure for one identifier
//! never aborts the batch, so orphaned remote files are possible and are
//! reported rather than raised.

use crate::db::models::{FileType, IssueField};
use crate::db::Repository;
use crate::errors::Result;
use crate::media::{DeleteOutcome, MediaStore};
use crate::metrics;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, instrument};

/// Input to one deletion run.
#[derive(Debug)]
pub struct IssueDeletion {
    pub date: NaiveDate,
    pub newspaper: String,
    /// File kinds whose metadata rows are removed.
    pub types: Vec<FileType>,
    /// Issue URL fields to null; fields not listed stay as they are.
    pub null_fields: Vec<IssueField>,
}

impl IssueDeletion {
    /// Deletion of an entire issue: every file kind, both URL fields.
    pub fn entire_issue(date: NaiveDate, newspaper: String) -> Self {
        Self {
            date,
            newspaper,
            types: FileType::ALL.to_vec(),
            null_fields: IssueField::ALL.to_vec(),
        }
    }
}

/// What a deletion run did.
#[derive(Debug, Serialize)]
pub struct DeletionReport {
    /// Per-identifier remote delete outcomes (best-effort).
    pub media: Vec<DeleteOutcome>,
    pub files_deleted: u64,
    pub issues_updated: u64,
}

/// Execute a deletion run.
#[instrument(skip(repo, media, deletion), fields(date = %deletion.date, newspaper = %deletion.newspaper))]
pub async fn run_deletion(
    repo: &Repository,
    media: &impl MediaStore,
    deletion: IssueDeletion,
) -> Result<DeletionReport> {
    let rows = repo.list_files(deletion.date, &deletion.newspaper).await?;

    let file_ids: Vec<String> = rows.into_iter().filter_map(|f| f.file_id).collect();

    let mut outcomes = Vec::with_capacity(file_ids.len());
    for file_id in &file_ids {
        let outcome = media.delete(file_id).await?;
        metrics::record_media_delete(outcome.success);
        outcomes.push(outcome);
    }

    let files_deleted = repo
        .delete_files(deletion.date, &deletion.newspaper, &deletion.types)
        .await?;

    let issues_updated = repo
        .null_issue_fields(deletion.date, &deletion.newspaper, &deletion.null_fields)
        .await?;

    metrics::record_issue_deletion(files_deleted);
    info!(
        media_deletes = outcomes.len(),
        media_failures = outcomes.iter().filter(|o| !o.success).count(),
        files_deleted,
        "Issue deleted"
    );

    Ok(DeletionReport {
        media: outcomes,
        files_deleted,
        issues_updated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entire_issue_covers_everything() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let deletion = IssueDeletion::entire_issue(date, "the-hindu".into());

        assert_eq!(deletion.types.len(), 4);
        assert_eq!(deletion.null_fields.len(), 2);
    }
}
