//! Issue lifecycle orchestration
//!
//! The two multi-step workflows of the archive: uploading an issue bundle
//! (media uploads followed by metadata upserts) and deleting an issue
//! (best-effort media deletes followed by metadata removal). Planning is
//! pure and separated from execution so the sequencing rules are testable
//! without a network.

mod classify;
mod delete;
mod upload;

pub use classify::{classify_bundle_file, BundleKind};
pub use delete::{run_deletion, DeletionReport, IssueDeletion};
pub use upload::{plan_upload, run_upload, IssueUpload, PlannedUpload, UploadPlan, UploadReport};

use chrono::NaiveDate;

/// An in-memory file handed to the upload orchestrator.
#[derive(Debug, Clone)]
pub struct FilePayload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Media-store folder for one issue: `/news/{yyyy}/{mm}/{dd}/{slug}`.
pub fn base_folder(date: NaiveDate, newspaper: &str) -> String {
    format!("/news/{}/{}", date.format("%Y/%m/%d"), newspaper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_folder_layout() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(base_folder(date, "the-hindu"), "/news/2024/05/01/the-hindu");
    }
}
