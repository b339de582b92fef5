//! Issue upload orchestrator
//!
//! Sequences the media uploads and metadata upserts that turn one original
//! PDF plus a bundle of summary/topic PDFs into a fully linked issue. Every
//! step runs strictly after the previous one; the first failure aborts the
//! rest and surfaces unchanged. Nothing is rolled back on failure - partial
//! state is visible in the report and is cleaned up via the deletion flow.

use super::classify::{classify_bundle_file, BundleKind};
use super::{base_folder, FilePayload};
use crate::db::models::{File, FileType, Issue, IssueField};
use crate::db::{NewFileRecord, Repository};
use crate::errors::{AppError, Result};
use crate::media::MediaStore;
use crate::metrics;
use chrono::NaiveDate;
use serde::Serialize;
use std::time::Instant;
use tracing::{info, instrument};

/// Input to one upload run.
#[derive(Debug)]
pub struct IssueUpload {
    pub date: NaiveDate,
    pub newspaper: String,
    pub original: Option<FilePayload>,
    pub bundle: Vec<FilePayload>,
}

/// One planned media upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpload {
    pub file_type: FileType,
    pub topic: Option<String>,
    pub folder: String,
    pub stored_name: String,
}

/// The full sequence of uploads for a run; `bundle` is parallel to the
/// input's bundle files.
#[derive(Debug)]
pub struct UploadPlan {
    pub original: PlannedUpload,
    pub bundle: Vec<PlannedUpload>,
}

/// What an upload run committed.
#[derive(Debug, Serialize)]
pub struct UploadReport {
    pub files: Vec<File>,
    pub issue: Issue,
}

/// Validate an upload request and lay out every media upload it will
/// perform. Fails before any network call when the preconditions are not
/// met: an original PDF must be present and at least one bundle file must
/// classify as a summary.
pub fn plan_upload(upload: &IssueUpload) -> Result<UploadPlan> {
    if upload.original.is_none() {
        return Err(AppError::Validation {
            message: "An original PDF is required".into(),
            field: Some("original".into()),
        });
    }

    let base = base_folder(upload.date, &upload.newspaper);

    let bundle: Vec<PlannedUpload> = upload
        .bundle
        .iter()
        .map(|file| match classify_bundle_file(&file.name) {
            BundleKind::Summary => PlannedUpload {
                file_type: FileType::Summary,
                topic: None,
                folder: format!("{}/summary", base),
                stored_name: file.name.clone(),
            },
            BundleKind::Topic(topic) => PlannedUpload {
                file_type: FileType::Topic,
                topic: Some(topic),
                folder: format!("{}/topic", base),
                stored_name: file.name.clone(),
            },
        })
        .collect();

    if !bundle.iter().any(|p| p.file_type == FileType::Summary) {
        return Err(AppError::Validation {
            message: "The bundle must include at least one summary PDF".into(),
            field: Some("bundle".into()),
        });
    }

    Ok(UploadPlan {
        original: PlannedUpload {
            file_type: FileType::Original,
            topic: None,
            folder: format!("{}/original", base),
            stored_name: format!("{}-{}.pdf", upload.newspaper, upload.date),
        },
        bundle,
    })
}

/// Execute an upload run: credentials once, uploads in order, then the
/// metadata upserts that link the issue.
#[instrument(skip(repo, media, upload), fields(date = %upload.date, newspaper = %upload.newspaper))]
pub async fn run_upload(
    repo: &Repository,
    media: &impl MediaStore,
    upload: IssueUpload,
) -> Result<UploadReport> {
    let started = Instant::now();
    let plan = plan_upload(&upload)?;

    let IssueUpload {
        date,
        newspaper,
        original,
        bundle,
    } = upload;
    let original = original.ok_or_else(|| AppError::Validation {
        message: "An original PDF is required".into(),
        field: Some("original".into()),
    })?;

    // One set of credentials per run; the token is short-lived.
    let auth = media.auth_params()?;

    let uploaded_original = media
        .upload(
            &auth,
            original.bytes,
            &plan.original.stored_name,
            &plan.original.folder,
            &upload_tags(date, &newspaper, FileType::Original),
        )
        .await?;

    let mut uploaded_bundle = Vec::with_capacity(bundle.len());
    for (file, planned) in bundle.into_iter().zip(plan.bundle.iter()) {
        let uploaded = media
            .upload(
                &auth,
                file.bytes,
                &planned.stored_name,
                &planned.folder,
                &upload_tags(date, &newspaper, planned.file_type),
            )
            .await?;
        uploaded_bundle.push(uploaded);
    }

    // Media is in place; now link the metadata. Original row first, then its
    // issue URL, then each bundle row in upload order.
    let mut files = Vec::with_capacity(uploaded_bundle.len() + 1);

    files.push(
        repo.upsert_file(&NewFileRecord {
            date,
            newspaper: newspaper.clone(),
            file_type: FileType::Original,
            topic: None,
            url: uploaded_original.url.clone(),
            file_id: Some(uploaded_original.file_id),
            path: Some(uploaded_original.path),
        })
        .await?,
    );

    let mut issue = repo
        .upsert_issue_url(date, &newspaper, IssueField::OriginalUrl, &uploaded_original.url)
        .await?;

    for (planned, uploaded) in plan.bundle.iter().zip(uploaded_bundle) {
        files.push(
            repo.upsert_file(&NewFileRecord {
                date,
                newspaper: newspaper.clone(),
                file_type: planned.file_type,
                topic: planned.topic.clone(),
                url: uploaded.url.clone(),
                file_id: Some(uploaded.file_id),
                path: Some(uploaded.path),
            })
            .await?,
        );

        if planned.file_type == FileType::Summary {
            issue = repo
                .upsert_issue_url(date, &newspaper, IssueField::SummaryUrl, &uploaded.url)
                .await?;
        }
    }

    metrics::record_issue_upload(started.elapsed().as_secs_f64(), files.len());
    info!(files = files.len(), "Issue bundle uploaded");

    Ok(UploadReport { files, issue })
}

fn upload_tags(date: NaiveDate, newspaper: &str, file_type: FileType) -> String {
    format!("date:{},paper:{},type:{}", date, newspaper, file_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str) -> FilePayload {
        FilePayload {
            name: name.into(),
            bytes: vec![0u8; 4],
        }
    }

    fn upload_request(original: Option<&str>, bundle: &[&str]) -> IssueUpload {
        IssueUpload {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            newspaper: "the-hindu".into(),
            original: original.map(payload),
            bundle: bundle.iter().map(|n| payload(n)).collect(),
        }
    }

    #[test]
    fn test_plan_requires_original() {
        let err = plan_upload(&upload_request(None, &["summary.pdf"])).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_plan_requires_a_summary() {
        let err = plan_upload(&upload_request(Some("o.pdf"), &["economy.pdf"])).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        let err = plan_upload(&upload_request(Some("o.pdf"), &[])).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_plan_lays_out_folders_and_names() {
        let plan = plan_upload(&upload_request(
            Some("o.pdf"),
            &["summary.pdf", "economy.pdf"],
        ))
        .unwrap();

        assert_eq!(plan.original.file_type, FileType::Original);
        assert_eq!(plan.original.folder, "/news/2024/05/01/the-hindu/original");
        assert_eq!(plan.original.stored_name, "the-hindu-2024-05-01.pdf");

        assert_eq!(plan.bundle.len(), 2);
        assert_eq!(plan.bundle[0].file_type, FileType::Summary);
        assert_eq!(plan.bundle[0].folder, "/news/2024/05/01/the-hindu/summary");
        assert_eq!(plan.bundle[0].topic, None);

        assert_eq!(plan.bundle[1].file_type, FileType::Topic);
        assert_eq!(plan.bundle[1].folder, "/news/2024/05/01/the-hindu/topic");
        assert_eq!(plan.bundle[1].topic.as_deref(), Some("economy"));
        assert_eq!(plan.bundle[1].stored_name, "economy.pdf");
    }

    #[test]
    fn test_plan_keeps_bundle_order() {
        let plan = plan_upload(&upload_request(
            Some("o.pdf"),
            &["polity-governance.pdf", "daily-bundle.pdf", "sports.pdf"],
        ))
        .unwrap();

        assert_eq!(plan.bundle[0].topic.as_deref(), Some("polity-governance"));
        assert_eq!(plan.bundle[1].file_type, FileType::Summary);
        assert_eq!(plan.bundle[2].topic.as_deref(), Some("sports"));
    }

    #[test]
    fn test_upload_tags_format() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(
            upload_tags(date, "the-hindu", FileType::Summary),
            "date:2024-05-01,paper:the-hindu,type:summary"
        );
    }
}
