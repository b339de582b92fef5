//! Issue lifecycle handlers and read views

use super::{ok, parse_date, require, Envelope};
use crate::AppState;
use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use pressroom_common::archive::{
    run_deletion, run_upload, DeletionReport, FilePayload, IssueDeletion, IssueUpload, UploadReport,
};
use pressroom_common::db::models::Issue;
use pressroom_common::db::Repository;
use pressroom_common::errors::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Upload a complete issue bundle.
///
/// Multipart form: `date` and `newspaper` text fields, one `original` file
/// part and any number of `bundle` file parts. The orchestrator classifies
/// the bundle, uploads everything to the media store and links the metadata
/// rows; the first failing step aborts the rest.
pub async fn upload_issue(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Envelope<UploadReport>>> {
    let mut date = None;
    let mut newspaper = None;
    let mut original = None;
    let mut bundle = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "date" => date = Some(field.text().await.map_err(bad_multipart)?),
            "newspaper" => newspaper = Some(field.text().await.map_err(bad_multipart)?),
            "original" => {
                let file_name = field.file_name().unwrap_or("original.pdf").to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                original = Some(FilePayload {
                    name: file_name,
                    bytes: bytes.to_vec(),
                });
            }
            "bundle" => {
                let file_name = field
                    .file_name()
                    .ok_or_else(|| AppError::Validation {
                        message: "Bundle parts must carry a filename".into(),
                        field: Some("bundle".into()),
                    })?
                    .to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                bundle.push(FilePayload {
                    name: file_name,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    let upload = IssueUpload {
        date: parse_date(&require(date, "date")?)?,
        newspaper: require(newspaper, "newspaper")?,
        original,
        bundle,
    };

    let repo = Repository::new(state.db.clone());
    let report = run_upload(&repo, &state.media, upload).await?;

    Ok(ok(report))
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation {
        message: format!("Malformed multipart request: {}", err),
        field: None,
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteIssueRequest {
    pub date: Option<String>,
    pub newspaper: Option<String>,
}

/// Delete an entire issue: best-effort media deletes, then all file rows
/// and both issue URL fields.
pub async fn delete_issue(
    State(state): State<AppState>,
    Json(request): Json<DeleteIssueRequest>,
) -> Result<Json<Envelope<DeletionReport>>> {
    let date = parse_date(&require(request.date, "date")?)?;
    let newspaper = require(request.newspaper, "newspaper")?;

    let repo = Repository::new(state.db.clone());
    let report = run_deletion(
        &repo,
        &state.media,
        IssueDeletion::entire_issue(date, newspaper),
    )
    .await?;

    Ok(ok(report))
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

/// Read view: issues for a date
pub async fn list_issues(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Envelope<Vec<Issue>>>> {
    let date = parse_date(&require(query.date, "date")?)?;

    let repo = Repository::new(state.db.clone());
    Ok(ok(repo.list_issues(date).await?))
}

/// Read view: distinct topic tags for a date
pub async fn list_topics(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Envelope<Vec<String>>>> {
    let date = parse_date(&require(query.date, "date")?)?;

    let repo = Repository::new(state.db.clone());
    Ok(ok(repo.list_topics(date).await?))
}

#[derive(Serialize)]
pub struct TopicPdf {
    pub newspaper: String,
    pub url: String,
}

/// Read view: topic PDFs for (date, topic), one entry per newspaper
pub async fn list_topic_pdfs(
    State(state): State<AppState>,
    Path(topic): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Envelope<Vec<TopicPdf>>>> {
    let date = parse_date(&require(query.date, "date")?)?;

    let repo = Repository::new(state.db.clone());
    let pdfs = repo
        .list_topic_pdfs(date, &topic)
        .await?
        .into_iter()
        .map(|f| TopicPdf {
            newspaper: f.newspaper,
            url: f.url,
        })
        .collect();

    Ok(ok(pdfs))
}
