//! File metadata handlers (legacy SPA paths)

use super::{ok, parse_date, require, Envelope};
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use pressroom_common::db::models::{File, FileType, Issue, IssueField};
use pressroom_common::db::{NewFileRecord, Repository};
use pressroom_common::errors::{AppError, Result};
use pressroom_common::media::path_from_url;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct FilesQuery {
    pub date: Option<String>,
    pub newspaper: Option<String>,
}

/// List file rows for (date, newspaper), ordered by type
pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<FilesQuery>,
) -> Result<Json<Envelope<Vec<File>>>> {
    let date = parse_date(&require(query.date, "date")?)?;
    let newspaper = require(query.newspaper, "newspaper")?;

    let repo = Repository::new(state.db.clone());
    let files = repo.list_files(date, &newspaper).await?;

    Ok(ok(files))
}

#[derive(Debug, Deserialize)]
pub struct UpsertFileRequest {
    pub date: Option<String>,
    pub newspaper: Option<String>,
    #[serde(rename = "type")]
    pub file_type: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default, alias = "fileId")]
    pub file_id: Option<String>,
    #[serde(default, alias = "filePath", alias = "file_path")]
    pub path: Option<String>,
}

#[derive(Serialize)]
pub struct UpsertFileData {
    pub file: File,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<Issue>,
}

/// Check an upsert request before anything touches the database.
///
/// Original and archive rows must resolve a media-store `file_id` and
/// `path`; when the path is absent it falls back to the URL pathname, the
/// same derivation upload responses go through.
fn validate_upsert(request: UpsertFileRequest) -> Result<NewFileRecord> {
    let date = parse_date(&require(request.date, "date")?)?;
    let newspaper = require(request.newspaper, "newspaper")?;
    let file_type: FileType = require(request.file_type, "type")?.parse()?;
    let url = require(request.url, "url")?;

    let path = request.path.or_else(|| path_from_url(&url));

    if file_type.requires_media_handle() {
        if request.file_id.is_none() {
            return Err(AppError::MissingField {
                field: "file_id".into(),
            });
        }
        if path.is_none() {
            return Err(AppError::MissingField {
                field: "path".into(),
            });
        }
    }

    let topic = match file_type {
        FileType::Topic => request.topic,
        _ => None,
    };

    Ok(NewFileRecord {
        date,
        newspaper,
        file_type,
        topic,
        url,
        file_id: request.file_id,
        path,
    })
}

/// Upsert one file row; original and summary rows also refresh the matching
/// issue URL field.
pub async fn upsert_file(
    State(state): State<AppState>,
    Json(request): Json<UpsertFileRequest>,
) -> Result<Json<Envelope<UpsertFileData>>> {
    let record = validate_upsert(request)?;

    let repo = Repository::new(state.db.clone());
    let file = repo.upsert_file(&record).await?;

    let issue = match record.file_type {
        FileType::Original => Some(
            repo.upsert_issue_url(record.date, &record.newspaper, IssueField::OriginalUrl, &record.url)
                .await?,
        ),
        FileType::Summary => Some(
            repo.upsert_issue_url(record.date, &record.newspaper, IssueField::SummaryUrl, &record.url)
                .await?,
        ),
        _ => None,
    };

    Ok(ok(UpsertFileData { file, issue }))
}

#[derive(Debug, Deserialize)]
pub struct DeleteFilesRequest {
    #[serde(default)]
    pub id: Option<i64>,
    pub date: Option<String>,
    pub newspaper: Option<String>,
    #[serde(default)]
    pub types: Option<Vec<String>>,
    #[serde(default, rename = "nullIssues")]
    pub null_issues: Option<Vec<String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFilesData {
    pub files_deleted: u64,
    pub issues_updated: u64,
}

/// Delete file rows - either a single row by id, or by (date, newspaper)
/// across a type set - and null the requested issue URL fields.
pub async fn delete_files(
    State(state): State<AppState>,
    Json(request): Json<DeleteFilesRequest>,
) -> Result<Json<Envelope<DeleteFilesData>>> {
    let repo = Repository::new(state.db.clone());

    if let Some(id) = request.id {
        let files_deleted = repo.delete_file_by_id(id).await?;
        return Ok(ok(DeleteFilesData {
            files_deleted,
            issues_updated: 0,
        }));
    }

    let date = parse_date(&require(request.date, "date")?)?;
    let newspaper = require(request.newspaper, "newspaper")?;

    let types = parse_list::<FileType>(request.types)?;
    let null_fields = parse_list::<IssueField>(request.null_issues)?;

    let files_deleted = repo.delete_files(date, &newspaper, &types).await?;
    let issues_updated = repo.null_issue_fields(date, &newspaper, &null_fields).await?;

    Ok(ok(DeleteFilesData {
        files_deleted,
        issues_updated,
    }))
}

fn parse_list<T: std::str::FromStr<Err = AppError>>(values: Option<Vec<String>>) -> Result<Vec<T>> {
    values
        .unwrap_or_default()
        .iter()
        .map(|v| v.parse())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> UpsertFileRequest {
        UpsertFileRequest {
            date: Some("2024-05-01".into()),
            newspaper: Some("the-hindu".into()),
            file_type: Some("original".into()),
            url: Some("https://ik.example.com/news/2024/05/01/the-hindu/original/o.pdf".into()),
            topic: None,
            file_id: Some("abc123".into()),
            path: Some("/news/2024/05/01/the-hindu/original/o.pdf".into()),
        }
    }

    #[test]
    fn test_valid_original_upsert() {
        let record = validate_upsert(base_request()).unwrap();
        assert_eq!(record.file_type, FileType::Original);
        assert_eq!(record.newspaper, "the-hindu");
        assert_eq!(record.topic, None);
    }

    #[test]
    fn test_original_without_file_id_is_rejected() {
        let request = UpsertFileRequest {
            file_id: None,
            ..base_request()
        };
        let err = validate_upsert(request).unwrap_err();
        assert!(matches!(err, AppError::MissingField { field } if field == "file_id"));
    }

    #[test]
    fn test_path_falls_back_to_url_pathname() {
        let request = UpsertFileRequest {
            path: None,
            ..base_request()
        };
        let record = validate_upsert(request).unwrap();
        assert_eq!(
            record.path.as_deref(),
            Some("/news/2024/05/01/the-hindu/original/o.pdf")
        );
    }

    #[test]
    fn test_summary_needs_no_media_handle() {
        let request = UpsertFileRequest {
            file_type: Some("summary".into()),
            file_id: None,
            path: None,
            ..base_request()
        };
        let record = validate_upsert(request).unwrap();
        assert_eq!(record.file_type, FileType::Summary);
    }

    #[test]
    fn test_topic_tag_only_kept_for_topic_rows() {
        let request = UpsertFileRequest {
            file_type: Some("topic".into()),
            topic: Some("economy".into()),
            file_id: None,
            path: None,
            ..base_request()
        };
        assert_eq!(
            validate_upsert(request).unwrap().topic.as_deref(),
            Some("economy")
        );

        let request = UpsertFileRequest {
            topic: Some("economy".into()),
            ..base_request()
        };
        assert_eq!(validate_upsert(request).unwrap().topic, None);
    }

    #[test]
    fn test_missing_required_fields_rejected() {
        let request = UpsertFileRequest {
            url: None,
            ..base_request()
        };
        assert!(validate_upsert(request).is_err());

        let request = UpsertFileRequest {
            date: None,
            ..base_request()
        };
        assert!(validate_upsert(request).is_err());
    }

    #[test]
    fn test_parse_list_rejects_unknown_values() {
        let parsed: Result<Vec<FileType>> =
            parse_list(Some(vec!["original".into(), "summary".into()]));
        assert_eq!(parsed.unwrap().len(), 2);

        let parsed: Result<Vec<FileType>> = parse_list(Some(vec!["posters".into()]));
        assert!(parsed.is_err());
    }
}
