//! SeaORM entities for the metadata store

pub mod file;
pub mod issue;
pub mod newspaper;

pub use file::{
    ActiveModel as FileActiveModel, Column as FileColumn, Entity as FileEntity, Model as File,
};
pub use issue::{
    ActiveModel as IssueActiveModel, Column as IssueColumn, Entity as IssueEntity, Model as Issue,
};
pub use newspaper::{
    ActiveModel as NewspaperActiveModel, Column as NewspaperColumn, Entity as NewspaperEntity,
    Model as Newspaper,
};

use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of stored artifact.
///
/// `Topic` rows carry a non-null topic tag; all other kinds leave it null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Original,
    Archive,
    Summary,
    Topic,
}

impl FileType {
    /// Every artifact kind, in the order the deletion flow sweeps them.
    pub const ALL: [FileType; 4] = [
        FileType::Original,
        FileType::Archive,
        FileType::Summary,
        FileType::Topic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Original => "original",
            FileType::Archive => "archive",
            FileType::Summary => "summary",
            FileType::Topic => "topic",
        }
    }

    /// Whether rows of this kind must carry a media-store `file_id` + `path`.
    pub fn requires_media_handle(&self) -> bool {
        matches!(self, FileType::Original | FileType::Archive)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "original" => Ok(FileType::Original),
            "archive" => Ok(FileType::Archive),
            "summary" => Ok(FileType::Summary),
            "topic" => Ok(FileType::Topic),
            other => Err(AppError::Validation {
                message: format!("Unknown file type: {}", other),
                field: Some("type".into()),
            }),
        }
    }
}

/// Denormalized URL fields on the `issues` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueField {
    OriginalUrl,
    SummaryUrl,
}

impl IssueField {
    pub const ALL: [IssueField; 2] = [IssueField::OriginalUrl, IssueField::SummaryUrl];

    pub fn column_name(&self) -> &'static str {
        match self {
            IssueField::OriginalUrl => "original_url",
            IssueField::SummaryUrl => "summary_url",
        }
    }
}

impl FromStr for IssueField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "original_url" => Ok(IssueField::OriginalUrl),
            "summary_url" => Ok(IssueField::SummaryUrl),
            other => Err(AppError::Validation {
                message: format!("Unknown issue field: {}", other),
                field: Some("nullIssues".into()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_round_trip() {
        for ft in FileType::ALL {
            assert_eq!(ft.as_str().parse::<FileType>().unwrap(), ft);
        }
    }

    #[test]
    fn test_media_handle_requirement() {
        assert!(FileType::Original.requires_media_handle());
        assert!(FileType::Archive.requires_media_handle());
        assert!(!FileType::Summary.requires_media_handle());
        assert!(!FileType::Topic.requires_media_handle());
    }

    #[test]
    fn test_unknown_file_type_rejected() {
        assert!("pdf".parse::<FileType>().is_err());
    }
}
