//! Repository pattern for metadata store operations
//!
//! All reads and writes against the `newspapers`, `files` and `issues`
//! tables go through here. The upsert and conditional-delete statements use
//! raw SQL because SeaORM's query builder does not cover `ON CONFLICT` keyed
//! on a nullable column or `DELETE ... WHERE NOT EXISTS`.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, Statement,
};

/// Input for a file-row upsert.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub date: NaiveDate,
    pub newspaper: String,
    pub file_type: FileType,
    pub topic: Option<String>,
    pub url: String,
    pub file_id: Option<String>,
    pub path: Option<String>,
}

/// Repository for metadata store access
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // File Operations
    // ========================================================================

    /// Insert or overwrite the file row matching (date, newspaper, type, topic).
    ///
    /// Upserting the same key twice leaves exactly one row carrying the
    /// latest url / file_id / path.
    pub async fn upsert_file(&self, record: &NewFileRecord) -> Result<File> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            INSERT INTO files (date, newspaper, type, topic, url, file_id, path)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (date, newspaper, type, topic)
            DO UPDATE SET url = EXCLUDED.url,
                          file_id = EXCLUDED.file_id,
                          path = EXCLUDED.path
            RETURNING id, date, newspaper, type, topic, url, file_id, path, created_at
            "#,
            [
                record.date.into(),
                record.newspaper.clone().into(),
                record.file_type.as_str().into(),
                record.topic.clone().into(),
                record.url.clone().into(),
                record.file_id.clone().into(),
                record.path.clone().into(),
            ],
        );

        FileEntity::find()
            .from_raw_sql(stmt)
            .one(self.conn())
            .await?
            .ok_or_else(|| AppError::Internal {
                message: "File upsert returned no row".into(),
            })
    }

    /// List all file rows for (date, newspaper), ordered by type
    pub async fn list_files(&self, date: NaiveDate, newspaper: &str) -> Result<Vec<File>> {
        FileEntity::find()
            .filter(FileColumn::Date.eq(date))
            .filter(FileColumn::Newspaper.eq(newspaper))
            .order_by_asc(FileColumn::FileType)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Delete a single file row by id
    pub async fn delete_file_by_id(&self, id: i64) -> Result<u64> {
        let result = FileEntity::delete_by_id(id).exec(self.conn()).await?;
        Ok(result.rows_affected)
    }

    /// Delete all file rows for (date, newspaper) across the given type set
    pub async fn delete_files(
        &self,
        date: NaiveDate,
        newspaper: &str,
        types: &[FileType],
    ) -> Result<u64> {
        if types.is_empty() {
            return Ok(0);
        }

        let type_strs: Vec<&str> = types.iter().map(|t| t.as_str()).collect();

        let result = FileEntity::delete_many()
            .filter(FileColumn::Date.eq(date))
            .filter(FileColumn::Newspaper.eq(newspaper))
            .filter(FileColumn::FileType.is_in(type_strs))
            .exec(self.conn())
            .await?;

        Ok(result.rows_affected)
    }

    // ========================================================================
    // Issue Operations
    // ========================================================================

    /// Set exactly one URL field on the issue keyed by (date, newspaper),
    /// creating the row when absent and leaving the other field untouched.
    pub async fn upsert_issue_url(
        &self,
        date: NaiveDate,
        newspaper: &str,
        field: IssueField,
        url: &str,
    ) -> Result<Issue> {
        let col = field.column_name();
        let sql = format!(
            r#"
            INSERT INTO issues (date, newspaper, {col})
            VALUES ($1, $2, $3)
            ON CONFLICT (date, newspaper)
            DO UPDATE SET {col} = EXCLUDED.{col}
            RETURNING date, newspaper, original_url, summary_url, created_at
            "#
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            &sql,
            [date.into(), newspaper.into(), url.into()],
        );

        IssueEntity::find()
            .from_raw_sql(stmt)
            .one(self.conn())
            .await?
            .ok_or_else(|| AppError::Internal {
                message: "Issue upsert returned no row".into(),
            })
    }

    /// Null out the named URL fields on the issue; fields not named stay as
    /// they are. Returns the number of updated rows (0 when no issue exists).
    pub async fn null_issue_fields(
        &self,
        date: NaiveDate,
        newspaper: &str,
        fields: &[IssueField],
    ) -> Result<u64> {
        if fields.is_empty() {
            return Ok(0);
        }

        let set_clauses: Vec<String> = fields
            .iter()
            .map(|f| format!("{} = NULL", f.column_name()))
            .collect();
        let sql = format!(
            "UPDATE issues SET {} WHERE date = $1 AND newspaper = $2",
            set_clauses.join(", ")
        );

        let stmt =
            Statement::from_sql_and_values(DbBackend::Postgres, &sql, [date.into(), newspaper.into()]);

        let result = self.conn().execute(stmt).await?;
        Ok(result.rows_affected())
    }

    /// Read view: issues for a date, ordered by newspaper
    pub async fn list_issues(&self, date: NaiveDate) -> Result<Vec<Issue>> {
        IssueEntity::find()
            .filter(IssueColumn::Date.eq(date))
            .order_by_asc(IssueColumn::Newspaper)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Read view: distinct topic tags for a date, ordered
    pub async fn list_topics(&self, date: NaiveDate) -> Result<Vec<String>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT DISTINCT topic FROM files
            WHERE date = $1 AND type = 'topic' AND topic IS NOT NULL
            ORDER BY topic
            "#,
            [date.into()],
        );

        let rows = self.conn().query_all(stmt).await?;
        let mut topics = Vec::with_capacity(rows.len());
        for row in rows {
            topics.push(row.try_get_by_index::<String>(0)?);
        }
        Ok(topics)
    }

    /// Read view: topic PDFs for (date, topic), ordered by newspaper
    pub async fn list_topic_pdfs(&self, date: NaiveDate, topic: &str) -> Result<Vec<File>> {
        FileEntity::find()
            .filter(FileColumn::Date.eq(date))
            .filter(FileColumn::FileType.eq(FileType::Topic.as_str()))
            .filter(FileColumn::Topic.eq(topic))
            .order_by_asc(FileColumn::Newspaper)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Newspaper Operations
    // ========================================================================

    /// List all newspapers, ordered by display name
    pub async fn list_newspapers(&self) -> Result<Vec<Newspaper>> {
        NewspaperEntity::find()
            .order_by_asc(NewspaperColumn::DisplayName)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Create a newspaper; the slug is normalized before insert
    pub async fn create_newspaper(&self, slug: &str, display_name: &str) -> Result<Newspaper> {
        let normalized = normalize_slug(slug);

        let newspaper = NewspaperActiveModel {
            slug: Set(normalized.clone()),
            display_name: Set(display_name.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        newspaper.insert(self.conn()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Duplicate {
                    message: format!("Newspaper with slug '{}' already exists", normalized),
                }
            } else {
                e.into()
            }
        })
    }

    /// Delete a newspaper unless file rows still reference its slug.
    ///
    /// A single conditional statement, so the dependency check and the delete
    /// cannot race. Returns the deleted rows; deleting an unknown slug is not
    /// an error and returns an empty vec.
    pub async fn delete_newspaper(&self, slug: &str) -> Result<Vec<Newspaper>> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            DELETE FROM newspapers
            WHERE slug = $1
              AND NOT EXISTS (SELECT 1 FROM files WHERE files.newspaper = $1)
            RETURNING slug, display_name, created_at
            "#,
            [slug.into()],
        );

        let deleted = NewspaperEntity::find()
            .from_raw_sql(stmt)
            .all(self.conn())
            .await?;

        if deleted.is_empty() {
            let dependents = FileEntity::find()
                .filter(FileColumn::Newspaper.eq(slug))
                .count(self.conn())
                .await?;

            if dependents > 0 {
                return Err(AppError::Conflict {
                    message: "Cannot delete newspaper: it has associated files".into(),
                });
            }
        }

        Ok(deleted)
    }
}

/// Normalize a newspaper slug: lowercase, whitespace runs become hyphens.
pub fn normalize_slug(input: &str) -> String {
    input
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_slug() {
        assert_eq!(normalize_slug("New Times"), "new-times");
        assert_eq!(normalize_slug("new-times"), "new-times");
        assert_eq!(normalize_slug("  The   Daily  Post "), "the-daily-post");
        assert_eq!(normalize_slug("INDIAN EXPRESS"), "indian-express");
    }
}
