//! Newspaper management handlers

use super::{ok, require, Envelope};
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use pressroom_common::db::models::Newspaper;
use pressroom_common::db::Repository;
use pressroom_common::errors::{AppError, Result};
use serde::Deserialize;
use validator::Validate;

/// List all newspapers, ordered by display name
pub async fn list(State(state): State<AppState>) -> Result<Json<Envelope<Vec<Newspaper>>>> {
    let repo = Repository::new(state.db.clone());
    Ok(ok(repo.list_newspapers().await?))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateNewspaperRequest {
    #[validate(length(min = 1, max = 100))]
    pub slug: Option<String>,

    #[validate(length(min = 1, max = 200))]
    pub display_name: Option<String>,
}

/// Create a newspaper; the slug is normalized (lowercase, hyphenated)
/// before insert and duplicates answer 409.
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateNewspaperRequest>,
) -> Result<(StatusCode, Json<Envelope<Newspaper>>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let slug = require(request.slug, "slug")?;
    let display_name = require(request.display_name, "display_name")?;

    let repo = Repository::new(state.db.clone());
    let newspaper = repo.create_newspaper(&slug, &display_name).await?;

    tracing::info!(slug = %newspaper.slug, "Newspaper created");

    Ok((StatusCode::CREATED, ok(newspaper)))
}

#[derive(Debug, Deserialize)]
pub struct DeleteNewspaperRequest {
    pub slug: Option<String>,
}

/// Delete a newspaper; answers 409 while file rows still reference the slug
pub async fn remove(
    State(state): State<AppState>,
    Json(request): Json<DeleteNewspaperRequest>,
) -> Result<Json<Envelope<Vec<Newspaper>>>> {
    let slug = require(request.slug, "slug")?;

    let repo = Repository::new(state.db.clone());
    let deleted = repo.delete_newspaper(&slug).await?;

    if !deleted.is_empty() {
        tracing::info!(slug = %slug, "Newspaper deleted");
    }

    Ok(ok(deleted))
}
