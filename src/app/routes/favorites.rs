use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::app::state::AppState;
use crate::domain::filter::Filter;
use crate::domain::model::Favorite;
use crate::utils::error::{AppError, Result};

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

impl UserQuery {
    pub fn require(&self) -> Result<&str> {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::validation("Missing userId"))
    }
}

pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    Json(mut favorite): Json<Favorite>,
) -> Result<impl IntoResponse> {
    if favorite.user_id.trim().is_empty() {
        return Err(AppError::validation("Missing userId"));
    }
    if favorite.price.is_some_and(|p| !p.is_finite() || p < 0.0) {
        return Err(AppError::validation("price cannot be negative"));
    }

    favorite.created_at = Utc::now();
    let id = state.favorites().insert(&favorite).await?;
    tracing::info!("⭐ User {} saved favorite {}", favorite.user_id, id);

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse> {
    let user_id = query.require()?;
    let favorites = state
        .favorites()
        .find_many(&Filter::new().eq("userId", user_id))
        .await?;
    Ok(Json(json!({ "favorites": favorites })))
}

pub async fn delete_favorite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.favorites().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
