use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::app::routes::favorites::UserQuery;
use crate::app::state::AppState;
use crate::domain::filter::Filter;
use crate::domain::model::RecentlyViewed;
use crate::utils::error::{AppError, Result};

#[derive(Debug, Deserialize)]
pub struct ViewedPayload {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(rename = "homeId", default)]
    pub home_id: Option<String>,
}

/// Records that a user looked at a home; repeated views refresh `viewedAt`.
pub async fn log_view(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ViewedPayload>,
) -> Result<impl IntoResponse> {
    let (Some(user_id), Some(home_id)) = (
        payload.user_id.filter(|s| !s.trim().is_empty()),
        payload.home_id.filter(|s| !s.trim().is_empty()),
    ) else {
        return Err(AppError::validation("Missing userId or homeId"));
    };

    let pair = Filter::new()
        .eq("userId", user_id.as_str())
        .eq("homeId", home_id.as_str());
    let view = RecentlyViewed {
        id: String::new(),
        user_id,
        home_id,
        viewed_at: Utc::now(),
    };
    state.recently_viewed().upsert(&pair, &view).await?;

    Ok(Json(json!({ "message": "Viewed home logged" })))
}

pub async fn list_views(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse> {
    let user_id = query.require()?;
    let mut views = state
        .recently_viewed()
        .find_many(&Filter::new().eq("userId", user_id))
        .await?;
    views.sort_by(|a, b| b.viewed_at.cmp(&a.viewed_at));

    Ok(Json(json!({ "recentlyViewed": views })))
}
