use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::app::state::AppState;
use crate::domain::filter::Filter;
use crate::domain::model::User;
use crate::utils::error::{AppError, Result};

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUser>,
) -> Result<impl IntoResponse> {
    let name = payload.name.trim();
    let email = payload.email.trim().to_lowercase();
    if name.is_empty() {
        return Err(AppError::validation("Missing name"));
    }
    if !email.contains('@') {
        return Err(AppError::validation("Invalid email"));
    }

    let mut user = User {
        id: String::new(),
        name: name.to_string(),
        email,
        created_at: Utc::now(),
    };
    let unique = Filter::new().eq("email", user.email.as_str());
    user.id = state
        .users()
        .insert_unique(&unique, &user)
        .await?
        .ok_or_else(|| AppError::ConflictError {
            message: format!("Email {} is already registered", user.email),
        })?;
    tracing::info!("👤 Registered user {}", user.id);

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    let users = state.users().find_many(&Filter::new()).await?;
    Ok(Json(json!({ "users": users })))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    Ok(Json(state.users().get(&id).await?))
}
