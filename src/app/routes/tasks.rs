use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::app::state::AppState;
use crate::core::assistant::TaskRequest;
use crate::domain::filter::Filter;
use crate::utils::error::{AppError, Result};

#[derive(Debug, Deserialize)]
pub struct TaskQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}

pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TaskQuery>,
) -> Result<impl IntoResponse> {
    let user_id = query
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::validation("Missing user_id"))?;

    let mut tasks = state
        .tasks()
        .find_many(&Filter::new().eq("user_id", user_id))
        .await?;
    tasks.sort_by(|a, b| a.due_date.cmp(&b.due_date));

    Ok(Json(json!({ "tasks": tasks })))
}

/// Generates a fresh task list, replacing the user's previous one.
pub async fn generate_tasks(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TaskRequest>,
) -> Result<impl IntoResponse> {
    let mut tasks = state.assistant.generate_tasks(&request).await?;

    let repository = state.tasks();
    let owner = Filter::new().eq("user_id", request.user_id.as_str());
    let previous = repository.find_many(&owner).await?;

    // 新清單全部寫入後才移除舊清單；失敗時撤回已寫入的部分
    let mut inserted: Vec<String> = Vec::with_capacity(tasks.len());
    for task in &mut tasks {
        match repository.insert(task).await {
            Ok(id) => {
                task.id = id.clone();
                inserted.push(id);
            }
            Err(e) => {
                for id in &inserted {
                    if let Err(undo) = repository.delete_many(&Filter::by_id(id)).await {
                        tracing::warn!("Failed to roll back task {}: {}", id, undo);
                    }
                }
                return Err(e);
            }
        }
    }

    for old in &previous {
        repository.delete_many(&Filter::by_id(&old.id)).await?;
    }
    if !previous.is_empty() {
        tracing::debug!("Replaced {} previous tasks for {}", previous.len(), request.user_id);
    }

    Ok(Json(json!({ "tasks": tasks })))
}

pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.tasks().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
