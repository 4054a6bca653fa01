pub mod assistant;
pub mod favorites;
pub mod forecast;
pub mod listings;
pub mod tasks;
pub mod users;
pub mod viewed;

use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::app::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let model = state.scaler.model();
    Json(json!({
        "status": "ok",
        "model_years": model.len(),
        "baseline_year": model.baseline_year(),
    }))
}
