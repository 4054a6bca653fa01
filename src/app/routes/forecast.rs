use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::app::routes::favorites::UserQuery;
use crate::app::state::AppState;
use crate::domain::filter::Filter;
use crate::domain::forecast::{Forecast, ReferencePrice, ReferenceRecord};
use crate::utils::error::{AppError, Result};

#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    #[serde(default)]
    pub price: Option<f64>,
}

pub async fn forecast_price(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ForecastRequest>,
) -> Result<Json<Forecast>> {
    if request.price.is_some_and(|p| !p.is_finite() || p < 0.0) {
        return Err(AppError::validation("price cannot be negative"));
    }

    Ok(Json(state.scaler.project(ReferencePrice::from(request.price))))
}

/// Forecasts for every saved home of a user; homes without a price are left out.
pub async fn forecast_favorites(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse> {
    let user_id = query.require()?;
    let favorites = state
        .favorites()
        .find_many(&Filter::new().eq("userId", user_id))
        .await?;

    let records: Vec<ReferenceRecord> = favorites.iter().map(ReferenceRecord::from).collect();
    let forecasts = state.scaler.project_batch(&records);

    Ok(Json(json!({ "forecasts": forecasts })))
}
