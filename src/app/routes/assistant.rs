use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::app::state::AppState;
use crate::core::mortgage;
use crate::utils::error::Result;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>> {
    let reply = state.assistant.reply(&request.message).await?;
    Ok(Json(ChatReply { reply }))
}

#[derive(Debug, Deserialize)]
pub struct MortgageRequest {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub years: f64,
}

#[derive(Debug, Serialize)]
pub struct MortgageReply {
    pub monthly_payment: f64,
}

pub async fn mortgage(Json(request): Json<MortgageRequest>) -> Result<Json<MortgageReply>> {
    let monthly_payment =
        mortgage::monthly_payment(request.principal, request.annual_rate_percent, request.years)?;
    Ok(Json(MortgageReply { monthly_payment }))
}
