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
use crate::domain::filter::Filter;
use crate::domain::model::{Listing, ID_FIELD};
use crate::utils::error::{AppError, Result};

const SEARCHABLE_FIELDS: [&str; 5] = ["title", "description", "city", "address", ID_FIELD];

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
}

impl SearchQuery {
    fn filter(&self) -> Filter {
        let mut filter = Filter::new()
            .text(&SEARCHABLE_FIELDS, self.q.as_deref().unwrap_or_default())
            .text(&["city"], self.city.as_deref().unwrap_or_default())
            .range("price", self.min_price, self.max_price);
        if let Some(property_type) = self.property_type.as_deref().filter(|t| !t.is_empty()) {
            filter = filter.eq("propertyType", property_type);
        }
        filter
    }
}

pub async fn create_listing(
    State(state): State<Arc<AppState>>,
    Json(mut listing): Json<Listing>,
) -> Result<impl IntoResponse> {
    if listing.title.trim().is_empty() {
        return Err(AppError::validation("Missing title"));
    }
    if listing.price.is_some_and(|p| !p.is_finite() || p < 0.0) {
        return Err(AppError::validation("price cannot be negative"));
    }

    listing.id = state.listings().insert(&listing).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

pub async fn get_listing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Listing>> {
    Ok(Json(state.listings().get(&id).await?))
}

pub async fn delete_listing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.listings().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Listings matching the query, cheapest first; unpriced listings last.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
        if min > max {
            return Err(AppError::validation("min_price is greater than max_price"));
        }
    }

    let mut results = state.listings().find_many(&query.filter()).await?;
    results.sort_by(|a, b| match (a.price, b.price) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    tracing::debug!("Search {:?} matched {} listings", query.q, results.len());
    Ok(Json(json!({ "results": results })))
}
