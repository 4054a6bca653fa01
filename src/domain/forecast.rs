use serde::{Deserialize, Serialize};

use crate::domain::model::Favorite;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ForecastPoint {
    pub year: i32,
    #[serde(rename = "projectedPrice")]
    pub projected_price: f64,
    #[serde(rename = "minPrice")]
    pub min_price: f64,
    #[serde(rename = "maxPrice")]
    pub max_price: f64,
}

/// Points for consecutive future years plus the model confidence, e.g. `"95%"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Forecast {
    pub forecast: Vec<ForecastPoint>,
    pub confidence: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReferencePrice {
    Priced(f64),
    Unpriced,
}

impl ReferencePrice {
    /// Zero, negative and non-finite prices cannot anchor a forecast.
    pub fn usable(self) -> Option<f64> {
        match self {
            ReferencePrice::Priced(price) if price.is_finite() && price > 0.0 => Some(price),
            _ => None,
        }
    }
}

impl From<Option<f64>> for ReferencePrice {
    fn from(price: Option<f64>) -> Self {
        price.map_or(ReferencePrice::Unpriced, ReferencePrice::Priced)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RecordSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: Option<String>,
    pub city: Option<String>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f32>,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRecord {
    pub summary: RecordSummary,
    pub price: ReferencePrice,
}

impl From<&Favorite> for ReferenceRecord {
    fn from(favorite: &Favorite) -> Self {
        Self {
            summary: RecordSummary {
                id: favorite.id.clone(),
                title: favorite.title.clone(),
                city: favorite.city.clone(),
                bedrooms: favorite.bedrooms,
                bathrooms: favorite.bathrooms,
                price: favorite.price,
            },
            price: favorite.price.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordForecast {
    pub home: RecordSummary,
    pub forecast: Vec<ForecastPoint>,
    pub confidence: String,
}
