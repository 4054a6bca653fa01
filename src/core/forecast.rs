use crate::core::forecast_model::ForecastModel;
use crate::domain::forecast::{
    Forecast, ForecastPoint, RecordForecast, ReferencePrice, ReferenceRecord,
};
use std::sync::Arc;

pub const DEFAULT_CURRENT_YEAR: i32 = 2025;
pub const DEFAULT_HORIZON: u32 = 5;

/// Rescales the model's per-year predictions to a concrete reference price.
///
/// Each projected year `y` in `current_year + 1 ..= current_year + horizon`
/// that the model knows about yields
/// `price * forecast[y] / baseline` (and likewise for `lower`/`upper`),
/// rounded to cents. Years missing from the model are skipped.
#[derive(Debug, Clone)]
pub struct ForecastScaler {
    model: Arc<ForecastModel>,
    current_year: i32,
    horizon: u32,
}

impl ForecastScaler {
    pub fn new(model: Arc<ForecastModel>, current_year: i32, horizon: u32) -> Self {
        Self {
            model,
            current_year,
            horizon,
        }
    }

    pub fn model(&self) -> &ForecastModel {
        &self.model
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    /// Forecast for an explicitly supplied price. Unusable prices (absent,
    /// zero, negative) produce no points but still report the confidence.
    pub fn project(&self, price: ReferencePrice) -> Forecast {
        Forecast {
            forecast: price.usable().map(|p| self.points(p)).unwrap_or_default(),
            confidence: self.model.confidence_label(),
        }
    }

    /// Forecast for a stored record, or `None` when it has no usable price.
    pub fn project_reference(&self, record: &ReferenceRecord) -> Option<RecordForecast> {
        let price = record.price.usable()?;
        Some(RecordForecast {
            home: record.summary.clone(),
            forecast: self.points(price),
            confidence: self.model.confidence_label(),
        })
    }

    pub fn project_batch(&self, records: &[ReferenceRecord]) -> Vec<RecordForecast> {
        let forecasts: Vec<RecordForecast> = records
            .iter()
            .filter_map(|record| self.project_reference(record))
            .collect();

        tracing::debug!(
            "Projected {} of {} records (skipped {} without a price)",
            forecasts.len(),
            records.len(),
            records.len() - forecasts.len()
        );
        forecasts
    }

    fn points(&self, price: f64) -> Vec<ForecastPoint> {
        let baseline = self.model.baseline_value();

        // 以 i64 計算視窗，極端年份或 horizon 不會溢位
        let first = i64::from(self.current_year) + 1;
        let last = i64::from(self.current_year) + i64::from(self.horizon);

        self.model
            .years()
            .filter(|year| (first..=last).contains(&i64::from(*year)))
            .filter_map(|year| {
                let band = self.model.band(year)?;
                Some(ForecastPoint {
                    year,
                    projected_price: round_cents(price * (band.forecast / baseline)),
                    min_price: round_cents(price * (band.lower / baseline)),
                    max_price: round_cents(price * (band.upper / baseline)),
                })
            })
            .collect()
    }
}

/// Rounds half away from zero to two decimals.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
