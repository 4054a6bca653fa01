pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use app::state::AppState;
pub use config::AppConfig;
pub use core::{forecast::ForecastScaler, forecast_model::ForecastModel};
pub use utils::error::{AppError, Result};
