use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use realty_hub::core::forecast::{DEFAULT_CURRENT_YEAR, DEFAULT_HORIZON};
use realty_hub::core::forecast_model::BaselineRule;
use realty_hub::domain::forecast::ReferencePrice;
use realty_hub::config::toml_config::ForecastConfig;
use realty_hub::utils::logger;
use realty_hub::{ForecastModel, ForecastScaler};

#[derive(Parser)]
#[command(name = "forecast")]
#[command(about = "Inspect a forecast model artifact and project prices with it")]
struct Args {
    /// Path to the model artifact (JSON)
    #[arg(short, long, default_value = "./model/forecast.json")]
    model: String,

    /// Reference prices to project
    prices: Vec<f64>,

    #[arg(long, default_value_t = DEFAULT_CURRENT_YEAR)]
    current_year: i32,

    #[arg(long, default_value_t = DEFAULT_HORIZON)]
    horizon: u32,

    /// Baseline year rule: earliest_year or first_listed
    #[arg(long, default_value = "earliest_year", value_parser = parse_baseline)]
    baseline: BaselineRule,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Only check that the artifact loads
    #[arg(long)]
    validate_only: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_baseline(raw: &str) -> Result<BaselineRule, String> {
    serde_json::from_value(serde_json::Value::String(raw.replace('-', "_")))
        .map_err(|_| format!("unknown baseline rule '{}'", raw))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let model = ForecastModel::from_file(&args.model, args.baseline)
        .with_context(|| format!("loading forecast model {}", args.model))?;

    if args.validate_only {
        let years: Vec<i32> = model.years().collect();
        println!(
            "✅ {} is valid: {} years ({}..={}), baseline {} = {}, confidence {}",
            args.model,
            model.len(),
            years.first().copied().unwrap_or_default(),
            years.last().copied().unwrap_or_default(),
            model.baseline_year(),
            model.baseline_value(),
            model.confidence_label()
        );
        return Ok(());
    }

    if args.prices.is_empty() {
        bail!("no prices given; pass one or more reference prices or --validate-only");
    }

    ForecastConfig::validate_window(args.current_year, args.horizon)?;

    let scaler = ForecastScaler::new(Arc::new(model), args.current_year, args.horizon);

    for price in &args.prices {
        let forecast = scaler.project(ReferencePrice::Priced(*price));

        if args.json {
            println!("{}", serde_json::to_string(&forecast)?);
            continue;
        }

        println!("Reference price {:.2} (confidence {})", price, forecast.confidence);
        if forecast.forecast.is_empty() {
            println!("  no forecast years within the horizon");
        }
        for point in &forecast.forecast {
            println!(
                "  {}  {:>14.2}  [{:.2} .. {:.2}]",
                point.year, point.projected_price, point.min_price, point.max_price
            );
        }
    }

    Ok(())
}
