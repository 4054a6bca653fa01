//! Loading and validation of the offline forecast model artifact.
//!
//! The artifact is a JSON object produced by the training job:
//!
//! ```json
//! {
//!   "forecast": { "2026": 200000.0, "2027": 210000.0 },
//!   "lower":    { "2026": 190000.0, "2027": 195000.0 },
//!   "upper":    { "2026": 210000.0, "2027": 225000.0 },
//!   "confidence": 95
//! }
//! ```
//!
//! A model that loads successfully is immutable and safe to share between
//! requests behind an `Arc`.

use crate::utils::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// How the baseline year (the denominator of every scale factor) is chosen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BaselineRule {
    /// Smallest year present in `forecast`.
    #[default]
    EarliestYear,
    /// First key of `forecast` in file order, for artifacts written with the
    /// baseline year first.
    FirstListed,
}

/// Raw artifact as written by the training job. Key order is preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub forecast: Map<String, Value>,
    pub lower: Map<String, Value>,
    pub upper: Map<String, Value>,
    pub confidence: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearBand {
    pub forecast: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastModel {
    years: BTreeMap<i32, YearBand>,
    baseline_year: i32,
    confidence: u8,
}

impl ForecastModel {
    pub fn from_file<P: AsRef<Path>>(path: P, rule: BaselineRule) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::model(format!("cannot read artifact {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content, rule)
    }

    pub fn from_json_str(content: &str, rule: BaselineRule) -> Result<Self> {
        let artifact: ModelArtifact = serde_json::from_str(content)
            .map_err(|e| AppError::model(format!("malformed artifact: {}", e)))?;
        Self::from_artifact(artifact, rule)
    }

    pub fn from_artifact(artifact: ModelArtifact, rule: BaselineRule) -> Result<Self> {
        if artifact.forecast.is_empty() {
            return Err(AppError::model("artifact has no forecast years"));
        }
        if artifact.confidence > 100 {
            return Err(AppError::model(format!(
                "confidence {} is not a percentage",
                artifact.confidence
            )));
        }

        let mut years = BTreeMap::new();
        for (key, value) in &artifact.forecast {
            let year = parse_year(key)?;
            let band = YearBand {
                forecast: number("forecast", key, Some(value))?,
                lower: number("lower", key, artifact.lower.get(key))?,
                upper: number("upper", key, artifact.upper.get(key))?,
            };
            if band.lower > band.forecast || band.forecast > band.upper {
                tracing::warn!(
                    "⚠️ Forecast band for {} is not ordered (lower {}, forecast {}, upper {})",
                    year,
                    band.lower,
                    band.forecast,
                    band.upper
                );
            }
            years.insert(year, band);
        }

        // lower/upper 不可以有 forecast 沒有的年份
        for (name, map) in [("lower", &artifact.lower), ("upper", &artifact.upper)] {
            if let Some(extra) = map.keys().find(|k| !artifact.forecast.contains_key(*k)) {
                return Err(AppError::model(format!(
                    "'{}' has year {} missing from 'forecast'",
                    name, extra
                )));
            }
        }

        let baseline_year = match rule {
            BaselineRule::EarliestYear => years.keys().next().copied(),
            BaselineRule::FirstListed => artifact
                .forecast
                .keys()
                .next()
                .map(|k| parse_year(k))
                .transpose()?,
        }
        .ok_or_else(|| AppError::model("artifact has no forecast years"))?;

        if years[&baseline_year].forecast == 0.0 {
            return Err(AppError::model(format!(
                "baseline year {} has a zero forecast value",
                baseline_year
            )));
        }

        Ok(Self {
            years,
            baseline_year,
            confidence: artifact.confidence as u8,
        })
    }

    pub fn baseline_year(&self) -> i32 {
        self.baseline_year
    }

    pub fn baseline_value(&self) -> f64 {
        self.years[&self.baseline_year].forecast
    }

    pub fn band(&self, year: i32) -> Option<&YearBand> {
        self.years.get(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn confidence(&self) -> u8 {
        self.confidence
    }

    pub fn confidence_label(&self) -> String {
        format!("{}%", self.confidence)
    }
}

fn parse_year(key: &str) -> Result<i32> {
    if key.len() != 4 || !key.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::model(format!(
            "year key '{}' is not a 4-digit year",
            key
        )));
    }
    key.parse()
        .map_err(|_| AppError::model(format!("year key '{}' is not a number", key)))
}

fn number(mapping: &str, year: &str, value: Option<&Value>) -> Result<f64> {
    let value = value.ok_or_else(|| {
        AppError::model(format!("'{}' has no value for year {}", mapping, year))
    })?;
    match value.as_f64() {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(AppError::model(format!(
            "'{}' value for year {} is not a finite number: {}",
            mapping, year, value
        ))),
    }
}
