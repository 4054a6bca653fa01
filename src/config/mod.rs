pub mod toml_config;

pub use toml_config::AppConfig;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "realty-hub")]
#[command(about = "Real-estate backend with listings, favorites, tasks and price forecasts")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "realty-hub.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Override server.port from config
    #[arg(long)]
    pub port: Option<u16>,

    /// Override forecast.model_path from config
    #[arg(long)]
    pub model: Option<String>,

    /// Emit JSON logs regardless of logging.format
    #[arg(long)]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliArgs {
    /// Loads the config file (defaults when it does not exist) and applies
    /// command-line overrides.
    pub fn load_config(&self) -> crate::Result<AppConfig> {
        let mut config = if std::path::Path::new(&self.config).exists() {
            AppConfig::from_file(&self.config)?
        } else {
            AppConfig::default()
        };

        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(model) = &self.model {
            config.forecast.model_path = model.clone();
        }
        if self.json_logs {
            config.logging.format = "json".to_string();
        }
        Ok(config)
    }
}
