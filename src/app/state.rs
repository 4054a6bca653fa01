use std::sync::Arc;

use crate::adapters::{DisabledChat, JsonFileStore, MemoryStore, OpenAiChatClient, OpenAiSettings};
use crate::config::toml_config::{AppConfig, StorageBackend};
use crate::core::assistant::Assistant;
use crate::core::forecast::ForecastScaler;
use crate::core::forecast_model::ForecastModel;
use crate::core::repository::Repository;
use crate::domain::model::{
    Favorite, Listing, RecentlyViewed, Task, User, FAVORITES, LISTINGS, RECENTLY_VIEWED, TASKS,
    USERS,
};
use crate::domain::ports::{ChatModel, DocumentStore};
use crate::utils::error::Result;

pub struct AppState {
    pub config: AppConfig,
    pub scaler: ForecastScaler,
    pub assistant: Assistant,
    store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        model: Arc<ForecastModel>,
        store: Arc<dyn DocumentStore>,
        chat: Arc<dyn ChatModel>,
    ) -> Arc<Self> {
        let scaler = ForecastScaler::new(model, config.forecast.current_year, config.forecast.horizon);

        Arc::new(Self {
            config,
            scaler,
            assistant: Assistant::new(chat),
            store,
        })
    }

    /// Builds every collaborator from configuration. A missing or invalid
    /// forecast model is an error: the service must not start without it.
    pub async fn from_config(config: AppConfig) -> Result<Arc<Self>> {
        tracing::info!("📈 Loading forecast model from {}", config.forecast.model_path);
        let model = ForecastModel::from_file(&config.forecast.model_path, config.forecast.baseline)?;
        tracing::info!(
            "✅ Forecast model loaded: {} years, baseline {}, confidence {}",
            model.len(),
            model.baseline_year(),
            model.confidence_label()
        );

        let store: Arc<dyn DocumentStore> = match config.storage.backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage, data will not survive a restart");
                Arc::new(MemoryStore::new())
            }
            StorageBackend::Json => Arc::new(JsonFileStore::open(&config.storage.data_dir).await?),
        };

        let chat: Arc<dyn ChatModel> = match config.llm.usable_api_key() {
            Some(api_key) => {
                tracing::info!("🤖 Language model: {} at {}", config.llm.model, config.llm.endpoint);
                Arc::new(OpenAiChatClient::new(OpenAiSettings {
                    endpoint: config.llm.endpoint.clone(),
                    api_key: api_key.to_string(),
                    model: config.llm.model.clone(),
                    temperature: config.llm.temperature,
                    timeout: config.llm.timeout(),
                })?)
            }
            None => {
                tracing::warn!("No language model configured, chat and task generation are disabled");
                Arc::new(DisabledChat)
            }
        };

        Ok(Self::new(config, Arc::new(model), store, chat))
    }

    pub fn users(&self) -> Repository<User> {
        Repository::new(self.store.clone(), USERS, "user")
    }

    pub fn listings(&self) -> Repository<Listing> {
        Repository::new(self.store.clone(), LISTINGS, "listing")
    }

    pub fn favorites(&self) -> Repository<Favorite> {
        Repository::new(self.store.clone(), FAVORITES, "favorite")
    }

    pub fn tasks(&self) -> Repository<Task> {
        Repository::new(self.store.clone(), TASKS, "task")
    }

    pub fn recently_viewed(&self) -> Repository<RecentlyViewed> {
        Repository::new(self.store.clone(), RECENTLY_VIEWED, "recently viewed home")
    }
}
