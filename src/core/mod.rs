pub mod assistant;
pub mod forecast;
pub mod forecast_model;
pub mod mortgage;
pub mod repository;

pub use crate::domain::filter::Filter;
pub use crate::domain::model::Document;
pub use crate::domain::ports::{ChatMessage, ChatModel, DocumentStore};
pub use crate::utils::error::Result;
