// Adapters layer: concrete implementations of the domain ports (storage, language model).

pub mod json_store;
pub mod memory_store;
pub mod openai;

pub use json_store::JsonFileStore;
pub use memory_store::MemoryStore;
pub use openai::{DisabledChat, OpenAiChatClient, OpenAiSettings};
