mod memory;

use async_trait::async_trait;
use log::info;
use std::sync::Arc;
use thiserror::Error;

use crate::cli::Args;
use crate::models::chat::{ Conversation, Message };

pub use memory::MemoryConversationStore;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("conversation not found: {0}")]
    ConversationNotFound(String),
}

#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn create_conversation(&self) -> Conversation;

    async fn get_conversation(&self, conversation_id: &str) -> Option<Conversation>;

    /// Appends to an existing conversation. Unknown ids are an error rather
    /// than a silent no-op.
    async fn add_message(&self, conversation_id: &str, message: Message) -> Result<(), StoreError>;
}

pub fn create_history_store(
    args: &Args
) -> Result<Arc<dyn ConversationStore>, Box<dyn std::error::Error + Send + Sync>> {
    match args.history_type.to_lowercase().as_str() {
        "memory" => Ok(Arc::new(MemoryConversationStore::new())),
        _ =>
            Err(
                Box::new(
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("Unsupported history store type: {}", args.history_type)
                    )
                )
            ),
    }
}

pub fn initialize_history_store(
    args: &Args
) -> Result<Arc<dyn ConversationStore>, Box<dyn std::error::Error + Send + Sync>> {
    info!("Conversations will be kept in: {}", args.history_type);
    create_history_store(args)
}
