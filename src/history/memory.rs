use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{ ConversationStore, StoreError };
use crate::models::chat::{ Conversation, Message };

/// Process-lifetime conversation map. Nothing is evicted and nothing survives
/// a restart.
#[derive(Default)]
pub struct MemoryConversationStore {
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn create_conversation(&self) -> Conversation {
        let conversation = Conversation::new();
        self.conversations
            .write().await
            .insert(conversation.id.clone(), conversation.clone());
        conversation
    }

    async fn get_conversation(&self, conversation_id: &str) -> Option<Conversation> {
        self.conversations.read().await.get(conversation_id).cloned()
    }

    async fn add_message(&self, conversation_id: &str, message: Message) -> Result<(), StoreError> {
        let mut conversations = self.conversations.write().await;
        let conversation = conversations
            .get_mut(conversation_id)
            .ok_or_else(|| StoreError::ConversationNotFound(conversation_id.to_string()))?;
        conversation.messages.push(message);
        Ok(())
    }
}
