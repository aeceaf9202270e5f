use crate::cli::Args;
use crate::config::prompt::{ self, PersonaPrompt };
use crate::llm::chat::{ ChatClient, ChatTurn, TurnRole, new_client as new_chat_client };
use crate::llm::error::UpstreamError;
use crate::models::chat::Message;

use log::{ info, error };
use std::error::Error;
use std::sync::Arc;

/// Speaks as the configured persona: wraps the completion client with the
/// fixed instruction block.
#[derive(Clone)]
pub struct PersonaAgent {
    chat_client: Arc<dyn ChatClient>,
    persona: PersonaPrompt,
}

impl PersonaAgent {
    pub fn new(chat_client: Arc<dyn ChatClient>, persona: PersonaPrompt) -> Self {
        Self { chat_client, persona }
    }

    pub fn from_args(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let chat_config = args.llm_config();
        let chat_client = new_chat_client(&chat_config)?;
        info!(
            "Chat client configured: Model={}, BaseURL={}",
            chat_client.get_model(),
            chat_client.get_base_url().as_deref().unwrap_or("adapter default")
        );
        let persona = prompt::load_persona(args.persona_path.as_deref())?;
        Ok(Self::new(chat_client, persona))
    }

    pub fn persona(&self) -> &PersonaPrompt {
        &self.persona
    }

    /// System block first, then the prior turns in order, then the new user turn.
    pub fn build_prompt(&self, user_message: &str, history: &[Message]) -> Vec<ChatTurn> {
        let mut turns = Vec::with_capacity(history.len() + 2);
        turns.push(ChatTurn::new(TurnRole::System, self.persona.text()));
        turns.extend(
            history.iter().map(|msg| ChatTurn::new(TurnRole::from(msg.role), msg.content.as_str()))
        );
        turns.push(ChatTurn::new(TurnRole::User, user_message));
        turns
    }

    pub async fn generate_reply(
        &self,
        user_message: &str,
        history: &[Message]
    ) -> Result<String, UpstreamError> {
        let turns = self.build_prompt(user_message, history);
        match self.chat_client.complete(&turns).await {
            Ok(resp) => Ok(resp.response),
            Err(e) => {
                error!("Completion API error: {}", e);
                Err(e)
            }
        }
    }
}
