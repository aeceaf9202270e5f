pub mod agent;
pub mod models;
pub mod server;
pub mod config;
pub mod llm;
pub mod cli;
pub mod history;

use agent::PersonaAgent;
use cli::Args;
use history::initialize_history_store;
use log::info;
use server::api::AppState;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat Model: {}", args.chat_model);
    info!("Chat Base URL: {}", args.chat_base_url);
    info!("Max Tokens: {}", args.max_tokens);
    info!("Persona Path: {}", args.persona_path.as_deref().unwrap_or("built-in"));
    info!("History Store Type: {}", args.history_type);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let agent = Arc::new(PersonaAgent::from_args(&args)?);
    info!("Persona Source: {}", agent.persona().source());
    let store = initialize_history_store(&args)?;
    let state = AppState::new(agent, store);

    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, state, args);
    server.run().await?;

    Ok(())
}
