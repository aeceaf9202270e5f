use crate::agent::PersonaAgent;
use crate::history::ConversationStore;
use crate::llm::error::UpstreamError;
use crate::models::chat::{ new_conversation_id, ChatResponse, ErrorResponse, Message };
use crate::models::validation::{ parse_chat_request, ValidationErrors };

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{ IntoResponse, Response },
    routing::post,
    Json,
    Router,
};
use log::{ debug, error, info, warn };
use std::any::Any;
use std::sync::Arc;
use thiserror::Error;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{ self, CorsLayer };

pub const INVALID_REQUEST_MESSAGE: &str = "Ungültige Anfrage";
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Ein Fehler ist aufgetreten. Bitte versuchen Sie es später erneut.";

/// Everything a request handler needs, built once at startup and injected.
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<PersonaAgent>,
    pub store: Arc<dyn ConversationStore>,
}

impl AppState {
    pub fn new(agent: Arc<PersonaAgent>, store: Arc<dyn ConversationStore>) -> Self {
        Self { agent, store }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("upstream completion failed: {0}")]
    Upstream(#[from] UpstreamError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(details) =>
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: INVALID_REQUEST_MESSAGE.to_string(),
                        details: Some(details),
                    }),
                ).into_response(),
            // Details stay in the server log; the client only sees the generic text.
            ApiError::Upstream(_) | ApiError::Internal(_) =>
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: GENERIC_FAILURE_MESSAGE.to_string(),
                        details: None,
                    }),
                ).into_response(),
        }
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Chat handler panicked: {}", detail);
    ApiError::Internal(detail).into_response()
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any);

    Router::new()
        .route("/api/chat", post(chat_handler))
        .layer(cors)
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

async fn chat_handler(
    State(state): State<AppState>,
    body: Bytes
) -> Result<Json<ChatResponse>, ApiError> {
    let request = parse_chat_request(&body).map_err(|errors| {
        warn!("Rejected chat request: {}", errors);
        ApiError::from(errors)
    })?;

    let history = request.history.unwrap_or_default();
    debug!(
        "Chat request: conversation={:?}, history_len={}",
        request.conversation_id,
        history.len()
    );

    let content = state.agent.generate_reply(&request.message, &history).await?;

    let message = Message::assistant(content);
    let conversation_id = request.conversation_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(new_conversation_id);
    info!("Reply {} generated for conversation {}", message.id, conversation_id);

    Ok(
        Json(ChatResponse {
            message,
            conversation_id,
        })
    )
}
