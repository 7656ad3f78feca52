//! Request handling for the chat session.
//!
//! The handler owns the session behind an async mutex. A chat turn holds the
//! lock from the user append through the remote call to the assistant append,
//! so concurrent requests are applied one at a time.

use log::{debug, error, info, warn};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{GatewayError, Result};
use crate::session::{Message, Role, Session};
use crate::web::models::{ChatRequest, GatewayResponse, ServiceInfo};

pub struct GatewayHandler {
    session: Mutex<Session>,
    info: ServiceInfo,
}

enum Outcome {
    Chat { reply: String, length: usize },
    Reset,
}

impl GatewayHandler {
    pub fn new(session: Session) -> Self {
        let sampling = session.sampling();
        info!(
            "Session ready (temperature: {}, max_tokens: {})",
            sampling.temperature, sampling.max_tokens
        );
        debug!("System prompt: {}", session.system_prompt());

        let info = ServiceInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
            deployment_date: option_env!("DEPLOYMENT_DATE").map(str::to_string),
            endpoint: session.endpoint().to_string(),
            model: session.model_id().to_string(),
        };
        Self {
            session: Mutex::new(session),
            info,
        }
    }

    /// Handles an undecoded request body. Never fails: every error becomes an
    /// error response.
    pub async fn handle_raw(&self, raw: &[u8]) -> GatewayResponse {
        match ChatRequest::from_slice(raw) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                warn!("Rejected malformed request: {}", e);
                GatewayResponse::error(&e)
            }
        }
    }

    pub async fn handle(&self, request: ChatRequest) -> GatewayResponse {
        let request_id = Uuid::new_v4();
        match self.process(request_id, request).await {
            Ok(Outcome::Chat { reply, length }) => GatewayResponse::chat(reply, length),
            Ok(Outcome::Reset) => GatewayResponse::reset(),
            Err(e) => {
                error!("[{}] Error processing request: {}", request_id, e);
                GatewayResponse::error(&e)
            }
        }
    }

    async fn process(&self, request_id: Uuid, request: ChatRequest) -> Result<Outcome> {
        let message = request.message.unwrap_or_default();
        if message.is_empty() && !request.reset {
            return Err(GatewayError::Validation("No message provided".to_string()));
        }

        let mut session = self.session.lock().await;

        if request.reset {
            session.reset();
            info!("[{}] Conversation reset", request_id);
            return Ok(Outcome::Reset);
        }

        info!(
            "[{}] Chat request ({} characters, history length {})",
            request_id,
            message.len(),
            session.len()
        );
        session.append(Role::User, message);

        // On failure the user turn stays in history without an assistant reply.
        let context = session.context();
        let reply = session.call_remote_model(&context).await?;

        session.append(Role::Assistant, reply.clone());
        debug!("[{}] History length now {}", request_id, session.len());

        Ok(Outcome::Chat {
            reply,
            length: session.len(),
        })
    }

    /// Snapshot of the conversation. Takes the session lock, so it waits for
    /// any chat turn in flight, including its remote call, to finish.
    pub async fn history(&self) -> Vec<Message> {
        self.session.lock().await.history().to_vec()
    }

    pub fn info(&self) -> &ServiceInfo {
        &self.info
    }
}
