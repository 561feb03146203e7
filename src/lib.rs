//! Debate chat service: the user states a position and a hosted
//! chat-completion provider argues the opposing side.
//!
//! Two entry points share the gateway: the axum route in [`server`] is the
//! stateless proxy surface the browser UI talks to (it receives the full
//! turn sequence on every call), while [`DebateService`] is the embeddable
//! session driver that owns conversation state for hosts without their own
//! store.

pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod server;
pub mod session;
pub mod styles;
pub mod transport;

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::{Config, DeploymentProfile};
use crate::error::Result;
use crate::gateway::CompletionGateway;
use crate::session::Session;
use crate::styles::DebateStyle;
use crate::transport::{HttpTransport, Transport};

/// Drives the single logical debate session against the completion gateway.
///
/// One in-flight request at a time: sending while a reply is awaited is
/// rejected by the session contract. The gateway call is the only
/// suspension point; the session is only mutated once the call has fully
/// resolved, and a reply that arrives after the session was reset or
/// replaced is discarded rather than appended to stale state.
pub struct DebateService {
    gateway: CompletionGateway,
    session: RwLock<Session>,
}

impl DebateService {
    pub fn new(cfg: &Config) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&cfg.provider)?);
        Ok(Self::with_transport(
            transport,
            cfg.provider.model.clone(),
            cfg.provider.profile,
        ))
    }

    pub fn with_transport(
        tx: Arc<dyn Transport>,
        model: String,
        profile: DeploymentProfile,
    ) -> Self {
        Self {
            gateway: CompletionGateway::new(tx, model, profile),
            session: RwLock::new(Session::empty()),
        }
    }

    pub async fn snapshot(&self) -> Session {
        self.session.read().await.clone()
    }

    /// Start a debate on `topic` with the given style and fetch the opening
    /// counter-argument.
    pub async fn start_debate(&self, topic: &str, style: DebateStyle) -> Result<Session> {
        let started = Session::start(topic, style)?;
        let previous = {
            let mut guard = self.session.write().await;
            let previous = guard.clone();
            *guard = started.clone();
            previous
        };
        self.await_reply(started, previous).await
    }

    /// Append a user turn and fetch the model's reply. Rejected while a
    /// prior reply is still pending.
    pub async fn send_message(&self, text: &str) -> Result<Session> {
        let (pending, previous) = {
            let mut guard = self.session.write().await;
            let previous = guard.clone();
            let next = guard.append_user_turn(text)?;
            *guard = next.clone();
            (next, previous)
        };
        self.await_reply(pending, previous).await
    }

    async fn await_reply(&self, pending: Session, previous: Session) -> Result<Session> {
        let style = pending.style.unwrap_or_default();
        let result = self.gateway.complete(&pending.turns, style).await;

        let mut guard = self.session.write().await;
        if guard.id != pending.id {
            // The session was reset or replaced while the call was in
            // flight; the late reply must not touch the current state.
            tracing::warn!("discarding completion for a stale session");
            return Ok(guard.clone());
        }
        match result {
            Ok(reply) => {
                let updated = guard.append_assistant_turn(&reply.content)?;
                *guard = updated.clone();
                Ok(updated)
            }
            Err(e) => {
                // Last-good state: the user turn sent for the failed call
                // is rolled back, never a placeholder assistant turn.
                *guard = previous;
                Err(e)
            }
        }
    }

    /// Discard the session. Does not abort a network call already underway;
    /// a reply arriving afterwards is detected and dropped.
    pub async fn reset(&self) -> Session {
        let mut guard = self.session.write().await;
        *guard = Session::reset();
        guard.clone()
    }
}
