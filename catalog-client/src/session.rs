//! Session events
//!
//! A 401 from any endpoint means the session is gone. Instead of redirecting
//! from inside the transport, the store publishes an event here and whoever
//! owns the login flow subscribes to it.

use tokio::sync::broadcast;

/// Process-wide session signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The server rejected the session; the user has to sign in again
    ReauthenticationRequired,
}

/// Broadcast channel for [`SessionEvent`]s
#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Publish a re-authentication request
    pub fn require_reauthentication(&self) {
        tracing::warn!("Session rejected by server, re-authentication required");
        // No subscriber is fine: nothing is listening for the login flow yet
        let _ = self.tx.send(SessionEvent::ReauthenticationRequired);
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
