//! SSE connection sessions.
//!
//! A session lives from `GET /sse` until its event stream is dropped. It owns
//! the MCP server built for the connection and the channel feeding the stream.

use baas_mcp::McpServer;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Responses buffered per connection before `POST /message` handlers wait.
const SESSION_BUFFER: usize = 32;

#[derive(Clone)]
pub struct Session {
    pub server: Arc<McpServer>,
    pub outbound: mpsc::Sender<String>,
}

#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionRegistry {
    /// Register a session and return its ID with the receiving end of its
    /// outbound channel.
    pub fn open(&self, server: McpServer) -> (Uuid, mpsc::Receiver<String>) {
        let id = Uuid::new_v4();
        let (outbound, rx) = mpsc::channel(SESSION_BUFFER);
        let session = Session {
            server: Arc::new(server),
            outbound,
        };

        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, session);
        (id, rx)
    }

    pub fn get(&self, id: &Uuid) -> Option<Session> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn close(&self, id: &Uuid) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Guard that closes the session when dropped.
    pub fn guard(&self, id: Uuid) -> SessionGuard {
        SessionGuard {
            id,
            sessions: self.clone(),
        }
    }
}

/// Closes its session on drop; held by the session's event stream.
pub struct SessionGuard {
    id: Uuid,
    sessions: SessionRegistry,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.sessions.close(&self.id) {
            tracing::info!(session_id = %self.id, "SSE session closed");
        }
    }
}
