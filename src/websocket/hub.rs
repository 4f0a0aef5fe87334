//! WebSocket Connection Hub
//!
//! Tracks connected dashboards and fans out data-change notifications.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::messages::ServerMessage;
use crate::cache::{DataEvent, Notifier};

/// Unique identifier for a WebSocket connection
pub type ConnectionId = String;

type ConnectionMap = Arc<RwLock<HashMap<ConnectionId, ConnectionHandle>>>;

/// Manages all WebSocket connections
pub struct ConnectionHub {
    /// Active connections: ConnectionId → ConnectionHandle
    connections: ConnectionMap,
    /// Configuration
    config: HubConfig,
}

/// Configuration for the connection hub
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Maximum number of concurrent connections
    pub max_connections: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_connections: 1000,
        }
    }
}

/// Handle for sending messages to a specific connection
pub struct ConnectionHandle {
    /// Channel sender for this connection
    pub sender: mpsc::UnboundedSender<ServerMessage>,
}

impl ConnectionHub {
    /// Create a new connection hub
    pub fn new(config: HubConfig) -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Register a new WebSocket connection
    ///
    /// Returns the connection ID on success, or an error if the connection
    /// limit has been reached.
    pub async fn register(
        &self,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<ConnectionId, HubError> {
        let mut connections = self.connections.write().await;
        if connections.len() >= self.config.max_connections {
            return Err(HubError::TooManyConnections(self.config.max_connections));
        }

        let id = Uuid::new_v4().to_string();
        connections.insert(id.clone(), ConnectionHandle { sender });

        tracing::info!(connection_id = %id, "Dashboard connected");
        Ok(id)
    }

    /// Unregister a connection
    pub async fn unregister(&self, id: &str) {
        self.connections.write().await.remove(id);
        tracing::info!(connection_id = %id, "Dashboard disconnected");
    }

    /// Send a message to every connected client
    ///
    /// Returns the number of connections the message was handed to.
    pub async fn broadcast(&self, message: &ServerMessage) -> usize {
        broadcast_to(&self.connections, message).await
    }

    /// Send a message directly to a specific connection
    pub async fn send_to(&self, id: &str, message: ServerMessage) -> Result<(), HubError> {
        let connections = self.connections.read().await;
        let handle = connections.get(id).ok_or(HubError::ConnectionNotFound)?;

        handle
            .sender
            .send(message)
            .map_err(|_| HubError::SendFailed)
    }

    /// Get the current connection count
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

impl Notifier for ConnectionHub {
    /// Fire-and-forget broadcast of a data-updated message
    fn publish(&self, event: DataEvent) {
        let connections = Arc::clone(&self.connections);
        let message = ServerMessage::from(event);

        tokio::spawn(async move {
            let delivered = broadcast_to(&connections, &message).await;
            tracing::info!(subscribers = delivered, "Published data-updated event");
        });
    }
}

async fn broadcast_to(connections: &ConnectionMap, message: &ServerMessage) -> usize {
    let connections = connections.read().await;

    let mut sent_count = 0;
    for handle in connections.values() {
        if handle.sender.send(message.clone()).is_ok() {
            sent_count += 1;
        }
    }

    if sent_count > 0 {
        tracing::trace!(subscribers = sent_count, "Broadcast message");
    }
    sent_count
}

/// Errors that can occur in the connection hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many connections (limit: {0})")]
    TooManyConnections(usize),

    #[error("Connection not found")]
    ConnectionNotFound,

    #[error("Failed to send message")]
    SendFailed,
}
