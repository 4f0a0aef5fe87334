//! WebSocket Message Types
//!
//! Defines the messages exchanged between dashboard clients and the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::DataEvent;

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Connection established
    Connected {
        /// Unique connection identifier
        connection_id: String,
    },
    /// The member snapshot was refreshed; clients should refetch
    DataUpdated {
        /// Number of members in the new snapshot
        member_count: usize,
        /// When the snapshot was taken
        #[serde(skip_serializing_if = "Option::is_none")]
        last_updated: Option<DateTime<Utc>>,
    },
    /// Pong response to ping
    Pong,
    /// Error message
    Error {
        /// Error description
        message: String,
    },
}

impl From<DataEvent> for ServerMessage {
    fn from(event: DataEvent) -> Self {
        ServerMessage::DataUpdated {
            member_count: event.member_count,
            last_updated: event.last_updated,
        }
    }
}
