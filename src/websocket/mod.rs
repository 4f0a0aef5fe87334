//! WebSocket Notifications
//!
//! Pushes a `data-updated` message to connected dashboards whenever the member
//! snapshot is refreshed, so they can refetch the REST endpoints.
//!
//! ## Architecture
//!
//! - **ConnectionHub**: tracks connections and broadcasts events
//! - **Handler**: handles WebSocket upgrade and message processing
//! - **Messages**: defines client and server message formats
//!
//! ## Example
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket('ws://localhost:3000/ws');
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'data-updated') refreshDashboard();
//! };
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::websocket_handler;
pub use hub::{ConnectionHub, HubConfig, HubError};
pub use messages::{ClientMessage, ServerMessage};
