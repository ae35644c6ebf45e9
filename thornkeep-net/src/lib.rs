//! The abstract `Connection` capability set shared by telnet-style TCP and
//! WebSocket listeners (§6): `write`, `end`, `setMaskInput`, `getType`,
//! `remoteAddress`, `enableRawLogging`. Concrete wire framing is the only
//! thing that differs between the two implementations.

mod telnet;
mod websocket;

use std::net::SocketAddr;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connection lost")]
    ConnectionLost,
    #[error("line exceeded maximum size")]
    LineTooLong,
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionType {
    Telnet,
    WebSocket,
}

pub const MAX_LINE_BYTES: usize = 8 * 1024;

/// One accepted client connection, regardless of transport. `read_line`
/// yields complete, already-trimmed-of-terminator input lines; `write_line`
/// and `write_system`/`write_prompt` send the equivalent outbound frame for
/// whichever transport this is.
#[async_trait]
pub trait Connection: Send {
    async fn read_line(&mut self) -> Result<String, ConnectionError>;
    async fn write_text(&mut self, data: &str) -> Result<(), ConnectionError>;
    async fn write_system(&mut self, data: &str) -> Result<(), ConnectionError>;
    async fn write_prompt(&mut self, data: &str) -> Result<(), ConnectionError>;
    async fn end(&mut self);
    async fn set_mask_input(&mut self, masked: bool);

    fn connection_type(&self) -> ConnectionType;
    fn remote_address(&self) -> SocketAddr;
    fn enable_raw_logging(&mut self, enabled: bool);
}

pub use telnet::TelnetConnection;
pub use websocket::WebSocketConnection;
