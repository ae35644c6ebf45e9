use std::net::SocketAddr;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use log::trace;
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_tungstenite::{tungstenite::Message, WebSocketStream};

use crate::{Connection, ConnectionError, ConnectionType, MAX_LINE_BYTES};

#[derive(Deserialize)]
struct InboundFrame {
    input: String,
}

#[derive(Serialize)]
struct OutboundFrame<'a> {
    #[serde(rename = "type")]
    frame_type: &'a str,
    data: &'a str,
}

/// One JSON message per input line (`{ "input": "<line>" }`), one JSON
/// frame per output line (`{ "type": "text"|"system"|"prompt", "data": .. }`)
/// per §6. `setMaskInput` has no telnet-style analog over WebSocket — it is
/// communicated as a `system` frame instructing the client UI to switch to
/// a password field.
pub struct WebSocketConnection {
    stream: WebSocketStream<TcpStream>,
    remote_address: SocketAddr,
    raw_logging: bool,
}

impl WebSocketConnection {
    pub fn new(stream: WebSocketStream<TcpStream>, remote_address: SocketAddr) -> Self {
        Self {
            stream,
            remote_address,
            raw_logging: false,
        }
    }

    async fn send_frame(&mut self, frame_type: &str, data: &str) -> Result<(), ConnectionError> {
        let frame = OutboundFrame { frame_type, data };
        let json = serde_json::to_string(&frame)
            .map_err(|error| ConnectionError::MalformedFrame(error.to_string()))?;
        if self.raw_logging {
            trace!(target: "websocket", "SEND {}", json);
        }
        self.stream
            .send(Message::Text(json))
            .await
            .map_err(|_| ConnectionError::ConnectionLost)
    }
}

#[async_trait]
impl Connection for WebSocketConnection {
    async fn read_line(&mut self) -> Result<String, ConnectionError> {
        loop {
            let message = self
                .stream
                .next()
                .await
                .ok_or(ConnectionError::ConnectionLost)?
                .map_err(|_| ConnectionError::ConnectionLost)?;

            match message {
                Message::Text(text) => {
                    if text.len() > MAX_LINE_BYTES {
                        return Err(ConnectionError::LineTooLong);
                    }
                    if self.raw_logging {
                        trace!(target: "websocket", "RECV {}", text);
                    }
                    let frame: InboundFrame = serde_json::from_str(&text)
                        .map_err(|error| ConnectionError::MalformedFrame(error.to_string()))?;
                    return Ok(frame.input);
                }
                Message::Close(_) => return Err(ConnectionError::ConnectionLost),
                _ => continue,
            }
        }
    }

    async fn write_text(&mut self, data: &str) -> Result<(), ConnectionError> {
        self.send_frame("text", data).await
    }

    async fn write_system(&mut self, data: &str) -> Result<(), ConnectionError> {
        self.send_frame("system", data).await
    }

    async fn write_prompt(&mut self, data: &str) -> Result<(), ConnectionError> {
        self.send_frame("prompt", data).await
    }

    async fn end(&mut self) {
        let _ = self.stream.close(None).await;
    }

    async fn set_mask_input(&mut self, masked: bool) {
        let marker = if masked { "mask:on" } else { "mask:off" };
        let _ = self.send_frame("system", marker).await;
    }

    fn connection_type(&self) -> ConnectionType {
        ConnectionType::WebSocket
    }

    fn remote_address(&self) -> SocketAddr {
        self.remote_address
    }

    fn enable_raw_logging(&mut self, enabled: bool) {
        self.raw_logging = enabled;
    }
}
