use std::net::SocketAddr;

use async_trait::async_trait;
use bytes::BytesMut;
use log::trace;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;

use crate::{Connection, ConnectionError, ConnectionType, MAX_LINE_BYTES};

const IAC: u8 = 255;
const WILL: u8 = 251;
const WONT: u8 = 252;
const DO: u8 = 253;
const DONT: u8 = 254;
const ECHO: u8 = 1;
const SB: u8 = 250;
const SE: u8 = 240;

/// CRLF-terminated 7-bit-ASCII-plus-ANSI-SGR lines over a raw TCP socket.
/// Recognizes IAC sequences well enough to negotiate ECHO OFF during
/// password entry and to silently discard unsupported options (§6).
pub struct TelnetConnection {
    stream: BufWriter<TcpStream>,
    remote_address: SocketAddr,
    read_buffer: BytesMut,
    mask_input: bool,
    raw_logging: bool,
}

impl TelnetConnection {
    pub fn new(socket: TcpStream, remote_address: SocketAddr) -> Self {
        Self {
            stream: BufWriter::new(socket),
            remote_address,
            read_buffer: BytesMut::with_capacity(4 * 1024),
            mask_input: false,
            raw_logging: false,
        }
    }

    async fn send_iac(&mut self, command: u8, option: u8) -> Result<(), ConnectionError> {
        self.stream
            .write_all(&[IAC, command, option])
            .await
            .map_err(|_| ConnectionError::ConnectionLost)?;
        self.stream
            .flush()
            .await
            .map_err(|_| ConnectionError::ConnectionLost)
    }

    /// Strips IAC negotiation sequences out of `buffer` in place, returning
    /// the plain bytes that remain. Malformed/unsupported options are
    /// acknowledged with WONT/DONT so the client stops retrying.
    fn filter_telnet_commands(&mut self, buffer: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(buffer.len());
        let mut i = 0;
        while i < buffer.len() {
            if buffer[i] == IAC {
                if i + 1 >= buffer.len() {
                    break;
                }
                match buffer[i + 1] {
                    WILL | WONT | DO | DONT => {
                        i += 3;
                    }
                    SB => {
                        // Skip to IAC SE.
                        let mut j = i + 2;
                        while j + 1 < buffer.len() && !(buffer[j] == IAC && buffer[j + 1] == SE) {
                            j += 1;
                        }
                        i = j + 2;
                    }
                    IAC => {
                        out.push(IAC);
                        i += 2;
                    }
                    _ => i += 2,
                }
            } else {
                out.push(buffer[i]);
                i += 1;
            }
        }
        out
    }
}

#[async_trait]
impl Connection for TelnetConnection {
    async fn read_line(&mut self) -> Result<String, ConnectionError> {
        loop {
            if let Some(pos) = self.read_buffer.iter().position(|&b| b == b'\n') {
                let mut line: Vec<u8> = self.read_buffer.split_to(pos + 1).to_vec();
                line.pop(); // '\n'
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                let filtered = self.filter_telnet_commands(&line);
                let text = String::from_utf8_lossy(&filtered).to_string();
                if self.raw_logging {
                    trace!(target: "telnet", "RECV {:?}", text);
                }
                return Ok(text);
            }

            if self.read_buffer.len() > MAX_LINE_BYTES {
                return Err(ConnectionError::LineTooLong);
            }

            let read = self
                .stream
                .read_buf(&mut self.read_buffer)
                .await
                .map_err(|_| ConnectionError::ConnectionLost)?;
            if read == 0 {
                return Err(ConnectionError::ConnectionLost);
            }
        }
    }

    async fn write_text(&mut self, data: &str) -> Result<(), ConnectionError> {
        if self.raw_logging {
            trace!(target: "telnet", "SEND {:?}", data);
        }
        self.stream
            .write_all(data.as_bytes())
            .await
            .map_err(|_| ConnectionError::ConnectionLost)?;
        self.stream
            .write_all(b"\r\n")
            .await
            .map_err(|_| ConnectionError::ConnectionLost)?;
        self.stream
            .flush()
            .await
            .map_err(|_| ConnectionError::ConnectionLost)
    }

    async fn write_system(&mut self, data: &str) -> Result<(), ConnectionError> {
        self.write_text(data).await
    }

    async fn write_prompt(&mut self, data: &str) -> Result<(), ConnectionError> {
        self.stream
            .write_all(data.as_bytes())
            .await
            .map_err(|_| ConnectionError::ConnectionLost)?;
        self.stream
            .flush()
            .await
            .map_err(|_| ConnectionError::ConnectionLost)
    }

    async fn end(&mut self) {
        let _ = self.stream.shutdown().await;
    }

    async fn set_mask_input(&mut self, masked: bool) {
        if masked == self.mask_input {
            return;
        }
        self.mask_input = masked;
        let option = if masked { WILL } else { WONT };
        // Best-effort: a lost connection here surfaces on the next read.
        let _ = self.send_iac(option, ECHO).await;
    }

    fn connection_type(&self) -> ConnectionType {
        ConnectionType::Telnet
    }

    fn remote_address(&self) -> SocketAddr {
        self.remote_address
    }

    fn enable_raw_logging(&mut self, enabled: bool) {
        self.raw_logging = enabled;
    }
}
