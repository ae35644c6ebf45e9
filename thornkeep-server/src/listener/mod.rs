//! Accept loops for the two transports in §6: raw telnet over TCP and JSON
//! framing over WebSocket. Both funnel into the same
//! [`ControlMessage`]/[`ServerMessage`] mailbox pair so the world thread
//! never needs to know which transport a session arrived on.

use std::net::SocketAddr;

use log::{info, warn};
use thornkeep_net::{Connection, TelnetConnection, WebSocketConnection};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};

use crate::control::{ControlMessage, ServerMessage, SessionId};

pub async fn run_telnet(port: u16, control_tx: crossbeam_channel::Sender<ControlMessage>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!("telnet listener bound on {port}");
    loop {
        let (socket, addr) = listener.accept().await?;
        let control_tx = control_tx.clone();
        tokio::spawn(async move {
            let connection = TelnetConnection::new(socket, addr);
            run_connection(connection, addr, control_tx).await;
        });
    }
}

pub async fn run_websocket(port: u16, control_tx: crossbeam_channel::Sender<ControlMessage>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!("websocket listener bound on {port}");
    loop {
        let (socket, addr) = listener.accept().await?;
        let control_tx = control_tx.clone();
        tokio::spawn(async move {
            if let Err(error) = accept_websocket(socket, addr, control_tx).await {
                warn!("websocket handshake with {addr} failed: {error}");
            }
        });
    }
}

async fn accept_websocket(
    socket: TcpStream,
    addr: SocketAddr,
    control_tx: crossbeam_channel::Sender<ControlMessage>,
) -> anyhow::Result<()> {
    let stream = tokio_tungstenite::accept_async(socket).await?;
    let connection = WebSocketConnection::new(stream, addr);
    run_connection(connection, addr, control_tx).await;
    Ok(())
}

/// Registers one connection with the world thread, then pumps both
/// directions until either side closes: inbound lines become
/// `ControlMessage::Line`, outbound `ServerMessage`s are written back
/// through whichever `Connection` impl this transport is.
async fn run_connection(mut connection: impl Connection, addr: SocketAddr, control_tx: crossbeam_channel::Sender<ControlMessage>) {
    let (output_tx, mut output_rx) = mpsc::unbounded_channel::<ServerMessage>();
    let (reply_tx, reply_rx) = oneshot::channel::<SessionId>();

    if control_tx
        .send(ControlMessage::Connect {
            remote: addr.to_string(),
            output: output_tx,
            reply: reply_tx,
        })
        .is_err()
    {
        return;
    }
    let Ok(session_id) = reply_rx.await else {
        return;
    };

    loop {
        tokio::select! {
            line = connection.read_line() => {
                match line {
                    Ok(line) => {
                        if control_tx.send(ControlMessage::Line { session: session_id, line }).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
            message = output_rx.recv() => {
                match message {
                    Some(ServerMessage::Line(kind, text)) => {
                        let result = match kind {
                            thornkeep_common::messages::OutputKind::Text => connection.write_text(&text).await,
                            thornkeep_common::messages::OutputKind::System => connection.write_system(&text).await,
                            thornkeep_common::messages::OutputKind::Prompt => connection.write_prompt(&text).await,
                        };
                        if result.is_err() {
                            break;
                        }
                    }
                    Some(ServerMessage::SetMaskInput(masked)) => connection.set_mask_input(masked).await,
                    Some(ServerMessage::Disconnect) | None => break,
                }
            }
        }
    }

    connection.end().await;
    let _ = control_tx.send(ControlMessage::Disconnect { session: session_id });
}
