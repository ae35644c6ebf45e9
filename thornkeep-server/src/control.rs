use serde_json::Value;
use thornkeep_common::messages::OutputKind;
use thornkeep_data::UserId;
use tokio::sync::{mpsc, oneshot};

use crate::config::{GametimerConfig, MudConfig};

/// What the admin HTTP API asks the world thread to do, mirroring the
/// `/players/*`, `/mud-config`, `/gametimer-config`, `/force-save`,
/// `/pipeline-metrics` surface (§6). Every variant carries its own
/// `oneshot` reply so a request handler can `.await` a synchronous-looking
/// answer despite the world living on a different thread.
pub enum AdminRequest {
    Stats,
    Players,
    PlayerDetails { user_id: UserId },
    UpdatePlayer { user_id: UserId, patch: Value },
    DeletePlayer { user_id: UserId },
    Kick { target: UserId },
    Monitor { admin: UserId, target: UserId },
    Takeover { admin: UserId, target: UserId },
    Release { admin: UserId },
    ForceSave,
    Shutdown { minutes: Option<u32> },
    GetMudConfig,
    SetMudConfig(MudConfig),
    GetGametimerConfig,
    SetGametimerConfig(GametimerConfig),
    PipelineMetrics,
}

#[derive(Debug)]
pub enum AdminResponse {
    Ok,
    Json(Value),
    Error(String),
}

/// The single mailbox every session task and the tick timer enqueue onto;
/// drained in arrival order by the world thread (§5 "single-writer").
/// Nothing mutates the `World` except in response to a message pulled off
/// this channel.
pub enum ControlMessage {
    Connect {
        remote: String,
        output: mpsc::UnboundedSender<ServerMessage>,
        reply: oneshot::Sender<SessionId>,
    },
    Line {
        session: SessionId,
        line: String,
    },
    Disconnect {
        session: SessionId,
    },
    Admin {
        request: AdminRequest,
        reply: oneshot::Sender<AdminResponse>,
    },
    Tick,
}

/// Opaque handle a session task holds to address itself in subsequent
/// `ControlMessage::Line`/`Disconnect` sends. Distinct from `UserId`
/// because a session exists (in CONNECTING/LOGIN) before any user is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

/// One outbound unit, written to the session's transport via whichever
/// `Connection` impl it holds.
#[derive(Clone, Debug)]
pub enum ServerMessage {
    Line(OutputKind, String),
    SetMaskInput(bool),
    Disconnect,
}
