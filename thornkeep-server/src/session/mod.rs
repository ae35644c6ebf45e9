pub mod machine;
pub mod state;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use thornkeep_common::messages::OutputKind;
use thornkeep_data::UserId;
use tokio::sync::mpsc;

use crate::control::{ServerMessage, SessionId};

pub use state::ClientState;

/// §4.3: input buffer, cursor, output buffer, state, per-state scratch,
/// timestamps, monitoring flags, live on the world thread — only the
/// `output` sender crosses to the connection's own tokio task.
pub struct ConnectedClient {
    pub session_id: SessionId,
    pub remote: String,
    pub output: mpsc::UnboundedSender<ServerMessage>,
    pub state: ClientState,
    pub connected_at: Instant,
    pub last_activity: Instant,
    pub is_input_blocked: bool,
    /// Admin sessions watching this one; their `output` receives a copy of
    /// every line this session is sent (§4.3 monitoring).
    pub monitored_by: Vec<SessionId>,
    /// Set while an admin has taken this session over: input typed here is
    /// ignored except to release, and the admin's lines are run in its
    /// place (enforced by the caller, not this struct).
    pub taken_over_by: Option<SessionId>,
    pub raw_logging: bool,
}

impl ConnectedClient {
    fn new(session_id: SessionId, remote: String, output: mpsc::UnboundedSender<ServerMessage>) -> Self {
        let now = Instant::now();
        Self {
            session_id,
            remote,
            output,
            state: ClientState::Connecting,
            connected_at: now,
            last_activity: now,
            is_input_blocked: false,
            monitored_by: Vec::new(),
            taken_over_by: None,
            raw_logging: false,
        }
    }

    pub fn send(&self, kind: OutputKind, text: impl Into<String>) {
        let _ = self.output.send(ServerMessage::Line(kind, text.into()));
    }

    pub fn send_text(&self, text: impl Into<String>) {
        self.send(OutputKind::Text, text);
    }

    pub fn set_mask(&self, masked: bool) {
        let _ = self.output.send(ServerMessage::SetMaskInput(masked));
    }

    pub fn disconnect(&self) {
        let _ = self.output.send(ServerMessage::Disconnect);
    }
}

/// Owns every `ConnectedClient`, the username→session index used to enforce
/// "exactly one authenticated session per username", and in-flight
/// transfer handshakes (§4.3). Carries no world/persistence access — those
/// live in [`machine`], which this manager is driven by.
#[derive(Default)]
pub struct SessionManager {
    clients: HashMap<SessionId, ConnectedClient>,
    by_user: HashMap<UserId, SessionId>,
    next_id: u64,
    pending_transfers: HashMap<UserId, PendingTransfer>,
}

struct PendingTransfer {
    incoming: SessionId,
    requested_at: Instant,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, remote: String, output: mpsc::UnboundedSender<ServerMessage>) -> SessionId {
        self.next_id += 1;
        let id = SessionId(self.next_id);
        self.clients.insert(id, ConnectedClient::new(id, remote, output));
        id
    }

    pub fn client(&self, id: SessionId) -> Option<&ConnectedClient> {
        self.clients.get(&id)
    }

    pub fn client_mut(&mut self, id: SessionId) -> Option<&mut ConnectedClient> {
        self.clients.get_mut(&id)
    }

    pub fn clients_mut(&mut self) -> impl Iterator<Item = (&SessionId, &mut ConnectedClient)> {
        self.clients.iter_mut()
    }

    pub fn disconnect(&mut self, id: SessionId) {
        if let Some(client) = self.clients.remove(&id) {
            if let Some(user_id) = client.state.user_id() {
                if self.by_user.get(user_id) == Some(&id) {
                    self.by_user.remove(user_id);
                }
            }
        }
        self.pending_transfers.retain(|_, t| t.incoming != id);
    }

    /// Registers `id` as the single authenticated session for `user_id`,
    /// evicting any stale mapping (the caller is responsible for having
    /// already resolved a transfer if one was in flight).
    pub fn claim_username(&mut self, user_id: UserId, id: SessionId) {
        self.by_user.insert(user_id, id);
    }

    pub fn session_for_user(&self, user_id: &UserId) -> Option<SessionId> {
        self.by_user.get(user_id).copied()
    }

    pub fn begin_transfer(&mut self, user_id: UserId, incoming: SessionId) -> bool {
        if self.pending_transfers.contains_key(&user_id) {
            return false;
        }
        self.pending_transfers.insert(
            user_id,
            PendingTransfer {
                incoming,
                requested_at: Instant::now(),
            },
        );
        true
    }

    pub fn take_transfer(&mut self, user_id: &UserId) -> Option<SessionId> {
        self.pending_transfers.remove(user_id).map(|t| t.incoming)
    }

    /// Transfers whose request has outlived `timeout` are treated as an
    /// implicit "y" (§4.3 point 1: "at most T seconds").
    pub fn expired_transfers(&self, timeout: Duration) -> Vec<UserId> {
        let now = Instant::now();
        self.pending_transfers
            .iter()
            .filter(|(_, t)| now.duration_since(t.requested_at) >= timeout)
            .map(|(user_id, _)| user_id.clone())
            .collect()
    }

    /// Sends `text` to `id` and fans it out to every session currently
    /// monitoring it (§4.3 "outbound lines are fan-out'd to the admin's
    /// connection in real time").
    pub fn send_to(&self, id: SessionId, kind: OutputKind, text: impl Into<String>) {
        let text = text.into();
        let Some(client) = self.clients.get(&id) else {
            return;
        };
        client.send(kind, text.clone());
        for monitor_id in &client.monitored_by {
            if let Some(monitor) = self.clients.get(monitor_id) {
                monitor.send(kind, format!("[monitor {}] {}", id.0, text));
            }
        }
    }

    pub fn attach_monitor(&mut self, target: SessionId, admin: SessionId) {
        if let Some(client) = self.clients.get_mut(&target) {
            if !client.monitored_by.contains(&admin) {
                client.monitored_by.push(admin);
            }
        }
    }

    pub fn detach_monitor(&mut self, target: SessionId, admin: SessionId) {
        if let Some(client) = self.clients.get_mut(&target) {
            client.monitored_by.retain(|id| *id != admin);
        }
    }

    pub fn touch(&mut self, id: SessionId) {
        if let Some(client) = self.clients.get_mut(&id) {
            client.last_activity = Instant::now();
        }
    }

    /// Sessions idle past `timeout`, excluding anything `in_combat` per the
    /// caller's world check (§8 "combat immunity").
    pub fn idle_candidates(&self, timeout: Duration) -> Vec<SessionId> {
        let now = Instant::now();
        self.clients
            .iter()
            .filter(|(_, client)| {
                client.state.holds_username_slot()
                    && now.duration_since(client.last_activity) > timeout
            })
            .map(|(id, _)| *id)
            .collect()
    }
}
