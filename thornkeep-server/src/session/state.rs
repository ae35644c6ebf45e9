use std::time::Instant;

use thornkeep_data::UserId;

use crate::control::SessionId;

/// §4.3. Each variant carries exactly the scratch data its `enter`/`handle`
/// needs; nothing here outlives the transition that replaces it.
#[derive(Clone)]
pub enum ClientState {
    Connecting,
    Login {
        attempts: u32,
    },
    Signup {
        username: String,
    },
    Confirmation {
        username: String,
        is_new_account: bool,
        attempts: u32,
        /// Set once the first of two masked entries has been typed during
        /// signup, so the second entry can be compared against it instead
        /// of against a stored hash.
        pending_password: Option<String>,
    },
    Game {
        user_id: UserId,
        move_blocked_until: Option<Instant>,
    },
    TransferRequest {
        user_id: UserId,
        incoming_session: SessionId,
    },
    Editor {
        user_id: UserId,
    },
    SnakeGame {
        user_id: UserId,
        score: u32,
    },
}

impl ClientState {
    pub fn name(&self) -> &'static str {
        match self {
            ClientState::Connecting => "CONNECTING",
            ClientState::Login { .. } => "LOGIN",
            ClientState::Signup { .. } => "SIGNUP",
            ClientState::Confirmation { .. } => "CONFIRMATION",
            ClientState::Game { .. } => "GAME",
            ClientState::TransferRequest { .. } => "TRANSFER_REQUEST",
            ClientState::Editor { .. } => "EDITOR",
            ClientState::SnakeGame { .. } => "SNAKE_GAME",
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            ClientState::Game { user_id, .. }
            | ClientState::TransferRequest { user_id, .. }
            | ClientState::Editor { user_id }
            | ClientState::SnakeGame { user_id, .. } => Some(user_id),
            _ => None,
        }
    }

    /// Authenticated, in-world states count toward "at most one session per
    /// username" (§8).
    pub fn holds_username_slot(&self) -> bool {
        matches!(
            self,
            ClientState::Game { .. } | ClientState::Editor { .. } | ClientState::SnakeGame { .. }
        )
    }

    pub fn masks_input(&self) -> bool {
        matches!(self, ClientState::Confirmation { .. } | ClientState::Signup { .. })
    }
}
