use bevy_ecs::prelude::Component;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use thornkeep_data::{ClassId, RaceId, RoomId, UserId};

use crate::password::PasswordHash;

/// Indexes a player entity by its normalized username; looked up by
/// `UserIndex` (§4.2 "ID uniqueness enforcement").
#[derive(Component, Clone, Debug, Serialize, Deserialize)]
pub struct PlayerId(pub UserId);

#[derive(Component, Clone, Debug, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: PasswordHash,
}

#[derive(Component, Clone, Debug, Serialize, Deserialize)]
pub struct Progression {
    pub level: u32,
    pub experience: u64,
}

impl Progression {
    pub fn new() -> Self {
        Self {
            level: 1,
            experience: 0,
        }
    }
}

impl Default for Progression {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Component, Clone, Debug, Serialize, Deserialize)]
pub struct ClassRace {
    pub class_id: ClassId,
    pub race_id: RaceId,
}

#[derive(Component, Clone, Debug, Serialize, Deserialize)]
pub struct Location {
    pub current_room_id: RoomId,
}

#[derive(Component, Clone, Debug, Serialize, Deserialize)]
pub struct Bookkeeping {
    pub join_date: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    pub total_play_time_seconds: u64,
}

impl Bookkeeping {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            join_date: now,
            last_login: now,
            total_play_time_seconds: 0,
        }
    }
}

impl Default for Bookkeeping {
    fn default() -> Self {
        Self::new()
    }
}

/// Admin messages queued while the user is offline (§4.9). Drained in
/// order on the next successful login.
#[derive(Component, Clone, Debug, Default, Serialize, Deserialize)]
pub struct PendingAdminMessages {
    messages: Vec<String>,
}

impl PendingAdminMessages {
    pub fn push(&mut self, message: String) {
        self.messages.push(message);
    }

    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
