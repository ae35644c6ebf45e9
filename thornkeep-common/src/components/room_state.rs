use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

use thornkeep_data::{ItemInstanceId, NpcInstanceId, RoomId, UserId};

use crate::components::Currency;

/// Mutable per-room state, kept separate from the static `RoomTemplate`
/// (§3 "Room *runtime state* is stored separately").
#[derive(Component, Clone, Debug, Serialize, Deserialize)]
pub struct RoomState {
    pub room_id: RoomId,
    pub floor_items: Vec<ItemInstanceId>,
    pub currency_pile: Currency,
    pub spawned_npcs: Vec<NpcInstanceId>,
    pub players: Vec<UserId>,
}

impl RoomState {
    pub fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            floor_items: Vec::new(),
            currency_pile: Currency::default(),
            spawned_npcs: Vec::new(),
            players: Vec::new(),
        }
    }

    pub fn add_player(&mut self, user_id: UserId) {
        if !self.players.contains(&user_id) {
            self.players.push(user_id);
        }
    }

    pub fn remove_player(&mut self, user_id: &UserId) {
        self.players.retain(|id| id != user_id);
    }
}
