use std::collections::HashMap;

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

use thornkeep_data::{NpcInstanceId, NpcTemplateId, RoomId, UserId};

/// Per-NPC map from attacker to accumulated threat weight, used for XP
/// attribution and death broadcasts. No automatic decay — cleared on the
/// NPC's death or on an aggressor's departure from the room (§4.6, §9).
#[derive(Component, Clone, Debug, Default, Serialize, Deserialize)]
pub struct AggressionTable {
    threat: HashMap<UserId, u64>,
    order: Vec<UserId>,
}

impl AggressionTable {
    pub fn record_damage(&mut self, attacker: UserId, amount: i32) {
        if !self.threat.contains_key(&attacker) {
            self.order.push(attacker.clone());
        }
        *self.threat.entry(attacker).or_insert(0) += amount.max(0) as u64;
    }

    pub fn clear_attacker(&mut self, attacker: &UserId) {
        self.threat.remove(attacker);
        self.order.retain(|id| id != attacker);
    }

    pub fn clear(&mut self) {
        self.threat.clear();
        self.order.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.threat.is_empty()
    }

    /// Proportional XP shares for every attacker, in first-hit order.
    pub fn xp_shares(&self, total_xp: u32) -> Vec<(UserId, u32)> {
        let total_threat: u64 = self.threat.values().sum();
        if total_threat == 0 {
            return Vec::new();
        }
        self.order
            .iter()
            .filter_map(|id| self.threat.get(id).map(|weight| (id.clone(), *weight)))
            .map(|(id, weight)| {
                let share = ((weight as u128 * total_xp as u128) / total_threat as u128) as u32;
                (id, share)
            })
            .collect()
    }
}

#[derive(Component, Clone, Debug, Serialize, Deserialize)]
pub struct NpcInstance {
    pub instance_id: NpcInstanceId,
    pub template_id: NpcTemplateId,
    pub room_id: RoomId,
    pub home_room_id: RoomId,
    pub is_merchant_open: bool,
}

impl NpcInstance {
    pub fn new(instance_id: NpcInstanceId, template_id: NpcTemplateId, home_room_id: RoomId) -> Self {
        Self {
            instance_id,
            template_id,
            room_id: home_room_id.clone(),
            home_room_id,
            is_merchant_open: true,
        }
    }
}

/// Tracks a despawned NPC template awaiting respawn in its home room.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendingRespawn {
    pub template_id: NpcTemplateId,
    pub home_room_id: RoomId,
    pub remaining_ticks: u32,
}
