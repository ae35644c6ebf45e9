use std::collections::HashMap;

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

use thornkeep_data::{EffectStackingBehaviour, EffectType};

/// Open-ended extension point for effect authors, schema-validated only at
/// the point definitions are loaded (§9 "runtime-reflective JSON blobs").
pub type EffectMetadata = HashMap<String, serde_json::Value>;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EffectPayload {
    pub damage_per_tick: i32,
    pub heal_per_tick: i32,
    pub stat_modifiers: HashMap<String, i32>,
    pub block_movement: bool,
    pub block_combat: bool,
    pub metadata: EffectMetadata,
}

impl Default for EffectPayload {
    fn default() -> Self {
        Self {
            damage_per_tick: 0,
            heal_per_tick: 0,
            stat_modifiers: HashMap::new(),
            block_movement: false,
            block_combat: false,
            metadata: HashMap::new(),
        }
    }
}

impl EffectPayload {
    /// Magnitude used to compare two payloads under `StrongestWins`.
    pub fn magnitude(&self) -> i32 {
        self.damage_per_tick.abs()
            + self.heal_per_tick.abs()
            + self.stat_modifiers.values().map(|v| v.abs()).sum::<i32>()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub instance_id: String,
    pub effect_type: EffectType,
    pub name: String,
    pub description: String,
    pub duration_ticks: u32,
    pub remaining_ticks: u32,
    pub is_time_based: bool,
    pub tick_interval: u32,
    pub last_tick_applied: u32,
    pub payload: EffectPayload,
    pub target_id: String,
    pub is_player_effect: bool,
    pub source_id: Option<String>,
    pub stacking_behaviour: EffectStackingBehaviour,
}

impl ActiveEffect {
    pub fn is_expired(&self) -> bool {
        self.remaining_ticks == 0
    }

    /// True when `current_tick` lands on this effect's periodic trigger.
    pub fn should_trigger(&self, current_tick: u64) -> bool {
        self.tick_interval > 0 && current_tick % self.tick_interval as u64 == 0
    }
}

/// Active effects on one entity, in insertion order (§4.8 "listing effects
/// on a target returns them in insertion order").
#[derive(Component, Clone, Debug, Default, Serialize, Deserialize)]
pub struct ActiveEffects(pub Vec<ActiveEffect>);

impl ActiveEffects {
    pub fn find_by_type(&self, effect_type: EffectType) -> Option<usize> {
        self.0.iter().position(|e| e.effect_type == effect_type)
    }

    pub fn remove_by_instance_id(&mut self, instance_id: &str) -> Option<ActiveEffect> {
        let index = self.0.iter().position(|e| e.instance_id == instance_id)?;
        Some(self.0.remove(index))
    }
}
