use std::collections::HashMap;

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

use thornkeep_data::AbilityId;

/// Remaining ticks before each ability can be used again (§4.5 step 6).
#[derive(Component, Clone, Debug, Default, Serialize, Deserialize)]
pub struct Cooldowns(pub HashMap<AbilityId, u32>);

impl Cooldowns {
    pub fn is_ready(&self, ability_id: &AbilityId) -> bool {
        self.0.get(ability_id).copied().unwrap_or(0) == 0
    }

    pub fn start(&mut self, ability_id: AbilityId, ticks: u32) {
        self.0.insert(ability_id, ticks);
    }

    pub fn tick_down(&mut self) {
        self.0.retain(|_, remaining| {
            *remaining = remaining.saturating_sub(1);
            *remaining > 0
        });
    }
}
