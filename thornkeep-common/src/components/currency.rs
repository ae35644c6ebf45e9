use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// Gold/silver/copper triple. 100 copper = 1 silver, 100 silver = 1 gold for
/// *display only* — components are never auto-normalized, matching §3.
#[derive(Component, Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Currency {
    pub gold: u32,
    pub silver: u32,
    pub copper: u32,
}

impl Currency {
    pub fn new(gold: u32, silver: u32, copper: u32) -> Self {
        Self {
            gold,
            silver,
            copper,
        }
    }

    pub fn total_copper(&self) -> u64 {
        self.gold as u64 * 10_000 + self.silver as u64 * 100 + self.copper as u64
    }

    pub fn display(&self) -> String {
        format!("{}g {}s {}c", self.gold, self.silver, self.copper)
    }
}
