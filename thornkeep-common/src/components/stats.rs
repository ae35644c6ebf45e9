use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

#[derive(Component, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Stats {
    pub strength: i32,
    pub dexterity: i32,
    pub agility: i32,
    pub constitution: i32,
    pub wisdom: i32,
    pub intelligence: i32,
    pub charisma: i32,
}

impl Stats {
    pub fn new() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            agility: 10,
            constitution: 10,
            wisdom: 10,
            intelligence: 10,
            charisma: 10,
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}
