use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

#[derive(Component, Clone, Debug, Default, Serialize, Deserialize)]
pub struct StateFlags {
    pub in_combat: bool,
    pub is_unconscious: bool,
    pub is_resting: bool,
    pub is_meditating: bool,
    pub movement_restricted: Option<String>,
    pub is_sneaking: bool,
    pub is_hiding: bool,
}

impl StateFlags {
    pub fn can_move(&self) -> bool {
        self.movement_restricted.is_none() && !self.is_unconscious
    }

    pub fn can_fight(&self) -> bool {
        !self.is_unconscious
    }

    pub fn break_rest(&mut self) {
        self.is_resting = false;
        self.is_meditating = false;
    }
}

bitflags::bitflags! {
    #[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct AuthFlags: u32 {
        const ADMIN   = 0b001;
        const BUILDER = 0b010;
        const BANNED  = 0b100;
    }
}
