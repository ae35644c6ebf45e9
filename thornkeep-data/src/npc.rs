use serde::{Deserialize, Serialize};

use crate::{ItemTemplateId, NpcTemplateId, RoomId};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StockEntry {
    pub item_id: ItemTemplateId,
    pub price: u32,
    pub unlimited: bool,
    pub quantity: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NpcTemplate {
    pub id: NpcTemplateId,
    pub name: String,
    pub description: String,
    /// The room this NPC is instantiated into at world load and returns to
    /// on respawn (§4.5 step 5).
    pub home_room_id: RoomId,
    pub max_health: i32,
    pub damage_min: i32,
    pub damage_max: i32,
    pub defense: i32,
    pub is_hostile: bool,
    /// If true, an attack on this NPC is not retaliated against once the
    /// current tick ends (but is not ignored during the tick it lands on).
    pub is_passive_retaliator: bool,
    pub xp_value: u32,
    pub attack_texts: Vec<String>,
    pub death_messages: Vec<String>,
    pub is_merchant: bool,
    pub stock: Vec<StockEntry>,
    pub respawn_ticks: u32,
}

impl NpcTemplate {
    pub fn roll_damage(&self, rng: &mut impl rand::Rng) -> i32 {
        if self.damage_max <= self.damage_min {
            self.damage_min
        } else {
            rng.gen_range(self.damage_min..=self.damage_max)
        }
    }
}
