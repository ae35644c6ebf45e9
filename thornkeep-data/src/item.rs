use enum_map::Enum;
use serde::{Deserialize, Serialize};

use crate::{EffectStackingBehaviour, EffectType, ItemTemplateId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Head,
    Neck,
    Chest,
    Hands,
    Legs,
    Feet,
    MainHand,
    OffHand,
    Ring,
    Trinket,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    Weapon,
    Armor,
    Consumable,
    Quest,
    Misc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatBonus {
    Strength(i32),
    Dexterity(i32),
    Agility(i32),
    Constitution(i32),
    Wisdom(i32),
    Intelligence(i32),
    Charisma(i32),
    MaxHealth(i32),
    MaxMana(i32),
    MaxResource(i32),
}

/// An effect a weapon procs on a successful hit, or a consumable grants on
/// use (§4.8 "created by a cast/proc/hit"). Kept as a flat descriptor here
/// rather than reusing `ActiveEffect` directly since this crate holds only
/// static template data — the runtime shape (instance id, remaining ticks,
/// target) is assembled from this template each time the proc fires.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EffectProc {
    pub effect_type: EffectType,
    pub name: String,
    pub duration_ticks: u32,
    pub tick_interval: u32,
    pub magnitude: i32,
    pub stacking_behaviour: EffectStackingBehaviour,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub id: ItemTemplateId,
    pub name: String,
    pub description: String,
    pub item_type: ItemType,
    pub slot: Option<EquipmentSlot>,
    pub base_value: u32,
    pub weight: Option<u32>,
    pub stat_bonuses: Vec<StatBonus>,
    pub level_requirement: u32,
    pub class_requirement: Option<crate::ClassId>,
    /// Weapons: applied to the defender on a successful hit. Consumables:
    /// applied to the user on `use`. `None` for everything else.
    #[serde(default)]
    pub proc_effect: Option<EffectProc>,
}

impl ItemTemplate {
    pub fn is_equippable(&self) -> bool {
        self.slot.is_some()
    }

    pub fn meets_wear_requirements(&self, level: u32, class_id: Option<&crate::ClassId>) -> bool {
        if level < self.level_requirement {
            return false;
        }
        match (&self.class_requirement, class_id) {
            (Some(required), Some(actual)) => required == actual,
            (Some(_), None) => false,
            (None, _) => true,
        }
    }
}
