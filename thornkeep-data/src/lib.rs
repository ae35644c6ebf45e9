//! Static world content: the template-side of every template/instance split
//! described by the world data model. Nothing in this crate is mutated at
//! runtime; mutable, per-object state lives in `thornkeep-common` instead.

mod class;
mod effect;
mod ids;
mod item;
mod npc;
mod room;

pub use class::{ClassDefinition, ResourceKind};
pub use effect::{EffectStackingBehaviour, EffectType};
pub use ids::{
    AbilityId, AreaId, ClassId, ItemInstanceId, ItemTemplateId, NpcInstanceId, NpcTemplateId,
    RaceId, RoomId, UserId,
};
pub use item::{EffectProc, EquipmentSlot, ItemTemplate, ItemType, StatBonus};
pub use npc::{NpcTemplate, StockEntry};
pub use room::{Direction, RoomExit, RoomFlags, RoomTemplate};
