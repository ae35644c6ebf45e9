mod combat;
mod command_history;
mod cooldowns;
mod currency;
mod effect_instance;
mod flags;
mod identity;
mod inventory;
mod item_instance;
mod npc_instance;
mod room_state;
mod stats;
mod vitals;

pub use combat::{CombatTarget, Combatant};
pub use command_history::CommandHistory;
pub use cooldowns::Cooldowns;
pub use currency::Currency;
pub use effect_instance::{ActiveEffect, ActiveEffects, EffectMetadata, EffectPayload};
pub use inventory::{Equipment, Inventory};
pub use flags::{AuthFlags, StateFlags};
pub use identity::{
    Bookkeeping, ClassRace, Credentials, Location, PendingAdminMessages, PlayerId, Progression,
};
pub use item_instance::{AuditEntry, ItemInstance};
pub use npc_instance::{AggressionTable, NpcInstance, PendingRespawn};
pub use room_state::RoomState;
pub use stats::Stats;
pub use vitals::{HealthPoints, ManaPoints, ResourcePoints};
