pub mod autosave;
pub mod combat;
pub mod cooldowns;
pub mod effect_tick;
pub mod npc_ai;
pub mod resource_regen;
pub mod respawn;
pub mod vitals_regen;
