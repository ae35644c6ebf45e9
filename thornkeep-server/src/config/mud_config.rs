use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

/// Runtime-adjustable gameplay config, read and written through the admin
/// `GET/POST /mud-config` endpoint (§6). Grounded on the teacher's
/// `GameConfig` resource, generalized to the knobs this spec's systems use.
#[derive(Clone, Debug, Resource, Serialize, Deserialize)]
pub struct MudConfig {
    pub enable_npc_spawns: bool,
    pub enable_monster_respawns: bool,
    pub idle_timeout_seconds: u64,
    pub idle_check_interval_seconds: u64,
    pub transfer_timeout_seconds: u64,
    pub slow_writer_timeout_seconds: u64,
    pub save_interval_ticks: u64,
}

impl Default for MudConfig {
    fn default() -> Self {
        Self {
            enable_npc_spawns: true,
            enable_monster_respawns: true,
            idle_timeout_seconds: 15 * 60,
            idle_check_interval_seconds: 60,
            transfer_timeout_seconds: 30,
            slow_writer_timeout_seconds: 10,
            save_interval_ticks: 150,
        }
    }
}

/// The `GET/POST /gametimer-config` surface: the tick interval itself.
#[derive(Clone, Copy, Debug, Resource, Serialize, Deserialize)]
pub struct GametimerConfig {
    pub tick_interval_ms: u64,
    pub paused: bool,
}

impl Default for GametimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2000,
            paused: false,
        }
    }
}
