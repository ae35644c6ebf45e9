//! Named collections passed to `PersistenceBackend`, one per persisted
//! aggregate (§4.1).

pub const USERS: &str = "users";
pub const ROOMS: &str = "rooms";
pub const ROOM_STATE: &str = "room_state";
pub const ITEM_TEMPLATES: &str = "item_templates";
pub const ITEM_INSTANCES: &str = "item_instances";
pub const NPC_TEMPLATES: &str = "npc_templates";
pub const AREAS: &str = "areas";
pub const ABILITIES: &str = "abilities";
pub const QUESTS: &str = "quests";
pub const ADMIN: &str = "admin";
pub const BUG_REPORTS: &str = "bug_reports";
pub const MUD_CONFIG: &str = "mud_config";
pub const GAMETIMER_CONFIG: &str = "gametimer_config";
pub const SNAKE_SCORES: &str = "snake_scores";

/// Singleton key used for collections that only ever hold one record
/// (the two config blobs).
pub const SINGLETON_KEY: &str = "singleton";
