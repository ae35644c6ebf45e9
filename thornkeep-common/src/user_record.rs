use serde::{Deserialize, Serialize};

use thornkeep_data::{ClassId, RaceId, RoomId, UserId};

use crate::components::{
    ActiveEffects, AuthFlags, Bookkeeping, CommandHistory, Equipment, Inventory, ManaPoints,
    PendingAdminMessages, Progression, ResourcePoints, StateFlags, Stats,
};
use crate::password::PasswordHash;

/// The full persisted shape of a user, assembled from ECS components on
/// save and used to repopulate them on load — the teacher's
/// `CharacterStorage` plays the same role for `rose-offline-server`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: UserId,
    pub password: PasswordHash,
    pub health: i32,
    pub max_health: i32,
    pub mana: ManaPoints,
    pub resource: ResourcePoints,
    pub progression: Progression,
    pub stats: Stats,
    pub current_room_id: RoomId,
    pub inventory: Inventory,
    pub equipment: Equipment,
    pub class_id: ClassId,
    pub race_id: RaceId,
    pub state_flags: StateFlags,
    pub bookkeeping: Bookkeeping,
    pub command_history: CommandHistory,
    pub pending_admin_messages: PendingAdminMessages,
    pub auth_flags: AuthFlags,
    #[serde(default)]
    pub active_effects: ActiveEffects,
}

impl UserRecord {
    pub fn new(
        user_id: UserId,
        password: PasswordHash,
        starting_room_id: RoomId,
        class_id: ClassId,
        race_id: RaceId,
        max_health: i32,
        mana: ManaPoints,
        resource: ResourcePoints,
        stats: Stats,
    ) -> Self {
        Self {
            user_id,
            password,
            health: max_health,
            max_health,
            mana,
            resource,
            progression: Progression::new(),
            stats,
            current_room_id: starting_room_id,
            inventory: Inventory::new(),
            equipment: Equipment::new(),
            class_id,
            race_id,
            state_flags: StateFlags::default(),
            bookkeeping: Bookkeeping::new(),
            command_history: CommandHistory::default(),
            pending_admin_messages: PendingAdminMessages::default(),
            auth_flags: AuthFlags::empty(),
            active_effects: ActiveEffects::default(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.auth_flags.contains(AuthFlags::ADMIN)
    }

    pub fn is_banned(&self) -> bool {
        self.auth_flags.contains(AuthFlags::BANNED)
    }
}
