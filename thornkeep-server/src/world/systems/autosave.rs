use bevy_ecs::prelude::{Bundle, Entity, World};

use thornkeep_common::components::{
    ActiveEffects, AuthFlags, Bookkeeping, ClassRace, CommandHistory, Credentials, Equipment,
    HealthPoints, Inventory, Location, ManaPoints, PendingAdminMessages, Progression,
    ResourcePoints, RoomState, StateFlags, Stats,
};
use thornkeep_common::UserRecord;

use crate::world::registry::WorldIndex;

/// Gates autosave cadence against the logical clock (§4.5 step 7). Grounded
/// on the teacher's `SaveGameSystem`, which compares a stored tick count
/// against a configured interval rather than wall-clock time, so saves line
/// up with the deterministic tick stream under `test_mode`.
pub struct AutosaveTicker {
    interval_ticks: u64,
    last_save_tick: u64,
}

impl AutosaveTicker {
    pub fn new(interval_ticks: u64) -> Self {
        Self {
            interval_ticks,
            last_save_tick: 0,
        }
    }

    pub fn due(&mut self, current_tick: u64) -> bool {
        if self.interval_ticks == 0 {
            return false;
        }
        if current_tick.saturating_sub(self.last_save_tick) >= self.interval_ticks {
            self.last_save_tick = current_tick;
            true
        } else {
            false
        }
    }
}

/// Reassembles the nested-tuple `Bundle` a freshly loaded user is spawned
/// with. Nested rather than flat because a single tuple's `Bundle` impl in
/// `bevy_ecs` tops out well under the number of components a user carries.
pub fn user_bundle(record: UserRecord) -> impl Bundle {
    (
        (
            Credentials {
                username: record.user_id.as_str().to_string(),
                password: record.password,
            },
            ClassRace {
                class_id: record.class_id,
                race_id: record.race_id,
            },
            Location {
                current_room_id: record.current_room_id,
            },
            record.stats,
            HealthPoints {
                current: record.health,
                max: record.max_health,
            },
            record.mana,
            record.resource,
        ),
        (
            record.progression,
            record.inventory,
            record.equipment,
            record.state_flags,
            record.bookkeeping,
            record.command_history,
            record.pending_admin_messages,
            record.auth_flags,
            record.active_effects,
        ),
    )
}

/// Reads a user entity's components back into its persisted shape.
/// Returns `None` if `entity` is missing any component a user must carry,
/// which would indicate a bug elsewhere rather than a legitimate NPC/room
/// entity being passed in.
pub fn snapshot_user(world: &World, entity: Entity) -> Option<UserRecord> {
    let credentials = world.get::<Credentials>(entity)?;
    let class_race = world.get::<ClassRace>(entity)?;
    let location = world.get::<Location>(entity)?;
    let stats = world.get::<Stats>(entity)?;
    let health = world.get::<HealthPoints>(entity)?;
    let mana = world.get::<ManaPoints>(entity)?;
    let resource = world.get::<ResourcePoints>(entity)?;
    let progression = world.get::<Progression>(entity)?;
    let inventory = world.get::<Inventory>(entity)?;
    let equipment = world.get::<Equipment>(entity)?;
    let state_flags = world.get::<StateFlags>(entity)?;
    let bookkeeping = world.get::<Bookkeeping>(entity)?;
    let command_history = world.get::<CommandHistory>(entity)?;
    let pending_admin_messages = world.get::<PendingAdminMessages>(entity)?;
    let auth_flags = world.get::<AuthFlags>(entity)?;
    let active_effects = world.get::<ActiveEffects>(entity)?;

    Some(UserRecord {
        user_id: thornkeep_data::UserId::new(&credentials.username),
        password: credentials.password.clone(),
        health: health.current,
        max_health: health.max,
        mana: *mana,
        resource: *resource,
        progression: progression.clone(),
        stats: *stats,
        current_room_id: location.current_room_id.clone(),
        inventory: inventory.clone(),
        equipment: equipment.clone(),
        class_id: class_race.class_id.clone(),
        race_id: class_race.race_id.clone(),
        state_flags: state_flags.clone(),
        bookkeeping: bookkeeping.clone(),
        command_history: command_history.clone(),
        pending_admin_messages: pending_admin_messages.clone(),
        auth_flags: *auth_flags,
        active_effects: active_effects.clone(),
    })
}

/// Snapshots every connected user for `PersistenceStore::save_all_typed`.
pub fn snapshot_all_users(world: &World, index: &WorldIndex) -> Vec<UserRecord> {
    index
        .user_ids()
        .filter_map(|user_id| {
            let entity = index.user_entity(user_id)?;
            snapshot_user(world, entity)
        })
        .collect()
}

/// Snapshots every room's mutable runtime state (floor items, currency
/// pile, spawned NPCs) for `PersistenceStore::save_all_typed`. Room
/// occupancy is not persisted: on restart no session holds a room yet, so
/// `players` is cleared to avoid resurrecting stale entries.
pub fn snapshot_all_rooms(world: &World, index: &WorldIndex) -> Vec<RoomState> {
    index
        .room_ids()
        .filter_map(|room_id| {
            let entity = index.room_entity(room_id)?;
            let mut state = world.get::<RoomState>(entity)?.clone();
            state.players.clear();
            Some(state)
        })
        .collect()
}
