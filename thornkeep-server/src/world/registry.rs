use std::collections::HashMap;

use bevy_ecs::prelude::{Bundle, Entity, Resource, World};
use thiserror::Error;

use thornkeep_common::components::{Location, PlayerId, RoomState};
use thornkeep_data::{ItemInstanceId, NpcInstanceId, RoomId, UserId};

use crate::config::{GametimerConfig, MudConfig};

use super::effects::EffectIdAllocator;
use super::outbox::Outbox;
use super::systems::respawn::RespawnQueue;
use super::tick::GameTick;
use super::{BugReports, KickRequests, ShutdownRequested};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate id: {0}")]
    DuplicateId(String),
    #[error("room not found: {0}")]
    RoomNotFound(RoomId),
    #[error("user not found: {0}")]
    UserNotFound(UserId),
}

/// The id→`Entity` tables, stored as a plain `bevy_ecs` resource so the tick
/// engine's systems can resolve a `CombatTarget`/aggression entry back to an
/// entity without reaching outside the `World`, mirroring the teacher's
/// `ClientEntityList` resource.
#[derive(Resource, Default)]
pub struct WorldIndex {
    rooms: HashMap<RoomId, Entity>,
    users: HashMap<UserId, Entity>,
    item_instances: HashMap<ItemInstanceId, Entity>,
    npc_instances: HashMap<NpcInstanceId, Entity>,
}

impl WorldIndex {
    pub fn room_entity(&self, room_id: &RoomId) -> Option<Entity> {
        self.rooms.get(room_id).copied()
    }

    pub fn user_entity(&self, user_id: &UserId) -> Option<Entity> {
        self.users.get(user_id).copied()
    }

    pub fn npc_instance_entity(&self, instance_id: &NpcInstanceId) -> Option<Entity> {
        self.npc_instances.get(instance_id).copied()
    }

    pub fn item_instance_entity(&self, instance_id: &ItemInstanceId) -> Option<Entity> {
        self.item_instances.get(instance_id).copied()
    }

    pub fn room_ids(&self) -> impl Iterator<Item = &RoomId> {
        self.rooms.keys()
    }

    pub fn user_ids(&self) -> impl Iterator<Item = &UserId> {
        self.users.keys()
    }

    pub fn npc_instance_ids(&self) -> impl Iterator<Item = &NpcInstanceId> {
        self.npc_instances.keys()
    }

    /// Registers an entity spawned directly against the `World` (e.g. by
    /// `respawn_system`, which runs as an exclusive system without access to
    /// the outer `WorldRegistry`).
    pub fn insert_npc_instance(&mut self, instance_id: NpcInstanceId, entity: Entity) {
        self.npc_instances.insert(instance_id, entity);
    }

    pub fn remove_npc_instance_entry(&mut self, instance_id: &NpcInstanceId) -> Option<Entity> {
        self.npc_instances.remove(instance_id)
    }
}

/// Authoritative id→`Entity` tables over a `bevy_ecs::World`, grounded on the
/// teacher's `ClientEntityList`/`ZoneList` resources (§4.2). Every insertion
/// and removal goes through here so the indexes never drift from the ECS
/// storage they describe.
pub struct WorldRegistry {
    pub world: World,
}

impl WorldRegistry {
    /// Builds an empty world with the resources every system expects to
    /// find already present (`GameData` is inserted separately once content
    /// finishes loading, since it has no sensible empty default to run
    /// against).
    pub fn new() -> Self {
        let mut world = World::new();
        world.insert_resource(WorldIndex::default());
        world.insert_resource(GameTick::default());
        world.insert_resource(Outbox::default());
        world.insert_resource(EffectIdAllocator::default());
        world.insert_resource(RespawnQueue::default());
        world.insert_resource(BugReports::default());
        world.insert_resource(ShutdownRequested::default());
        world.insert_resource(KickRequests::default());
        world.insert_resource(MudConfig::default());
        world.insert_resource(GametimerConfig::default());
        Self { world }
    }

    fn index(&self) -> &WorldIndex {
        self.world.resource::<WorldIndex>()
    }

    pub fn spawn_room(&mut self, room_id: RoomId) -> Result<Entity, RegistryError> {
        if self.index().rooms.contains_key(&room_id) {
            return Err(RegistryError::DuplicateId(room_id.to_string()));
        }
        let entity = self.world.spawn(RoomState::new(room_id.clone())).id();
        self.world
            .resource_mut::<WorldIndex>()
            .rooms
            .insert(room_id, entity);
        Ok(entity)
    }

    pub fn spawn_user(
        &mut self,
        user_id: UserId,
        bundle: impl Bundle,
    ) -> Result<Entity, RegistryError> {
        if self.index().users.contains_key(&user_id) {
            return Err(RegistryError::DuplicateId(user_id.to_string()));
        }
        let entity = self.world.spawn((PlayerId(user_id.clone()), bundle)).id();
        self.world
            .resource_mut::<WorldIndex>()
            .users
            .insert(user_id, entity);
        Ok(entity)
    }

    pub fn remove_user(&mut self, user_id: &UserId) {
        let entity = self.world.resource_mut::<WorldIndex>().users.remove(user_id);
        if let Some(entity) = entity {
            self.world.despawn(entity);
        }
    }

    pub fn spawn_npc_instance(
        &mut self,
        instance_id: NpcInstanceId,
        bundle: impl Bundle,
    ) -> Result<Entity, RegistryError> {
        if self.index().npc_instances.contains_key(&instance_id) {
            return Err(RegistryError::DuplicateId(instance_id.to_string()));
        }
        let entity = self.world.spawn(bundle).id();
        self.world
            .resource_mut::<WorldIndex>()
            .npc_instances
            .insert(instance_id, entity);
        Ok(entity)
    }

    pub fn despawn_npc_instance(&mut self, instance_id: &NpcInstanceId) {
        let entity = self
            .world
            .resource_mut::<WorldIndex>()
            .npc_instances
            .remove(instance_id);
        if let Some(entity) = entity {
            self.world.despawn(entity);
        }
    }

    pub fn spawn_item_instance(
        &mut self,
        instance_id: ItemInstanceId,
        bundle: impl Bundle,
    ) -> Result<Entity, RegistryError> {
        if self.index().item_instances.contains_key(&instance_id) {
            return Err(RegistryError::DuplicateId(instance_id.to_string()));
        }
        let entity = self.world.spawn(bundle).id();
        self.world
            .resource_mut::<WorldIndex>()
            .item_instances
            .insert(instance_id, entity);
        Ok(entity)
    }

    pub fn remove_item_instance(&mut self, instance_id: &ItemInstanceId) {
        let entity = self
            .world
            .resource_mut::<WorldIndex>()
            .item_instances
            .remove(instance_id);
        if let Some(entity) = entity {
            self.world.despawn(entity);
        }
    }

    /// Moves a user into `to_room`, updating both the user's `Location` and
    /// the inverse index on each room's `RoomState` atomically (§4.2 "move
    /// atomicity").
    pub fn move_user(&mut self, user_id: &UserId, to_room: RoomId) -> Result<(), RegistryError> {
        let user_entity = self
            .index()
            .user_entity(user_id)
            .ok_or_else(|| RegistryError::UserNotFound(user_id.clone()))?;
        let to_room_entity = self
            .index()
            .room_entity(&to_room)
            .ok_or_else(|| RegistryError::RoomNotFound(to_room.clone()))?;

        let from_room = self
            .world
            .get::<Location>(user_entity)
            .map(|location| location.current_room_id.clone());

        if let Some(from_room) = from_room {
            if let Some(from_entity) = self.index().room_entity(&from_room) {
                if let Some(mut state) = self.world.get_mut::<RoomState>(from_entity) {
                    state.remove_player(user_id);
                }
            }
        }

        if let Some(mut state) = self.world.get_mut::<RoomState>(to_room_entity) {
            state.add_player(user_id.clone());
        }
        if let Some(mut location) = self.world.get_mut::<Location>(user_entity) {
            location.current_room_id = to_room;
        }
        Ok(())
    }
}

impl Default for WorldRegistry {
    fn default() -> Self {
        Self::new()
    }
}
