use bevy_ecs::prelude::Resource;
use bevy_ecs::world::World;

use thornkeep_common::components::{
    ActiveEffects, AggressionTable, HealthPoints, NpcInstance, PendingRespawn, RoomState,
};
use thornkeep_data::{NpcTemplateId, RoomId};

use crate::world::tick::GameTick;
use crate::world::GameData;

use super::super::registry::WorldIndex;

/// Pending NPC respawns, simplified from the teacher's `monster_spawn_system`
/// tactics-value formula (which balances spawn groups against a zone's
/// configured monster population) down to one countdown per despawned
/// instance, per §4.5 step 5 / spec §9 ("restate dynamic tables as simple
/// per-owner state").
#[derive(Resource, Default)]
pub struct RespawnQueue(pub Vec<PendingRespawn>);

impl RespawnQueue {
    pub fn queue(&mut self, template_id: NpcTemplateId, home_room_id: RoomId, respawn_ticks: u32) {
        self.0.push(PendingRespawn {
            template_id,
            home_room_id,
            remaining_ticks: respawn_ticks,
        });
    }
}

/// §4.5 step 5: decrements every queued respawn and instantiates any that
/// reach zero back into their home room.
pub fn respawn_system(world: &mut World) {
    let ready: Vec<PendingRespawn> = {
        let mut queue = world.resource_mut::<RespawnQueue>();
        for pending in queue.0.iter_mut() {
            pending.remaining_ticks = pending.remaining_ticks.saturating_sub(1);
        }
        let (ready, still_pending): (Vec<_>, Vec<_>) = queue
            .0
            .drain(..)
            .partition(|pending| pending.remaining_ticks == 0);
        queue.0 = still_pending;
        ready
    };

    for pending in ready {
        let Some(template) = world
            .resource::<GameData>()
            .npc_templates
            .get(&pending.template_id)
            .cloned()
        else {
            continue;
        };

        let current_tick = world.resource::<GameTick>().0;
        let instance_id = thornkeep_data::NpcInstanceId(format!(
            "{}-{}",
            pending.template_id.as_str(),
            current_tick
        ));

        let instance = NpcInstance::new(
            instance_id.clone(),
            pending.template_id.clone(),
            pending.home_room_id.clone(),
        );
        let entity = world
            .spawn((
                instance,
                HealthPoints::new(template.max_health),
                AggressionTable::default(),
                ActiveEffects::default(),
            ))
            .id();

        world
            .resource_mut::<WorldIndex>()
            .insert_npc_instance(instance_id.clone(), entity);

        if let Some(room_entity) = world.resource::<WorldIndex>().room_entity(&pending.home_room_id) {
            if let Some(mut room_state) = world.get_mut::<RoomState>(room_entity) {
                room_state.spawned_npcs.push(instance_id);
            }
        }
    }
}
