use bevy_ecs::world::World;

use thornkeep_common::components::{Combatant, CombatTarget, NpcInstance, RoomState, StateFlags};

use crate::world::outbox::{Outbox, OutboundEvent};
use crate::world::registry::WorldIndex;
use crate::world::GameData;

/// §4.6 point 5: a hostile NPC with nobody currently fighting it engages the
/// first eligible (conscious, not already fighting) user in its room.
/// Non-hostile NPCs never self-initiate; passive-retaliator NPCs only fight
/// back within the tick they were attacked, which `combat_system` already
/// enforces by never creating a `Combatant` here for them.
pub fn npc_ai_system(world: &mut World) {
    let npc_instance_ids: Vec<_> = world
        .resource::<WorldIndex>()
        .npc_instance_ids()
        .cloned()
        .collect();

    for instance_id in npc_instance_ids {
        let Some(npc_entity) = world.resource::<WorldIndex>().npc_instance_entity(&instance_id) else {
            continue;
        };
        if world.get::<Combatant>(npc_entity).is_some() {
            continue;
        }
        let Some(npc) = world.get::<NpcInstance>(npc_entity).cloned() else {
            continue;
        };
        let is_hostile = world
            .resource::<GameData>()
            .npc_templates
            .get(&npc.template_id)
            .map(|template| template.is_hostile)
            .unwrap_or(false);
        if !is_hostile {
            continue;
        }

        let Some(room_entity) = world.resource::<WorldIndex>().room_entity(&npc.room_id) else {
            continue;
        };
        let players: Vec<_> = world
            .get::<RoomState>(room_entity)
            .map(|state| state.players.clone())
            .unwrap_or_default();

        for user_id in players {
            let Some(user_entity) = world.resource::<WorldIndex>().user_entity(&user_id) else {
                continue;
            };
            let eligible = world
                .get::<StateFlags>(user_entity)
                .map(|flags| !flags.is_unconscious)
                .unwrap_or(false)
                && world.get::<Combatant>(user_entity).is_none();
            if !eligible {
                continue;
            }

            world.entity_mut(npc_entity).insert(Combatant {
                opponent: CombatTarget::User(user_id.clone()),
            });
            world.entity_mut(user_entity).insert(Combatant {
                opponent: CombatTarget::Npc(instance_id.clone()),
            });
            world.resource_mut::<Outbox>().push(OutboundEvent::ToUser(
                user_id,
                "A hostile creature attacks you!".to_string(),
            ));
            break;
        }
    }
}
