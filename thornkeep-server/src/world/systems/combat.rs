use bevy_ecs::prelude::Entity;
use bevy_ecs::world::World;
use rand::Rng;

use thornkeep_common::components::{
    ActiveEffects, AggressionTable, Combatant, CombatTarget, Equipment, HealthPoints, ItemInstance,
    NpcInstance, PlayerId, Progression, ResourcePoints, RoomState, StateFlags, Stats,
};
use thornkeep_data::{EquipmentSlot, ResourceKind};

use crate::world::effects::{apply_effect, instantiate_proc, EffectIdAllocator};
use crate::world::outbox::{Outbox, OutboundEvent};
use crate::world::registry::WorldIndex;
use crate::world::GameData;

use super::respawn::RespawnQueue;

struct CombatantView {
    entity: Entity,
    base_damage: i32,
    defense: i32,
    is_player: bool,
}

fn describe(world: &World, entity: Entity) -> CombatantView {
    if let Some(player_id) = world.get::<PlayerId>(entity) {
        let _ = player_id;
        let stats = world.get::<Stats>(entity).copied().unwrap_or(Stats::new());
        CombatantView {
            entity,
            base_damage: 5 + stats.strength / 2,
            defense: stats.constitution / 5,
            is_player: true,
        }
    } else {
        let template = world
            .get::<NpcInstance>(entity)
            .and_then(|npc| world.resource::<GameData>().npc_templates.get(&npc.template_id).cloned());
        let (base_damage, defense) = match template {
            Some(template) => (
                template.roll_damage(&mut rand::thread_rng()),
                template.defense,
            ),
            None => (1, 0),
        };
        CombatantView {
            entity,
            base_damage,
            defense,
            is_player: false,
        }
    }
}

fn active_effect_reduction(world: &World, entity: Entity) -> i32 {
    world
        .get::<ActiveEffects>(entity)
        .map(|effects| {
            effects
                .0
                .iter()
                .filter(|effect| {
                    matches!(
                        effect.effect_type,
                        thornkeep_data::EffectType::DamageReduction | thornkeep_data::EffectType::Absorb
                    )
                })
                .map(|effect| effect.payload.magnitude())
                .sum::<i32>()
        })
        .unwrap_or(0)
}

fn agility(world: &World, entity: Entity) -> i32 {
    world.get::<Stats>(entity).map(|stats| stats.agility).unwrap_or(10)
}

/// The effect, if any, `entity`'s equipped main-hand weapon procs on a
/// successful hit (§4.8).
fn weapon_proc(world: &World, entity: Entity) -> Option<thornkeep_data::EffectProc> {
    let item_instance_id = world.get::<Equipment>(entity)?.get(EquipmentSlot::MainHand)?;
    let item_entity = world.resource::<WorldIndex>().item_instance_entity(item_instance_id)?;
    let template_id = &world.get::<ItemInstance>(item_entity)?.template_id;
    world
        .resource::<GameData>()
        .item_templates
        .get(template_id)?
        .proc_effect
        .clone()
}

/// A stable string identity for effect `target_id`/`source_id` fields,
/// distinguishing a player's `UserId` from an NPC instance's id.
fn effect_identity(world: &World, entity: Entity) -> String {
    if let Some(player_id) = world.get::<PlayerId>(entity) {
        player_id.0.to_string()
    } else if let Some(npc) = world.get::<NpcInstance>(entity) {
        npc.instance_id.to_string()
    } else {
        "unknown".to_string()
    }
}

/// §4.6: advances every engaged pair by one combat round.
pub fn combat_system(world: &mut World) {
    let mut rng = rand::thread_rng();

    let pairs: Vec<(Entity, Entity)> = {
        let mut query = world.query::<(Entity, &Combatant)>();
        let mut seen = std::collections::HashSet::new();
        let mut pairs = Vec::new();
        for (entity, combatant) in query.iter(world) {
            let Some(opponent) = resolve_target(world, &combatant.opponent) else {
                continue;
            };
            let key = if entity < opponent {
                (entity, opponent)
            } else {
                (opponent, entity)
            };
            if seen.insert(key) {
                pairs.push(key);
            }
        }
        pairs
    };

    for (a, b) in pairs {
        // Either side may have died/disengaged from an earlier pair in this
        // same pass (e.g. an NPC with multiple attackers in its aggression
        // table but only one active `Combatant` pointer at a time).
        if world.get::<Combatant>(a).is_none() || world.get::<Combatant>(b).is_none() {
            continue;
        }

        let (first, second) = if agility(world, a) + rng.gen_range(0..5)
            >= agility(world, b) + rng.gen_range(0..5)
        {
            (a, b)
        } else {
            (b, a)
        };

        resolve_attack(world, first, second, &mut rng);
        if world.get::<HealthPoints>(second).map(|hp| hp.current > 0).unwrap_or(false) {
            resolve_attack(world, second, first, &mut rng);
        }
    }
}

fn resolve_target(world: &World, target: &CombatTarget) -> Option<Entity> {
    let index = world.resource::<WorldIndex>();
    match target {
        CombatTarget::User(user_id) => index.user_entity(user_id),
        CombatTarget::Npc(instance_id) => index.npc_instance_entity(instance_id),
    }
}

fn resolve_attack(world: &mut World, attacker: Entity, defender: Entity, rng: &mut impl Rng) {
    let attacker_view = describe(world, attacker);
    let defender_view = describe(world, defender);
    let reduction = active_effect_reduction(world, defender);
    let jitter = rng.gen_range(-2..=2);
    let damage = (attacker_view.base_damage + jitter - defender_view.defense - reduction).max(1);

    let applied = world
        .get_mut::<HealthPoints>(defender)
        .map(|mut hp| -hp.apply_delta(-damage))
        .unwrap_or(0);

    on_damage_dealt(world, attacker);
    on_damage_taken(world, defender);

    if let (Some(attacker_user), false) = (world.get::<PlayerId>(attacker).map(|p| p.0.clone()), defender_view.is_player) {
        if let Some(mut table) = world.get_mut::<AggressionTable>(defender) {
            table.record_damage(attacker_user, applied);
        }
    }

    let defender_dead = world
        .get::<HealthPoints>(defender)
        .map(|hp| hp.current <= 0)
        .unwrap_or(false);

    if applied > 0 && !defender_dead {
        if let Some(proc) = weapon_proc(world, attacker) {
            let target_id = effect_identity(world, defender);
            let source_id = Some(effect_identity(world, attacker));
            let is_player_effect = defender_view.is_player;
            let active_effect = {
                let mut allocator = world.resource_mut::<EffectIdAllocator>();
                instantiate_proc(&mut allocator, &proc, target_id, source_id, is_player_effect)
            };
            if let Some(mut effects) = world.get_mut::<ActiveEffects>(defender) {
                apply_effect(&mut effects, active_effect);
            }
        }
    }

    if defender_dead {
        if defender_view.is_player {
            handle_user_unconscious(world, defender);
        } else {
            // despawns `defender`; its `Combatant` goes with it
            handle_npc_death(world, defender);
        }
        if world.get_entity(attacker).is_some() {
            world.entity_mut(attacker).remove::<Combatant>();
        }
        if world.get_entity(defender).is_some() {
            world.entity_mut(defender).remove::<Combatant>();
        }
    }
}

fn on_damage_dealt(world: &mut World, entity: Entity) {
    if let Some(mut resource) = world.get_mut::<ResourcePoints>(entity) {
        if resource.kind == ResourceKind::Rage {
            resource.apply_delta(10);
        }
    }
}

fn on_damage_taken(world: &mut World, entity: Entity) {
    if let Some(mut resource) = world.get_mut::<ResourcePoints>(entity) {
        if resource.kind == ResourceKind::Rage {
            resource.apply_delta(15);
        }
    }
}

fn handle_user_unconscious(world: &mut World, entity: Entity) {
    let user_id = world.get::<PlayerId>(entity).map(|p| p.0.clone());
    if let Some(mut flags) = world.get_mut::<StateFlags>(entity) {
        flags.is_unconscious = true;
        flags.in_combat = false;
    }
    if let Some(user_id) = &user_id {
        let mut query = world.query::<&mut AggressionTable>();
        for mut table in query.iter_mut(world) {
            table.clear_attacker(user_id);
        }
        world.resource_mut::<Outbox>().push(OutboundEvent::ToUser(
            user_id.clone(),
            "You collapse, unconscious.".to_string(),
        ));
    }
}

fn handle_npc_death(world: &mut World, entity: Entity) {
    let Some(npc) = world.get::<NpcInstance>(entity).cloned() else {
        return;
    };
    let template = world
        .resource::<GameData>()
        .npc_templates
        .get(&npc.template_id)
        .cloned();
    let Some(template) = template else { return };

    let shares = world
        .get::<AggressionTable>(entity)
        .map(|table| table.xp_shares(template.xp_value))
        .unwrap_or_default();

    let death_message = template
        .death_messages
        .first()
        .cloned()
        .unwrap_or_else(|| format!("{} dies.", template.name));

    for (user_id, xp) in shares {
        if let Some(user_entity) = world.resource::<WorldIndex>().user_entity(&user_id) {
            if let Some(mut progression) = world.get_mut::<Progression>(user_entity) {
                progression.experience += xp as u64;
            }
        }
        world.resource_mut::<Outbox>().push(OutboundEvent::ToUser(
            user_id,
            format!("{death_message} You gain {xp} experience."),
        ));
    }

    world
        .resource_mut::<RespawnQueue>()
        .queue(npc.template_id, npc.home_room_id, template.respawn_ticks);

    world
        .resource_mut::<WorldIndex>()
        .remove_npc_instance_entry(&npc.instance_id);
    if let Some(room_entity) = world.resource::<WorldIndex>().room_entity(&npc.home_room_id) {
        if let Some(mut room_state) = world.get_mut::<RoomState>(room_entity) {
            room_state.spawned_npcs.retain(|id| id != &npc.instance_id);
        }
    }
    world.despawn(entity);
}
