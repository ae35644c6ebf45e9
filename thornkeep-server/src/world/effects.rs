use bevy_ecs::prelude::Resource;

use thornkeep_common::components::{ActiveEffect, ActiveEffects, EffectPayload};
use thornkeep_data::{EffectProc, EffectStackingBehaviour, EffectType};

/// Monotonic counter behind every freshly-created effect's `instance_id`,
/// grounded on the teacher's per-process unique id counters.
#[derive(Resource, Default)]
pub struct EffectIdAllocator(u64);

impl EffectIdAllocator {
    pub fn next(&mut self) -> String {
        self.0 += 1;
        format!("effect-{}", self.0)
    }
}

/// Builds the runtime [`ActiveEffect`] a weapon/consumable's [`EffectProc`]
/// describes (§4.8 "created by a cast/proc/hit"). `magnitude` becomes
/// damage-per-tick or heal-per-tick depending on the effect's category;
/// other effect types carry no periodic payload of their own yet and rely
/// purely on `effect_type` for combat-system checks (e.g. DAMAGE_REDUCTION).
pub fn instantiate_proc(
    allocator: &mut EffectIdAllocator,
    proc: &EffectProc,
    target_id: String,
    source_id: Option<String>,
    is_player_effect: bool,
) -> ActiveEffect {
    let mut payload = EffectPayload::default();
    match proc.effect_type {
        EffectType::Poison | EffectType::DamageOverTime | EffectType::Bleed => {
            payload.damage_per_tick = proc.magnitude;
        }
        EffectType::Regen | EffectType::HealOverTime => {
            payload.heal_per_tick = proc.magnitude;
        }
        EffectType::MovementBlock => payload.block_movement = true,
        EffectType::Stun | EffectType::Fear | EffectType::Silence => payload.block_combat = true,
        _ => {}
    }

    ActiveEffect {
        instance_id: allocator.next(),
        effect_type: proc.effect_type,
        name: proc.name.clone(),
        description: format!("{} effect", proc.name),
        duration_ticks: proc.duration_ticks,
        remaining_ticks: proc.duration_ticks,
        is_time_based: false,
        tick_interval: proc.tick_interval.max(1),
        last_tick_applied: 0,
        payload,
        target_id,
        is_player_effect,
        source_id,
        stacking_behaviour: proc.stacking_behaviour,
    }
}

/// Applies `incoming` to `effects`, resolving a same-type collision per the
/// stacking rule on the incoming effect (§4.8). No-op against other targets.
pub fn apply_effect(effects: &mut ActiveEffects, incoming: ActiveEffect) {
    let Some(index) = effects.find_by_type(incoming.effect_type) else {
        effects.0.push(incoming);
        return;
    };

    match incoming.stacking_behaviour {
        EffectStackingBehaviour::Ignore => {}
        EffectStackingBehaviour::Replace => {
            effects.0[index] = incoming;
        }
        EffectStackingBehaviour::Refresh => {
            let duration = effects.0[index].duration_ticks;
            effects.0[index].remaining_ticks = duration;
        }
        EffectStackingBehaviour::StackDuration => {
            effects.0[index].duration_ticks += incoming.duration_ticks;
            effects.0[index].remaining_ticks += incoming.remaining_ticks;
        }
        EffectStackingBehaviour::StackIntensity => {
            effects.0.push(incoming);
        }
        EffectStackingBehaviour::StrongestWins => {
            if incoming.payload.magnitude() > effects.0[index].payload.magnitude() {
                effects.0[index] = incoming;
            }
        }
    }
}

/// Removes one effect by instance id in O(1) amortized (linear scan over a
/// small per-entity list, no secondary index needed at this scale).
pub fn remove_effect(effects: &mut ActiveEffects, instance_id: &str) -> Option<ActiveEffect> {
    effects.remove_by_instance_id(instance_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use thornkeep_common::components::EffectPayload;
    use thornkeep_data::EffectType;

    fn effect(stacking: EffectStackingBehaviour, magnitude: i32) -> ActiveEffect {
        ActiveEffect {
            instance_id: "e".into(),
            effect_type: EffectType::Poison,
            name: "Poison".into(),
            description: String::new(),
            duration_ticks: 5,
            remaining_ticks: 5,
            is_time_based: false,
            tick_interval: 1,
            last_tick_applied: 0,
            payload: EffectPayload {
                damage_per_tick: magnitude,
                ..Default::default()
            },
            target_id: "t".into(),
            is_player_effect: false,
            source_id: None,
            stacking_behaviour: stacking,
        }
    }

    #[test]
    fn ignore_keeps_existing() {
        let mut effects = ActiveEffects(vec![effect(EffectStackingBehaviour::Ignore, 3)]);
        apply_effect(&mut effects, effect(EffectStackingBehaviour::Ignore, 9));
        assert_eq!(effects.0.len(), 1);
        assert_eq!(effects.0[0].payload.damage_per_tick, 3);
    }

    #[test]
    fn strongest_wins_keeps_larger_magnitude() {
        let mut effects = ActiveEffects(vec![effect(EffectStackingBehaviour::StrongestWins, 3)]);
        apply_effect(&mut effects, effect(EffectStackingBehaviour::StrongestWins, 9));
        assert_eq!(effects.0[0].payload.damage_per_tick, 9);

        apply_effect(&mut effects, effect(EffectStackingBehaviour::StrongestWins, 1));
        assert_eq!(effects.0[0].payload.damage_per_tick, 9);
    }

    #[test]
    fn stack_duration_sums() {
        let mut effects = ActiveEffects(vec![effect(EffectStackingBehaviour::StackDuration, 3)]);
        apply_effect(&mut effects, effect(EffectStackingBehaviour::StackDuration, 3));
        assert_eq!(effects.0[0].remaining_ticks, 10);
    }

    #[test]
    fn stack_intensity_keeps_both() {
        let mut effects = ActiveEffects(vec![effect(EffectStackingBehaviour::StackIntensity, 3)]);
        apply_effect(&mut effects, effect(EffectStackingBehaviour::StackIntensity, 3));
        assert_eq!(effects.0.len(), 2);
    }

    #[test]
    fn remove_by_id() {
        let mut effects = ActiveEffects(vec![effect(EffectStackingBehaviour::Ignore, 3)]);
        let removed = remove_effect(&mut effects, "e");
        assert!(removed.is_some());
        assert!(effects.0.is_empty());
    }
}
