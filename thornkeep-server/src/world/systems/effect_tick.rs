use bevy_ecs::prelude::{Query, Res};

use thornkeep_common::components::{ActiveEffects, HealthPoints};

use crate::world::tick::GameTick;

/// §4.5 step 1: apply each active effect's payload on its trigger tick, age
/// every effect by one tick regardless, and drop anything that expired.
/// Grounded on `rose-game-common`'s `status_effects` expiry bookkeeping.
pub fn effect_tick_system(tick: Res<GameTick>, mut query: Query<(&mut ActiveEffects, &mut HealthPoints)>) {
    let current_tick = tick.0;

    for (mut effects, mut health) in query.iter_mut() {
        for effect in effects.0.iter_mut() {
            if effect.should_trigger(current_tick) {
                if effect.payload.damage_per_tick > 0 {
                    health.apply_delta(-effect.payload.damage_per_tick);
                }
                if effect.payload.heal_per_tick > 0 {
                    health.apply_delta(effect.payload.heal_per_tick);
                }
                effect.last_tick_applied = current_tick as u32;
            }
            if effect.remaining_ticks > 0 {
                effect.remaining_ticks -= 1;
            }
        }
        effects.0.retain(|effect| !effect.is_expired());
    }
}
