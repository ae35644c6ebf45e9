use bevy_ecs::prelude::Query;

use thornkeep_common::components::{HealthPoints, StateFlags};

/// §4.5 step 3: resting grants bonus HP regen on top of whatever effects
/// already ticked this pass. Breaking rest (on damage or movement) is the
/// command/combat systems' responsibility via `StateFlags::break_rest`.
pub fn vitals_regen_system(mut query: Query<(&StateFlags, &mut HealthPoints)>) {
    for (flags, mut health) in query.iter_mut() {
        if flags.is_resting && !flags.is_unconscious {
            let bonus = (health.max / 20).max(1);
            health.apply_delta(bonus);
        }
    }
}
