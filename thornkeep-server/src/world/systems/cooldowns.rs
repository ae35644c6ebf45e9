use bevy_ecs::prelude::Query;

use thornkeep_common::components::Cooldowns;

/// §4.5 step 6: ages every ability cooldown by one tick.
pub fn cooldown_system(mut query: Query<&mut Cooldowns>) {
    for mut cooldowns in query.iter_mut() {
        cooldowns.tick_down();
    }
}
