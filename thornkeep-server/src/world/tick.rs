use bevy_ecs::prelude::{Resource, World};
use bevy_ecs::schedule::{IntoSystemConfigs, Schedule};

use super::systems;

/// The single monotonic logical clock (§4.5). Advances by one on every call
/// to [`TickEngine::advance`]; never advances while `test_mode` pauses it.
#[derive(Resource, Default, Clone, Copy, Debug)]
pub struct GameTick(pub u64);

/// Staged system execution for one tick, grounded on the teacher's
/// `GameWorld::run` (a `bevy` `App` with `Input`/`PreUpdate`/`Update`/
/// `PostUpdate`/`Output` base sets). `bevy_ecs::schedule::Schedule` gives us
/// the same ordered-system-set shape without pulling in full `bevy`'s
/// windowing/rendering plugins, which a headless MUD has no use for.
pub struct TickEngine {
    schedule: Schedule,
}

impl TickEngine {
    pub fn new() -> Self {
        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                systems::effect_tick::effect_tick_system,
                systems::resource_regen::resource_regen_system,
                systems::vitals_regen::vitals_regen_system,
                systems::npc_ai::npc_ai_system,
                systems::combat::combat_system,
                systems::respawn::respawn_system,
                systems::cooldowns::cooldown_system,
            )
                .chain(),
        );
        Self { schedule }
    }

    /// Advances `T` by one and runs every staged system against `world`
    /// (§4.5 steps 1-6; step 7, autosave, is orchestrated by the caller
    /// since it requires the async `PersistenceStore`).
    pub fn advance(&mut self, world: &mut World) {
        {
            let mut tick = world.resource_mut::<GameTick>();
            tick.0 += 1;
        }
        self.schedule.run(world);
    }

    pub fn current_tick(world: &World) -> u64 {
        world.resource::<GameTick>().0
    }
}

impl Default for TickEngine {
    fn default() -> Self {
        Self::new()
    }
}
