use bevy_ecs::prelude::{Query, Res};

use thornkeep_common::components::{ClassRace, Combatant, Progression, ResourcePoints, StateFlags, Stats};
use thornkeep_data::ResourceKind;

use crate::world::GameData;

/// §4.5 step 2 / §4.7: per-class resource max and regen. Grounded on the
/// teacher's `passive_recovery_system`, generalized from a single mana/HP
/// pair to the six resource archetypes.
pub fn resource_regen_system(
    game_data: Res<GameData>,
    mut query: Query<(
        &Stats,
        &Progression,
        &ClassRace,
        &StateFlags,
        &mut ResourcePoints,
        Option<&Combatant>,
    )>,
) {
    for (stats, progression, class_race, flags, mut resource, combatant) in query.iter_mut() {
        let kind = game_data
            .classes
            .get(&class_race.class_id)
            .map(|class| class.resource_kind)
            .unwrap_or(ResourceKind::None);
        resource.kind = kind;

        match kind {
            ResourceKind::None => {
                resource.max = 0;
                resource.current = 0;
            }
            ResourceKind::Mana => {
                resource.max = 20 + 3 * stats.intelligence + 2 * stats.wisdom;
                let mut regen = 4 + stats.intelligence / 10;
                if flags.is_meditating {
                    regen *= 2;
                }
                resource.apply_delta(regen);
            }
            ResourceKind::Rage => {
                resource.max = 100;
                if combatant.is_none() {
                    resource.apply_delta(-5);
                }
            }
            ResourceKind::Energy => {
                resource.max = 100;
                resource.apply_delta(25);
            }
            ResourceKind::Ki => {
                resource.max = 3 * stats.wisdom + 2 * progression.level as i32;
                let mut regen = 3 + stats.wisdom / 10;
                if flags.is_meditating {
                    regen *= 3;
                }
                resource.apply_delta(regen);
            }
            ResourceKind::Holy => {
                resource.max = 5;
                resource.progress_ticks += 1;
                if resource.progress_ticks >= 5 {
                    resource.progress_ticks = 0;
                    resource.apply_delta(1);
                }
            }
            ResourceKind::Nature => {
                resource.max = 30 + 2 * stats.wisdom;
                let regen = 3 + stats.wisdom / 10;
                resource.apply_delta(regen);
            }
        }
    }
}
