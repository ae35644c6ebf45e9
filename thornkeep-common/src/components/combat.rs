use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

use thornkeep_data::{NpcInstanceId, UserId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatTarget {
    User(UserId),
    Npc(NpcInstanceId),
}

/// Present on an entity while it is engaged in combat (§4.6). Both sides of
/// an engagement carry one of these pointed at each other.
#[derive(Component, Clone, Debug, Serialize, Deserialize)]
pub struct Combatant {
    pub opponent: CombatTarget,
}
