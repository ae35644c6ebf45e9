use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

use thornkeep_data::ResourceKind;

#[derive(Component, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct HealthPoints {
    pub current: i32,
    pub max: i32,
}

impl HealthPoints {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn is_unconscious(&self) -> bool {
        self.current <= 0
    }

    /// Applies a signed delta, clamping to `[0, max]`. Returns the amount
    /// actually applied.
    pub fn apply_delta(&mut self, delta: i32) -> i32 {
        let before = self.current;
        self.current = (self.current + delta).clamp(0, self.max);
        self.current - before
    }
}

#[derive(Component, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ManaPoints {
    pub current: i32,
    pub max: i32,
}

impl ManaPoints {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn apply_delta(&mut self, delta: i32) -> i32 {
        let before = self.current;
        self.current = (self.current + delta).clamp(0, self.max);
        self.current - before
    }
}

/// The class-specific resource pool (rage, energy, ki, holy, nature) kept
/// distinct from mana per §4.7. `kind` records which regen/spend rules the
/// tick engine should apply.
#[derive(Component, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ResourcePoints {
    pub kind: ResourceKind,
    pub current: i32,
    pub max: i32,
    /// Holy charges regenerate on a per-user tick-progress counter distinct
    /// from the global tick (one charge every 5 ticks).
    pub progress_ticks: u32,
}

impl ResourcePoints {
    pub fn new(kind: ResourceKind, max: i32) -> Self {
        Self {
            kind,
            current: max,
            max,
            progress_ticks: 0,
        }
    }

    /// Transactional spend: succeeds only if the full cost is available.
    pub fn try_spend(&mut self, cost: i32) -> bool {
        if self.current >= cost {
            self.current -= cost;
            true
        } else {
            false
        }
    }

    pub fn apply_delta(&mut self, delta: i32) -> i32 {
        let before = self.current;
        self.current = (self.current + delta).clamp(0, self.max);
        self.current - before
    }
}
