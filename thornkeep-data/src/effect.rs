use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectType {
    Poison,
    Regen,
    Stun,
    BuffStat,
    DebuffStat,
    DamageOverTime,
    HealOverTime,
    MovementBlock,
    InstantDamage,
    InstantHeal,
    Haste,
    DamageReduction,
    Absorb,
    Taunt,
    Stealth,
    Slow,
    Fear,
    Silence,
    Bleed,
}

impl EffectType {
    pub fn is_instant(self) -> bool {
        matches!(self, EffectType::InstantDamage | EffectType::InstantHeal)
    }

    pub fn is_player_visible_buff(self) -> bool {
        matches!(
            self,
            EffectType::Regen
                | EffectType::BuffStat
                | EffectType::Haste
                | EffectType::DamageReduction
                | EffectType::Absorb
                | EffectType::Stealth
        )
    }
}

/// How a newly-applied effect interacts with an existing effect of the same
/// type already active on the same target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectStackingBehaviour {
    /// Drop the incoming effect, keep the existing one untouched.
    Ignore,
    /// Discard the existing effect, the incoming one replaces it outright.
    Replace,
    /// Keep the existing effect's payload but reset its remaining duration.
    Refresh,
    /// Keep both, summing their remaining durations into the existing one.
    StackDuration,
    /// Keep both as distinct instances with independent payloads.
    StackIntensity,
    /// Keep whichever of the two has the larger payload magnitude.
    StrongestWins,
}
