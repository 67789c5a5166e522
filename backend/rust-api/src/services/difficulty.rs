use crate::models::Tier;

/// Differential at or below which the counterpart counts as much stronger.
pub const ADVANCED_THRESHOLD: i64 = -5;

/// Tiers tried, in order, once the requested tier has no unused questions.
pub const FALLBACK_ORDER: [(Tier, [Tier; 2]); 3] = [
    (Tier::Beginner, [Tier::Intermediate, Tier::Advanced]),
    (Tier::Intermediate, [Tier::Beginner, Tier::Advanced]),
    (Tier::Advanced, [Tier::Intermediate, Tier::Beginner]),
];

/// Maps `requester_level - counterpart_level` to a tier.
///
/// A requester at or above the counterpart gets `Beginner`; one trailing by
/// five or more levels gets `Advanced`; everything in between is `Intermediate`.
pub fn select_tier(level_differential: i64) -> Tier {
    if level_differential >= 0 {
        Tier::Beginner
    } else if level_differential <= ADVANCED_THRESHOLD {
        Tier::Advanced
    } else {
        Tier::Intermediate
    }
}

pub fn level_differential(requester_level: i64, counterpart_level: i64) -> i64 {
    requester_level.saturating_sub(counterpart_level)
}

pub fn fallback_order(tier: Tier) -> [Tier; 2] {
    // rows are laid out in `Tier` discriminant order
    FALLBACK_ORDER[tier as usize].1
}
