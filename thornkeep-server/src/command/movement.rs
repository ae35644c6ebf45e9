/// §4.4 "movement verbs incur a delay derived from agility"; the precise
/// formula is an open design choice per spec §9. `K` is the agility score
/// at which the multiplier is exactly 1.0; the clamp keeps very low or very
/// high agility from producing an unplayable or instant delay.
const BASE_MS: f64 = 1500.0;
const AGILITY_PIVOT: f64 = 15.0;
const MIN_MULTIPLIER: f64 = 0.4;
const MAX_MULTIPLIER: f64 = 3.0;

pub fn movement_delay_ms(agility: i32) -> u64 {
    let agility = agility.max(1) as f64;
    let multiplier = (AGILITY_PIVOT / agility).clamp(MIN_MULTIPLIER, MAX_MULTIPLIER);
    (BASE_MS * multiplier) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pivot_agility_is_base_delay() {
        assert_eq!(movement_delay_ms(15), 1500);
    }

    #[test]
    fn low_agility_is_clamped() {
        assert_eq!(movement_delay_ms(1), (BASE_MS * MAX_MULTIPLIER) as u64);
    }

    #[test]
    fn high_agility_is_clamped() {
        assert_eq!(movement_delay_ms(1000), (BASE_MS * MIN_MULTIPLIER) as u64);
    }
}
