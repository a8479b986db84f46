//! Die rolls used by the engine.

use rand::Rng;
use rand::rngs::StdRng;

/// Roll a d20 (uniform 1..=20).
pub fn d20(rng: &mut StdRng) -> u8 {
    rng.random_range(1..=20)
}

/// Roll initiative for a combatant: d20 + dexterity.
pub fn initiative_roll(rng: &mut StdRng, dexterity: i32) -> i32 {
    i32::from(d20(rng)) + dexterity
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn d20_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let roll = d20(&mut rng);
            assert!((1..=20).contains(&roll));
        }
    }

    #[test]
    fn initiative_adds_dexterity() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let roll = initiative_roll(&mut rng, 3);
            assert!((4..=23).contains(&roll));
        }
    }

    #[test]
    fn deterministic_with_seed() {
        let mut a = StdRng::seed_from_u64(9);
        let mut b = StdRng::seed_from_u64(9);
        assert_eq!(d20(&mut a), d20(&mut b));
    }
}
