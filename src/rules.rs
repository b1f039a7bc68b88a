//! Scoring and wave tables.

use rand::Rng;

use crate::constants::GEM_BASE_WORTH;
use crate::entities::AsteroidSize;

/// Number of asteroids spawned at the start of `wave`.
pub fn asteroids_in_wave(wave: u32) -> usize {
    let wave = wave as f64;
    ((wave + 1.0).powf(1.4) - wave / 1.2).round().max(0.0) as usize
}

/// Bonus for shooting an asteroid of `size`, scaled by the current wave.
pub fn asteroid_bonus(size: AsteroidSize, wave: u32, rng: &mut impl Rng) -> u64 {
    let base = match size {
        AsteroidSize::Large => rng.gen_range(250..350),
        AsteroidSize::Medium => rng.gen_range(925..1075),
        AsteroidSize::Small => rng.gen_range(2400..3600),
    };
    base * wave as u64
}

/// One-in-N odds that a destroyed asteroid of `size` leaves a gem behind.
pub fn gem_drop_odds(size: AsteroidSize) -> u32 {
    match size {
        AsteroidSize::Large => 3,
        AsteroidSize::Medium => 6,
        AsteroidSize::Small => 9,
    }
}

pub fn drops_gem(size: AsteroidSize, rng: &mut impl Rng) -> bool {
    rng.gen_range(1..=gem_drop_odds(size)) == 1
}

/// `size * uniform(0.8, 1.2) * 4500`, rounded to the nearest hundred.
pub fn gem_worth(size: AsteroidSize, rng: &mut impl Rng) -> u64 {
    let raw = size.number() as f64 * rng.gen_range(0.8..1.2) * GEM_BASE_WORTH;
    ((raw / 100.0).round() * 100.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn wave_sizes_follow_the_growth_curve() {
        assert_eq!(asteroids_in_wave(1), 2);
        assert_eq!(asteroids_in_wave(2), 3);
        assert_eq!(asteroids_in_wave(3), 4);
        assert_eq!(asteroids_in_wave(5), 8);
        assert_eq!(asteroids_in_wave(10), 20);
    }

    #[test]
    fn bonus_ranges_scale_with_wave() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let large = asteroid_bonus(AsteroidSize::Large, 1, &mut rng);
            assert!((250..350).contains(&large));
            let medium = asteroid_bonus(AsteroidSize::Medium, 2, &mut rng);
            assert!((1850..2150).contains(&medium));
            assert_eq!(medium % 2, 0);
            let small = asteroid_bonus(AsteroidSize::Small, 3, &mut rng);
            assert!((7200..10800).contains(&small));
        }
    }

    #[test]
    fn gem_worth_is_rounded_to_hundreds() {
        let mut rng = StdRng::seed_from_u64(5);
        for size in [AsteroidSize::Large, AsteroidSize::Medium, AsteroidSize::Small] {
            for _ in 0..100 {
                let worth = gem_worth(size, &mut rng);
                assert_eq!(worth % 100, 0);
                let base = size.number() as u64 * 4500;
                assert!(worth >= base * 8 / 10 - 100 && worth <= base * 12 / 10 + 100);
            }
        }
    }

    #[test]
    fn small_asteroids_drop_gems_less_often() {
        let mut rng = StdRng::seed_from_u64(9);
        let trials = 9_000;
        let large = (0..trials).filter(|_| drops_gem(AsteroidSize::Large, &mut rng)).count();
        let small = (0..trials).filter(|_| drops_gem(AsteroidSize::Small, &mut rng)).count();
        assert!(large > small);
        assert!((2_700..3_300).contains(&large), "large drops {}", large);
        assert!((700..1_300).contains(&small), "small drops {}", small);
    }
}
