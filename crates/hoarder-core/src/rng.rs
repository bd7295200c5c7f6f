use rand::Rng;
use serde::{Deserialize, Serialize};

const MULTIPLIER: u64 = 1_664_525;
const INCREMENT: u64 = 1_013_904_223;
/// LCG modulus (2^31 - 1). Every state lives in `[0, MODULUS)`.
pub const MODULUS: u64 = 2_147_483_647;

/// Saved generator position: the seed it was built from plus the live state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub current: u64,
}

/// Deterministic linear-congruential generator.
///
/// Identical seeds and identical call sequences produce bit-identical output,
/// which is what save files and input replays rely on. Not suitable for
/// anything security related.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRng {
    seed: u64,
    current: u64,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        let seed = seed % MODULUS;
        Self {
            seed,
            current: seed,
        }
    }

    /// Seed from the thread RNG, for games started without an explicit seed.
    pub fn from_entropy() -> Self {
        Self::new(rand::rng().random_range(1..MODULUS))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Advance the generator and return a value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.current = (self.current * MULTIPLIER + INCREMENT) % MODULUS;
        self.current as f64 / MODULUS as f64
    }

    pub fn float(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Uniform integer in `[min, max]`, both ends inclusive.
    pub fn int(&mut self, min: i64, max: i64) -> i64 {
        self.float(min as f64, (max + 1) as f64).floor() as i64
    }

    pub fn bool(&mut self) -> bool {
        self.next_f64() < 0.5
    }

    /// Pick one element uniformly. `None` for an empty slice.
    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.int(0, items.len() as i64 - 1) as usize;
        items.get(idx)
    }

    /// In-place Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.int(0, i as i64) as usize;
            items.swap(i, j);
        }
    }

    /// Uniform-area point inside a circle of `radius` centered on the origin.
    pub fn point_in_circle(&mut self, radius: f64) -> (f64, f64) {
        let angle = self.float(0.0, std::f64::consts::TAU);
        let r = self.next_f64().sqrt() * radius;
        (angle.cos() * r, angle.sin() * r)
    }

    pub fn point_in_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> (f64, f64) {
        let px = x + self.float(0.0, width);
        let py = y + self.float(0.0, height);
        (px, py)
    }

    /// Index drawn proportionally to `weights`.
    ///
    /// Falls back to the last index when rounding leaves a remainder, and
    /// returns 0 for an empty slice.
    pub fn weighted_choice(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        let mut roll = self.float(0.0, total);
        for (i, w) in weights.iter().enumerate() {
            roll -= w;
            if roll <= 0.0 {
                return i;
            }
        }
        weights.len().saturating_sub(1)
    }

    /// Normal sample via Box-Muller.
    pub fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        // ln(0) is -inf; nudge to the smallest positive draw instead.
        let u1 = self.next_f64().max(f64::MIN_POSITIVE);
        let u2 = self.next_f64();
        let z0 = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
        z0 * std_dev + mean
    }

    /// Rewind to the original seed.
    pub fn reset(&mut self) {
        self.current = self.seed;
    }

    pub fn set_seed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    pub fn state(&self) -> RngState {
        RngState {
            seed: self.seed,
            current: self.current,
        }
    }

    pub fn set_state(&mut self, state: RngState) {
        self.seed = state.seed % MODULUS;
        self.current = state.current % MODULUS;
    }
}

impl From<RngState> for SeededRng {
    fn from(state: RngState) -> Self {
        let mut rng = SeededRng::new(state.seed);
        rng.set_state(state);
        rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_value_matches_lcg_formula() {
        let mut rng = SeededRng::new(12345);
        let expected = (12345 * MULTIPLIER + INCREMENT) % MODULUS;
        let v = rng.next_f64();
        assert_eq!(rng.state().current, expected);
        assert!((v - expected as f64 / MODULUS as f64).abs() < 1e-15);
    }

    #[test]
    fn zero_seed_still_advances() {
        let mut rng = SeededRng::new(0);
        rng.next_f64();
        assert_eq!(rng.state().current, INCREMENT);
    }

    #[test]
    fn int_is_inclusive_and_bounded() {
        let mut rng = SeededRng::new(7);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..2000 {
            let v = rng.int(1, 3);
            assert!((1..=3).contains(&v));
            seen_min |= v == 1;
            seen_max |= v == 3;
        }
        assert!(seen_min && seen_max);
    }

    #[test]
    fn choice_on_empty_is_none() {
        let mut rng = SeededRng::new(1);
        let empty: [u8; 0] = [];
        assert!(rng.choice(&empty).is_none());
        assert_eq!(rng.choice(&[42]), Some(&42));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = SeededRng::new(99);
        let mut items: Vec<u32> = (0..20).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn weighted_choice_skips_zero_weights() {
        let mut rng = SeededRng::new(3);
        for _ in 0..500 {
            let idx = rng.weighted_choice(&[0.0, 1.0, 0.0]);
            assert_eq!(idx, 1);
        }
    }

    #[test]
    fn weighted_choice_empty_is_zero() {
        let mut rng = SeededRng::new(3);
        assert_eq!(rng.weighted_choice(&[]), 0);
    }

    #[test]
    fn point_in_circle_stays_inside() {
        let mut rng = SeededRng::new(5);
        for _ in 0..500 {
            let (x, y) = rng.point_in_circle(10.0);
            assert!((x * x + y * y).sqrt() <= 10.0 + 1e-9);
        }
    }

    #[test]
    fn point_in_rect_stays_inside() {
        let mut rng = SeededRng::new(5);
        for _ in 0..500 {
            let (x, y) = rng.point_in_rect(100.0, 50.0, 20.0, 10.0);
            assert!((100.0..120.0).contains(&x));
            assert!((50.0..60.0).contains(&y));
        }
    }

    #[test]
    fn gaussian_is_finite() {
        let mut rng = SeededRng::new(11);
        let mean: f64 = (0..2000).map(|_| rng.gaussian(5.0, 1.0)).sum::<f64>() / 2000.0;
        assert!((mean - 5.0).abs() < 0.2, "mean={mean}");
    }

    #[test]
    fn reset_replays_from_seed() {
        let mut rng = SeededRng::new(77);
        let first: Vec<f64> = (0..5).map(|_| rng.next_f64()).collect();
        rng.reset();
        let again: Vec<f64> = (0..5).map(|_| rng.next_f64()).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn set_seed_restarts_sequence() {
        let mut a = SeededRng::new(1);
        a.next_f64();
        a.set_seed(500);
        let mut b = SeededRng::new(500);
        assert_eq!(a.next_f64(), b.next_f64());
    }

    #[test]
    fn entropy_seed_is_in_range() {
        let rng = SeededRng::from_entropy();
        assert!(rng.seed() >= 1 && rng.seed() < MODULUS);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn same_seed_same_sequence(seed in 0u64..MODULUS) {
                let mut a = SeededRng::new(seed);
                let mut b = SeededRng::new(seed);
                for _ in 0..64 {
                    prop_assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
                }
            }

            #[test]
            fn state_round_trip_reproduces_sequence(seed in 0u64..MODULUS, skip in 0usize..32) {
                let mut a = SeededRng::new(seed);
                for _ in 0..skip {
                    a.next_f64();
                }
                let mut b = SeededRng::from(a.state());
                for _ in 0..32 {
                    prop_assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
                }
            }

            #[test]
            fn next_is_unit_interval(seed in 0u64..MODULUS) {
                let mut rng = SeededRng::new(seed);
                for _ in 0..32 {
                    let v = rng.next_f64();
                    prop_assert!((0.0..1.0).contains(&v));
                }
            }
        }
    }
}
