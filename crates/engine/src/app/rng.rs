use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::SmallRng;
use rand::{Rng as _, SeedableRng};

/// The one random stream of a scene. Seeded once on scene entry and handed
/// by `&mut` to every behavior that draws from it.
#[derive(Debug, Clone)]
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }

    /// Seeds from wall-clock time; runs are not meant to be reproducible.
    pub fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or(0);
        Self::from_seed(seed)
    }

    /// Uniform draw from `[min, max)`. An empty range returns `min`.
    ///
    /// # Panics
    ///
    /// Panics when `min > max` or either bound is not finite.
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        assert!(
            min.is_finite() && max.is_finite(),
            "SimRng::range bounds must be finite: [{min}, {max})"
        );
        assert!(min <= max, "SimRng::range called with inverted bounds: [{min}, {max})");
        if min == max {
            return min;
        }
        self.0.gen_range(min..max)
    }

    pub fn coin_flip(&mut self) -> bool {
        self.0.gen_bool(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_stays_inside_half_open_interval() {
        let mut rng = SimRng::from_seed(7);
        for _ in 0..1_000 {
            let value = rng.range(1.0, 3.0);
            assert!((1.0..3.0).contains(&value), "value={value}");
        }
    }

    #[test]
    fn empty_range_returns_min() {
        let mut rng = SimRng::from_seed(1);
        assert_eq!(rng.range(2.5, 2.5), 2.5);
    }

    #[test]
    #[should_panic(expected = "inverted bounds")]
    fn inverted_range_panics() {
        let mut rng = SimRng::from_seed(1);
        let _ = rng.range(3.0, 1.0);
    }

    #[test]
    fn same_seed_gives_same_stream() {
        let mut a = SimRng::from_seed(42);
        let mut b = SimRng::from_seed(42);
        for _ in 0..16 {
            assert_eq!(a.range(0.0, 10.0), b.range(0.0, 10.0));
            assert_eq!(a.coin_flip(), b.coin_flip());
        }
    }

    #[test]
    fn coin_flip_produces_both_sides() {
        let mut rng = SimRng::from_seed(3);
        let heads = (0..200).filter(|_| rng.coin_flip()).count();
        assert!(heads > 0 && heads < 200);
    }
}
