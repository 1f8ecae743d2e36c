//! Seeded Xoshiro256++ generator for fixtures
//!
//! Shift-register generator from Blackman & Vigna "Scrambled Linear
//! Pseudorandom Number Generators" (2018), seeded through SplitMix64. The
//! output stream is fully determined by the seed and independent of platform,
//! thread count and `rand` version.

/// Explicit seeded generator owned by one fixture set
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixtureRng {
    s: [u64; 4],
}

impl FixtureRng {
    /// Create from seed using SplitMix64
    pub fn from_seed(seed: u64) -> Self {
        let mut sm_state = seed;
        let mut splitmix = || {
            sm_state = sm_state.wrapping_add(0x9e3779b97f4a7c15);
            let mut z = sm_state;
            z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
            z ^ (z >> 31)
        };

        Self {
            s: [splitmix(), splitmix(), splitmix(), splitmix()],
        }
    }

    /// Next raw 64-bit output
    #[inline]
    pub fn next_raw(&mut self) -> u64 {
        let result = self.s[0]
            .wrapping_add(self.s[3])
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform f64 in [0, 1) from the top 53 bits
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_raw() >> 11) as f64 / (1u64 << 53) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_stream_seed_zero() {
        let mut rng = FixtureRng::from_seed(0);
        let got: Vec<u64> = (0..3).map(|_| rng.next_raw()).collect();
        assert_eq!(got, KNOWN_SEED0);
    }

    #[test]
    fn test_uniform_range() {
        let mut rng = FixtureRng::from_seed(42);
        for _ in 0..10_000 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_seeds_diverge() {
        let mut a = FixtureRng::from_seed(0);
        let mut b = FixtureRng::from_seed(1);
        assert_ne!(a.next_raw(), b.next_raw());
    }

    // First outputs for seed 0
    const KNOWN_SEED0: [u64; 3] = [0x53175d61490b23df, 0x61da6f3dc380d507, 0x5c0fdf91ec9a7bfc];
}
