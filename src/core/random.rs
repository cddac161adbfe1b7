//! Deterministic randomness
//!
//! Effects seed their own generator so a given seed always reproduces the
//! same sky. `hash01` is the stateless per-index hash used by star
//! generation; both numeric backends share it.

/// Xorshift32 step
#[inline]
pub fn xorshift32(state: &mut u32) -> u32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    x
}

/// Integer hash of an index mapped to [0, 1).
#[inline]
pub fn hash01(index: u32) -> f32 {
    let mut h = index.wrapping_mul(0x9E37_79B9) ^ 0x85EB_CA6B;
    h ^= h >> 16;
    h = h.wrapping_mul(0x7FEB_352D);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846C_A68B);
    h ^= h >> 16;
    (h >> 8) as f32 / (1u32 << 24) as f32
}

/// Small seeded generator for spawn parameters.
#[derive(Clone, Debug)]
pub struct FastRandom {
    state: u32,
}

impl FastRandom {
    pub fn new(seed: u32) -> Self {
        // xorshift has a fixed point at zero
        Self { state: if seed == 0 { 0x1234_5678 } else { seed } }
    }

    /// Uniform in [0, 1)
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        (xorshift32(&mut self.state) >> 8) as f32 / (1u32 << 24) as f32
    }

    #[inline]
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }

    #[inline]
    pub fn angle(&mut self) -> f32 {
        self.next_f32() * std::f32::consts::TAU
    }

    #[inline]
    pub fn chance(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }

    /// Uniform index in 0..len (0 when len is 0).
    #[inline]
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f32() * len as f32) as usize).min(len - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = FastRandom::new(42);
        let mut b = FastRandom::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_f32(), b.next_f32());
        }
    }

    #[test]
    fn values_stay_in_unit_interval() {
        let mut r = FastRandom::new(7);
        for _ in 0..10_000 {
            let v = r.next_f32();
            assert!((0.0..1.0).contains(&v));
        }
        for i in 0..10_000 {
            let h = hash01(i);
            assert!((0.0..1.0).contains(&h));
        }
    }

    #[test]
    fn zero_seed_does_not_stick() {
        let mut r = FastRandom::new(0);
        let first = r.next_f32();
        let second = r.next_f32();
        assert_ne!(first, second);
    }

    #[test]
    fn index_is_in_bounds() {
        let mut r = FastRandom::new(9);
        for _ in 0..1000 {
            assert!(r.index(3) < 3);
        }
        assert_eq!(r.index(0), 0);
    }
}
