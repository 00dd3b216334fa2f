//! Seedable randomness shared by every random placement policy

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generator for an optional seed. A seed fully determines the output;
/// without one the generator is seeded from OS entropy.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Uniform draw from `[a, b]`, accepting equal or swapped bounds
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, a: f64, b: f64) -> f64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if lo == hi || !(hi - lo).is_finite() {
        return lo;
    }
    rng.gen_range(lo..=hi)
}

/// Uniform index below `len`; 0 when `len` is 0
pub fn index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        rng.gen_range(0..len)
    }
}
