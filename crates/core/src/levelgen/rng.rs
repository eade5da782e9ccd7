//! Seeded random stream and seed mixing shared by every stochastic decision.

use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub(crate) const CODE_LENGTH: usize = 8;

pub(crate) struct LevelRng {
    rng: ChaCha8Rng,
}

impl LevelRng {
    pub(crate) fn from_seed(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Uniform in `[0, 1)` with 53 bits of precision.
    pub(crate) fn next_f64(&mut self) -> f64 {
        (self.rng.next_u64() >> 11) as f64 * (1.0 / (1_u64 << 53) as f64)
    }

    pub(crate) fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Uniform in `0..upper`; `upper` must be non-zero.
    pub(crate) fn below(&mut self, upper: usize) -> usize {
        debug_assert!(upper > 0);
        (self.rng.next_u64() % upper as u64) as usize
    }

    pub(crate) fn range_inclusive(&mut self, min_value: i32, max_value: i32) -> i32 {
        debug_assert!(min_value <= max_value);
        let span = (i64::from(max_value) - i64::from(min_value) + 1) as u64;
        (i64::from(min_value) + (self.rng.next_u64() % span) as i64) as i32
    }

    pub(crate) fn range_usize_inclusive(&mut self, min_value: usize, max_value: usize) -> usize {
        debug_assert!(min_value <= max_value);
        min_value + self.below(max_value - min_value + 1)
    }

    /// Fisher-Yates, swapping each slot with a uniform pick from the unshuffled tail.
    pub(crate) fn shuffle<T>(&mut self, items: &mut [T]) {
        for index in 0..items.len() {
            let pick = index + self.below(items.len() - index);
            items.swap(index, pick);
        }
    }

    /// Eight uppercase alphanumerics, used for room, storage, and drop-point codes.
    pub(crate) fn code(&mut self) -> String {
        (0..CODE_LENGTH)
            .map(|_| char::from(CODE_ALPHABET[self.below(CODE_ALPHABET.len())]))
            .collect()
    }
}

/// Seed for the `attempt`-th try (1-based) of one generation run.
pub(crate) fn attempt_seed(base_seed: u64, attempt: u32) -> u64 {
    mix_seed_stream(base_seed, u64::from(attempt))
}

/// A configured seed of zero means "different every run".
pub(crate) fn resolve_base_seed(configured: u64) -> u64 {
    if configured == 0 { generate_runtime_seed() } else { configured }
}

pub(crate) fn mix_seed_stream(seed: u64, stream: u64) -> u64 {
    let mut mixed = seed ^ stream.wrapping_mul(0xD6E8_FD9A_5B89_7A4D);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    mixed ^ (mixed >> 33)
}

static RUNTIME_SEED_COUNTER: AtomicU64 = AtomicU64::new(0);

fn generate_runtime_seed() -> u64 {
    let now_nanos =
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0_u128, |duration| duration.as_nanos());
    let pid = u64::from(process::id());
    let counter = RUNTIME_SEED_COUNTER.fetch_add(1, Ordering::Relaxed);

    let entropy = (now_nanos as u64)
        ^ ((now_nanos >> 64) as u64)
        ^ pid.rotate_left(17)
        ^ counter.rotate_left(7);

    // Never hand back zero: callers treat it as "not yet resolved".
    mix_seed_stream(entropy, counter).max(1)
}
