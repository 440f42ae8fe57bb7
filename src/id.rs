//! Item identifier generation
//!
//! An id is the base-36 millisecond timestamp followed by a few base-36
//! random characters, e.g. `lx1k2m3n` + `a9zq`. The generator never checks
//! uniqueness itself; the repository re-rolls on collision.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Default number of random characters appended to the time component
pub const DEFAULT_RANDOM_LEN: usize = 4;
/// Upper bound on the random component length
pub const MAX_RANDOM_LEN: usize = 16;

#[derive(Debug, Clone)]
pub struct IdGenerator {
    rng: Pcg32,
    random_len: usize,
    /// Highest timestamp used so far; the time component never goes backwards
    last_ms: i64,
}

impl IdGenerator {
    /// Generator seeded from the thread RNG
    pub fn from_entropy(random_len: usize) -> Self {
        Self::with_rng(Pcg32::from_rng(&mut rand::rng()), random_len)
    }

    /// Deterministic generator
    pub fn seeded(seed: u64, random_len: usize) -> Self {
        Self::with_rng(Pcg32::seed_from_u64(seed), random_len)
    }

    fn with_rng(rng: Pcg32, random_len: usize) -> Self {
        Self {
            rng,
            random_len: random_len.min(MAX_RANDOM_LEN),
            last_ms: 0,
        }
    }

    pub fn random_len(&self) -> usize {
        self.random_len
    }

    /// Produce the next candidate id for the instant `now_ms`
    pub fn next_id(&mut self, now_ms: i64) -> String {
        let ms = now_ms.max(self.last_ms);
        self.last_ms = ms;

        let mut id = to_base36(ms.max(0) as u64);
        id.reserve(self.random_len);
        for _ in 0..self.random_len {
            let idx = self.rng.random_range(0..ALPHABET.len());
            id.push(ALPHABET[idx] as char);
        }
        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::from_entropy(DEFAULT_RANDOM_LEN)
    }
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(ALPHABET[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    // ALPHABET is ASCII
    digits.into_iter().map(char::from).collect()
}
