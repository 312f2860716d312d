//! Injected randomness for combat, map generation and AI choices.
//!
//! The engine never reaches for a global RNG. Every random draw goes through
//! a [`RandomSource`] owned by the game, so a game seeded (or scripted) the
//! same way replays identically.

use serde::{Deserialize, Serialize};

/// A source of uniform random numbers.
pub trait RandomSource {
    /// Next value in `[0.0, 1.0)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform value in `[0.0, max)`.
    fn uniform(&mut self, max: f64) -> f64 {
        self.next_f64() * max
    }

    /// Uniform index in `[0, len)`. Returns 0 for an empty range.
    fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }

    /// Boolean with the given probability of true.
    fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Fisher-Yates shuffle in place.
    fn shuffle<T>(&mut self, items: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..items.len()).rev() {
            let j = self.next_index(i + 1);
            items.swap(i, j);
        }
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// A deterministic random number generator using xorshift.
///
/// The same seed produces the same sequence on every platform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededRandom {
    state: u64,
}

impl SeededRandom {
    /// Create a new generator from a 64-bit seed.
    pub fn from_seed(seed: u64) -> Self {
        // FNV-style mix so nearby seeds diverge immediately
        let mut state: u64 = 0xcbf29ce484222325;
        for byte in seed.to_le_bytes() {
            state ^= byte as u64;
            state = state.wrapping_mul(0x100000001b3);
        }
        if state == 0 {
            state = 0x853c49e6748fea9b;
        }
        Self { state }
    }

    /// Generate next random u64.
    pub fn next_u64(&mut self) -> u64 {
        // xorshift64*
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate a random u32.
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        // Top 53 bits give a uniformly spaced double in [0, 1)
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Replays a fixed list of values, cycling when exhausted.
///
/// Useful for pinning combat outcomes in tests and for replaying a recorded
/// stream of draws.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    /// Values outside `[0, 1)` are clamped into range.
    pub fn new(values: Vec<f64>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self { values, cursor: 0 }
    }

    /// A source that always returns the same value.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
