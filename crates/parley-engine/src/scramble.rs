// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Character scrambling for auto-replies.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Produces the content of an auto-reply from the triggering message.
pub trait Scrambler: Send + Sync + 'static {
    /// Returns a permutation of `input`'s characters.
    fn scramble(&self, input: &str) -> String;
}

/// Shuffles characters with a private RNG.
pub struct ShuffleScrambler {
    rng: Mutex<StdRng>,
}

impl ShuffleScrambler {
    /// Entropy-seeded.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible output for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Seeded when `seed` is set, entropy otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::new(),
        }
    }
}

impl Default for ShuffleScrambler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scrambler for ShuffleScrambler {
    fn scramble(&self, input: &str) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        scramble_with(input, &mut *rng)
    }
}

/// Shuffles the chars of `input` using `rng`.
///
/// Inputs of one char or less, and inputs made of a single repeated char,
/// come back unchanged. Anything else is guaranteed to come back different.
pub fn scramble_with<R: Rng + ?Sized>(input: &str, rng: &mut R) -> String {
    let mut chars: Vec<char> = input.chars().collect();
    if chars.len() <= 1 {
        return input.to_owned();
    }

    chars.shuffle(rng);

    // A shuffle can land on the identity; swap the first differing neighbours.
    if chars.iter().copied().eq(input.chars()) {
        if let Some(i) = (1..chars.len()).find(|&i| chars[i] != chars[i - 1]) {
            chars.swap(i - 1, i);
        }
    }

    chars.into_iter().collect()
}
