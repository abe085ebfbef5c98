// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Per-document random stream.  The generator is keyed by the document
//! identifier alone, so regenerating a corpus reproduces every name choice
//! without keeping a mapping table around.

use crate::names::substitution::Window;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

pub type DocumentRng = ChaCha8Rng;

/// Seed a generator from the SHA-256 digest of the document identifier.
pub fn document_rng(document_id: &str) -> DocumentRng {
    let digest = Sha256::digest(document_id.as_bytes());
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest);
    ChaCha8Rng::from_seed(seed)
}

/// Source of ranks for the substitution engine.
pub trait RankDraw {
    /// Pick a rank uniformly from the inclusive window.
    fn draw(&mut self, window: Window) -> usize;
}

impl RankDraw for ChaCha8Rng {
    fn draw(&mut self, window: Window) -> usize {
        self.random_range(window.start..=window.end)
    }
}
