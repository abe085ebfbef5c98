// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

pub mod scrambler;

pub use scrambler::{ContactKind, scramble};

/// Scramble with the thread-local generator.  Contact values are not meant
/// to be reproducible between runs.
pub fn scramble_unseeded(text: &str) -> String {
    scramble(text, &mut rand::rng())
}
