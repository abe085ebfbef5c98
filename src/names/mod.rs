// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

pub mod normalise;
pub mod pool;
pub mod seed;
pub mod skeleton;
pub mod substitution;

pub use normalise::normalise;
pub use pool::{Category, NamePool};
pub use seed::{DocumentRng, RankDraw, document_rng};
pub use skeleton::{PersonSkeleton, SkeletonTable};
pub use substitution::{NameSubstituter, WindowConfig};
