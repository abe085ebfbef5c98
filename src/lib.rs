// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Anonymiser for annotated XML corpora.
//!
//! Person names are replaced deterministically per document (see
//! `names::substitution`); email, phone and web entities are scrambled
//! (see `contact`).  Replacements are written to an `anonymized` attribute and
//! the original text is left in place.

pub mod config;
pub mod contact;
pub mod document;
pub mod error;
pub mod names;

use anyhow::{Context, Result};
use config::AnonymiserConfig;
use document::{Mutator, read_document_info};
use names::{NamePool, NameSubstituter, SkeletonTable, document_rng};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub use error::AnonymiseError;

/// Anonymise one document end to end and return the path written.  Nothing
/// is written when any entity fails.
pub fn anonymise_file(config: &AnonymiserConfig) -> Result<PathBuf> {
    let skeletons = SkeletonTable::load(&config.skeleton_table)?;
    let xml = fs::read_to_string(&config.input)
        .with_context(|| format!("failed to read {}", config.input.display()))?;

    let info = read_document_info(&xml)
        .with_context(|| format!("failed to read metadata of {}", config.input.display()))?;
    let pool = NamePool::for_country(&config.data_dir, &info.country)?;
    debug!("Loaded {} names", pool.total());
    debug!("Using {} for country", info.country);
    debug!("Using {} as seed", info.document_id);

    let mut names = NameSubstituter::new(pool, document_rng(&info.document_id), config.windows);
    let output = Mutator::new(&mut names, &skeletons, config.force)
        .anonymise_document(&xml)
        .with_context(|| format!("failed to anonymise {}", config.input.display()))?;

    let path = config.output_path()?;
    fs::write(&path, output).with_context(|| format!("failed to write {}", path.display()))?;
    debug!("Wrote {}", path.display());
    Ok(path)
}
