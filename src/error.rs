// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Fatal conditions recognised by the anonymiser.  Anything not listed here
//! (I/O, JSON, XML) travels as an `anyhow::Error` with file context attached.

use crate::names::Category;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnonymiseError {
    /// A dataset row carries a category other than `fem`, `masc` or `surname`.
    #[error("Invalid data type: {category} (line {line})")]
    InvalidCategory { line: usize, category: String },

    #[error("malformed dataset row at line {line}: {row:?}")]
    MalformedRow { line: usize, row: String },

    #[error("no name dataset for country code {country:?}")]
    UnsupportedCountry { country: String },

    /// Every person entity must be registered in the skeleton table beforehand.
    #[error("{name} not in skeleton table")]
    MissingSkeleton { name: String },

    #[error("document metadata unavailable: {reason}")]
    MissingMetadata { reason: String },

    #[error("no {category} names left to draw from")]
    PoolExhausted { category: Category },
}
