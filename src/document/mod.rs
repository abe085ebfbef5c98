// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

pub mod metadata;
pub mod mutator;
pub mod policy;

pub use metadata::{DocumentInfo, read_document_info};
pub use mutator::Mutator;
pub use policy::{EntityAction, EntityFlags, EntityKind};
