// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Skeleton table: literal full names mapped to their typed components.
//! The table is produced elsewhere; here it is only read.  Component order
//! matters (it is the order replacements are drawn and joined), so the
//! per-person map is deserialised into a `Vec` rather than a hash map.

use crate::error::AnonymiseError;
use crate::names::Category;
use anyhow::{Context, Result};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonSkeleton {
    components: Vec<(String, Category)>,
}

impl PersonSkeleton {
    pub fn new(components: Vec<(String, Category)>) -> Self {
        Self { components }
    }

    /// Components in declaration order.
    pub fn components(&self) -> &[(String, Category)] {
        &self.components
    }
}

impl<'de> Deserialize<'de> for PersonSkeleton {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ComponentsVisitor;

        impl<'de> Visitor<'de> for ComponentsVisitor {
            type Value = PersonSkeleton;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of name components to fem, masc or surname")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut components = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((component, category)) = map.next_entry::<String, Category>()? {
                    components.push((component, category));
                }
                Ok(PersonSkeleton { components })
            }
        }

        deserializer.deserialize_map(ComponentsVisitor)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct SkeletonTable {
    people: HashMap<String, PersonSkeleton>,
}

impl SkeletonTable {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read skeleton table {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("failed to parse skeleton table {}", path.display()))
    }

    /// Skeleton registered for the literal full name.  An unregistered
    /// person cannot be anonymised and stops the run.
    pub fn get(&self, full_name: &str) -> Result<&PersonSkeleton, AnonymiseError> {
        self.people
            .get(full_name)
            .ok_or_else(|| AnonymiseError::MissingSkeleton {
                name: full_name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}
