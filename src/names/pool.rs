// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Frequency-ranked name pools for one country.
//! Each category is an owned arena of entries sorted by descending
//! frequency; the display form and the matching key of an entry travel
//! together so removals can never shift one view against the other.

use crate::error::AnonymiseError;
use crate::names::normalise;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Country codes that ship with a name dataset.
pub const SUPPORTED_COUNTRIES: [&str; 4] = ["PT", "BR", "ES", "GZ"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Category {
    #[serde(rename = "fem")]
    Feminine,
    #[serde(rename = "masc")]
    Masculine,
    #[serde(rename = "surname")]
    Surname,
}

impl Category {
    /// Map the dataset tag onto a category.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "fem" => Some(Self::Feminine),
            "masc" => Some(Self::Masculine),
            "surname" => Some(Self::Surname),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Feminine => "fem",
            Self::Masculine => "masc",
            Self::Surname => "surname",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PoolEntry {
    display: String,
    normalised: String,
}

/// Rank-ordered names of a single category.  Rank 0 is the most frequent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedNames {
    entries: Vec<PoolEntry>,
}

impl RankedNames {
    fn from_weighted(mut weighted: Vec<(String, u64)>) -> Self {
        // sort_by is stable: equal frequencies keep dataset order.
        weighted.sort_by(|a, b| b.1.cmp(&a.1));
        let entries = weighted
            .into_iter()
            .map(|(display, _)| PoolEntry {
                normalised: normalise(&display),
                display,
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current rank of the first entry whose matching key equals `normalised`.
    pub fn rank_of(&self, normalised: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.normalised == normalised)
    }

    pub fn get(&self, rank: usize) -> Option<&str> {
        self.entries.get(rank).map(|entry| entry.display.as_str())
    }

    /// Draw-and-remove: hand out the display form at `rank` and drop the
    /// entry so it cannot be chosen again during this run.
    pub fn take(&mut self, rank: usize) -> Option<String> {
        if rank >= self.entries.len() {
            return None;
        }
        Some(self.entries.remove(rank).display)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.display.as_str())
    }
}

/// The three per-category pools of one country.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamePool {
    feminine: RankedNames,
    masculine: RankedNames,
    surname: RankedNames,
}

impl NamePool {
    /// Parse `name,category,frequency` rows.  An unknown category aborts the
    /// whole load; nothing is returned for a partially valid dataset.
    pub fn parse(data: &str) -> Result<Self, AnonymiseError> {
        let mut feminine = Vec::new();
        let mut masculine = Vec::new();
        let mut surname = Vec::new();

        for (idx, raw) in data.lines().enumerate() {
            let line = idx + 1;
            let row = raw.trim();
            if row.is_empty() {
                continue;
            }

            let fields: Vec<&str> = row.split(',').map(str::trim).collect();
            let [name, tag, freq] = fields.as_slice() else {
                return Err(AnonymiseError::MalformedRow {
                    line,
                    row: row.to_string(),
                });
            };
            let category = Category::from_tag(tag).ok_or_else(|| AnonymiseError::InvalidCategory {
                line,
                category: (*tag).to_string(),
            })?;
            let freq: u64 = freq.parse().map_err(|_| AnonymiseError::MalformedRow {
                line,
                row: row.to_string(),
            })?;

            let bucket = match category {
                Category::Feminine => &mut feminine,
                Category::Masculine => &mut masculine,
                Category::Surname => &mut surname,
            };
            bucket.push(((*name).to_string(), freq));
        }

        Ok(Self {
            feminine: RankedNames::from_weighted(feminine),
            masculine: RankedNames::from_weighted(masculine),
            surname: RankedNames::from_weighted(surname),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read name dataset {}", path.display()))?;
        Self::parse(&data)
            .with_context(|| format!("failed to load name dataset {}", path.display()))
    }

    /// Load the dataset shipped for `country` from `data_dir`.
    pub fn for_country(data_dir: &Path, country: &str) -> Result<Self> {
        let path = dataset_path(data_dir, country)?;
        Self::load(&path)
    }

    pub fn names(&self, category: Category) -> &RankedNames {
        match category {
            Category::Feminine => &self.feminine,
            Category::Masculine => &self.masculine,
            Category::Surname => &self.surname,
        }
    }

    pub fn names_mut(&mut self, category: Category) -> &mut RankedNames {
        match category {
            Category::Feminine => &mut self.feminine,
            Category::Masculine => &mut self.masculine,
            Category::Surname => &mut self.surname,
        }
    }

    pub fn total(&self) -> usize {
        self.feminine.len() + self.masculine.len() + self.surname.len()
    }
}

/// Location of the dataset for a country code, e.g. `data/pt_data.csv`.
pub fn dataset_path(data_dir: &Path, country: &str) -> Result<PathBuf, AnonymiseError> {
    let code = country.to_ascii_uppercase();
    if !SUPPORTED_COUNTRIES.contains(&code.as_str()) {
        return Err(AnonymiseError::UnsupportedCountry {
            country: country.to_string(),
        });
    }
    Ok(data_dir.join(format!("{}_data.csv", code.to_ascii_lowercase())))
}
