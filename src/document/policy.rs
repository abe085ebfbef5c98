// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Which entities get (re)anonymised, decided from their control attributes.

use anyhow::Result;
use quick_xml::events::BytesStart;

pub const ANONYMIZED_ATTR: &str = "anonymized";
pub const NORM_ATTR: &str = "norm";
/// Entities carrying any of these are never touched, force or not.
pub const SKIP_MARKERS: [&str; 2] = ["skip-anonym", "wikidata"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Person,
    Email,
    Phone,
    Webpage,
}

impl EntityKind {
    pub fn from_type(value: &str) -> Option<Self> {
        match value {
            "person" => Some(Self::Person),
            "email" => Some(Self::Email),
            "phone" => Some(Self::Phone),
            "webpage" => Some(Self::Webpage),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityAction {
    /// Leave the element exactly as it is.
    Skip,
    /// Keep the existing value; only drop a stale `norm`.
    Keep,
    /// Compute a fresh `anonymized` value.
    Anonymise,
}

/// Control attributes of one `<entity>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityFlags {
    pub kind: Option<EntityKind>,
    pub skip_listed: bool,
    pub anonymised: bool,
    pub normalised: bool,
}

impl EntityFlags {
    pub fn from_start(start: &BytesStart) -> Result<Self> {
        let mut flags = Self::default();
        for attr in start.attributes() {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key.as_ref())?;
            match key {
                "type" => flags.kind = EntityKind::from_type(&attr.unescape_value()?),
                ANONYMIZED_ATTR => flags.anonymised = true,
                NORM_ATTR => flags.normalised = true,
                _ if SKIP_MARKERS.contains(&key) => flags.skip_listed = true,
                _ => {}
            }
        }
        Ok(flags)
    }

    pub fn action(&self, force: bool) -> EntityAction {
        if self.kind.is_none() || self.skip_listed {
            EntityAction::Skip
        } else if self.anonymised && !force {
            EntityAction::Keep
        } else {
            EntityAction::Anonymise
        }
    }
}
