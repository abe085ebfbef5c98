// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Deterministic person-name substitution.
//!
//! Each name component of a person is swapped for another name of the same
//! category drawn from the country's frequency-ranked pool:
//!
//! * a component found in the pool at rank `r` is replaced by one of the
//!   names ranked just below it (`r+1 ..= r+1+span`), so common names stay
//!   common and rare ones stay rare;
//! * a component not found in the pool is replaced by one of the most
//!   frequent names (`0 ..= fallback_end`);
//! * every drawn name leaves the pool, and the choice is remembered under
//!   the component's matching key, so within one document the same input
//!   always gets the same replacement and two inputs never share one.
//!
//! All state lives in a `NameSubstituter` owned by a single run.

use crate::error::AnonymiseError;
use crate::names::{Category, DocumentRng, NamePool, PersonSkeleton, RankDraw, normalise};
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub const DEFAULT_WINDOW_SPAN: usize = 20;
/// Upper rank of the window used for names missing from the pool.  The
/// assumption behind it (unmatched names are unusual ones) is unverified.
pub const DEFAULT_FALLBACK_END: usize = 150;

/// Inclusive rank range a replacement is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    /// A name matched at rank `r` draws from `r+1 ..= r+1+span`.
    pub span: usize,
    pub fallback_end: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            span: DEFAULT_WINDOW_SPAN,
            fallback_end: DEFAULT_FALLBACK_END,
        }
    }
}

impl WindowConfig {
    /// Window for a component matched at `rank` (or unmatched), clamped to a
    /// pool currently holding `len` names.  A matched window that lies wholly
    /// past the end of the pool degrades to the fallback window, which then
    /// stops short of the component itself.  `None` means nothing is left to
    /// draw.
    pub fn window(&self, rank: Option<usize>, len: usize) -> Option<Window> {
        let mut last = len.checked_sub(1)?;
        if let Some(rank) = rank {
            let start = rank + 1;
            let end = rank.saturating_add(self.span).saturating_add(1).min(last);
            if start <= end {
                return Some(Window { start, end });
            }
            // Nothing ranks below the component, so it is the last entry.
            last = last.checked_sub(1)?;
        }
        Some(Window {
            start: 0,
            end: self.fallback_end.min(last),
        })
    }
}

/// Replacement chosen so far for each matching key.
#[derive(Debug, Clone, Default)]
pub struct SubstitutionStore {
    chosen: HashMap<String, String>,
}

impl SubstitutionStore {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.chosen.get(key).map(String::as_str)
    }

    /// Record the first replacement for `key`; later records are ignored so a
    /// key never changes its replacement within a run.
    pub fn record(&mut self, key: String, replacement: String) {
        self.chosen.entry(key).or_insert(replacement);
    }

    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }
}

/// Post-processing applied to an assembled replacement, keyed by the literal
/// full name it replaces.
pub trait NameRule {
    fn apply(&self, full_name: &str, replacement: String) -> String;
}

/// Suffix appended when the original full name is one of a fixed set of
/// plural-looking names (Portuguese/Spanish orthography).
#[derive(Debug, Clone)]
pub struct PluralSuffix {
    names: HashSet<String>,
    suffix: String,
}

impl PluralSuffix {
    pub fn new<I, S>(names: I, suffix: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            suffix: suffix.to_string(),
        }
    }
}

impl Default for PluralSuffix {
    fn default() -> Self {
        Self::new(["Marias", "Anas", "Argolos"], "s")
    }
}

impl NameRule for PluralSuffix {
    fn apply(&self, full_name: &str, mut replacement: String) -> String {
        if self.names.contains(full_name) {
            replacement.push_str(&self.suffix);
        }
        replacement
    }
}

pub struct NameSubstituter<D = DocumentRng> {
    pool: NamePool,
    store: SubstitutionStore,
    draw: D,
    windows: WindowConfig,
    rules: Vec<Box<dyn NameRule>>,
}

impl<D: RankDraw> NameSubstituter<D> {
    pub fn new(pool: NamePool, draw: D, windows: WindowConfig) -> Self {
        Self {
            pool,
            store: SubstitutionStore::default(),
            draw,
            windows,
            rules: vec![Box::new(PluralSuffix::default())],
        }
    }

    /// Replace the post-processing rules (the plural suffix by default).
    pub fn with_rules(mut self, rules: Vec<Box<dyn NameRule>>) -> Self {
        self.rules = rules;
        self
    }

    /// Anonymised value for a person: one replacement per skeleton component,
    /// space-joined in declaration order, then passed through the rules.
    pub fn anonymise(
        &mut self,
        full_name: &str,
        skeleton: &PersonSkeleton,
    ) -> Result<String, AnonymiseError> {
        let mut parts = Vec::with_capacity(skeleton.components().len());
        for (component, category) in skeleton.components() {
            parts.push(self.replacement_for(component, *category)?);
        }

        let assembled = parts.join(" ");
        Ok(self
            .rules
            .iter()
            .fold(assembled, |value, rule| rule.apply(full_name, value)))
    }

    /// Replacement for a single component, reusing an earlier choice for the
    /// same matching key.
    pub fn replacement_for(
        &mut self,
        component: &str,
        category: Category,
    ) -> Result<String, AnonymiseError> {
        let key = normalise(component);
        if let Some(existing) = self.store.get(&key) {
            return Ok(existing.to_string());
        }

        let names = self.pool.names_mut(category);
        let window = self
            .windows
            .window(names.rank_of(&key), names.len())
            .ok_or(AnonymiseError::PoolExhausted { category })?;
        let rank = self.draw.draw(window);
        debug!(
            "got random {rank} between {} and {} ({category})",
            window.start, window.end
        );

        let replacement = names
            .take(rank)
            .ok_or(AnonymiseError::PoolExhausted { category })?;
        self.store.record(key, replacement.clone());
        Ok(replacement)
    }

    pub fn store(&self) -> &SubstitutionStore {
        &self.store
    }

    pub fn pool(&self) -> &NamePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::document_rng;
    use std::collections::VecDeque;

    /// Draw that replays fixed ranks, checking each against its window.
    struct Scripted {
        ranks: VecDeque<usize>,
        windows: Vec<Window>,
    }

    impl Scripted {
        fn new(ranks: &[usize]) -> Self {
            Self {
                ranks: ranks.iter().copied().collect(),
                windows: Vec::new(),
            }
        }
    }

    impl RankDraw for Scripted {
        fn draw(&mut self, window: Window) -> usize {
            self.windows.push(window);
            let rank = self.ranks.pop_front().expect("scripted rank");
            assert!(
                (window.start..=window.end).contains(&rank),
                "scripted rank {rank} outside {window:?}"
            );
            rank
        }
    }

    /// 200 feminine names `F000`..`F199` (plus Maria on top), 200 surnames.
    fn big_pool() -> NamePool {
        let mut rows = String::from("Maria,fem,100000\n");
        for i in 0..200 {
            rows.push_str(&format!("F{i:03},fem,{}\n", 1000 - i));
            rows.push_str(&format!("S{i:03},surname,{}\n", 1000 - i));
        }
        NamePool::parse(&rows).expect("valid pool")
    }

    fn skeleton(parts: &[(&str, Category)]) -> PersonSkeleton {
        PersonSkeleton::new(
            parts
                .iter()
                .map(|(name, category)| (name.to_string(), *category))
                .collect(),
        )
    }

    #[test]
    fn maria_example_takes_fourth_most_frequent() {
        let pool = NamePool::parse("Maria,fem,500\nAna,fem,400\nRita,fem,300\nInês,fem,200\nEva,fem,100\n")
            .expect("valid");
        let mut engine = NameSubstituter::new(pool, Scripted::new(&[3]), WindowConfig::default());
        let value = engine
            .anonymise("Maria", &skeleton(&[("Maria", Category::Feminine)]))
            .expect("anonymised");

        assert_eq!(value, "Inês");
        assert_eq!(engine.draw.windows, vec![Window { start: 1, end: 4 }]);
        assert_eq!(engine.pool().names(Category::Feminine).rank_of("ines"), None);
        assert_eq!(engine.pool().names(Category::Feminine).len(), 4);
    }

    #[test]
    fn matched_window_is_next_twenty_one_names() {
        let config = WindowConfig::default();
        assert_eq!(config.window(Some(0), 500), Some(Window { start: 1, end: 21 }));
        assert_eq!(config.window(Some(37), 500), Some(Window { start: 38, end: 58 }));
    }

    #[test]
    fn unmatched_window_is_fallback() {
        let config = WindowConfig::default();
        assert_eq!(config.window(None, 500), Some(Window { start: 0, end: 150 }));
        let narrow = WindowConfig {
            fallback_end: 9,
            ..WindowConfig::default()
        };
        assert_eq!(narrow.window(None, 500), Some(Window { start: 0, end: 9 }));
    }

    #[test]
    fn windows_are_clamped_to_remaining_pool() {
        let config = WindowConfig::default();
        assert_eq!(config.window(Some(5), 10), Some(Window { start: 6, end: 9 }));
        assert_eq!(config.window(None, 4), Some(Window { start: 0, end: 3 }));
        // Matched at the very end: nothing below it, so fall back without it.
        assert_eq!(config.window(Some(9), 10), Some(Window { start: 0, end: 8 }));
        assert_eq!(config.window(None, 0), None);
        assert_eq!(config.window(Some(0), 1), None, "only the name itself is left");
        let narrow = WindowConfig {
            fallback_end: 3,
            ..WindowConfig::default()
        };
        assert_eq!(narrow.window(Some(9), 10), Some(Window { start: 0, end: 3 }));
    }

    #[test]
    fn matched_component_lands_in_window() {
        let mut engine = NameSubstituter::new(big_pool(), document_rng("doc-7"), WindowConfig::default());
        // F010 sits at rank 11 (Maria is rank 0).
        let value = engine
            .replacement_for("F010", Category::Feminine)
            .expect("replacement");
        let index: usize = value[1..].parse().expect("generated name");
        let rank = index + 1;
        assert!((12..=32).contains(&rank), "{value} outside window");
    }

    #[test]
    fn unmatched_component_lands_in_fallback() {
        let mut engine = NameSubstituter::new(big_pool(), document_rng("doc-8"), WindowConfig::default());
        for name in ["Xavier", "Yolanda", "Zuleica"] {
            let value = engine
                .replacement_for(name, Category::Surname)
                .expect("replacement");
            let rank: usize = value[1..].parse().expect("generated name");
            // Earlier removals only shift later names up, never past 150 + removals.
            assert!(rank <= 152, "{value} outside fallback window");
        }
    }

    #[test]
    fn same_component_gets_same_replacement() {
        let mut engine = NameSubstituter::new(big_pool(), document_rng("doc-1"), WindowConfig::default());
        let first = engine
            .anonymise("Maria Silva", &skeleton(&[("Maria", Category::Feminine), ("Silva", Category::Surname)]))
            .expect("first");
        let second = engine
            .anonymise("Maria Sousa", &skeleton(&[("María", Category::Feminine), ("Sousa", Category::Surname)]))
            .expect("second");

        let first_given = first.split(' ').next();
        let second_given = second.split(' ').next();
        assert_eq!(first_given, second_given, "normalised Maria must map consistently");
        assert_ne!(first, second);
    }

    #[test]
    fn replacements_are_never_reused() {
        let mut engine = NameSubstituter::new(big_pool(), document_rng("doc-2"), WindowConfig::default());
        let mut seen = HashSet::new();
        for i in 0..120 {
            let value = engine
                .replacement_for(&format!("Unknown{i}"), Category::Surname)
                .expect("replacement");
            assert!(seen.insert(value.clone()), "{value} handed out twice");
        }
        assert_eq!(engine.store().len(), 120);
        assert_eq!(engine.pool().names(Category::Surname).len(), 80);
    }

    #[test]
    fn exhausted_neighbourhood_falls_back() {
        // Ana 0, Rita 1, Eva 2, Zé 3.  Once Zé is gone nothing ranks below Eva.
        let pool = NamePool::parse("Zé,fem,1\nAna,fem,10\nRita,fem,5\nEva,fem,4\n").expect("valid");
        let mut engine = NameSubstituter::new(pool, Scripted::new(&[3, 1, 1]), WindowConfig::default());
        assert_eq!(engine.replacement_for("Rita", Category::Feminine).expect("rita"), "Zé");
        assert_eq!(engine.replacement_for("Eva", Category::Feminine).expect("eva"), "Rita");
        assert_eq!(engine.replacement_for("Ana", Category::Feminine).expect("ana"), "Eva");
        assert_eq!(
            engine.draw.windows,
            vec![
                Window { start: 2, end: 3 },
                Window { start: 0, end: 1 },
                Window { start: 1, end: 1 },
            ]
        );
    }

    #[test]
    fn least_frequent_name_never_maps_to_itself() {
        for i in 0..50 {
            let pool = NamePool::parse("Ana,fem,10\nEva,fem,4\n").expect("valid");
            let mut engine =
                NameSubstituter::new(pool, document_rng(&format!("d{i}")), WindowConfig::default());
            assert_eq!(
                engine.replacement_for("Eva", Category::Feminine).expect("eva"),
                "Ana",
                "seed d{i}"
            );
        }
    }

    #[test]
    fn sole_remaining_name_is_exhausted() {
        let pool = NamePool::parse("Eva,fem,4\n").expect("valid");
        let mut engine = NameSubstituter::new(pool, document_rng("solo"), WindowConfig::default());
        assert_eq!(
            engine.replacement_for("Eva", Category::Feminine),
            Err(AnonymiseError::PoolExhausted {
                category: Category::Feminine
            })
        );
    }

    #[test]
    fn empty_pool_is_exhausted() {
        let pool = NamePool::parse("Ana,fem,10\n").expect("valid");
        let mut engine = NameSubstituter::new(pool, document_rng("tiny"), WindowConfig::default());
        engine.replacement_for("Rui", Category::Feminine).expect("one name left");
        assert_eq!(
            engine.replacement_for("Luís", Category::Feminine),
            Err(AnonymiseError::PoolExhausted {
                category: Category::Feminine
            })
        );
        assert!(matches!(
            engine.replacement_for("Costa", Category::Surname),
            Err(AnonymiseError::PoolExhausted { .. })
        ));
    }

    #[test]
    fn plural_exception_appends_suffix() {
        let mut engine = NameSubstituter::new(big_pool(), Scripted::new(&[4]), WindowConfig::default());
        let value = engine
            .anonymise("Marias", &skeleton(&[("Maria", Category::Feminine)]))
            .expect("anonymised");
        assert_eq!(value, "F003s");
        assert_eq!(engine.store().get("maria"), Some("F003"), "store keeps the bare name");
    }

    #[test]
    fn custom_rules_replace_default() {
        let mut engine = NameSubstituter::new(big_pool(), Scripted::new(&[4]), WindowConfig::default())
            .with_rules(Vec::new());
        let value = engine
            .anonymise("Marias", &skeleton(&[("Maria", Category::Feminine)]))
            .expect("anonymised");
        assert_eq!(value, "F003");
    }

    #[test]
    fn identical_seed_identical_choices() {
        let people = [
            ("Maria Silva", skeleton(&[("Maria", Category::Feminine), ("Silva", Category::Surname)])),
            ("F010 S020", skeleton(&[("F010", Category::Feminine), ("S020", Category::Surname)])),
            ("Ana Costa", skeleton(&[("Ana", Category::Feminine), ("Costa", Category::Surname)])),
        ];
        let run = || {
            let mut engine = NameSubstituter::new(big_pool(), document_rng("PT-0042"), WindowConfig::default());
            people
                .iter()
                .map(|(name, skel)| engine.anonymise(name, skel).expect("anonymised"))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
