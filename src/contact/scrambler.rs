// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! Shape-preserving scrambler for email addresses, web addresses and phone
//! numbers.  Digits stay digits, everything else in a scrambled run becomes
//! a lowercase letter, and lengths never change, so the result still looks
//! like the kind of token it replaced.

use once_cell::sync::Lazy;
use rand::Rng;
use regex::{Captures, Regex};

static LONG_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^.]{4,}").expect("valid regex"));
static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

const LETTERS: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8; 10] = b"0123456789";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    /// Contains `@`: only the local part is scrambled.
    EmailLike,
    /// Contains `.`: labels of four or more characters are scrambled.
    WebLike,
    /// Anything else: digit runs are scrambled.
    PhoneLike,
}

impl ContactKind {
    pub fn classify(text: &str) -> Self {
        if text.contains('@') {
            Self::EmailLike
        } else if text.contains('.') {
            Self::WebLike
        } else {
            Self::PhoneLike
        }
    }
}

/// Scramble `text` according to its `ContactKind`.
pub fn scramble<R: Rng>(text: &str, rng: &mut R) -> String {
    match ContactKind::classify(text) {
        ContactKind::EmailLike => match text.split_once('@') {
            Some((local, domain)) => format!("{}@{domain}", scramble_run(local, rng)),
            None => text.to_string(),
        },
        ContactKind::WebLike => replace_runs(&LONG_LABEL, text, rng),
        ContactKind::PhoneLike => replace_runs(&DIGIT_RUN, text, rng),
    }
}

fn replace_runs<R: Rng>(pattern: &Regex, text: &str, rng: &mut R) -> String {
    pattern
        .replace_all(text, |caps: &Captures| scramble_run(&caps[0], &mut *rng))
        .into_owned()
}

fn scramble_run<R: Rng>(run: &str, rng: &mut R) -> String {
    run.chars()
        .map(|ch| {
            let alphabet: &[u8] = if ch.is_ascii_digit() { DIGITS } else { LETTERS };
            char::from(alphabet[rng.random_range(0..alphabet.len())])
        })
        .collect()
}
