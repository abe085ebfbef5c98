// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

use deunicode::deunicode;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Matching key for a name: compatibility-decomposed, combining marks
/// dropped, transliterated to ASCII, lower-cased.  Used for pool lookups and
/// substitution store keys; never written to the output.
pub fn normalise(name: &str) -> String {
    let stripped: String = name.nfkd().filter(|ch| !is_combining_mark(*ch)).collect();
    // Letters with no decomposition (ł, ø, ß, æ) still need folding.
    deunicode(&stripped).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Maria", "maria")]
    #[case("José", "jose")]
    #[case("ÁLVARO", "alvaro")]
    #[case("Conceição", "conceicao")]
    #[case("Núñez", "nunez")]
    #[case("Łukasz", "lukasz")]
    #[case("Søren", "soren")]
    #[case("Weiß", "weiss")]
    #[case("Æsa", "aesa")]
    fn folds_to_lower_case_ascii(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalise(input), expected);
    }

    #[test]
    fn precomposed_and_decomposed_forms_agree() {
        assert_eq!(normalise("Jos\u{00e9}"), normalise("Jose\u{0301}"));
    }

    #[test]
    fn keys_are_ascii() {
        for name in ["Conceição", "Łukasz", "Ødegård", "Straße", "Þóra"] {
            assert!(normalise(name).is_ascii(), "{name}");
        }
    }
}
