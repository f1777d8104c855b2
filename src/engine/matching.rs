use icu_normalizer::ComposingNormalizerBorrowed;

/// Canonical form used for answer comparison: trimmed, NFC-composed and
/// lowercased. Letters like `å` and `ø` stay distinct from `a` and `o`;
/// only composed vs. decomposed encodings of the same letter compare equal.
pub fn normalize_answer(raw: &str) -> String {
    let nfc = ComposingNormalizerBorrowed::new_nfc();
    nfc.normalize(raw.trim()).to_lowercase()
}

pub fn is_correct(input: &str, expected: &str) -> bool {
    normalize_answer(input) == normalize_answer(expected)
}

/// First `n` characters of `word`, counted in chars rather than bytes.
pub fn char_prefix(word: &str, n: usize) -> String {
    word.chars().take(n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive() {
        assert!(is_correct("innsatsfaktorer", "Innsatsfaktorer"));
        assert!(is_correct("HEI", "hei"));
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        assert!(is_correct("  takk \n", "takk"));
    }

    #[test]
    fn test_no_partial_credit() {
        assert!(!is_correct("tak", "takk"));
        assert!(!is_correct("takk takk", "takk"));
    }

    #[test]
    fn test_decomposed_diacritics_match() {
        // ø has no canonical decomposition; å is a + combining ring
        assert!(is_correct("pa\u{030a}", "på"));
        assert!(is_correct("\u{00c5}R", "år"));
    }

    #[test]
    fn test_diacritics_are_not_folded() {
        assert!(!is_correct("bor", "bør"));
        assert!(!is_correct("pa", "på"));
    }

    #[test]
    fn test_char_prefix_counts_chars() {
        assert_eq!(char_prefix("bærekraftig", 2), "bæ");
        assert_eq!(char_prefix("hei", 10), "hei");
    }
}
