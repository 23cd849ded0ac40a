// 🔗 Slugs - URL-safe path segments derived from titles
//
// Unicode letters are kept as-is ("Напитки" → "напитки"), so slugs for
// non-Latin catalogs stay readable instead of being transliterated.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}_\s-]").expect("static slug pattern"));

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("static slug pattern"));

/// Convert a title to a slug.
///
/// NFKC-normalises, lowercases, drops anything that is not a letter, digit,
/// underscore, whitespace or a hyphen (combining marks included), collapses whitespace/hyphen runs to a single `-`
/// and trims `-` and `_` from both ends.
pub fn slugify(text: &str) -> String {
    let normalized: String = text.nfkc().collect();
    let lowered = normalized.to_lowercase();
    let cleaned = DISALLOWED.replace_all(&lowered, "");
    SEPARATORS
        .replace_all(&cleaned, "-")
        .trim_matches(|c: char| c == '-' || c == '_')
        .to_string()
}
