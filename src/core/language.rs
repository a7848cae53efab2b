use once_cell::sync::Lazy;
use regex::Regex;

/// Language code that marks text as eligible for summarization.
pub const SUMMARY_LANGUAGE: &str = "en";

/// Target language offered before the user has picked one.
pub const DEFAULT_TARGET: &str = "en";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

/// Languages offered by the target selector, in display order.
pub const SUPPORTED_LANGUAGES: &[Language] = &[
    Language { code: "en", name: "English" },
    Language { code: "pt", name: "Portuguese" },
    Language { code: "es", name: "Spanish" },
    Language { code: "ru", name: "Russian" },
    Language { code: "tr", name: "Turkish" },
    Language { code: "fr", name: "French" },
];

static LANGUAGE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)([a-z]{2,3})(?:[-_][a-z0-9]{2,8})*$").expect("static regex compile")
});

/// Normalises a language tag to its lowercase primary subtag.
///
/// Accepts forms like `EN`, `pt-BR` or `zh_Hant`. Returns `None` for anything
/// that is not shaped like a language tag.
#[must_use]
pub fn normalize_code(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches(|c: char| c == '"' || c == '\'' || c == '.');
    LANGUAGE_TAG
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

#[must_use]
pub fn find(code: &str) -> Option<&'static Language> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|lang| lang.code.eq_ignore_ascii_case(code))
}

/// Human readable name for a code, falling back to the code itself.
#[must_use]
pub fn display_name(code: &str) -> String {
    find(code).map_or_else(|| code.to_string(), |lang| lang.name.to_string())
}
