//! Locale fallback chains.
//!
//! Derives the ordered list of candidate bundle identifiers for a base name
//! and a requested locale. The most specific candidate comes first and the
//! bare base name always comes last:
//!
//! ```text
//! messages + de_AT (default en_US, fallback on)
//!   → messages_de_AT, messages_de, messages_en_US, messages_en, messages
//! ```
//!
//! The computation is pure; [`crate::cache::FilenameCache`] memoizes it.

use crate::locale::Locale;

/// Candidates contributed by a single locale, most specific first.
///
/// The variant-qualified candidate is only produced when the locale also
/// has a language or a region.
pub fn candidates_for_locale(basename: &str, locale: &Locale) -> Vec<String> {
    let mut result = Vec::with_capacity(3);
    let language = locale.language();
    let region = locale.region();
    let variant = locale.variant();

    let mut name = String::with_capacity(basename.len() + 16);
    name.push_str(basename);

    name.push('_');
    if !language.is_empty() {
        name.push_str(language);
        result.insert(0, name.clone());
    }

    name.push('_');
    if !region.is_empty() {
        name.push_str(region);
        result.insert(0, name.clone());
    }

    if !variant.is_empty() && (!language.is_empty() || !region.is_empty()) {
        name.push('_');
        name.push_str(variant);
        result.insert(0, name);
    }

    result
}

/// Full fallback chain for a base name and locale.
///
/// # Arguments
///
/// * `basename` - Bundle family name
/// * `locale` - Requested locale
/// * `default_locale` - Process default locale
/// * `fallback_to_default_locale` - Whether to append the default locale's
///   candidates when `locale` differs from it
///
/// # Example
///
/// ```
/// use bundlecache::{fallback_chain, Locale};
///
/// let chain = fallback_chain(
///     "messages",
///     &Locale::new("de", "AT", ""),
///     &Locale::new("en", "US", ""),
///     true,
/// );
/// assert_eq!(
///     chain,
///     vec!["messages_de_AT", "messages_de", "messages_en_US", "messages_en", "messages"]
/// );
/// ```
pub fn fallback_chain(
    basename: &str,
    locale: &Locale,
    default_locale: &Locale,
    fallback_to_default_locale: bool,
) -> Vec<String> {
    let mut chain = Vec::with_capacity(7);
    chain.extend(candidates_for_locale(basename, locale));

    if fallback_to_default_locale && locale != default_locale {
        for candidate in candidates_for_locale(basename, default_locale) {
            if !chain.contains(&candidate) {
                chain.push(candidate);
            }
        }
    }

    // A root locale contributes no candidates, so this can't duplicate
    chain.push(basename.to_string());
    chain
}
