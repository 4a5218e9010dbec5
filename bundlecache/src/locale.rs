//! Locale identifiers used to address bundle variants.
//!
//! A [`Locale`] is a plain triple of language, region and variant tags. Any
//! of the three may be empty. Equality and hashing are structural, so two
//! locales parsed from `en_US` and `en-us` are the same cache key.
//!
//! Textual form follows the bundle file naming convention:
//! `language_REGION_variant`, with empty trailing parts omitted
//! (`en`, `en_US`, `_US`, `en_US_POSIX`).

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

/// Environment variables consulted for the process default locale, in order.
const LOCALE_ENV_VARS: &[&str] = &["LC_ALL", "LC_MESSAGES", "LANG"];

/// A language/region/variant triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Locale {
    language: String,
    region: String,
    variant: String,
}

/// Error parsing a locale string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid locale: {0:?}")]
pub struct InvalidLocale(pub String);

impl Locale {
    /// Create a locale from its tags.
    ///
    /// Language is lowercased and region uppercased; the variant is kept
    /// as given.
    ///
    /// # Example
    ///
    /// ```
    /// use bundlecache::Locale;
    ///
    /// let locale = Locale::new("EN", "us", "");
    /// assert_eq!(locale.to_string(), "en_US");
    /// ```
    pub fn new(
        language: impl Into<String>,
        region: impl Into<String>,
        variant: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into().trim().to_lowercase(),
            region: region.into().trim().to_uppercase(),
            variant: variant.into().trim().to_string(),
        }
    }

    /// A locale with only a language tag.
    pub fn language_only(language: impl Into<String>) -> Self {
        Self::new(language, "", "")
    }

    /// The root locale (all tags empty).
    pub fn root() -> Self {
        Self::default()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// True if all tags are empty.
    pub fn is_root(&self) -> bool {
        self.language.is_empty() && self.region.is_empty() && self.variant.is_empty()
    }

    /// Determine the process default locale from the environment.
    ///
    /// Checks `LC_ALL`, `LC_MESSAGES` and `LANG` in that order, ignoring the
    /// `C`/`POSIX` pseudo-locales and any codeset or modifier suffix
    /// (`de_DE.UTF-8@euro` → `de_DE`). Falls back to `en` when nothing
    /// usable is set.
    pub fn system_default() -> Self {
        LOCALE_ENV_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find_map(|value| Self::from_posix(&value))
            .unwrap_or_else(|| Self::language_only("en"))
    }

    /// Parse a POSIX-style locale value such as `pt_BR.UTF-8`.
    ///
    /// Returns `None` for empty values and the `C`/`POSIX` pseudo-locales.
    pub fn from_posix(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() || value == "C" || value == "POSIX" || value.starts_with("C.") {
            return None;
        }
        let base = value
            .split(['.', '@'])
            .next()
            .unwrap_or_default();
        base.parse().ok().filter(|l: &Locale| !l.is_root())
    }
}

/// Regex for `language[_REGION[_variant]]`, with `_` or `-` separators.
///
/// - Group 1: language (letters, may be empty)
/// - Group 2: region (letters or a 3-digit area code, may be empty)
/// - Group 3: variant (anything after the second separator)
fn locale_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z]{0,8})(?:[_-]([A-Za-z]{0,3}|\d{3})(?:[_-](.+))?)?$")
            .expect("locale pattern is a valid regex")
    })
}

impl FromStr for Locale {
    type Err = InvalidLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let captures = locale_pattern()
            .captures(trimmed)
            .ok_or_else(|| InvalidLocale(s.to_string()))?;

        let part = |i: usize| captures.get(i).map(|m| m.as_str()).unwrap_or_default();
        Ok(Self::new(part(1), part(2), part(3)))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)?;
        if !self.region.is_empty() || !self.variant.is_empty() {
            write!(f, "_{}", self.region)?;
        }
        if !self.variant.is_empty() {
            write!(f, "_{}", self.variant)?;
        }
        Ok(())
    }
}
