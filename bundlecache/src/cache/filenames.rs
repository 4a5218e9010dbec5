//! Memoized fallback chains.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::fallback::fallback_chain;
use crate::locale::Locale;

/// Fallback chains keyed by base name, then locale.
///
/// Chains depend only on configuration, so entries are never invalidated.
pub struct FilenameCache {
    default_locale: Locale,
    fallback_to_default_locale: bool,
    chains: Mutex<HashMap<String, HashMap<Locale, Arc<Vec<String>>>>>,
}

impl FilenameCache {
    pub fn new(default_locale: Locale, fallback_to_default_locale: bool) -> Self {
        Self {
            default_locale,
            fallback_to_default_locale,
            chains: Mutex::new(HashMap::new()),
        }
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    /// Candidate identifiers for `basename` and `locale`, most specific first.
    pub fn candidates(&self, basename: &str, locale: &Locale) -> Arc<Vec<String>> {
        let mut chains = self.chains.lock();
        if let Some(chain) = chains.get(basename).and_then(|by_locale| by_locale.get(locale)) {
            return Arc::clone(chain);
        }

        let chain = Arc::new(fallback_chain(
            basename,
            locale,
            &self.default_locale,
            self.fallback_to_default_locale,
        ));
        chains
            .entry(basename.to_string())
            .or_default()
            .insert(locale.clone(), Arc::clone(&chain));
        chain
    }

    /// Number of memoized chains.
    pub fn len(&self) -> usize {
        self.chains.lock().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_are_memoized() {
        let cache = FilenameCache::new(Locale::language_only("en"), true);
        let de = Locale::new("de", "AT", "");

        let first = cache.candidates("messages", &de);
        let second = cache.candidates("messages", &de);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            *first,
            vec!["messages_de_AT", "messages_de", "messages_en", "messages"]
        );
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_candidates_keyed_by_basename_and_locale() {
        let cache = FilenameCache::new(Locale::language_only("en"), false);
        let fr = Locale::language_only("fr");

        cache.candidates("app", &fr);
        cache.candidates("app", &Locale::language_only("de"));
        let other = cache.candidates("other", &fr);

        assert_eq!(*other, vec!["other_fr", "other"]);
        assert_eq!(cache.len(), 3);
    }
}
