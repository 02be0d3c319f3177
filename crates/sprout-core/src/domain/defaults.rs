//! Named default-value resolvers.
//!
//! A manifest question may say `"defaultFrom": "git.user.name"`; the
//! registry maps such keys to functions computing a value at resolution
//! time. The registry is an ordinary value handed to the answer resolver.

use std::collections::HashMap;
use std::fmt;

use chrono::{Datelike, Local, SecondsFormat, Utc};

/// Computes a default. `None` means "no default".
pub type DefaultResolver = Box<dyn Fn() -> Option<String> + Send + Sync>;

#[derive(Default)]
pub struct DefaultResolverRegistry {
    resolvers: HashMap<String, DefaultResolver>,
}

impl DefaultResolverRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the `date.*` resolvers.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("date.year", || Some(Local::now().year().to_string()));
        registry.register("date.month", || {
            Some(format!("{:02}", Local::now().month()))
        });
        registry.register("date.day", || Some(format!("{:02}", Local::now().day())));
        // `now` is the full UTC timestamp, `iso` only its date part.
        registry.register("date.now", || {
            Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
        });
        registry.register("date.iso", || {
            Some(Utc::now().format("%Y-%m-%d").to_string())
        });
        registry.register("date.timestamp", || {
            Some(Utc::now().timestamp_millis().to_string())
        });
        registry
    }

    /// Add or replace the resolver for `key`.
    pub fn register<F>(&mut self, key: impl Into<String>, resolver: F)
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        self.resolvers.insert(key.into(), Box::new(resolver));
    }

    pub fn unregister(&mut self, key: &str) -> bool {
        self.resolvers.remove(key).is_some()
    }

    /// Run the resolver for `key`. Unknown keys and empty results give `None`.
    pub fn resolve(&self, key: &str) -> Option<String> {
        let resolver = self.resolvers.get(key)?;
        resolver().filter(|v| !v.is_empty())
    }

    pub fn has(&self, key: &str) -> bool {
        self.resolvers.contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.resolvers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl fmt::Debug for DefaultResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultResolverRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_date_resolvers() {
        let registry = DefaultResolverRegistry::with_builtin();
        let year = registry.resolve("date.year").unwrap();
        assert_eq!(year.len(), 4);
        assert_eq!(registry.resolve("date.month").unwrap().len(), 2);
        assert!(registry.resolve("date.timestamp").unwrap().parse::<i64>().is_ok());
        assert!(registry.has("date.iso"));
    }

    #[test]
    fn date_now_is_a_timestamp_and_date_iso_a_date() {
        let registry = DefaultResolverRegistry::with_builtin();

        let now = registry.resolve("date.now").unwrap();
        assert!(now.contains('T'));
        assert!(now.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&now).is_ok());

        let iso = registry.resolve("date.iso").unwrap();
        assert_eq!(iso.len(), 10);
        assert!(!iso.contains('T'));
        assert!(chrono::NaiveDate::parse_from_str(&iso, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn unknown_key_resolves_to_none() {
        assert!(DefaultResolverRegistry::new().resolve("nope").is_none());
    }

    #[test]
    fn empty_result_is_no_default() {
        let mut registry = DefaultResolverRegistry::new();
        registry.register("blank", || Some(String::new()));
        registry.register("failing", || None);
        assert!(registry.resolve("blank").is_none());
        assert!(registry.resolve("failing").is_none());
    }

    #[test]
    fn register_replaces_and_unregister_removes() {
        let mut registry = DefaultResolverRegistry::new();
        registry.register("who", || Some("a".into()));
        registry.register("who", || Some("b".into()));
        assert_eq!(registry.resolve("who").as_deref(), Some("b"));
        assert!(registry.unregister("who"));
        assert!(!registry.unregister("who"));
        assert!(!registry.has("who"));
    }

    #[test]
    fn keys_are_sorted() {
        let registry = DefaultResolverRegistry::with_builtin();
        let keys = registry.keys();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
    }
}
