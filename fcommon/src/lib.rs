//! Shared utilities for the fdispatch workspace crates.
//!
//! ```rust
//! use fcommon::{BoxFuture, Registry};
//!
//! let mut registry = Registry::new();
//! registry.insert("search", 1_u32);
//!
//! assert_eq!(registry.vacant_name("search"), "search1");
//! assert_eq!(registry.vacant_name("lookup"), "lookup");
//!
//! fn answer<'a>() -> BoxFuture<'a, u32> {
//!     Box::pin(async { 42 })
//! }
//! let _future = answer();
//! ```

pub mod future {
    //! Boxed future alias shared by the trait seams.
    //!
    //! ```rust
    //! use fcommon::BoxFuture;
    //!
    //! fn delayed_len<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.len() })
    //! }
    //!
    //! let _future = delayed_len("hello");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod registry {
    //! Name-keyed table used for tools and endpoints.
    //!
    //! Entries iterate in name order, so listings are stable across runs.
    //!
    //! ```rust
    //! use fcommon::Registry;
    //!
    //! let mut endpoints = Registry::new();
    //! endpoints.insert("embeddings", 2_u32);
    //! endpoints.insert("chat/completions", 1_u32);
    //!
    //! assert_eq!(endpoints.get("embeddings"), Some(&2));
    //! assert_eq!(endpoints.names(), vec!["chat/completions", "embeddings"]);
    //! ```

    use std::collections::BTreeMap;

    #[derive(Debug, Clone)]
    pub struct Registry<V> {
        entries: BTreeMap<String, V>,
    }

    impl<V> Default for Registry<V> {
        fn default() -> Self {
            Self {
                entries: BTreeMap::new(),
            }
        }
    }

    impl<V> Registry<V> {
        pub fn new() -> Self {
            Self::default()
        }

        /// Stores `value` under `name`, returning the entry it replaced.
        pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
            self.entries.insert(name.into(), value)
        }

        pub fn get(&self, name: &str) -> Option<&V> {
            self.entries.get(name)
        }

        pub fn remove(&mut self, name: &str) -> Option<V> {
            self.entries.remove(name)
        }

        pub fn contains(&self, name: &str) -> bool {
            self.entries.contains_key(name)
        }

        pub fn names(&self) -> Vec<String> {
            self.entries.keys().cloned().collect()
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.entries.values()
        }

        pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
            self.entries
                .iter()
                .map(|(name, value)| (name.as_str(), value))
        }

        pub fn len(&self) -> usize {
            self.entries.len()
        }

        pub fn is_empty(&self) -> bool {
            self.entries.is_empty()
        }

        /// Returns `base` when it is free, otherwise the first of `base1`,
        /// `base2`, ... that is not taken.
        pub fn vacant_name(&self, base: &str) -> String {
            if !self.contains(base) {
                return base.to_string();
            }

            (1_u64..)
                .map(|suffix| format!("{base}{suffix}"))
                .find(|candidate| !self.contains(candidate))
                .unwrap_or_else(|| format!("{base}{}", u64::MAX))
        }
    }

    impl<V> FromIterator<(String, V)> for Registry<V> {
        fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
            Self {
                entries: iter.into_iter().collect(),
            }
        }
    }
}

pub use future::BoxFuture;
pub use registry::Registry;

#[cfg(test)]
mod tests {
    use super::Registry;

    #[test]
    fn insert_replace_and_remove() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        assert_eq!(registry.insert("search", 1_u32), None);
        assert_eq!(registry.insert("search", 2_u32), Some(1));
        assert_eq!(registry.get("search"), Some(&2));
        assert!(registry.contains("search"));
        assert_eq!(registry.len(), 1);

        assert_eq!(registry.remove("search"), Some(2));
        assert!(registry.is_empty());
    }

    #[test]
    fn vacant_name_skips_taken_suffixes() {
        let mut registry = Registry::new();
        registry.insert("echo", 0_u8);
        registry.insert("echo1", 1_u8);

        assert_eq!(registry.vacant_name("echo"), "echo2");
        assert_eq!(registry.vacant_name("ping"), "ping");
    }

    #[test]
    fn listing_follows_name_order() {
        let registry = [("b".to_string(), 2), ("a".to_string(), 1)]
            .into_iter()
            .collect::<Registry<u8>>();

        assert_eq!(registry.names(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(registry.iter().collect::<Vec<_>>(), vec![("a", &1), ("b", &2)]);
    }
}
