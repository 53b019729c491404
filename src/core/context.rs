//! Filepath: src/core/context.rs
//! Context values and the per-query accumulator.
//!
//! A `Context` names a runtime scope (usually a page type) by a stable
//! `context_key` plus a human-readable `display_name`. The `ContextSet`
//! accumulator keeps insertion order and drops later entries whose display
//! name was already seen.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Key/display name of the bundle of global objects.
pub const GLOBAL_KEY: &str = "global";

/// Key/display name of the settings-only bundle used for assets.
pub const SETTINGS_KEY: &str = "settings";

/// A named runtime scope exposing a fixed bundle of objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context
{
    pub context_key: String,
    pub display_name: String,
}

impl Context
{
    /// Build from a template-like name: the key is everything before the
    /// first `.`, the display name is the full name.
    /// `collection.wholesale` → key `collection`.
    pub fn from_name(name: &str) -> Self
    {
        let key = name
            .split_once('.')
            .map(|(head, _)| head)
            .unwrap_or(name);

        Self { context_key: key.to_string(), display_name: name.to_string() }
    }

    /// A context whose key and display name are the same literal.
    pub fn fixed(key: &str) -> Self
    {
        Self { context_key: key.to_string(), display_name: key.to_string() }
    }

    pub fn global() -> Self
    {
        Self::fixed(GLOBAL_KEY)
    }

    pub fn settings() -> Self
    {
        Self::fixed(SETTINGS_KEY)
    }

    /// True for the bundles that are not page contexts.
    pub fn is_bundle(&self) -> bool
    {
        self.context_key == GLOBAL_KEY || self.context_key == SETTINGS_KEY
    }
}

/// Ordered, deduplicated-by-display-name context list for one query.
#[derive(Debug, Clone, Default)]
pub struct ContextSet
{
    entries: IndexMap<String, Context>,
}

impl ContextSet
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Insert unless the display name is already present.
    /// Returns whether the context was added.
    pub fn insert(
        &mut self,
        context: Context,
    ) -> bool
    {
        if self
            .entries
            .contains_key(&context.display_name)
        {
            return false;
        }

        self.entries
            .insert(context.display_name.clone(), context);
        true
    }

    /// Fold another batch in, keeping first occurrences.
    pub fn merge<I>(
        mut self,
        batch: I,
    ) -> Self
    where
        I: IntoIterator<Item = Context>,
    {
        for context in batch
        {
            self.insert(context);
        }
        self
    }

    pub fn into_vec(self) -> Vec<Context>
    {
        self.entries
            .into_values()
            .collect()
    }
}

impl FromIterator<Context> for ContextSet
{
    fn from_iter<T: IntoIterator<Item = Context>>(iter: T) -> Self
    {
        ContextSet::new().merge(iter)
    }
}

#[cfg(test)]
mod tests
{
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_from_name_splits_at_first_dot()
    {
        let c = Context::from_name("collection.wholesale");
        assert_eq!(c.context_key, "collection");
        assert_eq!(c.display_name, "collection.wholesale");

        let c = Context::from_name("product.a.b");
        assert_eq!(c.context_key, "product");
        assert_eq!(c.display_name, "product.a.b");

        let c = Context::from_name("product");
        assert_eq!(c.context_key, "product");
        assert_eq!(c.display_name, "product");
    }

    #[test]
    fn test_set_keeps_first_and_allows_repeated_keys()
    {
        let set: ContextSet = vec![
            Context::from_name("product"),
            Context::from_name("product.wholesale"),
            Context::fixed("product"),
        ]
        .into_iter()
        .collect();

        let out = set.into_vec();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].display_name, "product");
        assert_eq!(out[1].display_name, "product.wholesale");
        assert!(
            out.iter()
                .all(|c| c.context_key == "product")
        );
    }

    #[test]
    fn test_bundles()
    {
        assert!(Context::global().is_bundle());
        assert!(Context::settings().is_bundle());
        assert!(!Context::from_name("page").is_bundle());
    }

    #[test]
    fn test_json_shape_is_camel_case()
    {
        let json = serde_json::to_value(Context::from_name("collection.wholesale")).unwrap();
        assert_eq!(json["contextKey"], "collection");
        assert_eq!(json["displayName"], "collection.wholesale");
    }

    proptest! {
        #[test]
        fn prop_no_duplicate_display_names(names in proptest::collection::vec("[a-c]{1,2}(\\.[a-c]{1,2})?", 0..30))
        {
            let set: ContextSet = names
                .iter()
                .map(|n| Context::from_name(n))
                .collect();
            let out = set.into_vec();
            let unique: HashSet<_> = out
                .iter()
                .map(|c| c.display_name.clone())
                .collect();
            prop_assert_eq!(unique.len(), out.len());
        }
    }
}
