//! Filepath: src/core/manifest.rs
//! JSON template manifest scanner.
//!
//! Answers "which pages compose a section of this type?" by reading every
//! `templates/**/*.json` manifest and matching `sections.*.type` (and the
//! nested block types) against the queried name. Section group files
//! (`sections/*.json`) are rendered by the layout on every page, so a hit
//! there yields the global context.
//!
//! Manifests often start with a generated `/* ... */` banner, which strict
//! JSON rejects; comments are stripped textually before parsing. A
//! manifest that still fails to parse is logged and skipped.

use std::path::Path;
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::{Captures, Regex};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::core::classify::normalize_path;
use crate::core::context::Context;
use crate::core::discover::DiscoveryError;
use crate::infra::config::OverrideRule;
use crate::infra::source::ThemeSource;

/// Page template manifests, any depth.
pub const TEMPLATE_MANIFESTS: &str = "templates/**/*.json";

/// Header/footer style section groups.
pub const SECTION_GROUPS: &str = "sections/*.json";

/// String literals are captured and kept; comments are dropped.
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)("(?:[^"\\]|\\.)*")|/\*.*?\*/|//[^\n]*"#).expect("comment pattern")
});

/// Entries of a `sections` or `blocks` map. Arrays are accepted too; any
/// other shape has no entries.
fn entries(value: Option<&Value>) -> Vec<&Value>
{
    match value
    {
        Some(Value::Object(map)) => map
            .values()
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .collect(),
        _ => Vec::new(),
    }
}

/// Does this entry, or any block nested in it, have `type == fragment_type`?
/// Entries of an unexpected shape simply do not match.
fn entry_references(
    entry: &Value,
    fragment_type: &str,
) -> bool
{
    let own = entry
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|k| k.eq_ignore_ascii_case(fragment_type));

    own || entries(entry.get("blocks"))
        .into_iter()
        .any(|b| entry_references(b, fragment_type))
}

/// Remove `/* */` and `//` comments outside string literals.
pub fn strip_json_comments(text: &str) -> String
{
    COMMENT_RE
        .replace_all(text, |caps: &Captures<'_>| {
            caps.get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| " ".to_string())
        })
        .into_owned()
}

/// Does this manifest text reference `fragment_type` (case-insensitive)?
pub fn manifest_references(
    text: &str,
    fragment_type: &str,
) -> Result<bool, serde_json::Error>
{
    let manifest: Value = serde_json::from_str(&strip_json_comments(text))?;

    Ok(entries(manifest.get("sections"))
        .into_iter()
        .any(|entry| entry_references(entry, fragment_type)))
}

/// Context a page manifest stands for. Segment override rules win over
/// the file name.
pub fn manifest_context(
    path: &Path,
    rules: &[OverrideRule],
) -> Context
{
    let normalized = format!("/{}", normalize_path(&path.to_string_lossy()));

    let pinned = rules
        .iter()
        .find_map(|rule| {
            match rule
            {
                OverrideRule::ManifestSegment { segment, context_key }
                    if normalized.contains(&normalize_path(segment)) =>
                {
                    Some(context_key)
                }
                _ => None,
            }
        });

    if let Some(context_key) = pinned
    {
        return Context::fixed(context_key);
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();

    Context::from_name(&stem)
}

/// Scans manifests through a `ThemeSource`.
pub struct ManifestScanner<'a>
{
    source: &'a dyn ThemeSource,
    rules: &'a [OverrideRule],
}

impl<'a> ManifestScanner<'a>
{
    pub fn new(
        source: &'a dyn ThemeSource,
        rules: &'a [OverrideRule],
    ) -> Self
    {
        Self { source, rules }
    }

    /// Contexts of every manifest wiring in `fragment_type`, in
    /// enumeration order. Page templates first, then section groups.
    #[instrument(skip(self, cancel))]
    pub fn find_contexts_using(
        &self,
        fragment_type: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Context>, DiscoveryError>
    {
        let mut found = self.scan(TEMPLATE_MANIFESTS, fragment_type, cancel, |path| {
            manifest_context(path, self.rules)
        })?;

        found.extend(self.scan(SECTION_GROUPS, fragment_type, cancel, |_| Context::global())?);

        debug!(matches = found.len(), "manifest scan done");
        Ok(found)
    }

    fn scan<F>(
        &self,
        pattern: &str,
        fragment_type: &str,
        cancel: &CancellationToken,
        to_context: F,
    ) -> Result<Vec<Context>, DiscoveryError>
    where
        F: Fn(&Path) -> Context + Sync,
    {
        let files = match self
            .source
            .list_files(pattern)
        {
            Ok(files) => files,
            Err(err) =>
            {
                warn!(pattern, error = %err, "cannot enumerate manifests");
                return Ok(Vec::new());
            }
        };

        // Each file yields a local value; merge happens after the fan-out.
        let hits = files
            .par_iter()
            .map(|path| {
                if cancel.is_cancelled()
                {
                    return Err(DiscoveryError::Cancelled);
                }
                Ok(self
                    .references(path, fragment_type)
                    .then(|| to_context(path)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(hits
            .into_iter()
            .flatten()
            .collect())
    }

    /// Per-file check; unreadable or malformed files count as no match.
    fn references(
        &self,
        path: &Path,
        fragment_type: &str,
    ) -> bool
    {
        let text = match self
            .source
            .read_text(path)
        {
            Ok(text) => text,
            Err(err) =>
            {
                debug!(path = %path.display(), error = %err, "skipping unreadable manifest");
                return false;
            }
        };

        match manifest_references(&text, fragment_type)
        {
            Ok(hit) => hit,
            Err(err) =>
            {
                warn!(path = %path.display(), error = %err, "skipping malformed manifest");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::infra::source::MemorySource;

    const HERO_TEMPLATE: &str = r#"/*
 * IMPORTANT: The contents of this file are auto-generated.
 */
{
  "sections": {
    "main": { "type": "Hero", "settings": { "link": "https://example.com/a//b" } }
  },
  "order": ["main"]
}"#;

    fn scan(
        source: &MemorySource,
        fragment: &str,
    ) -> Vec<Context>
    {
        let rules = OverrideRule::defaults();
        ManifestScanner::new(source, &rules)
            .find_contexts_using(fragment, &CancellationToken::new())
            .unwrap()
    }

    #[test]
    fn test_strip_keeps_strings()
    {
        let cleaned = strip_json_comments(r#"{"u": "http://x/*y*/"} // trailing"#);
        assert_eq!(cleaned.trim_end(), r#"{"u": "http://x/*y*/"}"#);
    }

    #[test]
    fn test_manifest_references_case_insensitive_and_nested_blocks()
    {
        assert!(manifest_references(HERO_TEMPLATE, "hero").unwrap());
        assert!(!manifest_references(HERO_TEMPLATE, "footer").unwrap());

        let nested = r#"{"sections":{"s":{"type":"slideshow","blocks":{"b":{"type":"slide"}}}}}"#;
        assert!(manifest_references(nested, "slide").unwrap());
        assert!(!manifest_references(r#"{"name":"x"}"#, "slide").unwrap());
        assert!(manifest_references("{ not json", "slide").is_err());
    }

    #[test]
    fn test_odd_sibling_entries_do_not_hide_a_match()
    {
        let numeric_type = r#"{"sections":{"a":{"type":"hero"},"b":{"type":3}}}"#;
        assert!(manifest_references(numeric_type, "hero").unwrap());

        let array_blocks = r#"{"sections":{"a":{"type":"hero","blocks":[]}}}"#;
        assert!(manifest_references(array_blocks, "hero").unwrap());

        let listed_blocks = r#"{"sections":{"s":{"type":"slideshow","blocks":[{"type":"slide"}]}}}"#;
        assert!(manifest_references(listed_blocks, "slide").unwrap());

        assert!(!manifest_references(r#"{"sections":"oops"}"#, "hero").unwrap());
        assert!(!manifest_references("[1, 2]", "hero").unwrap());
    }

    #[test]
    fn test_variant_manifest_keeps_display_name()
    {
        let source = MemorySource::new().with_file("templates/collection.wholesale.json", HERO_TEMPLATE);

        assert_eq!(
            scan(&source, "hero"),
            vec![Context {
                context_key: "collection".to_string(),
                display_name: "collection.wholesale".to_string(),
            }]
        );
    }

    #[test]
    fn test_metaobject_segment_override()
    {
        let source = MemorySource::new()
            .with_file("templates/metaobject/book.json", HERO_TEMPLATE)
            .with_file("templates/metaobject/author.alt.json", HERO_TEMPLATE);

        let found = scan(&source, "hero");
        assert_eq!(found.len(), 2);
        assert!(
            found
                .iter()
                .all(|c| c.context_key == "metaobject")
        );
    }

    #[test]
    fn test_malformed_manifest_is_skipped()
    {
        let source = MemorySource::new()
            .with_file("templates/article.json", HERO_TEMPLATE)
            .with_file("templates/broken.json", "{ \"sections\": { ")
            .with_file("templates/page.json", HERO_TEMPLATE);

        let keys: Vec<_> = scan(&source, "hero")
            .into_iter()
            .map(|c| c.context_key)
            .collect();
        assert_eq!(keys, vec!["article", "page"]);
    }

    #[test]
    fn test_section_group_yields_global()
    {
        let group = r#"{"type":"header","name":"Header","sections":{"h":{"type":"announcement"}},"order":["h"]}"#;
        let source = MemorySource::new().with_file("sections/header-group.json", group);

        assert_eq!(scan(&source, "announcement"), vec![Context::global()]);
    }

    #[test]
    fn test_cancelled_scan()
    {
        let source = MemorySource::new().with_file("templates/page.json", HERO_TEMPLATE);
        let rules = OverrideRule::defaults();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = ManifestScanner::new(&source, &rules).find_contexts_using("hero", &cancel);
        assert!(matches!(result, Err(DiscoveryError::Cancelled)));
    }
}
