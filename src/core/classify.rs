//! Filepath: src/core/classify.rs
//! Structural classification of theme files by location.
//!
//! The category of a file is decided purely from its path: separators are
//! normalized to `/`, case is folded, and reserved directory segments are
//! tested in a fixed priority order. First match wins.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Structural role of a file inside a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind
{
    /// `snippets/`: reusable fragment included by name
    Snippet,
    /// `sections/`: fragment composed into pages by JSON manifests
    Section,
    /// `blocks/`: composable block nested inside sections
    Block,
    /// `templates/`: page template (Liquid or JSON manifest)
    Template,
    /// `layout/`: global layout shell wrapping every page
    Layout,
    /// `assets/`: static asset, only `settings` is reachable
    Asset,
    Unknown,
}

/// Reserved segments in priority order.
const RESERVED: [(&str, FileKind); 6] = [
    ("snippets", FileKind::Snippet),
    ("sections", FileKind::Section),
    ("templates", FileKind::Template),
    ("layout", FileKind::Layout),
    ("assets", FileKind::Asset),
    ("blocks", FileKind::Block),
];

impl FileKind
{
    /// Stable lowercase name (CLI, JSON, logs).
    pub fn as_str(self) -> &'static str
    {
        match self
        {
            FileKind::Snippet => "snippet",
            FileKind::Section => "section",
            FileKind::Block => "block",
            FileKind::Template => "template",
            FileKind::Layout => "layout",
            FileKind::Asset => "asset",
            FileKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FileKind
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result
    {
        f.write_str(self.as_str())
    }
}

/// Lowercase the path and turn every separator into `/`.
pub fn normalize_path(path: &str) -> String
{
    path.replace('\\', "/")
        .to_lowercase()
}

/// Classify a path. Total and pure: identical normalized paths always
/// classify identically.
pub fn classify(path: &str) -> FileKind
{
    // Leading '/' lets a relative path like "snippets/a.liquid" hit the
    // directory-boundary form.
    let normalized = format!("/{}", normalize_path(path));

    for (segment, kind) in RESERVED
    {
        let boundary = format!("/{segment}/");
        let trailing = format!("/{segment}");

        if normalized.contains(&boundary) || normalized.ends_with(&trailing)
        {
            return kind;
        }
    }

    FileKind::Unknown
}

/// Convenience wrapper for `Path` inputs.
pub fn classify_path(path: &Path) -> FileKind
{
    classify(&path.to_string_lossy())
}

#[cfg(test)]
mod tests
{
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_reserved_segments()
    {
        assert_eq!(classify("snippets/price.liquid"), FileKind::Snippet);
        assert_eq!(classify("sections/hero.liquid"), FileKind::Section);
        assert_eq!(classify("blocks/slide.liquid"), FileKind::Block);
        assert_eq!(classify("templates/product.json"), FileKind::Template);
        assert_eq!(classify("templates/customers/account.liquid"), FileKind::Template);
        assert_eq!(classify("layout/theme.liquid"), FileKind::Layout);
        assert_eq!(classify("assets/base.css.liquid"), FileKind::Asset);
        assert_eq!(classify("config/settings_schema.json"), FileKind::Unknown);
        assert_eq!(classify(""), FileKind::Unknown);
    }

    #[test]
    fn test_case_and_separator_insensitive()
    {
        assert_eq!(classify(r"C:\Theme\Snippets\Price.liquid"), FileKind::Snippet);
        assert_eq!(classify("/home/me/theme/SECTIONS/hero.liquid"), FileKind::Section);
    }

    #[test]
    fn test_trailing_segment_form()
    {
        assert_eq!(classify("/theme/snippets"), FileKind::Snippet);
        assert_eq!(classify("layout"), FileKind::Layout);
    }

    #[test]
    fn test_priority_first_match_wins()
    {
        // Both segments present: snippets outranks sections.
        assert_eq!(classify("sections/snippets/x.liquid"), FileKind::Snippet);
        // Segment names must match whole, not as substrings.
        assert_eq!(classify("mysnippets/x.liquid"), FileKind::Unknown);
    }

    #[test]
    fn test_json_name_matches_display()
    {
        for (_, kind) in RESERVED
        {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.to_string());
            assert_eq!(serde_json::from_value::<FileKind>(json).unwrap(), kind);
        }
    }

    proptest! {
        #[test]
        fn prop_classification_ignores_case_and_separators(path in "[A-Za-z_/\\\\.]{0,40}")
        {
            let variant = path
                .to_uppercase()
                .replace('/', "\\");
            prop_assert_eq!(classify(&path), classify(&variant));
        }
    }
}
