//! Filepath: src/core/usage.rs
//! Reverse inclusion graph: which files render a given fragment.
//!
//! Detection is textual. Comment regions are removed first so that a
//! commented-out `{% render 'x' %}` never counts as live usage:
//! - `{% comment %} ... {% endcomment %}` blocks (multi-line, non-greedy)
//! - inline `{% # ... %}` comments
//! - inside `{% liquid %}` tags, `#` lines and `comment`/`endcomment` runs
//!
//! The graph is rebuilt from scratch on every query.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::core::classify::{FileKind, classify_path};
use crate::core::discover::DiscoveryError;
use crate::infra::source::ThemeSource;

/// Liquid sources that may include other fragments.
pub const INCLUDER_ROOTS: [&str; 5] = [
    "sections/**/*.liquid",
    "snippets/**/*.liquid",
    "templates/**/*.liquid",
    "layout/**/*.liquid",
    "blocks/**/*.liquid",
];

static BLOCK_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\{%-?\s*comment\s*-?%\}.*?\{%-?\s*endcomment\s*-?%\}")
        .expect("block comment pattern")
});

static INLINE_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{%-?\s*#.*?%\}").expect("inline comment pattern"));

static LIQUID_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\{%-?\s*liquid\b(.*?)%\}").expect("liquid tag pattern"));

static LIQUID_BLOCK_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ims)^\s*comment\s*$.*?^\s*endcomment\s*$").expect("liquid comment pattern")
});

static LIQUID_LINE_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*#.*$").expect("liquid line comment pattern"));

/// Which tag family links includer and fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive
{
    /// `render` / `include` of a snippet
    Render,
    /// static `section` tag
    Section,
}

impl Directive
{
    fn keywords(self) -> &'static str
    {
        match self
        {
            Directive::Render => "render|include",
            Directive::Section => "section",
        }
    }

    /// Kind of the fragment this directive names.
    fn target_kind(self) -> FileKind
    {
        match self
        {
            Directive::Render => FileKind::Snippet,
            Directive::Section => FileKind::Section,
        }
    }
}

/// A file that includes the queried fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Includer
{
    pub name: String,
    pub kind: FileKind,
    pub path: PathBuf,
}

/// Remove Liquid comment regions.
pub fn strip_liquid_comments(text: &str) -> String
{
    let without_blocks = BLOCK_COMMENT_RE.replace_all(text, "");
    INLINE_COMMENT_RE
        .replace_all(&without_blocks, "")
        .into_owned()
}

/// Compiled per-query matcher for one fragment name.
#[derive(Debug)]
pub struct DirectiveMatcher
{
    /// `{% render 'name' %}` with optional trim marker
    tag: Regex,
    /// bare `render 'name'` line inside a `{% liquid %}` tag
    line: Regex,
}

impl DirectiveMatcher
{
    pub fn new(
        fragment_name: &str,
        directive: Directive,
    ) -> Result<Self, regex::Error>
    {
        let name = regex::escape(fragment_name);
        let keywords = directive.keywords();

        Ok(Self {
            tag: Regex::new(&format!(r#"(?i)\{{%-?\s*(?:{keywords})\s+['"]{name}['"]"#))?,
            line: Regex::new(&format!(r#"(?im)^\s*(?:{keywords})\s+['"]{name}['"]"#))?,
        })
    }

    /// True when `text` contains a live (uncommented) directive.
    pub fn is_match(
        &self,
        text: &str,
    ) -> bool
    {
        let cleaned = strip_liquid_comments(text);

        if self
            .tag
            .is_match(&cleaned)
        {
            return true;
        }

        LIQUID_TAG_RE
            .captures_iter(&cleaned)
            .filter_map(|caps| caps.get(1))
            .any(|body| {
                let body = LIQUID_BLOCK_COMMENT_RE.replace_all(body.as_str(), "");
                let body = LIQUID_LINE_COMMENT_RE.replace_all(&body, "");
                self.line
                    .is_match(&body)
            })
    }
}

/// Scans Liquid sources through a `ThemeSource`.
pub struct UsageScanner<'a>
{
    source: &'a dyn ThemeSource,
}

impl<'a> UsageScanner<'a>
{
    pub fn new(source: &'a dyn ThemeSource) -> Self
    {
        Self { source }
    }

    /// Every file under the includer roots with a live `directive` naming
    /// `fragment_name`, in sorted enumeration order.
    #[instrument(skip(self, cancel))]
    pub fn find_includers(
        &self,
        fragment_name: &str,
        directive: Directive,
        cancel: &CancellationToken,
    ) -> Result<Vec<Includer>, DiscoveryError>
    {
        let matcher = match DirectiveMatcher::new(fragment_name, directive)
        {
            Ok(m) => m,
            Err(err) =>
            {
                warn!(error = %err, "cannot build directive pattern");
                return Ok(Vec::new());
            }
        };

        let mut files = Vec::new();
        for pattern in INCLUDER_ROOTS
        {
            match self
                .source
                .list_files(pattern)
            {
                Ok(found) => files.extend(found),
                Err(err) => warn!(pattern, error = %err, "cannot enumerate sources"),
            }
        }

        let hits = files
            .par_iter()
            .map(|path| {
                if cancel.is_cancelled()
                {
                    return Err(DiscoveryError::Cancelled);
                }
                Ok(self.includer(path, fragment_name, directive, &matcher))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let includers: Vec<Includer> = hits
            .into_iter()
            .flatten()
            .collect();

        debug!(includers = includers.len(), "usage scan done");
        Ok(includers)
    }

    fn includer(
        &self,
        path: &Path,
        fragment_name: &str,
        directive: Directive,
        matcher: &DirectiveMatcher,
    ) -> Option<Includer>
    {
        let name = path
            .file_stem()?
            .to_string_lossy()
            .into_owned();
        let kind = classify_path(path);

        // A fragment rendering itself is not evidence.
        if kind == directive.target_kind() && name == fragment_name
        {
            return None;
        }

        let text = match self
            .source
            .read_text(path)
        {
            Ok(text) => text,
            Err(err) =>
            {
                debug!(path = %path.display(), error = %err, "skipping unreadable source");
                return None;
            }
        };

        matcher
            .is_match(&text)
            .then(|| Includer { name, kind, path: path.to_path_buf() })
    }
}
