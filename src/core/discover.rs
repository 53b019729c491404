//! Filepath: src/core/discover.rs
//! Discovery orchestrator: verified contexts for one theme file.
//!
//! Resolution order:
//! 1) File-stem override rules (always applied, any kind)
//! 2) Dispatch on the file kind:
//!    - asset    → settings only
//!    - layout   → global bundle only
//!    - template → global bundle + the template's own context
//!    - section / block → manifests wiring the type in, plus static
//!      `{% section %}` tags in layouts and Liquid templates
//!    - snippet  → every includer, resolved by its own kind; snippet
//!      includers are followed transitively
//! 3) Merge into a per-query `ContextSet` (first display name wins)
//!
//! Per-file failures are swallowed where they happen; only cancellation
//! escapes.

use std::collections::{HashSet, VecDeque};
use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::core::classify::{FileKind, classify_path};
use crate::core::context::{Context, ContextSet};
use crate::core::manifest::ManifestScanner;
use crate::core::usage::{Directive, UsageScanner};
use crate::infra::config::OverrideRule;
use crate::infra::source::ThemeSource;

/// The only failure a discovery query reports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryError
{
    #[error("discovery cancelled")]
    Cancelled,
}

/// Case-insensitive, `-`/`_` insensitive stem comparison key.
fn stem_key(stem: &str) -> String
{
    stem.to_lowercase()
        .replace('-', "_")
}

/// Contexts pinned by file-stem rules.
pub fn stem_overrides(
    stem: &str,
    rules: &[OverrideRule],
) -> Vec<Context>
{
    let key = stem_key(stem);

    rules
        .iter()
        .filter_map(|rule| {
            match rule
            {
                OverrideRule::FileStem { stems, context_key }
                    if stems
                        .iter()
                        .any(|s| stem_key(s) == key) =>
                {
                    Some(Context::fixed(context_key))
                }
                _ => None,
            }
        })
        .collect()
}

/// Context discovery over one theme.
pub struct Discovery<S>
{
    source: S,
    rules: Vec<OverrideRule>,
}

impl<S: ThemeSource> Discovery<S>
{
    pub fn new(
        source: S,
        rules: Vec<OverrideRule>,
    ) -> Self
    {
        Self { source, rules }
    }

    pub fn source(&self) -> &S
    {
        &self.source
    }

    fn manifests(&self) -> ManifestScanner<'_>
    {
        ManifestScanner::new(&self.source, &self.rules)
    }

    fn usage(&self) -> UsageScanner<'_>
    {
        UsageScanner::new(&self.source)
    }

    /// Classify a root-relative path and resolve its contexts.
    pub fn resolve_file(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Vec<Context>, DiscoveryError>
    {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();

        self.resolve_contexts(&stem, classify_path(path), cancel)
    }

    /// Verified contexts for a file with this stem and kind, deduplicated
    /// by display name.
    #[instrument(skip(self, cancel))]
    pub fn resolve_contexts(
        &self,
        file_stem: &str,
        kind: FileKind,
        cancel: &CancellationToken,
    ) -> Result<Vec<Context>, DiscoveryError>
    {
        if cancel.is_cancelled()
        {
            return Err(DiscoveryError::Cancelled);
        }

        let pinned = stem_overrides(file_stem, &self.rules);

        let found = match kind
        {
            FileKind::Asset => vec![Context::settings()],
            FileKind::Layout => vec![Context::global()],
            FileKind::Template => vec![Context::global(), Context::from_name(file_stem)],
            FileKind::Section | FileKind::Block => self.resolve_section(file_stem, cancel)?,
            FileKind::Snippet => self.resolve_snippet(file_stem, cancel)?,
            FileKind::Unknown => Vec::new(),
        };

        let contexts = pinned
            .into_iter()
            .chain(found)
            .collect::<ContextSet>()
            .into_vec();

        info!(contexts = contexts.len(), "contexts resolved");
        Ok(contexts)
    }

    /// Manifests using the type, plus static section tags.
    fn resolve_section(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Context>, DiscoveryError>
    {
        let mut found = self
            .manifests()
            .find_contexts_using(name, cancel)?;

        for includer in self
            .usage()
            .find_includers(name, Directive::Section, cancel)?
        {
            match includer.kind
            {
                FileKind::Layout => found.push(Context::global()),
                FileKind::Template => found.push(Context::from_name(&includer.name)),
                _ => {}
            }
        }

        Ok(found)
    }

    /// Walk the inclusion graph upwards from a snippet.
    fn resolve_snippet(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Context>, DiscoveryError>
    {
        let mut found = Vec::new();
        let mut visited: HashSet<String> = HashSet::from([name.to_string()]);
        let mut sections_done: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::from([name.to_string()]);

        while let Some(snippet) = queue.pop_front()
        {
            let includers = self
                .usage()
                .find_includers(&snippet, Directive::Render, cancel)?;
            debug!(snippet = %snippet, includers = includers.len(), "snippet includers");

            for includer in includers
            {
                match includer.kind
                {
                    FileKind::Section | FileKind::Block =>
                    {
                        if sections_done.insert(includer.name.clone())
                        {
                            found.extend(self.resolve_section(&includer.name, cancel)?);
                        }
                    }
                    FileKind::Template => found.push(Context::from_name(&includer.name)),
                    FileKind::Layout =>
                    {
                        found.push(Context::global());
                        found.push(Context::from_name(&includer.name));
                    }
                    FileKind::Snippet =>
                    {
                        if visited.insert(includer.name.clone())
                        {
                            queue.push_back(includer.name);
                        }
                    }
                    FileKind::Asset | FileKind::Unknown => {}
                }
            }
        }

        Ok(found)
    }
}
