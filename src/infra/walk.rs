//! Filepath: src/infra/walk.rs
//! Gitignore-aware theme walker.
//! - Respects .gitignore, .git/info/exclude, and global gitignore
//! - Extra ignore globs (early prune + late filter)
//! - Include globs evaluated on root-relative paths
//! - Deterministic ordering for stable tests/CI
//!
//! Backed by ripgrep's `ignore` crate and `globset`.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};

/// Gitignore-aware walker with optional extra ignore globs.
/// Extra globs are applied in two places:
///   1) Early: prune directories during traversal (filter_entry).
///   2) Late: filter out files that still slipped through.
#[derive(Debug, Clone)]
pub struct FileWalker
{
    /// Compiled set of additional ignore patterns
    ignore_patterns: GlobSet,

    /// Follow symbolic links; default false
    follow_symlinks: bool,
}

impl FileWalker
{
    /// Build a walker with additional ignore patterns (e.g.,
    /// "node_modules/**", "**/*.min.js"). Patterns match on relative paths.
    pub fn new(additional_ignores: &[String]) -> Result<Self>
    {
        let mut builder = GlobSetBuilder::new();

        for pattern in additional_ignores
        {
            // "dist/" style entries mean the directory and everything below.
            let pattern = match pattern.strip_suffix('/')
            {
                Some(dir) => format!("{dir}/**"),
                None => pattern.clone(),
            };
            builder.add(Glob::new(&pattern)?);
        }

        Ok(Self { ignore_patterns: builder.build()?, follow_symlinks: false })
    }

    /// (Optional) Follow or skip symbolic links (default false).
    pub fn with_follow_symlinks(
        mut self,
        follow: bool,
    ) -> Self
    {
        self.follow_symlinks = follow;
        self
    }

    /// Internal: construct a configured WalkBuilder for `root`.
    fn build_walk(
        &self,
        root: &Path,
        start: &Path,
    ) -> WalkBuilder
    {
        let mut b = WalkBuilder::new(start);

        // Themes keep meaningful files under dot-directories rarely, but
        // hidden files must not be skipped silently.
        b.hidden(false);

        // Respect .ignore/.gitignore/.git/info/exclude and global gitignore
        b.git_ignore(true);
        b.git_global(true);
        b.git_exclude(true);
        b.follow_links(self.follow_symlinks);

        // Early directory pruning using extra ignores (fast short-circuit).
        let extra = self
            .ignore_patterns
            .clone();
        let root = root.to_path_buf();
        b.filter_entry(move |ent: &DirEntry| {
            // Be conservative on unknown types.
            let is_dir = ent
                .file_type()
                .map(|ft| ft.is_dir())
                .unwrap_or(false);

            let rel = ent
                .path()
                .strip_prefix(&root)
                .unwrap_or(ent.path());

            !(is_dir && (extra.is_match(rel) || extra.is_match(rel.join("x"))))
        });

        b
    }

    /// Traverse only `base` (relative to `root`), returning sorted
    /// root-relative paths. A missing `base` yields nothing.
    fn walk_under(
        &self,
        root: &Path,
        base: &Path,
    ) -> Vec<PathBuf>
    {
        let start = root.join(base);
        if !start.exists()
        {
            return Vec::new();
        }

        let walker = self
            .build_walk(root, &start)
            .build();

        let mut out: Vec<PathBuf> = walker
            // Drop entries with IO errors
            .filter_map(|res| res.ok())
            // Keep only regular files
            .filter(|entry| {
                entry
                    .file_type()
                    .is_some_and(|ft| ft.is_file())
            })
            // Relative to the theme root
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(root)
                    .ok()
                    .map(Path::to_path_buf)
            })
            // Late file-level extra ignore filtering
            .filter(|rel| {
                !self
                    .ignore_patterns
                    .is_match(rel)
            })
            .collect();

        // Deterministic order (stable CLI & tests)
        out.sort();

        out
    }

    /// Root-relative files matching `pattern` (e.g. "templates/**/*.json").
    /// Only the pattern's literal directory prefix is traversed.
    pub fn walk_matching<P: AsRef<Path>>(
        &self,
        root: P,
        pattern: &str,
    ) -> Result<Vec<PathBuf>>
    {
        let matcher = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob: {pattern}"))?
            .compile_matcher();

        let base = literal_prefix(pattern);
        let files = self
            .walk_under(root.as_ref(), &base)
            .into_iter()
            .filter(|rel| matcher.is_match(rel))
            .collect();

        Ok(files)
    }
}

/// Leading path components of a glob that contain no glob syntax.
fn literal_prefix(pattern: &str) -> PathBuf
{
    let mut prefix = PathBuf::new();

    let dir_part = match pattern.rsplit_once('/')
    {
        Some((dir, _)) => dir,
        None => return prefix,
    };

    for component in Path::new(dir_part).components()
    {
        let Component::Normal(part) = component
        else
        {
            break;
        };
        let part = part.to_string_lossy();
        if part.contains(['*', '?', '[', '{'])
        {
            break;
        }
        prefix.push(part.as_ref());
    }

    prefix
}
