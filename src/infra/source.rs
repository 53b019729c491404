//! Filepath: src/infra/source.rs
//! File-system capability consumed by the discovery engine.
//!
//! The engine never touches the disk directly: it lists files by glob and
//! reads them as text through `ThemeSource`. Paths are always relative to
//! the theme root.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use globset::GlobBuilder;

use crate::infra::io::read_text;
use crate::infra::walk::FileWalker;

/// "List files matching a glob" and "read file as text".
pub trait ThemeSource: Send + Sync
{
    /// Root-relative paths matching `pattern`, sorted.
    fn list_files(
        &self,
        pattern: &str,
    ) -> Result<Vec<PathBuf>>;

    /// Full UTF-8 text of a root-relative path.
    fn read_text(
        &self,
        path: &Path,
    ) -> Result<String>;
}

impl<S: ThemeSource + ?Sized> ThemeSource for &S
{
    fn list_files(
        &self,
        pattern: &str,
    ) -> Result<Vec<PathBuf>>
    {
        (**self).list_files(pattern)
    }

    fn read_text(
        &self,
        path: &Path,
    ) -> Result<String>
    {
        (**self).read_text(path)
    }
}

/// Theme checked out on disk.
#[derive(Debug, Clone)]
pub struct DiskSource
{
    root: PathBuf,
    walker: FileWalker,
}

impl DiskSource
{
    pub fn new(
        root: impl AsRef<Path>,
        walker: FileWalker,
    ) -> Result<Self>
    {
        let root = root.as_ref();
        let root = dunce::canonicalize(root)
            .with_context(|| format!("theme root not found: {}", root.display()))?;

        Ok(Self { root, walker })
    }

    pub fn root(&self) -> &Path
    {
        &self.root
    }
}

impl ThemeSource for DiskSource
{
    fn list_files(
        &self,
        pattern: &str,
    ) -> Result<Vec<PathBuf>>
    {
        self.walker
            .walk_matching(&self.root, pattern)
    }

    fn read_text(
        &self,
        path: &Path,
    ) -> Result<String>
    {
        read_text(self.root.join(path))
    }
}

/// In-memory theme: unsaved editor buffers, fixtures.
#[derive(Debug, Clone, Default)]
pub struct MemorySource
{
    files: BTreeMap<PathBuf, String>,
}

impl MemorySource
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_file(
        mut self,
        path: impl Into<PathBuf>,
        text: impl Into<String>,
    ) -> Self
    {
        self.insert(path, text);
        self
    }

    pub fn insert(
        &mut self,
        path: impl Into<PathBuf>,
        text: impl Into<String>,
    )
    {
        self.files
            .insert(path.into(), text.into());
    }
}

impl ThemeSource for MemorySource
{
    fn list_files(
        &self,
        pattern: &str,
    ) -> Result<Vec<PathBuf>>
    {
        let matcher = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob: {pattern}"))?
            .compile_matcher();

        // BTreeMap keys are already sorted.
        Ok(self
            .files
            .keys()
            .filter(|p| matcher.is_match(p))
            .cloned()
            .collect())
    }

    fn read_text(
        &self,
        path: &Path,
    ) -> Result<String>
    {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("no such file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_memory_source_lists_by_glob()
    {
        let source = MemorySource::new()
            .with_file("templates/product.json", "{}")
            .with_file("templates/customers/account.json", "{}")
            .with_file("sections/hero.liquid", "");

        let files = source
            .list_files("templates/**/*.json")
            .unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("templates/customers/account.json"),
                PathBuf::from("templates/product.json"),
            ]
        );
        assert!(
            source
                .read_text(Path::new("missing.liquid"))
                .is_err()
        );
    }

    #[test]
    fn test_disk_source_reads_relative_paths() -> Result<()>
    {
        let dir = tempfile::TempDir::new()?;
        std::fs::create_dir_all(dir.path().join("snippets"))?;
        std::fs::write(dir.path().join("snippets/price.liquid"), "{{ price }}")?;

        let source = DiskSource::new(dir.path(), FileWalker::new(&[])?)?;
        let files = source.list_files("snippets/*.liquid")?;

        assert_eq!(files, vec![PathBuf::from("snippets/price.liquid")]);
        assert_eq!(source.read_text(&files[0])?, "{{ price }}");
        Ok(())
    }

    #[test]
    fn test_disk_source_missing_root()
    {
        assert!(DiskSource::new("/no/such/theme", FileWalker::new(&[]).unwrap()).is_err());
    }
}
