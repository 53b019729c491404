use anyhow::{Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

const MMAP_THRESHOLD: u64 = 1024 * 1024; // 1 MiB

pub enum FileContent {
    Mapped(Mmap),
    Buffered(String),
}

impl FileContent {
    /// Borrow the content as UTF-8, failing on invalid bytes.
    pub fn as_text(&self) -> Result<&str> {
        match self {
            FileContent::Mapped(mmap) => {
                std::str::from_utf8(mmap).context("file is not valid UTF-8")
            }
            FileContent::Buffered(s) => Ok(s.as_str()),
        }
    }
}

pub fn read_file_smart<P: AsRef<Path>>(path: P) -> Result<FileContent> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read metadata for {}", path.display()))?;

    if metadata.len() > MMAP_THRESHOLD {
        // Use memory mapping for large files
        let file =
            File::open(path).with_context(|| format!("Failed to open file {}", path.display()))?;

        // Safety: the mapping is read-only and dropped before this query ends
        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("Failed to memory-map {}", path.display()))?;

        Ok(FileContent::Mapped(mmap))
    } else {
        // Read small files into memory
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file {}", path.display()))?;

        Ok(FileContent::Buffered(content))
    }
}

/// Read a whole file as an owned UTF-8 string.
pub fn read_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let content = read_file_smart(path)?;
    let text = content
        .as_text()
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    Ok(text.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_text_small_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("a.liquid");
        std::fs::write(&path, "{{ product.title }}").unwrap();

        assert_eq!(read_text(&path).unwrap(), "{{ product.title }}");
    }

    #[test]
    fn test_read_text_rejects_invalid_utf8() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bin.liquid");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        assert!(read_text(&path).is_err());
    }

    #[test]
    fn test_read_text_missing_file() {
        assert!(read_text("/definitely/not/here.liquid").is_err());
    }
}
