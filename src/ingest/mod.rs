//! Book text ingestion.

use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

/// Raised when the input file type is unsupported.
#[derive(Debug, Clone, Error)]
pub enum IngestError {
    #[error("Only .txt files are supported, got: {path}")]
    UnsupportedFile { path: String },
}

/// Load UTF-8 text from a `.txt` file.
///
/// `limit_chars` optionally truncates the text for quick runs; the cut is
/// clamped to a char boundary so the result stays valid UTF-8.
pub fn load_text(path: &Path, limit_chars: Option<usize>) -> Result<String> {
    let is_txt = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false);
    if !is_txt {
        return Err(IngestError::UnsupportedFile {
            path: path.display().to_string(),
        }
        .into());
    }

    let mut text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read book file: {}", path.display()))?;

    if let Some(limit) = limit_chars {
        if limit < text.len() {
            let mut cut = limit;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{content}").unwrap();
        path
    }

    #[test]
    fn test_loads_txt_file() {
        let temp = TempDir::new().unwrap();
        let path = write_file(&temp, "book.txt", "Once upon a time in Lima.");
        assert_eq!(load_text(&path, None).unwrap(), "Once upon a time in Lima.");
    }

    #[test]
    fn test_rejects_non_txt() {
        let temp = TempDir::new().unwrap();
        let path = write_file(&temp, "book.pdf", "binaryish");
        let err = load_text(&path, None).unwrap_err();
        assert!(err.downcast_ref::<IngestError>().is_some());
    }

    #[test]
    fn test_limit_chars_respects_boundaries() {
        let temp = TempDir::new().unwrap();
        let path = write_file(&temp, "book.txt", "señal clara");
        // Byte 3 falls inside the two-byte 'ñ'; the cut backs up to a boundary
        let text = load_text(&path, Some(3)).unwrap();
        assert_eq!(text, "se");

        let full = load_text(&path, Some(1000)).unwrap();
        assert_eq!(full, "señal clara");
    }
}
