//! Document and chunk types

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Document formats the extractor knows how to read
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
    /// Plain text file
    Text,
}

impl DocumentFormat {
    /// Detect format from a file extension (case-insensitive, dot optional)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" | "text" | "md" | "markdown" => Some(Self::Text),
            _ => None,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "Word",
            Self::Text => "Text",
        }
    }
}

/// Lowercase extension of a path without the dot, or an empty string
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// A file selected for processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Location on disk
    pub path: PathBuf,
    /// Lowercase extension without the dot
    pub extension: String,
    /// Detected format, `None` when unsupported
    pub format: Option<DocumentFormat>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let extension = extension_of(&path);
        let format = DocumentFormat::from_extension(&extension);
        Self {
            path,
            extension,
            format,
        }
    }

    /// File name for display and logging
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// File content received in memory, e.g. from an upload form
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original file name; only its last component is used on disk
    pub name: String,
    pub data: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// File name safe to join onto a directory, `None` if nothing usable remains
    pub fn file_name(&self) -> Option<&str> {
        Path::new(&self.name)
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
    }
}

/// A bounded text segment, the unit of embedding and retrieval.
///
/// Offsets are character positions in the text the chunk was cut from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position in the chunk sequence (0-indexed)
    pub index: usize,
    /// Text content
    pub content: String,
    /// First character (inclusive)
    pub char_start: usize,
    /// Last character (exclusive)
    pub char_end: usize,
}

impl Chunk {
    pub fn new(index: usize, content: String, char_start: usize, char_end: usize) -> Self {
        Self {
            index,
            content,
            char_start,
            char_end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension("PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_extension(".docx"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_extension("txt"), Some(DocumentFormat::Text));
        assert_eq!(DocumentFormat::from_extension("jpg"), None);
        assert_eq!(DocumentFormat::from_extension(""), None);
    }

    #[test]
    fn test_source_file() {
        let file = SourceFile::new("/tmp/docs/Report.PDF");
        assert_eq!(file.extension, "pdf");
        assert_eq!(file.format, Some(DocumentFormat::Pdf));
        assert_eq!(file.display_name(), "Report.PDF");

        let file = SourceFile::new("/tmp/docs/photo.jpg");
        assert_eq!(file.format, None);
    }

    #[test]
    fn test_upload_file_name_strips_directories() {
        assert_eq!(Upload::new("../../report.pdf", b"".to_vec()).file_name(), Some("report.pdf"));
        assert_eq!(Upload::new("notes.txt", b"hi".to_vec()).file_name(), Some("notes.txt"));
        assert_eq!(Upload::new("..", b"".to_vec()).file_name(), None);
        assert_eq!(Upload::new("", b"".to_vec()).file_name(), None);
    }
}
