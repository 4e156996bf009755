//! File-level text extraction with partial-failure batch semantics

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ExtractionConfig;
use crate::error::{Error, Result};
use crate::types::SourceFile;

use super::parser::{FileParser, BLOCK_SEPARATOR};

/// What one file contributed to a batch
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub file: SourceFile,
    /// Characters of usable text, zero when the file was skipped
    pub chars: usize,
}

impl FileOutcome {
    pub fn succeeded(&self) -> bool {
        self.chars > 0
    }
}

/// Concatenated text of a batch of files
#[derive(Debug, Clone)]
pub struct BatchExtraction {
    /// Non-empty per-file texts joined by blank lines
    pub text: String,
    /// One entry per input file, in input order
    pub outcomes: Vec<FileOutcome>,
}

impl BatchExtraction {
    /// Files that yielded usable text
    pub fn successful(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// SHA-256 of the concatenated text
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.text.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Extracts plain text from PDF, Word and text files
#[derive(Debug, Clone)]
pub struct FileExtractor {
    config: ExtractionConfig,
}

impl Default for FileExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

impl FileExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Extract text, surfacing I/O and parse failures.
    ///
    /// Unsupported extensions and zero-byte files are not failures: they
    /// produce empty text and a warning.
    pub fn try_extract(&self, path: &Path) -> Result<String> {
        let file = SourceFile::new(path);
        let name = file.display_name();

        let format = match file.format {
            Some(format) if self.config.allows(&file.extension) => format,
            _ => {
                tracing::warn!("Unsupported file type: .{} ({})", file.extension, name);
                return Ok(String::new());
            }
        };

        tracing::info!("Reading {}: {}", format.display_name(), name);
        let data = std::fs::read(path)?;
        if data.is_empty() {
            tracing::warn!("Empty {} file: {}", format.display_name(), name);
            return Ok(String::new());
        }

        FileParser::parse(format, &name, &data, self.config.pdf_timeout())
    }

    /// Extract text, treating any failure as an empty result
    pub fn extract(&self, path: &Path) -> String {
        match self.try_extract(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Error processing {}: {}", path.display(), e);
                String::new()
            }
        }
    }

    /// Extract every file and concatenate the non-empty results.
    ///
    /// A file that fails or yields no text is skipped; it never aborts the batch.
    pub fn extract_batch<P: AsRef<Path>>(&self, paths: &[P]) -> BatchExtraction {
        let mut texts = Vec::new();
        let mut outcomes = Vec::with_capacity(paths.len());

        for path in paths {
            let file = SourceFile::new(path.as_ref());
            let text = self.extract(&file.path);

            let chars = if text.trim().is_empty() {
                tracing::warn!("Skipping {} (no extractable content)", file.display_name());
                0
            } else {
                let chars = text.chars().count();
                texts.push(text);
                chars
            };
            outcomes.push(FileOutcome { file, chars });
        }

        let batch = BatchExtraction {
            text: texts.join(BLOCK_SEPARATOR),
            outcomes,
        };
        tracing::info!(
            "Successfully processed {} out of {} files",
            batch.successful(),
            batch.total()
        );
        batch
    }
}

/// List files directly inside `dir` whose extension is on the allow-list.
///
/// Not recursive. Results are sorted by path.
pub fn scan_folder(dir: &Path, config: &ExtractionConfig) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::FolderNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file = SourceFile::new(entry.path());
        if config.allows(&file.extension) {
            files.push(file.path);
        } else {
            tracing::debug!("Ignoring {} (extension not allowed)", file.display_name());
        }
    }

    tracing::info!("Found {} supported file(s) in {}", files.len(), dir.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_extract_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "Hello world").unwrap();

        let extractor = FileExtractor::default();
        assert_eq!(extractor.extract(&path), "Hello world");
    }

    #[test]
    fn test_zero_byte_files_are_empty_not_errors() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = FileExtractor::default();

        for name in ["empty.pdf", "empty.docx", "empty.txt"] {
            let path = dir.path().join(name);
            fs::write(&path, b"").unwrap();
            let text = extractor.try_extract(&path).unwrap();
            assert!(text.is_empty(), "{} should extract to empty text", name);
        }
    }

    #[test]
    fn test_unsupported_extension_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        fs::write(&path, b"\xFF\xD8\xFF").unwrap();

        let extractor = FileExtractor::default();
        assert_eq!(extractor.try_extract(&path).unwrap(), "");
    }

    #[test]
    fn test_allow_list_is_respected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        fs::write(&path, "# Notes").unwrap();

        assert_eq!(FileExtractor::default().try_extract(&path).unwrap(), "");

        let config = ExtractionConfig {
            supported_extensions: vec![".md".to_string()],
            ..Default::default()
        };
        assert_eq!(FileExtractor::new(&config).try_extract(&path).unwrap(), "# Notes");
    }

    #[test]
    fn test_missing_file_is_caught() {
        let extractor = FileExtractor::default();
        let missing = Path::new("/definitely/not/here.txt");

        assert!(matches!(extractor.try_extract(missing), Err(Error::Io(_))));
        assert_eq!(extractor.extract(missing), "");
    }

    #[test]
    fn test_batch_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let empty_pdf = dir.path().join("a.pdf");
        let corrupt_docx = dir.path().join("b.docx");
        let first = dir.path().join("c.txt");
        let second = dir.path().join("d.txt");
        fs::write(&empty_pdf, b"").unwrap();
        fs::write(&corrupt_docx, b"not a zip archive").unwrap();
        fs::write(&first, "First file.").unwrap();
        fs::write(&second, "Second file.").unwrap();

        let batch = FileExtractor::default().extract_batch(&[empty_pdf, corrupt_docx, first, second]);

        assert_eq!(batch.total(), 4);
        assert_eq!(batch.successful(), 2);
        assert_eq!(batch.text, "First file.\n\nSecond file.");
        assert!(!batch.outcomes[0].succeeded());
        assert!(!batch.outcomes[1].succeeded());
        assert_eq!(batch.outcomes[2].chars, 11);
    }

    #[test]
    fn test_empty_batch() {
        let batch = FileExtractor::default().extract_batch::<PathBuf>(&[]);
        assert_eq!(batch.total(), 0);
        assert_eq!(batch.successful(), 0);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_extract_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("same.txt");
        fs::write(&path, "Stable content\nacross reads").unwrap();

        let extractor = FileExtractor::default();
        let first = extractor.extract_batch(&[&path]);
        let second = extractor.extract_batch(&[&path]);
        assert_eq!(first.text, second.text);
        assert_eq!(first.content_hash(), second.content_hash());
    }

    #[test]
    fn test_scan_folder_filters_and_is_flat() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.PDF"), "a").unwrap();
        fs::write(dir.path().join("photo.jpg"), "jpg").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.txt"), "c").unwrap();

        let files = scan_folder(dir.path(), &ExtractionConfig::default()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.txt"]);
    }

    #[test]
    fn test_scan_missing_folder() {
        let result = scan_folder(Path::new("/no/such/folder"), &ExtractionConfig::default());
        assert!(matches!(result, Err(Error::FolderNotFound(_))));
    }
}
