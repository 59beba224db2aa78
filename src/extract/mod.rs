//! Text extraction from uploaded documents.
//!
//! Plain text is read directly, PDFs go through the `pdftotext` CLI, and
//! DOCX files are unpacked from their zip container. Output is a single
//! string with paragraphs joined by blank lines; no further structure is
//! preserved.

use std::io::Read;
use std::path::Path;
use std::process::Command;

use regex::Regex;
use thiserror::Error;

/// Allowed text document extensions.
pub const TEXT_EXTENSIONS: &[&str] = &["pdf", "txt", "doc", "docx"];

/// Allowed audio extensions.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "ogg", "flac", "webm", "mp4"];

/// Errors that can occur during text extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported for invalid uploads before any processing begins.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("File type .{extension} not supported. Allowed: {allowed}")]
    UnsupportedExtension { extension: String, allowed: String },

    #[error("File has no extension")]
    MissingExtension,

    #[error("File too large: {size_mb:.1}MB (max {max_mb}MB)")]
    TooLarge { size_mb: f64, max_mb: u64 },
}

/// Lowercased extension of a filename, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Validate a text document upload: extension allow-list and size cap.
pub fn validate_document_upload(
    filename: &str,
    size: u64,
    max_bytes: u64,
) -> Result<(), ValidationError> {
    validate_upload(filename, size, max_bytes, TEXT_EXTENSIONS)
}

/// Validate an audio upload: extension allow-list and size cap.
pub fn validate_audio_upload(
    filename: &str,
    size: u64,
    max_bytes: u64,
) -> Result<(), ValidationError> {
    validate_upload(filename, size, max_bytes, AUDIO_EXTENSIONS)
}

fn validate_upload(
    filename: &str,
    size: u64,
    max_bytes: u64,
    allowed: &[&str],
) -> Result<(), ValidationError> {
    let extension = file_extension(filename).ok_or(ValidationError::MissingExtension)?;
    if !allowed.contains(&extension.as_str()) {
        return Err(ValidationError::UnsupportedExtension {
            extension,
            allowed: allowed.join(", "),
        });
    }
    if size > max_bytes {
        return Err(ValidationError::TooLarge {
            size_mb: size as f64 / (1024.0 * 1024.0),
            max_mb: max_bytes / (1024 * 1024),
        });
    }
    Ok(())
}

/// Text extractor dispatching on file extension.
#[derive(Default)]
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract text from a file based on its extension.
    pub fn extract(&self, file_path: &Path) -> Result<String, ExtractionError> {
        let extension = file_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "txt" | "text" => self.extract_plain(file_path),
            "pdf" => self.extract_pdf(file_path),
            "docx" => self.extract_docx(file_path),
            // Legacy .doc has no reliable pure parser; a text read catches
            // the common RTF-renamed and plain-text cases.
            "doc" => self.extract_plain(file_path),
            other => Err(ExtractionError::UnsupportedFileType(other.to_string())),
        }
    }

    fn extract_plain(&self, file_path: &Path) -> Result<String, ExtractionError> {
        let bytes = std::fs::read(file_path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Extract PDF text via pdftotext, reading from stdout.
    fn extract_pdf(&self, file_path: &Path) -> Result<String, ExtractionError> {
        let result = Command::new("pdftotext").arg(file_path).arg("-").output();

        match result {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(ExtractionError::ExtractionFailed(format!(
                        "pdftotext: {}",
                        stderr
                    )))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ExtractionError::ToolNotFound("pdftotext".to_string()))
            }
            Err(e) => Err(ExtractionError::Io(e)),
        }
    }

    /// Extract DOCX text from the zip container's word/document.xml.
    fn extract_docx(&self, file_path: &Path) -> Result<String, ExtractionError> {
        let file = std::fs::File::open(file_path)?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| ExtractionError::ExtractionFailed(format!("not a docx archive: {}", e)))?;

        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .map_err(|e| {
                ExtractionError::ExtractionFailed(format!("missing word/document.xml: {}", e))
            })?
            .read_to_string(&mut xml)?;

        Ok(strip_docx_markup(&xml))
    }
}

/// Reduce document.xml to plain text: paragraph ends become blank lines,
/// all other tags are dropped, basic entities decoded.
fn strip_docx_markup(xml: &str) -> String {
    let paragraph_break = Regex::new(r"</w:p>").unwrap();
    let tags = Regex::new(r"<[^>]+>").unwrap();

    let with_breaks = paragraph_break.replace_all(xml, "\n\n");
    let stripped = tags.replace_all(&with_breaks, "");

    let decoded = stripped
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'");

    // Collapse the leading/trailing whitespace the markup leaves behind
    decoded
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_extract_plain_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("release.txt");
        std::fs::write(&path, "Revenue grew 20%.\n\nMargins expanded.").unwrap();

        let text = TextExtractor::new().extract(&path).unwrap();
        assert!(text.contains("Revenue grew 20%."));
        assert!(text.contains("Margins expanded."));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deck.pptx");
        std::fs::write(&path, b"x").unwrap();

        let err = TextExtractor::new().extract(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFileType(_)));
    }

    #[test]
    fn test_extract_docx() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("release.docx");

        let file = std::fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(
                br#"<?xml version="1.0"?><w:document><w:body><w:p><w:r><w:t>Strong quarter &amp; outlook</w:t></w:r></w:p><w:p><w:r><w:t>Guidance raised</w:t></w:r></w:p></w:body></w:document>"#,
            )
            .unwrap();
        writer.finish().unwrap();

        let text = TextExtractor::new().extract(&path).unwrap();
        assert_eq!(text, "Strong quarter & outlook\n\nGuidance raised");
    }

    #[test]
    fn test_strip_docx_markup_paragraphs() {
        let xml = "<w:p><w:t>one</w:t></w:p><w:p><w:t>two</w:t></w:p>";
        assert_eq!(strip_docx_markup(xml), "one\n\ntwo");
    }

    #[test]
    fn test_validate_document_upload() {
        assert!(validate_document_upload("report.pdf", 1024, 10 * 1024 * 1024).is_ok());
        assert!(validate_document_upload("report.PDF", 1024, 10 * 1024 * 1024).is_ok());

        let err = validate_document_upload("report.exe", 1024, 10 * 1024 * 1024).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedExtension { .. }));

        let err = validate_document_upload("report.pdf", 11 * 1024 * 1024, 10 * 1024 * 1024)
            .unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { .. }));
    }

    #[test]
    fn test_validate_audio_upload() {
        assert!(validate_audio_upload("call.mp3", 1024, 100 * 1024 * 1024).is_ok());
        assert!(validate_audio_upload("call.wav", 1024, 100 * 1024 * 1024).is_ok());
        assert!(validate_audio_upload("call.flac", 1024, 100 * 1024 * 1024).is_ok());
        assert!(validate_audio_upload("call.pdf", 1024, 100 * 1024 * 1024).is_err());
        assert!(validate_audio_upload("call", 1024, 100 * 1024 * 1024).is_err());
    }
}
