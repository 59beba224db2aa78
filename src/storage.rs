//! Storage helpers for uploaded file content on disk.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of content as lowercase hex.
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Replace filesystem-hostile characters in a filename component.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.chars().take(80).collect()
    }
}

/// Construct the storage path for uploaded content.
///
/// Uses a two-level directory structure based on hash prefix for filesystem
/// efficiency: `{uploads_dir}/{hash[0..2]}/{sanitized-stem}-{hash[0..8]}.{ext}`
pub fn upload_storage_path(uploads_dir: &Path, hash: &str, original_filename: &str) -> PathBuf {
    let path = Path::new(original_filename);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("upload");
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "bin".to_string());

    let filename = format!("{}-{}.{}", sanitize_filename(stem), &hash[..8], extension);
    uploads_dir.join(&hash[..2]).join(filename)
}

/// Save uploaded bytes to the uploads directory, returning the stored path.
pub fn save_upload(
    uploads_dir: &Path,
    original_filename: &str,
    content: &[u8],
) -> std::io::Result<PathBuf> {
    let hash = content_hash(content);
    let path = upload_storage_path(uploads_dir, &hash, original_filename);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, content)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_content_hash() {
        let hash = content_hash(b"Hello, World!");
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Q3 Earnings (final).txt"), "Q3_Earnings__final_.txt");
        assert_eq!(sanitize_filename("///"), "upload");
        assert_eq!(sanitize_filename("report"), "report");
    }

    #[test]
    fn test_storage_path_shape() {
        let hash = content_hash(b"abc");
        let path = upload_storage_path(Path::new("/data/uploads"), &hash, "Q3 call.mp3");
        let s = path.display().to_string();
        assert!(s.starts_with(&format!("/data/uploads/{}", &hash[..2])));
        assert!(s.ends_with(&format!("-{}.mp3", &hash[..8])));
    }

    #[test]
    fn test_save_upload_round_trip() {
        let dir = tempdir().unwrap();
        let path = save_upload(dir.path(), "release.txt", b"Strong quarter.").unwrap();
        assert!(path.exists());
        assert_eq!(std::fs::read(&path).unwrap(), b"Strong quarter.");

        // Same content stores to the same path
        let again = save_upload(dir.path(), "release.txt", b"Strong quarter.").unwrap();
        assert_eq!(path, again);
    }
}
