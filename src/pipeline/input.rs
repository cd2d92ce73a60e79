//! Input resolution: validate the user-supplied path before any other work.
//!
//! We check existence, read permission, and the `%PDF` magic bytes up front
//! so callers get a meaningful error rather than a pdfium crash — and so a
//! bad path fails before any credential is touched or any byte leaves the
//! machine.

use crate::error::ExtractError;
use std::path::PathBuf;
use tracing::debug;

/// Resolve a local file path, validating existence and PDF magic bytes.
pub fn resolve_local(path_str: &str) -> Result<PathBuf, ExtractError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(ExtractError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(ExtractError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ExtractError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(ExtractError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

/// Narrow sanity check used by [`crate::extract::extract_from_bytes`] before
/// spooling bytes to a temp file.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && &bytes[..4] == b"%PDF"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_file_not_found() {
        let err = resolve_local("/definitely/not/a/real/file.pdf").unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }

    #[test]
    fn non_pdf_magic_is_rejected() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"PK\x03\x04 definitely a zip").unwrap();
        let err = resolve_local(tmp.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ExtractError::NotAPdf { .. }));
    }

    #[test]
    fn pdf_magic_is_accepted() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"%PDF-1.7\n...").unwrap();
        let path = resolve_local(tmp.path().to_str().unwrap()).unwrap();
        assert_eq!(path, tmp.path());
    }

    #[test]
    fn byte_sniffing() {
        assert!(looks_like_pdf(b"%PDF-1.4"));
        assert!(!looks_like_pdf(b"%PD"));
        assert!(!looks_like_pdf(b"hello world"));
    }
}
