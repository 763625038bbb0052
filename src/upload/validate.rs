use thiserror::Error;

/// Content types accepted for an uploaded diary file.
pub const ALLOWED_MIME: &[&str] = &[
    "text/plain",
    "application/json",
    "text/csv",
    "application/vnd.ms-excel",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("File too large (max {limit_mb}MB)")]
    TooLarge { limit_mb: u64 },

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Uploaded file is empty")]
    Empty,

    #[error("Uploaded file is not valid UTF-8 text")]
    NotText,

    #[error("No file provided")]
    MissingFile,
}

fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Checks size, type and encoding of an upload and returns its text.
pub fn validate_upload(
    bytes: &[u8],
    content_type: Option<&str>,
    max_bytes: usize,
) -> Result<String, UploadError> {
    if bytes.len() > max_bytes {
        return Err(UploadError::TooLarge {
            limit_mb: (max_bytes as u64).div_ceil(1024 * 1024),
        });
    }

    let essence = mime_essence(content_type.unwrap_or("application/octet-stream"));
    if !ALLOWED_MIME.contains(&essence.as_str()) {
        return Err(UploadError::UnsupportedType(essence));
    }

    let text = std::str::from_utf8(bytes).map_err(|_| UploadError::NotText)?;
    if text.trim().is_empty() {
        return Err(UploadError::Empty);
    }

    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: usize = 1024 * 1024;

    #[test]
    fn accepts_plain_text() {
        let text = validate_upload(b"dear diary", Some("text/plain"), MIB).unwrap();
        assert_eq!(text, "dear diary");
    }

    #[test]
    fn content_type_parameters_are_ignored() {
        assert!(validate_upload(b"a,b", Some("Text/CSV; charset=utf-8"), MIB).is_ok());
    }

    #[test]
    fn rejects_oversized_file() {
        let body = vec![b'a'; MIB + 1];
        assert_eq!(
            validate_upload(&body, Some("text/plain"), MIB),
            Err(UploadError::TooLarge { limit_mb: 1 })
        );
    }

    #[test]
    fn size_limit_is_inclusive() {
        let body = vec![b'a'; MIB];
        assert!(validate_upload(&body, Some("text/plain"), MIB).is_ok());
    }

    #[test]
    fn rejects_binary_types() {
        assert_eq!(
            validate_upload(b"\x89PNG", Some("image/png"), MIB),
            Err(UploadError::UnsupportedType("image/png".into()))
        );
        assert!(matches!(
            validate_upload(b"x", None, MIB),
            Err(UploadError::UnsupportedType(_))
        ));
    }

    #[test]
    fn rejects_invalid_utf8_and_blank_files() {
        assert_eq!(
            validate_upload(&[0xff, 0xfe, 0x00], Some("text/plain"), MIB),
            Err(UploadError::NotText)
        );
        assert_eq!(
            validate_upload(b"  \n ", Some("text/plain"), MIB),
            Err(UploadError::Empty)
        );
    }
}
