use crate::error::ValidationError;

/// Extensions accepted for upload, matched case-insensitively against the
/// suffix after the last dot.
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["txt", "pdf", "png", "jpg", "jpeg", "gif"];

/// Upload size ceiling: 10 MiB, measured from the bytes actually received,
/// never from a client-declared header.
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Check the filename extension against the allow-list.
/// Runs before any network I/O.
pub fn check_filename(filename: &str) -> Result<(), ValidationError> {
    if filename.is_empty() {
        return Err(ValidationError::MissingFile);
    }

    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .ok_or(ValidationError::DisallowedType)?;

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ValidationError::DisallowedType);
    }

    Ok(())
}

/// Check the observed payload size against the ceiling
pub fn check_size(observed_bytes: usize) -> Result<(), ValidationError> {
    if observed_bytes > MAX_FILE_SIZE {
        return Err(ValidationError::TooLarge);
    }
    Ok(())
}

/// Reduce a client-supplied filename to a storage-safe form: the last path
/// component only, whitespace collapsed to underscores, anything outside
/// `[A-Za-z0-9._-]` dropped, leading dots and underscores trimmed.
pub fn sanitize_filename(filename: &str) -> String {
    let basename = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let cleaned: String = basename
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    cleaned.trim_start_matches(['.', '_']).to_string()
}
