//! Centralized validation and helper functions.

/// Maximum length of a symptom, diagnosis, drug or lab test id
pub const MAX_IDENTIFIER_LENGTH: usize = 64;

/// Maximum length of a free-text search query
pub const MAX_QUERY_LENGTH: usize = 256;

/// Maximum number of lines accepted in a session script
pub const MAX_SCRIPT_LINES: usize = 10_000;

/// Validation error types
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Empty identifier provided")]
    EmptyIdentifier,
    #[error("Identifier too long: exceeds {MAX_IDENTIFIER_LENGTH} characters")]
    IdentifierTooLong,
    #[error("Invalid identifier '{0}': use letters, digits, '-', '_' or '.'")]
    InvalidIdentifier(String),
    #[error("Search query too long: exceeds {MAX_QUERY_LENGTH} characters")]
    QueryTooLong,
    #[error("Too many lines: exceeds maximum of {MAX_SCRIPT_LINES}")]
    TooManyLines,
    #[error("Invalid gender '{0}': expected male, female or other")]
    InvalidGender(String),
}

/// Check that an id is non-empty, bounded, and made of safe characters.
///
/// # Examples
///
/// ```
/// use clinic_dx::utils::validation::validate_identifier;
///
/// assert!(validate_identifier("chest-pain").is_ok());
/// assert!(validate_identifier("J06.9").is_ok());
/// assert!(validate_identifier("chest pain").is_err());
/// ```
///
/// # Errors
///
/// Returns `ValidationError::EmptyIdentifier`, `ValidationError::IdentifierTooLong`
/// or `ValidationError::InvalidIdentifier`.
pub fn validate_identifier(id: &str) -> Result<&str, ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::EmptyIdentifier);
    }

    if id.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ValidationError::IdentifierTooLong);
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ValidationError::InvalidIdentifier(id.to_string()));
    }

    Ok(id)
}

/// Normalize a free-text search query to lowercase, trimmed.
///
/// # Errors
///
/// Returns `ValidationError::QueryTooLong` if the query exceeds the limit.
pub fn normalize_query(query: &str) -> Result<String, ValidationError> {
    if query.len() > MAX_QUERY_LENGTH {
        return Err(ValidationError::QueryTooLong);
    }
    Ok(query.trim().to_lowercase())
}

/// Compute a catalog fingerprint from (diagnosis id, symptom id) pairs.
///
/// Pairs are sorted before hashing so declaration order does not affect the
/// result. Two catalogs share a fingerprint exactly when they link the same
/// diagnoses to the same symptoms.
#[must_use]
pub fn compute_fingerprint<'a, I>(links: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut sorted: Vec<String> = links
        .into_iter()
        .map(|(diagnosis, symptom)| format!("{diagnosis}:{symptom}"))
        .collect();
    sorted.sort_unstable();
    let concatenated = sorted.join(",");
    let digest = md5::compute(concatenated.as_bytes());
    format!("{digest:x}")
}

/// Check if reading another line would exceed the maximum allowed.
///
/// Call this with the current count BEFORE accepting a new line.
#[must_use]
pub fn check_line_limit(count: usize) -> Option<ValidationError> {
    if count >= MAX_SCRIPT_LINES {
        Some(ValidationError::TooManyLines)
    } else {
        None
    }
}

/// Safely convert usize to f64 for ratio calculations
#[inline]
#[must_use]
pub fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier() {
        assert_eq!(validate_identifier("fever"), Ok("fever"));
        assert_eq!(validate_identifier("diabetes-t2"), Ok("diabetes-t2"));
        assert_eq!(validate_identifier(""), Err(ValidationError::EmptyIdentifier));
        assert_eq!(
            validate_identifier(&"a".repeat(MAX_IDENTIFIER_LENGTH + 1)),
            Err(ValidationError::IdentifierTooLong)
        );
        assert!(matches!(
            validate_identifier("../etc"),
            Err(ValidationError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            validate_identifier("fever\0"),
            Err(ValidationError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  HeAd ").unwrap(), "head");
        assert_eq!(normalize_query("").unwrap(), "");
        assert_eq!(
            normalize_query(&"x".repeat(MAX_QUERY_LENGTH + 1)),
            Err(ValidationError::QueryTooLong)
        );
    }

    #[test]
    fn test_compute_fingerprint() {
        let a = compute_fingerprint([("d1", "fever"), ("d1", "cough"), ("d2", "fever")]);
        let b = compute_fingerprint([("d2", "fever"), ("d1", "fever"), ("d1", "cough")]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);

        let c = compute_fingerprint([("d1", "fever"), ("d2", "fever")]);
        assert_ne!(a, c);
    }

    #[test]
    fn test_check_line_limit() {
        assert!(check_line_limit(0).is_none());
        assert!(check_line_limit(MAX_SCRIPT_LINES - 1).is_none());
        assert_eq!(
            check_line_limit(MAX_SCRIPT_LINES),
            Some(ValidationError::TooManyLines)
        );
    }
}
