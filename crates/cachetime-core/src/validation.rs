//! Validation of ids and cache time payloads.
//!
//! Every check runs and every failure is reported: a caller sending an id that
//! is both too short and uppercase sees both problems in one response.

use crate::body::CacheTimeBody;

/// Length of a hex encoded MD5 digest.
pub const ID_LENGTH: usize = 32;

/// One or more validation failures.
///
/// Displays as `validation errors: [first, second, ...]`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation errors: {}", format_violations(.violations))]
pub struct ValidationError {
    violations: Vec<String>,
}

impl ValidationError {
    /// Wraps a list of violations; returns `None` when the list is empty.
    pub fn from_violations(violations: Vec<String>) -> Option<Self> {
        if violations.is_empty() {
            None
        } else {
            Some(Self { violations })
        }
    }

    pub fn violations(&self) -> &[String] {
        &self.violations
    }
}

fn format_violations(violations: &[String]) -> String {
    format!("[{}]", violations.join(", "))
}

/// Collects every problem with an id without stopping at the first.
pub fn find_id_errors(id: &str) -> Vec<String> {
    let mut violations = Vec::new();

    if id.len() != ID_LENGTH {
        violations.push(format!("id should be {} characters in length", ID_LENGTH));
    }
    if id.to_lowercase() != id {
        violations.push("id is not lowercase".to_string());
    }
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_hexdigit()) {
        violations.push("id is not a valid hexadecimal".to_string());
    }

    violations
}

/// Validates a cache time id.
pub fn validate_id(id: &str) -> Result<(), ValidationError> {
    match ValidationError::from_violations(find_id_errors(id)) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Validates the id from the URL together with the decoded body.
pub fn validate_cache_time(id: &str, body: &CacheTimeBody) -> Result<(), ValidationError> {
    let mut violations = find_id_errors(id);

    if body.path.is_empty() {
        violations.push("path field missing".to_string());
    }

    match ValidationError::from_violations(violations) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_ID: &str = "a1b2c3d4e5f67890123456789abcdef0";

    #[test]
    fn accepts_valid_id() {
        assert!(validate_id(VALID_ID).is_ok());
    }

    #[test]
    fn short_id_reports_length_only() {
        let err = validate_id("abc").unwrap_err();
        assert_eq!(err.violations(), ["id should be 32 characters in length"]);
    }

    #[test]
    fn uppercase_id_reports_lowercase_only() {
        let err = validate_id("A1B2C3D4E5F67890123456789ABCDEF0").unwrap_err();
        assert_eq!(err.violations(), ["id is not lowercase"]);
    }

    #[test]
    fn non_hex_id_reports_hex_only() {
        let err = validate_id("g1b2c3d4e5f67890123456789abcdef0").unwrap_err();
        assert_eq!(err.violations(), ["id is not a valid hexadecimal"]);
    }

    #[test]
    fn reports_every_failure_together() {
        let err = validate_id("ABC").unwrap_err();

        assert_eq!(err.violations().len(), 2);
        assert_eq!(
            err.to_string(),
            "validation errors: [id should be 32 characters in length, id is not lowercase]"
        );
    }

    #[test]
    fn empty_id_fails_length_and_hex() {
        let err = validate_id("").unwrap_err();

        assert!(err.violations().contains(&"id should be 32 characters in length".to_string()));
        assert!(err.violations().contains(&"id is not a valid hexadecimal".to_string()));
    }

    #[test]
    fn cache_time_aggregates_id_and_path() {
        let body = CacheTimeBody::default();
        let err = validate_cache_time("xyz", &body).unwrap_err();

        assert_eq!(
            err.to_string(),
            "validation errors: [id should be 32 characters in length, \
             id is not a valid hexadecimal, path field missing]"
        );
    }

    #[test]
    fn cache_time_with_path_is_valid() {
        let body = CacheTimeBody {
            path: "/economy/gdp".to_string(),
            ..Default::default()
        };

        assert!(validate_cache_time(VALID_ID, &body).is_ok());
    }

    #[test]
    fn no_violations_is_no_error() {
        assert!(ValidationError::from_violations(Vec::new()).is_none());
    }
}
