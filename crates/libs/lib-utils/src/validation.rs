//! # Validation Utilities
//!
//! Input validation helpers. Each returns a user-facing message on failure.

/// Validate that a string is not empty.
pub fn validate_not_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate email format (basic check).
///
/// Requires exactly one `@` with a non-empty local part and a dotted domain.
pub fn validate_email(email: &str) -> Result<(), String> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err("Invalid email format".to_string())
    }
}

/// Validate maximum length (in characters).
pub fn validate_max_length(value: &str, max: usize, field_name: &str) -> Result<(), String> {
    if value.chars().count() > max {
        Err(format!("{} must be at most {} characters", field_name, max))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("alice.example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@example").is_err());
        assert!(validate_email("alice@@example.com").is_err());
    }

    #[test]
    fn test_length_bounds_count_chars() {
        assert!(validate_max_length("abc", 3, "Username").is_ok());
        assert_eq!(
            validate_max_length("abcd", 3, "Username").unwrap_err(),
            "Username must be at most 3 characters"
        );
        // Multi-byte characters count once.
        assert!(validate_max_length("ééé", 3, "Title").is_ok());
        assert!(validate_max_length("éééé", 3, "Title").is_err());
    }

    #[test]
    fn test_not_empty_trims() {
        assert!(validate_not_empty("   ", "Description").is_err());
        assert!(validate_not_empty(" x ", "Description").is_ok());
    }
}
