//! # Environment Variables
//!
//! Utilities for reading environment variables.

use std::env;

/// Get an environment variable by name.
pub fn get_env(name: &'static str) -> Result<String, Error> {
    env::var(name).map_err(|_| Error::MissingEnv(name))
}

/// Get an environment variable, falling back to `default` when it is unset.
pub fn get_env_or(name: &'static str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

// region:    --- Error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} must be set in environment")]
    MissingEnv(&'static str),
}
// endregion: --- Error

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_env_reports_name() {
        let err = get_env("LIB_UTILS_TEST_SURELY_UNSET").unwrap_err();
        assert_eq!(err.to_string(), "LIB_UTILS_TEST_SURELY_UNSET must be set in environment");
    }

    #[test]
    fn test_get_env_or_default() {
        assert_eq!(get_env_or("LIB_UTILS_TEST_SURELY_UNSET", "fallback"), "fallback");
    }
}
