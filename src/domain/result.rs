//! Result type alias for Aegis
//!
//! This module provides a convenient Result type alias that uses AegisError
//! as the error type.

use super::errors::AegisError;

/// Result type alias for Aegis operations
///
/// This is a convenience type alias that uses `AegisError` as the error type.
/// Use this throughout the codebase for fallible operations.
///
/// # Examples
///
/// ```
/// use aegis::domain::result::Result;
/// use aegis::domain::errors::AegisError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(AegisError::Configuration("invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, AegisError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::AegisError;

    #[test]
    fn test_result_ok() {
        let result: Result<i32> = Ok(42);
        assert!(result.is_ok());
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(AegisError::Configuration("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
