//! API key validation utilities

use thiserror::Error;

/// Errors that can occur during API key validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiKeyValidationError {
    #[error("API key ID must be a UUID")]
    MalformedId,

    #[error("API key name cannot be empty")]
    EmptyName,

    #[error("API key name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("API key name cannot contain control characters")]
    ControlCharacter,
}

const MAX_API_KEY_NAME_LENGTH: usize = 100;

/// Validate a display name chosen by the caller
///
/// Rules:
/// - Not blank
/// - Maximum 100 characters
/// - No control characters
pub fn validate_api_key_name(name: &str) -> Result<(), ApiKeyValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ApiKeyValidationError::EmptyName);
    }

    if trimmed.chars().count() > MAX_API_KEY_NAME_LENGTH {
        return Err(ApiKeyValidationError::NameTooLong(MAX_API_KEY_NAME_LENGTH));
    }

    if trimmed.chars().any(char::is_control) {
        return Err(ApiKeyValidationError::ControlCharacter);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(validate_api_key_name("test").is_ok());
        assert!(validate_api_key_name("Production server #2").is_ok());
        assert!(validate_api_key_name("clé d'équipe").is_ok());
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(
            validate_api_key_name("   "),
            Err(ApiKeyValidationError::EmptyName)
        );
    }

    #[test]
    fn test_name_too_long() {
        assert_eq!(
            validate_api_key_name(&"k".repeat(101)),
            Err(ApiKeyValidationError::NameTooLong(100))
        );
        assert!(validate_api_key_name(&"k".repeat(100)).is_ok());
    }

    #[test]
    fn test_control_characters() {
        assert_eq!(
            validate_api_key_name("line\nbreak"),
            Err(ApiKeyValidationError::ControlCharacter)
        );
    }
}
