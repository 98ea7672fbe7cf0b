//! Account validation utilities

use thiserror::Error;

/// Errors that can occur during account validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AccountValidationError {
    #[error("Account ID cannot be empty")]
    EmptyId,

    #[error("Account ID exceeds maximum length of {0} characters")]
    TooLong(usize),

    #[error("Account ID contains invalid character: '{0}'. Only alphanumeric characters, hyphens and underscores are allowed")]
    InvalidCharacter(char),

    #[error("Email address is not valid")]
    InvalidEmail,
}

const MAX_ACCOUNT_ID_LENGTH: usize = 64;

/// Validate an account ID
///
/// Account IDs are issued by the external identity system, usually GUIDs.
/// Rules:
/// - Cannot be empty
/// - Maximum 64 characters
/// - Only alphanumeric characters, hyphens and underscores
pub fn validate_account_id(id: &str) -> Result<(), AccountValidationError> {
    if id.is_empty() {
        return Err(AccountValidationError::EmptyId);
    }

    if id.len() > MAX_ACCOUNT_ID_LENGTH {
        return Err(AccountValidationError::TooLong(MAX_ACCOUNT_ID_LENGTH));
    }

    if let Some(c) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(AccountValidationError::InvalidCharacter(c));
    }

    Ok(())
}

/// Minimal shape check; deliverability is the identity system's concern
pub fn validate_email(email: &str) -> Result<(), AccountValidationError> {
    let (local, domain) = email
        .split_once('@')
        .ok_or(AccountValidationError::InvalidEmail)?;

    if local.is_empty() || domain.is_empty() || !domain.contains('.') || email.contains(' ') {
        return Err(AccountValidationError::InvalidEmail);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_account_ids() {
        assert!(validate_account_id("user1").is_ok());
        assert!(validate_account_id("3f2504e0-4f89-11d3-9a0c-0305e82c3301").is_ok());
        assert!(validate_account_id("auth0_abc").is_ok());
    }

    #[test]
    fn test_invalid_account_ids() {
        assert_eq!(validate_account_id(""), Err(AccountValidationError::EmptyId));
        assert_eq!(
            validate_account_id("user 1"),
            Err(AccountValidationError::InvalidCharacter(' '))
        );
        assert_eq!(
            validate_account_id(&"a".repeat(65)),
            Err(AccountValidationError::TooLong(64))
        );
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("fan@example.com").is_ok());
        assert!(validate_email("fan@localhost").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("no-at-sign").is_err());
    }
}
