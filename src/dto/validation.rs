//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest name accepted for game objects, tags and lists.
pub const MAX_NAME_LENGTH: usize = 200;

/// Validates that an identifier is present and carries no surrounding whitespace.
///
/// # Examples
///
/// ```ignore
/// validate_identifier("p1")   // Ok
/// validate_identifier("  ")   // Err - blank
/// validate_identifier(" p1")  // Err - padded
/// ```
pub fn validate_identifier(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        let mut err = ValidationError::new("identifier_blank");
        err.message = Some("identifier must not be blank".into());
        return Err(err);
    }

    if id.trim() != id {
        let mut err = ValidationError::new("identifier_padded");
        err.message = Some("identifier must not start or end with whitespace".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a display name is non-blank and at most [`MAX_NAME_LENGTH`] characters.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("name_blank");
        err.message = Some("name must not be blank".into());
        return Err(err);
    }

    let length = name.chars().count();
    if length > MAX_NAME_LENGTH {
        let mut err = ValidationError::new("name_length");
        err.message = Some(
            format!("name must be at most {MAX_NAME_LENGTH} characters (got {length})").into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates every entry of an identifier list.
pub fn validate_identifiers(ids: &[String]) -> Result<(), ValidationError> {
    ids.iter().try_for_each(|id| validate_identifier(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier_valid() {
        assert!(validate_identifier("p1").is_ok());
        assert!(validate_identifier("8d0c5a1e-3f0b-4c55-9d1e-2a9c4b7f0e11").is_ok());
    }

    #[test]
    fn test_validate_identifier_invalid() {
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("   ").is_err());
        assert!(validate_identifier(" p1").is_err());
    }

    #[test]
    fn test_validate_name_length() {
        assert!(validate_name("Fire Sword").is_ok());
        assert!(validate_name(&"x".repeat(MAX_NAME_LENGTH)).is_ok());
        assert!(validate_name(&"x".repeat(MAX_NAME_LENGTH + 1)).is_err());
        assert!(validate_name("\t").is_err());
    }

    #[test]
    fn test_validate_identifiers_rejects_any_blank_entry() {
        assert!(validate_identifiers(&["a".into(), "b".into()]).is_ok());
        assert!(validate_identifiers(&["a".into(), " ".into()]).is_err());
    }
}
