//! Validation helpers for DTOs.

use validator::ValidationError;

/// Number of characters in a lobby code.
pub const LOBBY_CODE_LEN: usize = 6;

/// Characters a lobby code may contain. Ambiguous glyphs (I, L, O, 0, 1)
/// are excluded so codes survive being read aloud or scribbled down.
pub const LOBBY_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

const MAX_DISPLAY_NAME_LEN: usize = 24;

/// Validates that a lobby code is exactly six characters from the code alphabet.
///
/// # Examples
///
/// ```ignore
/// validate_lobby_code("QX7RJ4") // Ok
/// validate_lobby_code("qx7rj4") // Err - lowercase
/// validate_lobby_code("QX7RJ")  // Err - too short
/// validate_lobby_code("QX0RJ4") // Err - ambiguous character
/// ```
pub fn validate_lobby_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != LOBBY_CODE_LEN {
        let mut err = ValidationError::new("lobby_code_length");
        err.message = Some(
            format!(
                "Lobby code must be exactly {} characters (got {})",
                LOBBY_CODE_LEN,
                code.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !code
        .bytes()
        .all(|byte| LOBBY_CODE_ALPHABET.contains(&byte))
    {
        let mut err = ValidationError::new("lobby_code_format");
        err.message = Some("Lobby code contains characters outside the code alphabet".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a display name is non-blank and reasonably short.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("display_name_blank");
        err.message = Some("Display name must not be blank".into());
        return Err(err);
    }

    if trimmed.chars().count() > MAX_DISPLAY_NAME_LEN {
        let mut err = ValidationError::new("display_name_length");
        err.message = Some(
            format!("Display name must be at most {MAX_DISPLAY_NAME_LEN} characters").into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_lobby_code_valid() {
        assert!(validate_lobby_code("QX7RJ4").is_ok());
        assert!(validate_lobby_code("ABCDEF").is_ok());
        assert!(validate_lobby_code("234567").is_ok());
    }

    #[test]
    fn test_validate_lobby_code_invalid_length() {
        assert!(validate_lobby_code("QX7RJ").is_err()); // too short
        assert!(validate_lobby_code("QX7RJ44").is_err()); // too long
        assert!(validate_lobby_code("").is_err()); // empty
    }

    #[test]
    fn test_validate_lobby_code_invalid_format() {
        assert!(validate_lobby_code("qx7rj4").is_err()); // lowercase
        assert!(validate_lobby_code("QX0RJ4").is_err()); // ambiguous zero
        assert!(validate_lobby_code("QX1RJ4").is_err()); // ambiguous one
        assert!(validate_lobby_code("QXIRJ4").is_err()); // ambiguous I
        assert!(validate_lobby_code("QX RJ4").is_err()); // space
    }

    #[test]
    fn test_validate_display_name() {
        assert!(validate_display_name("Ada").is_ok());
        assert!(validate_display_name("  ").is_err());
        assert!(validate_display_name("").is_err());
        assert!(validate_display_name(&"x".repeat(25)).is_err());
        assert!(validate_display_name(&"x".repeat(24)).is_ok());
    }
}
