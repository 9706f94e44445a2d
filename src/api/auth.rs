//! Bearer token handling for outgoing requests

/// Validated access token, rendered as `Bearer <token>`.
///
/// `Debug` prints `BearerToken([REDACTED])` so the token never ends up in
/// logs or error messages.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BearerToken").field(&"[REDACTED]").finish()
    }
}

impl TryFrom<String> for BearerToken {
    type Error = BearerTokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_token(&value)?;
        Ok(Self(value))
    }
}

impl TryFrom<&str> for BearerToken {
    type Error = BearerTokenError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        validate_token(value)?;
        Ok(Self(value.to_string()))
    }
}

/// Tokens must be non-empty visible ASCII (32-126) to be valid header values.
fn validate_token(token: &str) -> Result<(), BearerTokenError> {
    if token.is_empty() {
        return Err(BearerTokenError::Empty);
    }

    for (idx, ch) in token.chars().enumerate() {
        if !(32..=126).contains(&(ch as u32)) {
            return Err(BearerTokenError::InvalidCharacter {
                character: ch,
                position: idx,
            });
        }
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BearerTokenError {
    #[error("bearer token cannot be empty")]
    Empty,

    #[error("bearer token contains invalid character '{character}' (U+{:04X}) at position {position}", *character as u32)]
    InvalidCharacter { character: char, position: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value_includes_bearer_prefix() {
        let token = BearerToken::try_from("eyJ.abc.def").unwrap();
        assert_eq!(token.header_value(), "Bearer eyJ.abc.def");
    }

    #[test]
    fn test_rejects_empty_and_control_characters() {
        assert_eq!(BearerToken::try_from(""), Err(BearerTokenError::Empty));
        assert!(matches!(
            BearerToken::try_from("abc\ndef"),
            Err(BearerTokenError::InvalidCharacter { position: 3, .. })
        ));
    }

    #[test]
    fn test_debug_is_redacted() {
        let token = BearerToken::try_from("super-secret").unwrap();
        assert_eq!(format!("{token:?}"), "BearerToken(\"[REDACTED]\")");
    }
}
