use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextureKeyError {
    #[error("texture key must not be empty")]
    Empty,
    #[error("texture key must not start with '-' or '_'")]
    LeadingSeparator,
    #[error("texture key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Texture keys are PNG file stems: lowercase ascii, digits, `_` and `-`.
pub(crate) fn validate_texture_key(key: &str) -> Result<(), TextureKeyError> {
    if key.is_empty() {
        return Err(TextureKeyError::Empty);
    }
    if key.starts_with('-') || key.starts_with('_') {
        return Err(TextureKeyError::LeadingSeparator);
    }
    for ch in key.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '-') {
            continue;
        }
        return Err(TextureKeyError::InvalidCharacter { character: ch });
    }
    Ok(())
}
