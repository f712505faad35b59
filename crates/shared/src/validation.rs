//! Common validation utilities.

use validator::ValidationError;

/// Maximum length of a free-text report context (city, lab or station label).
pub const MAX_CONTEXT_LENGTH: usize = 120;

/// Maximum length of a station system identifier.
pub const MAX_SYSTEM_ID_LENGTH: usize = 64;

/// Validates a report context label.
///
/// The label is printed in the document and embedded in the file name, so it
/// must be non-blank, bounded in length, and free of control characters.
pub fn validate_context_label(label: &str) -> Result<(), ValidationError> {
    if label.trim().is_empty() {
        let mut err = ValidationError::new("context_blank");
        err.message = Some("Context must not be blank".into());
        return Err(err);
    }

    if label.chars().count() > MAX_CONTEXT_LENGTH {
        let mut err = ValidationError::new("context_length");
        err.message = Some(
            format!("Context must be at most {} characters", MAX_CONTEXT_LENGTH).into(),
        );
        return Err(err);
    }

    if label.chars().any(char::is_control) {
        let mut err = ValidationError::new("context_control_chars");
        err.message = Some("Context must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}

/// Validates a station system identifier used in backend paths.
pub fn validate_system_id(system_id: &str) -> Result<(), ValidationError> {
    if system_id.is_empty() || system_id.len() > MAX_SYSTEM_ID_LENGTH {
        let mut err = ValidationError::new("system_id_length");
        err.message = Some(
            format!(
                "System ID must be between 1 and {} characters",
                MAX_SYSTEM_ID_LENGTH
            )
            .into(),
        );
        return Err(err);
    }

    if !system_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':' || c == '.')
    {
        let mut err = ValidationError::new("system_id_charset");
        err.message = Some(
            "System ID may only contain alphanumerics, hyphens, underscores, colons and dots"
                .into(),
        );
        return Err(err);
    }

    Ok(())
}
