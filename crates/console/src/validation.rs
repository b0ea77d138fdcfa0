//! Validation of request bodies before they are sent.

use validator::Validate;

use common::{AppError, AppResult};

/// Validate `value`, reporting the first failing field's message.
pub fn ensure_valid<T: Validate>(value: &T) -> AppResult<()> {
    value.validate().map_err(|e| {
        let message = e
            .field_errors()
            .values()
            .next()
            .and_then(|errors| errors.first())
            .and_then(|error| error.message.as_ref())
            .map(|msg| msg.to_string())
            .unwrap_or_else(|| "Validation failed".to_string());
        AppError::validation(message)
    })
}
