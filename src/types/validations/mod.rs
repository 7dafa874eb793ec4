use crate::utils::locale_utils::Messages;

/// A single field rule: `Err` carries the localized message.
pub type ValidationResult = Result<(), String>;

pub type ValidationRule = fn(&str, &Messages) -> ValidationResult;
