pub mod common;
pub mod email;
pub mod name;
pub mod password;

use rayon::prelude::*;
use validator::ValidationError;

use crate::{
    types::validations::ValidationRule,
    utils::{locale_utils::Messages, validation_utils::add_error},
};

/// Evaluates every rule and folds the failures into one `ValidationError`.
/// `echo` controls whether the offending value is reflected back in params.
pub(crate) fn run_rules(
    value: &str,
    messages: &Messages,
    rules: &[ValidationRule],
    code: &'static str,
    echo: bool,
) -> Result<(), ValidationError> {
    let errors: Vec<String> = rules
        .par_iter()
        .filter_map(|rule| rule(value, messages).err())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        let shown = if echo { value } else { "" };
        Err(add_error(code, errors.join(", "), shown))
    }
}
