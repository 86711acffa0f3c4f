//! Boolean query-flag parsing (`with_source`, `with_character_all`, ...).
//!
//! Every expansion flag is read through [`parse_flag`] so the accepted
//! spellings are identical across routes.

use crate::error::CoreError;

const TRUE_VALUES: &[&str] = &["", "true", "1", "yes", "on"];
const FALSE_VALUES: &[&str] = &["false", "0", "no", "off"];

/// Interpret an optional query-string value as a boolean flag.
///
/// `None` (key absent) is `false`. A bare key (`?with_source`) arrives as an
/// empty string and counts as `true`. Unknown spellings are rejected rather
/// than guessed.
pub fn parse_flag(name: &str, raw: Option<&str>) -> Result<bool, CoreError> {
    let Some(raw) = raw else {
        return Ok(false);
    };
    let value = raw.trim().to_ascii_lowercase();
    if TRUE_VALUES.contains(&value.as_str()) {
        Ok(true)
    } else if FALSE_VALUES.contains(&value.as_str()) {
        Ok(false)
    } else {
        Err(CoreError::validation(format!(
            "{name} must be a boolean flag, got '{raw}'"
        )))
    }
}
