//! Input normalization for catalog writes and lookups.
//!
//! Handlers run every client-supplied field through these functions before
//! any store call, so absent or blank required fields are rejected with a
//! `Validation` error instead of reaching the database.

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum length for names and alias entries.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length for quote text.
pub const MAX_QUOTE_LEN: usize = 4000;

/// Maximum length for free-text fields (`info`, `reference`, `scene`, `avatar`).
pub const MAX_TEXT_LEN: usize = 10_000;

/// Maximum number of characters a single quote may reference.
pub const MAX_CHARACTERS_PER_QUOTE: usize = 50;

/// Result cap for the quote substring search.
pub const QUOTE_KEYWORD_LIMIT: i64 = 20;

/// Trim a required single-line field and enforce a length bound.
pub fn require_text(field: &str, value: Option<&str>, max_len: usize) -> Result<String, CoreError> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(CoreError::validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > max_len {
        return Err(CoreError::validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// An optional free-text field. Absent means empty (full-replace semantics).
pub fn optional_text(field: &str, value: Option<&str>, max_len: usize) -> Result<String, CoreError> {
    let value = value.unwrap_or_default();
    if value.chars().count() > max_len {
        return Err(CoreError::validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(value.to_string())
}

/// Normalize an alias set: trim entries, drop blanks, de-duplicate keeping
/// first occurrence.
pub fn normalize_alias(alias: Option<&[String]>) -> Result<Vec<String>, CoreError> {
    let mut out: Vec<String> = Vec::new();
    for entry in alias.unwrap_or_default() {
        let entry = entry.trim();
        if entry.is_empty() || out.iter().any(|a| a == entry) {
            continue;
        }
        if entry.chars().count() > MAX_NAME_LEN {
            return Err(CoreError::validation(format!(
                "alias entries must be at most {MAX_NAME_LEN} characters"
            )));
        }
        out.push(entry.to_string());
    }
    Ok(out)
}

/// A foreign-key id supplied by the client must be present and positive.
pub fn require_id(field: &str, value: Option<DbId>) -> Result<DbId, CoreError> {
    match value {
        Some(id) if id > 0 => Ok(id),
        Some(id) => Err(CoreError::validation(format!(
            "{field} must be a positive id, got {id}"
        ))),
        None => Err(CoreError::validation(format!("{field} is required"))),
    }
}

/// A quote's character list: non-empty, positive ids, de-duplicated in order.
pub fn require_character_ids(value: Option<&[DbId]>) -> Result<Vec<DbId>, CoreError> {
    let ids = value.unwrap_or_default();
    if ids.is_empty() {
        return Err(CoreError::validation("characterIds must not be empty"));
    }
    let mut out: Vec<DbId> = Vec::with_capacity(ids.len());
    for &id in ids {
        if id <= 0 {
            return Err(CoreError::validation(format!(
                "characterIds must contain positive ids, got {id}"
            )));
        }
        if !out.contains(&id) {
            out.push(id);
        }
    }
    if out.len() > MAX_CHARACTERS_PER_QUOTE {
        return Err(CoreError::validation(format!(
            "a quote may reference at most {MAX_CHARACTERS_PER_QUOTE} characters"
        )));
    }
    Ok(out)
}

/// A search keyword must contain something other than whitespace.
pub fn require_keyword(value: Option<&str>) -> Result<String, CoreError> {
    require_text("kw", value, MAX_NAME_LEN)
}

/// Escape `%`, `_` and `\` so a keyword matches literally inside `ILIKE`.
pub fn escape_like(keyword: &str) -> String {
    let mut out = String::with_capacity(keyword.len() + 2);
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Name-or-alias probe used by the existence checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistenceProbe {
    pub name: Option<String>,
    pub alias: Vec<String>,
}

impl ExistenceProbe {
    /// At least one of `name` / `alias` must be non-blank.
    pub fn new(name: Option<&str>, alias: &[String]) -> Result<Self, CoreError> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        let alias = normalize_alias(Some(alias))?;
        if name.is_none() && alias.is_empty() {
            return Err(CoreError::validation("name or alias is required"));
        }
        Ok(Self { name, alias })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn required_text_is_trimmed() {
        assert_eq!(require_text("name", Some("  Rei "), 10).unwrap(), "Rei");
    }

    #[test]
    fn required_text_rejects_blank_and_absent() {
        assert_matches!(require_text("name", None, 10), Err(CoreError::Validation(m)) if m == "name is required");
        assert_matches!(require_text("name", Some("   "), 10), Err(CoreError::Validation(_)));
    }

    #[test]
    fn required_text_enforces_length_in_chars() {
        assert!(require_text("name", Some("日本語"), 3).is_ok());
        assert!(require_text("name", Some("日本語!"), 3).is_err());
    }

    #[test]
    fn optional_text_defaults_to_empty() {
        assert_eq!(optional_text("info", None, 10).unwrap(), "");
        assert_eq!(optional_text("info", Some(" kept "), 10).unwrap(), " kept ");
    }

    #[test]
    fn alias_is_trimmed_and_deduplicated() {
        let input = vec![" a".to_string(), "".into(), "b".into(), "a ".into()];
        assert_eq!(normalize_alias(Some(input.as_slice())).unwrap(), vec!["a", "b"]);
        assert!(normalize_alias(None).unwrap().is_empty());
    }

    #[test]
    fn id_must_be_positive() {
        assert_eq!(require_id("sourceId", Some(3)).unwrap(), 3);
        assert!(require_id("sourceId", Some(0)).is_err());
        assert!(require_id("sourceId", None).is_err());
    }

    #[test]
    fn character_ids_are_deduplicated_in_order() {
        assert_eq!(require_character_ids(Some(&[4, 2, 4, 9][..])).unwrap(), vec![4, 2, 9]);
    }

    #[test]
    fn character_ids_reject_empty_and_non_positive() {
        assert!(require_character_ids(None).is_err());
        assert!(require_character_ids(Some(&[][..])).is_err());
        assert!(require_character_ids(Some(&[1, -2][..])).is_err());
    }

    #[test]
    fn like_escaping() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn probe_requires_name_or_alias() {
        assert!(ExistenceProbe::new(None, &[]).is_err());
        assert!(ExistenceProbe::new(Some(" "), &["".to_string()]).is_err());

        let probe = ExistenceProbe::new(None, &["Ayanami".to_string()]).unwrap();
        assert_eq!(probe.name, None);
        assert_eq!(probe.alias, vec!["Ayanami"]);
    }
}
