//! Address list ingestion.
//!
//! Every address list the console handles (the `banIPs` field of a status
//! response, typed or pasted input, imported files) goes through
//! [`normalize`] so that tokens are trimmed and empty tokens dropped.

use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;

use crate::utils::errors::{AppError, Result};

/// Encoding of an import file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// A JSON array of addresses, or an object whose values are addresses.
    Json,
    /// Addresses separated by newlines, commas or semicolons.
    Delimited,
}

impl ImportFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ImportFormat::Json,
            _ => ImportFormat::Delimited,
        }
    }
}

/// Trim every token and drop the empty ones.
pub fn normalize<I, S>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split a free-form list on whitespace, commas and semicolons.
pub fn split_addresses(raw: &str) -> Vec<String> {
    normalize(raw.split(|c: char| c.is_whitespace() || c == ',' || c == ';'))
}

/// Accepts either a structured list or a delimited string.
pub fn addresses_from_value(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => normalize(items.iter().filter_map(scalar_text)),
        Value::String(s) => split_addresses(s),
        other => scalar_text(other).map(|s| split_addresses(&s)).unwrap_or_default(),
    }
}

/// De-duplicate with exact string equality, keeping first occurrences.
pub fn unique(addresses: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    addresses
        .into_iter()
        .filter(|ip| seen.insert(ip.clone()))
        .collect()
}

/// Decode an import file into the normalized, de-duplicated address list.
pub fn decode_import(text: &str, format: ImportFormat) -> Result<Vec<String>> {
    let tokens = match format {
        ImportFormat::Json => {
            let parsed: Value =
                serde_json::from_str(text).map_err(|e| AppError::Parse(e.to_string()))?;
            match parsed {
                Value::Array(items) => normalize(items.iter().filter_map(scalar_text)),
                Value::Object(map) => normalize(map.values().filter_map(scalar_text)),
                _ => {
                    return Err(AppError::Parse(
                        "expected a JSON array or object of addresses".to_string(),
                    ))
                }
            }
        }
        ImportFormat::Delimited => normalize(text.split(['\n', '\r', ',', ';'])),
    };
    Ok(unique(tokens))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn delimited_string_is_split_and_trimmed() {
        assert_eq!(
            split_addresses(" 1.2.3.4,5.6.7.8 ;; 10.0.0.0/8\n\t"),
            vec!["1.2.3.4", "5.6.7.8", "10.0.0.0/8"]
        );
    }

    #[test]
    fn structured_and_string_forms_agree() {
        let list = addresses_from_value(&json!(["1.2.3.4", " ", "5.6.7.8 "]));
        let text = addresses_from_value(&json!("1.2.3.4 5.6.7.8"));
        assert_eq!(list, text);
        assert!(addresses_from_value(&Value::Null).is_empty());
    }

    #[test]
    fn duplicate_import_collapses_to_one_address() {
        let ips = decode_import(r#"["1.2.3.4", "1.2.3.4", " 1.2.3.4 "]"#, ImportFormat::Json)
            .unwrap();
        assert_eq!(ips, vec!["1.2.3.4"]);
    }

    #[test]
    fn json_object_values_are_taken_in_order() {
        let ips = decode_import(r#"{"b": "9.9.9.9", "a": "1.1.1.1", "c": null}"#, ImportFormat::Json)
            .unwrap();
        assert_eq!(ips, vec!["9.9.9.9", "1.1.1.1"]);
    }

    #[test]
    fn plain_text_import_accepts_mixed_separators() {
        let ips = decode_import("1.2.3.4\r\n5.6.7.8,1.2.3.4;;\n\n", ImportFormat::Delimited).unwrap();
        assert_eq!(ips, vec!["1.2.3.4", "5.6.7.8"]);
    }

    #[test]
    fn dedup_is_case_sensitive() {
        let ips = unique(vec!["fe80::A".to_string(), "fe80::a".to_string()]);
        assert_eq!(ips.len(), 2);
    }

    #[test]
    fn json_scalar_is_a_parse_error() {
        assert!(decode_import("42", ImportFormat::Json).is_err());
        assert!(decode_import("not json", ImportFormat::Json).is_err());
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(ImportFormat::for_path(Path::new("bans.JSON")), ImportFormat::Json);
        assert_eq!(ImportFormat::for_path(Path::new("bans.txt")), ImportFormat::Delimited);
        assert_eq!(ImportFormat::for_path(Path::new("bans")), ImportFormat::Delimited);
    }
}
