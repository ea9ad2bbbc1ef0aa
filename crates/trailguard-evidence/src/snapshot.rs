use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use trailguard_domain::model::ConfigurationSnapshot;
use trailguard_domain::VerifyError;

/// Capture-time key written by the snapshot collector. Not a server variable.
pub const TIMESTAMP_KEY: &str = "_ts";

/// Parse a flat JSON object of `variable -> string value`.
///
/// Values are never coerced: a number, boolean, null or nested value is an input error.
pub fn parse_snapshot(text: &str) -> Result<ConfigurationSnapshot, VerifyError> {
    let doc: Value = serde_json::from_str(text)
        .map_err(|e| VerifyError::input(format!("snapshot is not valid JSON: {e}")))?;

    if !doc.is_object() {
        return Err(VerifyError::input(format!(
            "snapshot must be a JSON object of variable names to string values, found {}",
            kind(&doc)
        )));
    }
    // `Value` keeps only the last of repeated keys, so re-read the entries as written.
    let Entries(entries) = serde_json::from_str(text)
        .map_err(|e| VerifyError::input(format!("snapshot is not valid JSON: {e}")))?;

    let mut values = BTreeMap::new();
    let mut captured_at = None;
    for (name, value) in entries {
        let s = match value {
            Value::String(s) => s,
            other => {
                return Err(VerifyError::input(format!(
                    "snapshot value for '{name}' must be a string, found {}",
                    kind(&other)
                )));
            }
        };
        let duplicate = if name == TIMESTAMP_KEY {
            captured_at.replace(s).is_some()
        } else {
            values.insert(name.clone(), s).is_some()
        };
        if duplicate {
            return Err(VerifyError::input(format!(
                "snapshot variable '{name}' appears more than once"
            )));
        }
    }

    Ok(ConfigurationSnapshot::new(values, captured_at))
}

/// Object members in document order, repeats included.
struct Entries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for Entries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Entries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Entries, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some(entry) = map.next_entry::<String, Value>()? {
                    entries.push(entry);
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_collector_output() {
        let snap = parse_snapshot(
            r#"{"require_secure_transport":"ON","local_infile":"OFF","sql_mode":"STRICT_ALL_TABLES,NO_ZERO_DATE","_ts":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(snap.len(), 3);
        assert_eq!(snap.get("local_infile"), Some("OFF"));
        assert_eq!(snap.get(TIMESTAMP_KEY), None);
        assert_eq!(snap.captured_at(), Some("2024-05-01T10:00:00Z"));
    }

    #[test]
    fn empty_object_is_an_empty_snapshot() {
        let snap = parse_snapshot("{}").unwrap();
        assert!(snap.is_empty());
        assert!(snap.captured_at().is_none());
    }

    #[test]
    fn non_string_values_are_rejected() {
        let err = parse_snapshot(r#"{"max_connections": 151}"#).unwrap_err();
        assert!(matches!(err, VerifyError::Input(_)));
        assert!(err.to_string().contains("'max_connections' must be a string, found a number"));

        let err = parse_snapshot(r#"{"local_infile": null}"#).unwrap_err();
        assert!(err.to_string().contains("found null"));
    }

    #[test]
    fn non_object_documents_are_rejected() {
        let err = parse_snapshot(r#"["ON"]"#).unwrap_err();
        assert!(err.to_string().contains("found an array"));

        let err = parse_snapshot("not json").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn repeated_variables_are_rejected() {
        let err = parse_snapshot(r#"{"local_infile":"ON","local_infile":"OFF"}"#).unwrap_err();
        assert!(matches!(err, VerifyError::Input(_)));
        assert!(err.to_string().contains("'local_infile' appears more than once"));

        let err = parse_snapshot(r#"{"_ts":"a","local_infile":"OFF","_ts":"b"}"#).unwrap_err();
        assert!(err.to_string().contains("'_ts' appears more than once"));
    }
}
