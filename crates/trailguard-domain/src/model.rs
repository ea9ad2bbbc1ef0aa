use crate::error::VerifyError;
use std::collections::BTreeMap;
use std::fmt;

/// Opaque hash value, compared byte-for-byte.
///
/// The empty value is the sentinel: "no predecessor".
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct HashBytes(Vec<u8>);

impl HashBytes {
    pub fn sentinel() -> Self {
        HashBytes(Vec::new())
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        HashBytes(bytes.into())
    }

    /// Decode a hex string (either case). An empty string decodes to the sentinel.
    pub fn from_hex(s: &str) -> Result<Self, VerifyError> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(HashBytes::sentinel());
        }
        hex::decode(s)
            .map(HashBytes)
            .map_err(|e| VerifyError::input(format!("invalid hex hash '{}': {e}", truncate(s))))
    }

    pub fn is_sentinel(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lower-case hex.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Debug for HashBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            f.write_str("HashBytes(<sentinel>)")
        } else {
            write!(f, "HashBytes({})", self.to_hex())
        }
    }
}

impl fmt::Display for HashBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            f.write_str("<sentinel>")
        } else {
            f.write_str(&self.to_hex())
        }
    }
}

fn truncate(s: &str) -> String {
    const MAX: usize = 80;
    if s.chars().count() <= MAX {
        s.to_string()
    } else {
        let head: String = s.chars().take(MAX).collect();
        format!("{head}...")
    }
}

/// One row of an append-only audit trail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditRecord {
    pub sequence_id: u64,
    pub previous_hash: HashBytes,
    pub current_hash: HashBytes,
    pub table_name: Option<String>,
    pub action: Option<String>,
}

impl AuditRecord {
    pub fn new(sequence_id: u64, previous_hash: HashBytes, current_hash: HashBytes) -> Self {
        Self {
            sequence_id,
            previous_hash,
            current_hash,
            table_name: None,
            action: None,
        }
    }
}

/// Observed configuration variables, captured once per run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigurationSnapshot {
    values: BTreeMap<String, String>,
    captured_at: Option<String>,
}

impl ConfigurationSnapshot {
    pub fn new(values: BTreeMap<String, String>, captured_at: Option<String>) -> Self {
        Self {
            values,
            captured_at,
        }
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            captured_at: None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn captured_at(&self) -> Option<&str> {
        self.captured_at.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
