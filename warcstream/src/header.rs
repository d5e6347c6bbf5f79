// Copyright 2025 Janek Bevendorff
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! WARC named fields and the WARC header block parser.

use std::fmt;

use crate::splitter::CRLF;

/// Separator between a field name and its value.
pub(crate) const FIELD_SEP: &[u8] = b": ";

/// Synthetic field holding the WARC version from the record begin line.
pub const VERSION_KEY: &str = "WARC";

/// Value of a named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// Only used for `Content-Length`.
    Integer(u64),
    /// Field occurred more than once, or is always multi-valued (`outlink`).
    List(Vec<String>),
}

impl FieldValue {
    /// Value as string slice if it is a single text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Value as integer if it is an integer value.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// All values of this field as strings.
    pub fn values(&self) -> Vec<String> {
        match self {
            FieldValue::Text(s) => vec![s.clone()],
            FieldValue::Integer(n) => vec![n.to_string()],
            FieldValue::List(l) => l.clone(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            FieldValue::List(l) => l.push(value),
            other => {
                let mut values = other.values();
                values.push(value);
                *other = FieldValue::List(values);
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::List(l) => f.write_str(&l.join(",")),
        }
    }
}

/// Insertion-ordered, case-sensitive mapping of field names to values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    entries: Vec<(String, FieldValue)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get value for a field name.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Get single text value for a field name.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert a value, replacing any existing value under the same name.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Add a value, turning the field into a list if it already exists.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1.push(value.into()),
            None => self.entries.push((key, FieldValue::Text(value.into()))),
        }
    }

    /// Add a value to a field that is always a list.
    pub fn append_list(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1.push(value.into()),
            None => self.entries.push((key, FieldValue::List(vec![value.into()]))),
        }
    }

    /// Iterator of field names and values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parsed WARC header block.
///
/// Only [`parse_warc_header`] creates instances, so the synthetic `WARC`
/// version field is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarcHeader {
    fields: Fields,
}

impl WarcHeader {
    /// WARC version from the record begin line, e.g. `1.0`.
    pub fn version(&self) -> &str {
        self.fields.get_str(VERSION_KEY).unwrap_or_default()
    }

    /// Get value for a (case-sensitive) field name.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Get single text value for a (case-sensitive) field name.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get_str(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Value of `WARC-Type`.
    pub fn warc_type(&self) -> Option<&str> {
        self.get_str("WARC-Type")
    }

    /// Bare record ID without the `<urn:uuid:...>` wrapper.
    pub fn record_id(&self) -> Option<&str> {
        self.get_str("WARC-Record-ID")
    }

    /// Bare ID of the concurrent record.
    pub fn concurrent_to(&self) -> Option<&str> {
        self.get_str("WARC-Concurrent-To")
    }

    pub fn target_uri(&self) -> Option<&str> {
        self.get_str("WARC-Target-URI")
    }

    pub fn content_type(&self) -> Option<&str> {
        self.get_str("Content-Type")
    }

    pub fn content_length(&self) -> Option<u64> {
        self.get("Content-Length").and_then(FieldValue::as_u64)
    }

    /// All fields including the synthetic version field.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }
}

/// Strip the trailing separator from a line.
pub(crate) fn trim_crlf(line: &[u8]) -> &[u8] {
    line.strip_suffix(CRLF).unwrap_or(line)
}

/// Split a field line on the first `": "`.
pub(crate) fn split_field(line: &[u8]) -> Option<(&[u8], &[u8])> {
    let pos = line.windows(FIELD_SEP.len()).position(|w| w == FIELD_SEP)?;
    Some((&line[..pos], &line[pos + FIELD_SEP.len()..]))
}

/// Unwrap `<urn:uuid:ID>` to `ID`.
///
/// Values in other URI schemes only lose their angle brackets.
pub fn unwrap_record_id(value: &str) -> &str {
    let value = value.trim();
    let value = value.strip_prefix('<').unwrap_or(value);
    let value = value.strip_suffix('>').unwrap_or(value);
    value.strip_prefix("urn:uuid:").unwrap_or(value)
}

/// Parse the lines of a WARC header block.
///
/// The first line must be the record begin line (`WARC/1.0`). All further
/// lines are `Name: value` pairs. Lines without a `": "` separator are
/// skipped with a warning.
///
/// # Arguments
///
/// * `lines` - Header lines, each optionally ending in `CRLF`
pub fn parse_warc_header<L: AsRef<[u8]>>(lines: &[L]) -> WarcHeader {
    let mut fields = Fields::new();

    let version = lines
        .first()
        .map(|l| {
            let l = trim_crlf(l.as_ref());
            let v = l.strip_prefix(b"WARC/").unwrap_or(l);
            String::from_utf8_lossy(v).trim().to_string()
        })
        .unwrap_or_default();
    fields.insert(VERSION_KEY, FieldValue::Text(version));

    for line in lines.iter().skip(1) {
        let line = trim_crlf(line.as_ref());
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = split_field(line) else {
            tracing::warn!(line = %String::from_utf8_lossy(line), "skipping malformed WARC header line");
            continue;
        };
        let key = String::from_utf8_lossy(key).trim().to_string();
        let value = String::from_utf8_lossy(value).trim().to_string();

        match key.as_str() {
            "WARC-Record-ID" | "WARC-Concurrent-To" => {
                let id = unwrap_record_id(&value).to_string();
                fields.append(key, id);
            }
            "Content-Length" => match value.parse::<u64>() {
                Ok(n) => fields.insert(key, FieldValue::Integer(n)),
                Err(_) => tracing::warn!(value = %value, "ignoring invalid Content-Length"),
            },
            _ => fields.append(key, value),
        }
    }

    WarcHeader { fields }
}
