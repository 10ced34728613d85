//! Header-to-field column mapping.

use std::collections::{BTreeMap, HashMap};

use infdb_core::Field;
use serde::{Deserialize, Serialize};

use crate::dictionary::Dictionary;
use crate::row::fuzzy_key;

/// Which source header feeds each canonical field. Serializes as a map keyed
/// by the camelCase field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    columns: BTreeMap<Field, String>,
}

impl ColumnMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mapping from caller-supplied `field -> header` pairs.
    ///
    /// Keys that name no field are returned alongside so the caller can log
    /// them; entries with an empty header are ignored.
    #[must_use]
    pub fn from_caller(raw: HashMap<String, String>) -> (Self, Vec<String>) {
        let mut mapping = Self::new();
        let mut unknown = Vec::new();
        for (key, header) in raw {
            if header.is_empty() {
                continue;
            }
            match key.parse::<Field>() {
                Ok(field) => {
                    mapping.columns.insert(field, header);
                }
                Err(_) => unknown.push(key),
            }
        }
        unknown.sort();
        (mapping, unknown)
    }

    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.columns.get(&field).map(String::as_str)
    }

    pub fn insert(&mut self, field: Field, header: impl Into<String>) {
        self.columns.insert(field, header.into());
    }

    /// Caller entries replace automatic ones field by field.
    #[must_use]
    pub fn override_with(mut self, caller: ColumnMapping) -> Self {
        self.columns.extend(caller.columns);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.columns.iter().map(|(f, h)| (*f, h.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Headers from `headers` that no field is mapped to, in file order.
    #[must_use]
    pub fn unmapped<'h>(&self, headers: &'h [String]) -> Vec<&'h str> {
        headers
            .iter()
            .filter(|h| !self.columns.values().any(|mapped| mapped == *h))
            .map(String::as_str)
            .collect()
    }
}

fn without_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Finds the field `header` denotes: an exact dictionary key, then a key
/// equal once whitespace is removed, then a key equal ignoring case as well.
fn match_header(dict: &Dictionary, header: &str) -> Option<Field> {
    let entries = dict.headers();

    if let Some(&(_, field)) = entries.iter().find(|(key, _)| *key == header) {
        return Some(field);
    }

    let compact = without_whitespace(header);
    if let Some(&(_, field)) = entries
        .iter()
        .find(|(key, _)| without_whitespace(key) == compact)
    {
        return Some(field);
    }

    let folded = fuzzy_key(header);
    entries
        .iter()
        .find(|(key, _)| fuzzy_key(key) == folded)
        .map(|&(_, field)| field)
}

/// Parses a caller mapping sent as a JSON object of field name to header.
/// Null headers are dropped.
///
/// # Errors
///
/// Returns an error if `text` is not a JSON object of strings or nulls.
pub fn parse_caller_mapping(text: &str) -> Result<HashMap<String, String>, serde_json::Error> {
    let raw: HashMap<String, Option<String>> = serde_json::from_str(text)?;
    Ok(raw
        .into_iter()
        .filter_map(|(field, header)| header.map(|h| (field, h)))
        .collect())
}

/// Automatic mapping for `headers`, with the caller's entries taking
/// precedence field by field. Caller keys naming no field are logged and
/// skipped.
#[must_use]
pub fn resolve_mapping(
    dict: &Dictionary,
    headers: &[String],
    caller: Option<HashMap<String, String>>,
) -> ColumnMapping {
    let automatic = auto_map_columns(dict, headers);
    let Some(raw) = caller else {
        return automatic;
    };
    let (caller, unknown) = ColumnMapping::from_caller(raw);
    if !unknown.is_empty() {
        tracing::warn!(?unknown, "ignoring unknown fields in column mapping");
    }
    automatic.override_with(caller)
}

/// Proposes a column mapping for the given headers.
///
/// Each field takes the first header (in file order) that resolves to it;
/// the stored value is the header exactly as it appears in the file.
#[must_use]
pub fn auto_map_columns(dict: &Dictionary, headers: &[String]) -> ColumnMapping {
    let mut mapping = ColumnMapping::new();
    for header in headers {
        if let Some(field) = match_header(dict, header) {
            mapping
                .columns
                .entry(field)
                .or_insert_with(|| header.clone());
        }
    }
    mapping
}
