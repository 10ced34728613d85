//! One parsed spreadsheet row and the lookup rules for reading fields from it.

use infdb_core::Field;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// An ordered mapping from header to cell value, as produced by the file
/// reader. `None` means the cell was missing entirely (a short CSV line).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, Option<String>)>,
}

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, header: impl Into<String>, value: Option<String>) {
        self.cells.push((header.into(), value));
    }

    /// Raw value stored under exactly `header`; the first cell wins when a
    /// header repeats.
    #[must_use]
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.cells.iter().map(|(h, v)| (h.as_str(), v.as_deref()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when every cell is missing or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.cells
            .iter()
            .all(|(_, v)| v.as_deref().is_none_or(|s| s.trim().is_empty()))
    }
}

impl<H: Into<String>, V: Into<String>> FromIterator<(H, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (H, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (h, v) in iter {
            row.push(h, Some(v.into()));
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (header, value) in &self.cells {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}

/// Normal form for fuzzy header comparison: trimmed, whitespace removed,
/// lower-cased.
pub(crate) fn fuzzy_key(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Resolves the value of `field` in `row`.
///
/// 1. the cell under `mapped` (the header the column mapping chose);
/// 2. the cell under each of `alternatives`, in order;
/// 3. any cell whose header fuzzily equals the field name or one of the
///    alternatives.
///
/// Returns the first trimmed, non-empty value found.
#[must_use]
pub fn extract_field<'r>(
    row: &'r Row,
    field: Field,
    mapped: Option<&str>,
    alternatives: &[&str],
) -> Option<&'r str> {
    if let Some(value) = mapped.and_then(|header| non_empty(row.get(header))) {
        return Some(value);
    }

    if let Some(value) = alternatives
        .iter()
        .find_map(|header| non_empty(row.get(header)))
    {
        return Some(value);
    }

    let mut targets = Vec::with_capacity(alternatives.len() + 1);
    targets.push(fuzzy_key(field.as_str()));
    targets.extend(alternatives.iter().map(|a| fuzzy_key(a)));

    row.iter()
        .filter(|(header, _)| targets.contains(&fuzzy_key(header)))
        .find_map(|(_, value)| non_empty(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapped_header_wins() {
        let row: Row = [("Full Name", "Jane"), ("name", "Other")].into_iter().collect();
        assert_eq!(
            extract_field(&row, Field::Name, Some("Full Name"), &["name"]),
            Some("Jane")
        );
    }

    #[test]
    fn blank_mapped_value_falls_through_to_alternatives() {
        let row: Row = [("Full Name", "   "), ("이름", "제인")].into_iter().collect();
        assert_eq!(
            extract_field(&row, Field::Name, Some("Full Name"), &["이름"]),
            Some("제인")
        );
    }

    #[test]
    fn alternatives_are_tried_in_listed_order() {
        let row: Row = [("name", "second"), ("이름", "first")].into_iter().collect();
        assert_eq!(
            extract_field(&row, Field::Name, None, &["이름", "name"]),
            Some("first")
        );
    }

    #[test]
    fn fuzzy_scan_matches_spacing_and_case_variants() {
        let row: Row = [(" Avg  LIKES ", "40")].into_iter().collect();
        assert_eq!(
            extract_field(&row, Field::AvgLikes, None, &["Avg Likes"]),
            Some("40")
        );

        let row: Row = [("AVGLIKES", "41")].into_iter().collect();
        assert_eq!(extract_field(&row, Field::AvgLikes, None, &[]), Some("41"));
    }

    #[test]
    fn values_are_trimmed() {
        let row: Row = [("name", "  Jane Doe ")].into_iter().collect();
        assert_eq!(extract_field(&row, Field::Name, None, &[]), Some("Jane Doe"));
    }

    #[test]
    fn absent_field_is_none() {
        let row: Row = [("unrelated", "x")].into_iter().collect();
        assert_eq!(extract_field(&row, Field::Handle, None, &["핸들"]), None);
    }

    #[test]
    fn missing_cells_count_as_absent() {
        let mut row = Row::new();
        row.push("name", None);
        assert_eq!(extract_field(&row, Field::Name, Some("name"), &[]), None);
        assert!(row.is_blank());
    }

    #[test]
    fn serializes_in_header_order() {
        let mut row: Row = [("b", "2"), ("a", "1")].into_iter().collect();
        row.push("c", None);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"b":"2","a":"1","c":null}"#);
    }

    #[test]
    fn fuzzy_key_strips_all_whitespace() {
        assert_eq!(fuzzy_key(" 프로필 URL "), "프로필url");
    }
}
