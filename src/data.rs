// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Table content: rows of cell text keyed by column.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{Deserialize, Deserializer};
use serde_json::Value;

/// Identifies a column, either by position or by name.
///
/// Keys that look like non-negative integers are always index keys, so `"2"` and `2` address
/// the same column.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnKey {
    /// A zero-based column index.
    Index(usize),
    /// A column name.
    Name(String),
}

impl ColumnKey {
    /// Parses a key, preferring the index form.
    pub fn parse(s: &str) -> ColumnKey {
        match s.parse::<usize>() {
            Ok(i) => ColumnKey::Index(i),
            Err(_) => ColumnKey::Name(s.to_owned()),
        }
    }
}

impl From<usize> for ColumnKey {
    fn from(i: usize) -> ColumnKey {
        ColumnKey::Index(i)
    }
}

impl From<&str> for ColumnKey {
    fn from(s: &str) -> ColumnKey {
        ColumnKey::parse(s)
    }
}

impl From<String> for ColumnKey {
    fn from(s: String) -> ColumnKey {
        ColumnKey::parse(&s)
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKey::Index(i) => write!(f, "{}", i),
            ColumnKey::Name(name) => f.write_str(name),
        }
    }
}

impl<'de> Deserialize<'de> for ColumnKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ColumnKey::parse(&s))
    }
}

/// One table row: cell texts in column order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    cells: IndexMap<ColumnKey, String>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Row {
        Row::default()
    }

    /// Appends a cell to this row and returns it.
    ///
    /// Setting a key twice replaces the text but keeps the original column position.
    pub fn cell(mut self, key: impl Into<ColumnKey>, text: impl Into<String>) -> Row {
        self.cells.insert(key.into(), text.into());
        self
    }

    /// Returns the number of cells in this row.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if this row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the text of the given column, if the row has it.
    pub fn get(&self, key: &ColumnKey) -> Option<&str> {
        self.cells.get(key).map(String::as_str)
    }

    /// Iterates over the cells in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&ColumnKey, &str)> {
        self.cells.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Builds a row from a JSON array (index keys) or object (name keys).
    ///
    /// Returns `None` for any other JSON value.  Scalars are stringified, `null` becomes empty
    /// text and nested arrays or objects are skipped.
    pub fn from_value(value: &Value) -> Option<Row> {
        let entries: Vec<(ColumnKey, &Value)> = match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (ColumnKey::Index(i), v))
                .collect(),
            Value::Object(map) => map.iter().map(|(k, v)| (ColumnKey::parse(k), v)).collect(),
            _ => return None,
        };

        let mut row = Row::new();
        for (key, value) in entries {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    tracing::warn!(column = %key, "skipping cell that is not a text value");
                    continue;
                }
            };
            row.cells.insert(key, text);
        }
        Some(row)
    }
}

impl<K: Into<ColumnKey>, S: Into<String>> FromIterator<(K, S)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, S)>>(iter: I) -> Row {
        Row {
            cells: iter
                .into_iter()
                .map(|(k, s)| (k.into(), s.into()))
                .collect(),
        }
    }
}

/// The rows of a table.
///
/// A slot may be empty when the source row was not a cell mapping; such rows are skipped when
/// drawing but still count for row indices, so row-level options stay aligned.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableData {
    rows: Vec<Option<Row>>,
}

impl TableData {
    /// Creates an empty table.
    pub fn new() -> TableData {
        TableData::default()
    }

    /// Creates a table from rows of positional cells.
    pub fn from_rows<R, S>(rows: impl IntoIterator<Item = R>) -> TableData
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TableData {
            rows: rows
                .into_iter()
                .map(|row| Some(row.into_iter().enumerate().collect()))
                .collect(),
        }
    }

    /// Appends a row.
    pub fn push(&mut self, row: Row) {
        self.rows.push(Some(row));
    }

    /// Returns the number of rows, including skipped ones.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over the row slots in order.
    pub fn rows(&self) -> impl Iterator<Item = Option<&Row>> {
        self.rows.iter().map(Option::as_ref)
    }

    /// Builds a table from a JSON array of rows.
    ///
    /// Returns `None` if the value is not an array.
    pub fn from_value(value: &Value) -> Option<TableData> {
        let rows = value
            .as_array()?
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let parsed = Row::from_value(row);
                if parsed.is_none() {
                    tracing::warn!(row = i, "skipping row that is not a cell mapping");
                }
                parsed
            })
            .collect();
        Some(TableData { rows })
    }
}

impl FromIterator<Row> for TableData {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> TableData {
        TableData {
            rows: iter.into_iter().map(Some).collect(),
        }
    }
}

impl<'de> Deserialize<'de> for TableData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        TableData::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom("table data must be an array of rows"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_key_parse() {
        assert_eq!(ColumnKey::parse("3"), ColumnKey::Index(3));
        assert_eq!(ColumnKey::parse("qty"), ColumnKey::Name("qty".into()));
        assert_eq!(ColumnKey::parse("-1"), ColumnKey::Name("-1".into()));
        assert_eq!(ColumnKey::from(2usize).to_string(), "2");
    }

    #[test]
    fn test_row_from_object_keeps_order_and_stringifies() {
        let row = Row::from_value(&json!({"name": "Paper", "qty": 5, "ok": true, "note": null}))
            .expect("row");
        let keys: Vec<String> = row.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["name", "qty", "ok", "note"]);
        assert_eq!(row.get(&"qty".into()), Some("5"));
        assert_eq!(row.get(&"ok".into()), Some("true"));
        assert_eq!(row.get(&"note".into()), Some(""));
    }

    #[test]
    fn test_row_skips_nested_cells() {
        let row = Row::from_value(&json!(["a", ["nested"], "c"])).expect("row");
        assert_eq!(row.len(), 2);
        assert_eq!(row.get(&ColumnKey::Index(2)), Some("c"));
        assert_eq!(row.get(&ColumnKey::Index(1)), None);
    }

    #[test]
    fn test_table_keeps_slots_for_invalid_rows() {
        let data: TableData =
            serde_json::from_value(json!([["a"], "not a row", {"x": "y"}])).expect("data");
        assert_eq!(data.len(), 3);
        let slots: Vec<bool> = data.rows().map(|r| r.is_some()).collect();
        assert_eq!(slots, vec![true, false, true]);
        assert!(serde_json::from_value::<TableData>(json!({"a": 1})).is_err());
    }

    #[test]
    fn test_from_rows_uses_index_keys() {
        let data = TableData::from_rows(vec![vec!["a", "b"]]);
        let row = data.rows().next().flatten().expect("row");
        assert_eq!(row.get(&ColumnKey::Index(1)), Some("b"));
    }
}
