// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Layered table options.
//!
//! A table is configured with a [`CellOptions`][] value for the whole table and optional
//! overrides per column, per row and per cell.  The options that apply to a single cell are
//! obtained by merging these four layers, later layers winning key by key:
//!
//! ```text
//! table  <  col[column]  <  row[row]  <  cell[row][column]
//! ```
//!
//! Option values of the wrong type are dropped while deserializing (with a warning), so a
//! malformed option behaves exactly like an absent one.
//!
//! [`CellOptions`]: struct.CellOptions.html

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::de::{self, Deserialize, DeserializeOwned, Deserializer};
use serde_json::Value;

use crate::data::ColumnKey;
use crate::style::{Alignment, Border, Color, FontSpec, FontStyle, LineStyle, Padding};
use crate::Mm;

/// The drawing primitive used for a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellKind {
    /// A wrapping multi-line cell.
    #[default]
    MultiCell,
    /// A fixed-size single-line cell.
    Cell,
}

impl<'de> Deserialize<'de> for CellKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.to_ascii_lowercase().as_str() {
            "multicell" => Ok(CellKind::MultiCell),
            "cell" => Ok(CellKind::Cell),
            _ => Err(de::Error::custom(format!("unknown cell type: {}", s))),
        }
    }
}

/// Deserializes an optional value, turning a value of the wrong shape into `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match T::deserialize(&value) {
        Ok(v) => Ok(Some(v)),
        Err(err) => {
            tracing::warn!(%value, %err, "ignoring invalid table option");
            Ok(None)
        }
    }
}

macro_rules! cell_options {
    ($( $(#[$meta:meta])* $field:ident: $ty:ty, )*) => {
        /// A partial set of cell options.
        ///
        /// Every field is optional; an unset field falls back to the next lower layer when
        /// merged.
        #[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
        #[serde(default)]
        pub struct CellOptions {
            $(
                $(#[$meta])*
                #[serde(deserialize_with = "lenient")]
                pub $field: Option<$ty>,
            )*
        }

        impl CellOptions {
            /// Returns these options overridden key by key by the set fields of `over`.
            pub fn merge(&self, over: &CellOptions) -> CellOptions {
                CellOptions {
                    $( $field: over.$field.clone().or_else(|| self.$field.clone()), )*
                }
            }
        }
    };
}

cell_options! {
    /// The drawing primitive (`"multicell"` or `"cell"`).
    #[serde(rename = "type")]
    kind: CellKind,
    /// The left edge of the table; only read from the table level.
    x_pos: Mm,
    /// The top edge of the table; only read from the table level.
    y_pos: Mm,
    /// The cell border.
    border: Border,
    /// The text alignment.
    align: Alignment,
    /// The cell width; `0` extends the cell to the right margin.
    width: Mm,
    /// The minimum cell height; `0` sizes the cell to its text.
    height: Mm,
    /// The text color.
    text_color: Color,
    /// The fill color; cells without one are transparent.
    fill_color: Color,
    /// The font size in points.
    font_size: f32,
    /// The font family, with optional style and size.
    font: FontSpec,
    /// The font style used when `font` does not carry one.
    font_style: FontStyle,
    /// The line style of the border.
    line_style: LineStyle,
    /// The cell padding.
    padding: Padding,
    /// Whether the cell text is HTML.
    is_html: bool,
}

impl CellOptions {
    /// Creates an empty option set.
    pub fn new() -> CellOptions {
        CellOptions::default()
    }

    /// Parses an option object.  Anything but a JSON object yields `None`.
    pub fn from_value(value: &Value) -> Option<CellOptions> {
        if !value.is_object() {
            return None;
        }
        CellOptions::deserialize(value).ok()
    }
}

/// Options for a whole table: the table-level settings and their overrides.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableOptions {
    /// Table-level settings, the fallback for every cell.
    pub table: CellOptions,
    /// Overrides per column.
    pub col: IndexMap<ColumnKey, CellOptions>,
    /// Overrides per row index.
    pub row: HashMap<usize, CellOptions>,
    /// Overrides per row index and column.
    pub cell: HashMap<usize, HashMap<ColumnKey, CellOptions>>,
}

impl TableOptions {
    /// Creates options with the given table-level settings and no overrides.
    pub fn new(table: CellOptions) -> TableOptions {
        TableOptions {
            table,
            ..TableOptions::default()
        }
    }

    /// Adds an override for a column and returns the options.
    pub fn with_column(mut self, key: impl Into<ColumnKey>, options: CellOptions) -> TableOptions {
        self.col.insert(key.into(), options);
        self
    }

    /// Adds an override for a row and returns the options.
    pub fn with_row(mut self, row: usize, options: CellOptions) -> TableOptions {
        self.row.insert(row, options);
        self
    }

    /// Adds an override for a single cell and returns the options.
    pub fn with_cell(
        mut self,
        row: usize,
        key: impl Into<ColumnKey>,
        options: CellOptions,
    ) -> TableOptions {
        self.cell.entry(row).or_default().insert(key.into(), options);
        self
    }

    /// Returns the effective options of one cell.
    ///
    /// `table` is the table-level layer to start from; it is passed in because the drawing
    /// code resolves defaults and per-row heights into it before asking for cell options.
    pub fn cell_options(&self, table: &CellOptions, row: usize, col: &ColumnKey) -> CellOptions {
        let mut merged = table.clone();
        if let Some(over) = self.col.get(col) {
            merged = merged.merge(over);
        }
        if let Some(over) = self.row.get(&row) {
            merged = merged.merge(over);
        }
        if let Some(over) = self.cell.get(&row).and_then(|cells| cells.get(col)) {
            merged = merged.merge(over);
        }
        merged
    }

    /// Parses table options from a JSON object.
    ///
    /// The `col`, `row` and `cell` keys hold the overrides, all other keys are table-level
    /// settings.  Overrides that are not objects, and row keys that are not indices, are
    /// skipped.
    pub fn from_value(value: &Value) -> TableOptions {
        let Some(map) = value.as_object() else {
            if !value.is_null() {
                tracing::warn!(%value, "table options must be an object, using defaults");
            }
            return TableOptions::default();
        };

        let mut table_map = map.clone();
        let col = table_map.remove("col");
        let row = table_map.remove("row");
        let cell = table_map.remove("cell");

        let table = CellOptions::from_value(&Value::Object(table_map)).unwrap_or_default();
        let mut options = TableOptions::new(table);

        for (key, value) in entries(col.as_ref(), "col") {
            if let Some(over) = override_options(value, "col", &key) {
                options.col.insert(ColumnKey::parse(&key), over);
            }
        }
        for (key, value) in entries(row.as_ref(), "row") {
            let (Some(index), Some(over)) =
                (row_index(&key, "row"), override_options(value, "row", &key))
            else {
                continue;
            };
            options.row.insert(index, over);
        }
        for (key, value) in entries(cell.as_ref(), "cell") {
            let Some(index) = row_index(&key, "cell") else {
                continue;
            };
            for (col_key, value) in entries(Some(value), "cell") {
                if let Some(over) = override_options(value, "cell", &col_key) {
                    options
                        .cell
                        .entry(index)
                        .or_default()
                        .insert(ColumnKey::parse(&col_key), over);
                }
            }
        }
        options
    }
}

impl<'de> Deserialize<'de> for TableOptions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(TableOptions::from_value(&value))
    }
}

/// Iterates over the entries of an override map; arrays are treated as maps keyed by position.
fn entries<'a>(value: Option<&'a Value>, layer: &str) -> Vec<(String, &'a Value)> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        Some(other) => {
            tracing::warn!(layer, value = %other, "ignoring override map that is not an object");
            Vec::new()
        }
    }
}

fn row_index(key: &str, layer: &str) -> Option<usize> {
    let index = key.parse::<usize>().ok();
    if index.is_none() {
        tracing::warn!(layer, key, "ignoring override for a row key that is not an index");
    }
    index
}

fn override_options(value: &Value, layer: &str, key: &str) -> Option<CellOptions> {
    if value.is_null() {
        return None;
    }
    let options = CellOptions::from_value(value);
    if options.is_none() {
        tracing::warn!(layer, key, "ignoring override that is not an object");
    }
    options
}
