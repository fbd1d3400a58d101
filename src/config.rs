// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Table jobs: a page setup, table options and table data in one JSON document.
//!
//! ```json
//! {
//!   "title": "Inventory",
//!   "page": { "width": 210, "height": 297, "margins": [10, 10, 10, 10], "font_size": 9 },
//!   "options": { "width": 40, "border": 1, "col": { "0": { "width": 60 } } },
//!   "data": [["Item", "Qty"], ["Paper", 500]]
//! }
//! ```
//!
//! Every key is optional.  Margins are given in `[top, right, bottom, left]` order, as an
//! object or as a single number for all sides.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;

use crate::data::TableData;
use crate::error::{Context as _, Error, ErrorKind};
use crate::options::TableOptions;
use crate::render::PdfSurface;
use crate::style::FontStyle;
use crate::surface::Surface;
use crate::table::DrawTable;
use crate::{Margins, Mm, Size};

/// Page geometry and the default font of a job.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct PageSetup {
    /// The page width.
    pub width: Mm,
    /// The page height.
    pub height: Mm,
    /// The page margins.
    #[serde(deserialize_with = "deserialize_margins")]
    pub margins: Margins,
    /// Whether cells continue on a new page when they reach the bottom margin.
    pub auto_page_break: bool,
    /// The default font family.
    pub font: String,
    /// The default font size in points.
    pub font_size: f32,
}

impl Default for PageSetup {
    fn default() -> PageSetup {
        let size = Size::a4();
        PageSetup {
            width: size.width,
            height: size.height,
            margins: Margins::all(10.0),
            auto_page_break: true,
            font: "helvetica".to_owned(),
            font_size: 10.0,
        }
    }
}

impl PageSetup {
    /// Creates an empty document with this page setup.
    ///
    /// The default font is not selected yet, since it may be one that still has to be added
    /// with [`PdfSurface::add_font`](../render/struct.PdfSurface.html#method.add_font).
    pub fn surface(&self, title: impl AsRef<str>) -> PdfSurface {
        PdfSurface::new(Size::new(self.width, self.height), title)
            .with_margins(self.margins)
            .with_auto_page_break(self.auto_page_break)
    }
}

fn margins_from_value(value: &Value) -> Option<Margins> {
    let side = |v: &Value| v.as_f64().filter(|m| *m >= 0.0).map(|m| Mm(m as f32));
    match value {
        Value::Number(_) => side(value).map(Margins::all),
        Value::Array(items) => {
            let sides: Vec<Mm> = items.iter().map(side).collect::<Option<_>>()?;
            match sides.as_slice() {
                [all] => Some(Margins::all(*all)),
                [vertical, horizontal] => {
                    Some(Margins::trbl(*vertical, *horizontal, *vertical, *horizontal))
                }
                [top, right, bottom, left] => Some(Margins::trbl(*top, *right, *bottom, *left)),
                _ => None,
            }
        }
        Value::Object(map) => {
            let get = |key: &str| match map.get(key) {
                Some(v) => side(v),
                None => Some(Mm(10.0)),
            };
            Some(Margins::trbl(get("top")?, get("right")?, get("bottom")?, get("left")?))
        }
        _ => None,
    }
}

fn deserialize_margins<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Margins, D::Error> {
    let value = Value::deserialize(deserializer)?;
    margins_from_value(&value).ok_or_else(|| {
        de::Error::custom("margins must be a number, an array of 1, 2 or 4 numbers or an object")
    })
}

/// A font file to register before rendering, given as `FAMILY[:STYLE]=PATH`.
#[derive(Clone, Debug, PartialEq)]
pub struct FontFile {
    /// The family name to register the font under.
    pub family: String,
    /// The face, e.g. `B` for bold.
    pub style: FontStyle,
    /// The TrueType file.
    pub path: PathBuf,
}

impl FromStr for FontFile {
    type Err = Error;

    fn from_str(s: &str) -> Result<FontFile, Error> {
        let invalid = || {
            Error::new(
                format!("Invalid font argument '{}', expected FAMILY[:STYLE]=PATH", s),
                ErrorKind::InvalidData,
            )
        };
        let (name, path) = s.split_once('=').ok_or_else(invalid)?;
        let (family, style) = match name.split_once(':') {
            Some((family, style)) => (family, FontStyle::parse(style).ok_or_else(invalid)?),
            None => (name, FontStyle::REGULAR),
        };
        if family.trim().is_empty() || path.is_empty() {
            return Err(invalid());
        }
        Ok(FontFile {
            family: family.trim().to_owned(),
            style,
            path: PathBuf::from(path),
        })
    }
}

/// A complete table rendering job.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct TableJob {
    /// The document title.
    pub title: Option<String>,
    /// The page setup.
    pub page: PageSetup,
    /// The table options.
    pub options: TableOptions,
    /// The table rows.
    pub data: TableData,
}

impl TableJob {
    /// Parses a job from JSON text.
    pub fn from_json(s: &str) -> Result<TableJob, Error> {
        serde_json::from_str::<TableJob>(s).context("Failed to parse table job")
    }

    /// Reads a job from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<TableJob, Error> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file {}", path.display()))?;
        TableJob::from_json(&s)
    }

    /// Renders the table onto a new document, after registering the given fonts.
    pub fn render(&self, fonts: &[FontFile]) -> Result<PdfSurface, Error> {
        let title = self.title.as_deref().unwrap_or("Table");
        let mut surface = self.page.surface(title);
        for font in fonts {
            surface.add_font_file(&font.family, font.style, &font.path)?;
        }
        surface.set_font(&self.page.font, FontStyle::REGULAR, Some(self.page.font_size))?;
        surface.draw_table(&self.data, &self.options)?;
        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_defaults() {
        let job = TableJob::from_json("{}").expect("job");
        assert_eq!(job.page, PageSetup::default());
        assert_eq!(job.page.margins, Margins::all(10.0));
        assert!(job.data.is_empty());
    }

    #[test]
    fn test_margins_forms() {
        assert_eq!(margins_from_value(&json!(5)), Some(Margins::all(5.0)));
        assert_eq!(
            margins_from_value(&json!([1, 2, 3, 4])),
            Some(Margins::trbl(1.0, 2.0, 3.0, 4.0))
        );
        assert_eq!(
            margins_from_value(&json!([1, 2])),
            Some(Margins::trbl(1.0, 2.0, 1.0, 2.0))
        );
        assert_eq!(
            margins_from_value(&json!({"left": 20})),
            Some(Margins::trbl(10.0, 10.0, 10.0, 20.0))
        );
        assert_eq!(margins_from_value(&json!([1, 2, 3])), None);
        assert_eq!(margins_from_value(&json!("wide")), None);
    }

    #[test]
    fn test_job_parsing() {
        let job = TableJob::from_json(
            r#"{
                "page": {"width": 100, "height": 80, "margins": [5, 5, 5, 5], "font": "courier"},
                "options": {"width": 30, "col": {"0": {"width": 40}}},
                "data": [["a", "b"], {"name": "c"}]
            }"#,
        )
        .expect("job");
        assert_eq!(job.page.width, Mm(100.0));
        assert_eq!(job.page.font, "courier");
        assert_eq!(job.options.table.width, Some(Mm(30.0)));
        assert_eq!(job.data.len(), 2);
    }

    #[test]
    fn test_invalid_job() {
        let err = TableJob::from_json(r#"{"data": 3}"#).expect_err("invalid data");
        assert!(matches!(err.kind(), ErrorKind::ParseError(_)));
        let err = TableJob::from_path("/nonexistent/job.json").expect_err("missing file");
        assert!(matches!(err.kind(), ErrorKind::IoError(_)));
    }

    #[test]
    fn test_font_file_argument() {
        let font: FontFile = "DejaVu:B=fonts/DejaVuSans-Bold.ttf".parse().expect("font");
        assert_eq!(font.family, "DejaVu");
        assert!(font.style.bold);
        assert_eq!(font.path, PathBuf::from("fonts/DejaVuSans-Bold.ttf"));
        let font: FontFile = "Mono=mono.ttf".parse().expect("font");
        assert_eq!(font.style, FontStyle::REGULAR);
        assert!("nopath".parse::<FontFile>().is_err());
        assert!("Mono:X=mono.ttf".parse::<FontFile>().is_err());
    }

    #[test]
    fn test_render_job() {
        let job = TableJob::from_json(
            r#"{"page": {"font": "courier"}, "options": {"width": 30}, "data": [["a", "b"]]}"#,
        )
        .expect("job");
        let surface = job.render(&[]).expect("render");
        assert_eq!(surface.drawn_cells().len(), 2);
        assert_eq!(surface.font().family, "courier");
    }

    #[test]
    fn test_render_rejects_unknown_page_font() {
        let job = TableJob::from_json(r#"{"page": {"font": "nope"}}"#).expect("job");
        assert!(job.render(&[]).is_err());
    }
}
