// Copyright (c) 2025 Ismael Theiskaa
// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Option-driven table drawing for PDF surfaces.
//!
//! This crate adds a `draw_table` convenience method to any rendering surface that implements
//! the [`Surface`][] trait.  The table is described by rows of cell text ([`TableData`][]) and
//! by layered options ([`TableOptions`][]): table-wide settings can be overridden per column,
//! per row and per cell.
//!
//! Every row is drawn twice: once on a disposable duplicate of the surface to measure the
//! tallest cell, and once on the real surface with every cell stretched to that height.  Rows
//! whose cells overflow onto later pages are reconciled so that the next row starts at a
//! sensible position.
//!
//! [`PdfSurface`][] is a ready-to-use surface backed by [`printpdf`][].
//!
//! # Example
//!
//! ```
//! use genpdfi_tables::render::PdfSurface;
//! use genpdfi_tables::{DrawTable, Mm, TableData, TableOptions};
//!
//! let mut surface = PdfSurface::a4("invoice");
//! let data = TableData::from_rows(vec![
//!     vec!["Item", "Qty"],
//!     vec!["Paper", "500"],
//! ]);
//! let mut options = TableOptions::default();
//! options.table.width = Some(Mm(40.0));
//! surface.draw_table(&data, &options).expect("draw table");
//! assert_eq!(surface.drawn_cells().len(), 4);
//! ```
//!
//! [`Surface`]: surface/trait.Surface.html
//! [`TableData`]: data/struct.TableData.html
//! [`TableOptions`]: options/struct.TableOptions.html
//! [`PdfSurface`]: render/struct.PdfSurface.html
//! [`printpdf`]: https://docs.rs/printpdf/latest/printpdf

#![warn(missing_docs, rust_2018_idioms)]

pub mod config;
pub mod data;
pub mod error;
pub mod fonts;
pub mod options;
pub mod render;
pub mod style;
pub mod surface;
pub mod table;
pub mod wrap;

use std::ops;

use serde::{Deserialize, Deserializer};

pub use data::{ColumnKey, Row, TableData};
pub use error::{Context, Error, ErrorKind};
pub use options::{CellKind, CellOptions, TableOptions};
pub use surface::Surface;
pub use table::DrawTable;

/// Millimetres per PDF point.
const MM_PER_PT: f32 = 25.4 / 72.0;

/// A length measured in millimeters.
///
/// All coordinates and dimensions handled by this crate use millimeters; font sizes are the
/// exception and are given in points.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    PartialOrd,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::Sub,
    derive_more::SubAssign,
    derive_more::Mul,
    derive_more::MulAssign,
    derive_more::Div,
    derive_more::DivAssign,
    derive_more::Sum,
    derive_more::From,
    derive_more::Into,
)]
pub struct Mm(pub f32);

impl Mm {
    /// Converts a length in points to millimeters.
    pub fn from_pt(pt: f32) -> Mm {
        Mm(pt * MM_PER_PT)
    }

    /// Returns this length in points.
    pub fn to_pt(self) -> f32 {
        self.0 / MM_PER_PT
    }

    /// Returns the larger of the two lengths.
    pub fn max(self, other: Mm) -> Mm {
        Mm(self.0.max(other.0))
    }
}

impl From<f64> for Mm {
    fn from(mm: f64) -> Mm {
        Mm(mm as f32)
    }
}

impl From<i16> for Mm {
    fn from(mm: i16) -> Mm {
        Mm(mm.into())
    }
}

impl From<i32> for Mm {
    fn from(mm: i32) -> Mm {
        Mm(mm as f32)
    }
}

impl<'de> Deserialize<'de> for Mm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Mm, D::Error> {
        f32::deserialize(deserializer).map(Mm)
    }
}

impl From<printpdf::Pt> for Mm {
    fn from(pt: printpdf::Pt) -> Mm {
        Mm::from_pt(pt.0)
    }
}

impl From<Mm> for printpdf::Mm {
    fn from(mm: Mm) -> printpdf::Mm {
        printpdf::Mm(mm.0)
    }
}

impl From<Mm> for printpdf::Pt {
    fn from(mm: Mm) -> printpdf::Pt {
        printpdf::Pt(mm.to_pt())
    }
}

/// A position on a page, relative to its upper left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    /// The horizontal offset.
    pub x: Mm,
    /// The vertical offset, growing downwards.
    pub y: Mm,
}

impl Position {
    /// Creates a new position from the given coordinates.
    pub fn new(x: impl Into<Mm>, y: impl Into<Mm>) -> Position {
        Position {
            x: x.into(),
            y: y.into(),
        }
    }
}

impl ops::Add for Position {
    type Output = Position;

    fn add(self, other: Position) -> Position {
        Position::new(self.x + other.x, self.y + other.y)
    }
}

/// The size of a page or of a rectangular area.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    /// The width.
    pub width: Mm,
    /// The height.
    pub height: Mm,
}

impl Size {
    /// Creates a new size from the given dimensions.
    pub fn new(width: impl Into<Mm>, height: impl Into<Mm>) -> Size {
        Size {
            width: width.into(),
            height: height.into(),
        }
    }

    /// The ISO A4 portrait page size.
    pub fn a4() -> Size {
        Size::new(210.0, 297.0)
    }
}

/// Margins of a page.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Margins {
    /// The top margin.
    pub top: Mm,
    /// The right margin.
    pub right: Mm,
    /// The bottom margin.
    pub bottom: Mm,
    /// The left margin.
    pub left: Mm,
}

impl Margins {
    /// Creates margins from the given values, in CSS order.
    pub fn trbl(
        top: impl Into<Mm>,
        right: impl Into<Mm>,
        bottom: impl Into<Mm>,
        left: impl Into<Mm>,
    ) -> Margins {
        Margins {
            top: top.into(),
            right: right.into(),
            bottom: bottom.into(),
            left: left.into(),
        }
    }

    /// Creates margins with the same value on all sides.
    pub fn all(value: impl Into<Mm>) -> Margins {
        let value = value.into();
        Margins::trbl(value, value, value, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn test_mm_pt_conversion() {
        let mm = Mm::from_pt(72.0);
        assert!(approx_eq!(f32, mm.0, 25.4, epsilon = 1e-4));
        assert!(approx_eq!(f32, mm.to_pt(), 72.0, epsilon = 1e-3));
    }

    #[test]
    fn test_mm_arithmetic_and_max() {
        let a = Mm(2.0) + Mm(3.0);
        assert_eq!(a, Mm(5.0));
        assert_eq!(a * 2.0_f32, Mm(10.0));
        assert_eq!(Mm(1.0).max(Mm(4.0)), Mm(4.0));
        let total: Mm = vec![Mm(1.0), Mm(2.5)].into_iter().sum();
        assert_eq!(total, Mm(3.5));
    }

    #[test]
    fn test_margins_constructors() {
        let m = Margins::all(10.0);
        assert_eq!(m.left, Mm(10.0));
        let m = Margins::trbl(1.0, 2.0, 3.0, 4.0);
        assert_eq!((m.top, m.right, m.bottom, m.left), (Mm(1.0), Mm(2.0), Mm(3.0), Mm(4.0)));
    }
}
