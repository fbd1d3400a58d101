// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! The rendering surface a table is drawn on.
//!
//! A [`Surface`][] is anything that keeps a drawing cursor, a current page and a graphics state
//! (font, colors, cell padding, line style) and can draw single-line and wrapping cells at the
//! cursor.  The table engine only talks to this trait, so it works the same on a real PDF
//! document and on a measuring copy of one.
//!
//! The plain, clonable part of that state lives in [`SurfaceState`][]; implementors expose it
//! through [`Surface::state`][] and get most accessors for free.
//!
//! [`Surface`]: trait.Surface.html
//! [`SurfaceState`]: struct.SurfaceState.html
//! [`Surface::state`]: trait.Surface.html#tymethod.state

use crate::error::{Error, ErrorKind};
use crate::style::{Alignment, Border, Color, FontStyle, LineStyle, Padding};
use crate::Mm;

/// The font currently selected on a surface.
#[derive(Clone, Debug, PartialEq)]
pub struct FontState {
    /// The normalized family name.
    pub family: String,
    /// The style.
    pub style: FontStyle,
    /// The size in points.
    pub size: f32,
}

impl FontState {
    /// Creates a font state.
    pub fn new(family: impl Into<String>, style: FontStyle, size: f32) -> FontState {
        FontState {
            family: family.into(),
            style,
            size,
        }
    }
}

/// Where a drawing primitive leaves the cursor after drawing a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Advance {
    /// Right of the cell, on the page and at the Y position where the cell started.
    #[default]
    Right,
    /// At the left margin, below the cell.
    NextLine,
    /// Below the cell, with X at the cell's right edge.
    Below,
}

/// Parameters of the fixed-size single-line cell primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct CellParams<'a> {
    /// The width; `0` extends the cell to the right margin.
    pub width: Mm,
    /// The minimum height.
    pub height: Mm,
    /// The text, printed on one line.
    pub text: &'a str,
    /// The border sides to draw.
    pub border: Border,
    /// Where to leave the cursor.
    pub advance: Advance,
    /// The text alignment.
    pub align: Alignment,
    /// Whether to paint the background with the fill color.
    pub fill: bool,
}

/// Parameters of the wrapping multi-line cell primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiCellParams<'a> {
    /// The width; `0` extends the cell to the right margin.
    pub width: Mm,
    /// The minimum height; the cell grows to fit its text.
    pub height: Mm,
    /// The text; `\n` starts a new paragraph.
    pub text: &'a str,
    /// The border sides to draw.
    pub border: Border,
    /// The text alignment.
    pub align: Alignment,
    /// Whether to paint the background with the fill color.
    pub fill: bool,
    /// Where to leave the cursor.
    pub advance: Advance,
    /// Moves the cursor to this X position before drawing.
    pub x: Option<Mm>,
    /// Moves the cursor to this Y position before drawing.
    pub y: Option<Mm>,
    /// Resets the recorded last height before drawing; otherwise the last height is the larger
    /// of the previous value and this cell's height.
    pub reset_height: bool,
    /// Indentation of the first line.
    pub indent: Mm,
    /// Whether `text` is HTML that has to be flattened first.
    pub is_html: bool,
}

impl<'a> MultiCellParams<'a> {
    /// Creates parameters for a left-aligned, borderless cell at the cursor.
    pub fn new(width: Mm, height: Mm, text: &'a str) -> MultiCellParams<'a> {
        MultiCellParams {
            width,
            height,
            text,
            border: Border::NONE,
            align: Alignment::Left,
            fill: false,
            advance: Advance::NextLine,
            x: None,
            y: None,
            reset_height: true,
            indent: Mm(0.0),
            is_html: false,
        }
    }
}

/// The plain drawing state of a surface.
///
/// Copying this struct is all it takes to snapshot a surface for a trial render.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceState {
    /// Cursor X, from the left page edge.
    pub x: Mm,
    /// Cursor Y, from the top page edge.
    pub y: Mm,
    /// Zero-based index of the current page.
    pub page: usize,
    /// The selected font.
    pub font: FontState,
    /// The text color.
    pub text_color: Color,
    /// The fill color.
    pub fill_color: Color,
    /// The cell padding.
    pub padding: Padding,
    /// The border line style.
    pub line_style: LineStyle,
    /// The height of the last drawn cell.
    pub last_height: Mm,
}

impl SurfaceState {
    /// Creates a state with the cursor at the given position on the first page.
    pub fn new(x: Mm, y: Mm, font: FontState) -> SurfaceState {
        SurfaceState {
            x,
            y,
            page: 0,
            font,
            text_color: Color::BLACK,
            fill_color: Color::WHITE,
            padding: Padding::horizontal(1.0),
            line_style: LineStyle::new().with_thickness(Mm::from_pt(0.57)).with_color(Color::BLACK),
            last_height: Mm(0.0),
        }
    }
}

/// A drawing surface with a cursor, pages and a graphics state.
///
/// Required methods cover what depends on the concrete backend: the page list, the font
/// registry, the two drawing primitives and duplication.  Everything else has a default
/// implementation on top of [`SurfaceState`](struct.SurfaceState.html).
pub trait Surface {
    /// Returns the drawing state.
    fn state(&self) -> &SurfaceState;

    /// Returns the drawing state for modification.
    fn state_mut(&mut self) -> &mut SurfaceState;

    /// Returns the number of pages.
    fn page_count(&self) -> usize;

    /// Makes the given page current.  The cursor is left unchanged.
    fn set_page(&mut self, page: usize) -> Result<(), Error>;

    /// Selects a font family and style, and optionally a size in points.
    ///
    /// Fails with [`ErrorKind::InvalidFont`] if the surface does not know the font.
    ///
    /// [`ErrorKind::InvalidFont`]: ../error/enum.ErrorKind.html#variant.InvalidFont
    fn set_font(&mut self, family: &str, style: FontStyle, size: Option<f32>) -> Result<(), Error>;

    /// Draws a single-line cell at the cursor.
    fn cell(&mut self, params: &CellParams<'_>) -> Result<(), Error>;

    /// Draws a wrapping cell at the cursor and returns the number of text lines.
    ///
    /// The height of the cell is available from [`last_height`](#method.last_height)
    /// afterwards.
    fn multi_cell(&mut self, params: &MultiCellParams<'_>) -> Result<usize, Error>;

    /// Returns an independent copy of this surface for trial rendering.
    ///
    /// Nothing drawn on the copy shows up on this surface.
    fn duplicate(&self) -> Self
    where
        Self: Sized;

    /// Returns the cursor X position.
    fn x(&self) -> Mm {
        self.state().x
    }

    /// Returns the cursor Y position.
    fn y(&self) -> Mm {
        self.state().y
    }

    /// Sets the cursor X position.
    fn set_x(&mut self, x: Mm) {
        self.state_mut().x = x;
    }

    /// Sets the cursor Y position.
    fn set_y(&mut self, y: Mm) {
        self.state_mut().y = y;
    }

    /// Sets both cursor coordinates.
    fn set_xy(&mut self, x: Mm, y: Mm) {
        let state = self.state_mut();
        state.x = x;
        state.y = y;
    }

    /// Returns the zero-based index of the current page.
    fn page(&self) -> usize {
        self.state().page
    }

    /// Returns the selected font.
    fn font(&self) -> &FontState {
        &self.state().font
    }

    /// Sets the font size in points; it must be a positive number.
    fn set_font_size(&mut self, size: f32) -> Result<(), Error> {
        if !(size.is_finite() && size > 0.0) {
            return Err(Error::new(
                format!("Invalid font size: {}", size),
                ErrorKind::InvalidData,
            ));
        }
        self.state_mut().font.size = size;
        Ok(())
    }

    /// Returns the text color.
    fn text_color(&self) -> Color {
        self.state().text_color
    }

    /// Sets the text color.
    fn set_text_color(&mut self, color: Color) {
        self.state_mut().text_color = color;
    }

    /// Sets the fill color used by cells drawn with `fill`.
    fn set_fill_color(&mut self, color: Color) {
        self.state_mut().fill_color = color;
    }

    /// Returns the cell padding.
    fn cell_padding(&self) -> Padding {
        self.state().padding
    }

    /// Sets the cell padding.
    fn set_cell_padding(&mut self, padding: Padding) {
        self.state_mut().padding = padding;
    }

    /// Updates the border line style; unset attributes are kept.
    fn set_line_style(&mut self, style: LineStyle) {
        let state = self.state_mut();
        state.line_style = style.or(state.line_style);
    }

    /// Returns the height of the last drawn cell.
    fn last_height(&self) -> Mm {
        self.state().last_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare {
        state: SurfaceState,
    }

    impl Surface for Bare {
        fn state(&self) -> &SurfaceState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut SurfaceState {
            &mut self.state
        }

        fn page_count(&self) -> usize {
            1
        }

        fn set_page(&mut self, page: usize) -> Result<(), Error> {
            if page == 0 {
                Ok(())
            } else {
                Err(Error::new("no such page", ErrorKind::PageOutOfRange(page)))
            }
        }

        fn set_font(&mut self, family: &str, style: FontStyle, size: Option<f32>) -> Result<(), Error> {
            self.state.font.family = family.to_owned();
            self.state.font.style = style;
            if let Some(size) = size {
                self.set_font_size(size)?;
            }
            Ok(())
        }

        fn cell(&mut self, params: &CellParams<'_>) -> Result<(), Error> {
            self.state.last_height = params.height;
            Ok(())
        }

        fn multi_cell(&mut self, params: &MultiCellParams<'_>) -> Result<usize, Error> {
            self.state.last_height = params.height;
            Ok(1)
        }

        fn duplicate(&self) -> Self {
            Bare {
                state: self.state.clone(),
            }
        }
    }

    fn bare() -> Bare {
        Bare {
            state: SurfaceState::new(Mm(10.0), Mm(10.0), FontState::new("helvetica", FontStyle::REGULAR, 10.0)),
        }
    }

    #[test]
    fn test_default_accessors() {
        let mut s = bare();
        s.set_xy(Mm(5.0), Mm(6.0));
        assert_eq!((s.x(), s.y()), (Mm(5.0), Mm(6.0)));
        s.set_text_color(Color::Rgb(1, 2, 3));
        assert_eq!(s.text_color(), Color::Rgb(1, 2, 3));
        s.set_cell_padding(Padding::all(2.0));
        assert_eq!(s.cell_padding(), Padding::all(2.0));
    }

    #[test]
    fn test_set_font_size_rejects_invalid_values() {
        let mut s = bare();
        assert!(s.set_font_size(-3.0).is_err());
        assert!(s.set_font_size(f32::NAN).is_err());
        assert_eq!(s.font().size, 10.0);
        s.set_font_size(12.0).expect("valid size");
        assert_eq!(s.font().size, 12.0);
    }

    #[test]
    fn test_line_style_keeps_unset_attributes() {
        let mut s = bare();
        s.set_line_style(LineStyle::new().with_color(Color::Rgb(9, 9, 9)));
        let style = s.state().line_style;
        assert_eq!(style.color, Some(Color::Rgb(9, 9, 9)));
        assert_eq!(style.thickness, Some(Mm::from_pt(0.57)));
    }

    #[test]
    fn test_duplicate_is_independent() {
        let mut s = bare();
        let mut copy = s.duplicate();
        copy.set_y(Mm(99.0));
        copy.set_text_color(Color::WHITE);
        assert_eq!(s.y(), Mm(10.0));
        assert_eq!(s.text_color(), Color::BLACK);
        s.set_x(Mm(1.0));
        assert_eq!(copy.x(), Mm(10.0));
    }
}
