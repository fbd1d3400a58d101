// Copyright (c) 2025 Ismael Theiskaa
// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! PDF rendering surface.
//!
//! [`PdfSurface`][] implements [`Surface`][] on top of [`printpdf`][].  It keeps one list of
//! drawing operations per page and turns them into a document when it is written.  Cells that
//! reach the page break trigger continue at the top margin of the following page, which is
//! created on demand.
//!
//! A surface returned by [`Surface::duplicate`][] is a *measuring copy*: it tracks the cursor,
//! the pages and the graphics state of the surface it was made from, but it has no document and
//! discards every drawing operation.
//!
//! [`printpdf`]: https://docs.rs/printpdf/latest/printpdf
//! [`PdfSurface`]: struct.PdfSurface.html
//! [`Surface`]: ../surface/trait.Surface.html
//! [`Surface::duplicate`]: ../surface/trait.Surface.html#tymethod.duplicate

use std::fs;
use std::io::{self, Write as _};
use std::path::Path;

use crate::error::{Context as _, Error, ErrorKind};
use crate::fonts::{self, EmbeddedFont, FontRegistry, IndirectFontRef, LoadedFont};
use crate::style::{Alignment, Border, Color, FontStyle, LineStyle};
use crate::surface::{Advance, CellParams, FontState, MultiCellParams, Surface, SurfaceState};
use crate::wrap::{self, Line};
use crate::{Margins, Mm, Position, Size};

/// The ratio between the line height and the font size.
pub const CELL_HEIGHT_RATIO: f32 = 1.25;

const EPSILON: f32 = 1e-4;

/// Returns the height of a text line for the given font size in points.
pub fn line_height(font_size: f32) -> Mm {
    Mm::from_pt(font_size * CELL_HEIGHT_RATIO)
}

/// A cell drawn on a [`PdfSurface`](struct.PdfSurface.html).
#[derive(Clone, Debug, PartialEq)]
pub struct DrawnCell {
    /// The page the cell starts on.
    pub page: usize,
    /// The top left corner of the cell on its first page.
    pub position: Position,
    /// The width of the cell.
    pub width: Mm,
    /// The height of the cell, summed over all pages it covers.
    pub height: Mm,
    /// The page the cell ends on.
    pub end_page: usize,
    /// The bottom edge of the cell on its last page.
    pub end_y: Mm,
    /// The text lines printed in the cell.
    pub lines: Vec<String>,
}

/// The drawing operations of one page, with the graphics state they leave behind.
struct PageData {
    size: Size,
    ops: Vec<printpdf::Op>,
    fill_color: Option<Color>,
    outline_color: Option<Color>,
    outline_thickness: Option<Mm>,
}

impl PageData {
    fn new(size: Size) -> PageData {
        PageData {
            size,
            ops: Vec::new(),
            fill_color: None,
            outline_color: None,
            outline_thickness: None,
        }
    }

    fn set_fill_color(&mut self, color: Color) {
        if self.fill_color.replace(color) != Some(color) {
            self.ops.push(printpdf::Op::SetFillColor { col: color.into() });
        }
    }

    fn set_outline_color(&mut self, color: Color) {
        if self.outline_color.replace(color) != Some(color) {
            self.ops
                .push(printpdf::Op::SetOutlineColor { col: color.into() });
        }
    }

    fn set_outline_thickness(&mut self, thickness: Mm) {
        if self.outline_thickness.replace(thickness) != Some(thickness) {
            self.ops.push(printpdf::Op::SetOutlineThickness {
                pt: printpdf::Pt::from(thickness),
            });
        }
    }
}

/// A part of a cell on a single page.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Segment {
    page: usize,
    top: Mm,
    bottom: Mm,
}

impl Segment {
    fn height(&self) -> Mm {
        self.bottom - self.top
    }
}

/// Vertical layout of a cell that may continue on the following pages.
struct Flow {
    page: usize,
    y: Mm,
    top_margin: Mm,
    limit: Option<Mm>,
    current: Segment,
    done: Vec<Segment>,
}

impl Flow {
    fn new(page: usize, y: Mm, top_margin: Mm, limit: Option<Mm>) -> Flow {
        Flow {
            page,
            y,
            top_margin,
            limit,
            current: Segment {
                page,
                top: y,
                bottom: y,
            },
            done: Vec::new(),
        }
    }

    fn is_fresh_page(&self) -> bool {
        self.y.0 <= self.top_margin.0 + EPSILON
    }

    fn break_page(&mut self) {
        self.done.push(self.current);
        self.page += 1;
        self.y = self.top_margin;
        self.current = Segment {
            page: self.page,
            top: self.y,
            bottom: self.y,
        };
    }

    fn grow(&mut self, height: Mm) {
        self.y += height;
        self.current.bottom = self.y;
    }

    /// Adds vertical space that may be split across pages.
    fn advance(&mut self, mut height: Mm) {
        while height.0 > EPSILON {
            match self.limit {
                Some(limit) if (self.y + height).0 > limit.0 + EPSILON => {
                    let room = limit - self.y;
                    if room.0 > EPSILON {
                        self.grow(room);
                        height -= room;
                        self.break_page();
                    } else if !self.is_fresh_page() {
                        self.break_page();
                    } else {
                        // Not even an empty page is tall enough.
                        self.grow(height);
                        height = Mm(0.0);
                    }
                }
                _ => {
                    self.grow(height);
                    height = Mm(0.0);
                }
            }
        }
    }

    /// Places a block that must not be split and returns its page and top edge.
    fn place(&mut self, height: Mm) -> (usize, Mm) {
        if let Some(limit) = self.limit {
            if (self.y + height).0 > limit.0 + EPSILON && !self.is_fresh_page() {
                self.break_page();
            }
        }
        let top = self.y;
        self.grow(height);
        (self.page, top)
    }

    fn finish(mut self) -> Vec<Segment> {
        self.done.push(self.current);
        self.done
    }
}

/// A rendering surface that produces a PDF document.
///
/// # Example
///
/// ```no_run
/// use genpdfi_tables::render::PdfSurface;
/// use genpdfi_tables::surface::{MultiCellParams, Surface};
/// use genpdfi_tables::Mm;
///
/// let mut surface = PdfSurface::a4("notes");
/// surface
///     .multi_cell(&MultiCellParams::new(Mm(80.0), Mm(0.0), "Hello world"))
///     .expect("draw cell");
/// surface.save("notes.pdf").expect("save document");
/// ```
pub struct PdfSurface {
    doc: Option<printpdf::PdfDocument>,
    pages: Vec<PageData>,
    page_size: Size,
    margins: Margins,
    auto_page_break: bool,
    fonts: FontRegistry,
    state: SurfaceState,
    cells: Vec<DrawnCell>,
}

impl PdfSurface {
    /// Creates a document with one page of the given size and 10 mm margins.
    ///
    /// The cursor starts at the top left corner of the printable area, the font is Helvetica
    /// at 10 points and automatic page breaks are enabled.
    pub fn new(size: impl Into<Size>, title: impl AsRef<str>) -> PdfSurface {
        let size = size.into();
        let margins = Margins::all(10.0);
        let font = FontState::new("helvetica", FontStyle::REGULAR, 10.0);
        PdfSurface {
            doc: Some(printpdf::PdfDocument::new(title.as_ref())),
            pages: vec![PageData::new(size)],
            page_size: size,
            margins,
            auto_page_break: true,
            fonts: FontRegistry::new(),
            state: SurfaceState::new(margins.left, margins.top, font),
            cells: Vec::new(),
        }
    }

    /// Creates an A4 portrait document.
    pub fn a4(title: impl AsRef<str>) -> PdfSurface {
        PdfSurface::new(Size::a4(), title)
    }

    /// Sets the page margins and moves the cursor to the top left corner of the printable area.
    pub fn with_margins(mut self, margins: impl Into<Margins>) -> PdfSurface {
        self.set_margins(margins);
        self
    }

    /// Sets the page margins and moves the cursor to the top left corner of the printable area.
    pub fn set_margins(&mut self, margins: impl Into<Margins>) {
        self.margins = margins.into();
        self.state.x = self.margins.left;
        self.state.y = self.margins.top;
    }

    /// Enables or disables automatic page breaks.
    pub fn with_auto_page_break(mut self, enabled: bool) -> PdfSurface {
        self.auto_page_break = enabled;
        self
    }

    /// Returns the page size.
    pub fn page_size(&self) -> Size {
        self.page_size
    }

    /// Returns the page margins.
    pub fn margins(&self) -> Margins {
        self.margins
    }

    /// Returns true if this is a measuring copy that does not produce output.
    pub fn is_measuring(&self) -> bool {
        self.doc.is_none()
    }

    /// Returns the cells drawn so far, in drawing order.
    pub fn drawn_cells(&self) -> &[DrawnCell] {
        &self.cells
    }

    /// Appends a page, makes it current and moves the cursor to its top left corner.
    pub fn add_page(&mut self) -> usize {
        self.pages.push(PageData::new(self.page_size));
        self.state.page = self.pages.len() - 1;
        self.state.x = self.margins.left;
        self.state.y = self.margins.top;
        self.state.page
    }

    /// Loads a TrueType font and registers it for the given family and style.
    pub fn add_font(&mut self, family: &str, style: FontStyle, data: Vec<u8>) -> Result<(), Error> {
        let doc = self.doc.as_mut().ok_or_else(|| {
            Error::new("Cannot add fonts to a measuring copy", ErrorKind::Internal)
        })?;
        let font = EmbeddedFont::new(data)?;
        let parsed = parse_pdf_font(font.data())?;
        let id = doc.add_font(&parsed);
        self.fonts.add_embedded(family, style, font, id);
        Ok(())
    }

    /// Loads a TrueType font file and registers it for the given family and style.
    pub fn add_font_file(
        &mut self,
        family: &str,
        style: FontStyle,
        path: impl AsRef<Path>,
    ) -> Result<(), Error> {
        let path = path.as_ref();
        let data = fs::read(path)
            .with_context(|| format!("Failed to read font file {}", path.display()))?;
        self.add_font(family, style, data)
    }

    /// Writes the document to a writer.
    pub fn write(self, w: impl io::Write) -> Result<(), Error> {
        let mut doc = self.doc.ok_or_else(|| {
            Error::new("Cannot write a measuring copy", ErrorKind::Internal)
        })?;
        for page in self.pages {
            doc.pages.push(printpdf::PdfPage::new(
                page.size.width.into(),
                page.size.height.into(),
                page.ops,
            ));
        }

        let mut warnings = Vec::new();
        let opts = printpdf::serialize::PdfSaveOptions::default();
        let mut buf = io::BufWriter::new(w);
        doc.save_writer(&mut buf, &opts, &mut warnings);
        for warning in &warnings {
            tracing::warn!(page = warning.page, "PDF serialization: {}", warning.msg);
        }
        buf.flush().context("Failed to write the PDF document")?;
        Ok(())
    }

    /// Writes the document to a file.
    pub fn save(self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let file = fs::File::create(path)
            .with_context(|| format!("Could not create file {}", path.display()))?;
        self.write(file)
    }

    fn current_font(&self) -> Result<LoadedFont, Error> {
        let font = &self.state.font;
        self.fonts
            .get(&font.family, font.style)
            .cloned()
            .ok_or_else(|| {
                Error::new(
                    format!("Font {} {} is not loaded", font.family, font.style),
                    ErrorKind::InvalidFont,
                )
            })
    }

    fn break_limit(&self) -> Option<Mm> {
        if self.auto_page_break {
            Some(self.page_size.height - self.margins.bottom)
        } else {
            None
        }
    }

    fn resolve_width(&self, width: Mm) -> Mm {
        if width.0 > 0.0 {
            width
        } else {
            (self.page_size.width - self.margins.right - self.state.x).max(Mm(0.0))
        }
    }

    fn ensure_pages(&mut self, page: usize) {
        while self.pages.len() <= page {
            self.pages.push(PageData::new(self.page_size));
        }
    }

    /// Returns the page to draw on, or `None` on a measuring copy.
    fn page_data(&mut self, page: usize) -> Option<&mut PageData> {
        if self.doc.is_none() {
            return None;
        }
        self.pages.get_mut(page)
    }

    fn point(&self, x: Mm, y: Mm) -> printpdf::Point {
        printpdf::Point::new(x.into(), (self.page_size.height - y).into())
    }

    fn fill_rect(&mut self, page: usize, position: Position, size: Size, color: Color) {
        let corners = [
            (position.x, position.y),
            (position.x + size.width, position.y),
            (position.x + size.width, position.y + size.height),
            (position.x, position.y + size.height),
        ];
        let points = corners
            .iter()
            .map(|&(x, y)| printpdf::LinePoint {
                p: self.point(x, y),
                bezier: false,
            })
            .collect();
        if let Some(data) = self.page_data(page) {
            data.set_fill_color(color);
            data.ops.push(printpdf::Op::DrawPolygon {
                polygon: printpdf::Polygon {
                    rings: vec![printpdf::PolygonRing { points }],
                    mode: printpdf::PaintMode::Fill,
                    winding_order: printpdf::WindingOrder::NonZero,
                },
            });
        }
    }

    fn stroke_line(&mut self, page: usize, from: Position, to: Position, style: LineStyle) {
        let points = vec![
            printpdf::LinePoint {
                p: self.point(from.x, from.y),
                bezier: false,
            },
            printpdf::LinePoint {
                p: self.point(to.x, to.y),
                bezier: false,
            },
        ];
        let thickness = style.thickness.unwrap_or(Mm::from_pt(0.57));
        let color = style.color.unwrap_or(Color::BLACK);
        if let Some(data) = self.page_data(page) {
            data.set_outline_thickness(thickness);
            data.set_outline_color(color);
            data.ops.push(printpdf::Op::DrawLine {
                line: printpdf::Line {
                    points,
                    is_closed: false,
                },
            });
        }
    }

    fn draw_border(&mut self, page: usize, segment: Segment, x: Mm, width: Mm, sides: Border) {
        let style = self.state.line_style;
        let (left, right) = (x, x + width);
        let (top, bottom) = (segment.top, segment.bottom);
        if sides.top {
            self.stroke_line(page, Position::new(left, top), Position::new(right, top), style);
        }
        if sides.right {
            self.stroke_line(page, Position::new(right, top), Position::new(right, bottom), style);
        }
        if sides.bottom {
            self.stroke_line(page, Position::new(left, bottom), Position::new(right, bottom), style);
        }
        if sides.left {
            self.stroke_line(page, Position::new(left, top), Position::new(left, bottom), style);
        }
    }

    fn write_str(&mut self, page: usize, font: &LoadedFont, position: Position, s: &str) {
        if s.is_empty() {
            return;
        }
        let size = printpdf::Pt(self.state.font.size);
        let color = self.state.text_color;
        let pos = self.point(position.x, position.y);
        let data = match self.page_data(page) {
            Some(data) => data,
            None => return,
        };

        data.set_fill_color(color);
        data.ops.push(printpdf::Op::StartTextSection);
        match font.pdf_font() {
            IndirectFontRef::Builtin(builtin) => {
                data.ops.push(printpdf::Op::SetFontSizeBuiltinFont {
                    size,
                    font: builtin.clone(),
                });
                data.ops.push(printpdf::Op::SetTextCursor { pos });
                data.ops.push(printpdf::Op::WriteTextBuiltinFont {
                    items: vec![printpdf::TextItem::Text(s.to_owned())],
                    font: builtin.clone(),
                });
            }
            IndirectFontRef::External(id) => {
                let cpk = font
                    .glyph_ids(s)
                    .into_iter()
                    .zip(s.chars())
                    .map(|(glyph, c)| (0, glyph, c))
                    .collect();
                data.ops.push(printpdf::Op::SetFontSize {
                    size,
                    font: id.clone(),
                });
                data.ops.push(printpdf::Op::SetTextCursor { pos });
                data.ops.push(printpdf::Op::WriteCodepointsWithKerning {
                    font: id.clone(),
                    cpk,
                });
            }
        }
        data.ops.push(printpdf::Op::EndTextSection);
    }

    /// Prints one line of text into the box starting at `left` with the given width.
    #[allow(clippy::too_many_arguments)]
    fn print_line(
        &mut self,
        page: usize,
        font: &LoadedFont,
        line: &Line,
        left: Mm,
        width: Mm,
        top: Mm,
        align: Alignment,
    ) {
        let font_size = self.state.font.size;
        let measure = |s: &str| font.str_width(s, font_size);
        let ascent = font.ascent(font_size);
        let descent = font.descent(font_size);
        let baseline = top + (line_height(font_size) - ascent - descent) / 2.0_f32 + ascent;
        let text_width = measure(&line.text);
        let room = width - line.indent;

        let words: Vec<&str> = line.text.split(' ').collect();
        let justify = align == Alignment::Justify && !line.ends_paragraph && words.len() > 1;
        let start = match align {
            Alignment::Center => left + line.indent + (room - text_width) / 2.0_f32,
            Alignment::Right => left + width - text_width,
            Alignment::Left | Alignment::Justify => left + line.indent,
        };

        let underline_width = if justify {
            let gap = (room - text_width) / (words.len() - 1) as f32;
            let space = measure(" ");
            let mut x = start;
            for word in words {
                self.write_str(page, font, Position::new(x, baseline), word);
                x += measure(word) + space + gap;
            }
            room
        } else {
            self.write_str(page, font, Position::new(start, baseline), &line.text);
            text_width
        };

        if self.state.font.style.underline && !line.text.is_empty() {
            let y = baseline + Mm::from_pt(font_size * 0.1);
            let style = LineStyle::new()
                .with_thickness(Mm::from_pt(font_size * 0.05))
                .with_color(self.state.text_color);
            self.stroke_line(
                page,
                Position::new(start, y),
                Position::new(start + underline_width, y),
                style,
            );
        }
    }

    fn record(&mut self, cell: DrawnCell) {
        if self.doc.is_some() {
            self.cells.push(cell);
        }
    }
}

impl Surface for PdfSurface {
    fn state(&self) -> &SurfaceState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SurfaceState {
        &mut self.state
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn set_page(&mut self, page: usize) -> Result<(), Error> {
        if page < self.pages.len() {
            self.state.page = page;
            Ok(())
        } else {
            Err(Error::new(
                format!("Page {} does not exist, the document has {} pages", page, self.pages.len()),
                ErrorKind::PageOutOfRange(page),
            ))
        }
    }

    fn set_font(&mut self, family: &str, style: FontStyle, size: Option<f32>) -> Result<(), Error> {
        if self.fonts.get(family, style).is_none() {
            return Err(Error::new(
                format!("Font {} {} is not loaded", family, style),
                ErrorKind::InvalidFont,
            ));
        }
        if let Some(size) = size {
            self.set_font_size(size)?;
        }
        self.state.font.family = fonts::normalize_family(family);
        self.state.font.style = style;
        Ok(())
    }

    fn cell(&mut self, params: &CellParams<'_>) -> Result<(), Error> {
        let font = self.current_font()?;
        check_encoding(&font, params.text)?;
        let padding = self.state.padding;
        let line_h = line_height(self.state.font.size);
        let width = self.resolve_width(params.width);
        let height = params.height.max(line_h + padding.height());

        if let Some(limit) = self.break_limit() {
            if (self.state.y + height).0 > limit.0 + EPSILON
                && self.state.y.0 > self.margins.top.0 + EPSILON
            {
                self.state.page += 1;
                self.state.y = self.margins.top;
            }
        }
        let (page, x, y) = (self.state.page, self.state.x, self.state.y);
        self.ensure_pages(page);

        if params.fill {
            let color = self.state.fill_color;
            self.fill_rect(page, Position::new(x, y), Size::new(width, height), color);
        }
        let segment = Segment {
            page,
            top: y,
            bottom: y + height,
        };
        self.draw_border(page, segment, x, width, params.border);

        let line = Line {
            text: params.text.to_owned(),
            indent: Mm(0.0),
            ends_paragraph: true,
        };
        let top = y + padding.top + (height - padding.height() - line_h) / 2.0_f32;
        self.print_line(
            page,
            &font,
            &line,
            x + padding.left,
            width - padding.width(),
            top,
            params.align,
        );

        self.record(DrawnCell {
            page,
            position: Position::new(x, y),
            width,
            height,
            end_page: page,
            end_y: y + height,
            lines: vec![line.text],
        });
        self.state.last_height = height;

        match params.advance {
            Advance::Right => self.state.x = x + width,
            Advance::NextLine => {
                self.state.x = self.margins.left;
                self.state.y = y + height;
            }
            Advance::Below => {
                self.state.x = x + width;
                self.state.y = y + height;
            }
        }
        Ok(())
    }

    fn multi_cell(&mut self, params: &MultiCellParams<'_>) -> Result<usize, Error> {
        if let Some(x) = params.x {
            self.state.x = x;
        }
        if let Some(y) = params.y {
            self.state.y = y;
        }
        let font = self.current_font()?;
        let font_size = self.state.font.size;
        let padding = self.state.padding;
        let line_h = line_height(font_size);
        let (start_page, x, start_y) = (self.state.page, self.state.x, self.state.y);
        let width = self.resolve_width(params.width);

        let flattened;
        let text = if params.is_html {
            flattened = wrap::html_to_text(params.text);
            flattened.as_str()
        } else {
            params.text
        };
        let lines = wrap::wrap(
            text,
            (width - padding.width()).max(Mm(0.0)),
            params.indent,
            |s| font.str_width(s, font_size),
        );
        for line in &lines {
            check_encoding(&font, &line.text)?;
        }

        let text_height = line_h * lines.len() as f32 + padding.height();
        let height = params.height.max(text_height);

        let mut flow = Flow::new(start_page, start_y, self.margins.top, self.break_limit());
        flow.advance(padding.top);
        let placed: Vec<(usize, Mm)> = lines.iter().map(|_| flow.place(line_h)).collect();
        flow.advance(padding.bottom + (height - text_height));
        let (end_page, end_y) = (flow.page, flow.y);
        let segments: Vec<Segment> = flow
            .finish()
            .into_iter()
            .filter(|s| s.height().0 > EPSILON)
            .collect();
        self.ensure_pages(end_page);

        for (i, segment) in segments.iter().enumerate() {
            if params.fill {
                let color = self.state.fill_color;
                self.fill_rect(
                    segment.page,
                    Position::new(x, segment.top),
                    Size::new(width, segment.height()),
                    color,
                );
            }
            let sides = Border {
                top: params.border.top && i == 0,
                bottom: params.border.bottom && i + 1 == segments.len(),
                ..params.border
            };
            self.draw_border(segment.page, *segment, x, width, sides);
        }

        for (line, (page, top)) in lines.iter().zip(placed) {
            self.print_line(
                page,
                &font,
                line,
                x + padding.left,
                width - padding.width(),
                top,
                params.align,
            );
        }

        self.record(DrawnCell {
            page: start_page,
            position: Position::new(x, start_y),
            width,
            height,
            end_page,
            end_y,
            lines: lines.iter().map(|l| l.text.clone()).collect(),
        });
        self.state.last_height = if params.reset_height {
            height
        } else {
            self.state.last_height.max(height)
        };

        match params.advance {
            Advance::Right => {
                self.state.page = start_page;
                self.state.x = x + width;
                self.state.y = start_y;
            }
            Advance::NextLine => {
                self.state.page = end_page;
                self.state.x = self.margins.left;
                self.state.y = end_y;
            }
            Advance::Below => {
                self.state.page = end_page;
                self.state.x = x + width;
                self.state.y = end_y;
            }
        }
        Ok(lines.len())
    }

    fn duplicate(&self) -> PdfSurface {
        PdfSurface {
            doc: None,
            pages: self.pages.iter().map(|p| PageData::new(p.size)).collect(),
            page_size: self.page_size,
            margins: self.margins,
            auto_page_break: self.auto_page_break,
            fonts: self.fonts.clone(),
            state: self.state.clone(),
            cells: Vec::new(),
        }
    }
}

/// Parses font data into the form printpdf embeds.
fn parse_pdf_font(data: &[u8]) -> Result<printpdf::ParsedFont, Error> {
    let mut warnings = Vec::new();
    printpdf::ParsedFont::from_bytes(data, 0, &mut warnings).ok_or_else(|| {
        let detail = warnings
            .last()
            .map(|warning| format!("{:?}", warning))
            .unwrap_or_default();
        Error::new(
            "Failed to load the font into the PDF document",
            ErrorKind::PdfError(detail),
        )
    })
}

/// Checks that the builtin fonts can print the string, which requires Windows-1252.
fn check_encoding(font: &LoadedFont, s: &str) -> Result<(), Error> {
    if !font.is_builtin() {
        return Ok(());
    }
    match s.chars().find(|c| win1252_byte(*c).is_none()) {
        Some(c) => Err(Error::new(
            format!(
                "Tried to print a string with a character that is not supported by the Windows-1252 encoding with a built-in font: {:?} in {}",
                c, s
            ),
            ErrorKind::UnsupportedEncoding,
        )),
        None => Ok(()),
    }
}

fn win1252_byte(c: char) -> Option<u8> {
    match c as u32 {
        0x00..=0x7F | 0xA0..=0xFF => Some(c as u8),
        0x20AC => Some(0x80), // EURO SIGN
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85),
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C),
        0x017D => Some(0x8E),
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95),
        0x2013 => Some(0x96),
        0x2014 => Some(0x97),
        0x02DC => Some(0x98),
        0x2122 => Some(0x99),
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C),
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Padding;
    use float_cmp::approx_eq;

    fn courier_surface() -> PdfSurface {
        let mut surface = PdfSurface::a4("test");
        surface
            .set_font("courier", FontStyle::REGULAR, Some(10.0))
            .expect("courier");
        surface
    }

    #[test]
    fn test_win1252() {
        assert_eq!(win1252_byte('A'), Some(0x41));
        assert_eq!(win1252_byte('€'), Some(0x80));
        assert_eq!(win1252_byte('é'), Some(0xE9));
        assert_eq!(win1252_byte('Ω'), None);
    }

    #[test]
    fn test_rejected_font_data_is_a_pdf_error() {
        let err = parse_pdf_font(&[0, 1, 2, 3]).expect_err("not a font");
        assert!(matches!(err.kind(), ErrorKind::PdfError(_)));
    }

    #[test]
    fn test_add_truetype_font() {
        let mut surface = PdfSurface::a4("test");
        let data = printpdf::BuiltinFont::Courier.get_subset_font().bytes;
        surface
            .add_font("Mono", FontStyle::REGULAR, data)
            .expect("add font");
        surface
            .set_font("mono", FontStyle::REGULAR, Some(10.0))
            .expect("set font");
        let lines = surface
            .multi_cell(&MultiCellParams::new(Mm(40.0), Mm(0.0), "Ωmega"))
            .expect("embedded fonts are not limited to Windows-1252");
        assert_eq!(lines, 1);

        let mut dry = surface.duplicate();
        let err = dry
            .add_font("x", FontStyle::REGULAR, Vec::new())
            .expect_err("measuring copies have no document");
        assert!(matches!(err.kind(), ErrorKind::Internal));
    }

    #[test]
    fn test_builtin_font_rejects_unsupported_characters() {
        let mut surface = courier_surface();
        let err = surface
            .multi_cell(&MultiCellParams::new(Mm(50.0), Mm(0.0), "Ωmega"))
            .expect_err("unsupported character");
        assert!(matches!(err.kind(), ErrorKind::UnsupportedEncoding));
    }

    #[test]
    fn test_multi_cell_height_and_cursor() {
        let mut surface = courier_surface();
        let mut params = MultiCellParams::new(Mm(30.0), Mm(0.0), "aaaaaaaaaa bbbbbbbbbb cccccccccc");
        params.advance = Advance::Below;
        let lines = surface.multi_cell(&params).expect("multi cell");
        assert_eq!(lines, 3);
        let expected = line_height(10.0) * 3.0_f32;
        assert!(approx_eq!(f32, surface.last_height().0, expected.0, epsilon = 0.001));
        assert!(approx_eq!(f32, surface.x().0, 40.0, epsilon = 0.001));
        assert!(approx_eq!(f32, surface.y().0, 10.0 + expected.0, epsilon = 0.001));
    }

    #[test]
    fn test_multi_cell_right_returns_to_start() {
        let mut surface = courier_surface();
        let mut params = MultiCellParams::new(Mm(30.0), Mm(20.0), "text");
        params.advance = Advance::Right;
        surface.multi_cell(&params).expect("multi cell");
        assert_eq!(surface.y(), Mm(10.0));
        assert_eq!(surface.x(), Mm(40.0));
        assert_eq!(surface.last_height(), Mm(20.0));
    }

    #[test]
    fn test_multi_cell_keeps_larger_height_without_reset() {
        let mut surface = courier_surface();
        let mut params = MultiCellParams::new(Mm(30.0), Mm(20.0), "a");
        surface.multi_cell(&params).expect("first");
        params.height = Mm(0.0);
        params.reset_height = false;
        surface.multi_cell(&params).expect("second");
        assert_eq!(surface.last_height(), Mm(20.0));
    }

    #[test]
    fn test_multi_cell_breaks_pages() {
        let mut surface = PdfSurface::new(Size::new(100.0, 60.0), "small");
        surface.set_y(Mm(40.0));
        // 40 mm of content starting 10 mm above the break trigger at 50 mm.
        surface
            .multi_cell(&MultiCellParams::new(Mm(50.0), Mm(40.0), ""))
            .expect("multi cell");
        assert_eq!(surface.page_count(), 2);
        assert_eq!(surface.page(), 1);
        assert!(approx_eq!(f32, surface.y().0, 40.0, epsilon = 0.001));
        let cell = &surface.drawn_cells()[0];
        assert_eq!((cell.page, cell.end_page), (0, 1));
        assert_eq!(cell.height, Mm(40.0));
    }

    #[test]
    fn test_multi_cell_without_page_break() {
        let mut surface = PdfSurface::new(Size::new(100.0, 60.0), "small").with_auto_page_break(false);
        surface.set_y(Mm(40.0));
        surface
            .multi_cell(&MultiCellParams::new(Mm(50.0), Mm(40.0), ""))
            .expect("multi cell");
        assert_eq!(surface.page_count(), 1);
        assert_eq!(surface.y(), Mm(80.0));
    }

    #[test]
    fn test_zero_width_extends_to_right_margin() {
        let mut surface = courier_surface();
        surface.set_x(Mm(50.0));
        surface
            .multi_cell(&MultiCellParams::new(Mm(0.0), Mm(0.0), "x"))
            .expect("multi cell");
        let cell = &surface.drawn_cells()[0];
        assert!(approx_eq!(f32, cell.width.0, 150.0, epsilon = 0.001));
    }

    #[test]
    fn test_cell_minimum_height_and_advance() {
        let mut surface = courier_surface();
        surface.set_cell_padding(Padding::all(1.0));
        let params = CellParams {
            width: Mm(20.0),
            height: Mm(0.0),
            text: "abc",
            border: Border::ALL,
            advance: Advance::Right,
            align: Alignment::Center,
            fill: true,
        };
        surface.cell(&params).expect("cell");
        let expected = line_height(10.0) + Mm(2.0);
        assert!(approx_eq!(f32, surface.last_height().0, expected.0, epsilon = 0.001));
        assert_eq!(surface.x(), Mm(30.0));
        assert_eq!(surface.y(), Mm(10.0));

        surface
            .cell(&CellParams {
                advance: Advance::NextLine,
                ..params
            })
            .expect("cell");
        assert_eq!(surface.x(), Mm(10.0));
        assert!(approx_eq!(f32, surface.y().0, 10.0 + expected.0, epsilon = 0.001));
    }

    #[test]
    fn test_set_page_out_of_range() {
        let mut surface = PdfSurface::a4("test");
        assert!(matches!(
            surface.set_page(1).expect_err("missing page").kind(),
            ErrorKind::PageOutOfRange(1)
        ));
        surface.add_page();
        surface.set_page(0).expect("first page");
        assert_eq!(surface.page(), 0);
    }

    #[test]
    fn test_set_font_validates() {
        let mut surface = PdfSurface::a4("test");
        assert!(surface.set_font("nope", FontStyle::REGULAR, None).is_err());
        assert!(surface.set_font("times", FontStyle::REGULAR, Some(0.0)).is_err());
        assert_eq!(surface.font().family, "helvetica");
        surface
            .set_font("Arial", FontStyle::parse("B").expect("style"), Some(12.0))
            .expect("arial");
        assert_eq!(surface.font().family, "helvetica");
        assert_eq!(surface.font().size, 12.0);
    }

    #[test]
    fn test_duplicate_does_not_record() {
        let surface = courier_surface();
        let mut copy = surface.duplicate();
        assert!(copy.is_measuring());
        copy.multi_cell(&MultiCellParams::new(Mm(30.0), Mm(0.0), "abc"))
            .expect("multi cell");
        assert!(copy.drawn_cells().is_empty());
        assert!(surface.drawn_cells().is_empty());
        assert!(copy.write(Vec::new()).is_err());
    }

    #[test]
    fn test_write_document() {
        let mut surface = courier_surface();
        surface
            .multi_cell(&MultiCellParams::new(Mm(30.0), Mm(0.0), "hello"))
            .expect("multi cell");
        let mut buf = Vec::new();
        surface.write(&mut buf).expect("write");
        assert!(buf.starts_with(b"%PDF"));
    }
}
