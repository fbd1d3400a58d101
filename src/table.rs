// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Table drawing.
//!
//! [`DrawTable`][] adds [`draw_table`][] to every [`Surface`][].  Each row is drawn twice:
//!
//! 1. on a duplicate of the surface, to find the height of the tallest cell;
//! 2. on the surface itself, with that height as the minimum height of every cell.
//!
//! The duplicate is dropped right after measuring, so the first pass leaves no trace.  After a
//! row is drawn, [`reconcile_row`][] decides on which page and at which Y position the next
//! row starts, which matters once cells overflow onto following pages.
//!
//! [`DrawTable`]: trait.DrawTable.html
//! [`draw_table`]: trait.DrawTable.html#tymethod.draw_table
//! [`Surface`]: ../surface/trait.Surface.html
//! [`reconcile_row`]: fn.reconcile_row.html

use crate::data::{Row, TableData};
use crate::error::Error;
use crate::options::{CellKind, CellOptions, TableOptions};
use crate::style::{Alignment, Border, FontStyle};
use crate::surface::{Advance, CellParams, FontState, MultiCellParams, Surface};
use crate::Mm;

/// Where a cell ended: its page and the cursor Y position after drawing it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellEnd {
    /// The page the cursor was on after the cell.
    pub page: usize,
    /// The cursor Y position after the cell.
    pub y: Mm,
}

impl CellEnd {
    /// Creates a cell end.
    pub fn new(page: usize, y: impl Into<Mm>) -> CellEnd {
        CellEnd { page, y: y.into() }
    }
}

/// The rule that decided where the row after a drawn row starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// All cells ended on the starting page.
    SamePage,
    /// The first and the last cell ended on the same (later) page.
    MatchingEnds,
    /// The first cell ended on an earlier page than the last cell.
    FirstEarlier,
    /// The first cell ended on a later page than the last cell.  There is no good answer for
    /// this layout; the last cell's position is used.
    Unresolved,
}

/// The position of the cursor after a row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowReconciliation {
    /// The page to continue on: the last page any cell reached.
    pub page: usize,
    /// The Y position to continue at.
    pub y: Mm,
    /// The rule that produced `y`.
    pub outcome: ReconcileOutcome,
}

/// Computes where the cursor goes after a row that started on `start_page` and whose cells
/// ended at `ends`, in column order.
///
/// Returns `None` for a row without cells.
pub fn reconcile_row(start_page: usize, ends: &[CellEnd]) -> Option<RowReconciliation> {
    let first = ends.first()?;
    let last = ends.last()?;
    let page = ends.iter().map(|end| end.page).max()?;
    let max_y = ends.iter().map(|end| end.y).fold(first.y, Mm::max);

    let (y, outcome) = if page == start_page {
        (max_y, ReconcileOutcome::SamePage)
    } else if first.page == last.page {
        (max_y, ReconcileOutcome::MatchingEnds)
    } else if first.page < last.page {
        (first.y, ReconcileOutcome::FirstEarlier)
    } else {
        (last.y, ReconcileOutcome::Unresolved)
    };

    Some(RowReconciliation { page, y, outcome })
}

/// Draws tables on a surface.
///
/// This trait is implemented for every [`Surface`](../surface/trait.Surface.html).
pub trait DrawTable: Surface {
    /// Draws the table at the position given by the `x_pos` and `y_pos` options, or at the
    /// cursor.
    ///
    /// All cells of a row get the height of the tallest one.  Afterwards the cursor is below
    /// the table, and the font, text color and cell padding are the same as before the call.
    ///
    /// Options that cannot be applied are skipped with a warning.  Errors raised by the surface
    /// while drawing are returned.
    fn draw_table(&mut self, data: &TableData, options: &TableOptions) -> Result<(), Error>;
}

impl<S: Surface> DrawTable for S {
    fn draw_table(&mut self, data: &TableData, options: &TableOptions) -> Result<(), Error> {
        let mut table = defaults(self).merge(&options.table);
        let font = self.font().clone();
        let x = table.x_pos.unwrap_or_else(|| self.x());
        let y = table.y_pos.unwrap_or_else(|| self.y());
        self.set_xy(x, y);

        for (index, row) in data.rows().enumerate() {
            let row = match row {
                Some(row) => row,
                None => continue,
            };

            let max_units = {
                let mut trial = self.duplicate();
                draw_row(&mut trial, row, index, &table, options, &font)?
            };

            let previous = table.height;
            table.height = Some(max_units);
            let committed = draw_row(self, row, index, &table, options, &font);
            table.height = previous.or(Some(Mm(0.0)));
            committed?;

            tracing::debug!(
                row = index,
                height = max_units.0,
                page = self.page(),
                y = self.y().0,
                "drew table row"
            );
        }
        Ok(())
    }
}

/// The table-level options used when the caller does not set them.
fn defaults<S: Surface>(surface: &S) -> CellOptions {
    CellOptions {
        kind: Some(CellKind::MultiCell),
        x_pos: Some(surface.x()),
        y_pos: Some(surface.y()),
        border: Some(Border::NONE),
        align: Some(Alignment::Left),
        width: Some(Mm(0.0)),
        height: Some(Mm(0.0)),
        font_size: Some(surface.font().size),
        is_html: Some(false),
        ..CellOptions::default()
    }
}

/// Draws one row and returns the height of its tallest cell.
fn draw_row<S: Surface>(
    surface: &mut S,
    row: &Row,
    index: usize,
    table: &CellOptions,
    options: &TableOptions,
    font: &FontState,
) -> Result<Mm, Error> {
    if let Some(x) = table.x_pos {
        surface.set_x(x);
    }
    let start_page = surface.page();
    let start_y = surface.y();
    let count = row.len();
    let mut ends = Vec::with_capacity(count);
    let mut max_units = Mm(0.0);

    for (column, (key, text)) in row.iter().enumerate() {
        let end_row = column + 1 == count;
        let cell = options.cell_options(table, index, key);

        let padding = surface.cell_padding();
        if let Some(cell_padding) = cell.padding {
            surface.set_cell_padding(cell_padding);
        }
        if let Some(line_style) = cell.line_style {
            surface.set_line_style(line_style);
        }
        let fill = match cell.fill_color {
            Some(color) => {
                surface.set_fill_color(color);
                true
            }
            None => false,
        };
        let text_color = surface.text_color();
        if let Some(color) = cell.text_color {
            surface.set_text_color(color);
        }
        if let Some(size) = cell.font_size {
            if let Err(err) = surface.set_font_size(size) {
                tracing::warn!(row = index, column = %key, "skipping font size: {}", err);
            }
        }
        let face = match (&cell.font, cell.font_style) {
            (Some(spec), style) => Some((
                spec.family.clone(),
                spec.style.or(style).unwrap_or(FontStyle::REGULAR),
                spec.size,
            )),
            (None, Some(style)) => Some((surface.font().family.clone(), style, None)),
            (None, None) => None,
        };
        if let Some((family, style, size)) = face {
            if let Err(err) = surface.set_font(&family, style, size) {
                tracing::warn!(row = index, column = %key, "skipping font: {}", err);
            }
        }

        let width = table
            .width
            .unwrap_or_default()
            .max(cell.width.unwrap_or_default());
        let height = table
            .height
            .unwrap_or_default()
            .max(cell.height.unwrap_or_default());
        let border = cell.border.unwrap_or_default();
        let align = cell.align.unwrap_or_default();

        surface.set_page(start_page)?;
        match cell.kind.unwrap_or_default() {
            CellKind::Cell => {
                surface.set_y(start_y);
                surface.cell(&CellParams {
                    width,
                    height,
                    text,
                    border,
                    advance: if end_row {
                        Advance::NextLine
                    } else {
                        Advance::Right
                    },
                    align,
                    fill,
                })?
            }
            CellKind::MultiCell => {
                let x = surface.x();
                surface.multi_cell(&MultiCellParams {
                    width,
                    height,
                    text,
                    border,
                    align,
                    fill,
                    advance: if end_row {
                        Advance::NextLine
                    } else {
                        Advance::Below
                    },
                    x: Some(x),
                    y: Some(start_y),
                    reset_height: true,
                    indent: Mm(0.0),
                    is_html: cell.is_html.unwrap_or(false),
                })?;
            }
        }

        max_units = max_units.max(surface.last_height());
        ends.push(CellEnd::new(surface.page(), surface.y()));

        surface.set_font(&font.family, font.style, Some(font.size))?;
        surface.set_text_color(text_color);
        surface.set_cell_padding(padding);
    }

    if let Some(end) = reconcile_row(start_page, &ends) {
        if end.outcome == ReconcileOutcome::Unresolved {
            tracing::warn!(
                row = index,
                ?ends,
                "first cell of the row ended on a later page than the last one, continuing after the last cell"
            );
        }
        surface.set_page(end.page)?;
        surface.set_y(end.y);
    }
    Ok(max_units)
}
