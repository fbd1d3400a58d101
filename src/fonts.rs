// Copyright (c) 2025 Ismael Theiskaa
// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Font lookup and metrics.
//!
//! A [`FontRegistry`][] maps a family name and a [`FontStyle`][] face to a [`LoadedFont`][] that
//! knows how wide a string is and which PDF font to emit for it.  Every registry starts out with
//! the three families of the PDF base-14 set (`helvetica`, `times`, `courier`) in all four
//! faces; TrueType fonts can be added on top of them.
//!
//! Builtin fonts are not embedded in the document, but they are measured from the metric
//! compatible font data bundled with [`printpdf`][].  All faces are measured glyph by glyph
//! with [`ttf_parser`][].
//!
//! [`FontRegistry`]: struct.FontRegistry.html
//! [`FontStyle`]: ../style/struct.FontStyle.html
//! [`LoadedFont`]: struct.LoadedFont.html
//! [`printpdf`]: https://docs.rs/printpdf/latest/printpdf
//! [`ttf_parser`]: https://docs.rs/ttf-parser

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::error::{Error, ErrorKind};
use crate::style::FontStyle;
use crate::Mm;

/// A font reference as printpdf wants it: builtin fonts by name, embedded fonts by ID.
#[derive(Clone, Debug, PartialEq)]
pub enum IndirectFontRef {
    /// One of the base-14 fonts.
    Builtin(printpdf::BuiltinFont),
    /// A font added to the document.
    External(printpdf::FontId),
}

/// Regular, bold, italic and bold-italic faces of the builtin families.
const BUILTIN_FAMILIES: [(&str, [printpdf::BuiltinFont; 4]); 3] = {
    use printpdf::BuiltinFont::*;
    [
        (
            "helvetica",
            [Helvetica, HelveticaBold, HelveticaOblique, HelveticaBoldOblique],
        ),
        ("times", [TimesRoman, TimesBold, TimesItalic, TimesBoldItalic]),
        (
            "courier",
            [Courier, CourierBold, CourierOblique, CourierBoldOblique],
        ),
    ]
};

static BUILTIN_FONTS: Lazy<Vec<((String, FontStyle), LoadedFont)>> = Lazy::new(|| {
    let mut fonts = Vec::new();
    for (name, faces) in BUILTIN_FAMILIES.iter() {
        for (bold, italic) in [(false, false), (true, false), (false, true), (true, true)] {
            let style = FontStyle {
                bold,
                italic,
                underline: false,
            };
            let face = faces[face_index(style)].clone();
            match EmbeddedFont::new(face.get_subset_font().bytes) {
                Ok(metrics) => fonts.push((
                    ((*name).to_owned(), style),
                    LoadedFont {
                        metrics,
                        pdf_font: IndirectFontRef::Builtin(face),
                    },
                )),
                Err(err) => tracing::warn!(family = *name, %style, "builtin face unavailable: {}", err),
            }
        }
    }
    fonts
});

const ALIASES: &[(&str, &str)] = &[
    ("arial", "helvetica"),
    ("sans-serif", "helvetica"),
    ("times new roman", "times"),
    ("timesroman", "times"),
    ("serif", "times"),
    ("courier new", "courier"),
    ("monospace", "courier"),
];

/// Normalizes a family name: trimmed, lowercase, with common aliases of the builtin families
/// resolved.
pub fn normalize_family(family: &str) -> String {
    let family = family.trim().to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == family)
        .map(|(_, target)| (*target).to_owned())
        .unwrap_or(family)
}

fn face_index(style: FontStyle) -> usize {
    match (style.bold, style.italic) {
        (false, false) => 0,
        (true, false) => 1,
        (false, true) => 2,
        (true, true) => 3,
    }
}

/// Metrics of a TrueType font.
#[derive(Clone)]
pub struct EmbeddedFont {
    data: Arc<Vec<u8>>,
    units_per_em: u16,
    ascent: i16,
    descent: i16,
}

impl EmbeddedFont {
    /// Parses the font data.
    pub fn new(data: Vec<u8>) -> Result<EmbeddedFont, Error> {
        let face = ttf_parser::Face::parse(&data, 0).map_err(|err| {
            Error::new(
                format!("Failed to parse font data: {}", err),
                ErrorKind::InvalidFont,
            )
        })?;
        let units_per_em = face.units_per_em();
        let ascent = face.ascender();
        let descent = face.descender();
        Ok(EmbeddedFont {
            data: Arc::new(data),
            units_per_em,
            ascent,
            descent,
        })
    }

    /// Returns the raw font data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, 0).ok()
    }

    fn glyph_ids(&self, s: &str) -> Vec<u16> {
        match self.face() {
            Some(face) => s
                .chars()
                .map(|c| face.glyph_index(c).map(|id| id.0).unwrap_or(0))
                .collect(),
            None => vec![0; s.chars().count()],
        }
    }

    fn width_units(&self, s: &str) -> u32 {
        let face = match self.face() {
            Some(face) => face,
            None => return 0,
        };
        s.chars()
            .map(|c| {
                let id = face.glyph_index(c).unwrap_or(ttf_parser::GlyphId(0));
                u32::from(face.glyph_hor_advance(id).unwrap_or(0))
            })
            .sum()
    }
}

impl fmt::Debug for EmbeddedFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedFont")
            .field("len", &self.data.len())
            .field("units_per_em", &self.units_per_em)
            .finish()
    }
}

/// A font face that can be measured and written.
#[derive(Clone, Debug)]
pub struct LoadedFont {
    metrics: EmbeddedFont,
    pdf_font: IndirectFontRef,
}

impl LoadedFont {
    /// Returns true if this is one of the base-14 fonts.
    pub fn is_builtin(&self) -> bool {
        matches!(self.pdf_font, IndirectFontRef::Builtin(_))
    }

    /// Returns the PDF font to emit text with.
    pub fn pdf_font(&self) -> &IndirectFontRef {
        &self.pdf_font
    }

    /// Returns the width of the string at the given size in points.
    pub fn str_width(&self, s: &str, font_size: f32) -> Mm {
        let em = self.metrics.width_units(s) as f32 / self.upem();
        Mm::from_pt(em * font_size)
    }

    /// Returns the distance from the baseline to the top of the glyphs.
    pub fn ascent(&self, font_size: f32) -> Mm {
        Mm::from_pt(f32::from(self.metrics.ascent) / self.upem() * font_size)
    }

    /// Returns the distance from the baseline to the bottom of the glyphs, as a positive length.
    pub fn descent(&self, font_size: f32) -> Mm {
        Mm::from_pt(-f32::from(self.metrics.descent) / self.upem() * font_size)
    }

    /// Returns the glyph IDs of the string.
    pub fn glyph_ids(&self, s: &str) -> Vec<u16> {
        self.metrics.glyph_ids(s)
    }

    fn upem(&self) -> f32 {
        f32::from(self.metrics.units_per_em.max(1))
    }
}

/// The fonts known to a surface, by family and face.
#[derive(Clone, Debug)]
pub struct FontRegistry {
    fonts: HashMap<(String, FontStyle), LoadedFont>,
}

impl FontRegistry {
    /// Creates a registry with the builtin families.
    pub fn new() -> FontRegistry {
        FontRegistry {
            fonts: BUILTIN_FONTS.iter().cloned().collect(),
        }
    }

    /// Registers a TrueType face that has already been added to the PDF document.
    ///
    /// Registering the same family and face twice replaces the earlier font.
    pub fn add_embedded(
        &mut self,
        family: &str,
        style: FontStyle,
        font: EmbeddedFont,
        id: printpdf::FontId,
    ) {
        let family = normalize_family(family);
        tracing::debug!(%family, %style, "registered embedded font");
        self.fonts.insert(
            (family, style.face()),
            LoadedFont {
                metrics: font,
                pdf_font: IndirectFontRef::External(id),
            },
        );
    }

    /// Looks up a face.  Underline is ignored since it is drawn, not part of the face.
    pub fn get(&self, family: &str, style: FontStyle) -> Option<&LoadedFont> {
        self.fonts.get(&(normalize_family(family), style.face()))
    }
}

impl Default for FontRegistry {
    fn default() -> FontRegistry {
        FontRegistry::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn test_normalize_family() {
        assert_eq!(normalize_family(" Arial "), "helvetica");
        assert_eq!(normalize_family("Courier"), "courier");
        assert_eq!(normalize_family("DejaVu Sans"), "dejavu sans");
    }

    #[test]
    fn test_builtin_faces() {
        let registry = FontRegistry::new();
        let bold = FontStyle::parse("B").expect("style");
        let font = registry.get("helvetica", bold).expect("font");
        assert!(font.is_builtin());
        assert_eq!(
            font.pdf_font(),
            &IndirectFontRef::Builtin(printpdf::BuiltinFont::HelveticaBold)
        );
        let underlined = FontStyle::parse("U").expect("style");
        assert!(registry.get("times", underlined).is_some());
        assert!(registry.get("comic sans", FontStyle::REGULAR).is_none());
        assert!(registry.get("Arial", FontStyle::REGULAR).is_some());
    }

    #[test]
    fn test_courier_width_is_monospace() {
        let registry = FontRegistry::new();
        let font = registry.get("courier", FontStyle::REGULAR).expect("font");
        // Every Courier glyph is 0.6 em wide, so 10 characters at 10pt are 60pt wide.
        let width = font.str_width("abcdefghij", 10.0);
        assert!(approx_eq!(f32, width.0, Mm::from_pt(60.0).0, epsilon = 0.01));
        assert_eq!(font.str_width("WWWWW", 10.0), font.str_width("iiiii", 10.0));
        assert_eq!(font.str_width("", 10.0), Mm(0.0));
    }

    #[test]
    fn test_helvetica_widths_follow_glyphs() {
        let registry = FontRegistry::new();
        let font = registry.get("helvetica", FontStyle::REGULAR).expect("font");
        let wide = font.str_width("WWWWWWWWWW", 10.0);
        let narrow = font.str_width("iiiiiiiiii", 10.0);
        // The AFM widths are 944 and 222 per 1000 em.
        assert!(approx_eq!(f32, wide.0, Mm::from_pt(94.4).0, epsilon = 0.1));
        assert!(approx_eq!(f32, narrow.0, Mm::from_pt(22.2).0, epsilon = 0.1));

        let bold = FontStyle::parse("B").expect("style");
        let bold = registry.get("helvetica", bold).expect("bold");
        assert!(bold.str_width("abc", 10.0) > font.str_width("abc", 10.0));
    }

    #[test]
    fn test_vertical_metrics() {
        let registry = FontRegistry::new();
        for family in ["helvetica", "times", "courier"] {
            let font = registry.get(family, FontStyle::REGULAR).expect("font");
            let ascent = font.ascent(10.0);
            let descent = font.descent(10.0);
            assert!(descent > Mm(0.0) && ascent > descent, "{}", family);
            assert!(ascent + descent <= crate::render::line_height(10.0), "{}", family);
        }
    }

    #[test]
    fn test_invalid_embedded_font() {
        let err = EmbeddedFont::new(vec![0, 1, 2, 3]).expect_err("not a font");
        assert!(matches!(err.kind(), ErrorKind::InvalidFont));
    }
}
