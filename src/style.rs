// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Visual attributes of table cells: colors, borders, alignment, font selection and padding.
//!
//! Every type in this module can be deserialized from the loose JSON shapes that table options
//! are usually written in, e.g. a color as `[255, 0, 0]`, a border as `1` or `"LB"` and a
//! font as `["courier", "B", 9]`.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;

use crate::Mm;

/// An RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    /// A color in the RGB color space, each component in `0..=255`.
    Rgb(u8, u8, u8),
}

impl Color {
    /// Black, the default text and line color.
    pub const BLACK: Color = Color::Rgb(0, 0, 0);

    /// White.
    pub const WHITE: Color = Color::Rgb(255, 255, 255);

    /// Parses `[r, g, b]` or `"#rrggbb"`.
    pub fn from_value(value: &Value) -> Option<Color> {
        match value {
            Value::Array(items) if items.len() == 3 => {
                let mut rgb = [0u8; 3];
                for (slot, item) in rgb.iter_mut().zip(items) {
                    let c = item.as_f64()?;
                    if !(0.0..=255.0).contains(&c) {
                        return None;
                    }
                    *slot = c.round() as u8;
                }
                Some(Color::Rgb(rgb[0], rgb[1], rgb[2]))
            }
            Value::String(s) => {
                let hex = s.strip_prefix('#')?;
                if hex.len() != 6 || !hex.is_ascii() {
                    return None;
                }
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
            }
            _ => None,
        }
    }
}

impl Default for Color {
    fn default() -> Color {
        Color::BLACK
    }
}

impl From<Color> for printpdf::Color {
    fn from(color: Color) -> printpdf::Color {
        match color {
            Color::Rgb(r, g, b) => printpdf::Color::Rgb(printpdf::Rgb::new(
                f32::from(r) / 255.0,
                f32::from(g) / 255.0,
                f32::from(b) / 255.0,
                None,
            )),
        }
    }
}

/// The line style used for cell borders.
///
/// Unset attributes keep whatever the surface currently uses.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineStyle {
    /// The line thickness.
    pub thickness: Option<Mm>,
    /// The line color.
    pub color: Option<Color>,
}

impl LineStyle {
    /// Creates an empty line style.
    pub fn new() -> LineStyle {
        LineStyle::default()
    }

    /// Sets the thickness of this line style and returns it.
    pub fn with_thickness(mut self, thickness: impl Into<Mm>) -> LineStyle {
        self.thickness = Some(thickness.into());
        self
    }

    /// Sets the color of this line style and returns it.
    pub fn with_color(mut self, color: Color) -> LineStyle {
        self.color = Some(color);
        self
    }

    /// Parses `{"width": 0.3, "color": [r, g, b]}`.
    pub fn from_value(value: &Value) -> Option<LineStyle> {
        let map = value.as_object()?;
        let thickness = match map.get("width") {
            Some(w) => Some(Mm(w.as_f64().filter(|w| *w >= 0.0)? as f32)),
            None => None,
        };
        let color = match map.get("color") {
            Some(c) => Some(Color::from_value(c)?),
            None => None,
        };
        Some(LineStyle { thickness, color })
    }

    /// Returns this style with the unset attributes taken from `fallback`.
    pub fn or(self, fallback: LineStyle) -> LineStyle {
        LineStyle {
            thickness: self.thickness.or(fallback.thickness),
            color: self.color.or(fallback.color),
        }
    }
}

/// The style variant of a font family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FontStyle {
    /// Bold weight.
    pub bold: bool,
    /// Italic (or oblique) shape.
    pub italic: bool,
    /// Underlined text.
    pub underline: bool,
}

impl FontStyle {
    /// The regular style.
    pub const REGULAR: FontStyle = FontStyle {
        bold: false,
        italic: false,
        underline: false,
    };

    /// Parses a style string made of the letters `B`, `I` and `U` (case-insensitive).
    ///
    /// The empty string is the regular style.
    pub fn parse(s: &str) -> Option<FontStyle> {
        let mut style = FontStyle::REGULAR;
        for c in s.chars() {
            match c.to_ascii_uppercase() {
                'B' => style.bold = true,
                'I' => style.italic = true,
                'U' => style.underline = true,
                _ => return None,
            }
        }
        Some(style)
    }

    /// Returns the style without the underline flag, which does not select a font face.
    pub fn face(self) -> FontStyle {
        FontStyle {
            underline: false,
            ..self
        }
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bold {
            f.write_str("B")?;
        }
        if self.italic {
            f.write_str("I")?;
        }
        if self.underline {
            f.write_str("U")?;
        }
        Ok(())
    }
}

/// A font selection: family, optional style and optional size.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    /// The font family name, e.g. `helvetica`.
    pub family: String,
    /// The style, if given.
    pub style: Option<FontStyle>,
    /// The size in points, if given.
    pub size: Option<f32>,
}

impl FontSpec {
    /// Creates a font selection for the given family.
    pub fn family(family: impl Into<String>) -> FontSpec {
        FontSpec {
            family: family.into(),
            style: None,
            size: None,
        }
    }

    /// Parses `"family"`, `["family", "style", size]` or `{"family", "style", "size"}`.
    ///
    /// Trailing array items and the style and size keys are optional.
    pub fn from_value(value: &Value) -> Option<FontSpec> {
        let (family, style, size) = match value {
            Value::String(family) => (family.as_str(), None, None),
            Value::Array(items) => (
                items.first()?.as_str()?,
                items.get(1),
                items.get(2),
            ),
            Value::Object(map) => (map.get("family")?.as_str()?, map.get("style"), map.get("size")),
            _ => return None,
        };
        if family.trim().is_empty() {
            return None;
        }
        let style = match style {
            Some(Value::String(s)) => Some(FontStyle::parse(s)?),
            Some(Value::Null) | None => None,
            Some(_) => return None,
        };
        let size = match size {
            Some(Value::Null) | None => None,
            Some(v) => Some(v.as_f64().filter(|s| *s > 0.0)? as f32),
        };
        Some(FontSpec {
            family: family.trim().to_owned(),
            style,
            size,
        })
    }
}

/// The horizontal alignment of cell text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    /// Left-aligned.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Right-aligned.
    Right,
    /// Justified: all lines but the last of a paragraph fill the cell width.
    Justify,
}

impl Alignment {
    /// Parses `L`, `C`, `R`, `J` or the full words (case-insensitive).
    pub fn parse(s: &str) -> Option<Alignment> {
        match s.to_ascii_lowercase().as_str() {
            "l" | "left" => Some(Alignment::Left),
            "c" | "center" | "centre" => Some(Alignment::Center),
            "r" | "right" => Some(Alignment::Right),
            "j" | "justify" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

/// The border sides drawn around a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Border {
    /// Left side.
    pub left: bool,
    /// Top side.
    pub top: bool,
    /// Right side.
    pub right: bool,
    /// Bottom side.
    pub bottom: bool,
}

impl Border {
    /// No border.
    pub const NONE: Border = Border {
        left: false,
        top: false,
        right: false,
        bottom: false,
    };

    /// A full frame.
    pub const ALL: Border = Border {
        left: true,
        top: true,
        right: true,
        bottom: true,
    };

    /// Returns true if no side is drawn.
    pub fn is_empty(&self) -> bool {
        *self == Border::NONE
    }

    /// Parses `0` (none), any other number (frame) or a string of the letters `L`, `T`, `R`, `B`.
    pub fn from_value(value: &Value) -> Option<Border> {
        match value {
            Value::Bool(b) => Some(if *b { Border::ALL } else { Border::NONE }),
            Value::Number(n) => Some(if n.as_f64()? == 0.0 {
                Border::NONE
            } else {
                Border::ALL
            }),
            Value::String(s) => Border::parse(s),
            _ => None,
        }
    }

    /// Parses a border string such as `"1"`, `"0"` or `"LTB"`.
    pub fn parse(s: &str) -> Option<Border> {
        match s.trim() {
            "" | "0" => return Some(Border::NONE),
            "1" => return Some(Border::ALL),
            _ => {}
        }
        let mut border = Border::NONE;
        for c in s.trim().chars() {
            match c.to_ascii_uppercase() {
                'L' => border.left = true,
                'T' => border.top = true,
                'R' => border.right = true,
                'B' => border.bottom = true,
                _ => return None,
            }
        }
        Some(border)
    }
}

/// The inner spacing between a cell's edges and its text.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Padding {
    /// Left padding.
    pub left: Mm,
    /// Top padding.
    pub top: Mm,
    /// Right padding.
    pub right: Mm,
    /// Bottom padding.
    pub bottom: Mm,
}

impl Padding {
    /// The same padding on all four sides.
    pub fn all(value: impl Into<Mm>) -> Padding {
        let value = value.into();
        Padding {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }

    /// Horizontal padding only.
    pub fn horizontal(value: impl Into<Mm>) -> Padding {
        let value = value.into();
        Padding {
            left: value,
            right: value,
            ..Padding::default()
        }
    }

    /// The sum of the left and right padding.
    pub fn width(&self) -> Mm {
        self.left + self.right
    }

    /// The sum of the top and bottom padding.
    pub fn height(&self) -> Mm {
        self.top + self.bottom
    }

    /// Parses a number (all sides) or `{"left", "top", "right", "bottom"}` (missing sides are 0).
    pub fn from_value(value: &Value) -> Option<Padding> {
        let side = |v: Option<&Value>| -> Option<Mm> {
            match v {
                None => Some(Mm(0.0)),
                Some(v) => Some(Mm(v.as_f64().filter(|p| *p >= 0.0)? as f32)),
            }
        };
        match value {
            Value::Number(_) => side(Some(value)).map(Padding::all),
            Value::Object(map) => Some(Padding {
                left: side(map.get("left"))?,
                top: side(map.get("top"))?,
                right: side(map.get("right"))?,
                bottom: side(map.get("bottom"))?,
            }),
            _ => None,
        }
    }
}

macro_rules! deserialize_from_value {
    ($($ty:ty => $what:literal),* $(,)?) => {
        $(
            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let value = Value::deserialize(deserializer)?;
                    <$ty>::from_value(&value).ok_or_else(|| {
                        de::Error::custom(format!(concat!("invalid ", $what, ": {}"), value))
                    })
                }
            }
        )*
    };
}

deserialize_from_value! {
    Color => "color",
    LineStyle => "line style",
    FontSpec => "font",
    Border => "border",
    Padding => "padding",
}

impl<'de> Deserialize<'de> for Alignment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Alignment::parse(&s).ok_or_else(|| de::Error::custom(format!("invalid alignment: {}", s)))
    }
}

impl<'de> Deserialize<'de> for FontStyle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        FontStyle::parse(&s).ok_or_else(|| de::Error::custom(format!("invalid font style: {}", s)))
    }
}
