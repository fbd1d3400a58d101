// Copyright (c) 2026 Ronan Le Meillat - SCTG Development
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Licensed under the MIT License or the Apache License, Version 2.0

//! Error types for `genpdfi_tables`.
//!
//! Table layout itself is best-effort and does not fail on bad options; the errors in this
//! module come from the rendering surface (fonts, encodings, pages) and from loading job files.

use std::error;
use std::fmt;
use std::io;

/// Helper trait for creating [`Error`][] instances.
///
/// This trait is inspired by [`anyhow::Context`][].
///
/// # Examples
///
/// ```
/// use genpdfi_tables::error::{Context as _, Error};
/// use std::io;
/// let res: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::Other, "boom"));
/// let mapped = res.context("wrapped");
/// assert!(mapped.is_err());
/// ```
///
/// [`Error`]: struct.Error.html
/// [`anyhow::Context`]: https://docs.rs/anyhow/latest/anyhow/trait.Context.html
pub trait Context<T> {
    /// Maps the error to an [`Error`][] instance with the given message.
    ///
    /// [`Error`]: struct.Error.html
    fn context(self, msg: impl Into<String>) -> Result<T, Error>;

    /// Maps the error to an [`Error`][] instance message produced by the given callback.
    ///
    /// [`Error`]: struct.Error.html
    fn with_context<F, S>(self, cb: F) -> Result<T, Error>
    where
        F: Fn() -> S,
        S: Into<String>;
}

impl<T, E: Into<ErrorKind>> Context<T> for Result<T, E> {
    fn context(self, msg: impl Into<String>) -> Result<T, Error> {
        self.map_err(|err| Error::new(msg, err))
    }

    fn with_context<F, S>(self, cb: F) -> Result<T, Error>
    where
        F: Fn() -> S,
        S: Into<String>,
    {
        self.map_err(move |err| Error::new(cb(), err))
    }
}

/// An error that occured while rendering a table or loading a table job.
///
/// The error consists of an error message (provided by the `Display` implementation) and an error
/// kind, see [`kind`](#method.kind).
#[derive(Debug)]
pub struct Error {
    msg: String,
    kind: ErrorKind,
}

impl Error {
    /// Creates a new error.
    ///
    /// # Examples
    ///
    /// ```
    /// use genpdfi_tables::error::{Error, ErrorKind};
    /// let e = Error::new("oops", ErrorKind::Internal);
    /// assert_eq!(format!("{}", e), "oops");
    /// match e.kind() { ErrorKind::Internal => {}, k => panic!("unexpected: {:?}", k) }
    /// ```
    pub fn new(msg: impl Into<String>, kind: impl Into<ErrorKind>) -> Error {
        Error {
            msg: msg.into(),
            kind: kind.into(),
        }
    }

    /// Returns the error kind for this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.msg)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ErrorKind::IoError(err) => Some(err),
            ErrorKind::ParseError(err) => Some(err),
            _ => None,
        }
    }
}

/// The kind of an [`Error`](struct.Error.html).
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An internal error.
    Internal,
    /// An error caused by invalid data.
    InvalidData,
    /// An error caused by an invalid or unknown font.
    InvalidFont,
    /// A string with unsupported characters was used with a built-in font.
    UnsupportedEncoding,
    /// A page index that does not exist on the surface.
    PageOutOfRange(usize),
    /// An IO error.
    IoError(io::Error),
    /// A job file or option document could not be parsed.
    ParseError(serde_json::Error),
    /// `printpdf` rejected data, with its last diagnostic.
    PdfError(String),
}

impl From<io::Error> for ErrorKind {
    fn from(error: io::Error) -> ErrorKind {
        ErrorKind::IoError(error)
    }
}

impl From<serde_json::Error> for ErrorKind {
    fn from(error: serde_json::Error) -> ErrorKind {
        ErrorKind::ParseError(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_error_display_and_source() {
        let io_err = io::Error::new(io::ErrorKind::Other, "io fail");
        let e: Error = Error::new("oops", ErrorKind::IoError(io_err));
        assert_eq!(format!("{}", e), "oops");
        match e.source() {
            Some(src) => {
                let src_str = format!("{}", src);
                assert!(src_str.contains("io fail"));
            }
            None => panic!("expected source for IoError"),
        }
    }

    #[test]
    fn test_context_maps_parse_errors() {
        let res: Result<serde_json::Value, serde_json::Error> = serde_json::from_str("{ nope");
        match res.with_context(|| format!("failed to parse {}", "job.json")) {
            Err(err) => {
                assert_eq!(format!("{}", err), "failed to parse job.json");
                assert!(matches!(err.kind(), ErrorKind::ParseError(_)));
                assert!(err.source().is_some());
            }
            Ok(_) => panic!("expected Err"),
        }
    }

    #[test]
    fn test_page_out_of_range_has_no_source() {
        let e = Error::new("no such page", ErrorKind::PageOutOfRange(4));
        assert!(e.source().is_none());
        assert!(matches!(e.kind(), ErrorKind::PageOutOfRange(4)));
    }
}
