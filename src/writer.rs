//! CSV writing.
//!
//! This module provides the [`Writer`], the state machine that turns fields
//! into an escaped, delimited scalar stream.
//!
//! ## Overview
//!
//! - **Escaping**: a field is wrapped in quotes only when it contains a quote
//!   (doubled in the output) or a field/row delimiter, decided in a single pass
//! - **Consistent width**: the header, or else the first row, fixes the number
//!   of fields; short rows are padded, extra fields are an error
//! - **Header**: written once, when the writer is created, and not counted as
//!   a data row
//! - **Closing**: [`Writer::finish`], or dropping the writer, ends a
//!   half-written row before the output is flushed
//!
//! ## Usage
//!
//! ```rust
//! use csv_codec::{CsvOptions, Writer};
//!
//! let options = CsvOptions::new().with_headers(["id", "name"]);
//! let mut writer = Writer::new(&options).unwrap();
//! writer.write_row(&["1", "Ann"]).unwrap();
//! writer.write_row(&["2", "O'Hare, Jr."]).unwrap();
//! assert_eq!(
//!     writer.into_string().unwrap(),
//!     "id,name\n1,Ann\n2,\"O'Hare, Jr.\"\n"
//! );
//! ```

use crate::matcher::DelimiterMatcher;
use crate::scalar::Output;
use crate::{CsvOptions, Error, Result, QUOTE};
use std::io::Write;

/// The CSV writer.
///
/// Writes to an in-memory string ([`Writer::new`]) or an encoded byte stream
/// ([`Writer::from_writer`]).
pub struct Writer<'a> {
    output: Output<'a>,
    field_delimiter: DelimiterMatcher,
    row_delimiter: DelimiterMatcher,
    field_chars: Vec<char>,
    row_chars: Vec<char>,
    trim: Vec<char>,
    expected_fields: Option<usize>,
    row_index: usize,
    field_index: usize,
    /// Whether anything, delimiters included, was written for the current row.
    row_started: bool,
    finished: bool,
}

impl Writer<'static> {
    /// Creates a writer producing a `String`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid options.
    pub fn new(options: &CsvOptions) -> Result<Self> {
        Writer::with_output(Output::memory(), options)
    }
}

impl<'a> Writer<'a> {
    /// Creates a writer encoding into a byte stream.
    ///
    /// The encoding comes from the options, UTF-8 by default.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid options.
    pub fn from_writer<W: Write + 'a>(writer: W, options: &CsvOptions) -> Result<Self> {
        let encoding = options.encoding.unwrap_or_default();
        Writer::with_output(Output::stream(writer, encoding), options)
    }

    fn with_output(output: Output<'a>, options: &CsvOptions) -> Result<Self> {
        options.validate()?;
        let mut writer = Writer {
            output,
            field_delimiter: DelimiterMatcher::new(&options.field_delimiter),
            row_delimiter: DelimiterMatcher::new(&options.row_delimiter),
            field_chars: options.field_delimiter.as_chars().to_vec(),
            row_chars: options.row_delimiter.as_chars().to_vec(),
            trim: options.trim.clone(),
            expected_fields: None,
            row_index: 0,
            field_index: 0,
            row_started: false,
            finished: false,
        };
        if options.bom {
            writer.output.write_bom()?;
        }
        if !options.headers.is_empty() {
            for name in &options.headers {
                writer.write_field(name)?;
            }
            writer.end_row()?;
            writer.row_index = 0;
            log::debug!("header row written with {} fields", options.headers.len());
        }
        Ok(writer)
    }

    /// The index of the row being written.
    pub fn row_index(&self) -> usize {
        self.row_index
    }

    /// The index the next field of the current row will have.
    pub fn field_index(&self) -> usize {
        self.field_index
    }

    /// The width of every row, once the header or the first row fixed it.
    pub fn expected_fields(&self) -> Option<usize> {
        self.expected_fields
    }

    /// Fixes the row width before any row was completed.
    pub(crate) fn establish_width(&mut self, width: usize) {
        if self.expected_fields.is_none() && width > 0 {
            self.expected_fields = Some(width);
        }
    }

    /// Writes one field at the current position.
    ///
    /// # Errors
    ///
    /// [`Error::FieldOverflow`] if the row already has the established
    /// number of fields, or an I/O error from the output.
    pub fn write_field(&mut self, field: &str) -> Result<()> {
        if let Some(expected) = self.expected_fields {
            if self.field_index >= expected {
                return Err(Error::FieldOverflow {
                    row: self.row_index,
                    expected,
                });
            }
        }
        if self.field_index > 0 {
            self.output.write_chars(&self.field_chars)?;
            self.row_started = true;
        }
        self.write_escaped(field)?;
        self.field_index += 1;
        Ok(())
    }

    /// Writes every field of `row` and ends the row.
    ///
    /// # Errors
    ///
    /// As for [`Writer::write_field`] and [`Writer::end_row`].
    pub fn write_row<S: AsRef<str>>(&mut self, row: &[S]) -> Result<()> {
        for field in row {
            self.write_field(field.as_ref())?;
        }
        self.end_row()
    }

    /// Ends the current row.
    ///
    /// A row without fields becomes a full row of empty fields. Otherwise
    /// missing fields are padded with empty ones, or, for the first row, the
    /// number of fields written becomes the width of every row.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownWidth`] for an empty first row, or an I/O error.
    pub fn end_row(&mut self) -> Result<()> {
        if self.field_index == 0 {
            return self.write_empty_row();
        }
        match self.expected_fields {
            Some(expected) => {
                while self.field_index < expected {
                    self.write_field("")?;
                }
            }
            None => self.expected_fields = Some(self.field_index),
        }
        self.close_row()
    }

    /// Writes a row of empty fields.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownWidth`] if no row width has been established yet.
    pub fn write_empty_row(&mut self) -> Result<()> {
        if self.field_index > 0 {
            return self.end_row();
        }
        let expected = self.expected_fields.ok_or(Error::UnknownWidth {
            row: self.row_index,
        })?;
        for _ in 0..expected {
            self.write_field("")?;
        }
        self.close_row()
    }

    fn close_row(&mut self) -> Result<()> {
        if !self.row_started {
            // A lone empty field would read back as a blank line.
            self.output.write_chars(&[QUOTE, QUOTE])?;
        }
        self.output.write_chars(&self.row_chars)?;
        log::trace!("row {} written", self.row_index);
        self.row_index += 1;
        self.field_index = 0;
        self.row_started = false;
        Ok(())
    }

    /// Whether `chars` would merge with a neighbouring delimiter into a
    /// different one when read back: its end with the start of the delimiter
    /// written after it, or its start with the delimiter written before it.
    fn straddles_delimiter(&self, chars: &[char]) -> bool {
        let delimiters = [self.field_chars.as_slice(), self.row_chars.as_slice()];
        let at_end = delimiters.iter().any(|d| {
            (1..d.len()).any(|k| {
                chars.ends_with(&d[..k]) && delimiters.iter().any(|next| next.starts_with(&d[k..]))
            })
        });
        let at_start = delimiters.iter().any(|before| {
            delimiters.iter().any(|longer| {
                if longer.len() <= before.len() || !longer.starts_with(before) {
                    return false;
                }
                let rest = &longer[before.len()..];
                if chars.is_empty() {
                    // An empty field is followed directly by the next delimiter.
                    delimiters
                        .iter()
                        .any(|next| next.starts_with(rest) || rest.starts_with(next))
                } else {
                    chars.starts_with(rest)
                }
            })
        });
        at_end || at_start
    }

    fn write_escaped(&mut self, field: &str) -> Result<()> {
        let chars: Vec<char> = field.chars().collect();
        let mut result = Vec::with_capacity(chars.len() + 2);
        let mut needs_escaping = self.straddles_delimiter(&chars)
            || (!self.trim.is_empty()
                && (chars.first().is_some_and(|c| self.trim.contains(c))
                    || chars.last().is_some_and(|c| self.trim.contains(c))));
        for (i, ch) in chars.iter().enumerate() {
            if *ch == QUOTE {
                needs_escaping = true;
                result.push(QUOTE);
            } else if !needs_escaping
                && (self.field_delimiter.matches_slice(&chars, i)
                    || self.row_delimiter.matches_slice(&chars, i))
            {
                needs_escaping = true;
            }
            result.push(*ch);
        }
        if needs_escaping {
            self.output.write_char(QUOTE)?;
            self.output.write_chars(&result)?;
            self.output.write_char(QUOTE)?;
        } else {
            self.output.write_chars(&result)?;
        }
        if !result.is_empty() || needs_escaping {
            self.row_started = true;
        }
        Ok(())
    }

    /// Ends a half-written row and flushes the output.
    ///
    /// Calling it again does nothing.
    ///
    /// # Errors
    ///
    /// As for [`Writer::end_row`], plus I/O errors while flushing.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        if self.field_index > 0 {
            self.end_row()?;
        }
        self.output.finish()?;
        self.finished = true;
        log::debug!("writer finished after {} rows", self.row_index);
        Ok(())
    }

    /// Finishes the writer and returns the text of an in-memory output.
    ///
    /// # Errors
    ///
    /// As for [`Writer::finish`]; a custom error for a stream output.
    pub fn into_string(mut self) -> Result<String> {
        self.take_string()
    }

    pub(crate) fn take_string(&mut self) -> Result<String> {
        self.finish()?;
        std::mem::replace(&mut self.output, Output::memory())
            .into_string()
            .ok_or_else(|| Error::custom("the writer does not write to memory"))
    }
}

impl Drop for Writer<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            log::warn!("failed to finish the CSV writer on drop: {}", e);
        }
    }
}
