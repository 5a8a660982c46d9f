//! CSV reading.
//!
//! This module provides the [`Reader`], the state machine that turns a scalar
//! stream into rows of fields, one row per call.
//!
//! ## Grammar
//!
//! - Fields are separated by the field delimiter and rows by the row
//!   delimiter; both may be several characters long
//! - A field starting with `"` is escaped: it may contain delimiters, and
//!   `""` inside it stands for one `"`
//! - Only a delimiter or the end of input may follow the closing quote
//! - A `"` inside an unescaped field is an error
//! - Characters of the trim set are dropped around unescaped fields
//! - A row delimiter at the start of a row is skipped (blank lines produce
//!   no rows), so a trailing row delimiter never adds an empty row
//! - Every row must have as many fields as the first one
//!
//! ## Usage
//!
//! ```rust
//! use csv_codec::{CsvOptions, Reader};
//!
//! let options = CsvOptions::new().with_has_headers(true);
//! let mut reader = Reader::from_str("id,name\n1,Ann\n2,\"O'Hare, Jr.\"\n", &options).unwrap();
//! assert_eq!(reader.header().unwrap().names(), &["id", "name"]);
//!
//! let rows: Vec<Vec<String>> = reader.collect::<Result<_, _>>().unwrap();
//! assert_eq!(rows[1], vec!["2", "O'Hare, Jr."]);
//! ```
//!
//! A reader that returned an error is failed for good: later calls to
//! [`Reader::read_row`] return [`Error::ReaderFailed`].

use crate::matcher::{DelimiterMatcher, Lookahead};
use crate::scalar::Input;
use crate::{CsvOptions, Encoding, Error, Header, Result, Row, QUOTE};
use std::io::Read;

/// What a delimiter closes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Boundary {
    Field,
    Row,
}

/// How a field ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FieldEnd {
    Field,
    Row,
    Eof,
}

/// The CSV reader.
///
/// Pulls rows out of an in-memory string or a byte stream, strictly in
/// order. Created via [`Reader::from_str`] or [`Reader::from_reader`].
pub struct Reader<'a> {
    input: Lookahead<Input<'a>>,
    field_delimiter: DelimiterMatcher,
    row_delimiter: DelimiterMatcher,
    /// The row delimiter is tried first when the field delimiter is its prefix.
    row_delimiter_first: bool,
    trim: Vec<char>,
    header: Option<Header>,
    expected_fields: Option<usize>,
    row_index: usize,
    failed: bool,
}

impl<'a> Reader<'a> {
    /// Creates a reader over a string.
    ///
    /// When the options ask for a header, the first row is read right away.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid options, or a parse error
    /// if the header row is malformed.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str, options: &CsvOptions) -> Result<Self> {
        Reader::new(Input::from_str(input), options)
    }

    /// Creates a reader over a byte stream.
    ///
    /// The encoding comes from the options, or from the stream's byte order
    /// mark (UTF-8 without one).
    ///
    /// # Errors
    ///
    /// As for [`Reader::from_str`], plus I/O errors while reading the header.
    pub fn from_reader<R: Read + 'a>(reader: R, options: &CsvOptions) -> Result<Self> {
        Reader::new(Input::from_reader(reader, options.encoding), options)
    }

    fn new(input: Input<'a>, options: &CsvOptions) -> Result<Self> {
        options.validate()?;
        let mut reader = Reader {
            input: Lookahead::new(input),
            field_delimiter: DelimiterMatcher::new(&options.field_delimiter),
            row_delimiter: DelimiterMatcher::new(&options.row_delimiter),
            row_delimiter_first: options.field_delimiter.is_prefix_of(&options.row_delimiter),
            trim: options.trim.clone(),
            header: None,
            expected_fields: None,
            row_index: 0,
            failed: false,
        };
        log::debug!(
            "reader created (field delimiter '{}', row delimiter '{}', header {})",
            options.field_delimiter,
            options.row_delimiter,
            options.has_headers
        );
        if options.has_headers {
            match reader.parse_row()? {
                Some(names) => {
                    log::debug!("header row read with {} fields", names.len());
                    reader.header = Some(Header::new(names));
                }
                None => log::debug!("empty input: no header row"),
            }
        }
        Ok(reader)
    }

    /// The header row, if one was configured and the input was not empty.
    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    pub fn header_mut(&mut self) -> Option<&mut Header> {
        self.header.as_mut()
    }

    /// The index the next data row will have.
    pub fn row_index(&self) -> usize {
        self.row_index
    }

    /// The width of every row, once the first row (or header) was read.
    pub fn expected_fields(&self) -> Option<usize> {
        self.expected_fields
    }

    /// The encoding of a byte stream input, once detected.
    pub fn encoding(&self) -> Option<Encoding> {
        match self.input.source() {
            Input::Str(_) => None,
            Input::Stream(decoder) => decoder.encoding(),
        }
    }

    /// Reads the next data row, or `None` at the end of the input.
    ///
    /// # Errors
    ///
    /// Parse errors for malformed input, [`Error::InconsistentRow`] for a
    /// row whose width differs from the first row, I/O errors from the
    /// stream, and [`Error::ReaderFailed`] after any earlier error.
    pub fn read_row(&mut self) -> Result<Option<Row>> {
        if self.failed {
            return Err(Error::ReaderFailed);
        }
        match self.parse_row() {
            Ok(Some(row)) => {
                log::trace!("row {} read with {} fields", self.row_index, row.len());
                self.row_index += 1;
                Ok(Some(row))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                self.failed = true;
                Err(e)
            }
        }
    }

    fn is_trimmed(&self, ch: char) -> bool {
        !self.trim.is_empty() && self.trim.contains(&ch)
    }

    /// Checks whether a delimiter starts at `ch`, consuming it on a match.
    fn boundary(&mut self, ch: char) -> Result<Option<Boundary>> {
        if self.row_delimiter_first {
            if self.row_delimiter.matches(ch, &mut self.input)? {
                return Ok(Some(Boundary::Row));
            }
            if self.field_delimiter.matches(ch, &mut self.input)? {
                return Ok(Some(Boundary::Field));
            }
        } else {
            if self.field_delimiter.matches(ch, &mut self.input)? {
                return Ok(Some(Boundary::Field));
            }
            if self.row_delimiter.matches(ch, &mut self.input)? {
                return Ok(Some(Boundary::Row));
            }
        }
        Ok(None)
    }

    fn parse_row(&mut self) -> Result<Option<Row>> {
        let mut fields: Row = Vec::new();
        loop {
            let ch = match self.input.next()? {
                Some(ch) => ch,
                None if fields.is_empty() => return Ok(None),
                None => {
                    // A field delimiter right before the end of input.
                    fields.push(String::new());
                    break;
                }
            };
            if self.is_trimmed(ch) {
                continue;
            }
            let end = if ch == QUOTE {
                let (field, end) = self.parse_escaped_field(fields.len())?;
                fields.push(field);
                end
            } else {
                match self.boundary(ch)? {
                    Some(Boundary::Field) => {
                        fields.push(String::new());
                        FieldEnd::Field
                    }
                    Some(Boundary::Row) if fields.is_empty() => continue,
                    Some(Boundary::Row) => {
                        fields.push(String::new());
                        FieldEnd::Row
                    }
                    None => {
                        let (field, end) = self.parse_unescaped_field(ch, fields.len())?;
                        fields.push(field);
                        end
                    }
                }
            };
            match end {
                FieldEnd::Field => continue,
                FieldEnd::Row | FieldEnd::Eof => break,
            }
        }
        self.check_width(fields.len())?;
        Ok(Some(fields))
    }

    fn parse_unescaped_field(&mut self, first: char, field_index: usize) -> Result<(String, FieldEnd)> {
        let mut field = String::new();
        field.push(first);
        let end = loop {
            let ch = match self.input.next()? {
                Some(ch) => ch,
                None => break FieldEnd::Eof,
            };
            if ch == QUOTE {
                return Err(Error::parse(
                    self.row_index,
                    field_index,
                    "quotes are only allowed inside escaped fields",
                ));
            }
            match self.boundary(ch)? {
                Some(Boundary::Field) => break FieldEnd::Field,
                Some(Boundary::Row) => break FieldEnd::Row,
                None => field.push(ch),
            }
        };
        if !self.trim.is_empty() {
            let trimmed = field.trim_end_matches(|c| self.trim.contains(&c)).len();
            field.truncate(trimmed);
        }
        Ok((field, end))
    }

    fn parse_escaped_field(&mut self, field_index: usize) -> Result<(String, FieldEnd)> {
        let mut field = String::new();
        loop {
            match self.input.next()? {
                None => {
                    return Err(Error::parse(
                        self.row_index,
                        field_index,
                        "the input ended inside an escaped field",
                    ))
                }
                Some(QUOTE) => match self.input.next()? {
                    Some(QUOTE) => field.push(QUOTE),
                    Some(ch) => {
                        self.input.unread(&[ch]);
                        break;
                    }
                    None => break,
                },
                Some(ch) => field.push(ch),
            }
        }
        loop {
            let ch = match self.input.next()? {
                Some(ch) => ch,
                None => return Ok((field, FieldEnd::Eof)),
            };
            if self.is_trimmed(ch) {
                continue;
            }
            return match self.boundary(ch)? {
                Some(Boundary::Field) => Ok((field, FieldEnd::Field)),
                Some(Boundary::Row) => Ok((field, FieldEnd::Row)),
                None => Err(Error::parse(
                    self.row_index,
                    field_index,
                    "only delimiters or the end of input may follow a closing quote",
                )),
            };
        }
    }

    fn check_width(&mut self, found: usize) -> Result<()> {
        match self.expected_fields {
            None => {
                self.expected_fields = Some(found);
                Ok(())
            }
            Some(expected) if expected == found => Ok(()),
            Some(expected) => Err(Error::InconsistentRow {
                row: self.row_index,
                expected,
                found,
            }),
        }
    }
}

impl Iterator for Reader<'_> {
    type Item = Result<Row>;

    /// Yields rows until the end of input, or until the first error, which
    /// is yielded once.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.read_row().transpose()
    }
}
