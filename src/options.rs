//! Configuration options for CSV reading and writing.
//!
//! This module provides types to customize the CSV dialect and the buffering
//! behaviour of [`Source`](crate::Source) and [`Sink`](crate::Sink):
//!
//! - [`CsvOptions`]: Main configuration struct
//! - [`Delimiter`]: A field or row delimiter of one or more characters
//! - [`DecodingBuffer`] / [`EncodingBuffer`]: Random-access buffering strategies
//!
//! ## Examples
//!
//! ```rust
//! use csv_codec::{CsvOptions, Delimiter, write_rows};
//!
//! let rows = vec![vec!["a".to_string(), "b".to_string()]];
//!
//! // Semicolons between fields, CRLF between rows
//! let options = CsvOptions::new()
//!     .with_field_delimiter(Delimiter::semicolon())
//!     .with_row_delimiter(Delimiter::crlf());
//! let csv = write_rows(&rows, &options).unwrap();
//! assert_eq!(csv, "a;b\r\n");
//! ```

use crate::{Encoding, Error, Result};
use std::fmt;

/// A field or row delimiter: a non-empty sequence of characters.
///
/// Delimiters may be longer than one character (`"\r\n"`, `"::"`, `"<|>"`).
/// Emptiness is rejected when a reader or writer is constructed.
///
/// # Examples
///
/// ```rust
/// use csv_codec::Delimiter;
///
/// assert_eq!(Delimiter::comma().as_chars(), &[',']);
/// assert_eq!(Delimiter::from("\r\n").len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Delimiter(Vec<char>);

impl Delimiter {
    #[must_use]
    pub fn comma() -> Self {
        Delimiter(vec![','])
    }

    #[must_use]
    pub fn semicolon() -> Self {
        Delimiter(vec![';'])
    }

    #[must_use]
    pub fn tab() -> Self {
        Delimiter(vec!['\t'])
    }

    #[must_use]
    pub fn pipe() -> Self {
        Delimiter(vec!['|'])
    }

    /// Line feed, the default row delimiter.
    #[must_use]
    pub fn lf() -> Self {
        Delimiter(vec!['\n'])
    }

    /// Carriage return followed by line feed.
    #[must_use]
    pub fn crlf() -> Self {
        Delimiter(vec!['\r', '\n'])
    }

    #[must_use]
    pub fn as_chars(&self) -> &[char] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if `other` starts with this delimiter.
    pub(crate) fn is_prefix_of(&self, other: &Delimiter) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl From<&str> for Delimiter {
    fn from(s: &str) -> Self {
        Delimiter(s.chars().collect())
    }
}

impl From<char> for Delimiter {
    fn from(ch: char) -> Self {
        Delimiter(vec![ch])
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in &self.0 {
            write!(f, "{}", ch.escape_default())?;
        }
        Ok(())
    }
}

/// How a [`Source`](crate::Source) retains rows for random-order access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DecodingBuffer {
    /// Every row read is kept, so any earlier row can be revisited.
    #[default]
    KeepAll,
    /// Only the most recent rows are kept (see [`CsvOptions::sequential_depth`]).
    Sequential,
}

/// How a [`Sink`](crate::Sink) holds fields written out of order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EncodingBuffer {
    /// Everything is held in memory and written when the sink finishes.
    KeepAll,
    /// Fields are flushed as soon as every earlier position is known; only
    /// out-of-order fields are held.
    #[default]
    Assembled,
    /// Nothing is held; skipped positions are written as empty fields.
    Sequential,
}

/// Configuration options for CSV reading and writing.
///
/// # Examples
///
/// ```rust
/// use csv_codec::{CsvOptions, Delimiter, DecodingBuffer};
///
/// // Default options: comma, line feed, no header
/// let options = CsvOptions::new();
/// assert!(!options.has_headers);
///
/// // Custom configuration
/// let options = CsvOptions::new()
///     .with_field_delimiter(Delimiter::tab())
///     .with_has_headers(true)
///     .with_trim(&[' '])
///     .with_decoding_buffer(DecodingBuffer::Sequential);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct CsvOptions {
    pub field_delimiter: Delimiter,
    pub row_delimiter: Delimiter,
    /// Whether the first row read is a header.
    pub has_headers: bool,
    /// Header row written before any data row; empty for none.
    pub headers: Vec<String>,
    /// Characters stripped around unescaped fields.
    pub trim: Vec<char>,
    pub decoding_buffer: DecodingBuffer,
    pub encoding_buffer: EncodingBuffer,
    /// Rows retained by [`DecodingBuffer::Sequential`].
    pub sequential_depth: usize,
    /// Byte encoding for streams; `None` detects it on read and uses UTF-8 on write.
    pub encoding: Option<Encoding>,
    /// Whether a byte order mark is written before the first scalar.
    pub bom: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            field_delimiter: Delimiter::comma(),
            row_delimiter: Delimiter::lf(),
            has_headers: false,
            headers: Vec::new(),
            trim: Vec::new(),
            decoding_buffer: DecodingBuffer::default(),
            encoding_buffer: EncodingBuffer::default(),
            sequential_depth: 1,
            encoding: None,
            bom: false,
        }
    }
}

impl CsvOptions {
    /// Creates default options (comma fields, line-feed rows, no header).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field_delimiter(mut self, delimiter: impl Into<Delimiter>) -> Self {
        self.field_delimiter = delimiter.into();
        self
    }

    #[must_use]
    pub fn with_row_delimiter(mut self, delimiter: impl Into<Delimiter>) -> Self {
        self.row_delimiter = delimiter.into();
        self
    }

    /// Treats the first row read as a header.
    #[must_use]
    pub fn with_has_headers(mut self, yes: bool) -> Self {
        self.has_headers = yes;
        self
    }

    /// Sets the header row to write. Also enables header reading.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use csv_codec::{CsvOptions, write_rows};
    ///
    /// let options = CsvOptions::new().with_headers(["id", "name"]);
    /// let csv = write_rows(&[vec!["1".to_string(), "Ann".to_string()]], &options).unwrap();
    /// assert_eq!(csv, "id,name\n1,Ann\n");
    /// ```
    #[must_use]
    pub fn with_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = headers.into_iter().map(Into::into).collect();
        self.has_headers = true;
        self
    }

    #[must_use]
    pub fn with_trim(mut self, trim: &[char]) -> Self {
        self.trim = trim.to_vec();
        self
    }

    #[must_use]
    pub fn with_decoding_buffer(mut self, strategy: DecodingBuffer) -> Self {
        self.decoding_buffer = strategy;
        self
    }

    #[must_use]
    pub fn with_encoding_buffer(mut self, strategy: EncodingBuffer) -> Self {
        self.encoding_buffer = strategy;
        self
    }

    /// Sets how many rows [`DecodingBuffer::Sequential`] retains.
    #[must_use]
    pub fn with_sequential_depth(mut self, depth: usize) -> Self {
        self.sequential_depth = depth;
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    #[must_use]
    pub fn with_bom(mut self, yes: bool) -> Self {
        self.bom = yes;
        self
    }

    /// Replaces both delimiters with the ones inferred from `sample`.
    ///
    /// The options are left unchanged when no candidate fits the sample.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use csv_codec::{CsvOptions, Delimiter};
    ///
    /// let options = CsvOptions::new().infer_delimiters("a;b;c\r\n1;2;3\r\n4;5;6\r\n");
    /// assert_eq!(options.field_delimiter, Delimiter::semicolon());
    /// assert_eq!(options.row_delimiter, Delimiter::crlf());
    /// ```
    #[must_use]
    pub fn infer_delimiters(mut self, sample: &str) -> Self {
        if let Some(dialect) = crate::Dialect::infer(sample) {
            self.field_delimiter = dialect.field_delimiter;
            self.row_delimiter = dialect.row_delimiter;
        }
        self
    }

    /// Checks the configuration, as done when a reader or writer is built.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a delimiter is empty or contains
    /// the quote, the two delimiters are equal or one sits inside the other
    /// ambiguously, the trim set contains the quote or a delimiter's first
    /// character, or the sequential depth is zero.
    pub fn validate(&self) -> Result<()> {
        if self.field_delimiter.is_empty() {
            return Err(Error::configuration("the field delimiter is empty"));
        }
        if self.row_delimiter.is_empty() {
            return Err(Error::configuration("the row delimiter is empty"));
        }
        if self.field_delimiter == self.row_delimiter {
            return Err(Error::Configuration(format!(
                "the field and row delimiters are both '{}'",
                self.field_delimiter
            )));
        }
        for delimiter in [&self.field_delimiter, &self.row_delimiter] {
            if delimiter.as_chars().contains(&crate::QUOTE) {
                return Err(Error::Configuration(format!(
                    "the delimiter '{}' contains the quote",
                    delimiter
                )));
            }
        }
        let (field, row) = (
            self.field_delimiter.as_chars(),
            self.row_delimiter.as_chars(),
        );
        if is_ambiguous(field, row) || is_ambiguous(row, field) {
            return Err(Error::Configuration(format!(
                "the delimiters '{}' and '{}' are ambiguous: one occurs inside the other",
                self.field_delimiter, self.row_delimiter
            )));
        }
        for ch in &self.trim {
            if *ch == crate::QUOTE
                || self.field_delimiter.as_chars().first() == Some(ch)
                || self.row_delimiter.as_chars().first() == Some(ch)
            {
                return Err(Error::Configuration(format!(
                    "the trim set contains '{}', which is the quote or starts a delimiter",
                    ch.escape_default()
                )));
            }
        }
        if self.sequential_depth == 0 {
            return Err(Error::configuration(
                "the sequential buffer must retain at least one row",
            ));
        }
        Ok(())
    }
}

/// True if the shorter delimiter occurs inside the longer one in a way the
/// writer cannot escape around: strictly inside it, or at its end when it
/// is also a prefix, unless the longer is just the shorter repeated.
fn is_ambiguous(short: &[char], long: &[char]) -> bool {
    if short.len() >= long.len() {
        return false;
    }
    let repeated = long.len() % short.len() == 0 && long.chunks(short.len()).all(|c| c == short);
    (1..=long.len() - short.len())
        .filter(|&i| &long[i..i + short.len()] == short)
        .any(|i| i + short.len() < long.len() || (long.starts_with(short) && !repeated))
}
