//! Error types for CSV reading and writing.
//!
//! Every failure surfaces as one [`Error`] value carrying the row and field
//! position where it happened, whenever one exists.
//!
//! ## Error Categories
//!
//! - **Configuration**: invalid delimiters or header lists, raised when a
//!   reader, writer, source or sink is constructed
//! - **Parse**: malformed input; the reader cannot continue afterwards
//! - **Write**: a write call that breaks the table shape
//! - **Buffer**: random-order access that the chosen buffering strategy
//!   cannot satisfy
//! - **I/O**: failures of the underlying byte stream
//!
//! ## Examples
//!
//! ```rust
//! use csv_codec::{read_rows, CsvOptions, ErrorKind};
//!
//! let err = read_rows("a,b\n1\n", &CsvOptions::new()).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Parse);
//! assert!(err.to_string().contains("expected 2 fields"));
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// The broad category of an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Parse,
    Write,
    Buffer,
    Io,
    Custom,
}

/// All errors raised by this crate.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Invalid reader/writer configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Two header columns share a name, so lookups by name are ambiguous
    #[error("Invalid header: the name '{name}' appears in columns {first} and {second}")]
    DuplicateHeader {
        name: String,
        first: usize,
        second: usize,
    },

    /// Malformed CSV input
    #[error("Parse error at row {row}, field {field}: {msg}")]
    Parse {
        row: usize,
        field: usize,
        msg: String,
    },

    /// A row does not have the same width as the first one
    #[error("Inconsistent row at row {row}: expected {expected} fields, found {found}")]
    InconsistentRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// The reader already failed and cannot be resumed
    #[error("The reader previously failed and cannot continue")]
    ReaderFailed,

    /// More fields were written to a row than the established width
    #[error("Field overflow at row {row}: the row already has {expected} fields")]
    FieldOverflow { row: usize, expected: usize },

    /// An empty row was requested before the row width is known
    #[error("Cannot write an empty row at row {row}: the number of fields is not yet known")]
    UnknownWidth { row: usize },

    /// A position has already been flushed to the output
    #[error("Position (row {row}, field {field}) has already been written")]
    AlreadyWritten { row: usize, field: usize },

    /// The row was discarded by the buffering strategy
    #[error("Expired cache: row {row} was already discarded (oldest retained row is {oldest})")]
    ExpiredCache { row: usize, oldest: usize },

    /// The input ended before the requested row
    #[error("Row index {row} out of bounds: end of file reached after {rows} rows")]
    RowOutOfBounds { row: usize, rows: usize },

    /// The requested field does not exist in its row
    #[error("Field index {field} out of bounds at row {row}: the row has {len} fields")]
    FieldOutOfBounds {
        row: usize,
        field: usize,
        len: usize,
    },

    /// A name-based lookup was attempted without a header
    #[error("No header configured: fields cannot be looked up by name")]
    NoHeader,

    /// A name-based lookup did not match any header column
    #[error("Header name '{0}' not found")]
    NameNotFound(String),

    /// Internal consistency failure when finishing a sink
    #[error("Corrupted buffer: {pending} fields remain after finishing")]
    CorruptedBuffer { pending: usize },

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Custom error, used by the serde front end
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) | Error::DuplicateHeader { .. } => ErrorKind::Configuration,
            Error::Parse { .. } | Error::InconsistentRow { .. } | Error::ReaderFailed => {
                ErrorKind::Parse
            }
            Error::FieldOverflow { .. }
            | Error::UnknownWidth { .. }
            | Error::AlreadyWritten { .. } => ErrorKind::Write,
            Error::ExpiredCache { .. }
            | Error::RowOutOfBounds { .. }
            | Error::FieldOutOfBounds { .. }
            | Error::NoHeader
            | Error::NameNotFound(_)
            | Error::CorruptedBuffer { .. } => ErrorKind::Buffer,
            Error::Io(_) => ErrorKind::Io,
            Error::Custom(_) => ErrorKind::Custom,
        }
    }

    /// Creates a configuration error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use csv_codec::{Error, ErrorKind};
    ///
    /// let err = Error::configuration("the field delimiter is empty");
    /// assert_eq!(err.kind(), ErrorKind::Configuration);
    /// ```
    pub fn configuration(msg: &str) -> Self {
        Error::Configuration(msg.to_string())
    }

    /// Creates a parse error at the given position.
    pub fn parse(row: usize, field: usize, msg: &str) -> Self {
        Error::Parse {
            row,
            field,
            msg: msg.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for stream reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
