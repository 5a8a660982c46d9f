//! # csv_codec
//!
//! A streaming CSV reader and writer with random-order access, configurable
//! multi-character delimiters and a Serde front end.
//!
//! ## Key Features
//!
//! - **Any delimiters**: field and row delimiters of any length, such as `,`,
//!   `\r\n` or `||`, including a field delimiter that is a prefix of the row
//!   delimiter
//! - **Streaming**: input is decoded one character at a time from a string or
//!   any `Read`; output is encoded to a string or any `Write`
//! - **Random order**: [`Source`] reads fields by `(row, field)` and [`Sink`]
//!   writes them in any order, with configurable buffering
//! - **Encodings**: UTF-8, UTF-16 and UTF-32 in both byte orders, with byte
//!   order mark detection and emission
//! - **Serde Compatible**: records map onto structs through
//!   `#[derive(Serialize, Deserialize)]`, by header name or by position
//!
//! ## Quick Start
//!
//! ```rust
//! use csv_codec::{read_rows, write_rows, CsvOptions};
//!
//! let options = CsvOptions::new().with_has_headers(true);
//! let rows = read_rows("id,name\n1,Ann\n2,\"Smith, Bob\"\n", &options).unwrap();
//! assert_eq!(rows, vec![vec!["1", "Ann"], vec!["2", "Smith, Bob"]]);
//!
//! let options = CsvOptions::new().with_headers(["id", "name"]);
//! let text = write_rows(&rows, &options).unwrap();
//! assert_eq!(text, "id,name\n1,Ann\n2,\"Smith, Bob\"\n");
//! ```
//!
//! ### Records with Serde
//!
//! ```rust
//! use csv_codec::{from_str_with_options, to_string_with_options, CsvOptions};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Product {
//!     id: u32,
//!     name: String,
//!     price: f64,
//! }
//!
//! let options = CsvOptions::new().with_headers(["id", "name", "price"]);
//! let products = vec![
//!     Product { id: 1, name: "Widget".into(), price: 9.99 },
//!     Product { id: 2, name: "Gadget".into(), price: 14.5 },
//! ];
//! let csv = to_string_with_options(&products, &options).unwrap();
//! assert_eq!(csv, "id,name,price\n1,Widget,9.99\n2,Gadget,14.5\n");
//!
//! let back: Vec<Product> = from_str_with_options(&csv, &options).unwrap();
//! assert_eq!(back, products);
//! ```
//!
//! ### Out-of-order Writes
//!
//! ```rust
//! use csv_codec::{CsvOptions, Sink};
//!
//! let mut sink = Sink::new(&CsvOptions::new().with_headers(["a", "b"])).unwrap();
//! sink.set_field(1, 1, "d").unwrap();
//! sink.set_field(0, 0, "a").unwrap();
//! sink.set_field(1, 0, "c").unwrap();
//! sink.set_field(0, 1, "b").unwrap();
//! assert_eq!(sink.into_string().unwrap(), "a,b\na,b\nc,d\n");
//! ```
//!
//! ## Modules
//!
//! - [`reader`] and [`writer`]: the sequential state machines
//! - [`source`] and [`sink`]: random-order access on top of them
//! - [`options`]: delimiters, headers, trimming, buffering and encoding
//! - [`encoding`]: byte order marks and the streaming decoder
//! - [`dialect`]: delimiter inference from a sample
//! - [`de`] and [`ser`]: the Serde front end
//! - [`grammar`]: the accepted CSV grammar
//! - [`error`]: error types

pub mod de;
pub mod dialect;
pub mod encoding;
pub mod error;
pub mod grammar;
pub mod header;
mod matcher;
pub mod options;
pub mod reader;
mod scalar;
pub mod ser;
pub mod sink;
pub mod source;
pub mod writer;

pub use de::Deserializer;
pub use dialect::Dialect;
pub use encoding::{Decoder, Encoding};
pub use error::{Error, ErrorKind, Result};
pub use header::Header;
pub use options::{CsvOptions, DecodingBuffer, Delimiter, EncodingBuffer};
pub use reader::Reader;
pub use ser::Serializer;
pub use sink::Sink;
pub use source::Source;
pub use writer::Writer;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// The escape character.
pub const QUOTE: char = '"';

/// One decoded row: its fields, in column order.
pub type Row = Vec<String>;

/// Read every data row of a CSV string.
///
/// The header row, when `options.has_headers` is set, is not included.
///
/// # Examples
///
/// ```rust
/// use csv_codec::{read_rows, CsvOptions};
///
/// let options = CsvOptions::new().with_field_delimiter(";");
/// let rows = read_rows("a;b\r\nc;d", &options.with_row_delimiter("\r\n")).unwrap();
/// assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
/// ```
///
/// # Errors
///
/// Invalid options, malformed input, or rows of inconsistent width.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn read_rows(input: &str, options: &CsvOptions) -> Result<Vec<Row>> {
    Reader::from_str(input, options)?.collect()
}

/// Write rows to a CSV string.
///
/// Configured headers are written first. Rows shorter than the header, or
/// than the first row without one, are padded with empty fields.
///
/// # Errors
///
/// Invalid options, or a row wider than the established width.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn write_rows<S: AsRef<str>>(rows: &[Vec<S>], options: &CsvOptions) -> Result<String> {
    let mut writer = Writer::new(options)?;
    for row in rows {
        writer.write_row(row)?;
    }
    writer.into_string()
}

/// Serialize a sequence of records to a CSV string without a header.
///
/// # Examples
///
/// ```rust
/// use csv_codec::to_string;
///
/// let csv = to_string(&[(1, "one"), (2, "two, too")]).unwrap();
/// assert_eq!(csv, "1,one\n2,\"two, too\"\n");
/// ```
///
/// # Errors
///
/// Returns an error if a record cannot be laid out as a row.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &CsvOptions::default())
}

/// Serialize a sequence of records to a CSV string with custom options.
///
/// With configured headers, struct fields and map keys are placed in the
/// column of the same name.
///
/// # Errors
///
/// Returns an error if a record cannot be laid out as a row, or if a field
/// name is not among the headers.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: &CsvOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let mut serializer = Serializer::new(options)?;
    value.serialize(&mut serializer)?;
    serializer.into_string()
}

/// Serialize a sequence of records to a writer.
///
/// # Errors
///
/// As for [`to_string_with_options`], plus any I/O error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, &CsvOptions::default())
}

/// Serialize a sequence of records to a writer with custom options.
///
/// The output is encoded as `options.encoding`, UTF-8 by default.
///
/// # Errors
///
/// As for [`to_string_with_options`], plus any I/O error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(writer: W, value: &T, options: &CsvOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let mut serializer = Serializer::from_writer(writer, options)?;
    value.serialize(&mut serializer)?;
    serializer.finish()
}

/// Deserialize a sequence of records from a CSV string without a header.
///
/// # Examples
///
/// ```rust
/// use csv_codec::from_str;
///
/// let rows: Vec<(u8, String)> = from_str("1,one\n2,two\n").unwrap();
/// assert_eq!(rows[1], (2, "two".to_string()));
/// ```
///
/// # Errors
///
/// Malformed input, or a field that does not parse as the expected type.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_str_with_options(s, &CsvOptions::default())
}

/// Deserialize a sequence of records from a CSV string with custom options.
///
/// When the input has a header row, struct fields are matched to columns by
/// name.
///
/// # Errors
///
/// Malformed input, or a field that does not parse as the expected type.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options<T>(s: &str, options: &CsvOptions) -> Result<T>
where
    T: DeserializeOwned,
{
    let mut deserializer = Deserializer::from_str(s, options)?;
    T::deserialize(&mut deserializer)
}

/// Deserialize a sequence of records from a byte stream.
///
/// The encoding is `options.encoding` when set, and otherwise detected from
/// a byte order mark, defaulting to UTF-8.
///
/// # Errors
///
/// As for [`from_str_with_options`], plus I/O and decoding errors.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(reader: R, options: &CsvOptions) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut deserializer = Deserializer::from_reader(reader, options)?;
    T::deserialize(&mut deserializer)
}
