//! Random-order writes over a sequential writer.
//!
//! A [`Writer`] can only append the next field of the current row. [`Sink`]
//! accepts fields addressed by `(row, field)` in any order, writes each one
//! as soon as every position before it is known, and holds the rest according
//! to its [`EncodingBuffer`] strategy:
//!
//! - [`EncodingBuffer::Assembled`] writes through whenever the position is the
//!   writer's next one, then drains every held field that became writable
//! - [`EncodingBuffer::KeepAll`] holds everything until [`Sink::finish`]
//! - [`EncodingBuffer::Sequential`] holds nothing: skipped positions are
//!   written as empty fields and going back is an error
//!
//! [`Sink::finish`] writes whatever is still held in row, then field, order,
//! filling every position never set with an empty field, so the output is
//! always rectangular.
//!
//! ## Examples
//!
//! ```rust
//! use csv_codec::{CsvOptions, Sink};
//!
//! let options = CsvOptions::new().with_headers(["id", "name"]);
//! let mut sink = Sink::new(&options).unwrap();
//! let name = sink.field_index("name").unwrap();
//!
//! sink.set_field(1, name, "Bob").unwrap();
//! sink.set_field(0, 0, "1").unwrap();
//! sink.set_field(1, 0, "2").unwrap();
//! sink.set_field(0, name, "Ann").unwrap();
//! assert_eq!(sink.into_string().unwrap(), "id,name\n1,Ann\n2,Bob\n");
//! ```

use crate::{CsvOptions, EncodingBuffer, Error, Header, Result, Writer};
use std::collections::BTreeMap;
use std::io::Write;

/// Field buffer in front of a [`Writer`].
pub struct Sink<'a> {
    writer: Writer<'a>,
    strategy: EncodingBuffer,
    header: Option<Header>,
    pending: BTreeMap<usize, BTreeMap<usize, String>>,
    /// Number of fields in `pending`.
    held: usize,
    /// One past the highest field index ever set.
    widest: usize,
    finished: bool,
}

impl Sink<'static> {
    /// Creates a sink producing a `String`.
    ///
    /// # Errors
    ///
    /// As for [`Writer::new`].
    pub fn new(options: &CsvOptions) -> Result<Self> {
        Ok(Sink::with_writer(Writer::new(options)?, options))
    }
}

impl<'a> Sink<'a> {
    /// Creates a sink encoding into a byte stream.
    ///
    /// # Errors
    ///
    /// As for [`Writer::from_writer`].
    pub fn from_writer<W: Write + 'a>(writer: W, options: &CsvOptions) -> Result<Self> {
        Ok(Sink::with_writer(Writer::from_writer(writer, options)?, options))
    }

    fn with_writer(writer: Writer<'a>, options: &CsvOptions) -> Self {
        log::debug!("sink created with {:?} buffering", options.encoding_buffer);
        Sink {
            writer,
            strategy: options.encoding_buffer,
            header: (!options.headers.is_empty()).then(|| Header::new(options.headers.clone())),
            pending: BTreeMap::new(),
            held: 0,
            widest: 0,
            finished: false,
        }
    }

    /// The column index of a configured header name.
    ///
    /// # Errors
    ///
    /// [`Error::NoHeader`] without configured headers,
    /// [`Error::DuplicateHeader`] if names repeat, [`Error::NameNotFound`]
    /// for an unknown name.
    pub fn field_index(&mut self, name: &str) -> Result<usize> {
        self.header.as_mut().ok_or(Error::NoHeader)?.index_of(name)
    }

    /// Sets the field at `(row, field)`.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyWritten`] for a position already flushed to the
    /// writer, [`Error::FieldOverflow`] past the established row width, and
    /// any error of the underlying writer.
    pub fn set_field(&mut self, row: usize, field: usize, value: impl Into<String>) -> Result<()> {
        if self.finished {
            return Err(Error::custom("the sink is already finished"));
        }
        let (next_row, next_field) = (self.writer.row_index(), self.writer.field_index());
        if row < next_row || (row == next_row && field < next_field) {
            return Err(Error::AlreadyWritten { row, field });
        }
        if let Some(expected) = self.writer.expected_fields() {
            if field >= expected {
                return Err(Error::FieldOverflow { row, expected });
            }
        }
        self.widest = self.widest.max(field + 1);
        let value = value.into();
        match self.strategy {
            EncodingBuffer::KeepAll => self.hold(row, field, value),
            EncodingBuffer::Sequential => {
                self.skip_to(row, field)?;
                self.write_next(&value)?;
            }
            EncodingBuffer::Assembled => {
                if row == next_row && field == next_field {
                    self.write_next(&value)?;
                    self.drain()?;
                } else {
                    self.hold(row, field, value);
                }
            }
        }
        Ok(())
    }

    fn hold(&mut self, row: usize, field: usize, value: String) {
        if self
            .pending
            .entry(row)
            .or_default()
            .insert(field, value)
            .is_none()
        {
            self.held += 1;
        }
    }

    /// Writes the writer's next field and ends the row once it is full.
    fn write_next(&mut self, value: &str) -> Result<()> {
        self.writer.write_field(value)?;
        if self.writer.expected_fields() == Some(self.writer.field_index()) {
            self.writer.end_row()?;
        }
        Ok(())
    }

    /// Writes held fields for as long as one sits at the writer's next position.
    fn drain(&mut self) -> Result<()> {
        loop {
            let row = self.writer.row_index();
            let field = self.writer.field_index();
            let Some(fields) = self.pending.get_mut(&row) else {
                return Ok(());
            };
            let Some(value) = fields.remove(&field) else {
                return Ok(());
            };
            if fields.is_empty() {
                self.pending.remove(&row);
            }
            self.held -= 1;
            log::trace!("held field ({}, {}) written", row, field);
            self.write_next(&value)?;
        }
    }

    /// Moves the writer to `(row, field)`, writing empty fields on the way.
    fn skip_to(&mut self, row: usize, field: usize) -> Result<()> {
        if self.writer.row_index() < row && self.writer.field_index() == 0 {
            // Skipped rows need a width before anything fixed one.
            self.writer.establish_width(field + 1);
        }
        while self.writer.row_index() < row {
            self.writer.end_row()?;
        }
        while self.writer.field_index() < field {
            self.writer.write_field("")?;
        }
        Ok(())
    }

    /// Writes everything still held and flushes the output.
    ///
    /// Positions never set become empty fields, and rows never set become
    /// empty rows. Without a header or a completed row, the row width is the
    /// highest field index set plus one. Calling it again does nothing.
    ///
    /// # Errors
    ///
    /// Any error of the underlying writer, or [`Error::CorruptedBuffer`] if
    /// held fields remain after flushing.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        let width = self.widest.max(self.writer.field_index());
        self.writer.establish_width(width);

        while let Some((row, fields)) = self.pending.pop_first() {
            while self.writer.row_index() < row {
                self.writer.end_row()?;
            }
            for (field, value) in fields {
                while self.writer.field_index() < field {
                    self.writer.write_field("")?;
                }
                self.writer.write_field(&value)?;
                self.held -= 1;
            }
        }
        if self.writer.field_index() > 0 {
            self.writer.end_row()?;
        }
        if self.held != 0 {
            return Err(Error::CorruptedBuffer { pending: self.held });
        }
        log::debug!("sink finished after {} rows", self.writer.row_index());
        self.writer.finish()
    }

    /// Finishes the sink and returns the text of an in-memory output.
    ///
    /// # Errors
    ///
    /// As for [`Sink::finish`]; a custom error for a stream output.
    pub fn into_string(mut self) -> Result<String> {
        self.finish()?;
        self.writer.take_string()
    }
}

impl Drop for Sink<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            log::warn!("failed to finish the CSV sink on drop: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn options(strategy: EncodingBuffer) -> CsvOptions {
        CsvOptions::new().with_encoding_buffer(strategy)
    }

    #[test]
    fn test_assembled_writes_through_in_order() {
        let mut sink = Sink::new(&options(EncodingBuffer::Assembled)).unwrap();
        sink.set_field(0, 0, "a").unwrap();
        sink.set_field(0, 1, "b").unwrap();
        assert_eq!(sink.held, 0);
        assert_eq!(sink.into_string().unwrap(), "a,b\n");
    }

    #[test]
    fn test_assembled_late_field_unblocks_queue() {
        let opts = options(EncodingBuffer::Assembled).with_headers(["x", "y"]);
        let mut sink = Sink::new(&opts).unwrap();
        sink.set_field(1, 0, "c").unwrap();
        sink.set_field(0, 1, "b").unwrap();
        sink.set_field(1, 1, "d").unwrap();
        assert_eq!(sink.held, 3);
        sink.set_field(0, 0, "a").unwrap();
        assert_eq!(sink.held, 0);
        assert_eq!(sink.writer.row_index(), 2);
        assert_eq!(sink.into_string().unwrap(), "x,y\na,b\nc,d\n");
    }

    #[test]
    fn test_rewrite_is_rejected() {
        let opts = options(EncodingBuffer::Assembled).with_headers(["x", "y"]);
        let mut sink = Sink::new(&opts).unwrap();
        sink.set_field(0, 0, "a").unwrap();
        let err = sink.set_field(0, 0, "again").unwrap_err();
        assert!(matches!(err, Error::AlreadyWritten { row: 0, field: 0 }));
        assert_eq!(err.kind(), ErrorKind::Write);
        assert!(matches!(
            sink.set_field(3, 2, "wide"),
            Err(Error::FieldOverflow { row: 3, expected: 2 })
        ));
    }

    #[test]
    fn test_finish_fills_gaps() {
        let mut sink = Sink::new(&options(EncodingBuffer::Assembled)).unwrap();
        sink.set_field(0, 0, "a").unwrap();
        sink.set_field(2, 2, "z").unwrap();
        sink.set_field(1, 1, "m").unwrap();
        assert_eq!(sink.into_string().unwrap(), "a,,\n,m,\n,,z\n");
    }

    #[test]
    fn test_keep_all_holds_until_finish() {
        let mut sink = Sink::new(&options(EncodingBuffer::KeepAll)).unwrap();
        sink.set_field(0, 0, "a").unwrap();
        sink.set_field(0, 0, "b").unwrap();
        sink.set_field(0, 1, "c").unwrap();
        assert_eq!(sink.held, 2);
        assert_eq!(sink.writer.row_index(), 0);
        assert_eq!(sink.into_string().unwrap(), "b,c\n");
    }

    #[test]
    fn test_sequential_skips_forward() {
        let opts = options(EncodingBuffer::Sequential).with_headers(["x", "y", "z"]);
        let mut sink = Sink::new(&opts).unwrap();
        sink.set_field(0, 1, "b").unwrap();
        sink.set_field(2, 0, "c").unwrap();
        assert!(matches!(
            sink.set_field(1, 2, "late"),
            Err(Error::AlreadyWritten { row: 1, field: 2 })
        ));
        assert_eq!(sink.into_string().unwrap(), "x,y,z\n,b,\n,,\nc,,\n");
    }

    #[test]
    fn test_sequential_skips_rows_without_header() {
        let mut sink = Sink::new(&options(EncodingBuffer::Sequential)).unwrap();
        sink.set_field(1, 0, "x").unwrap();
        assert_eq!(sink.into_string().unwrap(), "\"\"\nx\n");

        let mut sink = Sink::new(&options(EncodingBuffer::Sequential)).unwrap();
        sink.set_field(1, 1, "y").unwrap();
        assert_eq!(sink.into_string().unwrap(), ",\n,y\n");
    }

    #[test]
    fn test_header_lookup() {
        let mut sink = Sink::new(&CsvOptions::new()).unwrap();
        assert!(matches!(sink.field_index("a"), Err(Error::NoHeader)));

        let opts = CsvOptions::new().with_headers(["a", "a"]);
        let mut sink = Sink::new(&opts).unwrap();
        assert!(matches!(
            sink.field_index("a"),
            Err(Error::DuplicateHeader { .. })
        ));
    }

    #[test]
    fn test_drop_flushes_held_fields() {
        let mut bytes = Vec::new();
        {
            let mut sink = Sink::from_writer(&mut bytes, &CsvOptions::new()).unwrap();
            sink.set_field(1, 0, "second").unwrap();
            sink.set_field(0, 0, "first").unwrap();
        }
        assert_eq!(bytes, b"first\nsecond\n");
    }

    #[test]
    fn test_finished_sink_rejects_writes() {
        let mut sink = Sink::new(&CsvOptions::new()).unwrap();
        sink.set_field(0, 0, "a").unwrap();
        sink.finish().unwrap();
        assert_eq!(
            sink.set_field(5, 0, "b").unwrap_err().kind(),
            ErrorKind::Custom
        );
    }
}
