//! Random-order access over a sequential reader.
//!
//! A [`Reader`] can only move forward, one row at a time. [`Source`] lets
//! callers ask for any `(row, field)` position: it drives the reader forward
//! as far as needed and caches rows according to its [`DecodingBuffer`]
//! strategy:
//!
//! - [`DecodingBuffer::KeepAll`] keeps every row, so any earlier row can be
//!   read again
//! - [`DecodingBuffer::Sequential`] keeps only the last
//!   [`sequential_depth`](crate::CsvOptions::sequential_depth) rows; asking
//!   for an older one is an [`Error::ExpiredCache`]
//!
//! ## Examples
//!
//! ```rust
//! use csv_codec::{CsvOptions, Source};
//!
//! let options = CsvOptions::new().with_has_headers(true);
//! let mut source = Source::from_str("id,name\n1,Ann\n2,Bob\n", &options).unwrap();
//!
//! let name = source.field_index("name").unwrap();
//! assert_eq!(source.field(1, name).unwrap(), "Bob");
//! assert_eq!(source.field(0, name).unwrap(), "Ann");
//! assert_eq!(source.number_of_rows().unwrap(), 2);
//! ```

use crate::{CsvOptions, DecodingBuffer, Error, Reader, Result, Row};
use std::collections::VecDeque;
use std::io::Read;

/// Row cache in front of a [`Reader`].
pub struct Source<'a> {
    reader: Reader<'a>,
    strategy: DecodingBuffer,
    depth: usize,
    rows: VecDeque<Row>,
    /// Index of `rows[0]`.
    first_cached: usize,
    /// Index of the row returned by the next [`Source::next_row`] call.
    next_row: usize,
    at_end: bool,
}

impl<'a> Source<'a> {
    /// Creates a source over a string.
    ///
    /// # Errors
    ///
    /// As for [`Reader::from_str`].
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str, options: &CsvOptions) -> Result<Self> {
        Ok(Source::new(Reader::from_str(input, options)?, options))
    }

    /// Creates a source over a byte stream.
    ///
    /// # Errors
    ///
    /// As for [`Reader::from_reader`].
    pub fn from_reader<R: Read + 'a>(reader: R, options: &CsvOptions) -> Result<Self> {
        Ok(Source::new(Reader::from_reader(reader, options)?, options))
    }

    /// Wraps an existing reader that has not produced any data row yet.
    pub fn new(reader: Reader<'a>, options: &CsvOptions) -> Self {
        log::debug!(
            "source created with {:?} buffering (depth {})",
            options.decoding_buffer,
            options.sequential_depth
        );
        Source {
            first_cached: reader.row_index(),
            reader,
            strategy: options.decoding_buffer,
            depth: options.sequential_depth.max(1),
            rows: VecDeque::new(),
            next_row: 0,
            at_end: false,
        }
    }

    /// The header names, if the input has a header row.
    pub fn headers(&self) -> Option<&[String]> {
        self.reader.header().map(|h| h.names())
    }

    /// The column index of a header name.
    ///
    /// # Errors
    ///
    /// [`Error::NoHeader`] without a header row, [`Error::DuplicateHeader`]
    /// if names repeat, [`Error::NameNotFound`] for an unknown name.
    pub fn field_index(&mut self, name: &str) -> Result<usize> {
        self.reader
            .header_mut()
            .ok_or(Error::NoHeader)?
            .index_of(name)
    }

    fn cache(&mut self, row: Row) {
        self.rows.push_back(row);
        if self.strategy == DecodingBuffer::Sequential && self.rows.len() > self.depth {
            self.rows.pop_front();
            self.first_cached += 1;
            log::trace!("row {} evicted from the cache", self.first_cached - 1);
        }
    }

    /// Reads one more row into the cache. Returns false at the end of input.
    fn advance(&mut self) -> Result<bool> {
        if self.at_end {
            return Ok(false);
        }
        match self.reader.read_row()? {
            Some(row) => {
                self.cache(row);
                Ok(true)
            }
            None => {
                self.at_end = true;
                log::debug!("end of input after {} rows", self.reader.row_index());
                Ok(false)
            }
        }
    }

    /// Returns the row at `index`, reading forward as needed.
    ///
    /// # Errors
    ///
    /// [`Error::ExpiredCache`] for a row discarded by the sequential
    /// strategy, [`Error::RowOutOfBounds`] past the last row, and any error
    /// of the underlying reader.
    pub fn row(&mut self, index: usize) -> Result<&[String]> {
        if index < self.first_cached {
            return Err(Error::ExpiredCache {
                row: index,
                oldest: self.first_cached,
            });
        }
        while index >= self.reader.row_index() {
            if !self.advance()? {
                return Err(Error::RowOutOfBounds {
                    row: index,
                    rows: self.reader.row_index(),
                });
            }
        }
        // Reading ahead may have evicted the row under a shallow cache.
        if index < self.first_cached {
            return Err(Error::ExpiredCache {
                row: index,
                oldest: self.first_cached,
            });
        }
        Ok(&self.rows[index - self.first_cached])
    }

    /// Returns the field at `(row, field)`.
    ///
    /// # Errors
    ///
    /// As for [`Source::row`], plus [`Error::FieldOutOfBounds`].
    pub fn field(&mut self, row: usize, field: usize) -> Result<&str> {
        let values = self.row(row)?;
        let len = values.len();
        values
            .get(field)
            .map(String::as_str)
            .ok_or(Error::FieldOutOfBounds { row, field, len })
    }

    /// Returns the next row in order, or `None` after the last one.
    ///
    /// # Errors
    ///
    /// As for [`Source::row`], except that reaching the end is not an error.
    pub fn next_row(&mut self) -> Result<Option<Row>> {
        let index = self.next_row;
        match self.row(index) {
            Ok(row) => {
                let row = row.to_vec();
                self.next_row += 1;
                Ok(Some(row))
            }
            Err(Error::RowOutOfBounds { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Returns true if there is no row at `index`.
    ///
    /// # Errors
    ///
    /// Any error of the underlying reader while reading ahead.
    pub fn is_row_at_end(&mut self, index: usize) -> Result<bool> {
        while index >= self.reader.row_index() {
            if !self.advance()? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// The total number of data rows. Reads the whole input.
    ///
    /// # Errors
    ///
    /// Any error of the underlying reader.
    pub fn number_of_rows(&mut self) -> Result<usize> {
        while self.advance()? {}
        Ok(self.reader.row_index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    const DATA: &str = "a,b\n1,2\n3,4\n5,6\n";

    fn source(strategy: DecodingBuffer) -> Source<'static> {
        let options = CsvOptions::new()
            .with_has_headers(true)
            .with_decoding_buffer(strategy);
        Source::from_str(DATA, &options).unwrap()
    }

    #[test]
    fn test_keep_all_random_order() {
        let mut s = source(DecodingBuffer::KeepAll);
        assert_eq!(s.field(2, 1).unwrap(), "6");
        assert_eq!(s.field(0, 0).unwrap(), "1");
        assert_eq!(s.field(1, 1).unwrap(), "4");
        assert_eq!(s.field(2, 0).unwrap(), "5");
    }

    #[test]
    fn test_sequential_rejects_backward_access() {
        let mut s = source(DecodingBuffer::Sequential);
        assert_eq!(s.field(0, 1).unwrap(), "2");
        assert_eq!(s.field(2, 0).unwrap(), "5");
        assert_eq!(s.field(2, 1).unwrap(), "6");
        let err = s.field(1, 0).unwrap_err();
        assert!(matches!(err, Error::ExpiredCache { row: 1, oldest: 2 }));
        assert_eq!(err.kind(), ErrorKind::Buffer);
    }

    #[test]
    fn test_sequential_depth() {
        let options = CsvOptions::new()
            .with_decoding_buffer(DecodingBuffer::Sequential)
            .with_sequential_depth(2);
        let mut s = Source::from_str("x\ny\nz\n", &options).unwrap();
        assert_eq!(s.field(2, 0).unwrap(), "z");
        assert_eq!(s.field(1, 0).unwrap(), "y");
        assert!(s.field(0, 0).is_err());
    }

    #[test]
    fn test_out_of_bounds() {
        let mut s = source(DecodingBuffer::KeepAll);
        assert!(matches!(
            s.field(3, 0),
            Err(Error::RowOutOfBounds { row: 3, rows: 3 })
        ));
        assert!(matches!(
            s.field(0, 2),
            Err(Error::FieldOutOfBounds {
                row: 0,
                field: 2,
                len: 2
            })
        ));
    }

    #[test]
    fn test_row_counting() {
        let mut s = source(DecodingBuffer::Sequential);
        assert!(!s.is_row_at_end(2).unwrap());
        assert!(s.is_row_at_end(3).unwrap());
        assert_eq!(s.number_of_rows().unwrap(), 3);
    }

    #[test]
    fn test_next_row() {
        let mut s = source(DecodingBuffer::Sequential);
        assert_eq!(s.next_row().unwrap(), Some(vec!["1".into(), "2".into()]));
        assert_eq!(s.next_row().unwrap(), Some(vec!["3".into(), "4".into()]));
        assert_eq!(s.next_row().unwrap(), Some(vec!["5".into(), "6".into()]));
        assert_eq!(s.next_row().unwrap(), None);
        assert_eq!(s.next_row().unwrap(), None);
    }

    #[test]
    fn test_header_lookup() {
        let mut s = source(DecodingBuffer::KeepAll);
        assert_eq!(s.headers().unwrap(), &["a", "b"]);
        assert_eq!(s.field_index("b").unwrap(), 1);
        assert!(matches!(s.field_index("c"), Err(Error::NameNotFound(_))));

        let mut plain = Source::from_str(DATA, &CsvOptions::new()).unwrap();
        assert!(matches!(plain.field_index("a"), Err(Error::NoHeader)));
        assert_eq!(plain.field(0, 0).unwrap(), "a");
    }

    #[test]
    fn test_duplicate_header_names() {
        let options = CsvOptions::new().with_has_headers(true);
        let mut s = Source::from_str("k,k\n1,2\n", &options).unwrap();
        assert!(matches!(
            s.field_index("k"),
            Err(Error::DuplicateHeader { .. })
        ));
        assert_eq!(s.field(0, 1).unwrap(), "2");
    }

    #[test]
    fn test_parse_error_surfaces() {
        let mut s = Source::from_str("a,b\nc\n", &CsvOptions::new()).unwrap();
        assert_eq!(s.field(0, 0).unwrap(), "a");
        assert!(matches!(s.field(1, 0), Err(Error::InconsistentRow { .. })));
        assert!(matches!(s.field(1, 0), Err(Error::ReaderFailed)));
    }
}
