//! Delimiter inference.
//!
//! [`Dialect::infer`] guesses the delimiters of a CSV sample. The row
//! delimiter is `\r\n` when the sample contains one and `\n` otherwise. Each
//! candidate field delimiter is then scored by how uniform a table it
//! produces: the number of leading rows read with one consistent width,
//! weighted by that width. A delimiter that never occurs scores zero.

use crate::{CsvOptions, Delimiter, Reader};

const CANDIDATES: [char; 4] = [',', ';', '\t', '|'];
const SAMPLE_ROWS: usize = 32;

/// A pair of inferred delimiters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dialect {
    pub field_delimiter: Delimiter,
    pub row_delimiter: Delimiter,
}

impl Dialect {
    /// Infers the delimiters of `sample`, or `None` if no candidate field
    /// delimiter splits it into more than one column.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use csv_codec::{Delimiter, Dialect};
    ///
    /// let dialect = Dialect::infer("name\tage\nAnn\t31\nBob\t27\n").unwrap();
    /// assert_eq!(dialect.field_delimiter, Delimiter::tab());
    /// assert_eq!(dialect.row_delimiter, Delimiter::lf());
    ///
    /// assert!(Dialect::infer("just one column\n").is_none());
    /// ```
    pub fn infer(sample: &str) -> Option<Dialect> {
        let row_delimiter = if sample.contains("\r\n") {
            Delimiter::crlf()
        } else {
            Delimiter::lf()
        };
        let (score, field_delimiter) = CANDIDATES
            .iter()
            .map(|c| {
                let delimiter = Delimiter::from(*c);
                (score(sample, &delimiter, &row_delimiter), delimiter)
            })
            .fold((0, None), |best, (score, delimiter)| {
                if score > best.0 {
                    (score, Some(delimiter))
                } else {
                    best
                }
            });
        log::debug!(
            "inferred field delimiter {:?} (score {}), row delimiter '{}'",
            field_delimiter,
            score,
            row_delimiter
        );
        field_delimiter.map(|field_delimiter| Dialect {
            field_delimiter,
            row_delimiter,
        })
    }
}

fn score(sample: &str, field: &Delimiter, row: &Delimiter) -> usize {
    let options = CsvOptions::new()
        .with_field_delimiter(field.clone())
        .with_row_delimiter(row.clone());
    let Ok(mut reader) = Reader::from_str(sample, &options) else {
        return 0;
    };
    let mut rows = 0;
    while rows < SAMPLE_ROWS {
        match reader.read_row() {
            Ok(Some(_)) => rows += 1,
            // The sample may end in the middle of a row.
            Ok(None) | Err(_) => break,
        }
    }
    let width = reader.expected_fields().unwrap_or(0);
    rows * width.saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma() {
        let dialect = Dialect::infer("a,b,c\n1,2,3\n").unwrap();
        assert_eq!(dialect.field_delimiter, Delimiter::comma());
    }

    #[test]
    fn test_semicolon_with_commas_in_values() {
        let sample = "name;price\nwidget;1,50\ngadget;2,75\nthing;3\n";
        let dialect = Dialect::infer(sample).unwrap();
        assert_eq!(dialect.field_delimiter, Delimiter::semicolon());
    }

    #[test]
    fn test_crlf_and_pipe() {
        let dialect = Dialect::infer("a|b\r\nc|d\r\n").unwrap();
        assert_eq!(dialect.field_delimiter, Delimiter::pipe());
        assert_eq!(dialect.row_delimiter, Delimiter::crlf());
    }

    #[test]
    fn test_truncated_sample() {
        let dialect = Dialect::infer("a,b\n1,2\n3,\"unfinished").unwrap();
        assert_eq!(dialect.field_delimiter, Delimiter::comma());
    }

    #[test]
    fn test_single_column() {
        assert!(Dialect::infer("x\ny\n").is_none());
        assert!(Dialect::infer("").is_none());
    }
}
