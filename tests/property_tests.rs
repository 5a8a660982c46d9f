//! Property-based tests for the guarantees of the reader and writer.
//!
//! Tables are drawn from a small alphabet rich in quotes and delimiter
//! characters, so escaping decisions are exercised on most cases.

use csv_codec::{
    read_rows, write_rows, CsvOptions, DecodingBuffer, EncodingBuffer, Error, Reader, Sink, Source,
};
use proptest::prelude::*;

const DELIMITERS: [(&str, &str); 7] = [
    (",", "\n"),
    (";", "\r\n"),
    ("\t", "\r\n"),
    ("::", "\n"),
    ("\r", "\r\n"),
    ("||", "|\n"),
    ("<|>", "<|>\n"),
];

fn field() -> impl Strategy<Value = String> {
    "[ab,;:|<>\"\t\r\n ]{0,6}"
}

/// A rectangular table of at least one row.
fn table() -> impl Strategy<Value = Vec<Vec<String>>> {
    (1usize..5).prop_flat_map(|width| {
        prop::collection::vec(prop::collection::vec(field(), width), 1..6)
    })
}

fn options(index: usize) -> CsvOptions {
    let (field, row) = DELIMITERS[index];
    CsvOptions::new()
        .with_field_delimiter(field)
        .with_row_delimiter(row)
}

proptest! {
    #[test]
    fn prop_roundtrip(rows in table(), index in 0..DELIMITERS.len(), trim in any::<bool>()) {
        let options = if trim {
            options(index).with_trim(&[' '])
        } else {
            options(index)
        };
        let text = write_rows(&rows, &options).unwrap();
        let back = read_rows(&text, &options);
        prop_assert!(back.is_ok(), "{:?} from {:?}", back, text);
        prop_assert_eq!(back.unwrap(), rows);
    }

    #[test]
    fn prop_roundtrip_with_header(rows in table(), index in 0..DELIMITERS.len()) {
        let header: Vec<String> = (0..rows[0].len()).map(|i| format!("col{}", i)).collect();
        let options = options(index).with_headers(header.clone());
        let text = write_rows(&rows, &options).unwrap();

        let mut reader = Reader::from_str(&text, &options).unwrap();
        prop_assert_eq!(reader.header().unwrap().names(), header.as_slice());
        let back: Vec<Vec<String>> = reader.by_ref().collect::<Result<_, _>>().unwrap();
        prop_assert_eq!(back, rows);
    }

    #[test]
    fn prop_plain_fields_are_verbatim(value in "[a-z0-9 .']{0,12}") {
        let text = write_rows(&[vec![value.as_str(), "x"]], &CsvOptions::new()).unwrap();
        prop_assert_eq!(text, format!("{},x\n", value));
    }

    #[test]
    fn prop_quotes_survive(value in "a{0,3}\"[a\"]{0,6}") {
        let text = write_rows(&[vec![value.as_str()]], &CsvOptions::new()).unwrap();
        let inner = &text[1..text.len() - 2];
        prop_assert_eq!(inner.replace("\"\"", "\""), value.clone());
        prop_assert_eq!(read_rows(&text, &CsvOptions::new()).unwrap(), vec![vec![value]]);
    }

    #[test]
    fn prop_inconsistent_width_fails_at_first_offender(
        widths in prop::collection::vec(1usize..4, 1..8)
    ) {
        let text: String = widths
            .iter()
            .map(|w| format!("{}\n", vec!["v"; *w].join(",")))
            .collect();
        let result = read_rows(&text, &CsvOptions::new());
        match widths.iter().position(|w| *w != widths[0]) {
            None => prop_assert_eq!(result.unwrap().len(), widths.len()),
            Some(row) => {
                let err = result.unwrap_err();
                prop_assert!(
                    matches!(
                        err,
                        Error::InconsistentRow { row: r, expected, found }
                            if r == row && expected == widths[0] && found == widths[row]
                    ),
                    "{:?}",
                    err
                );
            }
        }
    }

    #[test]
    fn prop_decoding_strategies_agree(rows in table(), depth in 1usize..4) {
        let text = write_rows(&rows, &CsvOptions::new()).unwrap();
        let mut kept = Source::from_str(&text, &CsvOptions::new()).unwrap();
        let sequential_options = CsvOptions::new()
            .with_decoding_buffer(DecodingBuffer::Sequential)
            .with_sequential_depth(depth);
        let mut sequential = Source::from_str(&text, &sequential_options).unwrap();

        for (r, row) in rows.iter().enumerate() {
            for f in 0..row.len() {
                prop_assert_eq!(kept.field(r, f).unwrap(), sequential.field(r, f).unwrap());
            }
        }
        // The first row is still cached only when the whole table fits.
        prop_assert!(kept.field(0, 0).is_ok());
        prop_assert_eq!(sequential.field(0, 0).is_ok(), rows.len() <= depth);
    }

    #[test]
    fn prop_shuffled_encode_matches_in_order(
        rows in table(),
        keep_all in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let header: Vec<String> = (0..rows[0].len()).map(|i| format!("h{}", i)).collect();
        let options = CsvOptions::new().with_headers(header).with_encoding_buffer(
            if keep_all { EncodingBuffer::KeepAll } else { EncodingBuffer::Assembled },
        );
        let expected = write_rows(&rows, &options).unwrap();

        let mut positions: Vec<(usize, usize)> = rows
            .iter()
            .enumerate()
            .flat_map(|(r, row)| (0..row.len()).map(move |f| (r, f)))
            .collect();
        // Deterministic shuffle from the seed.
        let mut state = seed | 1;
        for i in (1..positions.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            positions.swap(i, (state % (i as u64 + 1)) as usize);
        }

        let mut sink = Sink::new(&options).unwrap();
        for (r, f) in positions {
            sink.set_field(r, f, rows[r][f].as_str()).unwrap();
        }
        prop_assert_eq!(sink.into_string().unwrap(), expected);
    }
}
