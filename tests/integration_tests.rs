use csv_codec::{
    from_reader, from_str_with_options, read_rows, to_string_with_options, to_writer_with_options,
    write_rows, CsvOptions, DecodingBuffer, Delimiter, Encoding, EncodingBuffer, Error, ErrorKind,
    Reader, Sink, Source, Writer,
};
use serde::{Deserialize, Serialize};
use std::io::{self, Read};

/// Hands out its bytes `step` at a time.
struct Trickle<'a> {
    bytes: &'a [u8],
    step: usize,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.step.min(buf.len()).min(self.bytes.len());
        buf[..n].copy_from_slice(&self.bytes[..n]);
        self.bytes = &self.bytes[n..];
        Ok(n)
    }
}

fn table(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|s| s.to_string()).collect())
        .collect()
}

#[test]
fn test_header_and_quoted_name() {
    let options = CsvOptions::new().with_headers(["id", "name"]);
    let rows = table(&[&["1", "Ann"], &["2", "O'Hare, Jr."]]);

    let text = write_rows(&rows, &options).unwrap();
    assert_eq!(text, "id,name\n1,Ann\n2,\"O'Hare, Jr.\"\n");

    let reading = CsvOptions::new().with_has_headers(true);
    let mut source = Source::from_str(&text, &reading).unwrap();
    assert_eq!(source.field_index("name").unwrap(), 1);
    assert_eq!(source.next_row().unwrap(), Some(rows[0].clone()));
    assert_eq!(source.next_row().unwrap(), Some(rows[1].clone()));
    assert_eq!(source.next_row().unwrap(), None);
}

#[test]
fn test_empty_input_has_no_header_and_no_rows() {
    for has_headers in [false, true] {
        let options = CsvOptions::new().with_has_headers(has_headers);
        let mut reader = Reader::from_str("", &options).unwrap();
        assert!(reader.header().is_none());
        assert_eq!(reader.read_row().unwrap(), None);

        let mut source = Source::from_str("", &options).unwrap();
        assert!(source.headers().is_none());
        assert_eq!(source.number_of_rows().unwrap(), 0);
        assert!(source.is_row_at_end(0).unwrap());
    }
}

#[test]
fn test_crlf_split_across_reads() {
    let options = CsvOptions::new().with_row_delimiter(Delimiter::crlf());
    let bytes = b"a,b\r\nc,d\r\n";
    for step in 1..=bytes.len() {
        let reader = Reader::from_reader(Trickle { bytes, step }, &options).unwrap();
        let rows: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
        assert_eq!(rows, table(&[&["a", "b"], &["c", "d"]]), "step {}", step);
    }
}

#[test]
fn test_out_of_order_encode_matches_in_order() {
    let rows = table(&[&["r0a", "r0b"], &["r1a", "r1b"], &["r2a", "r2b"]]);
    let options = CsvOptions::new().with_headers(["a", "b"]);
    let expected = write_rows(&rows, &options).unwrap();

    for strategy in [EncodingBuffer::Assembled, EncodingBuffer::KeepAll] {
        let mut sink = Sink::new(&options.clone().with_encoding_buffer(strategy)).unwrap();
        for row in [2, 0, 1] {
            for (field, value) in rows[row].iter().enumerate() {
                sink.set_field(row, field, value.as_str()).unwrap();
            }
        }
        assert_eq!(sink.into_string().unwrap(), expected, "{:?}", strategy);
    }
}

#[test]
fn test_sequential_encode_rejects_going_back() {
    let options = CsvOptions::new()
        .with_headers(["a"])
        .with_encoding_buffer(EncodingBuffer::Sequential);
    let mut sink = Sink::new(&options).unwrap();
    sink.set_field(2, 0, "late").unwrap();
    let err = sink.set_field(0, 0, "early").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Write);
    assert_eq!(sink.into_string().unwrap(), "a\n\"\"\n\"\"\nlate\n");
}

#[test]
fn test_decoding_strategies_agree_on_forward_access() {
    let text = "a,b\n1,2\n3,4\n5,6\n";
    let read = |strategy| {
        let options = CsvOptions::new().with_decoding_buffer(strategy);
        let mut source = Source::from_str(text, &options).unwrap();
        let mut values = Vec::new();
        for row in 0..4 {
            for field in 0..2 {
                values.push(source.field(row, field).unwrap().to_string());
            }
        }
        let backward = source.field(1, 0).map(str::to_string);
        (values, backward)
    };
    let (kept, kept_backward) = read(DecodingBuffer::KeepAll);
    let (sequential, sequential_backward) = read(DecodingBuffer::Sequential);
    assert_eq!(kept, sequential);
    assert_eq!(kept_backward.unwrap(), "1");
    assert!(matches!(
        sequential_backward,
        Err(Error::ExpiredCache { row: 1, oldest: 3 })
    ));
}

#[test]
fn test_inconsistent_rows_fail_at_first_offender() {
    let mut reader = Reader::from_str("a,b\nc,d\ne\nf,g\n", &CsvOptions::new()).unwrap();
    assert!(reader.read_row().unwrap().is_some());
    assert!(reader.read_row().unwrap().is_some());
    let err = reader.read_row().unwrap_err();
    assert!(matches!(
        err,
        Error::InconsistentRow {
            row: 2,
            expected: 2,
            found: 1
        }
    ));
    assert!(matches!(reader.read_row(), Err(Error::ReaderFailed)));
}

#[test]
fn test_parse_errors() {
    let options = CsvOptions::new();
    for input in ["\"open", "\"a\"b,c", "ab\"c"] {
        let err = read_rows(input, &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse, "{:?}", input);
    }
}

#[test]
fn test_configuration_errors() {
    let cases = [
        CsvOptions::new().with_field_delimiter(""),
        CsvOptions::new().with_field_delimiter("\n"),
        CsvOptions::new().with_trim(&['"']),
        CsvOptions::new().with_sequential_depth(0),
        CsvOptions::new().with_field_delimiter("\""),
        CsvOptions::new().with_row_delimiter("\"\n"),
        CsvOptions::new()
            .with_field_delimiter("b")
            .with_row_delimiter("aba"),
        CsvOptions::new()
            .with_field_delimiter("aba")
            .with_row_delimiter("a"),
    ];
    for options in &cases {
        assert_eq!(
            Reader::from_str("a", options).err().map(|e| e.kind()),
            Some(ErrorKind::Configuration)
        );
        assert_eq!(
            Writer::new(options).err().map(|e| e.kind()),
            Some(ErrorKind::Configuration)
        );
    }
}

#[test]
fn test_multi_char_delimiters() {
    let options = CsvOptions::new()
        .with_field_delimiter("<|>")
        .with_row_delimiter("<|>\n");
    let rows = table(&[&["a", "b<|c"], &["<|>", "d"]]);
    let text = write_rows(&rows, &options).unwrap();
    assert_eq!(text, "a<|>b<|c<|>\n\"<|>\"<|>d<|>\n");
    assert_eq!(read_rows(&text, &options).unwrap(), rows);
}

#[test]
fn test_trim_and_blank_lines() {
    let options = CsvOptions::new().with_trim(&[' ', '\t']);
    let rows = read_rows("\n  a ,\t\" b \" \n\n c,d\n\n", &options).unwrap();
    assert_eq!(rows, table(&[&["a", " b "], &["c", "d"]]));
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Order {
    order_id: u32,
    customer: String,
    total: f64,
    shipped: bool,
    note: Option<String>,
}

fn orders() -> Vec<Order> {
    vec![
        Order {
            order_id: 1,
            customer: "Ann".to_string(),
            total: 12.5,
            shipped: true,
            note: None,
        },
        Order {
            order_id: 2,
            customer: "O'Hare, Jr.".to_string(),
            total: 0.25,
            shipped: false,
            note: Some("call \"first\"".to_string()),
        },
    ]
}

#[test]
fn test_serde_roundtrip_with_reordered_header() {
    let options = CsvOptions::new().with_headers(["customer", "note", "order_id", "shipped", "total"]);
    let text = to_string_with_options(&orders(), &options).unwrap();
    assert!(text.starts_with("customer,note,order_id,shipped,total\nAnn,,1,true,12.5\n"));
    let back: Vec<Order> = from_str_with_options(&text, &options).unwrap();
    assert_eq!(back, orders());
}

#[test]
fn test_serde_stream_in_utf32() {
    let options = CsvOptions::new()
        .with_headers(["order_id", "customer", "total", "shipped", "note"])
        .with_encoding(Encoding::Utf32Be)
        .with_bom(true);
    let mut bytes = Vec::new();
    to_writer_with_options(&mut bytes, &orders(), &options).unwrap();
    assert_eq!(&bytes[..4], &[0x00, 0x00, 0xFE, 0xFF]);

    let reading = CsvOptions::new().with_has_headers(true);
    let back: Vec<Order> = from_reader(Trickle { bytes: &bytes, step: 3 }, &reading).unwrap();
    assert_eq!(back, orders());
}

#[test]
fn test_inferred_dialect() {
    let sample = "id;label\r\n1;a,b\r\n2;c\r\n";
    let options = CsvOptions::new().infer_delimiters(sample);
    assert_eq!(options.field_delimiter, Delimiter::semicolon());
    assert_eq!(options.row_delimiter, Delimiter::crlf());
    assert_eq!(
        read_rows(sample, &options).unwrap(),
        table(&[&["id", "label"], &["1", "a,b"], &["2", "c"]])
    );
}
