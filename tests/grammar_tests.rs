use csv_codec::{read_rows, write_rows, CsvOptions, Delimiter, Encoding, ErrorKind, Reader, Writer};

fn read(input: &str, options: &CsvOptions) -> Vec<Vec<String>> {
    read_rows(input, options).unwrap()
}

#[test]
fn test_partial_delimiter_belongs_to_field() {
    let options = CsvOptions::new().with_field_delimiter("||");
    assert_eq!(read("a||b|c||d", &options), vec![vec!["a", "b|c", "d"]]);
}

#[test]
fn test_row_delimiter_wins_over_its_prefix() {
    let options = CsvOptions::new()
        .with_field_delimiter("\r")
        .with_row_delimiter(Delimiter::crlf());
    assert_eq!(
        read("a\rb\r\nc\rd\r\n", &options),
        vec![vec!["a", "b"], vec!["c", "d"]]
    );
}

#[test]
fn test_field_delimiter_longer_than_row_delimiter() {
    let options = CsvOptions::new()
        .with_field_delimiter("\n\n")
        .with_row_delimiter("\n");
    let rows = vec![vec!["a", ""], vec!["", "b"]];
    let text = write_rows(&rows, &options).unwrap();
    assert_eq!(read(&text, &options), rows);
}

#[test]
fn test_escaped_field_examples() {
    let options = CsvOptions::new();
    assert_eq!(
        read("\"Smith, Bob\",\"say \"\"hi\"\"\",\"two\nlines\"\n", &options),
        vec![vec!["Smith, Bob", "say \"hi\"", "two\nlines"]]
    );
}

#[test]
fn test_trimming_example() {
    let options = CsvOptions::new().with_trim(&[' ']);
    assert_eq!(read("  a b  , \" x \" ", &options), vec![vec!["a b", " x "]]);
}

#[test]
fn test_trailing_field_delimiter() {
    let options = CsvOptions::new();
    assert_eq!(read("a,", &options), vec![vec!["a", ""]]);
    assert_eq!(read("a,\nb,c\n", &options), vec![vec!["a", ""], vec!["b", "c"]]);
}

#[test]
fn test_rejected_inputs() {
    let options = CsvOptions::new();
    for input in ["\"a\"b", "\"a", "ab\"c", "a,b\nc\n"] {
        let err = read_rows(input, &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse, "{:?}", input);
    }
}

#[test]
fn test_writing_examples() {
    let options = CsvOptions::new();
    assert_eq!(
        write_rows(&[vec!["plain", "a,b", "say \"hi\""]], &options).unwrap(),
        "plain,\"a,b\",\"say \"\"hi\"\"\"\n"
    );
    assert_eq!(write_rows(&[vec![""]], &options).unwrap(), "\"\"\n");
    assert_eq!(read("\"\"\n", &options), vec![vec![""]]);

    let options = CsvOptions::new().with_field_delimiter("||");
    assert_eq!(
        write_rows(&[vec!["a|", "b"]], &options).unwrap(),
        "\"a|\"||b\n"
    );
}

#[test]
fn test_byte_order_marks() {
    let cases = [
        (Encoding::Utf8, vec![0xEF, 0xBB, 0xBF]),
        (Encoding::Utf16Le, vec![0xFF, 0xFE]),
        (Encoding::Utf16Be, vec![0xFE, 0xFF]),
        (Encoding::Utf32Le, vec![0xFF, 0xFE, 0x00, 0x00]),
        (Encoding::Utf32Be, vec![0x00, 0x00, 0xFE, 0xFF]),
    ];
    for (encoding, bom) in cases {
        assert_eq!(encoding.bom(), bom.as_slice());

        let mut bytes = Vec::new();
        {
            let options = CsvOptions::new().with_encoding(encoding).with_bom(true);
            let mut writer = Writer::from_writer(&mut bytes, &options).unwrap();
            writer.write_row(&["ä", "b"]).unwrap();
            writer.finish().unwrap();
        }
        assert!(bytes.starts_with(&bom), "{:?}", encoding);

        let reader = Reader::from_reader(bytes.as_slice(), &CsvOptions::new()).unwrap();
        let rows: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
        assert_eq!(rows, vec![vec!["ä", "b"]], "{:?}", encoding);
    }
}

#[test]
fn test_missing_bom_defaults_to_utf8() {
    let mut reader = Reader::from_reader("ä,ö\n".as_bytes(), &CsvOptions::new()).unwrap();
    assert_eq!(reader.encoding(), None);
    assert_eq!(reader.read_row().unwrap(), Some(vec!["ä".to_string(), "ö".to_string()]));
    assert_eq!(reader.encoding(), Some(Encoding::Utf8));
}
