//! Customizing delimiters, trimming, headers and encodings with CsvOptions.
//!
//! Run with: cargo run --example custom_options

use csv_codec::{read_rows, write_rows, CsvOptions, Delimiter, Encoding, Reader, Writer};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let rows = vec![
        vec!["1", "Widget", "9.99"],
        vec!["2", "Gadget; deluxe", "14.99"],
        vec!["3", "say \"hi\"", "0.50"],
    ];

    // Default format (comma and newline)
    let default = write_rows(&rows, &CsvOptions::new())?;
    println!("Default:\n{}", default);

    // Semicolons and CRLF, with a header
    let european = CsvOptions::new()
        .with_field_delimiter(Delimiter::semicolon())
        .with_row_delimiter(Delimiter::crlf())
        .with_headers(["id", "name", "price"]);
    let text = write_rows(&rows, &european)?;
    println!("Semicolon + CRLF:\n{}", text.replace("\r\n", "\\r\\n\n"));

    // Multi-character delimiters
    let fancy = CsvOptions::new()
        .with_field_delimiter("<|>")
        .with_row_delimiter("<|>\n");
    let text = write_rows(&rows, &fancy)?;
    println!("Multi-character delimiters:\n{}", text);
    assert_eq!(read_rows(&text, &fancy)?, rows);

    // Trimming padded input
    let padded = "  id ,  name  \n 1 , \" spaced \" \n";
    let trimmed = read_rows(padded, &CsvOptions::new().with_trim(&[' ']))?;
    println!("Trimmed: {:?}\n", trimmed);

    // Delimiters inferred from a sample
    let sample = "id\tname\n1\tAnn\n2\tBob\n";
    let inferred = CsvOptions::new().infer_delimiters(sample);
    println!(
        "Inferred field delimiter: '{}'\n",
        inferred.field_delimiter
    );

    // UTF-16 with a byte order mark
    let mut bytes = Vec::new();
    {
        let options = CsvOptions::new()
            .with_encoding(Encoding::Utf16Le)
            .with_bom(true);
        let mut writer = Writer::from_writer(&mut bytes, &options)?;
        for row in &rows {
            writer.write_row(row)?;
        }
        writer.finish()?;
    }
    let mut reader = Reader::from_reader(bytes.as_slice(), &CsvOptions::new())?;
    let first = reader.read_row()?;
    println!(
        "UTF-16 output is {} bytes, detected as {:?}: first row {:?}",
        bytes.len(),
        reader.encoding(),
        first
    );

    Ok(())
}
