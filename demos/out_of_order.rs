//! Reading and writing fields in any order with Source and Sink.
//!
//! Run with: cargo run --example out_of_order

use csv_codec::{CsvOptions, DecodingBuffer, EncodingBuffer, Sink, Source};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // Fields arrive last row first, columns by name
    let options = CsvOptions::new()
        .with_headers(["city", "population"])
        .with_encoding_buffer(EncodingBuffer::Assembled);
    let mut sink = Sink::new(&options)?;
    let city = sink.field_index("city")?;
    let population = sink.field_index("population")?;
    let data = [("Lisbon", "545923"), ("Porto", "231800"), ("Braga", "193333")];
    for (row, (name, count)) in data.iter().enumerate().rev() {
        sink.set_field(row, population, *count)?;
        sink.set_field(row, city, *name)?;
    }
    let text = sink.into_string()?;
    println!("Written:\n{}", text);

    // Random access keeps every row
    let reading = CsvOptions::new().with_has_headers(true);
    let mut source = Source::from_str(&text, &reading)?;
    let city = source.field_index("city")?;
    println!("Row 2 city: {}", source.field(2, city)?);
    println!("Row 0 city: {}", source.field(0, city)?);

    // The sequential strategy only keeps the latest row
    let sequential = reading.with_decoding_buffer(DecodingBuffer::Sequential);
    let mut source = Source::from_str(&text, &sequential)?;
    println!("Row 2 city: {}", source.field(2, city)?);
    match source.field(0, city) {
        Ok(value) => println!("Row 0 city: {}", value),
        Err(e) => println!("Row 0 is gone: {}", e),
    }
    println!("{} rows in total", source.number_of_rows()?);

    Ok(())
}
