//! Basic CSV serialization and deserialization.
//!
//! Run with: cargo run --example simple

use csv_codec::{from_str_with_options, to_string_with_options, CsvOptions};
use serde::{Deserialize, Serialize};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct User {
    id: u32,
    name: String,
    email: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let users = vec![
        User {
            id: 42,
            name: "Alice Johnson".to_string(),
            email: "alice@example.com".to_string(),
        },
        User {
            id: 43,
            name: "Smith, Bob".to_string(),
            email: "bob@example.com".to_string(),
        },
    ];
    let options = CsvOptions::new().with_headers(["id", "name", "email"]);

    // Serialize to CSV
    let csv = to_string_with_options(&users, &options)?;
    println!("CSV output:\n{}", csv);

    // Deserialize back to structs
    let users_back: Vec<User> = from_str_with_options(&csv, &options)?;
    assert_eq!(users, users_back);
    println!("✓ Round-trip successful");

    Ok(())
}
