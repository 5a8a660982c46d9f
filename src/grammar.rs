//! CSV Grammar
//!
//! This module documents the CSV dialect read by [`Reader`](crate::Reader)
//! and written by [`Writer`](crate::Writer). It holds no code.
//!
//! # Overview
//!
//! The grammar follows RFC 4180, generalized in three ways:
//!
//! - **Delimiters**: the field and row delimiters are arbitrary non-empty
//!   character sequences instead of `,` and `\r\n`
//! - **Trimming**: an optional set of characters is dropped around fields
//! - **Encodings**: the text may be UTF-8, UTF-16 or UTF-32, with or without a
//!   byte order mark
//!
//! # Structure
//!
//! ```text
//! document = [row *(RD row)] [RD]
//! row      = field *(FD field)
//! field    = escaped / unescaped
//! escaped  = *TRIM QUOTE *(char / RD / FD / QUOTE QUOTE) QUOTE *TRIM
//! unescaped = *char            ; no QUOTE, FD or RD, outer TRIM dropped
//! ```
//!
//! where `FD` and `RD` are the field and row delimiters, `QUOTE` is `"`, and
//! `TRIM` is any character of the trim set.
//!
//! ## Delimiters
//!
//! | Options | Field | Row |
//! |---------|-------|-----|
//! | default | `,` | `\n` |
//! | `with_row_delimiter("\r\n")` | `,` | `\r\n` |
//! | `with_field_delimiter(";")` | `;` | `\n` |
//! | `with_field_delimiter("||")` | `\|\|` | `\n` |
//!
//! Any delimiter is recognized wherever it starts, even when a character of
//! it could also start the other delimiter:
//!
//! - When the field delimiter is a prefix of the row delimiter (for example
//!   `\r` and `\r\n`), the row delimiter is tried first
//! - Otherwise the field delimiter is tried first
//! - A partial match is not a delimiter; its characters belong to the field
//!
//! Neither delimiter may contain the quote. One delimiter may sit inside the
//! other only as its prefix, as its suffix, or by repetition (`\n\n` and
//! `\n`); pairs such as `b` and `aba` are rejected as ambiguous.
//!
//! ```text
//! a||b|c||d        with FD = "||"  ->  ["a", "b|c", "d"]
//! ```
//!
//! ## Escaped Fields
//!
//! A field whose first non-trimmed character is `"` is escaped. It ends at
//! the next lone `"`; a doubled `""` stands for one literal `"`. Between the
//! quotes, delimiters are ordinary characters:
//!
//! ```text
//! "Smith, Bob"           ->  Smith, Bob
//! "say ""hi"""           ->  say "hi"
//! "two                   ->  two\nlines
//! lines"
//! ```
//!
//! After the closing quote only trim characters, a delimiter or the end of
//! input may follow. `"a"b` is a parse error, as is input ending before the
//! closing quote.
//!
//! ## Unescaped Fields
//!
//! An unescaped field runs to the next delimiter or the end of input. It may
//! not contain `"`: `ab"c` is a parse error. Trim characters at either end
//! are dropped; trim characters between other characters are kept.
//!
//! With the trim set `{' '}`, the line `  a b  , " x " ` reads as the fields
//! `a b` and ` x `: quotes protect their content from trimming.
//!
//! ## Rows
//!
//! - A row delimiter at the start of a row is skipped, so blank lines are
//!   not rows and a trailing row delimiter does not add an empty row
//! - A field delimiter at the end of a row or of the input ends an empty
//!   last field: `a,` is `["a", ""]`
//! - An empty input has no rows
//! - Every row must have as many fields as the first row (the header row
//!   when there is one)
//!
//! # Writing
//!
//! The writer produces text the reader accepts with the same options:
//!
//! - A field is escaped when it contains `"` or either delimiter, or starts
//!   or ends with a trim character
//! - A field is also escaped when it would merge with a neighbouring
//!   delimiter: with `||` as field delimiter, `a|` is written as `"a|"`
//! - A row made of a single empty field is written as `""`, so it is not
//!   read back as a blank line
//! - Rows shorter than the established width are padded with empty fields
//! - Every row, the last included, ends with the row delimiter
//!
//! ```text
//! ["plain", "a,b", "say \"hi\""]   ->  plain,"a,b","say ""hi"""
//! [""]                             ->  ""
//! ```
//!
//! # Encodings
//!
//! | Encoding | Byte order mark |
//! |----------|-----------------|
//! | UTF-8 | `EF BB BF` |
//! | UTF-16 LE | `FF FE` |
//! | UTF-16 BE | `FE FF` |
//! | UTF-32 LE | `FF FE 00 00` |
//! | UTF-32 BE | `00 00 FE FF` |
//!
//! Without a configured encoding, the reader detects one from the byte order
//! mark and falls back to UTF-8. The mark is never part of the first field,
//! also when a `U+FEFF` opens in-memory text.
//! The writer emits the mark only when asked to.
