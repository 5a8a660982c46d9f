//! Scalar sources and sinks.
//!
//! The reader pulls `char`s from an [`Input`]; the writer pushes `char`s into
//! an [`Output`]. Both are closed enums over an in-memory string and an
//! encoded byte stream, so neither the grammar nor the buffers care where the
//! text lives.

use crate::encoding::Decoder;
use crate::{Encoding, Result};
use std::io::{Read, Write};
use std::str::Chars;

const FLUSH_THRESHOLD: usize = 8 * 1024;

/// Where the reader pulls its scalars from.
pub enum Input<'a> {
    Str(Chars<'a>),
    Stream(Decoder<Box<dyn Read + 'a>>),
}

impl<'a> Input<'a> {
    #[allow(clippy::should_implement_trait)]
    /// A leading `U+FEFF` is a byte order mark, not content.
    pub fn from_str(s: &'a str) -> Self {
        Input::Str(s.strip_prefix('\u{FEFF}').unwrap_or(s).chars())
    }

    pub fn from_reader<R: Read + 'a>(reader: R, encoding: Option<Encoding>) -> Self {
        Input::Stream(Decoder::new(Box::new(reader), encoding))
    }
}

impl Iterator for Input<'_> {
    type Item = Result<char>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Input::Str(chars) => chars.next().map(Ok),
            Input::Stream(decoder) => decoder.next(),
        }
    }
}

/// Where the writer pushes its scalars to.
pub enum Output<'a> {
    Memory(String),
    Stream {
        writer: Box<dyn Write + 'a>,
        encoding: Encoding,
        buffer: Vec<u8>,
    },
}

impl<'a> Output<'a> {
    pub fn memory() -> Self {
        Output::Memory(String::with_capacity(256))
    }

    pub fn stream<W: Write + 'a>(writer: W, encoding: Encoding) -> Self {
        Output::Stream {
            writer: Box::new(writer),
            encoding,
            buffer: Vec::with_capacity(FLUSH_THRESHOLD),
        }
    }

    /// Writes the byte order mark (`U+FEFF` for in-memory text).
    pub fn write_bom(&mut self) -> Result<()> {
        match self {
            Output::Memory(text) => text.push('\u{FEFF}'),
            Output::Stream {
                encoding, buffer, ..
            } => buffer.extend_from_slice(encoding.bom()),
        }
        Ok(())
    }

    pub fn write_char(&mut self, ch: char) -> Result<()> {
        match self {
            Output::Memory(text) => text.push(ch),
            Output::Stream {
                writer,
                encoding,
                buffer,
            } => {
                encoding.encode_char(ch, buffer);
                if buffer.len() >= FLUSH_THRESHOLD {
                    writer.write_all(buffer)?;
                    buffer.clear();
                }
            }
        }
        Ok(())
    }

    pub fn write_chars(&mut self, chars: &[char]) -> Result<()> {
        for ch in chars {
            self.write_char(*ch)?;
        }
        Ok(())
    }

    /// Pushes everything buffered to the underlying writer.
    pub fn finish(&mut self) -> Result<()> {
        if let Output::Stream { writer, buffer, .. } = self {
            if !buffer.is_empty() {
                writer.write_all(buffer)?;
                buffer.clear();
            }
            writer.flush()?;
        }
        Ok(())
    }

    /// Returns the written text of an in-memory output.
    pub fn into_string(self) -> Option<String> {
        match self {
            Output::Memory(text) => Some(text),
            Output::Stream { .. } => None,
        }
    }
}
