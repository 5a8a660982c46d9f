//! Unicode text encodings and byte order marks.
//!
//! The reader and writer work on `char` scalars. When they are attached to a
//! byte stream, this module converts between bytes and scalars:
//!
//! - [`Encoding`]: the supported encodings and their BOM byte tables
//! - [`Decoder`]: a streaming `io::Read` → `char` adapter, tolerant of code
//!   units split across read boundaries
//!
//! ## Examples
//!
//! ```rust
//! use csv_codec::Encoding;
//!
//! assert_eq!(Encoding::detect(&[0xEF, 0xBB, 0xBF, b'a']), Some(Encoding::Utf8));
//! assert_eq!(Encoding::detect(b"abc"), None);
//! ```

use crate::{Error, Result};
use std::io::{self, Read};

const CHUNK_SIZE: usize = 8 * 1024;

/// A Unicode encoding for byte-level input and output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
}

impl Encoding {
    /// Returns the byte order mark for this encoding.
    #[must_use]
    pub const fn bom(&self) -> &'static [u8] {
        match self {
            Encoding::Utf8 => &[0xEF, 0xBB, 0xBF],
            Encoding::Utf16Le => &[0xFF, 0xFE],
            Encoding::Utf16Be => &[0xFE, 0xFF],
            Encoding::Utf32Le => &[0xFF, 0xFE, 0x00, 0x00],
            Encoding::Utf32Be => &[0x00, 0x00, 0xFE, 0xFF],
        }
    }

    /// Detects an encoding from a byte order mark at the start of `bytes`.
    ///
    /// UTF-32 marks are checked before UTF-16 ones since the UTF-32 LE mark
    /// starts with the UTF-16 LE mark.
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Option<Encoding> {
        [
            Encoding::Utf32Le,
            Encoding::Utf32Be,
            Encoding::Utf8,
            Encoding::Utf16Le,
            Encoding::Utf16Be,
        ]
        .into_iter()
        .find(|encoding| bytes.starts_with(encoding.bom()))
    }

    /// Appends the encoded form of `ch` to `out`.
    pub fn encode_char(&self, ch: char, out: &mut Vec<u8>) {
        match self {
            Encoding::Utf8 => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
            Encoding::Utf16Le | Encoding::Utf16Be => {
                let mut buf = [0u16; 2];
                for unit in ch.encode_utf16(&mut buf).iter() {
                    if *self == Encoding::Utf16Le {
                        out.extend_from_slice(&unit.to_le_bytes());
                    } else {
                        out.extend_from_slice(&unit.to_be_bytes());
                    }
                }
            }
            Encoding::Utf32Le => out.extend_from_slice(&(ch as u32).to_le_bytes()),
            Encoding::Utf32Be => out.extend_from_slice(&(ch as u32).to_be_bytes()),
        }
    }
}

/// Streams `char`s out of an `io::Read`.
///
/// When no encoding is given, it is detected from the byte order mark and
/// defaults to UTF-8. A leading BOM matching the encoding is skipped.
pub struct Decoder<R> {
    reader: R,
    encoding: Option<Encoding>,
    buf: Vec<u8>,
    pos: usize,
    eof: bool,
    started: bool,
}

impl<R: Read> Decoder<R> {
    pub fn new(reader: R, encoding: Option<Encoding>) -> Self {
        Decoder {
            reader,
            encoding,
            buf: Vec::with_capacity(CHUNK_SIZE),
            pos: 0,
            eof: false,
            started: false,
        }
    }

    /// The encoding in use, once known.
    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }

    fn available(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Makes at least `needed` bytes available, unless the stream ends first.
    fn fill(&mut self, needed: usize) -> Result<bool> {
        while self.available() < needed && !self.eof {
            if self.pos > 0 {
                self.buf.drain(..self.pos);
                self.pos = 0;
            }
            let start = self.buf.len();
            self.buf.resize(start + CHUNK_SIZE, 0);
            match self.reader.read(&mut self.buf[start..]) {
                Ok(0) => {
                    self.buf.truncate(start);
                    self.eof = true;
                }
                Ok(n) => self.buf.truncate(start + n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => self.buf.truncate(start),
                Err(e) => {
                    self.buf.truncate(start);
                    return Err(e.into());
                }
            }
        }
        Ok(self.available() >= needed)
    }

    fn take(&mut self, n: usize) -> &[u8] {
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        bytes
    }

    fn start(&mut self) -> Result<Encoding> {
        self.fill(4)?;
        let prefix = &self.buf[self.pos..];
        let encoding = match self.encoding {
            Some(encoding) => encoding,
            None => {
                let detected = Encoding::detect(prefix).unwrap_or_default();
                log::debug!("detected input encoding {:?}", detected);
                detected
            }
        };
        if prefix.starts_with(encoding.bom()) {
            self.pos += encoding.bom().len();
        }
        self.encoding = Some(encoding);
        self.started = true;
        Ok(encoding)
    }

    fn truncated(&self) -> Error {
        Error::io("stream ended in the middle of an encoded character")
    }

    fn next_utf8(&mut self) -> Result<Option<char>> {
        if !self.fill(1)? {
            return Ok(None);
        }
        let width = match self.buf[self.pos] {
            b if b < 0x80 => 1,
            b if b & 0xE0 == 0xC0 => 2,
            b if b & 0xF0 == 0xE0 => 3,
            b if b & 0xF8 == 0xF0 => 4,
            _ => return Err(Error::io("invalid UTF-8 leading byte")),
        };
        if !self.fill(width)? {
            return Err(self.truncated());
        }
        let bytes = self.take(width);
        std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.chars().next())
            .map(Some)
            .ok_or_else(|| Error::io("invalid UTF-8 sequence"))
    }

    fn next_utf16(&mut self, little_endian: bool) -> Result<Option<char>> {
        let unit = |b: &[u8]| {
            if little_endian {
                u16::from_le_bytes([b[0], b[1]])
            } else {
                u16::from_be_bytes([b[0], b[1]])
            }
        };
        if !self.fill(2)? {
            return if self.available() == 0 {
                Ok(None)
            } else {
                Err(self.truncated())
            };
        }
        let high = unit(self.take(2));
        if !(0xD800..=0xDBFF).contains(&high) {
            return char::from_u32(u32::from(high))
                .map(Some)
                .ok_or_else(|| Error::io("unpaired UTF-16 surrogate"));
        }
        if !self.fill(2)? {
            return Err(self.truncated());
        }
        let low = unit(self.take(2));
        if !(0xDC00..=0xDFFF).contains(&low) {
            return Err(Error::io("unpaired UTF-16 surrogate"));
        }
        let code = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
        char::from_u32(code)
            .map(Some)
            .ok_or_else(|| Error::io("invalid UTF-16 code point"))
    }

    fn next_utf32(&mut self, little_endian: bool) -> Result<Option<char>> {
        if !self.fill(4)? {
            return if self.available() == 0 {
                Ok(None)
            } else {
                Err(self.truncated())
            };
        }
        let b = self.take(4);
        let code = if little_endian {
            u32::from_le_bytes([b[0], b[1], b[2], b[3]])
        } else {
            u32::from_be_bytes([b[0], b[1], b[2], b[3]])
        };
        char::from_u32(code)
            .map(Some)
            .ok_or_else(|| Error::io("invalid UTF-32 code point"))
    }

    fn next_char(&mut self) -> Result<Option<char>> {
        let encoding = match self.encoding {
            Some(encoding) if self.started => encoding,
            _ => self.start()?,
        };
        match encoding {
            Encoding::Utf8 => self.next_utf8(),
            Encoding::Utf16Le => self.next_utf16(true),
            Encoding::Utf16Be => self.next_utf16(false),
            Encoding::Utf32Le => self.next_utf32(true),
            Encoding::Utf32Be => self.next_utf32(false),
        }
    }
}

impl<R: Read> Iterator for Decoder<R> {
    type Item = Result<char>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_char().transpose()
    }
}
