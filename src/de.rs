//! CSV deserialization.
//!
//! This module provides the [`Deserializer`], which maps a CSV document onto
//! Rust values implementing `Deserialize`.
//!
//! ## Overview
//!
//! - **Document**: a sequence of records, one per data row
//! - **Records**: structs, tuples, sequences or maps; struct fields are looked
//!   up by header name when the input has a header, and taken in column
//!   order otherwise
//! - **Fields**: strings, or values parsed from them (integers, floats,
//!   booleans, characters, unit enum variants); an empty field is `None`
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use csv_codec::{from_str_with_options, CsvOptions};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Person { name: String, id: u32, email: Option<String> }
//!
//! let options = CsvOptions::new().with_has_headers(true);
//! let people: Vec<Person> =
//!     from_str_with_options("id,name,email\n1,Ann,\n2,Bob,bob@example.com\n", &options).unwrap();
//! assert_eq!(people[0], Person { name: "Ann".into(), id: 1, email: None });
//! assert_eq!(people[1].email.as_deref(), Some("bob@example.com"));
//! ```

use crate::{CsvOptions, Error, Result, Source};
use serde::de::{self, DeserializeOwned, IntoDeserializer};
use serde::forward_to_deserialize_any;
use std::io::Read;
use std::str::FromStr;

/// The CSV deserializer.
///
/// Reads records through a [`Source`], so rows are fetched by position and
/// struct fields by header name. Created via [`Deserializer::from_str`] or
/// [`Deserializer::from_reader`].
pub struct Deserializer<'a> {
    source: Source<'a>,
    row: usize,
}

impl<'a> Deserializer<'a> {
    /// # Errors
    ///
    /// As for [`Source::from_str`].
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str, options: &CsvOptions) -> Result<Self> {
        Ok(Deserializer {
            source: Source::from_str(input, options)?,
            row: 0,
        })
    }

    /// # Errors
    ///
    /// As for [`Source::from_reader`].
    pub fn from_reader<R: Read + 'a>(reader: R, options: &CsvOptions) -> Result<Self> {
        Ok(Deserializer {
            source: Source::from_reader(reader, options)?,
            row: 0,
        })
    }

    /// The header names, if the input has a header row.
    pub fn headers(&self) -> Option<&[String]> {
        self.source.headers()
    }

    /// Deserializes the next record, or returns `None` after the last one.
    ///
    /// # Errors
    ///
    /// Any read error, or a record that does not fit `T`.
    pub fn next_record<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        if self.source.is_row_at_end(self.row)? {
            return Ok(None);
        }
        let record = T::deserialize(RecordDeserializer {
            source: &mut self.source,
            row: self.row,
        })?;
        self.row += 1;
        Ok(Some(record))
    }
}

impl<'de, 'a> de::Deserializer<'de> for &mut Deserializer<'a> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(RecordsAccess { de: self })
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

struct RecordsAccess<'d, 'a> {
    de: &'d mut Deserializer<'a>,
}

impl<'de> de::SeqAccess<'de> for RecordsAccess<'_, '_> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        let row = self.de.row;
        if self.de.source.is_row_at_end(row)? {
            return Ok(None);
        }
        let value = seed.deserialize(RecordDeserializer {
            source: &mut self.de.source,
            row,
        })?;
        self.de.row += 1;
        Ok(Some(value))
    }
}

/// Deserializes one row.
struct RecordDeserializer<'s, 'a> {
    source: &'s mut Source<'a>,
    row: usize,
}

impl RecordDeserializer<'_, '_> {
    fn field(&mut self, column: usize) -> Result<FieldDeserializer> {
        let value = self.source.field(self.row, column)?.to_string();
        Ok(FieldDeserializer {
            value,
            row: self.row,
            column,
        })
    }
}

impl<'de> de::Deserializer<'de> for RecordDeserializer<'_, '_> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_seq<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let len = self.source.row(self.row)?.len();
        visitor.visit_seq(FieldsAccess {
            record: &mut self,
            column: 0,
            len,
        })
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let names = self.source.headers().ok_or(Error::NoHeader)?.to_vec();
        let columns = (0..names.len()).collect();
        visitor.visit_map(NamedAccess {
            record: &mut self,
            names,
            columns,
            next: 0,
        })
    }

    fn deserialize_struct<V>(
        mut self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.source.headers().is_none() {
            return self.deserialize_seq(visitor);
        }
        let mut names = Vec::with_capacity(fields.len());
        let mut columns = Vec::with_capacity(fields.len());
        for name in fields {
            match self.source.field_index(name) {
                Ok(column) => {
                    names.push(name.to_string());
                    columns.push(column);
                }
                // Left to serde: `Option` fields default, others are missing.
                Err(Error::NameNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        visitor.visit_map(NamedAccess {
            record: &mut self,
            names,
            columns,
            next: 0,
        })
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    /// A record read as a single value is its first field.
    fn deserialize_bool<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_bool(self.field(0)?, visitor)
    }

    fn deserialize_i64<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_i64(self.field(0)?, visitor)
    }

    fn deserialize_u64<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_u64(self.field(0)?, visitor)
    }

    fn deserialize_f64<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_f64(self.field(0)?, visitor)
    }

    fn deserialize_string<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_string(self.field(0)?, visitor)
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_i8<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_i8(self.field(0)?, visitor)
    }

    fn deserialize_i16<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_i16(self.field(0)?, visitor)
    }

    fn deserialize_i32<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_i32(self.field(0)?, visitor)
    }

    fn deserialize_u8<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_u8(self.field(0)?, visitor)
    }

    fn deserialize_u16<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_u16(self.field(0)?, visitor)
    }

    fn deserialize_u32<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_u32(self.field(0)?, visitor)
    }

    fn deserialize_f32<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_f32(self.field(0)?, visitor)
    }

    fn deserialize_char<V>(mut self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_char(self.field(0)?, visitor)
    }

    fn deserialize_enum<V>(
        mut self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_enum(self.field(0)?, name, variants, visitor)
    }

    forward_to_deserialize_any! {
        i128 u128 bytes byte_buf unit unit_struct identifier
    }
}

/// Fields of one row, in column order.
struct FieldsAccess<'r, 's, 'a> {
    record: &'r mut RecordDeserializer<'s, 'a>,
    column: usize,
    len: usize,
}

impl<'de> de::SeqAccess<'de> for FieldsAccess<'_, '_, '_> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        if self.column >= self.len {
            return Ok(None);
        }
        let field = self.record.field(self.column)?;
        self.column += 1;
        seed.deserialize(field).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.len - self.column)
    }
}

/// Fields of one row, keyed by header name.
struct NamedAccess<'r, 's, 'a> {
    record: &'r mut RecordDeserializer<'s, 'a>,
    names: Vec<String>,
    columns: Vec<usize>,
    next: usize,
}

impl<'de> de::MapAccess<'de> for NamedAccess<'_, '_, '_> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.names.get(self.next) {
            Some(name) => seed
                .deserialize(name.clone().into_deserializer())
                .map(Some),
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        let column = *self
            .columns
            .get(self.next)
            .ok_or_else(|| Error::custom("next_value_seed called before next_key_seed"))?;
        self.next += 1;
        seed.deserialize(self.record.field(column)?)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.names.len() - self.next)
    }
}

/// Deserializes one field from its text.
struct FieldDeserializer {
    value: String,
    row: usize,
    column: usize,
}

impl FieldDeserializer {
    fn parse<T: FromStr>(&self, expected: &str) -> Result<T> {
        self.value.parse().map_err(|_| {
            Error::custom(format!(
                "row {}, field {}: cannot read '{}' as {}",
                self.row, self.column, self.value, expected
            ))
        })
    }
}

macro_rules! deserialize_parsed {
    ($($method:ident => $visit:ident: $ty:ty,)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                visitor.$visit(self.parse::<$ty>(stringify!($ty))?)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for FieldDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.value)
    }

    deserialize_parsed! {
        deserialize_bool => visit_bool: bool,
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_i128 => visit_i128: i128,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_u128 => visit_u128: u128,
        deserialize_f32 => visit_f32: f32,
        deserialize_f64 => visit_f64: f64,
        deserialize_char => visit_char: char,
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.value.is_empty() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.value.is_empty() {
            visitor.visit_unit()
        } else {
            Err(Error::custom(format!(
                "row {}, field {}: expected an empty field, found '{}'",
                self.row, self.column, self.value
            )))
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_enum(self.value.into_deserializer())
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_byte_buf(self.value.into_bytes())
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        str string seq tuple tuple_struct map struct identifier
    }
}
