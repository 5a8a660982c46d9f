//! CSV serialization.
//!
//! This module provides the [`Serializer`], which writes Rust values
//! implementing `Serialize` as CSV records.
//!
//! ## Overview
//!
//! - **Document**: a sequence (or tuple) of records; any other value is
//!   written as a single record
//! - **Records**: struct fields and map entries go to the column of the
//!   matching configured header name, or to consecutive columns when no
//!   headers are configured; sequences and tuples fill consecutive columns
//! - **Fields**: strings, numbers, booleans, characters and unit enum variants
//!   are written as text; `None` and `()` are empty fields
//!
//! Fields are placed through a [`Sink`](crate::Sink), so struct fields may be
//! declared in a different order than the header columns.
//!
//! ## Usage
//!
//! ```rust
//! use csv_codec::{to_string_with_options, CsvOptions};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Person { name: String, id: u32 }
//!
//! let people = vec![
//!     Person { name: "Ann".into(), id: 1 },
//!     Person { name: "Bob".into(), id: 2 },
//! ];
//! let options = CsvOptions::new().with_headers(["id", "name"]);
//! let csv = to_string_with_options(&people, &options).unwrap();
//! assert_eq!(csv, "id,name\n1,Ann\n2,Bob\n");
//! ```

use crate::{CsvOptions, Error, Result, Sink};
use serde::ser::{self, Impossible, Serializer as _};
use serde::Serialize;
use std::io::Write;

/// The CSV serializer.
///
/// Created via [`Serializer::new`] for a `String` output or
/// [`Serializer::from_writer`] for a byte stream.
pub struct Serializer<'a> {
    sink: Sink<'a>,
    /// Whether fields are placed by header name.
    named: bool,
    row: usize,
}

impl Serializer<'static> {
    /// # Errors
    ///
    /// As for [`Sink::new`].
    pub fn new(options: &CsvOptions) -> Result<Self> {
        Ok(Serializer {
            sink: Sink::new(options)?,
            named: !options.headers.is_empty(),
            row: 0,
        })
    }
}

impl<'a> Serializer<'a> {
    /// # Errors
    ///
    /// As for [`Sink::from_writer`].
    pub fn from_writer<W: Write + 'a>(writer: W, options: &CsvOptions) -> Result<Self> {
        Ok(Serializer {
            sink: Sink::from_writer(writer, options)?,
            named: !options.headers.is_empty(),
            row: 0,
        })
    }

    /// Writes one record.
    ///
    /// # Errors
    ///
    /// A value that cannot be laid out as a row, an unknown header name, or
    /// any error of the underlying sink.
    pub fn serialize_record<T: ?Sized + Serialize>(&mut self, record: &T) -> Result<()> {
        record.serialize(RecordSerializer { ser: self })
    }

    /// Number of records written so far.
    pub fn records(&self) -> usize {
        self.row
    }

    /// # Errors
    ///
    /// As for [`Sink::finish`].
    pub fn finish(&mut self) -> Result<()> {
        self.sink.finish()
    }

    /// Finishes the output and returns its text.
    ///
    /// # Errors
    ///
    /// As for [`Sink::into_string`].
    pub fn into_string(self) -> Result<String> {
        self.sink.into_string()
    }
}

impl<'s, 'a> ser::Serializer for &'s mut Serializer<'a> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = RecordFields<'s, 'a>;
    type SerializeTupleVariant = RecordFields<'s, 'a>;
    type SerializeMap = RecordFields<'s, 'a>;
    type SerializeStruct = RecordFields<'s, 'a>;
    type SerializeStructVariant = RecordFields<'s, 'a>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.serialize_record(&v)
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.serialize_record(&v)
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.serialize_record(&v)
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.serialize_record(&v)
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.serialize_record(&v)
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.serialize_record(&v)
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.serialize_record(&v)
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.serialize_record(&v)
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.serialize_record(&v)
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.serialize_record(&v)
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.serialize_record(&v)
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.serialize_record(&v)
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.serialize_record(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        RecordSerializer { ser: self }.serialize_bytes(v)
    }

    /// An absent document writes nothing.
    fn serialize_none(self) -> Result<()> {
        Ok(())
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        RecordSerializer { ser: self }.serialize_unit_variant(name, variant_index, variant)
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.serialize_record(value)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Ok(RecordFields::new(self))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(RecordFields::new(self))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(RecordFields::new(self))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(RecordFields::new(self))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(RecordFields::new(self))
    }
}

impl ser::SerializeSeq for &mut Serializer<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.serialize_record(value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl ser::SerializeTuple for &mut Serializer<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.serialize_record(value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

/// Serializes one record. Every path through it advances the row.
struct RecordSerializer<'s, 'a> {
    ser: &'s mut Serializer<'a>,
}

impl RecordSerializer<'_, '_> {
    /// Writes a record made of one field.
    fn single<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        let text = value.serialize(FieldSerializer)?;
        self.ser.sink.set_field(self.ser.row, 0, text)?;
        self.ser.row += 1;
        Ok(())
    }
}

impl<'s, 'a> ser::Serializer for RecordSerializer<'s, 'a> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = RecordFields<'s, 'a>;
    type SerializeTuple = RecordFields<'s, 'a>;
    type SerializeTupleStruct = RecordFields<'s, 'a>;
    type SerializeTupleVariant = RecordFields<'s, 'a>;
    type SerializeMap = RecordFields<'s, 'a>;
    type SerializeStruct = RecordFields<'s, 'a>;
    type SerializeStructVariant = RecordFields<'s, 'a>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.single(&v)
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.single(&v)
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.single(&v)
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.single(&v)
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.single(&v)
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.single(&v)
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.single(&v)
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.single(&v)
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.single(&v)
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.single(&v)
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.single(&v)
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.single(&v)
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.single(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.single(serde_bytes_as_text(v)?.as_str())
    }

    fn serialize_none(self) -> Result<()> {
        self.single("")
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.single("")
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.single("")
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.single(variant)
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(RecordFields::new(self.ser))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Ok(RecordFields::new(self.ser))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Ok(RecordFields::new(self.ser))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(RecordFields::new(self.ser))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(RecordFields::new(self.ser))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(RecordFields::new(self.ser))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(RecordFields::new(self.ser))
    }
}

/// The fields of one record.
pub struct RecordFields<'s, 'a> {
    ser: &'s mut Serializer<'a>,
    /// Next positional column.
    column: usize,
    /// Key of a map entry whose value is pending.
    key: Option<String>,
    written: bool,
}

impl<'s, 'a> RecordFields<'s, 'a> {
    fn new(ser: &'s mut Serializer<'a>) -> Self {
        RecordFields {
            ser,
            column: 0,
            key: None,
            written: false,
        }
    }

    fn put<T: ?Sized + Serialize>(&mut self, name: Option<&str>, value: &T) -> Result<()> {
        let text = value.serialize(FieldSerializer)?;
        let column = match name {
            Some(name) if self.ser.named => self.ser.sink.field_index(name)?,
            _ => self.column,
        };
        self.column += 1;
        self.ser.sink.set_field(self.ser.row, column, text)?;
        self.written = true;
        Ok(())
    }

    fn end_record(self) -> Result<()> {
        // A record without fields still occupies a row.
        if !self.written {
            self.ser.sink.set_field(self.ser.row, 0, "")?;
        }
        self.ser.row += 1;
        Ok(())
    }
}

impl ser::SerializeSeq for RecordFields<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.put(None, value)
    }

    fn end(self) -> Result<()> {
        self.end_record()
    }
}

impl ser::SerializeTuple for RecordFields<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.put(None, value)
    }

    fn end(self) -> Result<()> {
        self.end_record()
    }
}

impl ser::SerializeTupleStruct for RecordFields<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.put(None, value)
    }

    fn end(self) -> Result<()> {
        self.end_record()
    }
}

impl ser::SerializeTupleVariant for RecordFields<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.put(None, value)
    }

    fn end(self) -> Result<()> {
        self.end_record()
    }
}

impl ser::SerializeMap for RecordFields<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.key = Some(key.serialize(FieldSerializer)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called before serialize_key"))?;
        self.put(Some(&key), value)
    }

    fn end(self) -> Result<()> {
        self.end_record()
    }
}

impl ser::SerializeStruct for RecordFields<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.put(Some(key), value)
    }

    /// Keeps positional columns aligned when a field is skipped.
    fn skip_field(&mut self, _key: &'static str) -> Result<()> {
        self.column += 1;
        Ok(())
    }

    fn end(self) -> Result<()> {
        self.end_record()
    }
}

impl ser::SerializeStructVariant for RecordFields<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.put(Some(key), value)
    }

    fn skip_field(&mut self, _key: &'static str) -> Result<()> {
        self.column += 1;
        Ok(())
    }

    fn end(self) -> Result<()> {
        self.end_record()
    }
}

fn serde_bytes_as_text(v: &[u8]) -> Result<String> {
    String::from_utf8(v.to_vec()).map_err(|e| Error::custom(format!("field is not UTF-8: {}", e)))
}

fn nested(kind: &str) -> Error {
    Error::custom(format!("a CSV field cannot hold a {}", kind))
}

/// Turns one field value into its text.
struct FieldSerializer;

impl ser::Serializer for FieldSerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = Impossible<String, Error>;
    type SerializeTuple = Impossible<String, Error>;
    type SerializeTupleStruct = Impossible<String, Error>;
    type SerializeTupleVariant = Impossible<String, Error>;
    type SerializeMap = Impossible<String, Error>;
    type SerializeStruct = Impossible<String, Error>;
    type SerializeStructVariant = Impossible<String, Error>;

    fn serialize_bool(self, v: bool) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i128(self, v: i128) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u128(self, v: u128) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, v: f32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_f64(self, v: f64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_char(self, v: char) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<String> {
        serde_bytes_as_text(v)
    }

    fn serialize_none(self) -> Result<String> {
        Ok(String::new())
    }

    fn serialize_some<T>(self, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<String> {
        Ok(String::new())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        Ok(String::new())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        Err(nested("newtype variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(nested("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(nested("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(nested("tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(nested("tuple variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(nested("map"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(nested("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(nested("struct variant"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    enum Level {
        Low,
    }

    #[derive(Serialize)]
    struct Reading {
        sensor: &'static str,
        value: f64,
        level: Level,
        note: Option<&'static str>,
    }

    fn reading() -> Reading {
        Reading {
            sensor: "a, b",
            value: 1.5,
            level: Level::Low,
            note: None,
        }
    }

    fn write<T: ?Sized + Serialize>(value: &T, options: &CsvOptions) -> Result<String> {
        let mut ser = Serializer::new(options)?;
        value.serialize(&mut ser)?;
        ser.into_string()
    }

    #[test]
    fn test_struct_by_header_name() {
        let options = CsvOptions::new().with_headers(["level", "note", "value", "sensor"]);
        let csv = write(&[reading()], &options).unwrap();
        assert_eq!(csv, "level,note,value,sensor\nLow,,1.5,\"a, b\"\n");
    }

    #[test]
    fn test_struct_by_position() {
        let csv = write(&vec![reading(), reading()], &CsvOptions::new()).unwrap();
        assert_eq!(csv, "\"a, b\",1.5,Low,\n\"a, b\",1.5,Low,\n");
    }

    #[test]
    fn test_single_value_document() {
        assert_eq!(write(&reading(), &CsvOptions::new()).unwrap(), "\"a, b\",1.5,Low,\n");
        assert_eq!(write(&vec![1, 2, 3], &CsvOptions::new()).unwrap(), "1\n2\n3\n");
    }

    #[test]
    fn test_tuples_and_maps() {
        let rows = vec![("x", 1, true), ("y", 2, false)];
        assert_eq!(
            write(&rows, &CsvOptions::new()).unwrap(),
            "x,1,true\ny,2,false\n"
        );

        let mut record = BTreeMap::new();
        record.insert("b", 2);
        record.insert("a", 1);
        let options = CsvOptions::new().with_headers(["b", "a"]);
        assert_eq!(write(&[record], &options).unwrap(), "b,a\n2,1\n");
    }

    #[test]
    fn test_unknown_header_name() {
        let options = CsvOptions::new().with_headers(["sensor", "value"]);
        let err = write(&[reading()], &options).unwrap_err();
        assert!(matches!(err, Error::NameNotFound(ref name) if name == "level"));
    }

    #[test]
    fn test_nested_values_are_rejected() {
        let rows = vec![vec![vec![1, 2]]];
        let err = write(&rows, &CsvOptions::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Custom);
        assert!(err.to_string().contains("sequence"));
    }

    #[test]
    fn test_streaming_records() {
        let mut bytes = Vec::new();
        {
            let mut ser = Serializer::from_writer(&mut bytes, &CsvOptions::new()).unwrap();
            ser.serialize_record(&("a", 1)).unwrap();
            ser.serialize_record(&("b", 2)).unwrap();
            assert_eq!(ser.records(), 2);
            ser.finish().unwrap();
        }
        assert_eq!(bytes, b"a,1\nb,2\n");
    }
}
