// src/raw_data/reader.rs
use crate::error::{IndexError, Result};
use crate::types::{DateTime, ObjectName, RepCode, Value};
use crate::utils::decode_latin1;
use byteorder::{BigEndian, ReadBytesExt};
use std::io::{self, Read};

/// Decodes RP66V1 representation codes from a big-endian byte stream.
pub struct RepCodeReader;

impl RepCodeReader {
    /// Read `count` values of `rep_code`.
    ///
    /// # Example
    ///
    /// ```
    /// use rp66v1_index::raw_data::RepCodeReader;
    /// use rp66v1_index::types::{RepCode, Value};
    /// use std::io::Cursor;
    ///
    /// let mut cursor = Cursor::new(vec![0x00, 0x01, 0xFF, 0xFF]);
    /// let values = RepCodeReader::read_values(&mut cursor, RepCode::SNorm, 2).unwrap();
    /// assert_eq!(values, vec![Value::Int(1), Value::Int(-1)]);
    /// ```
    pub fn read_values<R: Read>(reader: &mut R, rep_code: RepCode, count: usize) -> Result<Vec<Value>> {
        (0..count).map(|_| Self::read_value(reader, rep_code)).collect()
    }

    pub fn read_value<R: Read>(reader: &mut R, rep_code: RepCode) -> Result<Value> {
        let value = match rep_code {
            RepCode::FShort => Value::Float(Self::read_fshort(reader)?),
            RepCode::FSingl => Value::Float(reader.read_f32::<BigEndian>()? as f64),
            RepCode::FSing1 => Value::Compound(Self::read_f32s(reader, 2)?),
            RepCode::FSing2 => Value::Compound(Self::read_f32s(reader, 3)?),
            RepCode::ISingl => Value::Float(Self::read_isingl(reader)?),
            RepCode::VSingl => Value::Float(Self::read_vsingl(reader)?),
            RepCode::FDoubl => Value::Float(reader.read_f64::<BigEndian>()?),
            RepCode::FDoub1 => Value::Compound(Self::read_f64s(reader, 2)?),
            RepCode::FDoub2 => Value::Compound(Self::read_f64s(reader, 3)?),
            RepCode::CSingl => Value::Compound(Self::read_f32s(reader, 2)?),
            RepCode::CDoubl => Value::Compound(Self::read_f64s(reader, 2)?),
            RepCode::SShort => Value::Int(reader.read_i8()? as i64),
            RepCode::SNorm => Value::Int(reader.read_i16::<BigEndian>()? as i64),
            RepCode::SLong => Value::Int(reader.read_i32::<BigEndian>()? as i64),
            RepCode::UShort | RepCode::Status => Value::Int(reader.read_u8()? as i64),
            RepCode::UNorm => Value::Int(reader.read_u16::<BigEndian>()? as i64),
            RepCode::ULong => Value::Int(reader.read_u32::<BigEndian>()? as i64),
            RepCode::UVari | RepCode::Origin => Value::Int(Self::read_uvari(reader)? as i64),
            RepCode::Ident | RepCode::Units => Value::Bytes(Self::read_ident(reader)?),
            RepCode::Ascii => Value::Str(decode_latin1(&Self::read_ascii(reader)?)),
            RepCode::DTime => Value::DateTime(Self::read_dtime(reader)?),
            RepCode::ObName => Value::ObjectName(Self::read_obname(reader)?),
            RepCode::ObjRef => {
                let object_type = Self::read_ident(reader)?;
                let name = Self::read_obname(reader)?;
                Value::Unknown(format!("{} {}", decode_latin1(&object_type), name))
            }
            RepCode::AttRef => {
                let object_type = Self::read_ident(reader)?;
                let name = Self::read_obname(reader)?;
                let label = Self::read_ident(reader)?;
                Value::Unknown(format!(
                    "{} {} {}",
                    decode_latin1(&object_type),
                    name,
                    decode_latin1(&label)
                ))
            }
        };
        Ok(value)
    }

    /// Variable length unsigned integer, 1, 2 or 4 bytes selected by the
    /// leading bits.
    pub fn read_uvari<R: Read>(reader: &mut R) -> Result<u32> {
        let first = reader.read_u8()?;
        if first & 0x80 == 0 {
            return Ok(first as u32);
        }
        if first & 0x40 == 0 {
            let second = reader.read_u8()?;
            return Ok((((first & 0x3F) as u32) << 8) | second as u32);
        }
        let mut rest = [0u8; 3];
        reader.read_exact(&mut rest)?;
        Ok((((first & 0x3F) as u32) << 24) | ((rest[0] as u32) << 16) | ((rest[1] as u32) << 8) | rest[2] as u32)
    }

    /// USHORT length then bytes.
    pub fn read_ident<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
        let len = reader.read_u8()? as u64;
        Self::read_counted(reader, len)
    }

    /// UVARI length then bytes.
    pub fn read_ascii<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
        let len = Self::read_uvari(reader)? as u64;
        Self::read_counted(reader, len)
    }

    // The buffer grows with the bytes actually present, not the length field.
    fn read_counted<R: Read>(reader: &mut R, len: u64) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        reader.take(len).read_to_end(&mut bytes)?;
        if (bytes.len() as u64) < len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("{} of {} string bytes present", bytes.len(), len),
            )
            .into());
        }
        Ok(bytes)
    }

    pub fn read_obname<R: Read>(reader: &mut R) -> Result<ObjectName> {
        let origin = Self::read_uvari(reader)?;
        let copy = reader.read_u8()?;
        let identifier = Self::read_ident(reader)?;
        Ok(ObjectName {
            origin,
            copy,
            identifier,
        })
    }

    pub fn read_dtime<R: Read>(reader: &mut R) -> Result<DateTime> {
        let year = reader.read_u8()? as u16 + DateTime::YEAR_OFFSET;
        let tz_month = reader.read_u8()?;
        let day = reader.read_u8()?;
        let hour = reader.read_u8()?;
        let minute = reader.read_u8()?;
        let second = reader.read_u8()?;
        let millisecond = reader.read_u16::<BigEndian>()?;
        Ok(DateTime {
            year,
            time_zone: tz_month >> 4,
            month: tz_month & 0x0F,
            day,
            hour,
            minute,
            second,
            millisecond,
        })
    }

    /// 12 bit two's complement fraction, 4 bit exponent.
    fn read_fshort<R: Read>(reader: &mut R) -> Result<f64> {
        let raw = reader.read_u16::<BigEndian>()?;
        let fraction = (raw as i16) >> 4;
        let exponent = (raw & 0x0F) as i32;
        Ok(fraction as f64 / 2048.0 * 2f64.powi(exponent))
    }

    /// IBM System/360 single precision.
    fn read_isingl<R: Read>(reader: &mut R) -> Result<f64> {
        let raw = reader.read_u32::<BigEndian>()?;
        let fraction = (raw & 0x00FF_FFFF) as f64 / (1u32 << 24) as f64;
        if fraction == 0.0 {
            return Ok(0.0);
        }
        let exponent = ((raw >> 24) & 0x7F) as i32 - 64;
        let value = fraction * 16f64.powi(exponent);
        Ok(if raw & 0x8000_0000 != 0 { -value } else { value })
    }

    /// VAX F single precision, stored as two little-endian 16 bit words.
    fn read_vsingl<R: Read>(reader: &mut R) -> Result<f64> {
        let mut b = [0u8; 4];
        reader.read_exact(&mut b)?;
        let raw = u32::from_be_bytes([b[1], b[0], b[3], b[2]]);
        let exponent = ((raw >> 23) & 0xFF) as i32;
        if exponent == 0 {
            if raw & 0x8000_0000 != 0 {
                return Err(IndexError::Decode("VSINGL reserved operand".to_string()));
            }
            return Ok(0.0);
        }
        let fraction = 0.5 + (raw & 0x007F_FFFF) as f64 / (1u32 << 24) as f64;
        let value = fraction * 2f64.powi(exponent - 128);
        Ok(if raw & 0x8000_0000 != 0 { -value } else { value })
    }

    fn read_f32s<R: Read>(reader: &mut R, count: usize) -> Result<Vec<f64>> {
        (0..count)
            .map(|_| -> Result<f64> { Ok(reader.read_f32::<BigEndian>()? as f64) })
            .collect()
    }

    fn read_f64s<R: Read>(reader: &mut R, count: usize) -> Result<Vec<f64>> {
        (0..count)
            .map(|_| -> Result<f64> { Ok(reader.read_f64::<BigEndian>()?) })
            .collect()
    }
}
