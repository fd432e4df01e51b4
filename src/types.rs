// src/types.rs
use crate::utils::decode_latin1;
use std::fmt;

/// RP66V1 object name, the `(O, C, I)` triple used to address Frame Arrays,
/// Channels and every other EFLR object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectName {
    /// Origin reference, `O`.
    pub origin: u32,
    /// Copy number, `C`.
    pub copy: u8,
    /// Identifier, `I`.
    pub identifier: Vec<u8>,
}

impl ObjectName {
    pub fn new(origin: u32, copy: u8, identifier: impl Into<Vec<u8>>) -> Self {
        ObjectName {
            origin,
            copy,
            identifier: identifier.into(),
        }
    }

    /// The identifier as text, bytes above 0x7F map to Latin-1.
    pub fn identifier_str(&self) -> String {
        decode_latin1(&self.identifier)
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OBNAME: O: {} C: {} I: {}", self.origin, self.copy, self.identifier_str())
    }
}

/// RP66V1 representation codes [RP66V1 Appendix B].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RepCode {
    FShort = 1,
    FSingl = 2,
    FSing1 = 3,
    FSing2 = 4,
    ISingl = 5,
    VSingl = 6,
    FDoubl = 7,
    FDoub1 = 8,
    FDoub2 = 9,
    CSingl = 10,
    CDoubl = 11,
    SShort = 12,
    SNorm = 13,
    SLong = 14,
    UShort = 15,
    UNorm = 16,
    ULong = 17,
    UVari = 18,
    Ident = 19,
    Ascii = 20,
    DTime = 21,
    Origin = 22,
    ObName = 23,
    ObjRef = 24,
    AttRef = 25,
    Status = 26,
    Units = 27,
}

impl RepCode {
    pub fn from_u8(value: u8) -> Option<Self> {
        let code = match value {
            1 => RepCode::FShort,
            2 => RepCode::FSingl,
            3 => RepCode::FSing1,
            4 => RepCode::FSing2,
            5 => RepCode::ISingl,
            6 => RepCode::VSingl,
            7 => RepCode::FDoubl,
            8 => RepCode::FDoub1,
            9 => RepCode::FDoub2,
            10 => RepCode::CSingl,
            11 => RepCode::CDoubl,
            12 => RepCode::SShort,
            13 => RepCode::SNorm,
            14 => RepCode::SLong,
            15 => RepCode::UShort,
            16 => RepCode::UNorm,
            17 => RepCode::ULong,
            18 => RepCode::UVari,
            19 => RepCode::Ident,
            20 => RepCode::Ascii,
            21 => RepCode::DTime,
            22 => RepCode::Origin,
            23 => RepCode::ObName,
            24 => RepCode::ObjRef,
            25 => RepCode::AttRef,
            26 => RepCode::Status,
            27 => RepCode::Units,
            _ => return None,
        };
        Some(code)
    }

    /// Fixed size in bytes, or None if variable-sized
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            RepCode::SShort | RepCode::UShort | RepCode::Status => Some(1),
            RepCode::FShort | RepCode::SNorm | RepCode::UNorm => Some(2),
            RepCode::FSingl | RepCode::ISingl | RepCode::VSingl | RepCode::SLong | RepCode::ULong => Some(4),
            RepCode::FSing1 | RepCode::FDoubl | RepCode::CSingl | RepCode::DTime => Some(8),
            RepCode::FSing2 => Some(12),
            RepCode::FDoub1 | RepCode::CDoubl => Some(16),
            RepCode::FDoub2 => Some(24),
            RepCode::UVari
            | RepCode::Ident
            | RepCode::Ascii
            | RepCode::Origin
            | RepCode::ObName
            | RepCode::ObjRef
            | RepCode::AttRef
            | RepCode::Units => None,
        }
    }

    /// The mnemonic used in the standard, e.g. `FDOUBL`.
    pub fn name(&self) -> &'static str {
        match self {
            RepCode::FShort => "FSHORT",
            RepCode::FSingl => "FSINGL",
            RepCode::FSing1 => "FSING1",
            RepCode::FSing2 => "FSING2",
            RepCode::ISingl => "ISINGL",
            RepCode::VSingl => "VSINGL",
            RepCode::FDoubl => "FDOUBL",
            RepCode::FDoub1 => "FDOUB1",
            RepCode::FDoub2 => "FDOUB2",
            RepCode::CSingl => "CSINGL",
            RepCode::CDoubl => "CDOUBL",
            RepCode::SShort => "SSHORT",
            RepCode::SNorm => "SNORM",
            RepCode::SLong => "SLONG",
            RepCode::UShort => "USHORT",
            RepCode::UNorm => "UNORM",
            RepCode::ULong => "ULONG",
            RepCode::UVari => "UVARI",
            RepCode::Ident => "IDENT",
            RepCode::Ascii => "ASCII",
            RepCode::DTime => "DTIME",
            RepCode::Origin => "ORIGIN",
            RepCode::ObName => "OBNAME",
            RepCode::ObjRef => "OBJREF",
            RepCode::AttRef => "ATTREF",
            RepCode::Status => "STATUS",
            RepCode::Units => "UNITS",
        }
    }

    /// Name for a raw code that may not be valid.
    pub fn name_of(value: u8) -> &'static str {
        RepCode::from_u8(value).map(|code| code.name()).unwrap_or("UNKNOWN")
    }
}

/// RP66V1 date and time, representation code DTIME.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateTime {
    pub year: u16,
    /// 0: local standard, 1: local daylight savings, 2: GMT
    pub time_zone: u8,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millisecond: u16,
}

impl DateTime {
    pub const YEAR_OFFSET: u16 = 1900;

    pub fn time_zone_name(&self) -> &'static str {
        match self.time_zone {
            0 => "STD",
            1 => "DST",
            2 => "GMT",
            _ => "???",
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03} {}",
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.millisecond,
            self.time_zone_name()
        )
    }
}

/// A decoded attribute value.
///
/// Each variant fixes the `type` tag used when the value is written to an index.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// IDENT and UNITS
    Bytes(Vec<u8>),
    /// ASCII
    Str(String),
    Int(i64),
    Float(f64),
    DateTime(DateTime),
    ObjectName(ObjectName),
    /// Validated and complex floats: FSING1, FSING2, FDOUB1, FDOUB2, CSINGL, CDOUBL
    Compound(Vec<f64>),
    /// OBJREF and ATTREF, kept as text
    Unknown(String),
}

impl Value {
    /// Type tag written as the `type` attribute of a `<Value>` element.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Value::Bytes(_) => "bytes",
            Value::Str(_) => "str",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::DateTime(_) => "datetime",
            Value::ObjectName(_) => "ObjectName",
            Value::Compound(_) | Value::Unknown(_) => "unknown",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Bytes of a textual value. An object name yields its identifier.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            Value::Str(s) => Some(s.as_bytes()),
            Value::ObjectName(name) => Some(&name.identifier),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bytes(b) => write!(f, "{}", decode_latin1(b)),
            Value::Str(s) => write!(f, "{}", s),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{:?}", v),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::ObjectName(name) => write!(f, "{}", name),
            Value::Compound(values) => {
                let parts: Vec<String> = values.iter().map(|v| format!("{:?}", v)).collect();
                write!(f, "({})", parts.join(", "))
            }
            Value::Unknown(s) => write!(f, "{}", s),
        }
    }
}
