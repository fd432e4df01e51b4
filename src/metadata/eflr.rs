// src/metadata/eflr.rs
use crate::error::{IndexError, Result};
use crate::raw_data::RepCodeReader;
use crate::types::{ObjectName, RepCode, Value};
use crate::utils::decode_latin1;
use byteorder::ReadBytesExt;
use std::io::Cursor;

/// Component role, the top three bits of a component descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentRole {
    AbsentAttribute,
    Attribute,
    InvariantAttribute,
    Object,
    Reserved,
    RedundantSet,
    ReplacementSet,
    Set,
}

impl ComponentRole {
    pub fn from_descriptor(descriptor: u8) -> Self {
        match descriptor >> 5 {
            0b000 => ComponentRole::AbsentAttribute,
            0b001 => ComponentRole::Attribute,
            0b010 => ComponentRole::InvariantAttribute,
            0b011 => ComponentRole::Object,
            0b100 => ComponentRole::Reserved,
            0b101 => ComponentRole::RedundantSet,
            0b110 => ComponentRole::ReplacementSet,
            _ => ComponentRole::Set,
        }
    }

    fn is_set(&self) -> bool {
        matches!(self, ComponentRole::Set | ComponentRole::ReplacementSet | ComponentRole::RedundantSet)
    }

    fn is_attribute(&self) -> bool {
        matches!(
            self,
            ComponentRole::Attribute | ComponentRole::InvariantAttribute | ComponentRole::AbsentAttribute
        )
    }
}

// Set component format bits
const SET_TYPE: u8 = 0x10;
const SET_NAME: u8 = 0x08;
// Attribute component format bits
const ATTR_LABEL: u8 = 0x10;
const ATTR_COUNT: u8 = 0x08;
const ATTR_REP_CODE: u8 = 0x04;
const ATTR_UNITS: u8 = 0x02;
const ATTR_VALUE: u8 = 0x01;
// Object component format bit
const OBJECT_NAME: u8 = 0x10;

/// Set types with special meaning to the indexer.
pub mod set_type {
    pub const FILE_HEADER: &[u8] = b"FILE-HEADER";
    pub const ORIGIN: &[u8] = b"ORIGIN";
    pub const CHANNEL: &[u8] = b"CHANNEL";
    pub const FRAME: &[u8] = b"FRAME";
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub label: Vec<u8>,
    pub count: u32,
    pub rep_code: u8,
    pub units: Vec<u8>,
    /// None when the attribute carries no value.
    pub value: Option<Vec<Value>>,
}

impl Attribute {
    const DEFAULT_REP_CODE: u8 = RepCode::Ident as u8;

    fn default_with_label(label: Vec<u8>) -> Self {
        Attribute {
            label,
            count: 1,
            rep_code: Self::DEFAULT_REP_CODE,
            units: Vec::new(),
            value: None,
        }
    }

    pub fn label_str(&self) -> String {
        decode_latin1(&self.label)
    }

    pub fn rep_code_name(&self) -> &'static str {
        RepCode::name_of(self.rep_code)
    }

    pub fn first_value(&self) -> Option<&Value> {
        self.value.as_ref().and_then(|values| values.first())
    }

    pub fn values(&self) -> &[Value] {
        self.value.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub name: ObjectName,
    pub attributes: Vec<Attribute>,
}

impl Object {
    pub fn attribute(&self, label: &[u8]) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.label == label)
    }
}

/// An Explicitly Formatted Logical Record: one Set, its template and objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Eflr {
    pub lr_type: u8,
    pub set_type: Vec<u8>,
    pub set_name: Vec<u8>,
    pub template: Vec<Attribute>,
    pub objects: Vec<Object>,
}

impl Eflr {
    /// Logical Record types below this are public, the rest are private.
    pub const FIRST_PRIVATE_LR_TYPE: u8 = 128;

    pub fn parse(lr_type: u8, data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        let descriptor = cursor.read_u8()?;
        if !ComponentRole::from_descriptor(descriptor).is_set() {
            return Err(IndexError::Decode(format!(
                "EFLR starts with component 0x{:02x} that is not a Set",
                descriptor
            )));
        }
        if descriptor & SET_TYPE == 0 {
            return Err(IndexError::Decode("Set component has no type".to_string()));
        }
        let set_type = RepCodeReader::read_ident(&mut cursor)?;
        let set_name = if descriptor & SET_NAME != 0 {
            RepCodeReader::read_ident(&mut cursor)?
        } else {
            Vec::new()
        };

        let mut template = Vec::new();
        while let Some(role) = peek_role(&cursor) {
            if !role.is_attribute() {
                break;
            }
            let descriptor = cursor.read_u8()?;
            if descriptor & ATTR_LABEL == 0 {
                return Err(IndexError::Decode(format!(
                    "template attribute {} of {} has no label",
                    template.len(),
                    decode_latin1(&set_type)
                )));
            }
            let label = RepCodeReader::read_ident(&mut cursor)?;
            let mut attribute = Attribute::default_with_label(label);
            read_attribute_fields(&mut cursor, descriptor & !ATTR_LABEL, &mut attribute)?;
            template.push(attribute);
        }

        let mut objects = Vec::new();
        while let Some(role) = peek_role(&cursor) {
            let descriptor = cursor.read_u8()?;
            if role != ComponentRole::Object || descriptor & OBJECT_NAME == 0 {
                return Err(IndexError::Decode(format!(
                    "expected a named Object component but found 0x{:02x}",
                    descriptor
                )));
            }
            let name = RepCodeReader::read_obname(&mut cursor)?;
            let mut attributes = Vec::with_capacity(template.len());
            for template_attribute in &template {
                match peek_role(&cursor) {
                    Some(role) if role.is_attribute() => {
                        let descriptor = cursor.read_u8()?;
                        if role == ComponentRole::AbsentAttribute {
                            attributes.push(Attribute {
                                count: 0,
                                value: None,
                                ..template_attribute.clone()
                            });
                            continue;
                        }
                        let mut attribute = template_attribute.clone();
                        if descriptor & ATTR_LABEL != 0 {
                            // Redundant in an object, the template label wins.
                            RepCodeReader::read_ident(&mut cursor)?;
                        }
                        read_attribute_fields(&mut cursor, descriptor & !ATTR_LABEL, &mut attribute)?;
                        attributes.push(attribute);
                    }
                    // Trailing attributes omitted, they take the template defaults.
                    _ => attributes.push(template_attribute.clone()),
                }
            }
            if let Some(role) = peek_role(&cursor) {
                if role.is_attribute() {
                    return Err(IndexError::Decode(format!(
                        "object {} has more attributes than the template",
                        name
                    )));
                }
            }
            objects.push(Object { name, attributes });
        }

        Ok(Eflr {
            lr_type,
            set_type,
            set_name,
            template,
            objects,
        })
    }

    pub fn is_public(&self) -> bool {
        self.lr_type < Self::FIRST_PRIVATE_LR_TYPE
    }

    pub fn set_type_str(&self) -> String {
        decode_latin1(&self.set_type)
    }

    pub fn object(&self, name: &ObjectName) -> Option<&Object> {
        self.objects.iter().find(|o| &o.name == name)
    }
}

fn peek_role(cursor: &Cursor<&[u8]>) -> Option<ComponentRole> {
    cursor
        .get_ref()
        .get(cursor.position() as usize)
        .map(|&descriptor| ComponentRole::from_descriptor(descriptor))
}

/// Reads count, representation code, units and value as flagged. Values use
/// whatever count and representation code are in force after those are read.
fn read_attribute_fields(cursor: &mut Cursor<&[u8]>, format: u8, attribute: &mut Attribute) -> Result<()> {
    if format & ATTR_COUNT != 0 {
        attribute.count = RepCodeReader::read_uvari(cursor)?;
    }
    if format & ATTR_REP_CODE != 0 {
        attribute.rep_code = cursor.read_u8()?;
    }
    if format & ATTR_UNITS != 0 {
        attribute.units = RepCodeReader::read_ident(cursor)?;
    }
    if format & ATTR_VALUE != 0 {
        let rep_code = RepCode::from_u8(attribute.rep_code).ok_or(IndexError::InvalidRepCode(attribute.rep_code))?;
        let remaining = cursor.get_ref().len() as u64 - cursor.position();
        if rep_code.fixed_size().map_or(false, |size| size as u64 * attribute.count as u64 > remaining) {
            return Err(IndexError::Decode(format!(
                "attribute {} declares {} values that overrun the record",
                attribute.label_str(),
                attribute.count
            )));
        }
        attribute.value = Some(RepCodeReader::read_values(cursor, rep_code, attribute.count as usize)?);
    }
    Ok(())
}
