//! Record layout
//!
//! The wire format carries no tags or lengths, so the position of every field
//! is fixed by [`FIELD_LAYOUT`]. Decoding walks the table in order with a
//! [`FrameReader`]; the record type only stores the results.

use byteorder::{BigEndian, ByteOrder};
use serde::{Deserialize, Serialize};

use super::ProtocolError;

/// Wire type of a single field element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// Unsigned 8-bit integer
    U08,
    /// Signed 8-bit integer
    S08,
    /// Unsigned 16-bit integer
    U16,
    /// Signed 16-bit integer
    S16,
}

impl DataType {
    /// Get the size in bytes for this data type
    pub const fn size_bytes(&self) -> usize {
        match self {
            DataType::U08 | DataType::S08 => 1,
            DataType::U16 | DataType::S16 => 2,
        }
    }

    /// Whether values of this type carry a sign
    pub fn is_signed(&self) -> bool {
        matches!(self, DataType::S08 | DataType::S16)
    }

    /// Read a big-endian value from bytes at given offset
    pub fn read_from_bytes(&self, data: &[u8], offset: usize) -> Option<i32> {
        let bytes = data.get(offset..offset + self.size_bytes())?;
        Some(match self {
            DataType::U08 => bytes[0] as i32,
            DataType::S08 => bytes[0] as i8 as i32,
            DataType::U16 => BigEndian::read_u16(bytes) as i32,
            DataType::S16 => BigEndian::read_i16(bytes) as i32,
        })
    }

    /// Write a big-endian value to bytes at given offset.
    /// Values are truncated to the field width.
    pub fn write_to_bytes(&self, data: &mut [u8], offset: usize, value: i32) {
        let Some(bytes) = data.get_mut(offset..offset + self.size_bytes()) else {
            return;
        };
        match self {
            DataType::U08 => bytes[0] = value as u8,
            DataType::S08 => bytes[0] = value as i8 as u8,
            DataType::U16 => BigEndian::write_u16(bytes, value as u16),
            DataType::S16 => BigEndian::write_i16(bytes, value as i16),
        }
    }
}

/// Identifies one field of an EIS record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    /// Frame header echo
    Header,
    /// Engine speed
    Tach,
    /// Cylinder head temperatures
    Cht,
    /// Exhaust gas temperatures
    Egt,
    /// Auxiliary input 5
    Aux5,
    /// Auxiliary input 6
    Aux6,
    /// Indicated airspeed
    Airspeed,
    /// Altitude (signed)
    Altitude,
    /// Bus voltage
    Voltage,
    /// Fuel flow
    FuelFlow,
    /// Display units flag
    Unit,
    /// Carburetor temperature (signed)
    CarbTemp,
    /// Rate of climb sign
    RocSign,
    /// Outside air temperature (signed)
    Oat,
    /// Oil temperature
    OilTemp,
    /// Oil pressure
    OilPressure,
    /// Auxiliary input 1
    Aux1,
    /// Auxiliary input 2
    Aux2,
    /// Auxiliary input 3
    Aux3,
    /// Auxiliary input 4
    Aux4,
    /// Coolant temperature
    CoolantTemp,
    /// Elapsed time
    ElapsedTime,
    /// Fuel quantity
    FuelQty,
    /// Timer hours
    Hours,
    /// Timer minutes
    Minutes,
    /// Timer seconds
    Seconds,
    /// Endurance hours
    EndHours,
    /// Endurance minutes
    EndMinutes,
    /// Barometric pressure
    Baro,
    /// Magnetic heading
    MagHeading,
    /// Reserved
    Spare,
}

impl Field {
    /// Short channel name used in logs and JSON output
    pub fn name(&self) -> &'static str {
        match self {
            Field::Header => "header",
            Field::Tach => "tach",
            Field::Cht => "cht",
            Field::Egt => "egt",
            Field::Aux5 => "aux5",
            Field::Aux6 => "aux6",
            Field::Airspeed => "airspeed",
            Field::Altitude => "altitude",
            Field::Voltage => "voltage",
            Field::FuelFlow => "fuel_flow",
            Field::Unit => "unit",
            Field::CarbTemp => "carb_temp",
            Field::RocSign => "roc_sign",
            Field::Oat => "oat",
            Field::OilTemp => "oil_temp",
            Field::OilPressure => "oil_pressure",
            Field::Aux1 => "aux1",
            Field::Aux2 => "aux2",
            Field::Aux3 => "aux3",
            Field::Aux4 => "aux4",
            Field::CoolantTemp => "coolant_temp",
            Field::ElapsedTime => "elapsed_time",
            Field::FuelQty => "fuel_qty",
            Field::Hours => "hours",
            Field::Minutes => "minutes",
            Field::Seconds => "seconds",
            Field::EndHours => "end_hours",
            Field::EndMinutes => "end_minutes",
            Field::Baro => "baro",
            Field::MagHeading => "mag_heading",
            Field::Spare => "spare",
        }
    }

    /// Look up the layout entry for this field
    pub fn descriptor(&self) -> &'static FieldDescriptor {
        let layout = descriptors();
        // Every variant appears in the layout exactly once
        layout
            .iter()
            .find(|d| d.field == *self)
            .unwrap_or(&layout[0])
    }
}

/// Position and type of one field within the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Which field this describes
    pub field: Field,
    /// Byte offset from the first header byte
    pub offset: usize,
    /// Element type
    pub data_type: DataType,
    /// Number of consecutive elements
    pub count: usize,
}

impl FieldDescriptor {
    const fn new(field: Field, offset: usize, data_type: DataType, count: usize) -> Self {
        Self {
            field,
            offset,
            data_type,
            count,
        }
    }

    /// Total bytes occupied by this field
    pub const fn size_bytes(&self) -> usize {
        self.data_type.size_bytes() * self.count
    }

    /// Byte offset of element `index`
    pub fn element_offset(&self, index: usize) -> usize {
        self.offset + index * self.data_type.size_bytes()
    }
}

use DataType::{S08, S16, U08, U16};

/// On-wire field order. Offsets count from the first header byte.
pub const FIELD_LAYOUT: [FieldDescriptor; 31] = [
    FieldDescriptor::new(Field::Header, 0, U08, 3),
    FieldDescriptor::new(Field::Tach, 3, U16, 1),
    FieldDescriptor::new(Field::Cht, 5, U16, 6),
    FieldDescriptor::new(Field::Egt, 17, U16, 6),
    FieldDescriptor::new(Field::Aux5, 29, U16, 1),
    FieldDescriptor::new(Field::Aux6, 31, U16, 1),
    FieldDescriptor::new(Field::Airspeed, 33, U16, 1),
    FieldDescriptor::new(Field::Altitude, 35, S16, 1),
    FieldDescriptor::new(Field::Voltage, 37, U16, 1),
    FieldDescriptor::new(Field::FuelFlow, 39, U16, 1),
    FieldDescriptor::new(Field::Unit, 41, U08, 1),
    FieldDescriptor::new(Field::CarbTemp, 42, S08, 1),
    FieldDescriptor::new(Field::RocSign, 43, S08, 1),
    FieldDescriptor::new(Field::Oat, 44, S08, 1),
    FieldDescriptor::new(Field::OilTemp, 45, U16, 1),
    FieldDescriptor::new(Field::OilPressure, 47, U08, 1),
    FieldDescriptor::new(Field::Aux1, 48, U16, 1),
    FieldDescriptor::new(Field::Aux2, 50, U16, 1),
    FieldDescriptor::new(Field::Aux3, 52, U16, 1),
    FieldDescriptor::new(Field::Aux4, 54, U16, 1),
    FieldDescriptor::new(Field::CoolantTemp, 56, U16, 1),
    FieldDescriptor::new(Field::ElapsedTime, 58, U16, 1),
    FieldDescriptor::new(Field::FuelQty, 60, U16, 1),
    FieldDescriptor::new(Field::Hours, 62, U08, 1),
    FieldDescriptor::new(Field::Minutes, 63, U08, 1),
    FieldDescriptor::new(Field::Seconds, 64, U08, 1),
    FieldDescriptor::new(Field::EndHours, 65, U08, 1),
    FieldDescriptor::new(Field::EndMinutes, 66, U08, 1),
    FieldDescriptor::new(Field::Baro, 67, U16, 1),
    FieldDescriptor::new(Field::MagHeading, 69, U16, 1),
    FieldDescriptor::new(Field::Spare, 71, U08, 1),
];

/// The layout as a static slice
pub fn descriptors() -> &'static [FieldDescriptor] {
    &FIELD_LAYOUT
}

/// Bytes covered by the layout, header included
pub const LAYOUT_LEN: usize = layout_len(&FIELD_LAYOUT);

const fn layout_len(layout: &[FieldDescriptor]) -> usize {
    let mut len = 0;
    let mut i = 0;
    while i < layout.len() {
        len += layout[i].size_bytes();
        i += 1;
    }
    len
}

const fn is_contiguous(layout: &[FieldDescriptor]) -> bool {
    let mut next = 0;
    let mut i = 0;
    while i < layout.len() {
        if layout[i].offset != next {
            return false;
        }
        next += layout[i].size_bytes();
        i += 1;
    }
    true
}

const _: () = assert!(is_contiguous(&FIELD_LAYOUT), "fields must be packed in order");
const _: () = assert!(LAYOUT_LEN == 72);

/// Big-endian reader over a layout-sized byte slice
#[derive(Debug, Clone, Copy)]
pub struct FrameReader<'a> {
    data: &'a [u8],
}

impl<'a> FrameReader<'a> {
    /// Wrap the bytes starting at the first header byte
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Read element `index` of the described field
    pub fn read(&self, desc: &FieldDescriptor, index: usize) -> Result<i32, ProtocolError> {
        let offset = desc.element_offset(index);
        desc.data_type
            .read_from_bytes(self.data, offset)
            .ok_or(ProtocolError::LayoutDecode {
                field: desc.field.name(),
                offset,
                needed: desc.data_type.size_bytes(),
                available: self.data.len().saturating_sub(offset),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_covers_header_and_payload() {
        assert_eq!(LAYOUT_LEN, 72);
        assert_eq!(FIELD_LAYOUT.first().map(|d| d.field), Some(Field::Header));
        assert_eq!(FIELD_LAYOUT.last().map(|d| d.field), Some(Field::Spare));
    }

    #[test]
    fn test_every_field_has_one_descriptor() {
        for desc in FIELD_LAYOUT.iter() {
            let matches = FIELD_LAYOUT.iter().filter(|d| d.field == desc.field).count();
            assert_eq!(matches, 1, "{}", desc.field.name());
            assert_eq!(desc.field.descriptor(), desc);
        }
    }

    #[test]
    fn test_signed_fields() {
        let signed: Vec<&str> = FIELD_LAYOUT
            .iter()
            .filter(|d| d.data_type.is_signed())
            .map(|d| d.field.name())
            .collect();
        assert_eq!(signed, vec!["altitude", "carb_temp", "roc_sign", "oat"]);
    }

    #[test]
    fn test_read_big_endian() {
        let data = [0x12, 0x34, 0xFF, 0xFE];
        assert_eq!(U16.read_from_bytes(&data, 0), Some(0x1234));
        assert_eq!(S16.read_from_bytes(&data, 2), Some(-2));
        assert_eq!(U08.read_from_bytes(&data, 2), Some(255));
        assert_eq!(S08.read_from_bytes(&data, 2), Some(-1));
        assert_eq!(U16.read_from_bytes(&data, 3), None);
    }

    #[test]
    fn test_write_then_read() {
        let mut data = [0u8; 4];
        S16.write_to_bytes(&mut data, 0, -300);
        S08.write_to_bytes(&mut data, 2, -40);
        assert_eq!(data[..2], [0xFE, 0xD4]);
        assert_eq!(S16.read_from_bytes(&data, 0), Some(-300));
        assert_eq!(S08.read_from_bytes(&data, 2), Some(-40));
    }

    #[test]
    fn test_reader_reports_short_input() {
        let data = [0u8; 10];
        let reader = FrameReader::new(&data);
        let err = reader.read(Field::Cht.descriptor(), 3).unwrap_err();
        match err {
            ProtocolError::LayoutDecode {
                field,
                offset,
                needed,
                available,
            } => {
                assert_eq!(field, "cht");
                assert_eq!(offset, 11);
                assert_eq!(needed, 2);
                assert_eq!(available, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
