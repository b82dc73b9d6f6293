//! Decoded telemetry records
//!
//! An [`EisRecord`] holds one frame's worth of raw instrument values. Values are
//! exactly what the instrument sent; no scaling or unit conversion is applied.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::protocol::layout::descriptors;
use crate::protocol::{
    Field, FieldDescriptor, FrameReader, ProtocolError, RawFrame, FIELD_LAYOUT, HEADER,
    HEADER_LEN, LAYOUT_LEN,
};

/// Number of cylinder channels reported per frame
pub const CYLINDERS: usize = 6;

/// One telemetry snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EisRecord {
    /// Header echo
    pub header: [u8; HEADER_LEN],
    /// Engine speed
    pub tach: u16,
    /// Cylinder head temperatures
    pub cht: [u16; CYLINDERS],
    /// Exhaust gas temperatures
    pub egt: [u16; CYLINDERS],
    /// Auxiliary input 5
    pub aux5: u16,
    /// Auxiliary input 6
    pub aux6: u16,
    /// Indicated airspeed
    pub airspeed: u16,
    /// Altitude
    pub altitude: i16,
    /// Bus voltage
    pub voltage: u16,
    /// Fuel flow
    pub fuel_flow: u16,
    /// Display units flag
    pub unit: u8,
    /// Carburetor temperature
    pub carb_temp: i8,
    /// Rate of climb sign
    pub roc_sign: i8,
    /// Outside air temperature
    pub oat: i8,
    /// Oil temperature
    pub oil_temp: u16,
    /// Oil pressure
    pub oil_pressure: u8,
    /// Auxiliary input 1
    pub aux1: u16,
    /// Auxiliary input 2
    pub aux2: u16,
    /// Auxiliary input 3
    pub aux3: u16,
    /// Auxiliary input 4
    pub aux4: u16,
    /// Coolant temperature
    pub coolant_temp: u16,
    /// Elapsed time
    pub elapsed_time: u16,
    /// Fuel quantity
    pub fuel_qty: u16,
    /// Timer hours
    pub hours: u8,
    /// Timer minutes
    pub minutes: u8,
    /// Timer seconds
    pub seconds: u8,
    /// Endurance hours
    pub end_hours: u8,
    /// Endurance minutes
    pub end_minutes: u8,
    /// Barometric pressure
    pub baro: u16,
    /// Magnetic heading
    pub mag_heading: u16,
    /// Reserved
    pub spare: u8,
}

impl Default for EisRecord {
    fn default() -> Self {
        Self {
            header: HEADER,
            tach: 0,
            cht: [0; CYLINDERS],
            egt: [0; CYLINDERS],
            aux5: 0,
            aux6: 0,
            airspeed: 0,
            altitude: 0,
            voltage: 0,
            fuel_flow: 0,
            unit: 0,
            carb_temp: 0,
            roc_sign: 0,
            oat: 0,
            oil_temp: 0,
            oil_pressure: 0,
            aux1: 0,
            aux2: 0,
            aux3: 0,
            aux4: 0,
            coolant_temp: 0,
            elapsed_time: 0,
            fuel_qty: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
            end_hours: 0,
            end_minutes: 0,
            baro: 0,
            mag_heading: 0,
            spare: 0,
        }
    }
}

/// A single field value, typed by its wire width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Header echo bytes
    Bytes([u8; HEADER_LEN]),
    /// Unsigned scalar (8 or 16 bits on the wire)
    Unsigned(u16),
    /// Signed scalar (8 or 16 bits on the wire)
    Signed(i16),
    /// Per-cylinder channel
    Cylinders([u16; CYLINDERS]),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bytes(b) => write!(f, "{:02X?}", b),
            FieldValue::Unsigned(v) => write!(f, "{}", v),
            FieldValue::Signed(v) => write!(f, "{}", v),
            FieldValue::Cylinders(v) => write!(f, "{:?}", v),
        }
    }
}

impl EisRecord {
    /// Validate the checksum and decode a frame.
    ///
    /// A checksum mismatch is the only error a well-formed frame can produce.
    pub fn decode(frame: &RawFrame) -> Result<Self, ProtocolError> {
        frame.verify_checksum()?;
        Self::decode_layout(frame.layout_bytes())
    }

    /// Decode header and payload bytes without checking the checksum
    pub fn decode_layout(data: &[u8]) -> Result<Self, ProtocolError> {
        let reader = FrameReader::new(data);
        let mut record = EisRecord::default();
        for desc in FIELD_LAYOUT.iter() {
            for index in 0..desc.count {
                let value = reader.read(desc, index)?;
                record.set_element(desc, index, value);
            }
        }
        Ok(record)
    }

    /// Encode into a complete frame with a valid checksum
    pub fn encode(&self) -> RawFrame {
        let mut layout = [0u8; LAYOUT_LEN];
        for desc in FIELD_LAYOUT.iter() {
            for index in 0..desc.count {
                desc.data_type.write_to_bytes(
                    &mut layout,
                    desc.element_offset(index),
                    self.element(desc.field, index),
                );
            }
        }
        RawFrame::seal(layout)
    }

    /// Get a field by identifier
    pub fn get(&self, field: Field) -> FieldValue {
        match field {
            Field::Header => FieldValue::Bytes(self.header),
            Field::Cht => FieldValue::Cylinders(self.cht),
            Field::Egt => FieldValue::Cylinders(self.egt),
            Field::Altitude => FieldValue::Signed(self.altitude),
            Field::CarbTemp => FieldValue::Signed(self.carb_temp as i16),
            Field::RocSign => FieldValue::Signed(self.roc_sign as i16),
            Field::Oat => FieldValue::Signed(self.oat as i16),
            other => FieldValue::Unsigned(self.element(other, 0) as u16),
        }
    }

    /// All fields in wire order
    pub fn fields(&self) -> impl Iterator<Item = (Field, FieldValue)> + '_ {
        descriptors()
            .iter()
            .map(move |d| (d.field, self.get(d.field)))
    }

    /// Element `index` of a field, widened to i32
    fn element(&self, field: Field, index: usize) -> i32 {
        match field {
            Field::Header => self.header[index] as i32,
            Field::Tach => self.tach as i32,
            Field::Cht => self.cht[index] as i32,
            Field::Egt => self.egt[index] as i32,
            Field::Aux5 => self.aux5 as i32,
            Field::Aux6 => self.aux6 as i32,
            Field::Airspeed => self.airspeed as i32,
            Field::Altitude => self.altitude as i32,
            Field::Voltage => self.voltage as i32,
            Field::FuelFlow => self.fuel_flow as i32,
            Field::Unit => self.unit as i32,
            Field::CarbTemp => self.carb_temp as i32,
            Field::RocSign => self.roc_sign as i32,
            Field::Oat => self.oat as i32,
            Field::OilTemp => self.oil_temp as i32,
            Field::OilPressure => self.oil_pressure as i32,
            Field::Aux1 => self.aux1 as i32,
            Field::Aux2 => self.aux2 as i32,
            Field::Aux3 => self.aux3 as i32,
            Field::Aux4 => self.aux4 as i32,
            Field::CoolantTemp => self.coolant_temp as i32,
            Field::ElapsedTime => self.elapsed_time as i32,
            Field::FuelQty => self.fuel_qty as i32,
            Field::Hours => self.hours as i32,
            Field::Minutes => self.minutes as i32,
            Field::Seconds => self.seconds as i32,
            Field::EndHours => self.end_hours as i32,
            Field::EndMinutes => self.end_minutes as i32,
            Field::Baro => self.baro as i32,
            Field::MagHeading => self.mag_heading as i32,
            Field::Spare => self.spare as i32,
        }
    }

    // Values come from `DataType::read_from_bytes` for this descriptor, so the
    // narrowing casts below are exact.
    fn set_element(&mut self, desc: &FieldDescriptor, index: usize, value: i32) {
        match desc.field {
            Field::Header => self.header[index] = value as u8,
            Field::Tach => self.tach = value as u16,
            Field::Cht => self.cht[index] = value as u16,
            Field::Egt => self.egt[index] = value as u16,
            Field::Aux5 => self.aux5 = value as u16,
            Field::Aux6 => self.aux6 = value as u16,
            Field::Airspeed => self.airspeed = value as u16,
            Field::Altitude => self.altitude = value as i16,
            Field::Voltage => self.voltage = value as u16,
            Field::FuelFlow => self.fuel_flow = value as u16,
            Field::Unit => self.unit = value as u8,
            Field::CarbTemp => self.carb_temp = value as i8,
            Field::RocSign => self.roc_sign = value as i8,
            Field::Oat => self.oat = value as i8,
            Field::OilTemp => self.oil_temp = value as u16,
            Field::OilPressure => self.oil_pressure = value as u8,
            Field::Aux1 => self.aux1 = value as u16,
            Field::Aux2 => self.aux2 = value as u16,
            Field::Aux3 => self.aux3 = value as u16,
            Field::Aux4 => self.aux4 = value as u16,
            Field::CoolantTemp => self.coolant_temp = value as u16,
            Field::ElapsedTime => self.elapsed_time = value as u16,
            Field::FuelQty => self.fuel_qty = value as u16,
            Field::Hours => self.hours = value as u8,
            Field::Minutes => self.minutes = value as u8,
            Field::Seconds => self.seconds = value as u8,
            Field::EndHours => self.end_hours = value as u8,
            Field::EndMinutes => self.end_minutes = value as u8,
            Field::Baro => self.baro = value as u16,
            Field::MagHeading => self.mag_heading = value as u16,
            Field::Spare => self.spare = value as u8,
        }
    }
}

impl fmt::Display for EisRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, value)) in self.fields().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", field.name(), value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{CAPTURE_LEN, FRAME_LEN};
    use pretty_assertions::assert_eq;

    fn sample() -> EisRecord {
        EisRecord {
            tach: 2450,
            cht: [351, 348, 360, 355, 342, 349],
            egt: [1320, 1298, 1341, 1335, 1310, 1302],
            altitude: -120,
            voltage: 138,
            carb_temp: -5,
            roc_sign: -1,
            oat: -12,
            oil_temp: 195,
            oil_pressure: 62,
            fuel_qty: 180,
            hours: 1,
            minutes: 42,
            seconds: 7,
            baro: 2992,
            mag_heading: 271,
            spare: 0xAA,
            ..Default::default()
        }
    }

    #[test]
    fn test_tach_only_frame() {
        let mut layout = [0u8; LAYOUT_LEN];
        layout[..HEADER_LEN].copy_from_slice(&HEADER);
        layout[3] = 0x12;
        layout[4] = 0x34;
        let frame = RawFrame::seal(layout);

        let record = EisRecord::decode(&frame).unwrap();
        assert_eq!(record.tach, 4660);
        assert_eq!(
            record,
            EisRecord {
                tach: 4660,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_encode_places_fields_big_endian() {
        let frame = sample().encode();
        let bytes = frame.as_bytes();
        assert_eq!(bytes.len(), FRAME_LEN);
        assert_eq!(&bytes[..3], &HEADER);
        // tach
        assert_eq!(&bytes[3..5], &[0x09, 0x92]);
        // cht[0]
        assert_eq!(&bytes[5..7], &[0x01, 0x5F]);
        // altitude, signed
        assert_eq!(&bytes[35..37], &[0xFF, 0x88]);
        // carb temp, signed byte
        assert_eq!(bytes[42], 0xFB);
        assert_eq!(bytes[71], 0xAA);
    }

    #[test]
    fn test_decode_matches_encoded_values() {
        let record = sample();
        assert_eq!(EisRecord::decode(&record.encode()).unwrap(), record);
    }

    #[test]
    fn test_decode_is_idempotent() {
        let frame = sample().encode();
        let first = EisRecord::decode(&frame).unwrap();
        let second = EisRecord::decode(&frame).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_bad_checksum_rejected() {
        let mut bytes = *sample().encode().as_bytes();
        bytes[FRAME_LEN - 1] ^= 0x01;
        let frame = RawFrame::from_bytes(&bytes).unwrap();
        assert!(matches!(
            EisRecord::decode(&frame),
            Err(ProtocolError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_short_layout_is_layout_error() {
        let err = EisRecord::decode_layout(&[0u8; CAPTURE_LEN - 10]).unwrap_err();
        assert!(matches!(err, ProtocolError::LayoutDecode { .. }));
    }

    #[test]
    fn test_get_and_fields() {
        let record = sample();
        assert_eq!(record.get(Field::Tach), FieldValue::Unsigned(2450));
        assert_eq!(record.get(Field::Oat), FieldValue::Signed(-12));
        assert_eq!(record.get(Field::OilPressure), FieldValue::Unsigned(62));
        assert_eq!(
            record.get(Field::Egt),
            FieldValue::Cylinders([1320, 1298, 1341, 1335, 1310, 1302])
        );
        assert_eq!(record.fields().count(), FIELD_LAYOUT.len());
    }

    #[test]
    fn test_display_lists_fields_in_order() {
        let text = sample().to_string();
        assert!(text.starts_with("header=[FE, FF, FE] tach=2450 cht=[351, 348"));
        assert!(text.contains("altitude=-120"));
        assert!(text.ends_with("mag_heading=271 spare=170"));
    }
}
