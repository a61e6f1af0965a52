//! Level II message decoding.
//!
//! Each record in the message stream starts with a 12-byte CTM header and a
//! 16-byte message header. Message 31 (generic digital radar data) records
//! are variable length; every other message occupies a fixed 2432-byte slot,
//! including the legacy message 1 (digital radar data).

use chrono::{DateTime, Duration, TimeZone, Utc};

use radar_common::{RadarError, RadarResult};

use crate::volume::field_name_for_moment;

/// CTM header preceding every message.
pub const CTM_HEADER_SIZE: usize = 12;

/// Message header size.
pub const MESSAGE_HEADER_SIZE: usize = 16;

/// Fixed slot size of non-31 messages, CTM header included.
pub const FIXED_RECORD_SIZE: usize = 2432;

/// Raw value for "below threshold".
const RAW_BELOW_THRESHOLD: u16 = 0;
/// Raw value for "range folded".
const RAW_RANGE_FOLDED: u16 = 1;

// ===== Byte helpers =====

pub(crate) fn read_u8(data: &[u8], offset: usize) -> RadarResult<u8> {
    data.get(offset)
        .copied()
        .ok_or_else(|| RadarError::decode(format!("read past end at offset {}", offset)))
}

pub(crate) fn read_u16(data: &[u8], offset: usize) -> RadarResult<u16> {
    let bytes = data
        .get(offset..offset + 2)
        .ok_or_else(|| RadarError::decode(format!("read past end at offset {}", offset)))?;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

pub(crate) fn read_i16(data: &[u8], offset: usize) -> RadarResult<i16> {
    read_u16(data, offset).map(|v| v as i16)
}

pub(crate) fn read_u32(data: &[u8], offset: usize) -> RadarResult<u32> {
    let bytes = data
        .get(offset..offset + 4)
        .ok_or_else(|| RadarError::decode(format!("read past end at offset {}", offset)))?;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

pub(crate) fn read_f32(data: &[u8], offset: usize) -> RadarResult<f32> {
    read_u32(data, offset).map(f32::from_bits)
}

/// Convert a NEXRAD modified Julian date (day 1 = 1970-01-01) and
/// milliseconds past midnight to UTC.
pub fn nexrad_datetime(date: u32, millis: u32) -> RadarResult<DateTime<Utc>> {
    if date == 0 {
        return Err(RadarError::decode("modified julian date 0 is invalid"));
    }

    let epoch = Utc.timestamp_opt(0, 0).single().unwrap_or_default();
    Ok(epoch + Duration::days(date as i64 - 1) + Duration::milliseconds(millis as i64))
}

// ===== Message header =====

/// Message header following the CTM header.
#[derive(Debug, Clone, Copy)]
pub struct MessageHeader {
    /// Message size in halfwords, header included
    pub size_halfwords: u16,
    pub channel: u8,
    pub message_type: u8,
    pub sequence: u16,
    pub date: u16,
    pub millis: u32,
    pub segment_count: u16,
    pub segment_number: u16,
}

impl MessageHeader {
    pub fn parse(data: &[u8]) -> RadarResult<Self> {
        Ok(Self {
            size_halfwords: read_u16(data, 0)?,
            channel: read_u8(data, 2)?,
            message_type: read_u8(data, 3)?,
            sequence: read_u16(data, 4)?,
            date: read_u16(data, 6)?,
            millis: read_u32(data, 8)?,
            segment_count: read_u16(data, 12)?,
            segment_number: read_u16(data, 14)?,
        })
    }

    /// Total record length in the stream, CTM header included.
    pub fn record_len(&self) -> usize {
        match self.message_type {
            31 => CTM_HEADER_SIZE + self.size_halfwords as usize * 2,
            _ => FIXED_RECORD_SIZE,
        }
    }
}

// ===== Decoded radial =====

/// Site information carried in the message 31 volume block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteInfo {
    pub latitude: f64,
    pub longitude: f64,
    /// Site height plus feedhorn height, meters
    pub altitude: f64,
    pub vcp: u16,
}

/// A single moment along one radial.
#[derive(Debug, Clone)]
pub struct Moment {
    /// Range to the center of the first gate, meters
    pub first_gate: f32,
    /// Gate spacing, meters
    pub gate_spacing: f32,
    /// Physical values, NaN where below threshold or range folded
    pub values: Vec<f32>,
}

impl Moment {
    /// Value of the gate containing `range_m`, if any.
    pub fn value_at_range(&self, range_m: f32) -> Option<f32> {
        if self.gate_spacing <= 0.0 {
            return None;
        }
        let offset = (range_m - self.first_gate) / self.gate_spacing + 0.5;
        if offset < 0.0 {
            return None;
        }
        self.values
            .get(offset as usize)
            .copied()
            .filter(|v| !v.is_nan())
    }
}

/// One decoded radial from either message 31 or message 1.
#[derive(Debug, Clone)]
pub struct Radial {
    pub time: DateTime<Utc>,
    pub azimuth: f32,
    pub elevation: f32,
    pub azimuth_number: u16,
    pub elevation_number: u8,
    pub radial_status: u8,
    pub nyquist_velocity: Option<f32>,
    pub unambiguous_range: Option<f32>,
    pub site: Option<SiteInfo>,
    /// Moments keyed by volume field name
    pub moments: Vec<(&'static str, Moment)>,
}

fn decode_gates(raw: impl Iterator<Item = u16>, scale: f32, offset: f32) -> Vec<f32> {
    raw.map(|r| match r {
        RAW_BELOW_THRESHOLD | RAW_RANGE_FOLDED => f32::NAN,
        r => (r as f32 - offset) / scale,
    })
    .collect()
}

// ===== Message 31 =====

/// Decode a message 31 body (the bytes after the message header).
pub fn decode_message_31(body: &[u8]) -> RadarResult<Radial> {
    let millis = read_u32(body, 4)?;
    let date = read_u16(body, 8)?;
    let azimuth_number = read_u16(body, 10)?;
    let azimuth = read_f32(body, 12)?;
    let radial_status = read_u8(body, 21)?;
    let elevation_number = read_u8(body, 22)?;
    let elevation = read_f32(body, 24)?;
    let block_count = read_u16(body, 30)? as usize;

    if block_count > 32 {
        return Err(RadarError::decode(format!(
            "message 31 claims {} data blocks",
            block_count
        )));
    }

    let mut radial = Radial {
        time: nexrad_datetime(date as u32, millis)?,
        azimuth,
        elevation,
        azimuth_number,
        elevation_number,
        radial_status,
        nyquist_velocity: None,
        unambiguous_range: None,
        site: None,
        moments: Vec::new(),
    };

    for i in 0..block_count {
        let pointer = read_u32(body, 32 + i * 4)? as usize;
        if pointer == 0 {
            continue;
        }
        let block = body.get(pointer..).ok_or_else(|| {
            RadarError::decode(format!("data block pointer {} beyond message end", pointer))
        })?;
        let block_type = read_u8(block, 0)?;
        let name = block
            .get(1..4)
            .map(|n| String::from_utf8_lossy(n).trim().to_string())
            .unwrap_or_default();

        match (block_type, name.as_str()) {
            (b'R', "VOL") => radial.site = Some(decode_volume_block(block)?),
            (b'R', "RAD") => {
                radial.unambiguous_range = Some(read_i16(block, 6)? as f32 * 100.0);
                radial.nyquist_velocity = Some(read_i16(block, 16)? as f32 / 100.0);
            }
            (b'R', _) => {}
            (b'D', moment) => {
                if let Some(field) = field_name_for_moment(moment) {
                    radial.moments.push((field, decode_moment_block(block)?));
                }
            }
            (other, _) => {
                return Err(RadarError::decode(format!(
                    "unknown data block type 0x{:02x}",
                    other
                )));
            }
        }
    }

    Ok(radial)
}

fn decode_volume_block(block: &[u8]) -> RadarResult<SiteInfo> {
    let latitude = read_f32(block, 8)? as f64;
    let longitude = read_f32(block, 12)? as f64;
    let site_height = read_i16(block, 16)? as f64;
    let feedhorn_height = read_u16(block, 18)? as f64;
    let vcp = read_u16(block, 40)?;

    Ok(SiteInfo {
        latitude,
        longitude,
        altitude: site_height + feedhorn_height,
        vcp,
    })
}

fn decode_moment_block(block: &[u8]) -> RadarResult<Moment> {
    let gates = read_u16(block, 8)? as usize;
    let first_gate = read_i16(block, 10)? as f32;
    let gate_spacing = read_i16(block, 12)? as f32;
    let word_size = read_u8(block, 19)?;
    let scale = read_f32(block, 20)?;
    let offset = read_f32(block, 24)?;

    if scale == 0.0 {
        return Err(RadarError::decode("moment block has zero scale"));
    }

    let values = match word_size {
        8 => {
            let raw = block
                .get(28..28 + gates)
                .ok_or_else(|| RadarError::decode("moment gates truncated"))?;
            decode_gates(raw.iter().map(|&r| r as u16), scale, offset)
        }
        16 => {
            let raw = block
                .get(28..28 + gates * 2)
                .ok_or_else(|| RadarError::decode("moment gates truncated"))?;
            decode_gates(
                raw.chunks_exact(2).map(|w| u16::from_be_bytes([w[0], w[1]])),
                scale,
                offset,
            )
        }
        other => {
            return Err(RadarError::decode(format!("unsupported word size {}", other)));
        }
    };

    Ok(Moment {
        first_gate,
        gate_spacing,
        values,
    })
}

// ===== Message 1 =====

/// Coded angle used by message 1: `raw * 360 / 65536` degrees.
fn coded_angle(raw: u16) -> f32 {
    raw as f32 * 360.0 / 65536.0
}

/// Decode a message 1 body (the bytes after the message header).
///
/// Data pointers are byte offsets from the start of the body.
pub fn decode_message_1(body: &[u8]) -> RadarResult<Radial> {
    let millis = read_u32(body, 0)?;
    let date = read_u16(body, 4)?;
    let unambiguous_range = read_u16(body, 6)? as f32 * 100.0;
    let azimuth = coded_angle(read_u16(body, 8)?);
    let azimuth_number = read_u16(body, 10)?;
    let radial_status = read_u16(body, 12)? as u8;
    let elevation = coded_angle(read_u16(body, 14)?);
    let elevation_number = read_u16(body, 16)? as u8;
    let surveillance_first = read_i16(body, 18)? as f32;
    let doppler_first = read_i16(body, 20)? as f32;
    let surveillance_spacing = read_u16(body, 22)? as f32;
    let doppler_spacing = read_u16(body, 24)? as f32;
    let surveillance_gates = read_u16(body, 26)? as usize;
    let doppler_gates = read_u16(body, 28)? as usize;
    let reflectivity_pointer = read_u16(body, 36)? as usize;
    let velocity_pointer = read_u16(body, 38)? as usize;
    let width_pointer = read_u16(body, 40)? as usize;
    let doppler_resolution = read_u16(body, 42)?;
    let nyquist = read_u16(body, 60)? as f32 / 100.0;

    let gates_at = |pointer: usize, count: usize| -> RadarResult<&[u8]> {
        body.get(pointer..pointer + count).ok_or_else(|| {
            RadarError::decode(format!(
                "message 1 gates at {} (+{}) beyond message end",
                pointer, count
            ))
        })
    };

    let mut moments = Vec::new();

    if reflectivity_pointer != 0 && surveillance_gates > 0 {
        let raw = gates_at(reflectivity_pointer, surveillance_gates)?;
        moments.push((
            crate::volume::fields::REFLECTIVITY,
            Moment {
                first_gate: surveillance_first,
                gate_spacing: surveillance_spacing,
                values: decode_gates(raw.iter().map(|&r| r as u16), 2.0, 66.0),
            },
        ));
    }

    if velocity_pointer != 0 && doppler_gates > 0 {
        let raw = gates_at(velocity_pointer, doppler_gates)?;
        let scale = if doppler_resolution == 4 { 1.0 } else { 2.0 };
        moments.push((
            crate::volume::fields::VELOCITY,
            Moment {
                first_gate: doppler_first,
                gate_spacing: doppler_spacing,
                values: decode_gates(raw.iter().map(|&r| r as u16), scale, 129.0),
            },
        ));
    }

    if width_pointer != 0 && doppler_gates > 0 {
        let raw = gates_at(width_pointer, doppler_gates)?;
        moments.push((
            crate::volume::fields::SPECTRUM_WIDTH,
            Moment {
                first_gate: doppler_first,
                gate_spacing: doppler_spacing,
                values: decode_gates(raw.iter().map(|&r| r as u16), 2.0, 129.0),
            },
        ));
    }

    Ok(Radial {
        time: nexrad_datetime(date as u32, millis)?,
        azimuth,
        elevation,
        azimuth_number,
        elevation_number,
        radial_status,
        nyquist_velocity: (doppler_gates > 0).then_some(nyquist),
        unambiguous_range: Some(unambiguous_range),
        site: None,
        moments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nexrad_datetime_epoch() {
        let dt = nexrad_datetime(1, 0).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap());
        assert!(nexrad_datetime(0, 0).is_err());
    }

    #[test]
    fn test_coded_angle() {
        assert_eq!(coded_angle(0), 0.0);
        assert_eq!(coded_angle(16384), 90.0);
        assert_eq!(coded_angle(32768), 180.0);
    }

    #[test]
    fn test_decode_gates_masks_reserved_values() {
        let values = decode_gates([0u16, 1, 66, 130].into_iter(), 2.0, 66.0);
        assert!(values[0].is_nan());
        assert!(values[1].is_nan());
        assert_eq!(values[2], 0.0);
        assert_eq!(values[3], 32.0);
    }

    #[test]
    fn test_moment_block_16_bit() {
        let mut block = vec![0u8; 28];
        block[0] = b'D';
        block[1..4].copy_from_slice(b"PHI");
        block[8..10].copy_from_slice(&2u16.to_be_bytes());
        block[10..12].copy_from_slice(&2125i16.to_be_bytes());
        block[12..14].copy_from_slice(&250i16.to_be_bytes());
        block[19] = 16;
        block[20..24].copy_from_slice(&2.8361f32.to_be_bytes());
        block[24..28].copy_from_slice(&2.0f32.to_be_bytes());
        block.extend_from_slice(&0u16.to_be_bytes());
        block.extend_from_slice(&285u16.to_be_bytes());

        let moment = decode_moment_block(&block).unwrap();
        assert_eq!(moment.values.len(), 2);
        assert!(moment.values[0].is_nan());
        assert!((moment.values[1] - 99.785).abs() < 0.01);
        assert_eq!(moment.first_gate, 2125.0);
        assert_eq!(moment.gate_spacing, 250.0);
    }

    #[test]
    fn test_value_at_range() {
        let moment = Moment {
            first_gate: 2000.0,
            gate_spacing: 250.0,
            values: vec![10.0, f32::NAN, 30.0],
        };
        assert_eq!(moment.value_at_range(2000.0), Some(10.0));
        assert_eq!(moment.value_at_range(2120.0), Some(10.0));
        assert_eq!(moment.value_at_range(2250.0), None);
        assert_eq!(moment.value_at_range(2500.0), Some(30.0));
        assert_eq!(moment.value_at_range(1500.0), None);
        assert_eq!(moment.value_at_range(3000.0), None);
    }

    #[test]
    fn test_record_len() {
        let mut header = [0u8; 16];
        header[0..2].copy_from_slice(&1000u16.to_be_bytes());
        header[3] = 31;
        let parsed = MessageHeader::parse(&header).unwrap();
        assert_eq!(parsed.record_len(), 12 + 2000);

        header[3] = 2;
        let parsed = MessageHeader::parse(&header).unwrap();
        assert_eq!(parsed.record_len(), FIXED_RECORD_SIZE);
    }
}
