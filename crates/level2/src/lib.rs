//! NEXRAD Level II (Archive II) decoder.
//!
//! Decodes the volumes published in the `noaa-nexrad-level2` archive into a
//! [`RadarVolume`]: sweeps of rays carrying named moment fields, the radar
//! location, per-ray instrument parameters and a CF-style time-units string.
//!
//! Supported inputs:
//! - build 10+ volumes (`_V06`, `_V0x.gz`) with bzip2 LDM records and
//!   message 31 radials
//! - legacy volumes with raw message 1 radials, optionally gzip-wrapped

pub mod archive;
pub mod message;
pub mod volume;

use std::path::Path;

use tracing::{debug, instrument};

use radar_common::{RadarError, RadarResult};

pub use archive::VolumeHeader;
pub use message::{Moment, Radial};
pub use volume::{fields, InstrumentParameters, Location, RadarVolume, Ray, Sweep};

use message::{
    decode_message_1, decode_message_31, MessageHeader, CTM_HEADER_SIZE, MESSAGE_HEADER_SIZE,
};

/// Decode an Archive II volume from memory.
pub fn decode(data: &[u8]) -> RadarResult<RadarVolume> {
    let data = archive::strip_gzip(data)?;
    let (header, messages) = archive::unpack(&data)?;
    let radials = decode_radials(&messages)?;

    debug!(
        site = %header.icao,
        version = ?header.version(),
        radials = radials.len(),
        "Decoded message stream"
    );

    RadarVolume::from_radials(header.icao, radials)
}

/// Read and decode an Archive II volume from disk.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_volume(path: &Path) -> RadarResult<RadarVolume> {
    let data = std::fs::read(path)?;
    decode(&data)
}

/// Walk the message stream and decode every radial.
pub fn decode_radials(messages: &[u8]) -> RadarResult<Vec<Radial>> {
    let mut radials = Vec::new();
    let mut pos = 0;

    while pos + CTM_HEADER_SIZE + MESSAGE_HEADER_SIZE <= messages.len() {
        let header = MessageHeader::parse(&messages[pos + CTM_HEADER_SIZE..])?;
        let body_start = pos + CTM_HEADER_SIZE + MESSAGE_HEADER_SIZE;
        let record_len = header.record_len();

        match header.message_type {
            31 => {
                if record_len < CTM_HEADER_SIZE + MESSAGE_HEADER_SIZE {
                    return Err(RadarError::decode(format!(
                        "message 31 at offset {} has size {} halfwords",
                        pos, header.size_halfwords
                    )));
                }
                let body = messages.get(body_start..pos + record_len).ok_or_else(|| {
                    RadarError::decode(format!("message 31 at offset {} truncated", pos))
                })?;
                radials.push(decode_message_31(body)?);
            }
            1 => {
                let end = (pos + record_len).min(messages.len());
                radials.push(decode_message_1(&messages[body_start..end])?);
            }
            _ => {}
        }

        pos += record_len;
    }

    Ok(radials)
}
