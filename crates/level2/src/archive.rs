//! Archive II container handling.
//!
//! An Archive II file is a 24-byte volume header record followed by either
//! LDM records (big-endian size word + bzip2 stream) or, for older builds,
//! raw message records. Files distributed as `.gz` carry an extra gzip layer
//! around the whole thing.

use std::io::Read;

use bzip2::read::BzDecoder;
use chrono::{DateTime, Utc};
use flate2::read::MultiGzDecoder;
use tracing::debug;

use radar_common::{RadarError, RadarResult};

use crate::message::{nexrad_datetime, read_u32};

/// Size of the volume header record.
pub const VOLUME_HEADER_SIZE: usize = 24;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const BZIP2_MAGIC: &[u8; 3] = b"BZh";

/// Volume header record.
#[derive(Debug, Clone)]
pub struct VolumeHeader {
    /// Tape filename, e.g. `AR2V0006.`
    pub tape_name: String,
    /// Extension number, e.g. `001`
    pub extension: String,
    /// Volume start time
    pub start_time: DateTime<Utc>,
    /// Radar ICAO identifier
    pub icao: String,
}

impl VolumeHeader {
    /// Parse the 24-byte volume header.
    pub fn parse(data: &[u8]) -> RadarResult<Self> {
        if data.len() < VOLUME_HEADER_SIZE {
            return Err(RadarError::decode(format!(
                "volume header needs {} bytes, got {}",
                VOLUME_HEADER_SIZE,
                data.len()
            )));
        }

        if &data[0..4] != b"AR2V" && &data[0..4] != b"ARCH" {
            return Err(RadarError::decode("not an Archive II file (missing AR2V magic)"));
        }

        let tape_name = String::from_utf8_lossy(&data[0..9]).to_string();
        let extension = String::from_utf8_lossy(&data[9..12]).to_string();
        let date = read_u32(data, 12)?;
        let millis = read_u32(data, 16)?;
        let icao = String::from_utf8_lossy(&data[20..24]).trim().to_string();

        Ok(Self {
            tape_name,
            extension,
            start_time: nexrad_datetime(date, millis)?,
            icao,
        })
    }

    /// Archive II build version from the tape name (`AR2V0006.` -> 6).
    pub fn version(&self) -> Option<u32> {
        self.tape_name.get(4..8).and_then(|v| v.parse().ok())
    }
}

/// Remove a gzip wrapper if present.
pub fn strip_gzip(data: &[u8]) -> RadarResult<Vec<u8>> {
    if !data.starts_with(&GZIP_MAGIC) {
        return Ok(data.to_vec());
    }

    let mut out = Vec::with_capacity(data.len() * 4);
    MultiGzDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| RadarError::decode(format!("gzip decompression failed: {}", e)))?;

    debug!(compressed = data.len(), decompressed = out.len(), "Removed gzip layer");
    Ok(out)
}

/// Split an Archive II file into its header and the concatenated message stream.
pub fn unpack(data: &[u8]) -> RadarResult<(VolumeHeader, Vec<u8>)> {
    let header = VolumeHeader::parse(data)?;
    let body = &data[VOLUME_HEADER_SIZE..];

    if !is_ldm_compressed(body) {
        debug!(bytes = body.len(), "Archive body is not LDM compressed");
        return Ok((header, body.to_vec()));
    }

    let mut messages = Vec::with_capacity(body.len() * 8);
    let mut pos = 0;
    let mut records = 0usize;

    while pos + 4 <= body.len() {
        let control = read_u32(body, pos)? as i32;
        let size = control.unsigned_abs() as usize;
        if size == 0 {
            break;
        }

        let start = pos + 4;
        let end = start + size;
        let block = body.get(start..end).ok_or_else(|| {
            RadarError::decode(format!(
                "LDM record {} truncated: needs {} bytes, {} available",
                records,
                size,
                body.len() - start
            ))
        })?;

        if !block.starts_with(BZIP2_MAGIC) {
            return Err(RadarError::decode(format!(
                "LDM record {} is not a bzip2 stream",
                records
            )));
        }

        BzDecoder::new(block)
            .read_to_end(&mut messages)
            .map_err(|e| RadarError::decode(format!("bzip2 record {} failed: {}", records, e)))?;

        records += 1;
        pos = end;
    }

    debug!(records, bytes = messages.len(), "Decompressed LDM records");
    Ok((header, messages))
}

fn is_ldm_compressed(body: &[u8]) -> bool {
    body.get(4..7).map_or(false, |magic| magic == BZIP2_MAGIC)
}
