//! Synthetic Archive II volumes.
//!
//! Builds byte-exact Level II files with predictable moment patterns so the
//! decoder and the render pipeline can be tested without network access.

use std::io::Write;

use bzip2::write::BzEncoder;
use chrono::{DateTime, Duration, Timelike, Utc};
use flate2::write::GzEncoder;

/// Size of the fixed message slot, CTM header included.
const FIXED_RECORD_SIZE: usize = 2432;

/// Value pattern for a synthetic moment: `(azimuth_deg, gate_index) -> value`.
/// `None` encodes "below threshold".
pub type ValueFn = fn(f32, usize) -> Option<f32>;

/// A moment carried on every radial of a sweep.
#[derive(Clone)]
pub struct SyntheticField {
    /// Message 31 moment name: "REF", "VEL", "SW", "ZDR", "PHI", "RHO"
    pub moment: &'static str,
    pub gates: u16,
    pub first_gate_m: i16,
    pub gate_spacing_m: i16,
    /// 8 or 16
    pub word_size: u8,
    pub scale: f32,
    pub offset: f32,
    pub value: ValueFn,
}

impl SyntheticField {
    fn encode(&self, azimuth: f32) -> Vec<u8> {
        let max_raw = if self.word_size == 16 { 65535.0 } else { 255.0 };
        let mut out = Vec::with_capacity(self.gates as usize * (self.word_size as usize / 8));
        for gate in 0..self.gates as usize {
            let raw = match (self.value)(azimuth, gate) {
                Some(v) => (v * self.scale + self.offset).round().clamp(2.0, max_raw) as u16,
                None => 0,
            };
            if self.word_size == 16 {
                out.extend_from_slice(&raw.to_be_bytes());
            } else {
                out.push(raw as u8);
            }
        }
        out
    }

    fn block(&self, azimuth: f32) -> Vec<u8> {
        let mut block = Vec::with_capacity(28 + self.gates as usize * 2);
        block.push(b'D');
        block.extend_from_slice(&moment_name(self.moment));
        block.extend_from_slice(&0u32.to_be_bytes());
        block.extend_from_slice(&self.gates.to_be_bytes());
        block.extend_from_slice(&self.first_gate_m.to_be_bytes());
        block.extend_from_slice(&self.gate_spacing_m.to_be_bytes());
        block.extend_from_slice(&0u16.to_be_bytes()); // tover
        block.extend_from_slice(&0i16.to_be_bytes()); // snr threshold
        block.push(0); // control flags
        block.push(self.word_size);
        block.extend_from_slice(&self.scale.to_be_bytes());
        block.extend_from_slice(&self.offset.to_be_bytes());
        block.extend_from_slice(&self.encode(azimuth));
        block
    }
}

fn moment_name(name: &str) -> [u8; 3] {
    let mut out = [b' '; 3];
    for (dst, src) in out.iter_mut().zip(name.bytes()) {
        *dst = src;
    }
    out
}

/// One elevation cut.
#[derive(Clone)]
pub struct SyntheticSweep {
    pub elevation: f32,
    pub radials: u16,
    pub nyquist: f32,
    pub fields: Vec<SyntheticField>,
}

/// A complete synthetic volume.
#[derive(Clone)]
pub struct SyntheticVolume {
    pub icao: &'static str,
    pub start: DateTime<Utc>,
    pub latitude: f32,
    pub longitude: f32,
    pub site_height: i16,
    pub feedhorn_height: u16,
    pub vcp: u16,
    pub sweeps: Vec<SyntheticSweep>,
    /// Radials per bzip2 LDM record
    pub radials_per_record: usize,
}

/// Reflectivity ramp: -10 dBZ at the first gate, +0.5 dBZ per gate,
/// every 50th gate below threshold.
pub fn reflectivity_ramp(_azimuth: f32, gate: usize) -> Option<f32> {
    if gate % 50 == 49 {
        None
    } else {
        Some((gate as f32 * 0.5 - 10.0).min(70.0))
    }
}

/// Outbound +10 m/s on the eastern half, inbound -10 m/s on the western half.
pub fn velocity_dipole(azimuth: f32, _gate: usize) -> Option<f32> {
    if azimuth < 180.0 {
        Some(10.0)
    } else {
        Some(-10.0)
    }
}

pub fn constant_zdr(_azimuth: f32, _gate: usize) -> Option<f32> {
    Some(1.5)
}

pub fn constant_rho(_azimuth: f32, _gate: usize) -> Option<f32> {
    Some(0.95)
}

pub fn constant_phi(_azimuth: f32, _gate: usize) -> Option<f32> {
    Some(100.0)
}

pub fn constant_width(_azimuth: f32, _gate: usize) -> Option<f32> {
    Some(2.0)
}

fn field(moment: &'static str, scale: f32, offset: f32, value: ValueFn) -> SyntheticField {
    SyntheticField {
        moment,
        gates: 460,
        first_gate_m: 2125,
        gate_spacing_m: 250,
        word_size: 8,
        scale,
        offset,
        value,
    }
}

impl SyntheticVolume {
    /// A KHGX-like split-cut volume.
    ///
    /// Sweep 0 is the surveillance cut (REF, ZDR, PHI, RHO); sweep 1 is the
    /// Doppler cut at the same elevation (REF, VEL, SW).
    pub fn khgx_split_cut(start: DateTime<Utc>) -> Self {
        let mut phi = field("PHI", 2.8361, 2.0, constant_phi);
        phi.word_size = 16;

        Self {
            icao: "KHGX",
            start,
            latitude: 29.4719,
            longitude: -95.0792,
            site_height: 5,
            feedhorn_height: 20,
            vcp: 212,
            sweeps: vec![
                SyntheticSweep {
                    elevation: 0.48,
                    radials: 360,
                    nyquist: 8.5,
                    fields: vec![
                        field("REF", 2.0, 66.0, reflectivity_ramp),
                        field("ZDR", 16.0, 128.0, constant_zdr),
                        phi,
                        field("RHO", 300.0, -60.5, constant_rho),
                    ],
                },
                SyntheticSweep {
                    elevation: 0.48,
                    radials: 360,
                    nyquist: 26.5,
                    fields: vec![
                        field("REF", 2.0, 66.0, reflectivity_ramp),
                        field("VEL", 2.0, 129.0, velocity_dipole),
                        field("SW", 2.0, 129.0, constant_width),
                    ],
                },
            ],
            radials_per_record: 120,
        }
    }

    /// Uncompressed message stream (every radial as a message 31 record),
    /// preceded by one metadata slot.
    pub fn message_records(&self) -> Vec<Vec<u8>> {
        let mut records = vec![metadata_record()];
        let total: usize = self.sweeps.iter().map(|s| s.radials as usize).sum();
        let mut index = 0usize;

        for (sweep_idx, sweep) in self.sweeps.iter().enumerate() {
            for radial in 0..sweep.radials {
                let status = match (index, radial) {
                    (0, _) => 3,
                    (i, _) if i + 1 == total => 4,
                    (_, 0) => 0,
                    (_, r) if r + 1 == sweep.radials => 2,
                    _ => 1,
                };
                records.push(self.message_31(sweep_idx, sweep, radial, status, index));
                index += 1;
            }
        }

        records
    }

    fn message_31(
        &self,
        sweep_idx: usize,
        sweep: &SyntheticSweep,
        radial: u16,
        status: u8,
        index: usize,
    ) -> Vec<u8> {
        let time = self.start + Duration::milliseconds(40 * index as i64);
        let (date, millis) = nexrad_date(&time);
        let azimuth = (radial as f32 + 0.5) * 360.0 / sweep.radials as f32;

        let mut blocks = vec![self.volume_block(), elevation_block(), radial_block(sweep.nyquist)];
        blocks.extend(sweep.fields.iter().map(|f| f.block(azimuth)));

        let header_len = 32 + 4 * blocks.len();
        let mut pointers = Vec::with_capacity(blocks.len());
        let mut cursor = header_len;
        for block in &blocks {
            pointers.push(cursor as u32);
            cursor += block.len();
        }

        let mut body = Vec::with_capacity(cursor + 1);
        body.extend_from_slice(&padded_id(self.icao));
        body.extend_from_slice(&millis.to_be_bytes());
        body.extend_from_slice(&(date as u16).to_be_bytes());
        body.extend_from_slice(&(radial + 1).to_be_bytes());
        body.extend_from_slice(&azimuth.to_be_bytes());
        body.push(0); // compression
        body.push(0); // spare
        body.extend_from_slice(&(cursor as u16).to_be_bytes());
        body.push(2); // 1 degree azimuth spacing
        body.push(status);
        body.push(sweep_idx as u8 + 1);
        body.push(1); // cut sector
        body.extend_from_slice(&sweep.elevation.to_be_bytes());
        body.push(0); // spot blanking
        body.push(0); // azimuth indexing
        body.extend_from_slice(&(blocks.len() as u16).to_be_bytes());
        for pointer in pointers {
            body.extend_from_slice(&pointer.to_be_bytes());
        }
        for block in blocks {
            body.extend_from_slice(&block);
        }
        if body.len() % 2 == 1 {
            body.push(0);
        }

        let mut record = vec![0u8; 12];
        record.extend_from_slice(&message_header(31, (16 + body.len()) / 2, date, millis));
        record.extend_from_slice(&body);
        record
    }

    fn volume_block(&self) -> Vec<u8> {
        let mut block = Vec::with_capacity(44);
        block.push(b'R');
        block.extend_from_slice(b"VOL");
        block.extend_from_slice(&44u16.to_be_bytes());
        block.push(1);
        block.push(0);
        block.extend_from_slice(&self.latitude.to_be_bytes());
        block.extend_from_slice(&self.longitude.to_be_bytes());
        block.extend_from_slice(&self.site_height.to_be_bytes());
        block.extend_from_slice(&self.feedhorn_height.to_be_bytes());
        for _ in 0..5 {
            block.extend_from_slice(&0f32.to_be_bytes());
        }
        block.extend_from_slice(&self.vcp.to_be_bytes());
        block.extend_from_slice(&0u16.to_be_bytes());
        block
    }

    /// Archive II file with bzip2 LDM records.
    pub fn to_archive_bytes(&self) -> Vec<u8> {
        let mut out = volume_header(b"AR2V0006.", self.icao, &self.start);
        let records = self.message_records();

        // First LDM record holds the metadata slot alone, like the real archive.
        let mut chunks: Vec<Vec<u8>> = vec![records[0].clone()];
        for group in records[1..].chunks(self.radials_per_record.max(1)) {
            chunks.push(group.concat());
        }

        let last = chunks.len() - 1;
        for (i, chunk) in chunks.iter().enumerate() {
            let compressed = bzip2_compress(chunk);
            let size = compressed.len() as i32;
            let control = if i == last { -size } else { size };
            out.extend_from_slice(&control.to_be_bytes());
            out.extend_from_slice(&compressed);
        }

        out
    }

    /// Archive II file wrapped in gzip, as stored under `_V0x.gz` keys.
    pub fn to_gzip_bytes(&self) -> Vec<u8> {
        gzip_compress(&self.to_archive_bytes())
    }
}

/// Legacy (message 1) volume: raw, uncompressed records with reflectivity
/// and velocity on a single sweep of `radials` rays.
pub fn legacy_message1_volume(start: DateTime<Utc>, radials: u16) -> Vec<u8> {
    let mut out = volume_header(b"AR2V0001.", "KHGX", &start);
    out.extend_from_slice(&metadata_record());

    for radial in 0..radials {
        let time = start + Duration::milliseconds(40 * radial as i64);
        let (date, millis) = nexrad_date(&time);
        let azimuth = (radial as f32 + 0.5) * 360.0 / radials as f32;
        let coded = |deg: f32| ((deg / 360.0 * 65536.0).round() as u32 % 65536) as u16;

        let mut body = vec![0u8; FIXED_RECORD_SIZE - 28];
        body[0..4].copy_from_slice(&millis.to_be_bytes());
        body[4..6].copy_from_slice(&(date as u16).to_be_bytes());
        body[6..8].copy_from_slice(&4600u16.to_be_bytes());
        body[8..10].copy_from_slice(&coded(azimuth).to_be_bytes());
        body[10..12].copy_from_slice(&(radial + 1).to_be_bytes());
        body[12..14].copy_from_slice(&1u16.to_be_bytes());
        body[14..16].copy_from_slice(&coded(0.5).to_be_bytes());
        body[16..18].copy_from_slice(&1u16.to_be_bytes());
        body[18..20].copy_from_slice(&1000i16.to_be_bytes());
        body[20..22].copy_from_slice(&1000i16.to_be_bytes());
        body[22..24].copy_from_slice(&1000u16.to_be_bytes());
        body[24..26].copy_from_slice(&250u16.to_be_bytes());
        body[26..28].copy_from_slice(&460u16.to_be_bytes());
        body[28..30].copy_from_slice(&920u16.to_be_bytes());
        body[36..38].copy_from_slice(&100u16.to_be_bytes());
        body[38..40].copy_from_slice(&560u16.to_be_bytes());
        body[40..42].copy_from_slice(&1480u16.to_be_bytes());
        body[42..44].copy_from_slice(&2u16.to_be_bytes()); // 0.5 m/s resolution
        body[60..62].copy_from_slice(&2650u16.to_be_bytes());

        // Reflectivity 20 dBZ -> raw 106, velocity -5 m/s -> raw 119
        body[100..560].fill(106);
        body[560..1480].fill(119);

        let mut record = vec![0u8; 12];
        record.extend_from_slice(&message_header(1, (FIXED_RECORD_SIZE - 12) / 2, date, millis));
        record.extend_from_slice(&body);
        out.extend_from_slice(&record);
    }

    out
}

fn metadata_record() -> Vec<u8> {
    let mut record = vec![0u8; FIXED_RECORD_SIZE];
    record[12..28].copy_from_slice(&message_header(2, (FIXED_RECORD_SIZE - 12) / 2, 1, 0));
    record
}

fn elevation_block() -> Vec<u8> {
    let mut block = Vec::with_capacity(12);
    block.push(b'R');
    block.extend_from_slice(b"ELV");
    block.extend_from_slice(&12u16.to_be_bytes());
    block.extend_from_slice(&0i16.to_be_bytes());
    block.extend_from_slice(&0f32.to_be_bytes());
    block
}

fn radial_block(nyquist: f32) -> Vec<u8> {
    let mut block = Vec::with_capacity(20);
    block.push(b'R');
    block.extend_from_slice(b"RAD");
    block.extend_from_slice(&20u16.to_be_bytes());
    block.extend_from_slice(&4660i16.to_be_bytes()); // 466.0 km
    block.extend_from_slice(&0f32.to_be_bytes());
    block.extend_from_slice(&0f32.to_be_bytes());
    block.extend_from_slice(&((nyquist * 100.0).round() as i16).to_be_bytes());
    block.extend_from_slice(&0u16.to_be_bytes());
    block
}

fn message_header(message_type: u8, size_halfwords: usize, date: u32, millis: u32) -> [u8; 16] {
    let mut header = [0u8; 16];
    header[0..2].copy_from_slice(&(size_halfwords as u16).to_be_bytes());
    header[3] = message_type;
    header[6..8].copy_from_slice(&(date as u16).to_be_bytes());
    header[8..12].copy_from_slice(&millis.to_be_bytes());
    header[12..14].copy_from_slice(&1u16.to_be_bytes());
    header[14..16].copy_from_slice(&1u16.to_be_bytes());
    header
}

fn volume_header(tape: &[u8; 9], icao: &str, start: &DateTime<Utc>) -> Vec<u8> {
    let (date, millis) = nexrad_date(start);
    let mut out = Vec::with_capacity(24);
    out.extend_from_slice(tape);
    out.extend_from_slice(b"001");
    out.extend_from_slice(&date.to_be_bytes());
    out.extend_from_slice(&millis.to_be_bytes());
    out.extend_from_slice(&padded_id(icao));
    out
}

fn padded_id(name: &str) -> [u8; 4] {
    let mut out = [b' '; 4];
    for (dst, src) in out.iter_mut().zip(name.bytes()) {
        *dst = src;
    }
    out
}

/// Modified Julian date (day 1 = 1970-01-01) and milliseconds past midnight.
pub fn nexrad_date(time: &DateTime<Utc>) -> (u32, u32) {
    let date = time.timestamp().div_euclid(86_400) as u32 + 1;
    let millis = time.num_seconds_from_midnight() * 1000 + time.timestamp_subsec_millis();
    (date, millis)
}

fn bzip2_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = BzEncoder::new(Vec::new(), bzip2::Compression::best());
    encoder.write_all(data).expect("bzip2 write");
    encoder.finish().expect("bzip2 finish")
}

/// Gzip-compress arbitrary bytes.
pub fn gzip_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(data).expect("gzip write");
    encoder.finish().expect("gzip finish")
}
