//! PNG writer for composed plots.
//!
//! A plot is mostly flat colormap fills on a white canvas, so it nearly always
//! fits in a palette. [`encode_auto`] writes an indexed PNG (color type 3) in
//! that case and falls back to 8-bit RGBA (color type 6) once antialiased text
//! or a continuous colormap pushes it past 256 colors.

use std::collections::{HashMap, HashSet};
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use rayon::prelude::*;

use radar_common::{RadarError, RadarResult};

pub const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

const MAX_PALETTE_SIZE: usize = 256;

/// Rows handed to one rayon task while collecting colors.
const ROWS_PER_TASK: usize = 32;

const COLOR_TYPE_INDEXED: u8 = 3;
const COLOR_TYPE_RGBA: u8 = 6;

/// Distinct colors of an image, in first-seen row-block order.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    entries: Vec<[u8; 4]>,
}

impl Palette {
    /// Collect the colors of `pixels` (RGBA, `width` pixels per row).
    ///
    /// Returns `None` when there are more than 256.
    pub fn extract(pixels: &[u8], width: usize) -> Option<Self> {
        let task_bytes = (width * 4 * ROWS_PER_TASK).max(4);

        let per_task: Vec<Option<Vec<[u8; 4]>>> = pixels
            .par_chunks(task_bytes)
            .map(|block| {
                let mut seen = HashSet::with_capacity(MAX_PALETTE_SIZE);
                let mut ordered = Vec::new();
                for px in block.chunks_exact(4) {
                    let color = [px[0], px[1], px[2], px[3]];
                    if seen.insert(color) {
                        if ordered.len() == MAX_PALETTE_SIZE {
                            return None;
                        }
                        ordered.push(color);
                    }
                }
                Some(ordered)
            })
            .collect();

        let mut seen = HashSet::with_capacity(MAX_PALETTE_SIZE);
        let mut entries = Vec::with_capacity(MAX_PALETTE_SIZE);
        for colors in per_task {
            for color in colors? {
                if seen.insert(color) {
                    if entries.len() == MAX_PALETTE_SIZE {
                        return None;
                    }
                    entries.push(color);
                }
            }
        }

        Some(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[[u8; 4]] {
        &self.entries
    }

    fn has_transparency(&self) -> bool {
        self.entries.iter().any(|c| c[3] < 255)
    }

    /// Palette index of every pixel.
    fn index(&self, pixels: &[u8]) -> Vec<u8> {
        let lookup: HashMap<[u8; 4], u8> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, c)| (*c, i as u8))
            .collect();

        pixels
            .par_chunks_exact(4)
            .map(|px| lookup.get(&[px[0], px[1], px[2], px[3]]).copied().unwrap_or(0))
            .collect()
    }
}

/// Encode RGBA pixels, indexed when the palette fits.
pub fn encode_auto(pixels: &[u8], width: usize, height: usize) -> RadarResult<Vec<u8>> {
    check_dimensions(pixels, width, height)?;

    match Palette::extract(pixels, width) {
        Some(palette) => {
            let indices = palette.index(pixels);
            encode_indexed(&palette, &indices, width, height)
        }
        None => encode_rgba(pixels, width, height),
    }
}

/// Encode RGBA pixels as color type 6.
pub fn encode_rgba(pixels: &[u8], width: usize, height: usize) -> RadarResult<Vec<u8>> {
    check_dimensions(pixels, width, height)?;

    let mut png = start(width, height, COLOR_TYPE_RGBA);
    let idat = deflate_scanlines(pixels, width * 4)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Encode palette indices as color type 3, with a tRNS chunk when any entry
/// is not opaque.
pub fn encode_indexed(
    palette: &Palette,
    indices: &[u8],
    width: usize,
    height: usize,
) -> RadarResult<Vec<u8>> {
    if indices.len() != width * height {
        return Err(RadarError::Render(format!(
            "expected {} palette indices for {}x{}, got {}",
            width * height,
            width,
            height,
            indices.len()
        )));
    }

    let mut png = start(width, height, COLOR_TYPE_INDEXED);

    let plte: Vec<u8> = palette.entries.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    if palette.has_transparency() {
        let trns: Vec<u8> = palette.entries.iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let idat = deflate_scanlines(indices, width)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn check_dimensions(pixels: &[u8], width: usize, height: usize) -> RadarResult<()> {
    if width == 0 || height == 0 {
        return Err(RadarError::Render(format!("empty image {}x{}", width, height)));
    }
    if pixels.len() != width * height * 4 {
        return Err(RadarError::Render(format!(
            "expected {} RGBA bytes for {}x{}, got {}",
            width * height * 4,
            width,
            height,
            pixels.len()
        )));
    }
    Ok(())
}

/// Signature plus IHDR for an 8-bit image.
fn start(width: usize, height: usize, color_type: u8) -> Vec<u8> {
    let mut png = SIGNATURE.to_vec();

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    // bit depth, color type, compression, filter, interlace
    ihdr.extend_from_slice(&[8, color_type, 0, 0, 0]);
    write_chunk(&mut png, b"IHDR", &ihdr);

    png
}

/// Zlib-compress rows of `row_bytes`, each prefixed with filter type 0.
fn deflate_scanlines(data: &[u8], row_bytes: usize) -> RadarResult<Vec<u8>> {
    let rows = data.len() / row_bytes;
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(data.len() / 4),
        Compression::fast(),
    );

    for row in data.chunks_exact(row_bytes) {
        encoder.write_all(&[0])?;
        encoder.write_all(row)?;
    }

    let compressed = encoder.finish()?;
    tracing::trace!(rows, raw = data.len(), compressed = compressed.len(), "Deflated IDAT");
    Ok(compressed)
}

fn write_chunk(png: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(kind);
    png.extend_from_slice(data);

    let mut crc = crc32fast::Hasher::new();
    crc.update(kind);
    crc.update(data);
    png.extend_from_slice(&crc.finalize().to_be_bytes());
}
