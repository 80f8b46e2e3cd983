//! Uncompressed 24-bit BMP output for inspecting an atlas.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::AtlasError;

const FILE_HEADER_LEN: u32 = 14;
const INFO_HEADER_LEN: u32 = 40;
/// 72 dpi.
const PIXELS_PER_METER: i32 = 2835;

/// Writes a grayscale image as a top-down 24-bit BMP, replicating each value into all three
/// channels.
pub fn write_bmp<W: Write>(
    mut writer: W,
    width: usize,
    height: usize,
    pixels: &[u8],
) -> Result<(), AtlasError> {
    let expected = width * height;
    if pixels.len() != expected {
        return Err(AtlasError::InvalidDataDimensions {
            width,
            height,
            expected,
            actual: pixels.len(),
        });
    }

    let row_bytes = width * 3;
    let padding = (4 - row_bytes % 4) % 4;
    let image_bytes = (row_bytes + padding) * height;
    let too_large = |what: &'static str, value: usize| AtlasError::AtlasTooLarge { what, value };
    let image_size = u32::try_from(image_bytes)
        .ok()
        .filter(|size| size.checked_add(FILE_HEADER_LEN + INFO_HEADER_LEN).is_some())
        .ok_or_else(|| too_large("bitmap size", image_bytes))?;
    let bmp_width = i32::try_from(width).map_err(|_| too_large("bitmap width", width))?;
    let bmp_height = i32::try_from(height).map_err(|_| too_large("bitmap height", height))?;

    let mut header = Vec::with_capacity((FILE_HEADER_LEN + INFO_HEADER_LEN) as usize);
    header.extend_from_slice(b"BM");
    header.extend_from_slice(&(FILE_HEADER_LEN + INFO_HEADER_LEN + image_size).to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes());
    header.extend_from_slice(&(FILE_HEADER_LEN + INFO_HEADER_LEN).to_le_bytes());

    header.extend_from_slice(&INFO_HEADER_LEN.to_le_bytes());
    header.extend_from_slice(&bmp_width.to_le_bytes());
    // Negative height marks the rows as top-down
    header.extend_from_slice(&(-bmp_height).to_le_bytes());
    header.extend_from_slice(&1u16.to_le_bytes());
    header.extend_from_slice(&24u16.to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes());
    header.extend_from_slice(&image_size.to_le_bytes());
    header.extend_from_slice(&PIXELS_PER_METER.to_le_bytes());
    header.extend_from_slice(&PIXELS_PER_METER.to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes());
    writer.write_all(&header)?;

    let mut row = Vec::with_capacity(row_bytes + padding);
    for src in pixels.chunks_exact(width.max(1)).take(height) {
        row.clear();
        row.extend(src.iter().flat_map(|&v| [v, v, v]));
        row.resize(row_bytes + padding, 0);
        writer.write_all(&row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_bmp(path: &Path, width: usize, height: usize, pixels: &[u8]) -> Result<(), AtlasError> {
    write_bmp(BufWriter::new(File::create(path)?), width, height, pixels)
}
