//! The binary atlas asset (`.sdfb`): a fixed header, one record per glyph and the atlas pixels.
//!
//! All values are little-endian and packed without padding.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::AtlasError;

pub const MAGIC: [u8; 8] = *b"SDFONT1\0";
pub const VERSION_MAJOR: u16 = 1;
pub const VERSION_MINOR: u16 = 0;
pub const HEADER_LEN: usize = 38;
pub const RECORD_LEN: usize = 20;

/// Record flag for a code point the font has no glyph for.
pub const GLYPH_MISSING: u8 = 0x01;

/// Everything in the header after the magic and version.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssetHeader {
    pub flags: u16,
    pub pixel_size: u16,
    pub border: u16,
    pub spread: u16,
    pub font_height: i16,
    pub ascender: i16,
    pub descender: i16,
    pub line_advance: u16,
    pub atlas_width: u16,
    pub atlas_height: u16,
    pub glyph_count: u32,
}

/// Placement and metrics of one requested code point. Coordinates are atlas pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphRecord {
    pub code_point: u32,
    pub u: u16,
    pub v: u16,
    pub w: u16,
    pub h: u16,
    pub bearing_x: i16,
    pub bearing_y: i16,
    pub advance: u16,
    pub atlas_id: u8,
    pub flags: u8,
}

impl GlyphRecord {
    pub fn is_missing(&self) -> bool {
        self.flags & GLYPH_MISSING != 0
    }
}

/// A finished atlas: header, glyph records and the row-major 8-bit canvas.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AtlasAsset {
    pub header: AssetHeader,
    pub records: Vec<GlyphRecord>,
    pub pixels: Vec<u8>,
}

/// Converts a size or coordinate to the 16-bit field that stores it.
pub(crate) fn fit_u16(what: &'static str, value: usize) -> Result<u16, AtlasError> {
    u16::try_from(value).map_err(|_| AtlasError::AtlasTooLarge { what, value })
}

fn u16_at(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn i16_at(bytes: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

impl AssetHeader {
    fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..8].copy_from_slice(&MAGIC);
        out[8..10].copy_from_slice(&VERSION_MAJOR.to_le_bytes());
        out[10..12].copy_from_slice(&VERSION_MINOR.to_le_bytes());
        out[12..14].copy_from_slice(&self.flags.to_le_bytes());
        out[14..16].copy_from_slice(&self.pixel_size.to_le_bytes());
        out[16..18].copy_from_slice(&self.border.to_le_bytes());
        out[18..20].copy_from_slice(&self.spread.to_le_bytes());
        out[20..22].copy_from_slice(&self.font_height.to_le_bytes());
        out[22..24].copy_from_slice(&self.ascender.to_le_bytes());
        out[24..26].copy_from_slice(&self.descender.to_le_bytes());
        out[26..28].copy_from_slice(&self.line_advance.to_le_bytes());
        out[28..30].copy_from_slice(&self.atlas_width.to_le_bytes());
        out[30..32].copy_from_slice(&self.atlas_height.to_le_bytes());
        // 32..34 is reserved
        out[34..38].copy_from_slice(&self.glyph_count.to_le_bytes());
        out
    }

    fn decode(bytes: &[u8; HEADER_LEN]) -> Result<AssetHeader, AtlasError> {
        if bytes[0..8] != MAGIC {
            return Err(AtlasError::InvalidAsset("bad magic"));
        }
        if u16_at(bytes, 8) != VERSION_MAJOR {
            return Err(AtlasError::InvalidAsset("unsupported major version"));
        }
        Ok(AssetHeader {
            flags: u16_at(bytes, 12),
            pixel_size: u16_at(bytes, 14),
            border: u16_at(bytes, 16),
            spread: u16_at(bytes, 18),
            font_height: i16_at(bytes, 20),
            ascender: i16_at(bytes, 22),
            descender: i16_at(bytes, 24),
            line_advance: u16_at(bytes, 26),
            atlas_width: u16_at(bytes, 28),
            atlas_height: u16_at(bytes, 30),
            glyph_count: u32_at(bytes, 34),
        })
    }
}

impl GlyphRecord {
    fn encode(&self) -> [u8; RECORD_LEN] {
        let mut out = [0u8; RECORD_LEN];
        out[0..4].copy_from_slice(&self.code_point.to_le_bytes());
        out[4..6].copy_from_slice(&self.u.to_le_bytes());
        out[6..8].copy_from_slice(&self.v.to_le_bytes());
        out[8..10].copy_from_slice(&self.w.to_le_bytes());
        out[10..12].copy_from_slice(&self.h.to_le_bytes());
        out[12..14].copy_from_slice(&self.bearing_x.to_le_bytes());
        out[14..16].copy_from_slice(&self.bearing_y.to_le_bytes());
        out[16..18].copy_from_slice(&self.advance.to_le_bytes());
        out[18] = self.atlas_id;
        out[19] = self.flags;
        out
    }

    fn decode(bytes: &[u8; RECORD_LEN]) -> GlyphRecord {
        GlyphRecord {
            code_point: u32_at(bytes, 0),
            u: u16_at(bytes, 4),
            v: u16_at(bytes, 6),
            w: u16_at(bytes, 8),
            h: u16_at(bytes, 10),
            bearing_x: i16_at(bytes, 12),
            bearing_y: i16_at(bytes, 14),
            advance: u16_at(bytes, 16),
            atlas_id: bytes[18],
            flags: bytes[19],
        }
    }
}

impl AtlasAsset {
    pub fn width(&self) -> usize {
        self.header.atlas_width as usize
    }

    pub fn height(&self) -> usize {
        self.header.atlas_height as usize
    }

    /// Serializes the asset. The header's glyph count is taken from `records`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), AtlasError> {
        let expected = self.width() * self.height();
        if self.pixels.len() != expected {
            return Err(AtlasError::InvalidDataDimensions {
                width: self.width(),
                height: self.height(),
                expected,
                actual: self.pixels.len(),
            });
        }
        let glyph_count = u32::try_from(self.records.len()).map_err(|_| {
            AtlasError::AtlasTooLarge {
                what: "glyph count",
                value: self.records.len(),
            }
        })?;

        let header = AssetHeader {
            glyph_count,
            ..self.header
        };
        writer.write_all(&header.encode())?;
        for record in &self.records {
            writer.write_all(&record.encode())?;
        }
        writer.write_all(&self.pixels)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_from<R: Read>(mut reader: R) -> Result<AtlasAsset, AtlasError> {
        let mut header_bytes = [0u8; HEADER_LEN];
        reader.read_exact(&mut header_bytes)?;
        let header = AssetHeader::decode(&header_bytes)?;

        let mut records = Vec::with_capacity((header.glyph_count as usize).min(1 << 16));
        let mut record_bytes = [0u8; RECORD_LEN];
        for _ in 0..header.glyph_count {
            reader.read_exact(&mut record_bytes)?;
            records.push(GlyphRecord::decode(&record_bytes));
        }

        let mut pixels = vec![0u8; header.atlas_width as usize * header.atlas_height as usize];
        reader.read_exact(&mut pixels)?;

        Ok(AtlasAsset {
            header,
            records,
            pixels,
        })
    }

    /// Writes the asset to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> Result<(), AtlasError> {
        self.write_to(BufWriter::new(File::create(path)?))
    }

    pub fn load(path: &Path) -> Result<AtlasAsset, AtlasError> {
        AtlasAsset::read_from(BufReader::new(File::open(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AtlasAsset {
        AtlasAsset {
            header: AssetHeader {
                pixel_size: 16,
                border: 4,
                spread: 5,
                font_height: 20,
                ascender: 15,
                descender: -5,
                line_advance: 22,
                atlas_width: 3,
                atlas_height: 2,
                glyph_count: 1,
                ..AssetHeader::default()
            },
            records: vec![GlyphRecord {
                code_point: 0x1F600,
                u: 8,
                v: 8,
                w: 16,
                h: 16,
                bearing_x: -1,
                bearing_y: 12,
                advance: 9,
                atlas_id: 0,
                flags: GLYPH_MISSING,
            }],
            pixels: vec![1, 2, 3, 4, 5, 6],
        }
    }

    #[test]
    fn test_layout() {
        let mut bytes = Vec::new();
        sample().write_to(&mut bytes).unwrap();
        assert_eq!(bytes.len(), HEADER_LEN + RECORD_LEN + 6);
        assert_eq!(&bytes[0..8], b"SDFONT1\0");
        assert_eq!(&bytes[8..12], &[1, 0, 0, 0]);
        assert_eq!(&bytes[14..16], &[16, 0]);
        assert_eq!(&bytes[24..26], &(-5i16).to_le_bytes());
        assert_eq!(&bytes[34..38], &[1, 0, 0, 0]);
        assert_eq!(&bytes[38..42], &0x1F600u32.to_le_bytes());
        assert_eq!(bytes[HEADER_LEN + 19], GLYPH_MISSING);
        assert_eq!(&bytes[HEADER_LEN + RECORD_LEN..], &[1, 2, 3, 4, 5, 6]);

        let read = AtlasAsset::read_from(bytes.as_slice()).unwrap();
        assert_eq!(read, sample());
        assert!(read.records[0].is_missing());
    }

    #[test]
    fn test_glyph_count_follows_records() {
        let mut asset = sample();
        asset.header.glyph_count = 7;
        let mut bytes = Vec::new();
        asset.write_to(&mut bytes).unwrap();
        assert_eq!(&bytes[34..38], &[1, 0, 0, 0]);
    }

    #[test]
    fn test_invalid_assets() {
        let mut asset = sample();
        asset.pixels.pop();
        assert!(matches!(
            asset.write_to(Vec::new()),
            Err(AtlasError::InvalidDataDimensions { expected: 6, actual: 5, .. })
        ));

        let mut bytes = Vec::new();
        sample().write_to(&mut bytes).unwrap();

        let mut bad_magic = bytes.clone();
        bad_magic[0] = b'X';
        assert!(matches!(
            AtlasAsset::read_from(bad_magic.as_slice()),
            Err(AtlasError::InvalidAsset("bad magic"))
        ));

        let truncated = &bytes[..bytes.len() - 1];
        assert!(matches!(
            AtlasAsset::read_from(truncated),
            Err(AtlasError::Io(_))
        ));
    }

    #[test]
    fn test_fit_u16() {
        assert_eq!(fit_u16("width", 65535).unwrap(), 65535);
        assert!(matches!(
            fit_u16("height", 65536),
            Err(AtlasError::AtlasTooLarge { what: "height", value: 65536 })
        ));
    }
}
