//! The sfnt table directory and the scalar metrics the atlas needs.

use crate::ttf::data::FontData;

/// A four byte table tag, stored big-endian in a `u32`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tag(pub u32);

impl Tag {
    pub const fn new(tag: &[u8; 4]) -> Tag {
        Tag(u32::from_be_bytes(*tag))
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in self.0.to_be_bytes() {
            let c = if byte.is_ascii_graphic() || byte == b' ' {
                byte as char
            } else {
                '?'
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

pub const HEAD: Tag = Tag::new(b"head");
pub const MAXP: Tag = Tag::new(b"maxp");
pub const HHEA: Tag = Tag::new(b"hhea");
pub const HMTX: Tag = Tag::new(b"hmtx");
pub const LOCA: Tag = Tag::new(b"loca");
pub const GLYF: Tag = Tag::new(b"glyf");
pub const CMAP: Tag = Tag::new(b"cmap");

/// One entry of the table directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableRecord {
    pub tag: Tag,
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

/// How `loca` stores glyph offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LocaFormat {
    /// `u16` values holding the offset divided by two.
    #[default]
    Short,
    /// Raw `u32` offsets.
    Long,
}

/// Reads the table directory, keeping only entries that lie entirely within the data.
///
/// A directory cut short by the end of the data simply yields fewer entries.
#[must_use]
pub fn read_directory(data: FontData<'_>) -> Vec<TableRecord> {
    let Ok(num_tables) = data.read_u16(4) else {
        return Vec::new();
    };

    let mut records = Vec::with_capacity(num_tables as usize);
    for i in 0..num_tables as usize {
        let base = 12 + i * 16;
        let (Ok(tag), Ok(checksum), Ok(offset), Ok(length)) = (
            data.read_u32(base),
            data.read_u32(base + 4),
            data.read_u32(base + 8),
            data.read_u32(base + 12),
        ) else {
            log::warn!("Table directory truncated after {i} of {num_tables} entries");
            break;
        };

        let record = TableRecord {
            tag: Tag(tag),
            checksum,
            offset,
            length,
        };
        if u64::from(offset) + u64::from(length) <= data.len() as u64 {
            records.push(record);
        } else {
            log::warn!(
                "Ignoring table {} which extends past the end of the font",
                record.tag
            );
        }
    }
    records
}

/// Immutable view over the tables of a font blob.
///
/// Every table is optional. Scalar metrics read from a missing table default to zero.
#[derive(Clone, Debug, Default)]
pub struct FontTables<'a> {
    pub directory: Vec<TableRecord>,
    pub head: Option<FontData<'a>>,
    pub maxp: Option<FontData<'a>>,
    pub hhea: Option<FontData<'a>>,
    pub hmtx: Option<FontData<'a>>,
    pub loca: Option<FontData<'a>>,
    pub glyf: Option<FontData<'a>>,
    pub cmap: Option<FontData<'a>>,

    pub units_per_em: u16,
    pub index_to_loc_format: LocaFormat,
    pub num_glyphs: u16,
    pub num_long_hor_metrics: u16,
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
}

impl<'a> FontTables<'a> {
    pub fn new(blob: &'a [u8]) -> FontTables<'a> {
        let data = FontData::new(blob);
        let directory = read_directory(data);

        let find = |tag: Tag| {
            directory
                .iter()
                .find(|record| record.tag == tag)
                .and_then(|record| {
                    let start = record.offset as usize;
                    data.slice(start..start + record.length as usize)
                })
        };

        let mut tables = FontTables {
            head: find(HEAD),
            maxp: find(MAXP),
            hhea: find(HHEA),
            hmtx: find(HMTX),
            loca: find(LOCA),
            glyf: find(GLYF),
            cmap: find(CMAP),
            ..FontTables::default()
        };
        tables.directory = directory;

        if let Some(head) = tables.head {
            tables.units_per_em = head.read_u16(18).unwrap_or(0);
            tables.index_to_loc_format = match head.read_i16(50) {
                Ok(0) | Err(_) => LocaFormat::Short,
                Ok(_) => LocaFormat::Long,
            };
        }
        if let Some(maxp) = tables.maxp {
            tables.num_glyphs = maxp.read_u16(4).unwrap_or(0);
        }
        if let Some(hhea) = tables.hhea {
            tables.ascender = hhea.read_i16(4).unwrap_or(0);
            tables.descender = hhea.read_i16(6).unwrap_or(0);
            tables.line_gap = hhea.read_i16(8).unwrap_or(0);
            tables.num_long_hor_metrics = hhea.read_u16(34).unwrap_or(0);
        }

        log::debug!(
            "Font has {} tables, {} glyphs, {} units per em",
            tables.directory.len(),
            tables.num_glyphs,
            tables.units_per_em
        );
        tables
    }

    /// Looks up a table record by tag.
    pub fn record(&self, tag: Tag) -> Option<&TableRecord> {
        self.directory.iter().find(|record| record.tag == tag)
    }

    /// Builds the per-glyph advance widths from `hmtx`.
    ///
    /// Glyphs past the last long metric reuse its advance. Entries missing from a short `hmtx`
    /// fall back to the same value.
    pub fn advance_widths(&self) -> Vec<u16> {
        let (Some(hmtx), true) = (self.hmtx, self.num_long_hor_metrics > 0) else {
            return Vec::new();
        };

        let mut widths: Vec<u16> = Vec::with_capacity(self.num_glyphs as usize);
        let mut last = 0;
        for gid in 0..self.num_glyphs as usize {
            if gid < self.num_long_hor_metrics as usize {
                last = hmtx.read_u16(gid * 4).unwrap_or(last);
            }
            widths.push(last);
        }
        widths
    }
}
