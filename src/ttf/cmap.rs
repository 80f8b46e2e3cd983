//! Character to glyph mapping from `cmap` subtable formats 4 and 12.

use crate::ttf::data::{FontData, ReadError};

/// The highest valid Unicode scalar value.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

const PLATFORM_WINDOWS: u16 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CmapFormat4Segment {
    pub end_code: u16,
    pub start_code: u16,
    pub id_delta: u16,
    pub id_range_offset: u16,
}

/// A format 4 (segment mapping to delta values) index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Format4Index {
    segments: Vec<CmapFormat4Segment>,
    glyph_ids: Vec<u16>,
}

impl Format4Index {
    /// Parses a format 4 subtable starting at the beginning of `data`.
    pub fn parse(data: FontData<'_>) -> Result<Format4Index, ReadError> {
        let length = data.read_u16(2)? as usize;
        let seg_count = (data.read_u16(6)? / 2) as usize;

        let end_codes = 14;
        let start_codes = end_codes + seg_count * 2 + 2;
        let id_deltas = start_codes + seg_count * 2;
        let id_range_offsets = id_deltas + seg_count * 2;
        let glyph_id_array = id_range_offsets + seg_count * 2;

        let segments = (0..seg_count)
            .map(|i| {
                Ok(CmapFormat4Segment {
                    end_code: data.read_u16(end_codes + i * 2)?,
                    start_code: data.read_u16(start_codes + i * 2)?,
                    id_delta: data.read_u16(id_deltas + i * 2)?,
                    id_range_offset: data.read_u16(id_range_offsets + i * 2)?,
                })
            })
            .collect::<Result<Vec<_>, ReadError>>()?;

        // The declared length decides the array size, but only whole entries that are actually
        // present are kept.
        let declared = length.saturating_sub(16 + seg_count * 8) / 2;
        let available = data.len().saturating_sub(glyph_id_array) / 2;
        let glyph_ids = (0..declared.min(available))
            .map(|i| data.read_u16(glyph_id_array + i * 2))
            .collect::<Result<Vec<_>, ReadError>>()?;

        Ok(Format4Index {
            segments,
            glyph_ids,
        })
    }

    pub fn segments(&self) -> &[CmapFormat4Segment] {
        &self.segments
    }

    /// Maps a BMP code point to a glyph id, or 0 if it is not covered.
    pub fn map(&self, c: u16) -> u16 {
        let index = self.segments.partition_point(|seg| seg.end_code < c);
        let Some(seg) = self.segments.get(index) else {
            return 0;
        };
        if c < seg.start_code || c > seg.end_code {
            return 0;
        }

        if seg.id_range_offset == 0 {
            return c.wrapping_add(seg.id_delta);
        }

        // The offset is relative to the segment's own entry in the idRangeOffset array, which
        // sits `segment_count - index` entries before the glyph id array.
        let offset = i64::from(seg.id_range_offset / 2) + i64::from(c - seg.start_code)
            + index as i64
            - self.segments.len() as i64;
        let Some(&gid) = usize::try_from(offset)
            .ok()
            .and_then(|offset| self.glyph_ids.get(offset))
        else {
            return 0;
        };
        if gid == 0 {
            0
        } else {
            gid.wrapping_add(seg.id_delta)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CmapFormat12Group {
    pub start_char_code: u32,
    pub end_char_code: u32,
    pub start_glyph_id: u32,
}

/// A format 12 (segmented coverage) index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Format12Index {
    groups: Vec<CmapFormat12Group>,
}

impl Format12Index {
    /// Parses a format 12 subtable starting at the beginning of `data`.
    pub fn parse(data: FontData<'_>) -> Result<Format12Index, ReadError> {
        let num_groups = data.read_u32(12)? as usize;
        if num_groups.saturating_mul(12) > data.len().saturating_sub(16) {
            return Err(ReadError::OutOfBounds);
        }

        let mut groups = (0..num_groups)
            .map(|i| {
                let base = 16 + i * 12;
                Ok(CmapFormat12Group {
                    start_char_code: data.read_u32(base)?,
                    end_char_code: data.read_u32(base + 4)?,
                    start_glyph_id: data.read_u32(base + 8)?,
                })
            })
            .collect::<Result<Vec<_>, ReadError>>()?;
        groups.sort_by_key(|group| (group.end_char_code, group.start_char_code));

        Ok(Format12Index { groups })
    }

    pub fn groups(&self) -> &[CmapFormat12Group] {
        &self.groups
    }

    /// Maps a code point to a glyph id, or `None` if no group contains it.
    pub fn map(&self, code_point: u32) -> Option<u16> {
        let index = self
            .groups
            .partition_point(|group| group.end_char_code < code_point);
        let group = self.groups.get(index)?;
        if code_point < group.start_char_code || code_point > group.end_char_code {
            return None;
        }
        let gid = u64::from(group.start_glyph_id) + u64::from(code_point - group.start_char_code);
        Some(u16::try_from(gid).unwrap_or(0))
    }
}

/// Resolves code points to glyph ids using the best format 12 and format 4 subtables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CharMap {
    format4: Option<Format4Index>,
    format12: Option<Format12Index>,
}

struct Candidate<'a> {
    platform_id: u16,
    data: FontData<'a>,
}

impl CharMap {
    /// Builds the indices from a `cmap` table. A missing or unreadable table gives an empty map.
    #[must_use]
    pub fn new(cmap: Option<FontData<'_>>) -> CharMap {
        let Some(cmap) = cmap else {
            return CharMap::default();
        };

        let mut best4: Option<Candidate> = None;
        let mut best12: Option<Candidate> = None;
        let num_tables = cmap.read_u16(2).unwrap_or(0) as usize;
        for i in 0..num_tables {
            let record = 4 + i * 8;
            let (Ok(platform_id), Ok(offset)) = (cmap.read_u16(record), cmap.read_u32(record + 4))
            else {
                break;
            };
            let Some(data) = cmap.split_off(offset as usize) else {
                continue;
            };
            let best = match data.read_u16(0) {
                Ok(4) => &mut best4,
                Ok(12) => &mut best12,
                _ => continue,
            };
            // Keep the first subtable of each format, unless a Windows one turns up later
            let replace = match &*best {
                None => true,
                Some(current) => {
                    platform_id == PLATFORM_WINDOWS && current.platform_id != PLATFORM_WINDOWS
                }
            };
            if replace {
                *best = Some(Candidate { platform_id, data });
            }
        }

        let format4 = best4.and_then(|c| match Format4Index::parse(c.data) {
            Ok(index) => Some(index),
            Err(e) => {
                log::warn!("Ignoring unreadable cmap format 4 subtable: {e}");
                None
            }
        });
        let format12 = best12.and_then(|c| match Format12Index::parse(c.data) {
            Ok(index) => Some(index),
            Err(e) => {
                log::warn!("Ignoring unreadable cmap format 12 subtable: {e}");
                None
            }
        });

        log::debug!(
            "cmap indices: format 4 {}, format 12 {}",
            if format4.is_some() { "present" } else { "absent" },
            if format12.is_some() { "present" } else { "absent" },
        );

        CharMap { format4, format12 }
    }

    pub fn from_indices(format4: Option<Format4Index>, format12: Option<Format12Index>) -> CharMap {
        CharMap { format4, format12 }
    }

    pub fn format4(&self) -> Option<&Format4Index> {
        self.format4.as_ref()
    }

    pub fn format12(&self) -> Option<&Format12Index> {
        self.format12.as_ref()
    }

    /// Resolves a code point to a glyph id. Unmapped and invalid code points give glyph id 0.
    pub fn resolve_glyph(&self, code_point: u32) -> u16 {
        if code_point > MAX_CODE_POINT {
            return 0;
        }
        if let Some(gid) = self
            .format12
            .as_ref()
            .and_then(|index| index.map(code_point))
        {
            return gid;
        }
        match (&self.format4, u16::try_from(code_point)) {
            (Some(index), Ok(c)) => index.map(c),
            _ => 0,
        }
    }
}
