//! A minimal TrueType reader: just enough of the format to turn code points into outlines.

pub mod cmap;
pub mod data;
pub mod glyf;
pub mod tables;

use sdf_glyph_renderer::{GlyphOutline, OutlineBuilder};

pub use cmap::CharMap;
pub use data::{FontData, ReadError};
pub use glyf::{GlyphBounds, GlyphTable};
pub use tables::FontTables;

/// Horizontal metrics and header bounds of one glyph, in font units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphMetrics {
    pub advance_width: u16,
    /// `None` for empty glyphs and glyphs without outline data.
    pub bounds: Option<GlyphBounds>,
}

/// A parsed font, borrowed from its byte blob.
///
/// Nothing is mutated after [`Font::new`], so a single instance can be shared by every worker.
#[derive(Clone, Debug)]
pub struct Font<'a> {
    tables: FontTables<'a>,
    char_map: CharMap,
    glyphs: GlyphTable<'a>,
    advance_widths: Vec<u16>,
}

impl<'a> Font<'a> {
    /// Parses the tables of `blob`. Malformed or missing tables are not an error; lookups
    /// against them simply find nothing.
    pub fn new(blob: &'a [u8]) -> Font<'a> {
        let tables = FontTables::new(blob);
        let char_map = CharMap::new(tables.cmap);
        let glyphs = GlyphTable::new(
            tables.loca,
            tables.glyf,
            tables.index_to_loc_format,
            tables.num_glyphs,
        );
        let advance_widths = tables.advance_widths();
        Font {
            tables,
            char_map,
            glyphs,
            advance_widths,
        }
    }

    pub fn tables(&self) -> &FontTables<'a> {
        &self.tables
    }

    pub fn char_map(&self) -> &CharMap {
        &self.char_map
    }

    pub fn units_per_em(&self) -> u16 {
        self.tables.units_per_em
    }

    pub fn num_glyphs(&self) -> u16 {
        self.tables.num_glyphs
    }

    /// Resolves a code point to a glyph id; 0 means the font has no glyph for it.
    pub fn glyph_id(&self, code_point: u32) -> u16 {
        self.char_map.resolve_glyph(code_point)
    }

    pub fn advance_width(&self, glyph_id: u16) -> u16 {
        self.advance_widths
            .get(glyph_id as usize)
            .copied()
            .unwrap_or(0)
    }

    /// Reads the advance and header bounding box without decoding the outline.
    pub fn glyph_metrics(&self, glyph_id: u16) -> GlyphMetrics {
        GlyphMetrics {
            advance_width: self.advance_width(glyph_id),
            bounds: self.glyphs.bounds(glyph_id),
        }
    }

    /// Decodes the outline of a glyph, reporting malformed data as an error.
    pub fn try_extract(&self, glyph_id: u16, flatness: f32) -> Result<GlyphOutline, ReadError> {
        let mut builder = OutlineBuilder::new();
        self.glyphs.append_outline(glyph_id, &mut builder)?;
        Ok(builder.build(self.advance_width(glyph_id), flatness))
    }

    /// Decodes the outline of a glyph. Malformed glyph data is logged and yields an empty
    /// outline.
    #[must_use]
    pub fn extract(&self, glyph_id: u16, flatness: f32) -> GlyphOutline {
        self.try_extract(glyph_id, flatness).unwrap_or_else(|e| {
            log::warn!("Glyph {glyph_id} could not be decoded: {e}");
            GlyphOutline::empty(self.advance_width(glyph_id), flatness)
        })
    }
}
