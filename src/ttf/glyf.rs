//! Glyph outlines from the `loca` and `glyf` tables.
//!
//! Simple glyphs are decoded into quadratic segments following the TrueType contour convention.
//! Composite glyphs are flattened by recursing into their components with an accumulated
//! translation. Component scale and 2x2 transforms are skipped, not applied.

use sdf_glyph_renderer::{OutlineBuilder, Segment};

use crate::ttf::data::{Cursor, FontData, ReadError};
use crate::ttf::tables::LocaFormat;

/// Composite glyphs nested deeper than this are not followed.
pub const MAX_COMPONENT_DEPTH: usize = 16;

/// The most components followed while expanding a single glyph, counted across all levels.
pub const MAX_COMPONENT_COUNT: usize = 1024;

// Simple glyph point flags
const ON_CURVE_POINT: u8 = 0x01;
const X_SHORT_VECTOR: u8 = 0x02;
const Y_SHORT_VECTOR: u8 = 0x04;
const REPEAT_FLAG: u8 = 0x08;
const X_IS_SAME_OR_POSITIVE: u8 = 0x10;
const Y_IS_SAME_OR_POSITIVE: u8 = 0x20;

// Composite glyph component flags
pub const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
pub const ARGS_ARE_XY_VALUES: u16 = 0x0002;
pub const WE_HAVE_A_SCALE: u16 = 0x0008;
pub const MORE_COMPONENTS: u16 = 0x0020;
pub const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
pub const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: i16,
    pub y: i16,
    pub on_curve: bool,
}

/// The decoded points of a simple glyph, split into contours by `end_points`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimpleGlyph {
    pub end_points: Vec<u16>,
    pub points: Vec<Point>,
}

/// One component reference of a composite glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Component {
    pub flags: u16,
    pub glyph_id: u16,
    pub dx: i32,
    pub dy: i32,
}

/// A decoded glyph record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GlyphKind {
    Simple(SimpleGlyph),
    Composite(Vec<Component>),
}

/// The bounding box stored in a glyph header, in font units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphBounds {
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
}

/// Decodes a non-empty glyph record, dispatching on the sign of its contour count.
pub fn parse_glyph(data: FontData<'_>) -> Result<GlyphKind, ReadError> {
    let num_contours = data.read_i16(0)?;
    if num_contours >= 0 {
        parse_simple(data, num_contours as usize).map(GlyphKind::Simple)
    } else {
        parse_composite(data).map(GlyphKind::Composite)
    }
}

/// Reads the bounding box from a glyph header.
pub fn parse_bounds(data: FontData<'_>) -> Result<GlyphBounds, ReadError> {
    Ok(GlyphBounds {
        x_min: data.read_i16(2)?,
        y_min: data.read_i16(4)?,
        x_max: data.read_i16(6)?,
        y_max: data.read_i16(8)?,
    })
}

fn read_coordinates(
    cursor: &mut Cursor<'_>,
    flags: &[u8],
    short_flag: u8,
    same_or_positive_flag: u8,
) -> Result<Vec<i16>, ReadError> {
    let mut value: i16 = 0;
    let mut coordinates = Vec::with_capacity(flags.len());
    for &flag in flags {
        let delta = if flag & short_flag != 0 {
            let magnitude = i16::from(cursor.read_u8()?);
            if flag & same_or_positive_flag != 0 {
                magnitude
            } else {
                -magnitude
            }
        } else if flag & same_or_positive_flag != 0 {
            0
        } else {
            cursor.read_i16()?
        };
        value = value.wrapping_add(delta);
        coordinates.push(value);
    }
    Ok(coordinates)
}

pub fn parse_simple(data: FontData<'_>, num_contours: usize) -> Result<SimpleGlyph, ReadError> {
    let mut cursor = data.cursor();
    cursor.skip(10)?;

    let mut end_points: Vec<u16> = Vec::with_capacity(num_contours);
    for _ in 0..num_contours {
        let end = cursor.read_u16()?;
        if end_points.last().is_some_and(|&prev| end < prev) {
            return Err(ReadError::Malformed("contour end points decrease"));
        }
        end_points.push(end);
    }

    let instruction_length = cursor.read_u16()?;
    cursor.skip(instruction_length as usize)?;

    let num_points = end_points.last().map_or(0, |&end| end as usize + 1);
    let mut flags = Vec::with_capacity(num_points);
    while flags.len() < num_points {
        let flag = cursor.read_u8()?;
        flags.push(flag);
        if flag & REPEAT_FLAG != 0 {
            let repeat = cursor.read_u8()? as usize;
            let repeat = repeat.min(num_points - flags.len());
            flags.extend(std::iter::repeat(flag).take(repeat));
        }
    }

    let xs = read_coordinates(&mut cursor, &flags, X_SHORT_VECTOR, X_IS_SAME_OR_POSITIVE)?;
    let ys = read_coordinates(&mut cursor, &flags, Y_SHORT_VECTOR, Y_IS_SAME_OR_POSITIVE)?;

    let points = flags
        .iter()
        .zip(xs.into_iter().zip(ys))
        .map(|(&flag, (x, y))| Point {
            x,
            y,
            on_curve: flag & ON_CURVE_POINT != 0,
        })
        .collect();

    Ok(SimpleGlyph { end_points, points })
}

pub fn parse_composite(data: FontData<'_>) -> Result<Vec<Component>, ReadError> {
    let mut cursor = data.cursor();
    cursor.skip(10)?;

    let mut components = Vec::new();
    loop {
        let flags = cursor.read_u16()?;
        let glyph_id = cursor.read_u16()?;

        // Point matching is not supported; the arguments are always used as an offset
        let (dx, dy) = if flags & ARG_1_AND_2_ARE_WORDS != 0 {
            (i32::from(cursor.read_i16()?), i32::from(cursor.read_i16()?))
        } else {
            (i32::from(cursor.read_i8()?), i32::from(cursor.read_i8()?))
        };

        if flags & WE_HAVE_A_SCALE != 0 {
            cursor.skip(2)?;
        } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
            cursor.skip(4)?;
        } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
            cursor.skip(8)?;
        }

        components.push(Component {
            flags,
            glyph_id,
            dx,
            dy,
        });

        if flags & MORE_COMPONENTS == 0 {
            break;
        }
    }
    Ok(components)
}

impl SimpleGlyph {
    /// The points of each contour. Contours without points are skipped.
    pub fn contours(&self) -> impl Iterator<Item = &[Point]> + '_ {
        let mut start = 0;
        self.end_points.iter().filter_map(move |&end| {
            let end = end as usize + 1;
            let contour = self.points.get(start..end);
            start = end;
            contour.filter(|points| !points.is_empty())
        })
    }

    /// Appends every contour, translated by `(dx, dy)`, to `builder`.
    pub fn append_to(&self, builder: &mut OutlineBuilder, dx: i32, dy: i32) {
        for contour in self.contours() {
            append_contour(contour, dx, dy, builder);
        }
    }
}

fn midpoint(a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
    ((a.0 + b.0) * 0.5, (a.1 + b.1) * 0.5)
}

/// Emits one closed contour as quadratic segments.
///
/// The walk starts at the first on-curve point. Consecutive off-curve points imply an on-curve
/// point halfway between them; a contour made only of off-curve points starts at the implied
/// point between its last and first points.
fn append_contour(points: &[Point], dx: i32, dy: i32, builder: &mut OutlineBuilder) {
    let n = points.len();
    if n == 0 {
        return;
    }
    let position = |p: &Point| {
        (
            (i32::from(p.x) + dx) as f32,
            (i32::from(p.y) + dy) as f32,
        )
    };

    let (first, base) = match points.iter().position(|p| p.on_curve) {
        Some(start) => (position(&points[start]), start + 1),
        None => (midpoint(position(&points[n - 1]), position(&points[0])), 0),
    };

    builder.begin_contour();
    let mut anchor = first;
    let mut control: Option<(f32, f32)> = None;
    for k in 0..n {
        let point = &points[(base + k) % n];
        let p = position(point);
        match (point.on_curve, control) {
            (true, None) => {
                builder.push(Segment::line(anchor.0, anchor.1, p.0, p.1));
                anchor = p;
            }
            (true, Some(c)) => {
                builder.push(Segment::quad(anchor.0, anchor.1, c.0, c.1, p.0, p.1));
                anchor = p;
                control = None;
            }
            (false, None) => control = Some(p),
            (false, Some(c)) => {
                let mid = midpoint(c, p);
                builder.push(Segment::quad(anchor.0, anchor.1, c.0, c.1, mid.0, mid.1));
                anchor = mid;
                control = Some(p);
            }
        }
    }
    if let Some(c) = control {
        builder.push(Segment::quad(anchor.0, anchor.1, c.0, c.1, first.0, first.1));
    }
}

/// Locates glyph records through `loca` and decodes them from `glyf`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlyphTable<'a> {
    loca: Option<FontData<'a>>,
    glyf: Option<FontData<'a>>,
    format: LocaFormat,
    num_glyphs: u16,
}

impl<'a> GlyphTable<'a> {
    pub fn new(
        loca: Option<FontData<'a>>,
        glyf: Option<FontData<'a>>,
        format: LocaFormat,
        num_glyphs: u16,
    ) -> GlyphTable<'a> {
        GlyphTable {
            loca,
            glyf,
            format,
            num_glyphs,
        }
    }

    /// The raw record of a glyph. An empty slice is an empty glyph such as a space; `None`
    /// means the glyph has no outline at all (missing tables, bad id, or a bad range).
    pub fn glyph_data(&self, glyph_id: u16) -> Option<FontData<'a>> {
        let (loca, glyf) = (self.loca?, self.glyf?);
        if glyph_id >= self.num_glyphs {
            return None;
        }
        let gid = glyph_id as usize;
        let (offset, next) = match self.format {
            LocaFormat::Short => (
                loca.read_u16(gid * 2).ok()? as usize * 2,
                loca.read_u16((gid + 1) * 2).ok()? as usize * 2,
            ),
            LocaFormat::Long => (
                loca.read_u32(gid * 4).ok()? as usize,
                loca.read_u32((gid + 1) * 4).ok()? as usize,
            ),
        };
        if next < offset {
            log::warn!("Glyph {glyph_id} has a negative length in loca");
            return None;
        }
        glyf.slice(offset..next)
    }

    /// The bounding box of a non-empty glyph.
    pub fn bounds(&self, glyph_id: u16) -> Option<GlyphBounds> {
        self.glyph_data(glyph_id)
            .filter(|data| !data.is_empty())
            .and_then(|data| parse_bounds(data).ok())
    }

    /// Appends the outline of `glyph_id` to `builder`, expanding composite glyphs.
    ///
    /// Components that refer back into their own ancestor chain, that nest deeper than
    /// [`MAX_COMPONENT_DEPTH`], or that come after the first [`MAX_COMPONENT_COUNT`] are
    /// skipped.
    pub fn append_outline(
        &self,
        glyph_id: u16,
        builder: &mut OutlineBuilder,
    ) -> Result<(), ReadError> {
        self.append_translated(glyph_id, 0, 0, &mut ComponentWalk::default(), builder)
    }

    fn append_translated(
        &self,
        glyph_id: u16,
        dx: i32,
        dy: i32,
        walk: &mut ComponentWalk,
        builder: &mut OutlineBuilder,
    ) -> Result<(), ReadError> {
        let Some(data) = self.glyph_data(glyph_id) else {
            return Ok(());
        };
        if data.is_empty() {
            return Ok(());
        }

        match parse_glyph(data)? {
            GlyphKind::Simple(simple) => simple.append_to(builder, dx, dy),
            GlyphKind::Composite(components) => {
                if walk.ancestors.len() >= MAX_COMPONENT_DEPTH {
                    log::warn!("Composite glyph {glyph_id} nests too deeply; skipping");
                    return Ok(());
                }
                walk.ancestors.push(glyph_id);
                for component in components {
                    if walk.ancestors.contains(&component.glyph_id) {
                        log::warn!(
                            "Composite glyph {glyph_id} refers back to glyph {}; skipping component",
                            component.glyph_id
                        );
                        continue;
                    }
                    if walk.followed >= MAX_COMPONENT_COUNT {
                        log::warn!("Composite glyph {glyph_id} has too many components; truncating");
                        break;
                    }
                    walk.followed += 1;
                    self.append_translated(
                        component.glyph_id,
                        dx.saturating_add(component.dx),
                        dy.saturating_add(component.dy),
                        walk,
                        builder,
                    )?;
                }
                walk.ancestors.pop();
            }
        }
        Ok(())
    }
}

/// State carried through the expansion of one glyph.
#[derive(Debug, Default)]
struct ComponentWalk {
    /// The composite glyphs currently being expanded, outermost first.
    ancestors: Vec<u16>,
    /// The number of components followed so far, at any depth.
    followed: usize,
}
