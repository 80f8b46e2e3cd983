use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use sdf_glyph_renderer::{rasterize, render_sdf, RenderParams, SdfGlyphError};

use crate::asset::{fit_u16, AssetHeader, AtlasAsset, GlyphRecord, GLYPH_MISSING};
use crate::atlas::{split_tiles, AtlasLayout, WorkQueue};
use crate::ttf::{Font, GlyphMetrics};
use crate::AtlasError;

/// Options for a single atlas generation run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtlasOptions {
    pub params: RenderParams,

    /// The width of the atlas canvas in px. The height grows to fit every glyph.
    pub atlas_width: usize,

    /// The number of worker threads; defaults to the number of logical CPUs.
    pub threads: Option<usize>,
}

impl Default for AtlasOptions {
    fn default() -> Self {
        AtlasOptions {
            params: RenderParams::default(),
            atlas_width: 1024,
            threads: None,
        }
    }
}

/// Scales font units to output pixels, rounding to the nearest integer.
#[derive(Clone, Copy, Debug)]
struct EmScale(f32);

impl EmScale {
    fn new(font: &Font, params: &RenderParams) -> Option<EmScale> {
        match font.units_per_em() {
            0 => None,
            upm => Some(EmScale(params.pixel_size as f32 / f32::from(upm))),
        }
    }

    // Float to int casts saturate, which is the clamping we want here
    fn to_i16(self, units: i16) -> i16 {
        (f32::from(units) * self.0).round() as i16
    }

    fn to_u16(self, units: u16) -> u16 {
        (f32::from(units) * self.0).round() as u16
    }
}

/// Builds the header fields that depend on the font and parameters.
fn header_for(
    font: &Font,
    params: &RenderParams,
    layout: &AtlasLayout,
    glyph_count: usize,
) -> Result<AssetHeader, AtlasError> {
    let scale = EmScale::new(font, params);
    let (ascender, descender, line_advance) = match (font.tables().hhea, scale) {
        (Some(_), Some(scale)) => {
            let tables = font.tables();
            let ascender = scale.to_i16(tables.ascender);
            let descender = scale.to_i16(tables.descender);
            let height = i32::from(ascender) - i32::from(descender);
            let line_advance = height + i32::from(scale.to_i16(tables.line_gap));
            (
                ascender,
                descender,
                line_advance.clamp(0, i32::from(u16::MAX)) as u16,
            )
        }
        _ => {
            let ascender = fit_u16("pixel size", params.pixel_size as usize)?;
            let border = fit_u16("border", params.border as usize)?;
            (
                ascender as i16,
                -(border as i16),
                ascender.saturating_add(border),
            )
        }
    };

    Ok(AssetHeader {
        flags: 0,
        pixel_size: fit_u16("pixel size", params.pixel_size as usize)?,
        border: fit_u16("border", params.border as usize)?,
        spread: fit_u16("spread", params.spread as usize)?,
        font_height: ascender.saturating_sub(descender),
        ascender,
        descender,
        line_advance,
        atlas_width: fit_u16("atlas width", layout.width())?,
        atlas_height: fit_u16("atlas height", layout.height())?,
        glyph_count: u32::try_from(glyph_count).map_err(|_| AtlasError::AtlasTooLarge {
            what: "glyph count",
            value: glyph_count,
        })?,
    })
}

fn glyph_record(
    code_point: u32,
    glyph_id: u16,
    metrics: GlyphMetrics,
    scale: Option<EmScale>,
    layout: &AtlasLayout,
    index: usize,
) -> Result<GlyphRecord, AtlasError> {
    let rect = layout
        .glyph_rect(index)
        .ok_or(AtlasError::InvalidAsset("glyph without a tile"))?;
    let (bearing_x, bearing_y, advance) = match scale {
        Some(scale) => (
            metrics.bounds.map_or(0, |b| scale.to_i16(b.x_min)),
            metrics.bounds.map_or(0, |b| scale.to_i16(b.y_max)),
            scale.to_u16(metrics.advance_width),
        ),
        None => (0, 0, 0),
    };

    Ok(GlyphRecord {
        code_point,
        u: fit_u16("glyph x", rect.x)?,
        v: fit_u16("glyph y", rect.y)?,
        w: fit_u16("glyph width", rect.width)?,
        h: fit_u16("glyph height", rect.height)?,
        bearing_x,
        bearing_y,
        advance,
        atlas_id: 0,
        flags: if glyph_id == 0 { GLYPH_MISSING } else { 0 },
    })
}

/// A worker function that renders claimed glyphs until the queue runs dry.
///
/// Unresolved code points (glyph id 0) keep their reserved tile blank.
fn render_worker(
    font: &Font,
    glyph_ids: &[u16],
    queue: WorkQueue,
    params: &RenderParams,
    rendered: &AtomicUsize,
) -> Result<(), SdfGlyphError> {
    while let Some((index, mut view)) = queue.claim() {
        let glyph_id = glyph_ids[index];
        if glyph_id == 0 {
            continue;
        }

        let outline = font.extract(glyph_id, params.flatness);
        let plane = rasterize(&outline, params);
        let tile = render_sdf(&plane, params)?;
        view.blit(&tile);
        rendered.fetch_add(1, Ordering::Relaxed);
    }
    Ok(())
}

/// Renders an SDF atlas for `code_points`, one tile per code point in the order given.
///
/// The layout and all glyph records are fixed before any rendering starts; workers then
/// write only to their own tiles, so the output does not depend on the thread count or on
/// scheduling.
pub fn generate_atlas(
    font: &Font,
    code_points: &[u32],
    options: &AtlasOptions,
) -> Result<AtlasAsset, AtlasError> {
    let params = &options.params;
    params.validate()?;

    let layout = AtlasLayout::pack(code_points.len(), options.atlas_width, params)?;
    let header = header_for(font, params, &layout, code_points.len())?;

    let glyph_ids: Vec<u16> = code_points.iter().map(|&cp| font.glyph_id(cp)).collect();
    let scale = EmScale::new(font, params);
    let records = code_points
        .iter()
        .zip(&glyph_ids)
        .enumerate()
        .map(|(index, (&code_point, &glyph_id))| {
            let metrics = font.glyph_metrics(glyph_id);
            glyph_record(code_point, glyph_id, metrics, scale, &layout, index)
        })
        .collect::<Result<Vec<_>, AtlasError>>()?;

    let missing = records.iter().filter(|r| r.is_missing()).count();
    if missing > 0 {
        log::warn!("{missing} of {} code point(s) have no glyph in the font", code_points.len());
    }

    let mut pixels = vec![0u8; layout.width() * layout.height()];
    let queue = WorkQueue::new(split_tiles(&mut pixels, layout.width(), layout.tiles()));
    let num_threads = options
        .threads
        .unwrap_or_else(num_cpus::get)
        .clamp(1, queue.len().max(1));
    let rendered = AtomicUsize::new(0);
    log::debug!(
        "Rendering {} tile(s) into a {}x{} atlas on {num_threads} thread(s)",
        queue.len(),
        layout.width(),
        layout.height()
    );

    thread::scope(|scope| {
        let (glyph_ids, rendered) = (&glyph_ids, &rendered);
        let handles: Vec<_> = (0..num_threads)
            .map(|_| {
                let queue = queue.clone();
                scope.spawn(move || render_worker(font, glyph_ids, queue, params, rendered))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect::<Result<(), SdfGlyphError>>()
    })?;
    drop(queue);

    log::debug!(
        "Rendered {} glyph(s)",
        rendered.load(Ordering::Relaxed)
    );

    Ok(AtlasAsset {
        header,
        records,
        pixels,
    })
}
