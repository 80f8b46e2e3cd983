use crate::{CoverageBitplane, GlyphOutline, RenderParams, Segment};

/// Intersections closer than this (in font units) on the same scanline are treated as one.
const INTERSECTION_EPSILON: f32 = 1e-5;

/// Guards against runaway subdivision on pathological input.
const MAX_SUBDIVISION_DEPTH: u32 = 16;

/// Adaptively flattens a quadratic segment, appending every point after its start to `out`.
///
/// The segment is bisected until the squared distance between the curve midpoint and the chord
/// midpoint is within `tolerance_sq`. Straight segments emit their end point immediately.
pub fn flatten_segment(segment: &Segment, tolerance_sq: f32, out: &mut Vec<(f32, f32)>) {
    if segment.is_line() {
        out.push((segment.x1, segment.y1));
    } else {
        flatten_quad(segment, tolerance_sq, 0, out);
    }
}

fn flatten_quad(s: &Segment, tolerance_sq: f32, depth: u32, out: &mut Vec<(f32, f32)>) {
    let mx = (s.x0 + 2.0 * s.cx + s.x1) * 0.25;
    let my = (s.y0 + 2.0 * s.cy + s.y1) * 0.25;
    let dx = mx - (s.x0 + s.x1) * 0.5;
    let dy = my - (s.y0 + s.y1) * 0.5;
    if dx * dx + dy * dy <= tolerance_sq || depth >= MAX_SUBDIVISION_DEPTH {
        out.push((s.x1, s.y1));
        return;
    }

    // de Casteljau split at t = 0.5; (mx, my) is the shared point
    let q0x = (s.x0 + s.cx) * 0.5;
    let q0y = (s.y0 + s.cy) * 0.5;
    let q1x = (s.cx + s.x1) * 0.5;
    let q1y = (s.cy + s.y1) * 0.5;
    flatten_quad(
        &Segment::quad(s.x0, s.y0, q0x, q0y, mx, my),
        tolerance_sq,
        depth + 1,
        out,
    );
    flatten_quad(
        &Segment::quad(mx, my, q1x, q1y, s.x1, s.y1),
        tolerance_sq,
        depth + 1,
        out,
    );
}

/// Flattens one contour into a closed polyline in font units.
pub fn flatten_contour(segments: &[Segment], tolerance_sq: f32) -> Vec<(f32, f32)> {
    let mut polyline = Vec::with_capacity(segments.len() * 2);
    for segment in segments {
        polyline.push((segment.x0, segment.y0));
        flatten_segment(segment, tolerance_sq, &mut polyline);
    }
    polyline
}

/// Appends the x coordinate of every edge of `polyline` crossing the horizontal line `y`.
///
/// The polyline is treated as closed. Edges use a half-open rule so that a vertex lying exactly
/// on the line is counted once.
fn scanline_crossings(polyline: &[(f32, f32)], y: f32, out: &mut Vec<f32>) {
    let n = polyline.len();
    for i in 0..n {
        let (x0, y0) = polyline[i];
        let (x1, y1) = polyline[(i + 1) % n];
        if (y0 > y) != (y1 > y) {
            let t = (y - y0) / (y1 - y0);
            out.push(x0 + t * (x1 - x0));
        }
    }
}

fn to_pixel(v: f32, max: i64) -> usize {
    // Truncating cast; `as` saturates for values beyond the i64 range
    (v as i64).clamp(0, max) as usize
}

/// Fills a glyph outline into a supersampled coverage bitplane using the even-odd rule.
///
/// The outline is scaled uniformly so that the longer side of its bounding box spans
/// `pixel_size * supersample` samples, and offset by `border * supersample` samples on both
/// axes. Row 0 of the bitplane is the top of the glyph.
#[must_use]
pub fn rasterize(outline: &GlyphOutline, params: &RenderParams) -> CoverageBitplane {
    let side = params.bitplane_side();
    let mut plane = CoverageBitplane::new(side, side);

    let Some(bounds) = outline.bounds() else {
        return plane;
    };
    let extent = bounds.width().max(bounds.height());
    if extent <= 0.0 || !extent.is_finite() {
        return plane;
    }

    let ss = params.supersample as f32;
    let scale = params.pixel_size as f32 * ss / extent;
    let off_x = params.border as f32 * ss - bounds.min_x * scale;
    let off_y = params.border as f32 * ss - bounds.min_y * scale;

    let tolerance_sq = outline.flatness() * outline.flatness();
    let polylines: Vec<Vec<(f32, f32)>> = outline
        .contours()
        .map(|contour| flatten_contour(contour, tolerance_sq))
        .filter(|polyline| polyline.len() >= 2)
        .collect();

    let max_x = side as i64 - 1;
    let mut crossings: Vec<f32> = Vec::new();
    for sy in 0..side {
        let y = (side as f32 - 1.0 - sy as f32 + 0.5 - off_y) / scale;

        crossings.clear();
        for polyline in &polylines {
            scanline_crossings(polyline, y, &mut crossings);
        }
        if crossings.len() < 2 {
            continue;
        }

        crossings.sort_by(f32::total_cmp);
        crossings.dedup_by(|next, kept| (*next - *kept).abs() <= INTERSECTION_EPSILON);

        for pair in crossings.chunks_exact(2) {
            let x0 = to_pixel(pair[0] * scale + off_x, max_x);
            let x1 = to_pixel(pair[1] * scale + off_x, max_x);
            plane.fill_span(sy, x0, x1);
        }
    }

    plane
}
