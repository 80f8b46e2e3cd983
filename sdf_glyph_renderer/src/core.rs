use crate::{CoverageBitplane, RenderParams, SdfGlyphError};

/// A finished signed distance field tile, one byte per pixel, row-major.
///
/// Values above 128 are inside the glyph and values below 128 are outside; 255 and 1 mean the
/// boundary is at least `spread` pixels away.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SdfTile {
    side: usize,
    data: Vec<u8>,
}

impl SdfTile {
    /// The tile width and height in px.
    pub fn side(&self) -> usize {
        self.side
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.side..(y + 1) * self.side]
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.side + x]
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Encodes a signed distance normalised to [-1, 1] into a single byte centred on 128.
#[must_use]
pub fn encode_distance(signed_norm: f32) -> u8 {
    (128.0 + signed_norm * 127.0).clamp(0.0, 255.0) as u8
}

/// Classifies an output pixel by majority vote over a 4x4 grid of samples.
fn is_inside(plane: &CoverageBitplane, x: usize, y: usize, supersample: usize) -> bool {
    let step = supersample / 4;
    let half = step / 2;
    let base_x = x * supersample + half;
    let base_y = y * supersample + half;

    let mut count = 0;
    for sy in 0..4 {
        for sx in 0..4 {
            let hx = (base_x + sx * step) as i64;
            let hy = (base_y + sy * step) as i64;
            count += usize::from(plane.get(hx, hy));
        }
    }
    count >= 8
}

/// Returns the squared distance in samples from `(cx, cy)` to the nearest sample whose
/// coverage differs from `inside`, saturating at `radius * radius`.
///
/// Rows are visited outward from the centre, and each row is scanned outward from the centre
/// column, so the search can stop as soon as the remaining candidates cannot beat the current
/// best.
fn nearest_opposite_sq(
    plane: &CoverageBitplane,
    cx: i64,
    cy: i64,
    inside: bool,
    radius: i64,
) -> i64 {
    let mut best = radius * radius;

    for dy in 0..=radius {
        let dyy = dy * dy;
        if dyy >= best {
            break;
        }
        let rows: &[i64] = if dy == 0 { &[0] } else { &[-dy, dy] };
        for &row in rows {
            let y = cy + row;
            for dx in 0..=radius {
                let d2 = dx * dx + dyy;
                if d2 >= best {
                    break;
                }
                if plane.get(cx + dx, y) != inside || plane.get(cx - dx, y) != inside {
                    best = d2;
                    break;
                }
            }
        }
    }

    best
}

/// Render a signed distance field tile from a supersampled coverage bitplane.
///
/// Each output pixel is classified as inside or outside by majority vote, then the distance to
/// the nearest sample of opposite coverage is searched within `spread` pixels. The distance is
/// normalised to units of the search radius, negated outside the glyph, and encoded with
/// [`encode_distance`].
pub fn render_sdf(
    plane: &CoverageBitplane,
    params: &RenderParams,
) -> Result<SdfTile, SdfGlyphError> {
    params.validate()?;

    let expected = params.bitplane_side();
    if plane.width() != expected || plane.height() != expected {
        return Err(SdfGlyphError::InvalidDataDimensions {
            expected,
            width: plane.width(),
            height: plane.height(),
        });
    }

    let side = params.tile_side();
    let supersample = params.supersample as usize;
    let radius = i64::from(params.radius_samples());
    let radius_f = radius as f32;

    let mut data = vec![0u8; side * side];
    for y in 0..side {
        for x in 0..side {
            let inside = is_inside(plane, x, y, supersample);
            let cx = (x * supersample + supersample / 2) as i64;
            let cy = (y * supersample + supersample / 2) as i64;

            let best = nearest_opposite_sq(plane, cx, cy, inside, radius);
            let norm = (best as f32).sqrt() / radius_f;
            let signed_norm = if inside { norm } else { -norm };
            data[y * side + x] = encode_distance(signed_norm);
        }
    }

    Ok(SdfTile { side, data })
}
