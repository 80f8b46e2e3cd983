use crate::SdfGlyphError;

/// The largest side in samples of a coverage bitplane, which bounds its memory to 512 MiB.
const MAX_BITPLANE_SIDE: u64 = 1 << 16;

/// Rejects `value` when it exceeds `max`.
fn at_most(what: &'static str, value: u64, max: u64) -> Result<(), SdfGlyphError> {
    if value > max {
        return Err(SdfGlyphError::ParameterTooLarge { what, value, max });
    }
    Ok(())
}

/// Fixed parameters shared by every glyph rendered in a single run.
///
/// All sizes are in output pixels unless noted otherwise. The supersampled bitplane used for
/// coverage is `supersample` times larger on each axis than the final tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderParams {
    /// The size in px of the longer side of a glyph's bounding box inside its tile.
    pub pixel_size: u32,

    /// The number of pixels of padding around the glyph on all sides of the tile.
    pub border: u32,

    /// The distance search radius in px. Distances further than this saturate.
    pub spread: u32,

    /// The supersampling factor of the coverage bitplane. Must be a multiple of 4 so that the
    /// 4x4 coverage vote lands on whole samples.
    pub supersample: u32,

    /// The flattening tolerance for quadratic segments, in font units.
    pub flatness: f32,
}

impl Default for RenderParams {
    fn default() -> Self {
        RenderParams {
            pixel_size: 16,
            border: 4,
            spread: 5,
            supersample: 64,
            flatness: 1.0 / 512.0,
        }
    }
}

impl RenderParams {
    /// Checks that the parameters describe a renderable configuration.
    pub fn validate(&self) -> Result<(), SdfGlyphError> {
        if self.pixel_size == 0 {
            return Err(SdfGlyphError::InvalidPixelSize);
        }
        if self.spread == 0 {
            return Err(SdfGlyphError::InvalidSpread);
        }
        if self.supersample == 0 || self.supersample % 4 != 0 {
            return Err(SdfGlyphError::InvalidSupersample(self.supersample));
        }
        if !self.flatness.is_finite() || self.flatness <= 0.0 {
            return Err(SdfGlyphError::InvalidFlatness(self.flatness));
        }

        // Sizes end up in 16-bit asset fields
        let max_u16 = u64::from(u16::MAX);
        at_most("pixel size", self.pixel_size.into(), max_u16)?;
        at_most("border", self.border.into(), max_u16)?;
        at_most("spread", self.spread.into(), max_u16)?;
        at_most("tile side", self.tile_side_u64(), max_u16)?;
        at_most(
            "bitplane side",
            self.tile_side_u64() * u64::from(self.supersample),
            MAX_BITPLANE_SIDE,
        )?;
        at_most(
            "search radius",
            u64::from(self.spread) * u64::from(self.supersample),
            i32::MAX as u64,
        )
    }

    fn tile_side_u64(&self) -> u64 {
        u64::from(self.pixel_size) + 2 * u64::from(self.border)
    }

    /// The side length in px of a finished tile, border included.
    pub fn tile_side(&self) -> usize {
        usize::try_from(self.tile_side_u64()).unwrap_or(usize::MAX)
    }

    /// The side length in samples of the supersampled coverage bitplane.
    ///
    /// Saturates for parameters that [`RenderParams::validate`] rejects.
    pub fn bitplane_side(&self) -> usize {
        self.tile_side().saturating_mul(self.supersample as usize)
    }

    /// The distance search radius in samples.
    ///
    /// Saturates for parameters that [`RenderParams::validate`] rejects.
    pub fn radius_samples(&self) -> i32 {
        i32::try_from(u64::from(self.spread) * u64::from(self.supersample)).unwrap_or(i32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::RenderParams;
    use crate::SdfGlyphError;

    #[test]
    fn test_default_params() {
        let params = RenderParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.tile_side(), 24);
        assert_eq!(params.bitplane_side(), 24 * 64);
        assert_eq!(params.radius_samples(), 320);
    }

    #[test]
    fn test_invalid_params() {
        let params = RenderParams {
            supersample: 6,
            ..RenderParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(SdfGlyphError::InvalidSupersample(6))
        ));

        let params = RenderParams {
            pixel_size: 0,
            ..RenderParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(SdfGlyphError::InvalidPixelSize)
        ));

        let params = RenderParams {
            flatness: f32::NAN,
            ..RenderParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_oversized_params() {
        let params = RenderParams {
            border: 1 << 31,
            ..RenderParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(SdfGlyphError::ParameterTooLarge { what: "border", .. })
        ));

        let params = RenderParams {
            spread: 1 << 20,
            supersample: 4096,
            ..RenderParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(SdfGlyphError::ParameterTooLarge { what: "spread", .. })
        ));
        assert_eq!(params.radius_samples(), i32::MAX);

        // Each value fits on its own, but the tile does not
        let params = RenderParams {
            pixel_size: 60_000,
            border: 3_000,
            ..RenderParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(SdfGlyphError::ParameterTooLarge { what: "tile side", value: 66_000, .. })
        ));

        let params = RenderParams {
            pixel_size: 1024,
            supersample: 64,
            ..RenderParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(SdfGlyphError::ParameterTooLarge { what: "bitplane side", .. })
        ));

        let params = RenderParams {
            pixel_size: 1,
            border: 0,
            spread: 65_535,
            supersample: 65_532,
            ..RenderParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(SdfGlyphError::ParameterTooLarge { what: "search radius", .. })
        ));
    }
}
