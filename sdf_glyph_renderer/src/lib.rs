//! This crate turns quadratic glyph outlines into signed distance field tiles, in the spirit of
//! the techniques demonstrated by [Valve](https://steamcdn-a.akamaihd.net/apps/valve/2007/SIGGRAPH2007_AlphaTestedMagnification.pdf)
//! and [Mapbox](https://blog.mapbox.com/drawing-text-with-signed-distance-fields-in-mapbox-gl-b0933af6f817).
//!
//! The pipeline has three stages, each usable on its own:
//!
//! 1. A [`GlyphOutline`] (quadratic segments grouped into contours, in font units) is
//!    [`rasterize`]d into a supersampled 1-bit [`CoverageBitplane`]. Curves are flattened
//!    adaptively and filled scanline by scanline with the even-odd rule.
//! 2. [`render_sdf`] downsamples the bitplane with a 4x4 majority vote per output pixel and
//!    measures the distance to the nearest sample of opposite coverage within a bounded radius.
//! 3. Distances are normalised to the radius and packed into bytes centred on 128
//!    ([`encode_distance`]), producing an [`SdfTile`].
//!
//! The crate knows nothing about font files. It is used by `sdf_atlas_tools`, which reads
//! TrueType outlines and packs the resulting tiles into an atlas.

mod bitplane;
pub use crate::bitplane::CoverageBitplane;

mod core;
pub use crate::core::*;

mod error;
pub use crate::error::SdfGlyphError;

mod outline;
pub use crate::outline::{Bounds, GlyphOutline, OutlineBuilder, Segment};

mod params;
pub use crate::params::RenderParams;

mod raster;
pub use crate::raster::{flatten_contour, flatten_segment, rasterize};
