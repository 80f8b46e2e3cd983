//! # SDF Atlas Tools
//!
//! This crate builds signed distance field glyph atlases straight from TrueType fonts, with no
//! dependency on a native font library. It contains:
//!
//! - [`ttf`], a small checked reader for the TrueType tables needed to map characters to glyphs
//!   and decode their quadratic outlines;
//! - [`generate`], which packs one tile per requested character and renders the tiles in
//!   parallel with [`sdf_glyph_renderer`];
//! - [`asset`] and [`bmp`], which write the finished atlas as a compact binary asset and as an
//!   uncompressed bitmap for inspection.
//!
//! ```no_run
//! use sdf_atlas_tools::{decode_utf8, generate_atlas, AtlasOptions, Font};
//!
//! let blob = std::fs::read("font.ttf")?;
//! let font = Font::new(&blob);
//! let asset = generate_atlas(&font, &decode_utf8("ABC".as_bytes()), &AtlasOptions::default())?;
//! asset.save(std::path::Path::new("atlas.sdfb"))?;
//! # Ok::<(), sdf_atlas_tools::AtlasError>(())
//! ```

pub mod asset;
pub mod atlas;
pub mod bmp;
mod error;
pub mod generate;
pub mod settings;
pub mod text;
pub mod ttf;

pub use asset::{AssetHeader, AtlasAsset, GlyphRecord};
pub use error::AtlasError;
pub use generate::{generate_atlas, AtlasOptions};
pub use settings::Settings;
pub use text::decode_utf8;
pub use ttf::Font;
