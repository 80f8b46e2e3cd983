use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum AtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Settings decoding error: {0}")]
    Settings(#[from] serde_json::Error),
    #[error("Invalid settings in {path}: {reason}")]
    InvalidSettings { path: PathBuf, reason: String },
    #[error("SDF glyph error: {0}")]
    SdfGlyph(#[from] sdf_glyph_renderer::SdfGlyphError),
    #[error("Invalid atlas width {width}: a single {tile_side}px tile plus its border does not fit")]
    InvalidAtlasWidth { width: usize, tile_side: usize },
    #[error("Atlas too large: {what} is {value}, which does not fit in 16 bits")]
    AtlasTooLarge { what: &'static str, value: usize },
    #[error("Invalid data dimensions: expected {expected} bytes for a {width}x{height} image, but got {actual}")]
    InvalidDataDimensions {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Invalid atlas asset: {0}")]
    InvalidAsset(&'static str),
}
