use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdfGlyphError {
    #[error("Invalid pixel size: the glyph pixel size must be greater than zero.")]
    InvalidPixelSize,

    #[error("Invalid spread: the distance search radius must be greater than zero.")]
    InvalidSpread,

    #[error("Invalid supersampling factor: must be a positive multiple of 4, but {0} was provided.")]
    InvalidSupersample(u32),

    #[error("Invalid flatness: the flattening tolerance must be finite and positive, but {0} was provided.")]
    InvalidFlatness(f32),

    #[error("Invalid parameters: the {what} of {value} exceeds the maximum of {max}.")]
    ParameterTooLarge {
        what: &'static str,
        value: u64,
        max: u64,
    },

    #[error("Invalid bitplane dimensions: expected a {expected}x{expected} bitplane, but got {width}x{height}.")]
    InvalidDataDimensions {
        expected: usize,
        width: usize,
        height: usize,
    },
}
