//! Run settings: which font to read and which characters to render.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::AtlasError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// Path to the TrueType font file.
    pub font_path: PathBuf,

    /// The characters to render, in atlas order.
    pub characters: String,
}

impl Settings {
    /// Parses the legacy whitespace separated format: the font path followed by the characters.
    ///
    /// Returns `None` unless both tokens are present. Anything after the second token is ignored.
    pub fn from_legacy(text: &str) -> Option<Settings> {
        let mut tokens = text.split_whitespace();
        let font_path = tokens.next()?;
        let characters = tokens.next()?;
        Some(Settings {
            font_path: PathBuf::from(font_path),
            characters: characters.to_string(),
        })
    }

    /// Loads settings from `path`. Files with a `.json` extension are decoded as JSON; anything
    /// else is read in the legacy format.
    pub fn load(path: &Path) -> Result<Settings, AtlasError> {
        let text = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Ok(serde_json::from_str(&text)?)
        } else {
            Settings::from_legacy(&text).ok_or_else(|| AtlasError::InvalidSettings {
                path: path.to_path_buf(),
                reason: "expected a font path followed by the characters to render".to_string(),
            })
        }
    }
}
