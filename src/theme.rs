//! Cat colour themes chosen by the user.
//!
//! The theme is plain configuration handed to an editing session when it starts. Nothing in the
//! compositor reads it, so the same stamps always produce the same pixels regardless of theme.

use std::str::FromStr;

use crate::foundation::error::PhotostampError;

/// User-selectable cat theme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatTheme {
    /// Yellow accents, black cat.
    #[default]
    Black,
    /// Pink accents, white cat.
    White,
    /// Sky-blue accents, bicolour cat.
    Blue,
}

/// Colours and decoration names resolved from a [`CatTheme`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemePalette {
    /// Page background, RGB.
    pub page_bg: [u8; 3],
    /// Accent used for buttons and borders, RGB.
    pub accent: [u8; 3],
    /// Background behind descriptive labels, RGB.
    pub label_bg: [u8; 3],
    /// Footprint decoration shown around the photo frame.
    pub footprints: &'static str,
    /// Short human description.
    pub description: &'static str,
}

impl CatTheme {
    /// All themes in display order.
    pub const ALL: [CatTheme; 3] = [CatTheme::Black, CatTheme::White, CatTheme::Blue];

    /// Stable lowercase key, as persisted.
    pub fn key(self) -> &'static str {
        match self {
            CatTheme::Black => "black",
            CatTheme::White => "white",
            CatTheme::Blue => "blue",
        }
    }

    /// Resolve the palette for this theme.
    pub fn palette(self) -> ThemePalette {
        match self {
            CatTheme::Black => ThemePalette {
                page_bg: [0xFF, 0xF7, 0xCA],
                accent: [0xFF, 0xCC, 0x01],
                label_bg: [0xFF, 0xF7, 0xCA],
                footprints: "footprints_yellow",
                description: "yellow accents with a black cat",
            },
            CatTheme::White => ThemePalette {
                page_bg: [0xFF, 0xFA, 0xFC],
                accent: [0xE6, 0xA2, 0xC5],
                label_bg: [0xFF, 0xE0, 0xF0],
                footprints: "footprints_pink",
                description: "pink accents with a white cat",
            },
            CatTheme::Blue => ThemePalette {
                page_bg: [0xEE, 0xF9, 0xFF],
                accent: [0x90, 0xD4, 0xF9],
                label_bg: [0xC5, 0xEA, 0xFF],
                footprints: "footprints_blue",
                description: "sky-blue accents with a bicolour cat",
            },
        }
    }
}

impl FromStr for CatTheme {
    type Err = PhotostampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CatTheme::ALL
            .into_iter()
            .find(|t| t.key() == s)
            .ok_or_else(|| PhotostampError::validation(format!("unknown cat theme '{s}'")))
    }
}

impl std::fmt::Display for CatTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
#[path = "../tests/unit/theme.rs"]
mod tests;
