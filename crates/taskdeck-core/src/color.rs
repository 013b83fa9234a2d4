//! Tag colors and the value-to-name palette table.

use crate::Tag;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Error returned when a `#RRGGBB` string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color '{input}': expected #RRGGBB")]
pub struct ColorParseError {
    input: String,
}

/// 24-bit RGB color rendered as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor(u32);

impl HexColor {
    /// Color used for tags that cannot be resolved.
    pub const NEUTRAL: Self = Self(0x009E_9E9E);

    /// Build a color from its packed RGB value. Bits above 24 are dropped.
    #[must_use]
    pub const fn from_rgb(rgb: u32) -> Self {
        Self(rgb & 0x00FF_FFFF)
    }

    /// Packed RGB value.
    #[must_use]
    pub const fn rgb(self) -> u32 {
        self.0
    }

    /// Parse the wire form, falling back to [`HexColor::NEUTRAL`].
    #[must_use]
    pub fn parse_lossy(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::NEUTRAL)
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl FromStr for HexColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError { input: s.to_owned() };
        let digits = s.trim().strip_prefix('#').ok_or_else(err)?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        u32::from_str_radix(digits, 16).map(Self).map_err(|_| err())
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

impl Serialize for HexColor {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One row of the palette table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteEntry {
    /// Color value.
    pub value: HexColor,
    /// Display name.
    pub name: String,
}

impl PaletteEntry {
    /// Create a palette entry.
    pub fn new(value: HexColor, name: impl Into<String>) -> Self {
        Self {
            value,
            name: name.into(),
        }
    }
}

/// Explicit color-value to color-name table used by pickers and labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPalette {
    entries: Vec<PaletteEntry>,
}

impl Default for TagPalette {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TagPalette {
    /// Palette shipped with the client.
    #[must_use]
    pub fn builtin() -> Self {
        const BUILTIN: [(u32, &str); 11] = [
            (0x00F4_4336, "Red"),
            (0x00E9_1E63, "Pink"),
            (0x009C_27B0, "Purple"),
            (0x0021_96F3, "Blue"),
            (0x0000_BCD4, "Cyan"),
            (0x0000_9688, "Teal"),
            (0x004C_AF50, "Green"),
            (0x00FF_C107, "Amber"),
            (0x00FF_9800, "Orange"),
            (0x0079_5548, "Brown"),
            (0x009E_9E9E, "Grey"),
        ];
        Self {
            entries: BUILTIN
                .iter()
                .map(|&(rgb, name)| PaletteEntry::new(HexColor::from_rgb(rgb), name))
                .collect(),
        }
    }

    /// Build a palette from explicit entries. Later duplicates of a value are ignored.
    #[must_use]
    pub fn from_entries(entries: Vec<PaletteEntry>) -> Self {
        let mut unique: Vec<PaletteEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            if !unique.iter().any(|existing| existing.value == entry.value) {
                unique.push(entry);
            }
        }
        Self { entries: unique }
    }

    /// Entries in display order.
    #[must_use]
    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    /// Display name for a color, if the table knows it.
    #[must_use]
    pub fn name_of(&self, color: HexColor) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.value == color)
            .map(|entry| entry.name.as_str())
    }

    /// Display name, or the hex string when the color is not in the table.
    #[must_use]
    pub fn describe(&self, color: HexColor) -> String {
        self.name_of(color)
            .map_or_else(|| color.to_string(), str::to_owned)
    }
}

/// Resolve a tag name against the current tag set.
///
/// Names without a matching tag resolve to [`HexColor::NEUTRAL`].
#[must_use]
pub fn resolve_tag_color(name: &str, tags: &[Tag]) -> HexColor {
    tags.iter()
        .find(|tag| tag.name == name)
        .map_or(HexColor::NEUTRAL, |tag| tag.color)
}
