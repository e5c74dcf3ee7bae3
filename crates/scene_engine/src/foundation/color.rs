//! RGB color values
//!
//! Colors are stored as linear `0.0..=1.0` channels and can be built from the
//! representations scene authors usually write: `#rrggbb`, `#rgb`, `0xrrggbb`,
//! `rgb(r, g, b)` with 0-255 channels, a packed integer, or a CSS color name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// RGB color with channels in the `0.0..=1.0` range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
}

const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x00_00_00),
    ("white", 0xff_ff_ff),
    ("red", 0xff_00_00),
    ("lime", 0x00_ff_00),
    ("green", 0x00_80_00),
    ("blue", 0x00_00_ff),
    ("yellow", 0xff_ff_00),
    ("cyan", 0x00_ff_ff),
    ("aqua", 0x00_ff_ff),
    ("magenta", 0xff_00_ff),
    ("fuchsia", 0xff_00_ff),
    ("gray", 0x80_80_80),
    ("grey", 0x80_80_80),
    ("silver", 0xc0_c0_c0),
    ("orange", 0xff_a5_00),
    ("purple", 0x80_00_80),
    ("navy", 0x00_00_80),
    ("teal", 0x00_80_80),
    ("maroon", 0x80_00_00),
    ("olive", 0x80_80_00),
];

impl Color {
    /// Create a color from float channels (clamped into `0.0..=1.0`)
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }

    /// Create a color from 8-bit channels
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f32::from(r) / 255.0,
            g: f32::from(g) / 255.0,
            b: f32::from(b) / 255.0,
        }
    }

    /// Create a color from a packed `0xRRGGBB` value; higher bits are ignored
    pub fn from_hex(hex: u32) -> Self {
        let [_, r, g, b] = hex.to_be_bytes();
        Self::from_rgb8(r, g, b)
    }

    /// Pack the color back into `0xRRGGBB`
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_hex(self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Parse any of the supported textual representations
    pub fn parse(input: &str) -> Option<Self> {
        let text = input.trim();
        if let Some(hex) = text.strip_prefix('#') {
            return Self::parse_hex_digits(hex);
        }
        if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            return Self::parse_hex_digits(hex).filter(|_| hex.len() == 6);
        }
        if let Some(body) = text
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let channels: Vec<u8> = body
                .split(',')
                .map(|part| part.trim().parse::<u8>())
                .collect::<Result<_, _>>()
                .ok()?;
            return match channels.as_slice() {
                [r, g, b] => Some(Self::from_rgb8(*r, *g, *b)),
                _ => None,
            };
        }
        let lowered = text.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lowered)
            .map(|(_, hex)| Self::from_hex(*hex))
    }

    fn parse_hex_digits(digits: &str) -> Option<Self> {
        match digits.len() {
            6 => u32::from_str_radix(digits, 16).ok().map(Self::from_hex),
            3 => {
                let short = u32::from_str_radix(digits, 16).ok()?;
                let (r, g, b) = ((short >> 8) & 0xf, (short >> 4) & 0xf, short & 0xf);
                Some(Self::from_hex((r * 0x11) << 16 | (g * 0x11) << 8 | (b * 0x11)))
            }
            _ => None,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::from_hex(0xff_ff_ff)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}
