//! Three-stop color gradients and hex color parsing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Color parsing and lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("Invalid hex color: {0}")]
    InvalidHex(String),
    #[error("Unknown gradient scheme: {0}")]
    UnknownScheme(String),
}

/// Normalized RGB color, each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb` or `#rrggbb` (the `#` is optional, case-insensitive).
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || ColorError::InvalidHex(hex.to_string());
        if !digits.is_ascii() {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        let (r, g, b) = match digits.len() {
            3 => {
                let short = |i: usize| channel(&digits[i..=i]).map(|v| v * 17);
                (short(0)?, short(1)?, short(2)?)
            }
            6 => (
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            ),
            _ => return Err(invalid()),
        };

        Ok(Self::from_bytes([r, g, b]))
    }

    pub fn from_bytes([r, g, b]: [u8; 3]) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        )
    }

    pub fn to_bytes(self) -> [u8; 3] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_bytes();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Three-stop gradient from low to high values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    pub stops: [Rgb; 3],
}

impl Gradient {
    pub fn from_hex(stops: [&str; 3]) -> Result<Self, ColorError> {
        Ok(Self {
            stops: [
                Rgb::from_hex(stops[0])?,
                Rgb::from_hex(stops[1])?,
                Rgb::from_hex(stops[2])?,
            ],
        })
    }

    /// Color at normalized position `t` in `[0, 1]`.
    ///
    /// Weights are `1 - t` for the low stop, `t` for the high stop and
    /// `2 * min(t, 1 - t)` for the middle stop, which peaks at `t = 0.5`.
    #[inline]
    pub fn blend(&self, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let low = 1.0 - t;
        let mid = 2.0 * t.min(low);
        let [a, b, c] = self.stops;
        Rgb::new(
            a.r * low + b.r * mid + c.r * t,
            a.g * low + b.g * mid + c.g * t,
            a.b * low + b.b * mid + c.b * t,
        )
    }
}

impl Default for Gradient {
    fn default() -> Self {
        GradientScheme::default().gradient()
    }
}

/// Named gradient presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GradientScheme {
    #[default]
    #[serde(rename = "Blue Green Red")]
    BlueGreenRed,
    #[serde(rename = "Yellow Orange Red")]
    YellowOrangeRed,
    #[serde(rename = "Yellow Green Blue")]
    YellowGreenBlue,
    #[serde(rename = "Grey")]
    Grey,
    #[serde(rename = "Purple Red")]
    PurpleRed,
}

impl GradientScheme {
    pub const ALL: [GradientScheme; 5] = [
        GradientScheme::BlueGreenRed,
        GradientScheme::YellowOrangeRed,
        GradientScheme::YellowGreenBlue,
        GradientScheme::Grey,
        GradientScheme::PurpleRed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GradientScheme::BlueGreenRed => "Blue Green Red",
            GradientScheme::YellowOrangeRed => "Yellow Orange Red",
            GradientScheme::YellowGreenBlue => "Yellow Green Blue",
            GradientScheme::Grey => "Grey",
            GradientScheme::PurpleRed => "Purple Red",
        }
    }

    pub fn hex_stops(self) -> [&'static str; 3] {
        match self {
            GradientScheme::BlueGreenRed => ["#0000ff", "#00ff00", "#ff0000"],
            GradientScheme::YellowOrangeRed => ["#ffeda0", "#feb24c", "#f03b20"],
            GradientScheme::YellowGreenBlue => ["#edf8b1", "#7fcdbb", "#2c7fb8"],
            GradientScheme::Grey => ["#f0f0f0", "#bdbdbd", "#636363"],
            GradientScheme::PurpleRed => ["#e7e1ef", "#c994c7", "#dd1c77"],
        }
    }

    pub fn gradient(self) -> Gradient {
        let [a, b, c] = self.hex_stops();
        Gradient {
            stops: [hex_const(a), hex_const(b), hex_const(c)],
        }
    }
}

/// Preset stops are literals that always parse.
fn hex_const(hex: &str) -> Rgb {
    Rgb::from_hex(hex).unwrap_or(Rgb::new(0.0, 0.0, 0.0))
}

impl fmt::Display for GradientScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GradientScheme {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GradientScheme::ALL
            .into_iter()
            .find(|scheme| scheme.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ColorError::UnknownScheme(s.to_string()))
    }
}
