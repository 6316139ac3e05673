//! Display colors of structures.
//!
//! Structures are colored by the order in which a parse pass first sees them: the Nth distinct
//! structure gets `PALETTE[N % PALETTE.len()]`. Nothing here keeps a running counter, the
//! index is recorded in the parse result.

use std::fmt;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Perceived brightness in `0.0..=1.0`, weighted as in WCAG.
    pub fn brightness(self) -> f64 {
        (f64::from(self.r) * 0.299 + f64::from(self.g) * 0.587 + f64::from(self.b) * 0.114) / 255.0
    }

    /// Black or white, whichever reads better on top of `self`.
    pub fn contrast_text(self) -> Color {
        if self.brightness() > 0.5 {
            Color::BLACK
        } else {
            Color::WHITE
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub const PALETTE: [Color; 10] = [
    Color::rgb(0xFF, 0x57, 0x33), // orange-red
    Color::rgb(0x33, 0xFF, 0x57), // green
    Color::rgb(0x33, 0x57, 0xFF), // blue
    Color::rgb(0xF3, 0xFF, 0x33), // yellow
    Color::rgb(0xFF, 0x33, 0xF3), // pink
    Color::rgb(0x33, 0xFF, 0xF3), // cyan
    Color::rgb(0xFF, 0x8C, 0x33), // orange
    Color::rgb(0x8C, 0x33, 0xFF), // purple
    Color::rgb(0x33, 0xFF, 0x8C), // light green
    Color::rgb(0xFF, 0x33, 0x8C), // magenta
];

/// Color of the structure first seen at `seen_index` (0-based) in a parse pass.
pub fn palette_color(seen_index: usize) -> Color {
    PALETTE[seen_index % PALETTE.len()]
}
