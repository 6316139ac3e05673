//! Canonical hex dump layout.
//!
//! ```text
//! 0x00000000: 00  01  02  03    04  05  06  07      08  09  0A  0B    0C  0D  0E  0F      ................
//! ```
//!
//! Each line holds 16 bytes: the offset column, the hex pairs (two spaces after every byte, two
//! more after every fourth, two more again after the eighth), two spaces and the ASCII column.
//! A short last line is padded so that its ASCII column lines up.
//!
//! The walk is shared by every output flavor. It hands text to a [`DumpSink`], telling it which
//! [`ByteRegion`] a hex pair belongs to, and the sink decides what styling means.

use std::fmt::{self, Write};
use std::ops::Range;

use log::trace;
use serde::Serialize;

use crate::color::Color;
use crate::err::Result;
use crate::region::{ByteRegion, RegionLookup};

pub const BYTES_PER_LINE: usize = 16;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";
const GAP: &str = "  ";

/// Receives the pieces of a hex dump in order.
pub trait DumpSink {
    fn plain(&mut self, text: &str) -> fmt::Result;

    /// A hex pair that belongs to `region`.
    fn styled(&mut self, text: &str, region: &ByteRegion) -> fmt::Result;
}

impl DumpSink for String {
    fn plain(&mut self, text: &str) -> fmt::Result {
        self.push_str(text);
        Ok(())
    }

    fn styled(&mut self, text: &str, _region: &ByteRegion) -> fmt::Result {
        self.push_str(text);
        Ok(())
    }
}

/// Writes the dump of `data[..length]` into `sink`.
///
/// `base_offset` only shifts the offset column (for data that is a chunk of a larger file);
/// region lookups always use offsets relative to `data`. `length` is clamped to `data.len()`.
pub fn write_hexdump<S: DumpSink + ?Sized>(
    sink: &mut S,
    data: &[u8],
    length: usize,
    base_offset: u64,
    lookup: Option<&dyn RegionLookup>,
) -> Result<()> {
    let data = &data[..length.min(data.len())];
    trace!("dumping 0x{:x} bytes at base 0x{:x}", data.len(), base_offset);

    let mut scratch = String::with_capacity(BYTES_PER_LINE);

    for (line_index, line) in data.chunks(BYTES_PER_LINE).enumerate() {
        let line_start = line_index * BYTES_PER_LINE;

        scratch.clear();
        write!(scratch, "0x{:08x}: ", base_offset.wrapping_add(line_start as u64))?;
        sink.plain(&scratch)?;

        for i in 0..BYTES_PER_LINE {
            match line.get(i) {
                Some(&byte) => {
                    scratch.clear();
                    push_hex_pair(&mut scratch, byte);
                    match lookup.and_then(|l| l.region_at(line_start + i)) {
                        Some(region) => sink.styled(&scratch, region)?,
                        None => sink.plain(&scratch)?,
                    }
                }
                None => sink.plain(GAP)?,
            }

            sink.plain(GAP)?;
            if i % 4 == 3 {
                sink.plain(GAP)?;
            }
            if i == 7 {
                sink.plain(GAP)?;
            }
        }

        sink.plain(GAP)?;

        scratch.clear();
        scratch.extend((0..BYTES_PER_LINE).map(|i| line.get(i).map_or(' ', |&b| ascii_char(b))));
        scratch.push('\n');
        sink.plain(&scratch)?;
    }

    Ok(())
}

fn push_hex_pair(out: &mut String, byte: u8) {
    out.push(char::from(HEX_DIGITS[usize::from(byte >> 4)]));
    out.push(char::from(HEX_DIGITS[usize::from(byte & 0x0F)]));
}

/// Printable ASCII (32..=126) as is, everything else as `.`.
fn ascii_char(byte: u8) -> char {
    if (32..=126).contains(&byte) {
        char::from(byte)
    } else {
        '.'
    }
}

/// Unstyled dump.
pub fn hexdump(
    data: &[u8],
    length: usize,
    base_offset: u64,
    lookup: Option<&dyn RegionLookup>,
) -> Result<String> {
    let mut out = String::new();
    write_hexdump(&mut out, data, length, base_offset, lookup)?;
    Ok(out)
}

/// A styled piece of a [`StyledDump`] text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyledSpan {
    /// Byte range into [`StyledDump::text`].
    pub range: Range<usize>,
    pub background: Color,
    pub foreground: Color,
    /// `<structure>.<field> (<type>)`
    pub tooltip: String,
}

/// Dump text plus the spans a rich-text view should color.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StyledDump {
    pub text: String,
    pub spans: Vec<StyledSpan>,
}

impl DumpSink for StyledDump {
    fn plain(&mut self, text: &str) -> fmt::Result {
        self.text.push_str(text);
        Ok(())
    }

    fn styled(&mut self, text: &str, region: &ByteRegion) -> fmt::Result {
        let start = self.text.len();
        self.text.push_str(text);
        self.spans.push(StyledSpan {
            range: start..self.text.len(),
            background: region.color,
            foreground: region.color.contrast_text(),
            tooltip: region.describe(),
        });
        Ok(())
    }
}

pub fn styled_hexdump(
    data: &[u8],
    length: usize,
    base_offset: u64,
    lookup: Option<&dyn RegionLookup>,
) -> Result<StyledDump> {
    let mut out = StyledDump::default();
    write_hexdump(&mut out, data, length, base_offset, lookup)?;
    Ok(out)
}

/// Colors hex pairs with 24-bit ANSI escapes, for terminals.
#[derive(Debug, Default)]
pub struct AnsiSink {
    out: String,
}

impl AnsiSink {
    pub fn into_string(self) -> String {
        self.out
    }
}

impl DumpSink for AnsiSink {
    fn plain(&mut self, text: &str) -> fmt::Result {
        self.out.push_str(text);
        Ok(())
    }

    fn styled(&mut self, text: &str, region: &ByteRegion) -> fmt::Result {
        let bg = region.color;
        let fg = bg.contrast_text();
        write!(
            self.out,
            "\x1b[48;2;{};{};{}m\x1b[38;2;{};{};{}m{}\x1b[0m",
            bg.r, bg.g, bg.b, fg.r, fg.g, fg.b, text
        )
    }
}

pub fn ansi_hexdump(
    data: &[u8],
    length: usize,
    base_offset: u64,
    lookup: Option<&dyn RegionLookup>,
) -> Result<String> {
    let mut sink = AnsiSink::default();
    write_hexdump(&mut sink, data, length, base_offset, lookup)?;
    Ok(sink.into_string())
}
