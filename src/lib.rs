#![deny(unused_must_use)]
//! Labels and colors the bytes of a buffer according to a structure layout, and renders the
//! result as a hex dump or as HTML.
//!
//! ```
//! use hexlayout::{highlight, HighlightSettings};
//!
//! let data = [0x4D, 0x5A, 0x90, 0x00, 0x03, 0x00];
//! let pattern = "struct main { u16 magic; u32 pages; };";
//!
//! let result = highlight(&data, pattern, &HighlightSettings::default());
//! let labels: Vec<_> = result.regions().iter().map(|r| r.label.as_str()).collect();
//! assert_eq!(labels, ["main.magic", "main.pages"]);
//!
//! let dump = result.hexdump().unwrap();
//! assert!(dump.starts_with("0x00000000: 4D  5A  90  00"));
//! ```
//!
//! A layout is either written in the small pattern language (see [`pattern`]) or taken from a
//! built-in map such as [`FixedRegionMap::master_boot_record`]. Bad input is never an error:
//! whatever cannot be understood is skipped and reported as a [`Diagnostic`].

pub mod color;
pub mod err;
pub mod hexdump;
pub mod html;
pub mod pattern;
pub mod region;
pub mod utils;

use log::debug;
use serde::Serialize;

pub use color::{Color, PALETTE, palette_color};
pub use err::{Diagnostic, RegionMapError, SerializationError};
pub use hexdump::{AnsiSink, DumpSink, StyledDump, StyledSpan, write_hexdump};
pub use html::render_html;
pub use pattern::{PatternDefinitions, StructureTable, parse_pattern};
pub use region::{
    ByteRegion, FixedRange, FixedRegionMap, RegionList, RegionLookup, Resolution, resolve_regions,
};
pub use utils::parse_hex_string;

pub const DEFAULT_ROOT: &str = "main";

/// Options of a [`highlight`] run.
///
/// ```
/// use hexlayout::HighlightSettings;
///
/// let settings = HighlightSettings::new().root("Header").base_offset(0x200).length(64);
/// assert_eq!(settings.get_root(), "Header");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightSettings {
    root: String,
    base_offset: u64,
    length: Option<usize>,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        HighlightSettings {
            root: DEFAULT_ROOT.to_string(),
            base_offset: 0,
            length: None,
        }
    }
}

impl HighlightSettings {
    pub fn new() -> Self {
        HighlightSettings::default()
    }

    /// Structure the walk starts from. Defaults to `main`.
    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    /// Offset shown for the first byte. Only affects the dump's offset column.
    pub fn base_offset(mut self, base_offset: u64) -> Self {
        self.base_offset = base_offset;
        self
    }

    /// Consider only the first `length` bytes. Clamped to the buffer length.
    pub fn length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    pub fn get_root(&self) -> &str {
        &self.root
    }

    pub fn get_base_offset(&self) -> u64 {
        self.base_offset
    }

    pub fn get_length(&self) -> Option<usize> {
        self.length
    }

    fn clamp<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        match self.length {
            Some(length) => &data[..length.min(data.len())],
            None => data,
        }
    }
}

/// A buffer together with its regions, ready to be rendered.
#[derive(Debug, Clone, Serialize)]
pub struct Highlight<'a> {
    #[serde(skip)]
    data: &'a [u8],
    settings: HighlightSettings,
    structures: StructureTable,
    regions: RegionList,
    diagnostics: Vec<Diagnostic>,
}

/// Parses `pattern_text`, then walks the configured root over `data`.
pub fn highlight<'a>(data: &'a [u8], pattern_text: &str, settings: &HighlightSettings) -> Highlight<'a> {
    let data = settings.clamp(data);

    let PatternDefinitions {
        structures,
        mut diagnostics,
    } = parse_pattern(pattern_text);
    let resolution = resolve_regions(&structures, settings.get_root(), data.len());
    diagnostics.extend(resolution.diagnostics);

    debug!(
        "highlighted 0x{:x} bytes: {} regions, {} diagnostics",
        data.len(),
        resolution.regions.len(),
        diagnostics.len()
    );

    Highlight {
        data,
        settings: settings.clone(),
        structures,
        regions: resolution.regions,
        diagnostics,
    }
}

/// Highlights `data` with the fixed boot-record map. The `root` setting is not used.
pub fn highlight_master_boot_record<'a>(data: &'a [u8], settings: &HighlightSettings) -> Highlight<'a> {
    let data = settings.clamp(data);
    let regions = FixedRegionMap::master_boot_record().clipped(data.len());

    Highlight {
        data,
        settings: settings.clone(),
        structures: StructureTable::default(),
        regions: RegionList::new(regions),
        diagnostics: Vec::new(),
    }
}

/// Hex text in, HTML out: parses `hex` leniently (see [`parse_hex_string`]) and renders it
/// highlighted from the `main` structure of `pattern_text`.
pub fn highlight_hex_string(hex: &str, pattern_text: &str) -> Result<String, SerializationError> {
    let data = parse_hex_string(hex);
    highlight(&data, pattern_text, &HighlightSettings::default()).html()
}

impl<'a> Highlight<'a> {
    /// The bytes covered, after `length` was applied.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn settings(&self) -> &HighlightSettings {
        &self.settings
    }

    pub fn structures(&self) -> &StructureTable {
        &self.structures
    }

    pub fn regions(&self) -> &RegionList {
        &self.regions
    }

    /// Parse diagnostics first, then the ones found while walking the data.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_recursion(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_recursion)
    }

    pub fn hexdump(&self) -> Result<String, SerializationError> {
        hexdump::hexdump(
            self.data,
            self.data.len(),
            self.settings.base_offset,
            Some(&self.regions),
        )
    }

    pub fn styled_dump(&self) -> Result<StyledDump, SerializationError> {
        hexdump::styled_hexdump(
            self.data,
            self.data.len(),
            self.settings.base_offset,
            Some(&self.regions),
        )
    }

    /// The dump colored with 24-bit ANSI escapes.
    pub fn ansi_dump(&self) -> Result<String, SerializationError> {
        hexdump::ansi_hexdump(
            self.data,
            self.data.len(),
            self.settings.base_offset,
            Some(&self.regions),
        )
    }

    pub fn html(&self) -> Result<String, SerializationError> {
        render_html(self.data, Some(&self.regions))
    }

    /// Settings, structures, regions and diagnostics as a pretty JSON document.
    pub fn to_json(&self) -> Result<String, SerializationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_model_is_send_and_sync() {
        assert_send_sync::<Highlight<'static>>();
        assert_send_sync::<PatternDefinitions>();
        assert_send_sync::<FixedRegionMap>();
    }

    #[test]
    fn test_length_limits_regions_and_dump() {
        let data = [0u8; 8];
        let settings = HighlightSettings::new().length(3);
        let result = highlight(&data, "struct main { u16 a; u32 b; }", &settings);

        let spans: Vec<(usize, usize)> = result.regions().iter().map(|r| (r.offset, r.length)).collect();
        assert_eq!(spans, vec![(0, 2), (2, 1)]);
        assert_eq!(result.data().len(), 3);
    }

    #[test]
    fn test_base_offset_only_moves_the_offset_column() {
        let data = [0x41u8; 4];
        let pattern = "struct main { u32 a; }";
        let at_zero = highlight(&data, pattern, &HighlightSettings::default());
        let shifted = highlight(&data, pattern, &HighlightSettings::new().base_offset(0x200));

        assert_eq!(at_zero.regions(), shifted.regions());
        assert!(shifted.hexdump().unwrap().starts_with("0x00000200: 41"));
    }

    #[test]
    fn test_unknown_root_renders_plain() {
        let data = [0x01u8, 0x02];
        let result = highlight(&data, "struct Other { u8 a; }", &HighlightSettings::default());

        assert!(result.regions().is_empty());
        assert!(result.styled_dump().unwrap().spans.is_empty());
    }

    #[test]
    fn test_master_boot_record_is_clipped() {
        let data = [0u8; 100];
        let result = highlight_master_boot_record(&data, &HighlightSettings::default());

        assert_eq!(result.regions().len(), 1);
        assert_eq!(result.regions().as_slice()[0].length, 100);
    }

    #[test]
    fn test_hex_string_entry_point() {
        let html = highlight_hex_string("01 02", "struct main { u8 a; u8 b; }").unwrap();

        assert_eq!(html.matches("class=\"tooltiptext\"").count(), 2);
        assert!(html.contains("main.a (u8)"));
        assert!(html.contains("main.b (u8)"));
    }

    #[test]
    fn test_recursion_is_reported() {
        let data = [0u8; 4];
        let result = highlight(&data, "struct main { u8 a; main again; }", &HighlightSettings::default());

        assert!(result.has_recursion());
    }
}
