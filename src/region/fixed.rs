//! Static region maps that need no pattern, such as the master boot record.

use std::ops::Range;

use crate::color::Color;
use crate::err::RegionMapError;
use crate::region::{ByteRegion, RegionLookup, find_sorted};

pub const MBR_SIZE: usize = 512;
pub const MBR_PARTITION_TABLE_OFFSET: usize = 446;
pub const MBR_SIGNATURE_OFFSET: usize = 510;

const BOOTLOADER_COLOR: Color = Color::rgb(173, 216, 230); // light blue
const PARTITION_TABLE_COLOR: Color = Color::rgb(152, 251, 152); // pale green
const BOOT_SIGNATURE_COLOR: Color = Color::rgb(255, 182, 193); // light pink

/// One entry of a custom map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedRange {
    pub range: Range<usize>,
    pub label: String,
    pub type_name: String,
    pub color: Color,
}

impl FixedRange {
    pub fn new(range: Range<usize>, label: impl Into<String>, type_name: impl Into<String>, color: Color) -> Self {
        FixedRange {
            range,
            label: label.into(),
            type_name: type_name.into(),
            color,
        }
    }
}

/// A flat list of labeled ranges, no nesting and no parsing.
///
/// Ranges need not touch each other, but must not overlap. Offsets outside every range are
/// left unstyled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedRegionMap {
    regions: Vec<ByteRegion>,
}

impl FixedRegionMap {
    pub fn new(ranges: Vec<FixedRange>) -> Result<Self, RegionMapError> {
        let mut regions = Vec::with_capacity(ranges.len());

        for r in ranges {
            if r.range.start > r.range.end {
                return Err(RegionMapError::InvertedRange {
                    label: r.label,
                    start: r.range.start,
                    end: r.range.end,
                });
            }
            regions.push(ByteRegion {
                offset: r.range.start,
                length: r.range.end - r.range.start,
                label: r.label,
                type_name: r.type_name,
                color: r.color,
                opaque: false,
            });
        }

        regions.sort_by_key(|r| r.offset);

        for pair in regions.windows(2) {
            let (previous, next) = (&pair[0], &pair[1]);
            if previous.end() > next.offset {
                return Err(RegionMapError::Overlap {
                    label: next.label.clone(),
                    start: next.offset,
                    previous: previous.label.clone(),
                    previous_end: previous.end(),
                });
            }
        }

        Ok(FixedRegionMap { regions })
    }

    /// Classic MBR layout: bootstrap code, four partition entries, `55 AA` signature.
    pub fn master_boot_record() -> Self {
        let region = |range: Range<usize>, label: &str, type_name: &str, color: Color| ByteRegion {
            offset: range.start,
            length: range.end - range.start,
            label: label.to_string(),
            type_name: type_name.to_string(),
            color,
            opaque: false,
        };

        FixedRegionMap {
            regions: vec![
                region(
                    0..MBR_PARTITION_TABLE_OFFSET,
                    "mbr.bootloader",
                    "u8[446]",
                    BOOTLOADER_COLOR,
                ),
                region(
                    MBR_PARTITION_TABLE_OFFSET..MBR_SIGNATURE_OFFSET,
                    "mbr.partition_table",
                    "u8[64]",
                    PARTITION_TABLE_COLOR,
                ),
                region(
                    MBR_SIGNATURE_OFFSET..MBR_SIZE,
                    "mbr.boot_signature",
                    "u16",
                    BOOT_SIGNATURE_COLOR,
                ),
            ],
        }
    }

    pub fn regions(&self) -> &[ByteRegion] {
        &self.regions
    }

    /// The regions as they apply to a buffer of `data_len` bytes: clipped, empty ones dropped.
    pub fn clipped(&self, data_len: usize) -> Vec<ByteRegion> {
        self.regions
            .iter()
            .filter(|r| r.offset < data_len)
            .map(|r| ByteRegion {
                length: r.end().min(data_len) - r.offset,
                ..r.clone()
            })
            .collect()
    }
}

impl RegionLookup for FixedRegionMap {
    fn region_at(&self, offset: usize) -> Option<&ByteRegion> {
        find_sorted(&self.regions, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_master_boot_record_boundaries() {
        let mbr = FixedRegionMap::master_boot_record();
        let label = |offset| mbr.region_at(offset).map(|r| r.label.as_str());

        assert_eq!(label(0), Some("mbr.bootloader"));
        assert_eq!(label(445), Some("mbr.bootloader"));
        assert_eq!(label(446), Some("mbr.partition_table"));
        assert_eq!(label(509), Some("mbr.partition_table"));
        assert_eq!(label(510), Some("mbr.boot_signature"));
        assert_eq!(label(511), Some("mbr.boot_signature"));
        assert_eq!(label(512), None);
        assert_eq!(label(4096), None);
    }

    #[test]
    fn test_custom_map_sorts_ranges() {
        let map = FixedRegionMap::new(vec![
            FixedRange::new(8..10, "b", "u16", Color::WHITE),
            FixedRange::new(0..4, "a", "u32", Color::BLACK),
        ])
        .unwrap();

        assert_eq!(map.region_at(2).map(|r| r.label.as_str()), Some("a"));
        assert_eq!(map.region_at(5), None);
        assert_eq!(map.region_at(9).map(|r| r.label.as_str()), Some("b"));
    }

    #[test]
    fn test_rejects_overlap() {
        let err = FixedRegionMap::new(vec![
            FixedRange::new(0..4, "a", "u32", Color::BLACK),
            FixedRange::new(2..6, "b", "u32", Color::BLACK),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            RegionMapError::Overlap {
                label: "b".to_string(),
                start: 2,
                previous: "a".to_string(),
                previous_end: 4,
            }
        );
    }

    #[test]
    fn test_rejects_inverted_range() {
        #[allow(clippy::reversed_empty_ranges)]
        let result = FixedRegionMap::new(vec![FixedRange::new(6..2, "a", "u32", Color::BLACK)]);
        assert!(matches!(result, Err(RegionMapError::InvertedRange { .. })));
    }

    #[test]
    fn test_clipped_to_short_buffer() {
        let clipped = FixedRegionMap::master_boot_record().clipped(500);
        let spans: Vec<(usize, usize)> = clipped.iter().map(|r| (r.offset, r.length)).collect();

        assert_eq!(spans, vec![(0, 446), (446, 54)]);
    }
}
