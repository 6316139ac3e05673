//! Labeled, colored byte regions: the one data shape every renderer consumes.
//!
//! Regions come from two places, the [`resolve`] walk over a parsed pattern and the
//! static [`fixed`] maps (boot record). Both answer "which region owns this byte" through
//! [`RegionLookup`], which is all the renderers need.

pub mod fixed;
pub mod resolve;

use std::ops::Range;

use serde::Serialize;

use crate::color::Color;

pub use self::fixed::{FixedRange, FixedRegionMap};
pub use self::resolve::{Resolution, resolve_regions};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ByteRegion {
    /// Relative to the start of the input buffer.
    pub offset: usize,
    pub length: usize,
    /// `<structure>.<field>`
    pub label: String,
    pub type_name: String,
    pub color: Color,
    /// Stands for a structure occurrence that was not expanded (recursion).
    pub opaque: bool,
}

impl ByteRegion {
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.offset <= offset && offset < self.end()
    }

    /// Tooltip text, `<structure>.<field> (<type>)`.
    pub fn describe(&self) -> String {
        format!("{} ({})", self.label, self.type_name)
    }
}

/// Answers which region, if any, a byte belongs to.
pub trait RegionLookup {
    /// `offset` is relative to the start of the buffer the regions were built for.
    fn region_at(&self, offset: usize) -> Option<&ByteRegion>;
}

/// Finds the region containing `offset` in regions sorted by offset and not overlapping.
pub(crate) fn find_sorted(regions: &[ByteRegion], offset: usize) -> Option<&ByteRegion> {
    let idx = regions.partition_point(|r| r.end() <= offset);
    regions.get(idx).filter(|r| r.contains(offset))
}

/// Ordered, non-overlapping regions produced by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct RegionList {
    regions: Vec<ByteRegion>,
}

impl RegionList {
    pub(crate) fn new(regions: Vec<ByteRegion>) -> Self {
        debug_assert!(
            regions.windows(2).all(|w| w[0].end() <= w[1].offset),
            "regions must be sorted and disjoint"
        );
        RegionList { regions }
    }

    pub fn as_slice(&self) -> &[ByteRegion] {
        &self.regions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ByteRegion> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn into_inner(self) -> Vec<ByteRegion> {
        self.regions
    }
}

impl RegionLookup for RegionList {
    fn region_at(&self, offset: usize) -> Option<&ByteRegion> {
        find_sorted(&self.regions, offset)
    }
}

impl<'a> IntoIterator for &'a RegionList {
    type Item = &'a ByteRegion;
    type IntoIter = std::slice::Iter<'a, ByteRegion>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}
