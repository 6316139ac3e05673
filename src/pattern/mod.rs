//! The structure-definition ("pattern") language.
//!
//! ```text
//! struct Header {
//!     u32 magic;
//!     u16 version[2];
//!     bitfield { compressed : 1; encrypted : 1; reserved : 14; } flags;
//! };
//!
//! struct main {
//!     Header header;
//!     u8 payload[16];
//! };
//! ```
//!
//! Parsing goes text -> [`tokens`] -> [`ast`] (via [`parser`]) -> [`layout`]. Every call to
//! [`parse_pattern`] owns all of its state, so the same text always yields the same table and
//! the same colors.

pub mod ast;
pub mod layout;
pub mod parser;
pub mod primitives;
pub mod tokens;

use log::debug;
use serde::Serialize;

use crate::err::Diagnostic;
pub use self::layout::{FieldDefinition, FieldKind, StructureDefinition, StructureTable};
pub use self::primitives::PrimitiveType;

/// Result of one parse pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PatternDefinitions {
    pub structures: StructureTable,
    /// Everything that was skipped or defaulted, in the order it was found.
    pub diagnostics: Vec<Diagnostic>,
}

/// Parses definition text into a structure table. Never fails, see [`PatternDefinitions::diagnostics`].
pub fn parse_pattern(source: &str) -> PatternDefinitions {
    let (ast, mut diagnostics) = parser::parse(source);
    let (structures, layout_diagnostics) = layout::build_layout(&ast);
    diagnostics.extend(layout_diagnostics);

    debug!(
        "parsed pattern: {} structures, {} diagnostics",
        structures.len(),
        diagnostics.len()
    );

    PatternDefinitions {
        structures,
        diagnostics,
    }
}
