//! Syntax tree of a pattern definition, before any sizes are known.

use crate::pattern::tokens::Position;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pattern {
    /// Every captured `struct` declaration in document order, duplicates included.
    pub structs: Vec<StructDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDecl {
    pub name: String,
    pub members: Vec<Member>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Field(FieldDecl),
    Bitfield(BitfieldDecl),
}

/// `<type> <name>;`, with an optional `[N]` suffix on either the type or the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub type_name: String,
    pub array: Option<ArrayLength>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayLength {
    Fixed(u64),
    /// Anything but a single integer literal, kept as written.
    Unresolved(String),
}

/// `bitfield { <member> : <bits>; ... } <name>;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitfieldDecl {
    pub name: String,
    pub members: Vec<BitMember>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMember {
    pub name: String,
    pub bits: u64,
}

impl BitfieldDecl {
    pub fn total_bits(&self) -> u64 {
        self.members
            .iter()
            .fold(0u64, |acc, m| acc.saturating_add(m.bits))
    }
}

impl FieldDecl {
    /// Type name as displayed in labels, e.g. `u32` or `u32[4]`.
    pub fn display_type(&self) -> String {
        match &self.array {
            None => self.type_name.clone(),
            Some(ArrayLength::Fixed(n)) => format!("{}[{}]", self.type_name, n),
            Some(ArrayLength::Unresolved(expr)) => format!("{}[{}]", self.type_name, expr),
        }
    }
}
