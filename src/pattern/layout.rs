//! Size and offset resolution.
//!
//! Resolution is two-pass: every captured structure name is registered first, then sized in
//! dependency order. A structure may therefore reference one that is declared further down
//! in the text. A structure that contains itself cannot be sized; the field that closes the
//! cycle falls back to [`DEFAULT_SCALAR_SIZE`] and is reported.

use ahash::RandomState;
use hashbrown::HashMap as FastMap;
use log::{debug, trace};
use serde::{Serialize, Serializer};

use crate::color::{Color, palette_color};
use crate::err::Diagnostic;
use crate::pattern::ast::{ArrayLength, BitfieldDecl, FieldDecl, Member, Pattern, StructDecl};
use crate::pattern::primitives::{DEFAULT_SCALAR_SIZE, scalar_size};

pub const BITFIELD_TYPE_NAME: &str = "bitfield";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Scalar,
    Array { count: usize, element_size: usize },
    Bitfield { bits: u64 },
    /// A single nested structure, expanded in place when resolving regions.
    Structure,
    /// A structure that (transitively) contains itself. Sized as one scalar and never
    /// expanded.
    Recursive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDefinition {
    pub name: String,
    /// Type as written, with arrays normalized to `<element>[<N>]`.
    pub type_name: String,
    pub kind: FieldKind,
    /// Relative to the start of the owning structure.
    pub offset: usize,
    pub size: usize,
}

impl FieldDefinition {
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructureDefinition {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
    pub total_size: usize,
    pub color: Color,
    /// Position of the structure in first-seen order, the source of its color.
    pub seen_index: usize,
}

/// All structures of one parse pass, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct StructureTable {
    structures: Vec<StructureDefinition>,
    index: FastMap<String, usize, RandomState>,
}

impl StructureTable {
    pub fn get(&self, name: &str) -> Option<&StructureDefinition> {
        self.index.get(name).map(|&i| &self.structures[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn color_of(&self, name: &str) -> Option<Color> {
        self.get(name).map(|s| s.color)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StructureDefinition> {
        self.structures.iter()
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }
}

impl PartialEq for StructureTable {
    fn eq(&self, other: &Self) -> bool {
        self.structures == other.structures
    }
}

impl Eq for StructureTable {}

impl Serialize for StructureTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.structures.iter())
    }
}

/// One structure being laid out on the explicit stack.
struct Frame {
    index: usize,
    /// Next member to lay out.
    next: usize,
    offset: usize,
    fields: Vec<FieldDefinition>,
}

impl Frame {
    fn new(index: usize) -> Self {
        Frame {
            index,
            next: 0,
            offset: 0,
            fields: Vec::new(),
        }
    }
}

/// What a field's type (one element of it, for arrays) turned out to be.
#[derive(Debug, Clone, Copy)]
enum Element {
    Scalar(usize),
    Structure(usize),
    /// A structure that is still being laid out, so it contains itself.
    Recursive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SizeState {
    Pending,
    InProgress,
    Done(usize),
}

struct LayoutBuilder<'a> {
    decls: Vec<&'a StructDecl>,
    index: FastMap<&'a str, usize, RandomState>,
    states: Vec<SizeState>,
    fields: Vec<Vec<FieldDefinition>>,
    diagnostics: Vec<Diagnostic>,
}

/// Resolves the syntax tree into a [`StructureTable`].
///
/// The first declaration of a name wins, later ones are reported and do not take a color.
pub fn build_layout(pattern: &Pattern) -> (StructureTable, Vec<Diagnostic>) {
    let mut builder = LayoutBuilder::new(pattern);

    for i in 0..builder.decls.len() {
        builder.resolve(i);
    }

    builder.finish()
}

impl<'a> LayoutBuilder<'a> {
    fn new(pattern: &'a Pattern) -> Self {
        let mut decls: Vec<&'a StructDecl> = Vec::with_capacity(pattern.structs.len());
        let mut index = FastMap::with_hasher(RandomState::new());
        let mut diagnostics = Vec::new();

        for decl in &pattern.structs {
            if index.contains_key(decl.name.as_str()) {
                let diagnostic = Diagnostic::DuplicateStructure {
                    name: decl.name.clone(),
                    position: decl.position,
                };
                debug!("{}", diagnostic);
                diagnostics.push(diagnostic);
                continue;
            }
            index.insert(decl.name.as_str(), decls.len());
            decls.push(decl);
        }

        let count = decls.len();
        LayoutBuilder {
            decls,
            index,
            states: vec![SizeState::Pending; count],
            fields: vec![Vec::new(); count],
            diagnostics,
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        debug!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Lays out structure `root` and everything it depends on.
    ///
    /// Dependencies are laid out through an explicit stack, so nesting depth is bounded by
    /// memory only. A frame that meets a pending structure pushes it and retries the same
    /// member once it is done.
    fn resolve(&mut self, root: usize) {
        if self.states[root] != SizeState::Pending {
            return;
        }
        self.states[root] = SizeState::InProgress;
        let mut stack = vec![Frame::new(root)];

        while let Some(frame) = stack.last_mut() {
            let decl = self.decls[frame.index];

            let member = match decl.members.get(frame.next) {
                Some(member) => member,
                None => {
                    let Some(frame) = stack.pop() else { break };
                    trace!("struct `{}` is 0x{:x} bytes", decl.name, frame.offset);
                    self.fields[frame.index] = frame.fields;
                    self.states[frame.index] = SizeState::Done(frame.offset);
                    continue;
                }
            };

            let mut field = match member {
                Member::Bitfield(b) => bitfield_layout(b),
                Member::Field(f) => {
                    let element = match self.index.get(f.type_name.as_str()).copied() {
                        Some(j) => match self.states[j] {
                            SizeState::Pending => {
                                self.states[j] = SizeState::InProgress;
                                stack.push(Frame::new(j));
                                continue;
                            }
                            SizeState::InProgress => Element::Recursive,
                            SizeState::Done(size) => Element::Structure(size),
                        },
                        None => Element::Scalar(scalar_size(&f.type_name)),
                    };
                    self.field_layout(decl, f, element)
                }
            };

            if let Some(frame) = stack.last_mut() {
                field.offset = frame.offset;
                frame.offset = frame.offset.saturating_add(field.size);
                frame.fields.push(field);
                frame.next += 1;
            }
        }
    }

    fn field_layout(&mut self, owner: &StructDecl, f: &FieldDecl, element: Element) -> FieldDefinition {
        let element_size = match element {
            Element::Scalar(size) | Element::Structure(size) => size,
            Element::Recursive => {
                self.report(Diagnostic::RecursiveDefinition {
                    structure: owner.name.clone(),
                    field: f.name.clone(),
                });
                DEFAULT_SCALAR_SIZE
            }
        };

        let (kind, size) = match &f.array {
            None => {
                let kind = match element {
                    Element::Scalar(_) => FieldKind::Scalar,
                    Element::Structure(_) => FieldKind::Structure,
                    Element::Recursive => FieldKind::Recursive,
                };
                (kind, element_size)
            }
            Some(ArrayLength::Fixed(n)) => {
                let count = usize::try_from(*n).unwrap_or(usize::MAX);
                (
                    FieldKind::Array {
                        count,
                        element_size,
                    },
                    element_size.saturating_mul(count),
                )
            }
            Some(ArrayLength::Unresolved(length)) => {
                self.report(Diagnostic::UnresolvedArrayLength {
                    structure: owner.name.clone(),
                    field: f.name.clone(),
                    length: length.clone(),
                    position: f.position,
                });
                (
                    FieldKind::Array {
                        count: 1,
                        element_size,
                    },
                    element_size,
                )
            }
        };

        FieldDefinition {
            name: f.name.clone(),
            type_name: f.display_type(),
            kind,
            offset: 0,
            size,
        }
    }

    fn finish(self) -> (StructureTable, Vec<Diagnostic>) {
        let mut structures = Vec::with_capacity(self.decls.len());
        let mut index = FastMap::with_capacity_and_hasher(self.decls.len(), RandomState::new());

        for (seen_index, (decl, fields)) in self.decls.iter().zip(self.fields).enumerate() {
            let total_size = fields.last().map(FieldDefinition::end).unwrap_or(0);
            index.insert(decl.name.clone(), seen_index);
            structures.push(StructureDefinition {
                name: decl.name.clone(),
                fields,
                total_size,
                color: palette_color(seen_index),
                seen_index,
            });
        }

        debug!("resolved {} structures", structures.len());
        (StructureTable { structures, index }, self.diagnostics)
    }
}

/// A bitfield occupies its bit widths rounded up to whole bytes.
fn bitfield_layout(b: &BitfieldDecl) -> FieldDefinition {
    let bits = b.total_bits();
    let size = usize::try_from(bits.div_ceil(8)).unwrap_or(usize::MAX);

    FieldDefinition {
        name: b.name.clone(),
        type_name: BITFIELD_TYPE_NAME.to_string(),
        kind: FieldKind::Bitfield { bits },
        offset: 0,
        size,
    }
}
