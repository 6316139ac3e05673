use log::{debug, trace, warn};

use crate::err::Diagnostic;
use crate::pattern::{FieldDefinition, FieldKind, StructureDefinition, StructureTable};
use crate::region::{ByteRegion, RegionList};

/// Regions of one buffer, plus whatever had to be cut short on the way.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolution {
    pub regions: RegionList,
    pub diagnostics: Vec<Diagnostic>,
}

struct Resolver<'a> {
    structures: &'a StructureTable,
    regions: Vec<ByteRegion>,
    diagnostics: Vec<Diagnostic>,
}

/// One structure being expanded.
struct Frame<'a> {
    structure: &'a StructureDefinition,
    base: usize,
    /// Nothing of this structure is emitted at or past `limit`.
    limit: usize,
    /// Next field to visit.
    next: usize,
}

/// Walks `root` over a buffer of `data_len` bytes, depth first in declaration order.
///
/// Nested structures are expanded in place, every other field becomes exactly one region
/// truncated to the buffer. Fields starting past the end of the buffer are left out, and so
/// are nested structures without any bytes. A field whose structure contains itself becomes a
/// single opaque region. An unknown `root` yields no regions.
pub fn resolve_regions(structures: &StructureTable, root: &str, data_len: usize) -> Resolution {
    let Some(root_structure) = structures.get(root) else {
        debug!("root structure `{}` is not defined, nothing to highlight", root);
        return Resolution::default();
    };

    let mut resolver = Resolver {
        structures,
        regions: Vec::new(),
        diagnostics: Vec::new(),
    };
    resolver.walk(root_structure, data_len);

    debug!(
        "resolved {} regions from `{}` over 0x{:x} bytes",
        resolver.regions.len(),
        root,
        data_len
    );

    Resolution {
        regions: RegionList::new(resolver.regions),
        diagnostics: resolver.diagnostics,
    }
}

impl<'a> Resolver<'a> {
    /// Expands `root` with an explicit stack, so nesting depth is bounded by memory only.
    fn walk(&mut self, root: &'a StructureDefinition, data_len: usize) {
        let structures = self.structures;
        let mut stack = vec![Frame {
            structure: root,
            base: 0,
            limit: data_len,
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let structure = frame.structure;
            let Some(field) = structure.fields.get(frame.next) else {
                stack.pop();
                continue;
            };
            frame.next += 1;

            let field_offset = frame.base.saturating_add(field.offset);
            if field_offset >= frame.limit {
                trace!(
                    "`{}.{}` at 0x{:x} is past the end of the data",
                    structure.name, field.name, field_offset
                );
                continue;
            }
            let field_limit = field.end().saturating_add(frame.base).min(frame.limit);

            match field.kind {
                FieldKind::Recursive => {
                    let diagnostic = Diagnostic::RecursiveExpansion {
                        structure: field.type_name.clone(),
                        label: label(structure, field),
                        offset: field_offset,
                    };
                    warn!("{}", diagnostic);
                    self.diagnostics.push(diagnostic);
                    self.emit(structure, field, field_offset, field_limit, true);
                }
                FieldKind::Structure => match structures.get(&field.type_name) {
                    Some(inner) if inner.total_size == 0 => {
                        trace!("`{}` has no bytes, not expanding", inner.name);
                    }
                    Some(inner) => stack.push(Frame {
                        structure: inner,
                        base: field_offset,
                        limit: field_limit,
                        next: 0,
                    }),
                    None => self.emit(structure, field, field_offset, field_limit, false),
                },
                _ => self.emit(structure, field, field_offset, field_limit, false),
            }
        }
    }

    fn emit(
        &mut self,
        owner: &StructureDefinition,
        field: &FieldDefinition,
        offset: usize,
        limit: usize,
        opaque: bool,
    ) {
        self.regions.push(ByteRegion {
            offset,
            length: limit - offset,
            label: label(owner, field),
            type_name: field.type_name.clone(),
            color: owner.color,
            opaque,
        });
    }
}

fn label(owner: &StructureDefinition, field: &FieldDefinition) -> String {
    format!("{}.{}", owner.name, field.name)
}
