use std::fmt;

/// Size used for any type name that is neither a known primitive nor a declared structure.
pub const DEFAULT_SCALAR_SIZE: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    U8,
    S8,
    Char,
    U16,
    S16,
    U32,
    S32,
    Float,
    U64,
    S64,
    Double,
}

const PRIMITIVES: [PrimitiveType; 11] = [
    PrimitiveType::U8,
    PrimitiveType::S8,
    PrimitiveType::Char,
    PrimitiveType::U16,
    PrimitiveType::S16,
    PrimitiveType::U32,
    PrimitiveType::S32,
    PrimitiveType::Float,
    PrimitiveType::U64,
    PrimitiveType::S64,
    PrimitiveType::Double,
];

impl PrimitiveType {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::U8 => "u8",
            PrimitiveType::S8 => "s8",
            PrimitiveType::Char => "char",
            PrimitiveType::U16 => "u16",
            PrimitiveType::S16 => "s16",
            PrimitiveType::U32 => "u32",
            PrimitiveType::S32 => "s32",
            PrimitiveType::Float => "float",
            PrimitiveType::U64 => "u64",
            PrimitiveType::S64 => "s64",
            PrimitiveType::Double => "double",
        }
    }

    /// Width in bytes.
    pub fn size(self) -> usize {
        match self {
            PrimitiveType::U8 | PrimitiveType::S8 | PrimitiveType::Char => 1,
            PrimitiveType::U16 | PrimitiveType::S16 => 2,
            PrimitiveType::U32 | PrimitiveType::S32 | PrimitiveType::Float => 4,
            PrimitiveType::U64 | PrimitiveType::S64 | PrimitiveType::Double => 8,
        }
    }

    /// Classifies a type name by prefix, the longest matching primitive name wins.
    ///
    /// `u32le` is a `u32`, `character` is a `char`, `u128` is nothing.
    pub fn from_prefix(type_name: &str) -> Option<PrimitiveType> {
        PRIMITIVES
            .iter()
            .copied()
            .filter(|p| type_name.starts_with(p.name()))
            .max_by_key(|p| p.name().len())
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte width of a scalar type name that does not name a structure.
pub fn scalar_size(type_name: &str) -> usize {
    PrimitiveType::from_prefix(type_name)
        .map(PrimitiveType::size)
        .unwrap_or(DEFAULT_SCALAR_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_primitive_widths() {
        let widths: Vec<(&str, usize)> = PRIMITIVES.iter().map(|p| (p.name(), p.size())).collect();
        assert_eq!(
            widths,
            vec![
                ("u8", 1),
                ("s8", 1),
                ("char", 1),
                ("u16", 2),
                ("s16", 2),
                ("u32", 4),
                ("s32", 4),
                ("float", 4),
                ("u64", 8),
                ("s64", 8),
                ("double", 8),
            ]
        );
    }

    #[test]
    fn test_prefix_matching() {
        assert_eq!(PrimitiveType::from_prefix("u32le"), Some(PrimitiveType::U32));
        assert_eq!(PrimitiveType::from_prefix("doublew"), Some(PrimitiveType::Double));
        assert_eq!(PrimitiveType::from_prefix("u128"), None);
        assert_eq!(PrimitiveType::from_prefix("Header"), None);
    }

    #[test]
    fn test_unknown_types_default_to_one_byte() {
        assert_eq!(scalar_size("padding"), DEFAULT_SCALAR_SIZE);
        assert_eq!(scalar_size("s16"), 2);
    }
}
