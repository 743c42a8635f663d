//! Declarative field layouts

/// How many bytes a field occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// Exactly this many bytes
    Fixed(usize),
    /// A one or two byte length prefix (`N` or `81 N`) followed by N bytes
    Prefixed,
}

/// One entry of a layout table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec<F> {
    /// Field identifier
    pub field: F,
    /// Bytes skipped before the field (tags with no payload)
    pub skip: usize,
    /// Width of the field itself
    pub width: Width,
}

impl<F> FieldSpec<F> {
    /// Fixed-width field
    pub const fn fixed(field: F, skip: usize, len: usize) -> Self {
        Self {
            field,
            skip,
            width: Width::Fixed(len),
        }
    }

    /// Length-prefixed field
    pub const fn prefixed(field: F, skip: usize) -> Self {
        Self {
            field,
            skip,
            width: Width::Prefixed,
        }
    }
}

/// A named, ordered table of fields
#[derive(Debug, Clone, Copy)]
pub struct Layout<F: 'static> {
    /// Name used in error messages
    pub name: &'static str,
    /// Fields in buffer order
    pub fields: &'static [FieldSpec<F>],
}
