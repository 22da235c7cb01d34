use std::fmt;

use crate::kind::ListingKind;

/// Domain shape of a composite attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    SequenceOfString,
    StructuredObject,
}

impl fmt::Display for CompositeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositeKind::SequenceOfString => write!(f, "sequence of strings"),
            CompositeKind::StructuredObject => write!(f, "object"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    I64,
    F64,
    Bool,
    DateTimeUtc,
    Composite(CompositeKind),
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::String => write!(f, "String"),
            FieldKind::I64 => write!(f, "I64"),
            FieldKind::F64 => write!(f, "F64"),
            FieldKind::Bool => write!(f, "Bool"),
            FieldKind::DateTimeUtc => write!(f, "DateTimeUtc"),
            FieldKind::Composite(k) => write!(f, "Composite({k})"),
        }
    }
}

/// Who may write a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldAccess {
    /// Accepted from admin payloads.
    Writable,
    /// Maintained by the upsert pipeline only (`id`, timestamps).
    System,
}

/// One declared attribute of a listing record.
///
/// `name` is the camelCase key used on the wire, `column` the snake_case
/// key used by both storage backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
    pub access: FieldAccess,
    pub required: bool,
    pub max_len: Option<usize>,
}

impl FieldDef {
    #[must_use]
    pub const fn new(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column,
            kind,
            access: FieldAccess::Writable,
            required: false,
            max_len: None,
        }
    }

    #[must_use]
    pub const fn text(name: &'static str, column: &'static str, max_len: usize) -> Self {
        Self::new(name, column, FieldKind::String).max_len(max_len)
    }

    #[must_use]
    pub const fn sequence(name: &'static str, column: &'static str) -> Self {
        Self::new(name, column, FieldKind::Composite(CompositeKind::SequenceOfString))
    }

    #[must_use]
    pub const fn object(name: &'static str, column: &'static str) -> Self {
        Self::new(name, column, FieldKind::Composite(CompositeKind::StructuredObject))
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    #[must_use]
    pub const fn system(mut self) -> Self {
        self.access = FieldAccess::System;
        self
    }

    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.access == FieldAccess::Writable
    }

    #[must_use]
    pub fn composite_kind(&self) -> Option<CompositeKind> {
        match self.kind {
            FieldKind::Composite(k) => Some(k),
            _ => None,
        }
    }
}

/// Closed set of equality-filterable fields for one listing domain.
pub trait FacetField: Copy + Eq + Ord + std::hash::Hash + fmt::Debug + Send + Sync + 'static {
    const KIND: ListingKind;
    const FIELDS: &'static [Self];

    /// Request parameter key.
    fn name(&self) -> &'static str;

    /// Storage column the facet compares against.
    fn column(&self) -> &'static str;

    fn from_name(name: &str) -> Option<Self> {
        Self::FIELDS.iter().copied().find(|f| f.name() == name)
    }
}
