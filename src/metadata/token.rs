//! Stable identifiers for hierarchy arena entries.
//!
//! Types and methods live in index-stable arenas owned by
//! [`crate::metadata::typesystem::TypeHierarchy`]. Everything else in the crate - call sites,
//! call graph edges, the reachable set, diagnostics - refers to them through the copyable
//! identifiers defined here instead of holding references. This keeps cyclic structures
//! (superclass links, interface diamonds, recursive call edges) free of reference cycles and
//! makes identity checks a plain integer comparison.
//!
//! Identifiers are assigned densely in registration order, starting at 0, so they double as
//! indices into per-type or per-method side tables.

use std::fmt;

/// Identifier of a class or interface registered in a [`TypeHierarchy`](crate::metadata::typesystem::TypeHierarchy).
///
/// # Examples
///
/// ```rust
/// use callscope::metadata::token::TypeId;
///
/// let id = TypeId::new(3);
/// assert_eq!(id.index(), 3);
/// assert_eq!(id.to_string(), "t3");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    /// Creates a new `TypeId` from a raw arena index.
    #[must_use]
    #[inline]
    pub const fn new(index: u32) -> Self {
        TypeId(index)
    }

    /// Returns the arena index of this type.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw identifier value.
    #[must_use]
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl From<u32> for TypeId {
    fn from(value: u32) -> Self {
        TypeId(value)
    }
}

/// Identifier of a method registered in a [`TypeHierarchy`](crate::metadata::typesystem::TypeHierarchy).
///
/// # Examples
///
/// ```rust
/// use callscope::metadata::token::MethodId;
///
/// let id = MethodId::new(12);
/// assert_eq!(id.index(), 12);
/// assert_eq!(id.to_string(), "m12");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodId(pub(crate) u32);

impl MethodId {
    /// Creates a new `MethodId` from a raw arena index.
    #[must_use]
    #[inline]
    pub const fn new(index: u32) -> Self {
        MethodId(index)
    }

    /// Returns the arena index of this method.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw identifier value.
    #[must_use]
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodId({})", self.0)
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

impl From<u32> for MethodId {
    fn from(value: u32) -> Self {
        MethodId(value)
    }
}
