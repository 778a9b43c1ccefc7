//! Method declarations and lifted method bodies.
//!
//! A [`Method`] is a declaration owned by exactly one type of the hierarchy: its signature plus
//! the modifiers that drive resolution (abstract methods never win dispatch, static methods never
//! override, private methods are not virtually selected). The executable part of a method lives
//! separately in a [`MethodBody`], which is produced lazily by a [`BodyProvider`] only when the
//! call graph builder reaches the method.

mod body;

pub use body::{BodyProvider, MethodBody};

use bitflags::bitflags;

use crate::metadata::{
    signature::MethodSignature,
    token::{MethodId, TypeId},
};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Method modifiers relevant to resolution
    pub struct MethodModifiers: u32 {
        /// Method does not provide an implementation
        const ABSTRACT = 0x0001;
        /// Defined on type, else per instance
        const STATIC = 0x0002;
        /// Method is only accessible from its owner and is never selected virtually
        const PRIVATE = 0x0004;
        /// Instance constructor
        const CONSTRUCTOR = 0x0008;
        /// Implementation lives outside the analyzed bytecode
        const NATIVE = 0x0010;
        /// Method cannot be overridden
        const FINAL = 0x0020;
    }
}

/// A method declared on a class or interface.
///
/// Methods are created by [`TypeHierarchyBuilder::add_method`](crate::metadata::typesystem::TypeHierarchyBuilder::add_method)
/// and owned by the hierarchy's method arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    /// Arena identifier of this method
    pub id: MethodId,
    /// The declaring type
    pub owner: TypeId,
    /// Owner-independent name and descriptor
    pub signature: MethodSignature,
    /// Declared modifiers
    pub modifiers: MethodModifiers,
}

impl Method {
    /// Returns `true` if the method has no implementation.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(MethodModifiers::ABSTRACT)
    }

    /// Returns `true` for static methods.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(MethodModifiers::STATIC)
    }

    /// Returns `true` for private methods.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.modifiers.contains(MethodModifiers::PRIVATE)
    }

    /// Returns `true` for instance constructors.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.modifiers.contains(MethodModifiers::CONSTRUCTOR)
    }

    /// Returns `true` for methods implemented in native code.
    #[must_use]
    pub fn is_native(&self) -> bool {
        self.modifiers.contains(MethodModifiers::NATIVE)
    }

    /// Returns `true` if the method is not abstract.
    #[must_use]
    pub fn is_concrete(&self) -> bool {
        !self.is_abstract()
    }

    /// Returns `true` if a body can be lifted for this method.
    ///
    /// Abstract methods have nothing to lift, native methods have nothing in the analyzed
    /// bytecode.
    #[must_use]
    pub fn has_body(&self) -> bool {
        !self.is_abstract() && !self.is_native()
    }

    /// Returns `true` if virtual or interface dispatch may select this method.
    ///
    /// That is any concrete instance method which is neither private nor a constructor.
    #[must_use]
    pub fn is_dispatch_target(&self) -> bool {
        self.is_concrete() && !self.is_static() && !self.is_private() && !self.is_constructor()
    }
}
