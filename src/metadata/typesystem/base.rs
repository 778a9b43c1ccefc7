//! Core type definitions of the class/interface hierarchy.

use std::collections::HashMap;

use bitflags::bitflags;
use strum::{Display, EnumIter};

use crate::metadata::{
    signature::MethodSignature,
    token::{MethodId, TypeId},
};

/// Whether a type is a class or an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum TypeKind {
    /// A class: single superclass, may implement interfaces, may be instantiated
    #[strum(serialize = "class")]
    Class,
    /// An interface: no superclass, extends other interfaces, never instantiated
    #[strum(serialize = "interface")]
    Interface,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Type level flags
    pub struct TypeFlags: u32 {
        /// Type cannot be instantiated
        const ABSTRACT = 0x0001;
        /// Type cannot be subclassed
        const FINAL = 0x0002;
    }
}

/// A class or interface registered in the hierarchy.
///
/// Holds the type's own structure only: its direct superclass, its directly implemented (or, for
/// interfaces, extended) interfaces and its own method declarations. Inherited members are never
/// copied in; resolution walks the hierarchy instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    /// Arena identifier of this type
    pub id: TypeId,
    /// Fully qualified name, unique within the hierarchy
    pub name: String,
    /// Class or interface
    pub kind: TypeKind,
    /// Type flags
    pub flags: TypeFlags,
    /// Direct superclass, absent for roots and for interfaces
    pub superclass: Option<TypeId>,
    /// Directly implemented or extended interfaces, in declaration order
    pub interfaces: Vec<TypeId>,
    methods: Vec<MethodId>,
    method_index: HashMap<MethodSignature, MethodId>,
}

impl TypeDef {
    pub(crate) fn new(id: TypeId, name: String, kind: TypeKind, flags: TypeFlags) -> Self {
        let flags = match kind {
            TypeKind::Interface => flags | TypeFlags::ABSTRACT,
            TypeKind::Class => flags,
        };

        Self {
            id,
            name,
            kind,
            flags,
            superclass: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            method_index: HashMap::new(),
        }
    }

    /// Registers a declared method. Returns `false` if the signature is already declared.
    pub(crate) fn declare(&mut self, signature: MethodSignature, method: MethodId) -> bool {
        if self.method_index.contains_key(&signature) {
            return false;
        }
        self.method_index.insert(signature, method);
        self.methods.push(method);
        true
    }

    /// Returns `true` for interfaces.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Returns `true` for classes.
    #[must_use]
    pub fn is_class(&self) -> bool {
        self.kind == TypeKind::Class
    }

    /// Returns `true` if the type cannot be instantiated.
    ///
    /// Interfaces are always abstract.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.flags.contains(TypeFlags::ABSTRACT)
    }

    /// Returns `true` for classes that can have instances of exactly this type.
    #[must_use]
    pub fn is_instantiable(&self) -> bool {
        self.is_class() && !self.is_abstract()
    }

    /// Returns the declared methods in declaration order.
    #[must_use]
    pub fn methods(&self) -> &[MethodId] {
        &self.methods
    }

    /// Returns the method declared on this type with the given signature.
    #[must_use]
    pub fn declared(&self, signature: &MethodSignature) -> Option<MethodId> {
        self.method_index.get(signature).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interfaces_are_abstract() {
        let iface = TypeDef::new(
            TypeId::new(0),
            "I".to_string(),
            TypeKind::Interface,
            TypeFlags::empty(),
        );
        assert!(iface.is_interface());
        assert!(iface.is_abstract());
        assert!(!iface.is_instantiable());
    }

    #[test]
    fn test_declare_rejects_duplicates() {
        let mut class = TypeDef::new(
            TypeId::new(0),
            "C".to_string(),
            TypeKind::Class,
            TypeFlags::empty(),
        );
        let sig = MethodSignature::new("print", "()V");

        assert!(class.declare(sig.clone(), MethodId::new(0)));
        assert!(!class.declare(sig.clone(), MethodId::new(1)));
        assert_eq!(class.declared(&sig), Some(MethodId::new(0)));
        assert_eq!(class.methods(), &[MethodId::new(0)]);
        assert!(class.is_instantiable());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(TypeKind::Class.to_string(), "class");
        assert_eq!(TypeKind::Interface.to_string(), "interface");
    }
}
