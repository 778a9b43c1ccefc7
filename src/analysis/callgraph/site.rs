//! Call site representation and dispatch kinds.
//!
//! This module defines the types used to represent individual invocation statements within a
//! lifted method body and to refer to them from call graph edges and diagnostics.

use std::fmt;

use strum::{Display, EnumCount, EnumIter};

use crate::metadata::{
    signature::MethodSignature,
    token::{MethodId, TypeId},
};

/// Statically declared invocation mode of a call site.
///
/// The dispatch kind decides how [`MethodResolver`](crate::analysis::MethodResolver) proceeds:
/// virtual and interface calls fan out over every possible receiver type, special and static
/// calls resolve to exactly one declaration of the named type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, EnumCount)]
pub enum DispatchKind {
    /// Virtual call on a class-typed receiver (`invokevirtual`).
    #[strum(serialize = "virtual")]
    Virtual,
    /// Call on an interface-typed receiver (`invokeinterface`).
    #[strum(serialize = "interface")]
    Interface,
    /// Non-virtual call to a named declaration: constructors, private methods, explicit
    /// `super` and `Interface.super` calls (`invokespecial`).
    #[strum(serialize = "special")]
    Special,
    /// Static call (`invokestatic`).
    #[strum(serialize = "static")]
    Static,
}

impl DispatchKind {
    /// Returns `true` if this kind selects its target from the runtime receiver type.
    ///
    /// # Returns
    ///
    /// `true` for `Virtual` and `Interface`, `false` otherwise.
    #[must_use]
    pub const fn is_virtual(&self) -> bool {
        matches!(self, Self::Virtual | Self::Interface)
    }

    /// Returns `true` if this kind resolves to exactly one statically known declaration.
    #[must_use]
    pub const fn is_exact(&self) -> bool {
        !self.is_virtual()
    }
}

/// An invocation statement inside a lifted method body.
///
/// Carries exactly what the lifter knows statically: where the call is, how it dispatches,
/// which type and signature it names, and optionally which receiver types are possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSite {
    /// Offset of the invocation within the body, unique per body.
    pub offset: u32,
    /// Declared dispatch kind.
    pub kind: DispatchKind,
    /// The type named at the call site (not necessarily the runtime receiver type).
    pub declared_type: TypeId,
    /// The signature named at the call site.
    pub signature: MethodSignature,
    /// Receiver types the lifter proved possible, if it narrowed them at all.
    pub receiver_types: Option<Vec<TypeId>>,
}

impl InvocationSite {
    /// Creates a new call site without a receiver type hint.
    ///
    /// # Arguments
    ///
    /// * `offset` - The offset of the invocation within the method body
    /// * `kind` - How the call dispatches
    /// * `declared_type` - The type named at the call site
    /// * `signature` - The signature named at the call site
    #[must_use]
    pub fn new(
        offset: u32,
        kind: DispatchKind,
        declared_type: TypeId,
        signature: MethodSignature,
    ) -> Self {
        Self {
            offset,
            kind,
            declared_type,
            signature,
            receiver_types: None,
        }
    }

    /// Narrows the possible receiver types of a virtual or interface call.
    #[must_use]
    pub fn with_receiver_types(mut self, receivers: Vec<TypeId>) -> Self {
        self.receiver_types = Some(receivers);
        self
    }

    /// Returns `true` if the call may have several runtime targets.
    #[must_use]
    pub const fn is_virtual(&self) -> bool {
        self.kind.is_virtual()
    }
}

/// Reference to a call site: the enclosing method and the site's offset in its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallSiteRef {
    /// The method containing the call.
    pub caller: MethodId,
    /// Offset of the call within the caller's body.
    pub offset: u32,
}

impl CallSiteRef {
    /// Creates a new call site reference.
    #[must_use]
    pub const fn new(caller: MethodId, offset: u32) -> Self {
        Self { caller, offset }
    }
}

impl fmt::Display for CallSiteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:04x}", self.caller, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use strum::{EnumCount, IntoEnumIterator};

    use crate::{
        analysis::callgraph::{CallSiteRef, DispatchKind, InvocationSite},
        metadata::{
            signature::MethodSignature,
            token::{MethodId, TypeId},
        },
    };

    #[test]
    fn test_dispatch_kind_properties() {
        assert!(DispatchKind::Virtual.is_virtual());
        assert!(DispatchKind::Interface.is_virtual());
        assert!(!DispatchKind::Special.is_virtual());
        assert!(!DispatchKind::Static.is_virtual());

        assert!(DispatchKind::Special.is_exact());
        assert!(DispatchKind::Static.is_exact());

        assert_eq!(DispatchKind::COUNT, 4);
        let names: Vec<String> = DispatchKind::iter().map(|k| k.to_string()).collect();
        assert_eq!(names, ["virtual", "interface", "special", "static"]);
    }

    #[test]
    fn test_invocation_site_hint() {
        let site = InvocationSite::new(
            8,
            DispatchKind::Interface,
            TypeId::new(1),
            MethodSignature::new("print", "()V"),
        );
        assert!(site.is_virtual());
        assert!(site.receiver_types.is_none());

        let site = site.with_receiver_types(vec![TypeId::new(2)]);
        assert_eq!(site.receiver_types, Some(vec![TypeId::new(2)]));
    }

    #[test]
    fn test_call_site_ref_display() {
        let site = CallSiteRef::new(MethodId::new(3), 0x1a);
        assert_eq!(site.to_string(), "m3@001a");
    }
}
