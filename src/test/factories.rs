//! Hierarchy factories reused across unit tests.

use crate::metadata::{
    method::MethodModifiers,
    signature::MethodSignature,
    token::{MethodId, TypeId},
    typesystem::{TypeFlags, TypeHierarchy, TypeHierarchyBuilder},
};

/// The `print()V` signature most fixtures revolve around.
pub(crate) fn print_sig() -> MethodSignature {
    MethodSignature::new("print", "()V")
}

/// Identifiers of the diamond fixture.
pub(crate) struct DiamondFixture {
    pub hierarchy: TypeHierarchy,
    pub object: TypeId,
    pub top: TypeId,
    pub left: TypeId,
    pub right: TypeId,
    pub base: TypeId,
    pub sub: TypeId,
    pub object_ctor: MethodId,
    pub base_ctor: MethodId,
    pub top_print: MethodId,
    pub left_print: MethodId,
    pub right_print: MethodId,
}

/// Interface diamond with a default on every interface.
///
/// ```text
///            Top.print
///           /         \
///     Left.print   Right.print
///         |             |
/// Object  |             |
///    \    |             |
///     Base (implements Left)
///       \               |
///        Sub (implements Right)
/// ```
///
/// `Base` resolves `print` to `Left`'s default; `Sub` sees both `Left` and `Right` and is
/// ambiguous.
pub(crate) fn diamond_hierarchy() -> DiamondFixture {
    let mut b = TypeHierarchyBuilder::new();
    let object = b.add_class("java.lang.Object", TypeFlags::empty()).unwrap();
    let top = b.add_interface("Top").unwrap();
    let left = b.add_interface("Left").unwrap();
    let right = b.add_interface("Right").unwrap();
    let base = b.add_class("Base", TypeFlags::empty()).unwrap();
    let sub = b.add_class("Sub", TypeFlags::empty()).unwrap();

    b.extends(left, top).unwrap();
    b.extends(right, top).unwrap();
    b.extends(base, object).unwrap();
    b.implements(base, left).unwrap();
    b.extends(sub, base).unwrap();
    b.implements(sub, right).unwrap();

    let ctor = MethodModifiers::CONSTRUCTOR;
    let object_ctor = b.add_method(object, MethodSignature::constructor(), ctor).unwrap();
    let base_ctor = b.add_method(base, MethodSignature::constructor(), ctor).unwrap();
    let top_print = b.add_method(top, print_sig(), MethodModifiers::empty()).unwrap();
    let left_print = b.add_method(left, print_sig(), MethodModifiers::empty()).unwrap();
    let right_print = b.add_method(right, print_sig(), MethodModifiers::empty()).unwrap();

    DiamondFixture {
        hierarchy: b.build().unwrap(),
        object,
        top,
        left,
        right,
        base,
        sub,
        object_ctor,
        base_ctor,
        top_print,
        left_print,
        right_print,
    }
}
