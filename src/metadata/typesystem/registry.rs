//! The immutable class/interface hierarchy queried during call graph construction.
//!
//! [`TypeHierarchy`] owns two arenas - types and methods - and a handful of indices derived once
//! at build time: the qualified-name index, the reverse (subtype) edges and the transitive
//! interface closure of every type. After [`TypeHierarchyBuilder::build`](crate::metadata::typesystem::TypeHierarchyBuilder::build)
//! returns, nothing mutates it, so it can be shared by reference across worker threads for the
//! whole analysis run.
//!
//! # Queries
//!
//! - [`TypeHierarchy::superclass_chain`] - lazy walk from a type to its root
//! - [`TypeHierarchy::all_superinterfaces`] - full deduplicated interface closure
//! - [`TypeHierarchy::declared_method`] - own declarations only
//! - [`TypeHierarchy::subtypes`] / [`TypeHierarchy::instantiable_subtypes`] - CHA receiver sets
//!
//! Every query on an identifier that was never registered fails with
//! [`Error::UnknownType`](crate::Error::UnknownType) or
//! [`Error::UnknownMethod`](crate::Error::UnknownMethod).

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::{
    metadata::{
        method::Method,
        signature::MethodSignature,
        token::{MethodId, TypeId},
        typesystem::TypeDef,
    },
    Error, Result,
};

/// Immutable registry of all types and methods of the analyzed program.
#[derive(Debug)]
pub struct TypeHierarchy {
    types: Vec<TypeDef>,
    methods: Vec<Method>,
    by_name: HashMap<String, TypeId>,
    /// Transitive interface closure per type (through own interfaces and the superclass chain).
    interface_closure: Vec<BTreeSet<TypeId>>,
    /// Direct subtypes per type, via superclass and interface edges.
    direct_subtypes: Vec<Vec<TypeId>>,
}

impl TypeHierarchy {
    pub(crate) fn from_parts(
        types: Vec<TypeDef>,
        methods: Vec<Method>,
        by_name: HashMap<String, TypeId>,
        interface_closure: Vec<BTreeSet<TypeId>>,
        direct_subtypes: Vec<Vec<TypeId>>,
    ) -> Self {
        Self {
            types,
            methods,
            by_name,
            interface_closure,
            direct_subtypes,
        }
    }

    /// Returns the definition of a type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] if `id` is not registered.
    pub fn type_def(&self, id: TypeId) -> Result<&TypeDef> {
        self.types.get(id.index()).ok_or(Error::UnknownType(id))
    }

    /// Returns a method declaration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMethod`] if `id` is not registered.
    pub fn method(&self, id: MethodId) -> Result<&Method> {
        self.methods.get(id.index()).ok_or(Error::UnknownMethod(id))
    }

    /// Looks up a type by its qualified name.
    #[must_use]
    pub fn type_by_name(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Looks up a method declared on `owner` by name and descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] if `owner` is not registered.
    pub fn method_by_name(
        &self,
        owner: TypeId,
        name: &str,
        descriptor: &str,
    ) -> Result<Option<MethodId>> {
        self.declared_method(owner, &MethodSignature::new(name, descriptor))
    }

    /// Returns a lazy iterator from `ty` up to its root, starting with `ty` itself.
    ///
    /// The iterator is finite (the superclass relation is acyclic) and restartable by cloning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] if `ty` is not registered.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use callscope::metadata::typesystem::{TypeFlags, TypeHierarchyBuilder};
    ///
    /// let mut builder = TypeHierarchyBuilder::new();
    /// let object = builder.add_class("Object", TypeFlags::empty())?;
    /// let base = builder.add_class("Base", TypeFlags::empty())?;
    /// let derived = builder.add_class("Derived", TypeFlags::empty())?;
    /// builder.extends(base, object)?;
    /// builder.extends(derived, base)?;
    /// let hierarchy = builder.build()?;
    ///
    /// let chain: Vec<_> = hierarchy
    ///     .superclass_chain(derived)?
    ///     .map(|t| t.name.as_str())
    ///     .collect();
    /// assert_eq!(chain, ["Derived", "Base", "Object"]);
    /// # Ok::<(), callscope::Error>(())
    /// ```
    pub fn superclass_chain(&self, ty: TypeId) -> Result<SuperclassChain<'_>> {
        self.type_def(ty)?;
        Ok(SuperclassChain {
            hierarchy: self,
            next: Some(ty),
        })
    }

    /// Returns every interface reachable from `ty` through its own interfaces and the interfaces
    /// of its superclass chain, transitively and deduplicated.
    ///
    /// For an interface this is the set of its (strict) super-interfaces.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] if `ty` is not registered.
    pub fn all_superinterfaces(&self, ty: TypeId) -> Result<&BTreeSet<TypeId>> {
        self.interface_closure
            .get(ty.index())
            .ok_or(Error::UnknownType(ty))
    }

    /// Returns the method declared directly on `ty` with `signature`, ignoring inherited ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] if `ty` is not registered.
    pub fn declared_method(
        &self,
        ty: TypeId,
        signature: &MethodSignature,
    ) -> Result<Option<MethodId>> {
        Ok(self.type_def(ty)?.declared(signature))
    }

    /// Returns `true` if `sub` is `sup` or inherits from it through any path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] if either type is not registered.
    pub fn is_subtype_of(&self, sub: TypeId, sup: TypeId) -> Result<bool> {
        self.type_def(sup)?;
        if sub == sup || self.all_superinterfaces(sub)?.contains(&sup) {
            return Ok(true);
        }
        Ok(self.superclass_chain(sub)?.any(|t| t.id == sup))
    }

    /// Returns `true` if interface `sub` extends interface `sup`, directly or transitively.
    ///
    /// The relation is strict: an interface is never its own strict sub-interface.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] if either type is not registered.
    pub fn is_strict_subinterface(&self, sub: TypeId, sup: TypeId) -> Result<bool> {
        self.type_def(sup)?;
        Ok(sub != sup && self.all_superinterfaces(sub)?.contains(&sup))
    }

    /// Returns `ty` and all of its transitive subtypes, sorted by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] if `ty` is not registered.
    pub fn subtypes(&self, ty: TypeId) -> Result<Vec<TypeId>> {
        self.type_def(ty)?;

        let mut seen = BTreeSet::new();
        let mut worklist = VecDeque::from([ty]);
        while let Some(current) = worklist.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(children) = self.direct_subtypes.get(current.index()) {
                worklist.extend(children.iter().copied());
            }
        }

        Ok(seen.into_iter().collect())
    }

    /// Returns the concrete classes among [`subtypes`](Self::subtypes), sorted by identifier.
    ///
    /// These are the possible runtime types of a receiver statically typed as `ty` under
    /// class-hierarchy analysis.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] if `ty` is not registered.
    pub fn instantiable_subtypes(&self, ty: TypeId) -> Result<Vec<TypeId>> {
        Ok(self
            .subtypes(ty)?
            .into_iter()
            .filter(|id| self.types[id.index()].is_instantiable())
            .collect())
    }

    /// Renders a method as `Owner::name(descriptor)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMethod`] if `id` is not registered.
    pub fn qualified_name(&self, id: MethodId) -> Result<String> {
        let method = self.method(id)?;
        let owner = self.type_def(method.owner)?;
        Ok(format!("{}::{}", owner.name, method.signature))
    }

    /// Returns an iterator over all types in registration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.iter()
    }

    /// Returns an iterator over all methods in registration order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter()
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Returns the number of registered methods.
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }
}

/// Lazy walk up the superclass chain of a type, innermost first.
///
/// Created by [`TypeHierarchy::superclass_chain`].
#[derive(Debug, Clone)]
pub struct SuperclassChain<'a> {
    hierarchy: &'a TypeHierarchy,
    next: Option<TypeId>,
}

impl<'a> Iterator for SuperclassChain<'a> {
    type Item = &'a TypeDef;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.hierarchy.types.get(self.next?.index())?;
        self.next = current.superclass;
        Some(current)
    }
}
