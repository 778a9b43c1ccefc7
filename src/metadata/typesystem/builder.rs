//! Registration API used by loaders to populate a [`TypeHierarchy`].
//!
//! Loading class files or dex files is not part of this crate. Whatever does the loading
//! registers types, their links and their declared methods here, then calls
//! [`TypeHierarchyBuilder::build`], which validates the structural invariants and derives the
//! query indices. Links may be added in any order; forward references are resolved at build
//! time.
//!
//! # Validated invariants
//!
//! - qualified names are unique, signatures are unique per type
//! - superclasses are classes; interfaces have no superclass
//! - only interfaces appear in implements/extends lists
//! - the superclass relation and the interface relation are acyclic
//! - abstract methods are not static, private, native or constructors
//! - abstract methods only appear on abstract types

use std::collections::{BTreeSet, HashMap};

use crate::{
    metadata::{
        method::{Method, MethodModifiers},
        signature::MethodSignature,
        token::{MethodId, TypeId},
        typesystem::{TypeDef, TypeFlags, TypeHierarchy, TypeKind},
    },
    Error, Result,
};

/// Mutable builder for a [`TypeHierarchy`].
///
/// # Examples
///
/// ```rust
/// use callscope::metadata::{
///     method::MethodModifiers,
///     signature::MethodSignature,
///     typesystem::{TypeFlags, TypeHierarchyBuilder},
/// };
///
/// let mut builder = TypeHierarchyBuilder::new();
/// let printer = builder.add_interface("Printer")?;
/// let console = builder.add_class("Console", TypeFlags::empty())?;
/// builder.implements(console, printer)?;
///
/// let print = MethodSignature::new("print", "()V");
/// builder.add_method(printer, print.clone(), MethodModifiers::empty())?; // default method
/// let hierarchy = builder.build()?;
///
/// assert!(hierarchy.all_superinterfaces(console)?.contains(&printer));
/// # Ok::<(), callscope::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct TypeHierarchyBuilder {
    types: Vec<TypeDef>,
    methods: Vec<Method>,
    by_name: HashMap<String, TypeId>,
}

impl TypeHierarchyBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateType`] if the name is already registered.
    pub fn add_class(&mut self, name: impl Into<String>, flags: TypeFlags) -> Result<TypeId> {
        self.add_type(name.into(), TypeKind::Class, flags)
    }

    /// Registers an interface.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateType`] if the name is already registered.
    pub fn add_interface(&mut self, name: impl Into<String>) -> Result<TypeId> {
        self.add_type(name.into(), TypeKind::Interface, TypeFlags::ABSTRACT)
    }

    fn add_type(&mut self, name: String, kind: TypeKind, flags: TypeFlags) -> Result<TypeId> {
        if self.by_name.contains_key(&name) {
            return Err(Error::DuplicateType(name));
        }

        let id = TypeId::new(u32::try_from(self.types.len()).map_err(|_| {
            malformed_error!("Type arena exhausted while registering '{}'", name)
        })?);
        self.by_name.insert(name.clone(), id);
        self.types.push(TypeDef::new(id, name, kind, flags));
        Ok(id)
    }

    /// Declares `supertype` as the parent of `ty`.
    ///
    /// For a class this sets the superclass (replacing none, a second distinct superclass is an
    /// error). For an interface this adds an extended interface.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] for unregistered types, or [`Error::Malformed`] if a class
    /// already has a different superclass.
    pub fn extends(&mut self, ty: TypeId, supertype: TypeId) -> Result<()> {
        self.check_type(supertype)?;
        let def = self.type_mut(ty)?;
        match def.kind {
            TypeKind::Interface => {
                if !def.interfaces.contains(&supertype) {
                    def.interfaces.push(supertype);
                }
            }
            TypeKind::Class => match def.superclass {
                Some(existing) if existing != supertype => {
                    return Err(malformed_error!(
                        "Class '{}' already extends {}",
                        def.name,
                        existing
                    ));
                }
                _ => def.superclass = Some(supertype),
            },
        }
        Ok(())
    }

    /// Declares that class `ty` implements `interface`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] for unregistered types.
    pub fn implements(&mut self, ty: TypeId, interface: TypeId) -> Result<()> {
        self.check_type(interface)?;
        let def = self.type_mut(ty)?;
        if !def.interfaces.contains(&interface) {
            def.interfaces.push(interface);
        }
        Ok(())
    }

    /// Declares a method on `owner`.
    ///
    /// Interface methods without [`MethodModifiers::ABSTRACT`] are default methods.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] if `owner` is not registered, [`Error::DuplicateMethod`]
    /// if the signature is already declared on `owner`, or [`Error::Malformed`] for an invalid
    /// modifier combination.
    pub fn add_method(
        &mut self,
        owner: TypeId,
        signature: MethodSignature,
        modifiers: MethodModifiers,
    ) -> Result<MethodId> {
        Self::check_modifiers(&signature, modifiers)?;

        let id = MethodId::new(u32::try_from(self.methods.len()).map_err(|_| {
            malformed_error!("Method arena exhausted while registering '{}'", signature)
        })?);

        let def = self.type_mut(owner)?;
        if !def.declare(signature.clone(), id) {
            return Err(Error::DuplicateMethod {
                owner: def.name.clone(),
                signature: signature.to_string(),
            });
        }

        self.methods.push(Method {
            id,
            owner,
            signature,
            modifiers,
        });
        Ok(id)
    }

    fn check_modifiers(signature: &MethodSignature, modifiers: MethodModifiers) -> Result<()> {
        if modifiers.contains(MethodModifiers::ABSTRACT)
            && modifiers.intersects(
                MethodModifiers::STATIC
                    | MethodModifiers::PRIVATE
                    | MethodModifiers::NATIVE
                    | MethodModifiers::CONSTRUCTOR
                    | MethodModifiers::FINAL,
            )
        {
            return Err(malformed_error!(
                "Abstract method '{}' has incompatible modifiers {:?}",
                signature,
                modifiers
            ));
        }
        if modifiers.contains(MethodModifiers::CONSTRUCTOR)
            && modifiers.contains(MethodModifiers::STATIC)
        {
            return Err(malformed_error!(
                "Constructor '{}' cannot be static",
                signature
            ));
        }
        Ok(())
    }

    fn check_type(&self, ty: TypeId) -> Result<()> {
        if ty.index() < self.types.len() {
            Ok(())
        } else {
            Err(Error::UnknownType(ty))
        }
    }

    fn type_mut(&mut self, ty: TypeId) -> Result<&mut TypeDef> {
        self.types.get_mut(ty.index()).ok_or(Error::UnknownType(ty))
    }

    /// Validates the registered structure and freezes it into a [`TypeHierarchy`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::HierarchyCycle`] for a cyclic superclass chain or interface graph, and
    /// [`Error::Malformed`] for kind mismatches or abstract methods on concrete classes.
    pub fn build(self) -> Result<TypeHierarchy> {
        self.validate_links()?;
        self.validate_methods()?;
        self.check_superclass_cycles()?;
        let topo = self.interface_order()?;

        let interface_closure = self.interface_closure(&topo);

        let mut direct_subtypes = vec![Vec::new(); self.types.len()];
        for def in &self.types {
            if let Some(parent) = def.superclass {
                direct_subtypes[parent.index()].push(def.id);
            }
            for iface in &def.interfaces {
                direct_subtypes[iface.index()].push(def.id);
            }
        }

        Ok(TypeHierarchy::from_parts(
            self.types,
            self.methods,
            self.by_name,
            interface_closure,
            direct_subtypes,
        ))
    }

    fn validate_links(&self) -> Result<()> {
        for def in &self.types {
            if let Some(parent) = def.superclass {
                if def.is_interface() {
                    return Err(malformed_error!(
                        "Interface '{}' cannot have a superclass",
                        def.name
                    ));
                }
                if self.types[parent.index()].is_interface() {
                    return Err(malformed_error!(
                        "Class '{}' extends interface '{}'",
                        def.name,
                        self.types[parent.index()].name
                    ));
                }
            }
            for iface in &def.interfaces {
                if !self.types[iface.index()].is_interface() {
                    return Err(malformed_error!(
                        "Type '{}' implements class '{}'",
                        def.name,
                        self.types[iface.index()].name
                    ));
                }
            }
        }
        Ok(())
    }

    fn validate_methods(&self) -> Result<()> {
        for method in &self.methods {
            let owner = &self.types[method.owner.index()];
            if method.is_abstract() && !owner.is_abstract() {
                return Err(malformed_error!(
                    "Concrete class '{}' declares abstract method '{}'",
                    owner.name,
                    method.signature
                ));
            }
        }
        Ok(())
    }

    fn check_superclass_cycles(&self) -> Result<()> {
        let count = self.types.len();
        for def in &self.types {
            let mut steps = 0;
            let mut current = def.superclass;
            while let Some(parent) = current {
                steps += 1;
                if parent == def.id || steps > count {
                    return Err(Error::HierarchyCycle(def.name.clone()));
                }
                current = self.types[parent.index()].superclass;
            }
        }
        Ok(())
    }

    /// Orders all types so that every type comes after the interfaces it implements and after
    /// its superclass. Fails on interface cycles.
    fn interface_order(&self) -> Result<Vec<TypeId>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.types.len()];
        let mut order = Vec::with_capacity(self.types.len());

        for root in &self.types {
            if marks[root.id.index()] != Mark::Unvisited {
                continue;
            }

            // (type, next parent index to explore)
            let mut stack: Vec<(TypeId, usize)> = vec![(root.id, 0)];
            marks[root.id.index()] = Mark::InProgress;

            while let Some(&(current, cursor)) = stack.last() {
                let def = &self.types[current.index()];
                let parent = def
                    .superclass
                    .iter()
                    .chain(&def.interfaces)
                    .nth(cursor)
                    .copied();

                if let Some(parent) = parent {
                    if let Some(top) = stack.last_mut() {
                        top.1 += 1;
                    }
                    match marks[parent.index()] {
                        Mark::Unvisited => {
                            marks[parent.index()] = Mark::InProgress;
                            stack.push((parent, 0));
                        }
                        Mark::InProgress => {
                            return Err(Error::HierarchyCycle(
                                self.types[parent.index()].name.clone(),
                            ));
                        }
                        Mark::Done => {}
                    }
                } else {
                    marks[current.index()] = Mark::Done;
                    order.push(current);
                    stack.pop();
                }
            }
        }

        Ok(order)
    }

    fn interface_closure(&self, order: &[TypeId]) -> Vec<BTreeSet<TypeId>> {
        let mut closure: Vec<BTreeSet<TypeId>> = vec![BTreeSet::new(); self.types.len()];

        // Parents precede children in `order`, so their closures are final when read.
        for &ty in order {
            let def = &self.types[ty.index()];
            let mut set = BTreeSet::new();
            if let Some(parent) = def.superclass {
                set.extend(closure[parent.index()].iter().copied());
            }
            for &iface in &def.interfaces {
                set.insert(iface);
                set.extend(closure[iface.index()].iter().copied());
            }
            closure[ty.index()] = set;
        }

        closure
    }
}
