//! Call target resolution and Class Hierarchy Analysis (CHA).
//!
//! This module provides resolution of call targets for the call graph:
//! - Exact resolution of special (constructor, private, explicit super) and static calls
//! - Per-receiver-type dispatch following platform method selection rules
//! - Virtual and interface fan-out over every possible receiver type (CHA)
//!
//! # Dispatch for one receiver type
//!
//! For a runtime type `T` and a signature `S`:
//!
//! 1. **Class precedence.** Walk the superclass chain of `T`, innermost first. The first class
//!    declaring `S` as a concrete instance method is the target; it beats any interface default
//!    no matter how close the default is.
//! 2. **Interface defaults.** Otherwise collect every interface in the interface closure of `T`
//!    that declares `S` as a default method. A candidate is dropped when another candidate is a
//!    strict sub-interface of it (shadowing), or when an interface of the closure re-declares `S`
//!    as abstract and is a strict sub-interface of it (revocation).
//! 3. One survivor is the target. None means the type has no implementation
//!    ([`DiagnosticKind::UnresolvedTarget`]); several unrelated survivors are reported as
//!    [`DiagnosticKind::AmbiguousTarget`], never guessed.
//!
//! The outcome is a pure function of the immutable hierarchy, so it is memoized per
//! `(type, signature)` pair in a concurrent map and the resolver can be shared across threads.

use std::{
    collections::HashSet,
    sync::atomic::{AtomicUsize, Ordering},
};

use dashmap::DashMap;
use strum::{EnumCount, IntoEnumIterator};

use crate::{
    analysis::callgraph::{Diagnostic, DiagnosticKind, DispatchKind, InvocationSite},
    metadata::{
        signature::MethodSignature,
        token::{MethodId, TypeId},
        typesystem::TypeHierarchy,
    },
    Result,
};

/// Outcome of dispatching a signature on one concrete receiver type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Exactly one method is selected.
    Resolved(MethodId),
    /// Neither the class chain nor any surviving interface default implements the signature.
    Unresolved,
    /// Several interface defaults survive with no shadowing relation between them.
    Ambiguous(Vec<MethodId>),
}

/// Resolved targets of one call site plus the failures recorded along the way.
///
/// A virtual call can both resolve for some receiver types and fail for others; the targets of
/// the successful receivers are kept, each failed receiver contributes one diagnostic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Deduplicated targets, in receiver order.
    pub targets: Vec<MethodId>,
    /// Failures, without call site attribution.
    pub failures: Vec<Diagnostic>,
}

impl Resolution {
    /// Returns `true` if at least one target was found.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !self.targets.is_empty()
    }

    /// Returns `true` if the call site has more than one possible target.
    #[must_use]
    pub fn is_polymorphic(&self) -> bool {
        self.targets.len() > 1
    }

    fn push_target(&mut self, seen: &mut HashSet<MethodId>, target: MethodId) {
        if seen.insert(target) {
            self.targets.push(target);
        }
    }
}

/// Resolves call targets against a [`TypeHierarchy`].
///
/// The resolver borrows the hierarchy for the lifetime of an analysis run and caches per
/// receiver-type dispatch outcomes. All methods take `&self`; the cache is a concurrent map.
///
/// # Examples
///
/// ```rust
/// use callscope::{
///     analysis::{DispatchKind, MethodResolver},
///     metadata::{method::MethodModifiers, signature::MethodSignature, typesystem::{TypeFlags, TypeHierarchyBuilder}},
/// };
///
/// let print = MethodSignature::new("print", "()V");
/// let mut builder = TypeHierarchyBuilder::new();
/// let greeter = builder.add_interface("Greeter")?;
/// let hello = builder.add_class("Hello", TypeFlags::empty())?;
/// builder.implements(hello, greeter)?;
/// let default_print = builder.add_method(greeter, print.clone(), MethodModifiers::empty())?;
/// let own_print = builder.add_method(hello, print.clone(), MethodModifiers::empty())?;
/// let hierarchy = builder.build()?;
///
/// let resolver = MethodResolver::new(&hierarchy);
/// let resolution = resolver.resolve(DispatchKind::Interface, greeter, &print, None, None)?;
/// assert_eq!(resolution.targets, vec![own_print]);
/// assert!(!resolution.targets.contains(&default_print));
/// # Ok::<(), callscope::Error>(())
/// ```
#[derive(Debug)]
pub struct MethodResolver<'h> {
    hierarchy: &'h TypeHierarchy,
    cache: DashMap<(TypeId, MethodSignature), DispatchOutcome>,
    memoize: bool,
    dispatch_queries: AtomicUsize,
    cache_hits: AtomicUsize,
    exact_resolutions: AtomicUsize,
    by_kind: [AtomicUsize; DispatchKind::COUNT],
}

impl<'h> MethodResolver<'h> {
    /// Creates a memoizing resolver over `hierarchy`.
    #[must_use]
    pub fn new(hierarchy: &'h TypeHierarchy) -> Self {
        Self {
            hierarchy,
            cache: DashMap::new(),
            memoize: true,
            dispatch_queries: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
            exact_resolutions: AtomicUsize::new(0),
            by_kind: std::array::from_fn(|_| AtomicUsize::new(0)),
        }
    }

    /// Enables or disables the per `(type, signature)` cache.
    #[must_use]
    pub fn with_memoization(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    /// Returns the hierarchy this resolver works on.
    #[must_use]
    pub fn hierarchy(&self) -> &'h TypeHierarchy {
        self.hierarchy
    }

    /// Resolves a call site.
    ///
    /// Convenience wrapper around [`resolve`](Self::resolve) using the site's declared type,
    /// signature, kind and receiver hint.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownType`] if the site names an unregistered type.
    pub fn resolve_site(
        &self,
        site: &InvocationSite,
        instantiated: Option<&HashSet<TypeId>>,
    ) -> Result<Resolution> {
        self.resolve(
            site.kind,
            site.declared_type,
            &site.signature,
            site.receiver_types.as_deref(),
            instantiated,
        )
    }

    /// Resolves a call of `signature` on `declared_type` with dispatch `kind`.
    ///
    /// # Arguments
    ///
    /// * `kind` - The dispatch kind of the call
    /// * `declared_type` - The type named at the call site
    /// * `signature` - The signature named at the call site
    /// * `receivers` - Receiver types proven possible by the lifter, if any
    /// * `instantiated` - Types known to be allocated by the program, if tracked
    ///
    /// # Returns
    ///
    /// The targets plus one diagnostic per failed receiver type (virtual/interface), or a single
    /// [`DiagnosticKind::MissingTarget`] diagnostic (special/static).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownType`] if `declared_type` or a receiver hint is not
    /// registered.
    pub fn resolve(
        &self,
        kind: DispatchKind,
        declared_type: TypeId,
        signature: &MethodSignature,
        receivers: Option<&[TypeId]>,
        instantiated: Option<&HashSet<TypeId>>,
    ) -> Result<Resolution> {
        self.by_kind[kind as usize].fetch_add(1, Ordering::Relaxed);

        let mut resolution = Resolution::default();
        let mut seen = HashSet::new();

        match kind {
            DispatchKind::Virtual | DispatchKind::Interface => {
                let receiver_types = self.receiver_types(declared_type, receivers, instantiated)?;
                if receiver_types.is_empty() {
                    resolution.failures.push(Diagnostic::new(
                        DiagnosticKind::UnresolvedTarget,
                        None,
                        signature.clone(),
                    ));
                }

                for receiver in receiver_types {
                    match self.dispatch(receiver, signature)? {
                        DispatchOutcome::Resolved(target) => {
                            resolution.push_target(&mut seen, target);
                        }
                        DispatchOutcome::Unresolved => resolution.failures.push(
                            Diagnostic::new(
                                DiagnosticKind::UnresolvedTarget,
                                None,
                                signature.clone(),
                            )
                            .with_receiver(receiver),
                        ),
                        DispatchOutcome::Ambiguous(candidates) => resolution.failures.push(
                            Diagnostic::new(
                                DiagnosticKind::AmbiguousTarget,
                                None,
                                signature.clone(),
                            )
                            .with_receiver(receiver)
                            .with_candidates(candidates),
                        ),
                    }
                }
            }
            DispatchKind::Special | DispatchKind::Static => {
                let target = if kind == DispatchKind::Special {
                    self.resolve_special(declared_type, signature)?
                } else {
                    self.resolve_static(declared_type, signature)?
                };

                match target {
                    Some(target) => resolution.push_target(&mut seen, target),
                    None => resolution.failures.push(Diagnostic::new(
                        DiagnosticKind::MissingTarget,
                        None,
                        signature.clone(),
                    )),
                }
            }
        }

        Ok(resolution)
    }

    /// Resolves a special call: the concrete method `named` itself declares with `signature`.
    ///
    /// No lookup through supertypes and no fan-out over subtypes takes place. An abstract
    /// declaration cannot be invoked non-virtually and is treated as missing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownType`] if `named` is not registered.
    pub fn resolve_special(
        &self,
        named: TypeId,
        signature: &MethodSignature,
    ) -> Result<Option<MethodId>> {
        self.exact_resolutions.fetch_add(1, Ordering::Relaxed);

        let Some(id) = self.hierarchy.declared_method(named, signature)? else {
            return Ok(None);
        };
        let method = self.hierarchy.method(id)?;
        Ok((method.is_concrete() && !method.is_static()).then_some(id))
    }

    /// Resolves a static call: the static method `named` declares with `signature`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownType`] if `named` is not registered.
    pub fn resolve_static(
        &self,
        named: TypeId,
        signature: &MethodSignature,
    ) -> Result<Option<MethodId>> {
        self.exact_resolutions.fetch_add(1, Ordering::Relaxed);

        let Some(id) = self.hierarchy.declared_method(named, signature)? else {
            return Ok(None);
        };
        Ok(self.hierarchy.method(id)?.is_static().then_some(id))
    }

    /// Computes the receiver types a virtual or interface call on `declared_type` fans out to.
    ///
    /// Starts from the instantiable subtypes of `declared_type` (plain CHA) and narrows them by
    /// the lifter's hint and by the set of instantiated types, when given. The result is sorted
    /// by type identifier.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownType`] if `declared_type` or a hinted type is not
    /// registered.
    pub fn receiver_types(
        &self,
        declared_type: TypeId,
        hint: Option<&[TypeId]>,
        instantiated: Option<&HashSet<TypeId>>,
    ) -> Result<Vec<TypeId>> {
        let mut candidates = self.hierarchy.instantiable_subtypes(declared_type)?;

        if let Some(hint) = hint {
            for &ty in hint {
                self.hierarchy.type_def(ty)?;
            }
            candidates.retain(|ty| hint.contains(ty));
        }
        if let Some(instantiated) = instantiated {
            candidates.retain(|ty| instantiated.contains(ty));
        }

        Ok(candidates)
    }

    /// Selects the method invoked for `signature` on an instance of exactly `receiver`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownType`] if `receiver` is not registered.
    pub fn dispatch(&self, receiver: TypeId, signature: &MethodSignature) -> Result<DispatchOutcome> {
        self.dispatch_queries.fetch_add(1, Ordering::Relaxed);

        if !self.memoize {
            return self.select(receiver, signature);
        }

        let key = (receiver, signature.clone());
        if let Some(cached) = self.cache.get(&key) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(cached.clone());
        }

        let outcome = self.select(receiver, signature)?;
        self.cache.insert(key, outcome.clone());
        Ok(outcome)
    }

    fn select(&self, receiver: TypeId, signature: &MethodSignature) -> Result<DispatchOutcome> {
        let hierarchy = self.hierarchy;

        // Class methods win over every interface default.
        for class in hierarchy.superclass_chain(receiver)? {
            if let Some(id) = class.declared(signature) {
                if hierarchy.method(id)?.is_dispatch_target() {
                    return Ok(DispatchOutcome::Resolved(id));
                }
            }
        }

        let mut defaults: Vec<(TypeId, MethodId)> = Vec::new();
        let mut abstract_redeclarations: Vec<TypeId> = Vec::new();
        for &iface in hierarchy.all_superinterfaces(receiver)? {
            let Some(id) = hierarchy.declared_method(iface, signature)? else {
                continue;
            };
            let method = hierarchy.method(id)?;
            if method.is_dispatch_target() {
                defaults.push((iface, id));
            } else if method.is_abstract() {
                abstract_redeclarations.push(iface);
            }
        }

        let mut survivors = Vec::with_capacity(defaults.len());
        'candidates: for &(iface, id) in &defaults {
            for &(other, _) in &defaults {
                if hierarchy.is_strict_subinterface(other, iface)? {
                    continue 'candidates;
                }
            }
            for &redeclaring in &abstract_redeclarations {
                if hierarchy.is_strict_subinterface(redeclaring, iface)? {
                    continue 'candidates;
                }
            }
            survivors.push(id);
        }

        Ok(match survivors.len() {
            0 => DispatchOutcome::Unresolved,
            1 => DispatchOutcome::Resolved(survivors[0]),
            _ => DispatchOutcome::Ambiguous(survivors),
        })
    }

    /// Drops all cached dispatch outcomes.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Returns statistics about the resolver state.
    ///
    /// # Returns
    ///
    /// A [`ResolverStats`] structure with query and cache counters.
    #[must_use]
    pub fn stats(&self) -> ResolverStats {
        // Hits are counted after their query; read them first and clamp against torn loads.
        let cache_hits = self.cache_hits.load(Ordering::Relaxed);
        let dispatch_queries = self.dispatch_queries.load(Ordering::Relaxed).max(cache_hits);
        let mut stats = ResolverStats {
            dispatch_queries,
            cache_hits,
            cached_pairs: self.cache.len(),
            exact_resolutions: self.exact_resolutions.load(Ordering::Relaxed),
            ..ResolverStats::default()
        };
        for (slot, counter) in stats.resolutions_by_kind.iter_mut().zip(&self.by_kind) {
            slot.1 = counter.load(Ordering::Relaxed);
        }
        stats
    }
}

/// Statistics about the method resolver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverStats {
    /// Number of per-receiver dispatch queries.
    pub dispatch_queries: usize,
    /// Number of dispatch queries answered from the cache.
    pub cache_hits: usize,
    /// Number of cached `(type, signature)` outcomes.
    pub cached_pairs: usize,
    /// Number of special and static resolutions.
    pub exact_resolutions: usize,
    /// Number of call resolutions per dispatch kind.
    pub resolutions_by_kind: [(DispatchKind, usize); DispatchKind::COUNT],
}

impl Default for ResolverStats {
    fn default() -> Self {
        let mut resolutions_by_kind = [(DispatchKind::Virtual, 0); DispatchKind::COUNT];
        for (slot, kind) in resolutions_by_kind.iter_mut().zip(DispatchKind::iter()) {
            slot.0 = kind;
        }
        Self {
            dispatch_queries: 0,
            cache_hits: 0,
            cached_pairs: 0,
            exact_resolutions: 0,
            resolutions_by_kind,
        }
    }
}

impl ResolverStats {
    /// Returns the number of dispatch queries that had to be computed.
    #[must_use]
    pub fn cache_misses(&self) -> usize {
        self.dispatch_queries.saturating_sub(self.cache_hits)
    }

    /// Returns the number of call resolutions of one dispatch kind.
    #[must_use]
    pub fn resolutions(&self, kind: DispatchKind) -> usize {
        self.resolutions_by_kind[kind as usize].1
    }

    /// Returns the cache hit rate as a percentage.
    ///
    /// # Returns
    ///
    /// The percentage of dispatch queries served from the cache (0.0 to 100.0). Returns 0.0 if
    /// no query was made.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        if self.dispatch_queries == 0 {
            0.0
        } else {
            (self.cache_hits.min(self.dispatch_queries) as f64 / self.dispatch_queries as f64)
                * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::{
        analysis::callgraph::{
            DiagnosticKind, DispatchKind, DispatchOutcome, MethodResolver, ResolverStats,
        },
        metadata::{
            method::MethodModifiers,
            signature::MethodSignature,
            token::TypeId,
            typesystem::{TypeFlags, TypeHierarchyBuilder},
        },
        test::factories::{diamond_hierarchy, print_sig},
        Error,
    };

    #[test]
    fn test_class_method_beats_default() {
        let mut b = TypeHierarchyBuilder::new();
        let hello = b.add_interface("HelloWorld").unwrap();
        let class = b.add_class("Main", TypeFlags::empty()).unwrap();
        b.implements(class, hello).unwrap();
        let default = b.add_method(hello, print_sig(), MethodModifiers::empty()).unwrap();
        let own = b.add_method(class, print_sig(), MethodModifiers::empty()).unwrap();
        let h = b.build().unwrap();

        let resolver = MethodResolver::new(&h);
        assert_eq!(
            resolver.dispatch(class, &print_sig()).unwrap(),
            DispatchOutcome::Resolved(own)
        );
        let r = resolver
            .resolve(DispatchKind::Virtual, class, &print_sig(), None, None)
            .unwrap();
        assert_eq!(r.targets, vec![own]);
        assert!(!r.targets.contains(&default));
        assert!(r.failures.is_empty());
    }

    #[test]
    fn test_superclass_method_beats_closer_default() {
        // Base declares print; Sub extends Base and implements an interface with a default.
        let mut b = TypeHierarchyBuilder::new();
        let base = b.add_class("Base", TypeFlags::empty()).unwrap();
        let iface = b.add_interface("Printer").unwrap();
        let sub = b.add_class("Sub", TypeFlags::empty()).unwrap();
        b.extends(sub, base).unwrap();
        b.implements(sub, iface).unwrap();
        let base_print = b.add_method(base, print_sig(), MethodModifiers::empty()).unwrap();
        b.add_method(iface, print_sig(), MethodModifiers::empty()).unwrap();
        let h = b.build().unwrap();

        let resolver = MethodResolver::new(&h);
        assert_eq!(
            resolver.dispatch(sub, &print_sig()).unwrap(),
            DispatchOutcome::Resolved(base_print)
        );
    }

    #[test]
    fn test_most_specific_default_wins() {
        let fixture = diamond_hierarchy();
        let resolver = MethodResolver::new(&fixture.hierarchy);

        // Base only sees Left (which overrides Top's default).
        assert_eq!(
            resolver.dispatch(fixture.base, &print_sig()).unwrap(),
            DispatchOutcome::Resolved(fixture.left_print)
        );
    }

    #[test]
    fn test_sibling_defaults_are_ambiguous() {
        let fixture = diamond_hierarchy();
        let resolver = MethodResolver::new(&fixture.hierarchy);

        // Sub sees both Left and Right defaults, neither shadows the other.
        match resolver.dispatch(fixture.sub, &print_sig()).unwrap() {
            DispatchOutcome::Ambiguous(candidates) => {
                assert_eq!(candidates.len(), 2);
                assert!(candidates.contains(&fixture.left_print));
                assert!(candidates.contains(&fixture.right_print));
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }

        let r = resolver
            .resolve(DispatchKind::Interface, fixture.top, &print_sig(), None, None)
            .unwrap();
        assert_eq!(r.targets, vec![fixture.left_print]);
        assert_eq!(r.failures.len(), 1);
        assert_eq!(r.failures[0].kind, DiagnosticKind::AmbiguousTarget);
        assert_eq!(r.failures[0].receiver, Some(fixture.sub));
    }

    #[test]
    fn test_abstract_redeclaration_revokes_default() {
        let mut b = TypeHierarchyBuilder::new();
        let a = b.add_interface("InterfaceA").unwrap();
        let bi = b.add_interface("InterfaceB").unwrap();
        let class = b.add_class("Impl", TypeFlags::empty()).unwrap();
        b.extends(bi, a).unwrap();
        b.implements(class, bi).unwrap();
        b.add_method(a, print_sig(), MethodModifiers::empty()).unwrap();
        b.add_method(bi, print_sig(), MethodModifiers::ABSTRACT).unwrap();
        let h = b.build().unwrap();

        let resolver = MethodResolver::new(&h);
        assert_eq!(
            resolver.dispatch(class, &print_sig()).unwrap(),
            DispatchOutcome::Unresolved
        );

        let r = resolver
            .resolve(DispatchKind::Interface, a, &print_sig(), None, None)
            .unwrap();
        assert!(r.targets.is_empty());
        assert_eq!(r.failures[0].kind, DiagnosticKind::UnresolvedTarget);
        assert_eq!(r.failures[0].receiver, Some(class));
    }

    #[test]
    fn test_fan_out_keeps_successful_receivers() {
        let mut b = TypeHierarchyBuilder::new();
        let shape = b.add_class("Shape", TypeFlags::ABSTRACT).unwrap();
        let circle = b.add_class("Circle", TypeFlags::empty()).unwrap();
        let square = b.add_class("Square", TypeFlags::empty()).unwrap();
        b.extends(circle, shape).unwrap();
        b.extends(square, shape).unwrap();
        let draw = MethodSignature::new("draw", "()V");
        b.add_method(shape, draw.clone(), MethodModifiers::ABSTRACT).unwrap();
        let circle_draw = b.add_method(circle, draw.clone(), MethodModifiers::empty()).unwrap();
        let h = b.build().unwrap();

        let resolver = MethodResolver::new(&h);
        let r = resolver
            .resolve(DispatchKind::Virtual, shape, &draw, None, None)
            .unwrap();
        assert_eq!(r.targets, vec![circle_draw]);
        assert_eq!(r.failures.len(), 1);
        assert_eq!(r.failures[0].receiver, Some(square));
    }

    #[test]
    fn test_receiver_narrowing() {
        let fixture = diamond_hierarchy();
        let resolver = MethodResolver::new(&fixture.hierarchy);

        let all = resolver.receiver_types(fixture.top, None, None).unwrap();
        assert_eq!(all, vec![fixture.base, fixture.sub]);

        let hinted = resolver
            .receiver_types(fixture.top, Some(&[fixture.base]), None)
            .unwrap();
        assert_eq!(hinted, vec![fixture.base]);

        let instantiated: HashSet<TypeId> = [fixture.sub].into_iter().collect();
        let narrowed = resolver
            .receiver_types(fixture.top, None, Some(&instantiated))
            .unwrap();
        assert_eq!(narrowed, vec![fixture.sub]);

        assert_eq!(
            resolver.receiver_types(fixture.top, Some(&[TypeId::new(500)]), None),
            Err(Error::UnknownType(TypeId::new(500)))
        );
    }

    #[test]
    fn test_no_receivers_is_unresolved() {
        let mut b = TypeHierarchyBuilder::new();
        let lonely = b.add_interface("Lonely").unwrap();
        b.add_method(lonely, print_sig(), MethodModifiers::ABSTRACT).unwrap();
        let h = b.build().unwrap();

        let r = MethodResolver::new(&h)
            .resolve(DispatchKind::Interface, lonely, &print_sig(), None, None)
            .unwrap();
        assert!(r.targets.is_empty());
        assert_eq!(r.failures.len(), 1);
        assert_eq!(r.failures[0].kind, DiagnosticKind::UnresolvedTarget);
        assert_eq!(r.failures[0].receiver, None);
    }

    #[test]
    fn test_special_and_static_are_exact() {
        let mut b = TypeHierarchyBuilder::new();
        let read = b.add_interface("Read").unwrap();
        let util = b.add_class("Util", TypeFlags::empty()).unwrap();
        let read_print = b.add_method(read, print_sig(), MethodModifiers::empty()).unwrap();
        let helper_sig = MethodSignature::new("helper", "()V");
        let helper = b.add_method(util, helper_sig.clone(), MethodModifiers::STATIC).unwrap();
        let h = b.build().unwrap();

        let resolver = MethodResolver::new(&h);
        let r = resolver
            .resolve(DispatchKind::Special, read, &print_sig(), None, None)
            .unwrap();
        assert_eq!(r.targets, vec![read_print]);

        let r = resolver
            .resolve(DispatchKind::Static, util, &helper_sig, None, None)
            .unwrap();
        assert_eq!(r.targets, vec![helper]);

        // Static dispatch to an instance method, special dispatch to a static one.
        let r = resolver
            .resolve(DispatchKind::Static, read, &print_sig(), None, None)
            .unwrap();
        assert_eq!(r.failures[0].kind, DiagnosticKind::MissingTarget);
        let r = resolver
            .resolve(DispatchKind::Special, util, &helper_sig, None, None)
            .unwrap();
        assert_eq!(r.failures[0].kind, DiagnosticKind::MissingTarget);

        // Nothing inherited: Util does not declare print.
        let r = resolver
            .resolve(DispatchKind::Special, util, &print_sig(), None, None)
            .unwrap();
        assert!(r.targets.is_empty());
        assert_eq!(r.failures[0].kind, DiagnosticKind::MissingTarget);
    }

    #[test]
    fn test_unknown_declared_type() {
        let fixture = diamond_hierarchy();
        let resolver = MethodResolver::new(&fixture.hierarchy);
        assert_eq!(
            resolver.resolve(DispatchKind::Virtual, TypeId::new(77), &print_sig(), None, None),
            Err(Error::UnknownType(TypeId::new(77)))
        );
    }

    #[test]
    fn test_memoization() {
        let fixture = diamond_hierarchy();
        let resolver = MethodResolver::new(&fixture.hierarchy);

        let first = resolver.dispatch(fixture.base, &print_sig()).unwrap();
        let second = resolver.dispatch(fixture.base, &print_sig()).unwrap();
        assert_eq!(first, second);

        let stats = resolver.stats();
        assert_eq!(stats.dispatch_queries, 2);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cached_pairs, 1);
        assert_eq!(stats.cache_misses(), 1);
        assert!((stats.hit_rate() - 50.0).abs() < f64::EPSILON);

        resolver.clear_cache();
        assert_eq!(resolver.stats().cached_pairs, 0);

        let uncached = MethodResolver::new(&fixture.hierarchy).with_memoization(false);
        assert_eq!(uncached.dispatch(fixture.base, &print_sig()).unwrap(), first);
        assert_eq!(uncached.stats().cached_pairs, 0);
    }

    #[test]
    fn test_stats_during_concurrent_dispatch() {
        let fixture = diamond_hierarchy();
        let resolver = MethodResolver::new(&fixture.hierarchy);
        let print = print_sig();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..2_000 {
                        resolver.dispatch(fixture.sub, &print).unwrap();
                    }
                });
            }
            for _ in 0..2_000 {
                let stats = resolver.stats();
                assert!(stats.cache_hits <= stats.dispatch_queries);
                assert!(stats.cache_misses() <= stats.dispatch_queries);
                assert!(stats.hit_rate() <= 100.0);
            }
        });

        let stats = resolver.stats();
        assert_eq!(stats.dispatch_queries, 8_000);
        assert_eq!(stats.cache_hits + stats.cache_misses(), 8_000);
    }

    #[test]
    fn test_cache_misses_saturate() {
        let stats = ResolverStats {
            dispatch_queries: 3,
            cache_hits: 5,
            ..ResolverStats::default()
        };
        assert_eq!(stats.cache_misses(), 0);
        assert!((stats.hit_rate() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resolver_stats_default() {
        let stats = ResolverStats::default();
        assert_eq!(stats.dispatch_queries, 0);
        assert!((stats.hit_rate() - 0.0).abs() < f64::EPSILON);
        assert_eq!(stats.resolutions_by_kind[2], (DispatchKind::Special, 0));
    }

    #[test]
    fn test_resolutions_by_kind() {
        let fixture = diamond_hierarchy();
        let resolver = MethodResolver::new(&fixture.hierarchy);
        resolver
            .resolve(DispatchKind::Interface, fixture.top, &print_sig(), None, None)
            .unwrap();
        let explicit = resolver
            .resolve(DispatchKind::Special, fixture.top, &print_sig(), None, None)
            .unwrap();
        assert_eq!(explicit.targets, vec![fixture.top_print]);

        let stats = resolver.stats();
        assert_eq!(stats.resolutions(DispatchKind::Interface), 1);
        assert_eq!(stats.resolutions(DispatchKind::Special), 1);
        assert_eq!(stats.resolutions(DispatchKind::Virtual), 0);
        assert_eq!(stats.exact_resolutions, 1);
    }
}
