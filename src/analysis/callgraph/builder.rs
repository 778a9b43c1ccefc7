//! Worklist-driven call graph construction.
//!
//! [`CallGraphBuilder`] discovers the reachable part of a program starting from a set of entry
//! methods. It repeatedly takes the methods discovered so far off a FIFO worklist, obtains
//! their lifted bodies from a [`BodyProvider`], resolves every invocation site with a
//! [`MethodResolver`] and enqueues the targets it has not seen before.
//!
//! # Waves
//!
//! The worklist is drained one wave at a time. All bodies of a wave are lifted before any of its
//! methods is processed, optionally on the rayon thread pool, and without touching graph state.
//! The wave is then processed sequentially in queue order, so the resulting graph, reachable set
//! and diagnostic stream do not depend on thread scheduling.
//!
//! # Failures
//!
//! Resolution anomalies never abort a build; they are recorded as [`Diagnostic`]s. Fatal errors
//! are limited to unknown entry points, provider failures, and call sites naming unregistered
//! types while [`CallGraphConfig::fail_on_unknown_type`] is set.

use std::{
    collections::{BTreeSet, HashMap, HashSet, VecDeque},
    sync::Arc,
    time::Instant,
};

use rayon::prelude::*;
use tracing::{debug, info, info_span, trace};

use crate::{
    analysis::callgraph::{
        CallGraph, CallGraphConfig, CallSiteRef, Diagnostic, DiagnosticKind, Diagnostics,
        MethodResolver, ReachableMethods, ResolverStats,
    },
    metadata::{
        method::{BodyProvider, MethodBody},
        token::{MethodId, TypeId},
        typesystem::TypeHierarchy,
    },
    Error, Result,
};

/// Everything produced by one call graph build.
///
/// This is the whole analysis context of a run; nothing is kept in global state.
#[derive(Debug)]
pub struct CallGraphResult {
    /// The resolved call edges.
    pub call_graph: CallGraph,
    /// Methods whose call sites were processed, in discovery order.
    pub reachable: ReachableMethods,
    /// Resolution anomalies in recording order.
    pub diagnostics: Diagnostics,
    /// Methods that were discovered but not processed because a budget ran out.
    pub unprocessed: Vec<MethodId>,
    /// Types allocated by the bodies of processed methods.
    pub allocated_types: BTreeSet<TypeId>,
    /// Counters of the resolver used for the run.
    pub resolver_stats: ResolverStats,
}

impl CallGraphResult {
    /// Returns `true` if the worklist was drained without hitting a budget.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unprocessed.is_empty()
    }
}

/// Lifecycle of a method body during a build.
#[derive(Debug, Clone)]
enum BodyState {
    /// Discovered and queued, not yet lifted.
    Pending,
    /// Lifted; call sites are resolved when the method is processed.
    Lifted(Arc<MethodBody>),
    /// Abstract, native, or without a body from the provider.
    Absent,
}

/// Builds a [`CallGraph`] from entry points.
///
/// # Examples
///
/// ```rust
/// use std::collections::HashMap;
/// use callscope::{
///     analysis::{CallGraphBuilder, CallGraphConfig, DispatchKind, InvocationSite},
///     metadata::{
///         method::{BodyProvider, MethodBody, MethodModifiers},
///         signature::MethodSignature,
///         typesystem::{TypeFlags, TypeHierarchyBuilder},
///     },
/// };
///
/// let print = MethodSignature::new("print", "()V");
/// let mut builder = TypeHierarchyBuilder::new();
/// let main_class = builder.add_class("Main", TypeFlags::empty())?;
/// let main = builder.add_method(main_class, MethodSignature::new("main", "()V"), MethodModifiers::STATIC)?;
/// let target = builder.add_method(main_class, print.clone(), MethodModifiers::STATIC)?;
/// let hierarchy = builder.build()?;
///
/// let mut bodies = HashMap::new();
/// bodies.insert(
///     main,
///     std::sync::Arc::new(MethodBody::new(
///         main,
///         vec![InvocationSite::new(0, DispatchKind::Static, main_class, print)],
///     )),
/// );
///
/// let result = CallGraphBuilder::new(&hierarchy, &bodies)
///     .with_config(CallGraphConfig::sequential())
///     .build(&[main])?;
/// assert!(result.reachable.contains(target));
/// assert!(result.is_complete());
/// # Ok::<(), callscope::Error>(())
/// ```
pub struct CallGraphBuilder<'a, P: BodyProvider + ?Sized> {
    hierarchy: &'a TypeHierarchy,
    provider: &'a P,
    config: CallGraphConfig,
    instantiated: Option<HashSet<TypeId>>,
}

impl<'a, P: BodyProvider + ?Sized> CallGraphBuilder<'a, P> {
    /// Creates a builder with the default configuration.
    ///
    /// # Arguments
    ///
    /// * `hierarchy` - The fully built type hierarchy of the program
    /// * `provider` - Source of lifted method bodies
    #[must_use]
    pub fn new(hierarchy: &'a TypeHierarchy, provider: &'a P) -> Self {
        Self {
            hierarchy,
            provider,
            config: CallGraphConfig::default(),
            instantiated: None,
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: CallGraphConfig) -> Self {
        self.config = config;
        self
    }

    /// Restricts virtual and interface fan-out to types known to be instantiated.
    ///
    /// Receiver types outside this set are never considered, even if the class hierarchy admits
    /// them.
    #[must_use]
    pub fn with_instantiated_types(mut self, types: impl IntoIterator<Item = TypeId>) -> Self {
        self.instantiated = Some(types.into_iter().collect());
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &CallGraphConfig {
        &self.config
    }

    /// Runs the worklist to completion or until a budget runs out.
    ///
    /// # Arguments
    ///
    /// * `entries` - Entry point methods; duplicates are ignored
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMethod`] for an unregistered entry point, any error of the
    /// [`BodyProvider`], [`Error::Malformed`] if the provider returns a body for the wrong
    /// method, and [`Error::UnknownType`] for a call site naming an unregistered type unless
    /// [`CallGraphConfig::fail_on_unknown_type`] is disabled.
    pub fn build(&self, entries: &[MethodId]) -> Result<CallGraphResult> {
        let span = info_span!("build_call_graph", entries = entries.len());
        let _guard = span.enter();

        let started = Instant::now();
        let resolver =
            MethodResolver::new(self.hierarchy).with_memoization(self.config.memoize_dispatch);

        let mut call_graph = CallGraph::new();
        let mut reachable = ReachableMethods::new();
        let diagnostics = Diagnostics::new();
        let mut states: HashMap<MethodId, BodyState> = HashMap::new();
        let mut queue: VecDeque<MethodId> = VecDeque::new();
        let mut unprocessed = Vec::new();
        let mut allocated_types = BTreeSet::new();

        for &entry in entries {
            self.hierarchy.method(entry)?;
            if !states.contains_key(&entry) {
                states.insert(entry, BodyState::Pending);
                queue.push_back(entry);
            }
        }

        let mut wave_index = 0usize;
        'waves: while !queue.is_empty() {
            let budget = self
                .config
                .max_methods
                .map_or(usize::MAX, |max| max.saturating_sub(reachable.len()));
            if budget == 0 {
                debug!(processed = reachable.len(), "method budget exhausted");
                break;
            }

            let wave: Vec<MethodId> = queue.drain(..queue.len().min(budget)).collect();
            debug!(wave = wave_index, size = wave.len(), "lifting wave");
            wave_index += 1;

            for (method, state) in wave.iter().zip(self.lift_wave(&wave)?) {
                states.insert(*method, state);
            }

            for (position, &method) in wave.iter().enumerate() {
                if self
                    .config
                    .deadline
                    .is_some_and(|deadline| started.elapsed() >= deadline)
                {
                    debug!(processed = reachable.len(), "deadline reached");
                    unprocessed.extend_from_slice(&wave[position..]);
                    break 'waves;
                }

                if !reachable.insert(method) {
                    continue;
                }
                debug!(method = %method, "processing method");

                let body = match states.get(&method) {
                    Some(BodyState::Lifted(body)) => Arc::clone(body),
                    _ => {
                        self.note_bodiless(method, &diagnostics)?;
                        continue;
                    }
                };
                allocated_types.extend(body.allocations().iter().copied());

                for site in body.sites() {
                    let site_ref = CallSiteRef::new(method, site.offset);
                    let resolution = match resolver.resolve_site(site, self.instantiated.as_ref())
                    {
                        Ok(resolution) => resolution,
                        Err(Error::UnknownType(ty)) if !self.config.fail_on_unknown_type => {
                            diagnostics.record(
                                Diagnostic::new(
                                    DiagnosticKind::UnknownType,
                                    Some(site_ref),
                                    site.signature.clone(),
                                )
                                .with_receiver(ty),
                            );
                            continue;
                        }
                        Err(error) => return Err(error),
                    };

                    for target in resolution.targets {
                        if call_graph.add_edge(method, site_ref, target, site.kind) {
                            trace!(site = %site_ref, target = %target, kind = %site.kind, "edge");
                        }
                        if !states.contains_key(&target) {
                            states.insert(target, BodyState::Pending);
                            queue.push_back(target);
                        }
                    }
                    for failure in resolution.failures {
                        diagnostics.record(failure.at(site_ref));
                    }
                }
            }
        }

        unprocessed.extend(queue.drain(..));

        let resolver_stats = resolver.stats();
        info!(
            reachable = reachable.len(),
            edges = call_graph.edge_count(),
            diagnostics = diagnostics.len(),
            unprocessed = unprocessed.len(),
            allocated = allocated_types.len(),
            cache_hit_rate = resolver_stats.hit_rate(),
            "call graph built"
        );

        Ok(CallGraphResult {
            call_graph,
            reachable,
            diagnostics,
            unprocessed,
            allocated_types,
            resolver_stats,
        })
    }

    fn lift_wave(&self, wave: &[MethodId]) -> Result<Vec<BodyState>> {
        if self.config.parallel_lifting && wave.len() > 1 {
            wave.par_iter().map(|&method| self.lift(method)).collect()
        } else {
            wave.iter().map(|&method| self.lift(method)).collect()
        }
    }

    fn lift(&self, method: MethodId) -> Result<BodyState> {
        if !self.hierarchy.method(method)?.has_body() {
            return Ok(BodyState::Absent);
        }

        match self.provider.body(self.hierarchy, method)? {
            Some(body) if body.method() != method => Err(malformed_error!(
                "Body provider returned the body of {} for {}",
                body.method(),
                method
            )),
            Some(body) => Ok(BodyState::Lifted(body)),
            None => Ok(BodyState::Absent),
        }
    }

    fn note_bodiless(&self, method: MethodId, diagnostics: &Diagnostics) -> Result<()> {
        let declaration = self.hierarchy.method(method)?;
        if declaration.is_native() {
            diagnostics.record(
                Diagnostic::new(
                    DiagnosticKind::NativeMethod,
                    None,
                    declaration.signature.clone(),
                )
                .with_candidates(vec![method]),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc, time::Duration};

    use crate::{
        analysis::callgraph::{
            CallGraphBuilder, CallGraphConfig, CallSiteRef, DiagnosticKind, DispatchKind,
            InvocationSite,
        },
        metadata::{
            method::{MethodBody, MethodModifiers},
            signature::MethodSignature,
            token::{MethodId, TypeId},
            typesystem::{TypeFlags, TypeHierarchyBuilder},
        },
        test::factories::{diamond_hierarchy, print_sig},
        Error,
    };

    fn body(method: MethodId, sites: Vec<InvocationSite>) -> Arc<MethodBody> {
        Arc::new(MethodBody::new(method, sites))
    }

    #[test]
    fn test_static_chain() {
        let mut b = TypeHierarchyBuilder::new();
        let class = b.add_class("Chain", TypeFlags::empty()).unwrap();
        let sig = |n: &str| MethodSignature::new(n, "()V");
        let a = b.add_method(class, sig("a"), MethodModifiers::STATIC).unwrap();
        let c = b.add_method(class, sig("c"), MethodModifiers::STATIC).unwrap();
        let d = b.add_method(class, sig("d"), MethodModifiers::STATIC).unwrap();
        let unused = b.add_method(class, sig("unused"), MethodModifiers::STATIC).unwrap();
        let h = b.build().unwrap();

        let mut bodies = HashMap::new();
        bodies.insert(
            a,
            body(a, vec![InvocationSite::new(0, DispatchKind::Static, class, sig("c"))]),
        );
        bodies.insert(
            c,
            body(
                c,
                vec![
                    InvocationSite::new(0, DispatchKind::Static, class, sig("d")),
                    InvocationSite::new(1, DispatchKind::Static, class, sig("a")),
                ],
            ),
        );

        let result = CallGraphBuilder::new(&h, &bodies)
            .with_config(CallGraphConfig::sequential())
            .build(&[a, a])
            .unwrap();

        assert!(result.is_complete());
        assert_eq!(result.reachable.iter().collect::<Vec<_>>(), vec![a, c, d]);
        assert!(!result.reachable.contains(unused));
        assert_eq!(result.call_graph.edge_count(), 3);
        assert!(result.call_graph.contains_edge(
            c,
            CallSiteRef::new(c, 1),
            a,
            DispatchKind::Static
        ));
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_failures_are_attributed_to_sites() {
        let fixture = diamond_hierarchy();
        let h = &fixture.hierarchy;
        let entry = fixture.base_ctor;

        let mut bodies = HashMap::new();
        bodies.insert(
            entry,
            body(
                entry,
                vec![InvocationSite::new(7, DispatchKind::Interface, fixture.top, print_sig())],
            ),
        );

        let result = CallGraphBuilder::new(h, &bodies).build(&[entry]).unwrap();
        let site = CallSiteRef::new(entry, 7);
        assert_eq!(result.call_graph.callees(entry), vec![fixture.left_print]);

        let ambiguous: Vec<_> = result.diagnostics.at_site(site).collect();
        assert_eq!(ambiguous.len(), 1);
        assert_eq!(ambiguous[0].kind, DiagnosticKind::AmbiguousTarget);
        assert_eq!(ambiguous[0].receiver, Some(fixture.sub));
    }

    #[test]
    fn test_unknown_type_strict_and_lenient() {
        let fixture = diamond_hierarchy();
        let entry = fixture.base_ctor;
        let mut bodies = HashMap::new();
        bodies.insert(
            entry,
            body(
                entry,
                vec![InvocationSite::new(0, DispatchKind::Virtual, TypeId::new(99), print_sig())],
            ),
        );

        let strict = CallGraphBuilder::new(&fixture.hierarchy, &bodies).build(&[entry]);
        assert_eq!(strict.unwrap_err(), Error::UnknownType(TypeId::new(99)));

        let lenient = CallGraphBuilder::new(&fixture.hierarchy, &bodies)
            .with_config(CallGraphConfig::lenient())
            .build(&[entry])
            .unwrap();
        assert_eq!(lenient.diagnostics.of_kind(DiagnosticKind::UnknownType).count(), 1);
        assert!(lenient.reachable.contains(entry));
    }

    #[test]
    fn test_unknown_entry_is_fatal() {
        let fixture = diamond_hierarchy();
        let bodies: HashMap<MethodId, Arc<MethodBody>> = HashMap::new();
        let result = CallGraphBuilder::new(&fixture.hierarchy, &bodies).build(&[MethodId::new(404)]);
        assert_eq!(result.unwrap_err(), Error::UnknownMethod(MethodId::new(404)));
    }

    #[test]
    fn test_mismatched_body_is_rejected() {
        let fixture = diamond_hierarchy();
        let mut bodies = HashMap::new();
        bodies.insert(fixture.base_ctor, body(fixture.object_ctor, Vec::new()));

        let result = CallGraphBuilder::new(&fixture.hierarchy, &bodies).build(&[fixture.base_ctor]);
        assert!(matches!(result, Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_budgets() {
        let fixture = diamond_hierarchy();
        let entry = fixture.base_ctor;
        let mut bodies = HashMap::new();
        bodies.insert(
            entry,
            body(
                entry,
                vec![InvocationSite::new(
                    0,
                    DispatchKind::Special,
                    fixture.object,
                    MethodSignature::constructor(),
                )],
            ),
        );

        let limited = CallGraphBuilder::new(&fixture.hierarchy, &bodies)
            .with_config(CallGraphConfig::default().with_max_methods(1))
            .build(&[entry])
            .unwrap();
        assert!(!limited.is_complete());
        assert_eq!(limited.reachable.len(), 1);
        assert_eq!(limited.unprocessed, vec![fixture.object_ctor]);

        let expired = CallGraphBuilder::new(&fixture.hierarchy, &bodies)
            .with_config(CallGraphConfig::default().with_deadline(Duration::ZERO))
            .build(&[entry])
            .unwrap();
        assert!(!expired.is_complete());
        assert!(expired.reachable.is_empty());
        assert_eq!(expired.unprocessed, vec![entry]);
    }

    #[test]
    fn test_allocations_of_processed_bodies() {
        let fixture = diamond_hierarchy();
        let entry = fixture.base_ctor;
        let mut bodies = HashMap::new();
        bodies.insert(
            entry,
            Arc::new(
                MethodBody::new(
                    entry,
                    vec![InvocationSite::new(
                        1,
                        DispatchKind::Special,
                        fixture.object,
                        MethodSignature::constructor(),
                    )],
                )
                .with_allocations(vec![fixture.sub, fixture.sub]),
            ),
        );
        bodies.insert(
            fixture.left_print,
            Arc::new(
                MethodBody::new(fixture.left_print, Vec::new())
                    .with_allocations(vec![fixture.base]),
            ),
        );

        let result = CallGraphBuilder::new(&fixture.hierarchy, &bodies)
            .build(&[entry])
            .unwrap();
        assert!(result.is_complete());
        let allocated: Vec<TypeId> = result.allocated_types.iter().copied().collect();
        assert_eq!(allocated, vec![fixture.sub]);
    }
}
