//! Lifted method bodies and the body-lifting boundary.
//!
//! The instruction-to-IR lifting layer is an external collaborator. The core only needs two
//! things from it: the invocation statements of a body ([`InvocationSite`]s, already carrying a
//! static target signature and dispatch kind), and the ability to request a body on demand. The
//! former is [`MethodBody`], the latter the [`BodyProvider`] trait.

use std::{collections::HashMap, sync::Arc};

use crate::{
    analysis::InvocationSite,
    metadata::{
        token::{MethodId, TypeId},
        typesystem::TypeHierarchy,
    },
    Result,
};

/// The lifted body of a concrete method, reduced to what call graph construction consumes.
///
/// Sites are kept in instruction order. Bodies are immutable once lifted and shared by
/// reference count between the provider's cache and the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodBody {
    method: MethodId,
    sites: Vec<InvocationSite>,
    allocations: Vec<TypeId>,
    instruction_count: usize,
}

impl MethodBody {
    /// Creates a body for `method` with the given invocation sites.
    ///
    /// # Arguments
    ///
    /// * `method` - The method this body belongs to
    /// * `sites` - Invocation statements in instruction order
    #[must_use]
    pub fn new(method: MethodId, sites: Vec<InvocationSite>) -> Self {
        let instruction_count = sites.len();
        Self {
            method,
            sites,
            allocations: Vec::new(),
            instruction_count,
        }
    }

    /// Attaches the types allocated by this body.
    #[must_use]
    pub fn with_allocations(mut self, allocations: Vec<TypeId>) -> Self {
        self.allocations = allocations;
        self
    }

    /// Records the size of the instruction stream this body was lifted from.
    #[must_use]
    pub fn with_instruction_count(mut self, count: usize) -> Self {
        self.instruction_count = count;
        self
    }

    /// Returns the owning method.
    #[must_use]
    pub fn method(&self) -> MethodId {
        self.method
    }

    /// Returns all invocation sites in instruction order.
    #[must_use]
    pub fn sites(&self) -> &[InvocationSite] {
        &self.sites
    }

    /// Returns the site at the given offset, if any.
    #[must_use]
    pub fn site_at(&self, offset: u32) -> Option<&InvocationSite> {
        self.sites.iter().find(|site| site.offset == offset)
    }

    /// Returns the types instantiated by this body, in instruction order.
    #[must_use]
    pub fn allocations(&self) -> &[TypeId] {
        &self.allocations
    }

    /// Returns the number of instructions the body was lifted from.
    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.instruction_count
    }
}

/// Source of lifted method bodies.
///
/// The call graph builder asks for the body of every concrete method it reaches, exactly once
/// per method and run. Implementations either return an already lifted body or lift it on
/// demand. Requests for distinct methods may arrive concurrently from worker threads, hence the
/// `Sync` bound; implementations must not rely on any particular request order.
///
/// Returning `Ok(None)` means the method has no analyzable body (it contributes no outgoing
/// edges). Returning an error aborts the run.
pub trait BodyProvider: Sync {
    /// Returns the body of `method`, lifting it if necessary.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::BodyUnavailable`] if lifting failed.
    fn body(&self, hierarchy: &TypeHierarchy, method: MethodId)
        -> Result<Option<Arc<MethodBody>>>;
}

impl BodyProvider for HashMap<MethodId, Arc<MethodBody>> {
    fn body(
        &self,
        _hierarchy: &TypeHierarchy,
        method: MethodId,
    ) -> Result<Option<Arc<MethodBody>>> {
        Ok(self.get(&method).cloned())
    }
}
