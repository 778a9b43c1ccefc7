//! Resolution diagnostics.
//!
//! A call site that cannot be resolved does not stop call graph construction. Instead a
//! [`Diagnostic`] is appended to the run's [`Diagnostics`] stream and the builder moves on, so
//! that everything else reachable is still discovered and every anomaly stays visible for
//! post-hoc inspection.

use std::fmt;

use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

use crate::{
    analysis::callgraph::CallSiteRef,
    metadata::{
        signature::MethodSignature,
        token::{MethodId, TypeId},
    },
};

/// Category of a resolution anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, EnumCount)]
pub enum DiagnosticKind {
    /// No concrete class method and no surviving interface default for one receiver type.
    UnresolvedTarget,
    /// Two or more unrelated interface defaults survived for one receiver type.
    AmbiguousTarget,
    /// A special or static call names a declaration that does not exist.
    MissingTarget,
    /// A call site references a type that is not registered in the hierarchy.
    UnknownType,
    /// A reachable method is implemented in native code; its callees are unknown.
    NativeMethod,
}

/// A single recorded resolution anomaly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What went wrong.
    pub kind: DiagnosticKind,
    /// The call site being resolved, absent for method-level findings.
    pub site: Option<CallSiteRef>,
    /// The signature that was being resolved.
    pub signature: MethodSignature,
    /// The receiver type whose contribution was dropped, for per-subtype failures.
    pub receiver: Option<TypeId>,
    /// Methods involved: the competing defaults of an ambiguity, or the native method.
    pub candidates: Vec<MethodId>,
}

impl Diagnostic {
    /// Creates a diagnostic without receiver or candidates.
    #[must_use]
    pub fn new(kind: DiagnosticKind, site: Option<CallSiteRef>, signature: MethodSignature) -> Self {
        Self {
            kind,
            site,
            signature,
            receiver: None,
            candidates: Vec::new(),
        }
    }

    /// Attaches the receiver type the diagnostic applies to.
    #[must_use]
    pub fn with_receiver(mut self, receiver: TypeId) -> Self {
        self.receiver = Some(receiver);
        self
    }

    /// Attaches the methods involved.
    #[must_use]
    pub fn with_candidates(mut self, candidates: Vec<MethodId>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Returns the same diagnostic attributed to a concrete call site.
    #[must_use]
    pub fn at(mut self, site: CallSiteRef) -> Self {
        self.site = Some(site);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.signature)?;
        if let Some(site) = self.site {
            write!(f, " at {site}")?;
        }
        if let Some(receiver) = self.receiver {
            write!(f, " for receiver {receiver}")?;
        }
        if !self.candidates.is_empty() {
            let names: Vec<String> = self.candidates.iter().map(ToString::to_string).collect();
            write!(f, " [{}]", names.join(", "))?;
        }
        Ok(())
    }
}

/// Append-only stream of diagnostics for one analysis run.
///
/// Backed by a lock-free append-only vector so that resolution code holding only a shared
/// reference can record findings, including from worker threads.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: boxcar::Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a diagnostic.
    pub fn record(&self, diagnostic: Diagnostic) {
        tracing::warn!(%diagnostic, "resolution diagnostic");
        self.entries.push(diagnostic);
    }

    /// Returns the number of recorded diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.count()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over all diagnostics in recording order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().map(|(_, diagnostic)| diagnostic)
    }

    /// Returns an iterator over diagnostics of one kind.
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.iter().filter(move |d| d.kind == kind)
    }

    /// Returns all diagnostics recorded for a call site.
    pub fn at_site(&self, site: CallSiteRef) -> impl Iterator<Item = &Diagnostic> {
        self.iter().filter(move |d| d.site == Some(site))
    }

    /// Returns the number of diagnostics per kind, in declaration order of the kinds.
    #[must_use]
    pub fn counts(&self) -> [(DiagnosticKind, usize); DiagnosticKind::COUNT] {
        let mut counts = [(DiagnosticKind::UnresolvedTarget, 0); DiagnosticKind::COUNT];
        for (slot, kind) in counts.iter_mut().zip(DiagnosticKind::iter()) {
            *slot = (kind, self.of_kind(kind).count());
        }
        counts
    }

    /// Copies the stream into a vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Diagnostic> {
        self.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig() -> MethodSignature {
        MethodSignature::new("print", "()V")
    }

    #[test]
    fn test_record_and_filter() {
        let diagnostics = Diagnostics::new();
        assert!(diagnostics.is_empty());

        let site = CallSiteRef::new(MethodId::new(0), 4);
        diagnostics.record(
            Diagnostic::new(DiagnosticKind::AmbiguousTarget, Some(site), sig())
                .with_receiver(TypeId::new(2))
                .with_candidates(vec![MethodId::new(5), MethodId::new(6)]),
        );
        diagnostics.record(Diagnostic::new(DiagnosticKind::MissingTarget, None, sig()));

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.of_kind(DiagnosticKind::AmbiguousTarget).count(), 1);
        assert_eq!(diagnostics.at_site(site).count(), 1);

        let counts = diagnostics.counts();
        assert_eq!(counts[0], (DiagnosticKind::UnresolvedTarget, 0));
        assert_eq!(counts[1], (DiagnosticKind::AmbiguousTarget, 1));
        assert_eq!(counts[2], (DiagnosticKind::MissingTarget, 1));
    }

    #[test]
    fn test_display() {
        let site = CallSiteRef::new(MethodId::new(1), 2);
        let d = Diagnostic::new(DiagnosticKind::AmbiguousTarget, None, sig())
            .at(site)
            .with_receiver(TypeId::new(3))
            .with_candidates(vec![MethodId::new(7), MethodId::new(8)]);
        assert_eq!(
            d.to_string(),
            "AmbiguousTarget: print()V at m1@0002 for receiver t3 [m7, m8]"
        );
    }

    #[test]
    fn test_concurrent_recording() {
        use rayon::prelude::*;

        let diagnostics = Diagnostics::new();
        (0..64u32).into_par_iter().for_each(|i| {
            diagnostics.record(Diagnostic::new(
                DiagnosticKind::UnresolvedTarget,
                Some(CallSiteRef::new(MethodId::new(i), 0)),
                sig(),
            ));
        });
        assert_eq!(diagnostics.len(), 64);
    }
}
