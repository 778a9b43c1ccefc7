//! Call graph construction configuration
//!
//! Controls how much work a [`CallGraphBuilder`](crate::analysis::CallGraphBuilder) is allowed to
//! do and how strictly it treats incomplete program models.

use std::time::Duration;

/// Configuration for call graph construction
///
/// The defaults run an unbounded, strict analysis that lifts bodies of each worklist wave in
/// parallel. Budgets never turn into errors: a build that hits one returns a result marked
/// incomplete together with the methods it did not get to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallGraphConfig {
    /// Lift the bodies of one worklist wave on the rayon thread pool
    /// Resolution and graph mutation stay sequential either way
    pub parallel_lifting: bool,

    /// Stop after this many methods have been processed
    pub max_methods: Option<usize>,

    /// Stop once this much wall-clock time has elapsed since the build started
    /// Checked between methods, so a single method is never interrupted
    pub deadline: Option<Duration>,

    /// Abort the build when a call site names an unregistered type
    /// When disabled the site is recorded as an `UnknownType` diagnostic and skipped
    pub fail_on_unknown_type: bool,

    /// Cache per `(type, signature)` dispatch outcomes for the whole run
    pub memoize_dispatch: bool,
}

impl Default for CallGraphConfig {
    fn default() -> Self {
        Self {
            parallel_lifting: true,
            max_methods: None,
            deadline: None,
            fail_on_unknown_type: true,
            memoize_dispatch: true,
        }
    }
}

impl CallGraphConfig {
    /// Creates a configuration that does everything on the calling thread
    ///
    /// Useful for debugging and for hosts that already parallelize across programs.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel_lifting: false,
            ..Self::default()
        }
    }

    /// Creates a configuration with both a method and a time budget
    #[must_use]
    pub fn bounded(max_methods: usize, deadline: Duration) -> Self {
        Self {
            max_methods: Some(max_methods),
            deadline: Some(deadline),
            ..Self::default()
        }
    }

    /// Creates a configuration tolerating an incomplete type model
    ///
    /// Unknown types are recorded as diagnostics instead of aborting the build, so a program
    /// with missing library classes can still be analyzed.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            fail_on_unknown_type: false,
            ..Self::default()
        }
    }

    /// Sets the method budget
    #[must_use]
    pub fn with_max_methods(mut self, max_methods: usize) -> Self {
        self.max_methods = Some(max_methods);
        self
    }

    /// Sets the time budget
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Enables or disables parallel body lifting
    #[must_use]
    pub fn with_parallel_lifting(mut self, parallel: bool) -> Self {
        self.parallel_lifting = parallel;
        self
    }

    /// Enables or disables dispatch memoization
    #[must_use]
    pub fn with_memoization(mut self, memoize: bool) -> Self {
        self.memoize_dispatch = memoize;
        self
    }

    /// Returns `true` if neither a method nor a time budget is set
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.max_methods.is_none() && self.deadline.is_none()
    }
}
