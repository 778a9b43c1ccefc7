//! Program analysis over the loaded type hierarchy.
//!
//! # Architecture
//!
//! - [`callgraph`] - Whole-program call graph construction with default-method aware dispatch
//!
//! # Usage
//!
//! ```rust
//! use callscope::analysis::{CallGraphBuilder, CallGraphConfig};
//! use callscope::metadata::{method::{MethodBody, MethodModifiers}, signature::MethodSignature};
//! use callscope::metadata::{token::MethodId, typesystem::{TypeFlags, TypeHierarchyBuilder}};
//! use std::{collections::HashMap, sync::Arc};
//!
//! let mut types = TypeHierarchyBuilder::new();
//! let app = types.add_class("App", TypeFlags::empty())?;
//! let run = types.add_method(app, MethodSignature::new("run", "()V"), MethodModifiers::STATIC)?;
//! let hierarchy = types.build()?;
//!
//! let bodies: HashMap<MethodId, Arc<MethodBody>> = HashMap::new();
//! let result = CallGraphBuilder::new(&hierarchy, &bodies)
//!     .with_config(CallGraphConfig::sequential())
//!     .build(&[run])?;
//! assert_eq!(result.reachable.len(), 1);
//! assert!(result.call_graph.is_empty());
//! # Ok::<(), callscope::Error>(())
//! ```

pub mod callgraph;

// Re-export primary types at module level
pub use callgraph::{
    CallEdge, CallGraph, CallGraphBuilder, CallGraphConfig, CallGraphResult, CallGraphStats,
    CallSiteRef, Diagnostic, DiagnosticKind, Diagnostics, DispatchKind, DispatchOutcome,
    InvocationSite, MethodResolver, ReachableMethods, Resolution, ResolverStats,
};
