//! Whole-program call graph construction.
//!
//! This module builds the call graph of a program in a managed, JVM-like bytecode model where
//! interfaces may carry default method implementations.
//!
//! # Architecture
//!
//! Construction is a worklist over methods, starting at the entry points. Each reached method
//! body is scanned for invocation sites and every site is resolved to its possible targets.
//! Virtual and interface calls use Class Hierarchy Analysis (CHA): every instantiable subtype of
//! the declared type is a possible receiver, and for each receiver the platform's method
//! selection rules pick one target.
//!
//! Those rules are where default methods matter: a method inherited from the class chain always
//! beats an interface default, the most specific default wins among interfaces, a sub-interface
//! can revoke an inherited default by re-declaring it abstract, and two unrelated defaults are
//! reported as ambiguous instead of being guessed.
//!
//! # Components
//!
//! - [`CallGraphBuilder`]: The worklist driver producing a [`CallGraphResult`]
//! - [`MethodResolver`]: Call target resolution and per-receiver dispatch
//! - [`CallGraph`]: The resolved edges with forward, reverse and per-site indices
//! - [`ReachableMethods`]: The methods discovered from the entry points
//! - [`Diagnostics`]: Resolution anomalies recorded during the run
//! - [`CallGraphConfig`]: Budgets and strictness
//!
//! # Example
//!
//! ```rust
//! use callscope::prelude::*;
//!
//! let print = MethodSignature::new("print", "()V");
//! let main_sig = MethodSignature::new("main", "()V");
//!
//! let mut types = TypeHierarchyBuilder::new();
//! let hello = types.add_interface("HelloWorld")?;
//! let main_class = types.add_class("Main", TypeFlags::empty())?;
//! types.implements(main_class, hello)?;
//! let main = types.add_method(main_class, main_sig, MethodModifiers::STATIC)?;
//! let default_print = types.add_method(hello, print.clone(), MethodModifiers::empty())?;
//! let hierarchy = types.build()?;
//!
//! let mut bodies = ProgramBodies::new();
//! bodies.register(
//!     &hierarchy,
//!     main,
//!     InstructionAssembler::new()
//!         .new_object(main_class)
//!         .invoke(DispatchKind::Interface, hello, print)
//!         .ret()
//!         .finish(),
//! )?;
//!
//! let result = CallGraphBuilder::new(&hierarchy, &bodies).build(&[main])?;
//! assert!(result.reachable.contains(default_print));
//! # Ok::<(), callscope::Error>(())
//! ```

mod builder;
mod config;
mod diagnostics;
mod graph;
mod reachability;
mod resolution;
mod site;

pub use builder::{CallGraphBuilder, CallGraphResult};
pub use config::CallGraphConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use graph::{CallEdge, CallGraph, CallGraphStats};
pub use reachability::ReachableMethods;
pub use resolution::{DispatchOutcome, MethodResolver, Resolution, ResolverStats};
pub use site::{CallSiteRef, DispatchKind, InvocationSite};
