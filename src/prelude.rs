//! # callscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the callscope library.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all callscope operations
pub use crate::Error;

/// The result type used throughout callscope
pub use crate::Result;

// ================================================================================================
// Program Model
// ================================================================================================

/// Arena identifiers
pub use crate::metadata::token::{MethodId, TypeId};

/// Method signatures
pub use crate::metadata::signature::MethodSignature;

/// Method declarations and bodies
pub use crate::metadata::method::{BodyProvider, Method, MethodBody, MethodModifiers};

/// The type hierarchy
pub use crate::metadata::typesystem::{
    TypeDef, TypeFlags, TypeHierarchy, TypeHierarchyBuilder, TypeKind,
};

// ================================================================================================
// Call Graph
// ================================================================================================

/// Call graph construction and results
pub use crate::analysis::{
    CallEdge, CallGraph, CallGraphBuilder, CallGraphConfig, CallGraphResult, CallSiteRef,
    Diagnostic, DiagnosticKind, Diagnostics, DispatchKind, InvocationSite, MethodResolver,
    ReachableMethods,
};

// ================================================================================================
// Lifting
// ================================================================================================

/// Reference instruction set and lifter
pub use crate::assembly::{lift, Instruction, InstructionAssembler, ProgramBodies};
