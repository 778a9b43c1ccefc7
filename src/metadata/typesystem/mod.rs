//! Class and interface hierarchy of the analyzed program.
//!
//! This module holds the type side of the data model:
//!
//! - [`TypeDef`] - a class or interface with its direct links and own method table
//! - [`TypeHierarchy`] - the immutable, arena-backed registry queried during resolution
//! - [`TypeHierarchyBuilder`] - the registration API for loaders, validating invariants on build
//!
//! # Invariants
//!
//! The superclass relation forms a forest of single-rooted chains; the interface
//! implements/extends relation forms a DAG (diamonds allowed, cycles rejected). Both are fixed
//! once [`TypeHierarchyBuilder::build`] succeeds.
//!
//! # Examples
//!
//! ```rust
//! use callscope::metadata::{
//!     method::MethodModifiers,
//!     signature::MethodSignature,
//!     typesystem::{TypeFlags, TypeHierarchyBuilder},
//! };
//!
//! let mut builder = TypeHierarchyBuilder::new();
//! let readable = builder.add_interface("Read")?;
//! let writable = builder.add_interface("Write")?;
//! let stream = builder.add_class("Stream", TypeFlags::empty())?;
//! builder.implements(stream, readable)?;
//! builder.implements(stream, writable)?;
//! builder.add_method(readable, MethodSignature::new("print", "()V"), MethodModifiers::empty())?;
//!
//! let hierarchy = builder.build()?;
//! assert_eq!(hierarchy.all_superinterfaces(stream)?.len(), 2);
//! # Ok::<(), callscope::Error>(())
//! ```

mod base;
mod builder;
mod registry;

pub use base::{TypeDef, TypeFlags, TypeKind};
pub use builder::TypeHierarchyBuilder;
pub use registry::{SuperclassChain, TypeHierarchy};
