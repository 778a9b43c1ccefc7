// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![allow(clippy::too_many_arguments)]

//! # callscope
//!
//! Whole-program call graph construction for managed, JVM-like bytecode with interface default
//! methods.
//!
//! Given a class/interface hierarchy, lifted method bodies and a set of entry points,
//! `callscope` computes which methods are reachable and which call edges connect them. Virtual
//! and interface calls are resolved with Class Hierarchy Analysis, following the platform's
//! method selection rules exactly where default methods are involved:
//!
//! - a method inherited through the class chain always beats an interface default
//! - among interface defaults, the most specific one wins
//! - an abstract re-declaration in a sub-interface revokes an inherited default
//! - two unrelated defaults are reported as ambiguous, never guessed
//! - `Interface.super.m()` calls resolve to exactly the named default
//!
//! ## Features
//!
//! - **Deterministic** - identical inputs give identical graphs, reachable sets and diagnostics
//! - **Non-fatal resolution** - unresolved, ambiguous and missing targets are recorded as
//!   diagnostics while the rest of the program is still discovered
//! - **Parallel lifting** - method bodies of a worklist wave are lifted on the rayon pool
//! - **Budgets** - method and time budgets yield an explicitly incomplete result
//!
//! ## Quick Start
//!
//! ```rust
//! use callscope::prelude::*;
//!
//! let print = MethodSignature::new("print", "()V");
//!
//! let mut types = TypeHierarchyBuilder::new();
//! let readable = types.add_interface("Read")?;
//! let writable = types.add_interface("Write")?;
//! let main_class = types.add_class("Main", TypeFlags::empty())?;
//! types.implements(main_class, readable)?;
//! types.implements(main_class, writable)?;
//! let read_print = types.add_method(readable, print.clone(), MethodModifiers::empty())?;
//! let write_print = types.add_method(writable, print.clone(), MethodModifiers::empty())?;
//! let own_print = types.add_method(main_class, print.clone(), MethodModifiers::empty())?;
//! let main = types.add_method(main_class, MethodSignature::new("main", "()V"), MethodModifiers::STATIC)?;
//! let hierarchy = types.build()?;
//!
//! let mut bodies = ProgramBodies::new();
//! bodies.register(
//!     &hierarchy,
//!     main,
//!     InstructionAssembler::new()
//!         .new_object(main_class)
//!         .invoke(DispatchKind::Virtual, main_class, print.clone())
//!         .ret()
//!         .finish(),
//! )?;
//! bodies.register(
//!     &hierarchy,
//!     own_print,
//!     InstructionAssembler::new()
//!         .invoke(DispatchKind::Special, readable, print.clone())
//!         .invoke(DispatchKind::Special, writable, print)
//!         .ret()
//!         .finish(),
//! )?;
//!
//! let result = CallGraphBuilder::new(&hierarchy, &bodies).build(&[main])?;
//! assert!(result.reachable.contains(own_print));
//! assert!(result.reachable.contains(read_print));
//! assert!(result.reachable.contains(write_print));
//! assert!(result.diagnostics.is_empty());
//! # Ok::<(), callscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types
//! - [`metadata`] - Identifiers, signatures, methods and the type hierarchy
//! - [`analysis`] - Method resolution and call graph construction
//! - [`assembly`] - A small reference instruction set and lifter producing method bodies
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! Builds emit [`tracing`](https://docs.rs/tracing) events: one span per build, debug events per
//! wave and processed method, trace events per inserted edge, warnings for every recorded
//! diagnostic and an info summary at the end. Install any subscriber to see them.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use callscope::prelude::*;
///
/// let hierarchy = TypeHierarchyBuilder::new().build()?;
/// let bodies = ProgramBodies::new();
/// let result = CallGraphBuilder::new(&hierarchy, &bodies).build(&[])?;
/// assert!(result.reachable.is_empty());
/// # Ok::<(), callscope::Error>(())
/// ```
pub mod prelude;

/// Identifiers, signatures, methods and the class/interface hierarchy
///
/// # Key Components
///
/// - [`metadata::token`] - Arena identifiers [`metadata::token::TypeId`] and [`metadata::token::MethodId`]
/// - [`metadata::signature`] - Owner-independent method signatures
/// - [`metadata::method`] - Method declarations, lifted bodies and the body provider boundary
/// - [`metadata::typesystem`] - The immutable type hierarchy and its builder
pub mod metadata;

/// Method resolution and call graph construction
pub mod analysis;

/// Reference instruction set, assembler and lifter
pub mod assembly;

/// `callscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `callscope` Error type
///
/// The main error type for all operations in this crate.
///
/// # Examples
///
/// ```rust
/// use callscope::{Error, metadata::typesystem::{TypeFlags, TypeHierarchyBuilder}};
///
/// let mut builder = TypeHierarchyBuilder::new();
/// builder.add_class("Main", TypeFlags::empty())?;
/// match builder.add_class("Main", TypeFlags::empty()) {
///     Err(Error::DuplicateType(name)) => assert_eq!(name, "Main"),
///     other => panic!("unexpected: {other:?}"),
/// }
/// # Ok::<(), callscope::Error>(())
/// ```
pub use error::Error;
