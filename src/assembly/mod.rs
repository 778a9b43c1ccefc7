//! Reference lifting layer.
//!
//! The call graph core consumes lifted [`MethodBody`](crate::metadata::method::MethodBody)
//! values through the [`BodyProvider`](crate::metadata::method::BodyProvider) trait and does not
//! care where they come from. This module is a small, self-contained producer of such bodies: a
//! closed [`Instruction`] set, an [`InstructionAssembler`] to write instruction streams, the
//! [`lift`] function turning a stream into a body, and [`ProgramBodies`], a provider that lifts
//! registered streams lazily and caches the result.
//!
//! # Key Components
//!
//! - [`Instruction`] - One variant per instruction category
//! - [`InstructionAssembler`] - Fluent builder for instruction streams
//! - [`lift`] - Instruction stream to [`MethodBody`](crate::metadata::method::MethodBody)
//! - [`ProgramBodies`] - Lazy, thread-safe [`BodyProvider`](crate::metadata::method::BodyProvider)

mod assembler;
mod instruction;
mod lifter;

pub use assembler::InstructionAssembler;
pub use instruction::{FlowType, Instruction};
pub use lifter::{lift, ProgramBodies};
