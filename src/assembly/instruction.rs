//! Instruction model of the reference lifting layer.
//!
//! A deliberately small, closed instruction set: one variant per instruction category the call
//! graph cares about, plus the handful of non-call instructions needed to write realistic
//! method bodies in tests and benchmarks.

use std::fmt;

use crate::{
    analysis::DispatchKind,
    metadata::{signature::MethodSignature, token::TypeId},
};

/// How an instruction affects control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowType {
    /// Normal execution continues to next instruction
    Sequential,
    /// Call to another method
    Call,
    /// Returns from current method
    Return,
    /// Exception throwing
    Throw,
}

/// A single instruction of a method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Method invocation.
    Invoke {
        /// How the call dispatches.
        kind: DispatchKind,
        /// The type named by the instruction.
        owner: TypeId,
        /// The signature named by the instruction.
        signature: MethodSignature,
        /// Receiver types known to be possible at this point, if narrowed.
        receivers: Option<Vec<TypeId>>,
    },
    /// Allocation of an instance of a class.
    New(TypeId),
    /// Push a local variable.
    Load(u16),
    /// Pop into a local variable.
    Store(u16),
    /// Length of the array on top of the stack.
    ArrayLength,
    /// Return from the method.
    Return,
    /// No operation.
    Nop,
    /// Throw the exception on top of the stack.
    Throw,
}

impl Instruction {
    /// Returns the mnemonic of this instruction.
    #[must_use]
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Invoke { kind, .. } => match kind {
                DispatchKind::Virtual => "invokevirtual",
                DispatchKind::Interface => "invokeinterface",
                DispatchKind::Special => "invokespecial",
                DispatchKind::Static => "invokestatic",
            },
            Instruction::New(_) => "new",
            Instruction::Load(_) => "load",
            Instruction::Store(_) => "store",
            Instruction::ArrayLength => "arraylength",
            Instruction::Return => "return",
            Instruction::Nop => "nop",
            Instruction::Throw => "athrow",
        }
    }

    /// Returns the control flow category of this instruction.
    #[must_use]
    pub fn flow_type(&self) -> FlowType {
        match self {
            Instruction::Invoke { .. } => FlowType::Call,
            Instruction::Return => FlowType::Return,
            Instruction::Throw => FlowType::Throw,
            Instruction::New(_)
            | Instruction::Load(_)
            | Instruction::Store(_)
            | Instruction::ArrayLength
            | Instruction::Nop => FlowType::Sequential,
        }
    }

    /// Returns `true` for method invocations.
    #[must_use]
    pub fn is_invoke(&self) -> bool {
        matches!(self, Instruction::Invoke { .. })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Invoke {
                owner, signature, ..
            } => write!(f, "{} {owner}.{signature}", self.mnemonic()),
            Instruction::New(ty) => write!(f, "new {ty}"),
            Instruction::Load(local) | Instruction::Store(local) => {
                write!(f, "{} V_{local}", self.mnemonic())
            }
            _ => f.write_str(self.mnemonic()),
        }
    }
}
