//! Fluent construction of instruction streams.

use crate::{
    analysis::DispatchKind,
    assembly::Instruction,
    metadata::{signature::MethodSignature, token::TypeId},
};

/// Builds a method's instruction stream one instruction at a time.
///
/// # Examples
///
/// ```rust
/// use callscope::{
///     analysis::DispatchKind,
///     assembly::{Instruction, InstructionAssembler},
///     metadata::{signature::MethodSignature, token::TypeId},
/// };
///
/// let code = InstructionAssembler::new()
///     .new_object(TypeId::new(3))
///     .store(1)
///     .load(1)
///     .invoke(DispatchKind::Virtual, TypeId::new(2), MethodSignature::new("print", "()V"))
///     .ret()
///     .finish();
/// assert_eq!(code.len(), 5);
/// assert_eq!(code[4], Instruction::Return);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InstructionAssembler {
    instructions: Vec<Instruction>,
}

impl InstructionAssembler {
    /// Creates an empty assembler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an arbitrary instruction.
    #[must_use]
    pub fn emit(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Appends a call of `signature` on `owner`.
    #[must_use]
    pub fn invoke(self, kind: DispatchKind, owner: TypeId, signature: MethodSignature) -> Self {
        self.emit(Instruction::Invoke {
            kind,
            owner,
            signature,
            receivers: None,
        })
    }

    /// Appends a call whose possible receiver types are known.
    #[must_use]
    pub fn invoke_with_receivers(
        self,
        kind: DispatchKind,
        owner: TypeId,
        signature: MethodSignature,
        receivers: Vec<TypeId>,
    ) -> Self {
        self.emit(Instruction::Invoke {
            kind,
            owner,
            signature,
            receivers: Some(receivers),
        })
    }

    /// Appends an allocation followed by the constructor call on the new instance.
    #[must_use]
    pub fn construct(self, class: TypeId) -> Self {
        self.new_object(class)
            .invoke(DispatchKind::Special, class, MethodSignature::constructor())
    }

    /// Appends an allocation.
    #[must_use]
    pub fn new_object(self, class: TypeId) -> Self {
        self.emit(Instruction::New(class))
    }

    /// Appends a local load.
    #[must_use]
    pub fn load(self, local: u16) -> Self {
        self.emit(Instruction::Load(local))
    }

    /// Appends a local store.
    #[must_use]
    pub fn store(self, local: u16) -> Self {
        self.emit(Instruction::Store(local))
    }

    /// Appends an array length query.
    #[must_use]
    pub fn array_length(self) -> Self {
        self.emit(Instruction::ArrayLength)
    }

    /// Appends a no-op.
    #[must_use]
    pub fn nop(self) -> Self {
        self.emit(Instruction::Nop)
    }

    /// Appends a throw.
    #[must_use]
    pub fn throw(self) -> Self {
        self.emit(Instruction::Throw)
    }

    /// Appends a return.
    #[must_use]
    pub fn ret(self) -> Self {
        self.emit(Instruction::Return)
    }

    /// Returns the number of instructions emitted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` if nothing was emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Returns the finished instruction stream.
    #[must_use]
    pub fn finish(self) -> Vec<Instruction> {
        self.instructions
    }
}
