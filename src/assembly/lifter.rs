//! Lifting instruction streams into [`MethodBody`] values and serving them on demand.

use std::{
    collections::{BTreeSet, HashMap},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use dashmap::DashMap;

use crate::{
    analysis::InvocationSite,
    assembly::Instruction,
    metadata::{
        method::{BodyProvider, MethodBody},
        token::{MethodId, TypeId},
        typesystem::TypeHierarchy,
    },
    Result,
};

/// Lifts an instruction stream into the body of `method`.
///
/// Every [`Instruction::Invoke`] becomes an [`InvocationSite`] whose offset is the instruction's
/// index in the stream; every [`Instruction::New`] is recorded as an allocation. Everything else
/// only contributes to the instruction count.
#[must_use]
pub fn lift(method: MethodId, instructions: &[Instruction]) -> MethodBody {
    let mut sites = Vec::new();
    let mut allocations = Vec::new();

    for (offset, instruction) in (0u32..).zip(instructions) {
        match instruction {
            Instruction::Invoke {
                kind,
                owner,
                signature,
                receivers,
            } => {
                let site = InvocationSite::new(offset, *kind, *owner, signature.clone());
                sites.push(match receivers {
                    Some(receivers) => site.with_receiver_types(receivers.clone()),
                    None => site,
                });
            }
            Instruction::New(ty) => allocations.push(*ty),
            _ => {}
        }
    }

    MethodBody::new(method, sites)
        .with_allocations(allocations)
        .with_instruction_count(instructions.len())
}

/// A [`BodyProvider`] over raw instruction streams, lifting each body on first request.
///
/// Lifted bodies are cached in a concurrent map, so a method is lifted at most once even when
/// requested from several threads at the same time.
///
/// # Examples
///
/// ```rust
/// use callscope::{
///     assembly::{InstructionAssembler, ProgramBodies},
///     metadata::{method::{BodyProvider, MethodModifiers}, signature::MethodSignature, typesystem::{TypeFlags, TypeHierarchyBuilder}},
/// };
///
/// let mut builder = TypeHierarchyBuilder::new();
/// let app = builder.add_class("App", TypeFlags::empty())?;
/// let run = builder.add_method(app, MethodSignature::new("run", "()V"), MethodModifiers::STATIC)?;
/// let hierarchy = builder.build()?;
///
/// let mut bodies = ProgramBodies::new();
/// bodies.register(&hierarchy, run, InstructionAssembler::new().construct(app).ret().finish())?;
///
/// let body = bodies.body(&hierarchy, run)?.expect("registered");
/// assert_eq!(body.sites().len(), 1);
/// assert_eq!(bodies.lift_count(), 1);
/// # Ok::<(), callscope::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct ProgramBodies {
    code: HashMap<MethodId, Vec<Instruction>>,
    lifted: DashMap<MethodId, Arc<MethodBody>>,
    lifts: AtomicUsize,
}

impl ProgramBodies {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the instruction stream of a method.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownMethod`] if `method` is not part of `hierarchy`, and
    /// [`crate::Error::Malformed`] if the method is abstract or native or already has code.
    pub fn register(
        &mut self,
        hierarchy: &TypeHierarchy,
        method: MethodId,
        instructions: Vec<Instruction>,
    ) -> Result<()> {
        let declaration = hierarchy.method(method)?;
        if declaration.is_abstract() {
            return Err(malformed_error!(
                "Abstract method {} cannot have a body",
                hierarchy.qualified_name(method)?
            ));
        }
        if declaration.is_native() {
            return Err(malformed_error!(
                "Native method {} cannot have a body",
                hierarchy.qualified_name(method)?
            ));
        }
        if self.code.contains_key(&method) {
            return Err(malformed_error!(
                "Method {} already has a body",
                hierarchy.qualified_name(method)?
            ));
        }

        self.code.insert(method, instructions);
        Ok(())
    }

    /// Returns `true` if code is registered for `method`.
    #[must_use]
    pub fn contains(&self, method: MethodId) -> bool {
        self.code.contains_key(&method)
    }

    /// Returns the number of methods with registered code.
    #[must_use]
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Returns `true` if no code is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Returns how many bodies have been lifted so far.
    #[must_use]
    pub fn lift_count(&self) -> usize {
        self.lifts.load(Ordering::Relaxed)
    }

    /// Returns every type allocated anywhere in the registered code.
    ///
    /// Suitable as input to
    /// [`CallGraphBuilder::with_instantiated_types`](crate::analysis::CallGraphBuilder::with_instantiated_types).
    #[must_use]
    pub fn instantiated_types(&self) -> BTreeSet<TypeId> {
        self.code
            .values()
            .flatten()
            .filter_map(|instruction| match instruction {
                Instruction::New(ty) => Some(*ty),
                _ => None,
            })
            .collect()
    }
}

impl BodyProvider for ProgramBodies {
    fn body(&self, _hierarchy: &TypeHierarchy, method: MethodId) -> Result<Option<Arc<MethodBody>>> {
        let Some(code) = self.code.get(&method) else {
            return Ok(None);
        };

        let body = self.lifted.entry(method).or_insert_with(|| {
            self.lifts.fetch_add(1, Ordering::Relaxed);
            Arc::new(lift(method, code))
        });
        Ok(Some(Arc::clone(body.value())))
    }
}
