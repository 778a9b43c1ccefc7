use thiserror::Error;

use crate::metadata::token::{MethodId, TypeId};

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Errors are reserved for conditions that invalidate a whole analysis run: a hierarchy that
/// violates its structural invariants, a query against a type the loader never registered, or a
/// body-lifting collaborator that failed. Per-call-site resolution failures are *not* errors; they
/// are recorded as [`crate::analysis::Diagnostic`] values and the run continues.
///
/// # Error Categories
///
/// ## Hierarchy Construction
/// - [`Error::DuplicateType`] - Two types registered under the same qualified name
/// - [`Error::DuplicateMethod`] - A signature declared twice on the same type
/// - [`Error::HierarchyCycle`] - Superclass or interface relation is cyclic
/// - [`Error::Malformed`] - Any other invariant violation (kind mismatch, modifier conflict)
///
/// ## Lookup
/// - [`Error::UnknownType`] - Hierarchy query on an unregistered type
/// - [`Error::UnknownMethod`] - Query on an unregistered method
///
/// ## Collaborators
/// - [`Error::BodyUnavailable`] - The body provider failed to lift a method
///
/// # Examples
///
/// ```rust
/// use callscope::{Error, metadata::{token::TypeId, typesystem::TypeHierarchyBuilder}};
///
/// let hierarchy = TypeHierarchyBuilder::new().build()?;
/// match hierarchy.superclass_chain(TypeId::new(7)) {
///     Err(Error::UnknownType(id)) => println!("not registered: {id}"),
///     Err(e) => println!("other error: {e}"),
///     Ok(_) => unreachable!(),
/// }
/// # Ok::<(), callscope::Error>(())
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A hierarchy query referenced a type that was never registered.
    ///
    /// This points at a defect in the loader that populated the hierarchy. The call graph
    /// builder treats it as fatal unless configured otherwise.
    #[error("Unknown type - {0}")]
    UnknownType(TypeId),

    /// A query referenced a method that was never registered.
    #[error("Unknown method - {0}")]
    UnknownMethod(MethodId),

    /// Two types were registered under the same qualified name.
    #[error("Duplicate type - {0}")]
    DuplicateType(String),

    /// A type declares the same signature more than once.
    #[error("Duplicate method - {owner} declares {signature} more than once")]
    DuplicateMethod {
        /// Qualified name of the declaring type
        owner: String,
        /// The repeated signature
        signature: String,
    },

    /// The superclass chain or the interface graph contains a cycle through the named type.
    #[error("Cyclic hierarchy through {0}")]
    HierarchyCycle(String),

    /// The hierarchy handed to the core violates one of its invariants.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// The body-lifting collaborator failed to materialize a method body.
    #[error("Body of {method} unavailable: {message}")]
    BodyUnavailable {
        /// The method whose body was requested
        method: MethodId,
        /// Collaborator supplied reason
        message: String,
    },
}
