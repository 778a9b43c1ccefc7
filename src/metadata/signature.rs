//! Owner-independent method signatures.
//!
//! A [`MethodSignature`] is the name plus descriptor of a method, without the declaring type.
//! Overriding, default-method inheritance and call-site targets are all matched on this value:
//! two methods override each other exactly when their signatures are equal.

use std::fmt;

use crate::Result;

/// Name of instance constructors.
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Name of static type initializers.
pub const STATIC_INITIALIZER_NAME: &str = "<clinit>";

/// The name and descriptor of a method, independent of its owner.
///
/// # Examples
///
/// ```rust
/// use callscope::metadata::signature::MethodSignature;
///
/// let sig = MethodSignature::new("print", "()V");
/// assert_eq!(sig.to_string(), "print()V");
///
/// let parsed = MethodSignature::parse("print()V")?;
/// assert_eq!(parsed, sig);
/// # Ok::<(), callscope::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodSignature {
    name: String,
    descriptor: String,
}

impl MethodSignature {
    /// Creates a signature from its name and descriptor.
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }

    /// Parses the compact `name(params)ret` form.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the text has no parameter list or an empty name.
    pub fn parse(text: &str) -> Result<Self> {
        let Some(open) = text.find('(') else {
            return Err(malformed_error!("Signature '{}' has no descriptor", text));
        };
        if open == 0 {
            return Err(malformed_error!("Signature '{}' has no name", text));
        }
        if !text[open..].contains(')') {
            return Err(malformed_error!("Signature '{}' is unterminated", text));
        }

        Ok(Self::new(&text[..open], &text[open..]))
    }

    /// Creates the signature of a no-argument instance constructor.
    #[must_use]
    pub fn constructor() -> Self {
        Self::new(CONSTRUCTOR_NAME, "()V")
    }

    /// Returns the method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the descriptor, e.g. `(I)V`.
    #[must_use]
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Returns `true` for instance constructors.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }

    /// Returns `true` for static type initializers.
    #[must_use]
    pub fn is_static_initializer(&self) -> bool {
        self.name == STATIC_INITIALIZER_NAME
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.descriptor)
    }
}
