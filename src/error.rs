//! Error types for the argument engine.
//!
//! Grounded in the teacher crate's hand-rolled, dependency-free error style
//! (`dbus::Error`, `dbus::arg::TypeMismatchError`): small enums/structs with
//! manual `Display` and `std::error::Error` impls and `From` conversions
//! between them, rather than a derive-macro crate.

use std::fmt;

use crate::signature::ArgType;

/// Why a signature string failed to parse (feeds into [`ArgError::MalformedSignature`]).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SignatureError {
    /// The signature (or a sub-signature reached via recursion) was empty.
    Empty,
    /// A byte did not correspond to any recognized D-Bus type code.
    UnknownCode(char),
    /// The string validated as more than one complete type (I4).
    MultipleTypes,
    /// A `(` or `{` was never closed.
    UnbalancedContainer(char),
    /// A struct or dict-entry had no member types between its delimiters.
    EmptyContainer,
    /// A dict-entry's first (key) child was a container rather than a
    /// scalar (I1: dict-entry keys must be a basic type).
    ComplexDictKey,
}

impl fmt::Display for SignatureError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SignatureError::Empty => write!(f, "empty type signature"),
            SignatureError::UnknownCode(c) => write!(f, "unknown D-Bus type code '{}'", c),
            SignatureError::MultipleTypes => write!(f, "signature contains more than one complete type"),
            SignatureError::UnbalancedContainer(open) => write!(f, "unbalanced container starting with '{}'", open),
            SignatureError::EmptyContainer => write!(f, "struct or dict entry with no member types"),
            SignatureError::ComplexDictKey => write!(f, "complex type used as dict entry key"),
        }
    }
}

impl std::error::Error for SignatureError {}

/// A wire type did not match the type statically expected by the argument tree.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TypeMismatchError {
    pub expected: ArgType,
    pub found: ArgType,
}

impl fmt::Display for TypeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "expected D-Bus type {}, found {}", self.expected, self.found)
    }
}

impl std::error::Error for TypeMismatchError {}

/// The five-way error taxonomy of the argument engine (spec §7).
#[derive(Clone, Debug, PartialEq)]
pub enum ArgError {
    /// Construction rejected an invalid/multi-type signature, wrong
    /// container arity, or a non-basic dict-entry key.
    MalformedSignature(SignatureError),
    /// On unmarshal, the wire type differed from the static tree type.
    WireTypeMismatch(TypeMismatchError),
    /// The call-frame bridge found a slot whose declared host type did not
    /// match the node's expected host type.
    HostTypeMismatch { slot: &'static str },
    /// `unbox` could not coerce a host value to the required wire scalar.
    UnrepresentableValue(String),
    /// The underlying `WireWrite` refused to append; fatal for the current
    /// marshal call only.
    OutOfWireSpace,
}

impl fmt::Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ArgError::MalformedSignature(e) => write!(f, "malformed signature: {}", e),
            ArgError::WireTypeMismatch(e) => write!(f, "wire type mismatch: {}", e),
            ArgError::HostTypeMismatch { slot } => write!(f, "host type mismatch at slot {}", slot),
            ArgError::UnrepresentableValue(msg) => write!(f, "value cannot be represented on the wire: {}", msg),
            ArgError::OutOfWireSpace => write!(f, "underlying message iterator is out of space"),
        }
    }
}

impl std::error::Error for ArgError {}

impl From<SignatureError> for ArgError {
    fn from(e: SignatureError) -> ArgError {
        ArgError::MalformedSignature(e)
    }
}

impl From<TypeMismatchError> for ArgError {
    fn from(e: TypeMismatchError) -> ArgError {
        ArgError::WireTypeMismatch(e)
    }
}
