//! The D-Bus argument model and marshalling engine: signature parsing, the
//! typed [`node::ArgumentNode`] tree, and the scalar/container wire codecs,
//! decoupled from any transport (§1).
//!
//! This crate implements only the core described in the spec this binding
//! was extracted from: it never opens a connection, never dispatches a
//! method call, and never parses introspection XML. Those are the
//! enclosing binding's job; this crate is handed a [`wire::WireRead`]/
//! [`wire::WireWrite`] cursor (or, via [`callframe`], a whole call record)
//! and turns wire bytes into [`host::HostValue`] and back.

pub mod callframe;
pub mod error;
pub mod host;
pub mod node;
pub mod proxy;
pub mod signature;
pub mod strings;
pub mod wire;

pub use error::{ArgError, SignatureError, TypeMismatchError};
pub use host::HostValue;
pub use node::{ArgumentNode, HostClass, NodeKind};
pub use proxy::{Endpoint, Proxy};
pub use signature::{validate_single, split_signature, ArgType, SignatureIter};
pub use wire::{ContainerGuard, VecIter, VecIterAppend, WireRead, WireScalar, WireWrite};
