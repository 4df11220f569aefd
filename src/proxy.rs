//! The external `Proxy` collaborator (§3.3, §4.5) and the notion of scope it
//! defines.
//!
//! Grounded in the teacher crate's `Proxy<'a, S>` (`dbus/src/proxy.rs`),
//! which wraps a destination bus name, an object path and a sender/endpoint
//! handle. The connection/transport itself (the `S`/`sender` side of that
//! struct) is out of scope for this core (§1); only the identity fields
//! needed for scope comparison and sibling construction are modeled here.

use std::fmt;

use crate::strings::ObjectPathBuf;

/// Identifies the D-Bus connection/endpoint a proxy is bound to. This core
/// never dials a connection itself (§1 Non-goals: no I/O); it only needs to
/// tell two endpoint handles apart, so this is an opaque, comparable token
/// supplied by the transport layer.
pub trait Endpoint: fmt::Debug {
    /// Two endpoint handles are the same endpoint iff this returns equal
    /// values for both.
    fn endpoint_id(&self) -> u64;
}

/// A client-side handle identifying a remote object: which service, on
/// which endpoint, at which path.
#[derive(Clone, Debug)]
pub struct Proxy<E> {
    /// The D-Bus service name this proxy talks to, e.g. `org.freedesktop.DBus`.
    pub service: String,
    /// The connection/endpoint handle.
    pub endpoint: E,
    /// The object path within that service.
    pub path: ObjectPathBuf,
}

impl<E: Endpoint + Clone> Proxy<E> {
    pub fn new(service: impl Into<String>, endpoint: E, path: ObjectPathBuf) -> Proxy<E> {
        Proxy { service: service.into(), endpoint, path }
    }

    /// Two proxies share scope iff they name the same service on the same
    /// endpoint; object paths are only meaningful to compare within one
    /// scope (glossary: "Scope (of a proxy)").
    pub fn has_same_scope_as(&self, other: &Proxy<E>) -> bool {
        self.service == other.service && self.endpoint.endpoint_id() == other.endpoint.endpoint_id()
    }

    /// Creates a sibling proxy at a different path, same service and
    /// endpoint. Used by [`crate::node::scalar`] when boxing an object-path
    /// scalar read off the wire (§4.3: "the codec does not allocate an
    /// orphan path string").
    pub fn sibling(&self, path: ObjectPathBuf) -> Proxy<E> {
        Proxy { service: self.service.clone(), endpoint: self.endpoint.clone(), path }
    }
}
