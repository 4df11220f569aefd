//! `ProxyBinding`: how an object-path scalar finds the proxy it should
//! bind to (§4.3, §4.5).
//!
//! The source walks a node's parent chain at unmarshal time until it
//! reaches the enclosing proxy. Since [`ArgumentNode`](crate::node::ArgumentNode)
//! here is a plain, parent-free recursive tree (see the module-level note
//! in `node/mod.rs`), there is no chain to walk: the proxy a whole
//! argument is bound to is constant for every object path anywhere inside
//! it (a method call's arguments all belong to the same connection and
//! scope), so [`crate::node::container::box_value`] and
//! [`crate::node::container::unbox_value`] simply thread `current_proxy`
//! down through every recursive call unchanged. This module holds the one
//! piece of real "binding" logic left: deciding ahead of time whether a
//! node's shape can even contain an object path, so a missing proxy can be
//! reported before unmarshalling gets partway through a message (rather
//! than failing deep inside a nested container with a less legible error).

use crate::node::{ArgumentNode, NodeKind};
use crate::signature::ArgType;

/// True if `node`, or anything nested inside it, is an object-path scalar
/// — i.e. boxing a wire value of this shape will need a proxy to bind to.
pub fn contains_object_path(node: &ArgumentNode) -> bool {
    match node.kind {
        NodeKind::Scalar => node.dbus_type == ArgType::ObjectPath,
        // A variant's contents are unknown until its embedded signature is
        // read off the wire, so this is necessarily a conservative "maybe".
        NodeKind::Variant => true,
        NodeKind::Array | NodeKind::Dictionary | NodeKind::Struct | NodeKind::DictEntry => {
            node.children().iter().any(contains_object_path)
        }
    }
}
