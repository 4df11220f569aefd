//! The `ArgumentNode` tree: the data model of one complete D-Bus type,
//! built from a signature (spec §3.2, §4.2).
//!
//! The source represents node-kind upgrade via host-language class
//! swapping ("a base node becomes a container node during construction").
//! Per §9 this is realized here as a tagged variant (`NodeKind`) assigned
//! once the constructor has inspected the signature token. `ArgumentNode`
//! owns its children outright — a plain recursive tree, grounded in the
//! same shape as `message::MessageItem`'s container cases in the teacher
//! crate — rather than a parent-linked structure: the type shape a node
//! describes never needs to climb back to its parent. The one place the
//! source does climb upward — finding the enclosing proxy to resolve an
//! object-path scalar — is handled instead by threading the current proxy
//! explicitly through the box/unbox calls (see [`proxy_binding`]), which
//! keeps this struct free of any connection/endpoint type parameter.

pub mod container;
pub mod proxy_binding;
pub mod scalar;

use std::fmt;

use crate::error::{ArgError, SignatureError};
use crate::signature::{validate_single, ArgType, SignatureIter};

/// The tagged-variant node-kind formulation recommended by §9, assigned
/// once at construction from the signature token (plus, for arrays, the
/// dict-entry promotion of §4.2).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NodeKind {
    Scalar,
    Array,
    /// An array whose element is a dict-entry (§3.2 `isDictionary`, I5).
    Dictionary,
    Struct,
    DictEntry,
    Variant,
}

/// The host-type token a value of this D-Bus type boxes to (§3.2 `hostClass`).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HostClass {
    IntegerNumber,
    Boolean,
    FloatingPoint,
    StringLike,
    Proxy,
    SignatureObject,
    Sequence,
    Mapping,
    /// Variants have no static host class (§3.2, P4): it is dynamic,
    /// learned from the wire-embedded value.
    Dynamic,
    /// A standalone dict-entry (only ever a child of an array) carries no
    /// host class of its own (§8 scenario 4).
    None,
}

/// One complete D-Bus type, positioned somewhere in a signature, plus its
/// container children (§3.2). Unparameterized: a node describes shape
/// only, never an endpoint or a live value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArgumentNode {
    pub dbus_type: ArgType,
    pub name: Option<String>,
    pub kind: NodeKind,
    pub host_class: HostClass,
    children: Vec<ArgumentNode>,
}

impl ArgumentNode {
    /// `fromSignature`: validates and constructs the single complete type
    /// named by `sig` (I4: rejects anything but exactly one complete type).
    pub fn from_signature(sig: &str) -> Result<ArgumentNode, ArgError> {
        Self::named_from_signature(sig, None)
    }

    pub fn named_from_signature(sig: &str, name: Option<String>) -> Result<ArgumentNode, ArgError> {
        if !validate_single(sig) {
            return Err(ArgError::MalformedSignature(
                crate::signature::split_signature(sig).err().unwrap_or(SignatureError::MultipleTypes),
            ));
        }
        let iter = SignatureIter::new(sig);
        Self::from_iterator(&iter, name)
    }

    /// `fromIterator`: constructs a node (and its children) from a cursor
    /// already positioned at a single complete type. Used recursively for
    /// container children, and by `from_signature` for the root.
    pub fn from_iterator(iter: &SignatureIter, name: Option<String>) -> Result<ArgumentNode, ArgError> {
        let dbus_type = iter.current().ok_or(ArgError::MalformedSignature(SignatureError::Empty))?;

        if !dbus_type.is_container() {
            return Ok(ArgumentNode {
                dbus_type,
                name,
                kind: NodeKind::Scalar,
                host_class: scalar::host_class_of(dbus_type),
                children: Vec::new(),
            });
        }
        if dbus_type == ArgType::Variant {
            return Ok(ArgumentNode {
                dbus_type,
                name,
                kind: NodeKind::Variant,
                host_class: HostClass::Dynamic,
                children: Vec::new(),
            });
        }

        let kind = match dbus_type {
            ArgType::Array => NodeKind::Array,
            ArgType::Struct => NodeKind::Struct,
            ArgType::DictEntry => NodeKind::DictEntry,
            _ => unreachable!("container codes are array, struct, dict-entry or variant"),
        };

        let mut sub = iter.recurse().ok_or(ArgError::MalformedSignature(SignatureError::Empty))?;
        let mut children = Vec::new();
        loop {
            children.push(Self::from_iterator(&sub, None)?);
            if !sub.next() {
                break;
            }
        }

        match kind {
            NodeKind::Array if children.len() != 1 => {
                return Err(ArgError::MalformedSignature(SignatureError::EmptyContainer))
            }
            NodeKind::Struct if children.is_empty() => {
                return Err(ArgError::MalformedSignature(SignatureError::EmptyContainer))
            }
            NodeKind::DictEntry if children.len() != 2 => {
                return Err(ArgError::MalformedSignature(SignatureError::EmptyContainer))
            }
            // A complex (non-scalar) dict-entry key is a malformed-signature
            // rejection (§7 taxonomy item 1: "a complex dict-entry key"),
            // caught at construction time (I1) — not a marshalling-time
            // `UnrepresentableValue`, since no value has been offered yet.
            NodeKind::DictEntry if children[0].kind != NodeKind::Scalar => {
                return Err(ArgError::MalformedSignature(SignatureError::ComplexDictKey))
            }
            _ => {}
        }

        // Dict-entry promotion (§4.2, I5): classified right after the
        // array's single child has been built (two-pass construction per
        // §9 — build children first, classify the parent afterwards).
        let (kind, host_class) = if kind == NodeKind::Array && children[0].kind == NodeKind::DictEntry {
            (NodeKind::Dictionary, HostClass::Mapping)
        } else {
            (
                kind,
                match kind {
                    NodeKind::Array => HostClass::Sequence,
                    NodeKind::Struct => HostClass::Sequence,
                    NodeKind::DictEntry => HostClass::None,
                    _ => unreachable!(),
                },
            )
        };

        Ok(ArgumentNode { dbus_type, name, kind, host_class, children })
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Array | NodeKind::Dictionary | NodeKind::Struct | NodeKind::DictEntry)
    }

    pub fn is_dictionary(&self) -> bool {
        self.kind == NodeKind::Dictionary
    }

    pub fn children(&self) -> &[ArgumentNode] {
        &self.children
    }

    /// `signature()`: reconstructs the textual signature of this node
    /// (round-trip law, §6.1, §8 P3).
    pub fn signature(&self) -> String {
        match self.kind {
            NodeKind::Scalar => self.dbus_type.to_string(),
            NodeKind::Variant => "v".to_string(),
            NodeKind::Array | NodeKind::Dictionary => format!("a{}", self.children[0].signature()),
            NodeKind::Struct => {
                let mut s = String::from("(");
                for c in &self.children {
                    s.push_str(&c.signature());
                }
                s.push(')');
                s
            }
            NodeKind::DictEntry => format!("{{{}{}}}", self.children[0].signature(), self.children[1].signature()),
        }
    }
}

impl fmt::Display for ArgumentNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn p1_reject_invalid() {
        assert!(ArgumentNode::from_signature("k").is_err());
    }

    #[test]
    fn p2_reject_multi() {
        assert!(ArgumentNode::from_signature("iiu").is_err());
    }

    #[test]
    fn p3_signature_round_trip_scalars() {
        for c in "ybnqiuxtdsog".chars() {
            let node = ArgumentNode::from_signature(&c.to_string()).unwrap();
            assert_eq!(node.signature(), c.to_string());
        }
    }

    #[test]
    fn p3_signature_round_trip_containers() {
        for sig in ["as", "(iiu)", "v", "(ua{s(iu)}bv)"] {
            let node = ArgumentNode::from_signature(sig).unwrap();
            assert_eq!(node.signature(), sig);
        }
    }

    #[test]
    fn p4_host_class_array_vs_dictionary() {
        let node = ArgumentNode::from_signature("as").unwrap();
        assert_eq!(node.host_class, HostClass::Sequence);
        let node = ArgumentNode::from_signature("a{su}").unwrap();
        assert_eq!(node.host_class, HostClass::Mapping);
        assert!(node.is_dictionary());
    }

    #[test]
    fn scenario3_dictionary_detection() {
        let node = ArgumentNode::from_signature("a{su}").unwrap();
        assert_eq!(node.host_class, HostClass::Mapping);
        assert_eq!(node.children()[0].kind, NodeKind::DictEntry);
    }

    #[test]
    fn scenario4_dict_entry_has_no_host_class() {
        let node = ArgumentNode::from_signature("a{su}").unwrap();
        let entry = &node.children()[0];
        assert_eq!(entry.host_class, HostClass::None);
        assert_eq!(entry.signature(), "{su}");
    }

    #[test]
    fn rejects_complex_dict_key() {
        let err = ArgumentNode::from_signature("a{(ii)u}").unwrap_err();
        assert_eq!(err, ArgError::MalformedSignature(SignatureError::ComplexDictKey));
    }

    #[test]
    fn rejects_empty_struct() {
        assert!(ArgumentNode::from_signature("()").is_err());
    }

    #[test]
    fn variant_has_no_static_children() {
        let node = ArgumentNode::from_signature("v").unwrap();
        assert!(node.children().is_empty());
        assert_eq!(node.host_class, HostClass::Dynamic);
    }
}
