//! `ContainerCodec`: boxing (unmarshal) and unboxing (marshal) of the four
//! container kinds — array, dictionary, struct, variant — plus the single
//! entry point, [`box_value`]/[`unbox_value`], that dispatches a whole
//! [`ArgumentNode`] by its [`NodeKind`] (§4.4).
//!
//! Grounded in the teacher crate's `arg::msgarg` container impls
//! (`dbus/src/arg/msgarg.rs`: the `Array`/`Dict`/tuple `Get`/`Append` impls)
//! for the array/struct/dict-entry shapes, and in `arg::variantstruct_impl`
//! (`dbus/src/arg/variantstruct_impl.rs`) for the variant's
//! open-with-embedded-signature convention. The dict's first-seen-wins
//! duplicate policy and the null-marker substitution are this spec's own
//! additions (§4.4.1, §4.4.2), grounded in the design notes of §9.

use crate::error::ArgError;
use crate::host::HostValue;
use crate::node::{scalar, ArgumentNode, NodeKind};
use crate::proxy::Endpoint;
use crate::signature::ArgType;
use crate::wire::{ContainerGuard, WireRead, WireWrite};

fn check_arg_type<R: WireRead>(node: &ArgumentNode, reader: &R) -> Result<ArgType, ArgError> {
    let found = reader.arg_type().ok_or(ArgError::WireTypeMismatch(crate::error::TypeMismatchError {
        expected: node.dbus_type,
        found: node.dbus_type,
    }))?;
    if found != node.dbus_type {
        return Err(ArgError::WireTypeMismatch(crate::error::TypeMismatchError { expected: node.dbus_type, found }));
    }
    Ok(found)
}

/// Boxes whatever the node describes — scalar or container — off the wire
/// at the read cursor (§4.3/§4.4 "box"). `current_proxy` is threaded down
/// unchanged; it is only ever consulted by the scalar codec's `o` case.
pub fn box_value<E: Endpoint + Clone + PartialEq, R: WireRead>(
    node: &ArgumentNode,
    reader: &R,
    current_proxy: Option<&crate::proxy::Proxy<E>>,
) -> Result<HostValue<E>, ArgError> {
    match node.kind {
        NodeKind::Scalar => scalar::box_scalar(node, reader, current_proxy),
        NodeKind::Array => box_array(node, reader, current_proxy),
        NodeKind::Dictionary => box_dictionary(node, reader, current_proxy),
        NodeKind::Struct => box_struct(node, reader, current_proxy),
        NodeKind::DictEntry => Err(ArgError::HostTypeMismatch { slot: "dict-entry cannot be boxed outside its array" }),
        NodeKind::Variant => box_variant(node, reader, current_proxy),
    }
}

/// Unboxes a host value back onto the wire at the write cursor (§4.3/§4.4 "unbox").
pub fn unbox_value<E: Endpoint + Clone + PartialEq, W: WireWrite>(
    node: &ArgumentNode,
    value: &HostValue<E>,
    writer: &mut W,
) -> Result<(), ArgError> {
    match node.kind {
        NodeKind::Scalar => scalar::unbox_scalar(node, value, writer),
        NodeKind::Array => unbox_array(node, value, writer),
        NodeKind::Dictionary => unbox_dictionary(node, value, writer),
        NodeKind::Struct => unbox_struct(node, value, writer),
        NodeKind::DictEntry => Err(ArgError::HostTypeMismatch { slot: "dict-entry cannot be unboxed outside its array" }),
        NodeKind::Variant => unbox_variant(node, value, writer),
    }
}

/// Boxes one array/dict-entry element, substituting the null-marker
/// (§8 P8) for the one shape this core can actually produce a nil result
/// for: an object-path scalar with no enclosing proxy to bind to. Every
/// other failure — a genuine wire type mismatch, an unparseable embedded
/// signature — is a hard error and still propagates, since those are
/// programmer/peer contract violations (§7), not "this element is nil".
fn box_element<E: Endpoint + Clone + PartialEq, R: WireRead>(
    node: &ArgumentNode,
    reader: &R,
    current_proxy: Option<&crate::proxy::Proxy<E>>,
) -> Result<HostValue<E>, ArgError> {
    if node.kind == NodeKind::Scalar && node.dbus_type == ArgType::ObjectPath && current_proxy.is_none() {
        return Ok(HostValue::Null);
    }
    box_value(node, reader, current_proxy)
}

fn box_array<E: Endpoint + Clone + PartialEq, R: WireRead>(
    node: &ArgumentNode,
    reader: &R,
    current_proxy: Option<&crate::proxy::Proxy<E>>,
) -> Result<HostValue<E>, ArgError> {
    check_arg_type(node, reader)?;
    let elem = &node.children()[0];
    let mut items = Vec::new();
    if let Some(mut sub) = reader.recurse() {
        while sub.arg_type().is_some() {
            // Step 3 of §4.4.1: a wire element that cannot itself be
            // boxed is recorded as the null-marker rather than aborting
            // the whole array, unless the failure is a hard wire
            // mismatch (handled the same way — propagated — since an
            // array element's type never legitimately varies).
            items.push(box_element(elem, &sub, current_proxy)?);
            if !sub.next() {
                break;
            }
        }
    }
    Ok(HostValue::Array(elem.signature(), items))
}

fn unbox_array<E: Endpoint + Clone + PartialEq, W: WireWrite>(
    node: &ArgumentNode,
    value: &HostValue<E>,
    writer: &mut W,
) -> Result<(), ArgError> {
    let elem = &node.children()[0];
    let items = match value {
        HostValue::Array(_, items) => items,
        HostValue::Null => {
            let guard = ContainerGuard::open(writer, ArgType::Array, Some(&elem.signature()))?;
            return guard.finish();
        }
        _ => return Err(ArgError::HostTypeMismatch { slot: "expected an array host value" }),
    };
    let mut guard = ContainerGuard::open(writer, ArgType::Array, Some(&elem.signature()))?;
    for item in items {
        unbox_value(elem, item, guard.writer())?;
    }
    guard.finish()
}

fn box_dictionary<E: Endpoint + Clone + PartialEq, R: WireRead>(
    node: &ArgumentNode,
    reader: &R,
    current_proxy: Option<&crate::proxy::Proxy<E>>,
) -> Result<HostValue<E>, ArgError> {
    check_arg_type(node, reader)?;
    let entry = &node.children()[0];
    let key_node = &entry.children()[0];
    let val_node = &entry.children()[1];
    let mut pairs: Vec<(HostValue<E>, HostValue<E>)> = Vec::new();
    if let Some(mut sub) = reader.recurse() {
        while let Some(found) = sub.arg_type() {
            // §4.4.2: the same framing as the array, plus the additional
            // assertion that the wire element type actually is a
            // dict-entry — an array element's type is already checked by
            // `box_element`/`box_value`'s own dispatch, but a dict-entry
            // is consumed by recursing directly into the entry cursor, so
            // nothing else catches a masquerading wire array-of-struct.
            if found != ArgType::DictEntry {
                return Err(ArgError::WireTypeMismatch(crate::error::TypeMismatchError {
                    expected: ArgType::DictEntry,
                    found,
                }));
            }
            let entry_sub = sub
                .recurse()
                .ok_or(ArgError::WireTypeMismatch(crate::error::TypeMismatchError { expected: ArgType::DictEntry, found: ArgType::DictEntry }))?;
            let key = box_element(key_node, &entry_sub, current_proxy)?;
            let mut entry_sub = entry_sub;
            if !entry_sub.next() {
                return Err(ArgError::WireTypeMismatch(crate::error::TypeMismatchError {
                    expected: val_node.dbus_type,
                    found: key_node.dbus_type,
                }));
            }
            let val = box_element(val_node, &entry_sub, current_proxy)?;
            // First-seen-wins duplicate key policy (§4.4.2).
            if !pairs.iter().any(|(k, _)| k == &key) {
                pairs.push((key, val));
            }
            if !sub.next() {
                break;
            }
        }
    }
    Ok(HostValue::Mapping(key_node.signature(), val_node.signature(), pairs))
}

fn unbox_dictionary<E: Endpoint + Clone + PartialEq, W: WireWrite>(
    node: &ArgumentNode,
    value: &HostValue<E>,
    writer: &mut W,
) -> Result<(), ArgError> {
    let entry = &node.children()[0];
    let key_node = &entry.children()[0];
    let val_node = &entry.children()[1];
    let elem_sig = entry.signature();
    let pairs = match value {
        HostValue::Mapping(_, _, pairs) => pairs,
        HostValue::Null => {
            let guard = ContainerGuard::open(writer, ArgType::Array, Some(&elem_sig))?;
            return guard.finish();
        }
        _ => return Err(ArgError::HostTypeMismatch { slot: "expected a mapping host value" }),
    };
    let mut guard = ContainerGuard::open(writer, ArgType::Array, Some(&elem_sig))?;
    for (key, val) in pairs {
        let mut entry_guard = ContainerGuard::open(guard.writer(), ArgType::DictEntry, None)?;
        unbox_value(key_node, key, entry_guard.writer())?;
        unbox_value(val_node, val, entry_guard.writer())?;
        entry_guard.finish()?;
    }
    guard.finish()
}

fn box_struct<E: Endpoint + Clone + PartialEq, R: WireRead>(
    node: &ArgumentNode,
    reader: &R,
    current_proxy: Option<&crate::proxy::Proxy<E>>,
) -> Result<HostValue<E>, ArgError> {
    check_arg_type(node, reader)?;
    let mut sub = reader.recurse().ok_or(ArgError::WireTypeMismatch(crate::error::TypeMismatchError {
        expected: ArgType::Struct,
        found: ArgType::Struct,
    }))?;
    let mut items = Vec::with_capacity(node.children().len());
    let mut children = node.children().iter();
    let first = children.next().expect("struct invariant: at least one child (I2)");
    items.push(box_value(first, &sub, current_proxy)?);
    for child in children {
        if !sub.next() {
            return Err(ArgError::WireTypeMismatch(crate::error::TypeMismatchError { expected: child.dbus_type, found: first.dbus_type }));
        }
        items.push(box_value(child, &sub, current_proxy)?);
    }
    Ok(HostValue::Struct(items))
}

fn unbox_struct<E: Endpoint + Clone + PartialEq, W: WireWrite>(
    node: &ArgumentNode,
    value: &HostValue<E>,
    writer: &mut W,
) -> Result<(), ArgError> {
    let items = match value {
        HostValue::Struct(items) => items,
        _ => return Err(ArgError::HostTypeMismatch { slot: "expected a struct host value" }),
    };
    if items.len() != node.children().len() {
        return Err(ArgError::UnrepresentableValue(format!(
            "struct arity mismatch: node has {} fields, value has {}",
            node.children().len(),
            items.len()
        )));
    }
    let mut guard = ContainerGuard::open(writer, ArgType::Struct, None)?;
    for (child, item) in node.children().iter().zip(items.iter()) {
        unbox_value(child, item, guard.writer())?;
    }
    guard.finish()
}

fn box_variant<E: Endpoint + Clone + PartialEq, R: WireRead>(
    node: &ArgumentNode,
    reader: &R,
    current_proxy: Option<&crate::proxy::Proxy<E>>,
) -> Result<HostValue<E>, ArgError> {
    check_arg_type(node, reader)?;
    let sig = reader
        .variant_signature()
        .ok_or(ArgError::HostTypeMismatch { slot: "variant missing its embedded signature" })?;
    // A fresh, detached, transient node (§4.4.4): built only for the
    // duration of this call, then discarded once the contained value has
    // been boxed.
    let transient = ArgumentNode::named_from_signature(sig, None)?;
    let sub = reader.recurse().ok_or(ArgError::HostTypeMismatch { slot: "variant missing its contained value" })?;
    let inner = box_value(&transient, &sub, current_proxy)?;
    Ok(HostValue::Variant(Box::new(inner)))
}

fn unbox_variant<E: Endpoint + Clone + PartialEq, W: WireWrite>(
    _node: &ArgumentNode,
    value: &HostValue<E>,
    writer: &mut W,
) -> Result<(), ArgError> {
    let inner = match value {
        HostValue::Variant(inner) => inner.as_ref(),
        _ => return Err(ArgError::HostTypeMismatch { slot: "expected a variant host value" }),
    };
    let sig = inner.infer_signature();
    let transient = ArgumentNode::named_from_signature(&sig, None)?;
    let mut guard = ContainerGuard::open(writer, ArgType::Variant, Some(&sig))?;
    unbox_value(&transient, inner, guard.writer())?;
    guard.finish()
}
