//! `CallFrame`: the call-frame bridge (§4.6, §6.3).
//!
//! `ArgumentNode`'s ordinary entry points (`box_value`/`unbox_value` in
//! [`crate::node::container`]) work against a caller-supplied
//! [`crate::host::HostValue`] directly. The call-frame bridge is the other
//! entry point: it reads from, or writes into, a slot of an abstract call
//! record instead, the way the teacher crate's `MethodInfo`/`PropInfo`
//! (`dbus-tree`, `dbus-crossroads`) hand each argument handler a record it
//! pulls its typed arguments out of rather than a bare value. `index = -1`
//! names the return slot, mirroring the distilled spec's convention for a
//! call record with no separate "return value" case.
//!
//! The bridge's one piece of behavior the ordinary entry points don't have
//! is the **strict type assertion**: every slot declares, ahead of time,
//! which [`HostTypeCode`] it expects, and the bridge refuses to box or
//! unbox into a slot whose declared code doesn't match — a contract
//! violation between the generated/handwritten binding glue and this
//! engine, not a wire-format problem, hence its own taxonomy member
//! (§7 `HostTypeMismatch`) distinct from `WireTypeMismatch`.

use crate::error::ArgError;
use crate::host::HostValue;
use crate::node::{container, ArgumentNode};
use crate::proxy::{Endpoint, Proxy};
use crate::signature::ArgType;
use crate::wire::{WireRead, WireWrite};

/// The index naming the return slot of a [`CallFrame`], rather than one of
/// its positional arguments (§6.3: "`index = −1` denotes the return slot").
pub const RETURN_SLOT: i32 = -1;

/// The host-type code a call-frame slot declares it expects (§4.6).
///
/// Scalars get their own fixed code — the "unboxed host-type code" of
/// §4.6 — matching the native representation [`crate::node::scalar`] boxes
/// to/from. Every container shape presents as the single `Boxed` code:
/// §4.4 already establishes that containers only ever appear to callers as
/// the generic boxed `mapping`/`sequence`/`proxy`/`variant-object` host
/// type, so there is no separate "unboxed container" representation to
/// name. `Boxed` is also what any slot — scalar or container — declares
/// when the binding has opted into boxing (the generic
/// [`HostValue`]-carrying path) instead of a native Rust type.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HostTypeCode {
    Byte,
    Bool,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Double,
    Str,
    ObjectPath,
    Signature,
    /// The generic dynamically-typed boxed representation: always what a
    /// container node expects, and what any node expects when boxing is
    /// requested.
    Boxed,
}

fn unboxed_code_of(dbus_type: ArgType) -> Option<HostTypeCode> {
    Some(match dbus_type {
        ArgType::Byte => HostTypeCode::Byte,
        ArgType::Boolean => HostTypeCode::Bool,
        ArgType::Int16 => HostTypeCode::Int16,
        ArgType::UInt16 => HostTypeCode::UInt16,
        ArgType::Int32 => HostTypeCode::Int32,
        ArgType::UInt32 => HostTypeCode::UInt32,
        ArgType::Int64 => HostTypeCode::Int64,
        ArgType::UInt64 => HostTypeCode::UInt64,
        ArgType::Double => HostTypeCode::Double,
        ArgType::String => HostTypeCode::Str,
        ArgType::ObjectPath => HostTypeCode::ObjectPath,
        ArgType::Signature => HostTypeCode::Signature,
        _ => return None,
    })
}

/// The host-type code `node` expects a call-frame slot to declare, given
/// whether the caller wants the boxed ([`HostValue`]) representation or
/// the node's own native unboxed one.
fn expected_code(node: &ArgumentNode, boxed: bool) -> HostTypeCode {
    if boxed || node.is_container() {
        return HostTypeCode::Boxed;
    }
    unboxed_code_of(node.dbus_type).unwrap_or(HostTypeCode::Boxed)
}

/// An abstract call record: read/write access to arguments by index and to
/// a return slot (§3.3), each slot declaring the host-type code it expects.
///
/// Parameterized over the proxy endpoint type, like [`HostValue`] and
/// [`Proxy`], since a boxed object-path argument carries a live `Proxy<E>`.
pub trait CallFrame<E> {
    /// The host-type code the slot at `index` declares (`RETURN_SLOT` for
    /// the return slot). `None` if no such slot exists.
    fn slot_type(&self, index: i32) -> Option<HostTypeCode>;

    /// Reads the current value of the slot at `index`, if one has been set.
    fn get_slot(&self, index: i32) -> Option<&HostValue<E>>;

    /// Writes `value` into the slot at `index`.
    fn set_slot(&mut self, index: i32, value: HostValue<E>);
}

/// `unmarshalInto`: boxes the wire value at `reader` according to `node`,
/// asserts it against the slot's declared type, and stores it into
/// `frame`'s slot at `index` (§4.6, §6.3).
pub fn unmarshal_into<E, F, R>(
    node: &ArgumentNode,
    reader: &R,
    frame: &mut F,
    index: i32,
    boxed: bool,
    current_proxy: Option<&Proxy<E>>,
) -> Result<(), ArgError>
where
    E: Endpoint + Clone + PartialEq,
    F: CallFrame<E>,
    R: WireRead,
{
    assert_slot_type(node, frame, index, boxed)?;
    let value = container::box_value(node, reader, current_proxy)?;
    frame.set_slot(index, value);
    Ok(())
}

/// `marshalFrom`: asserts `frame`'s slot at `index` against `node`'s
/// declared type, then unboxes its current value onto `writer` (§4.6, §6.3).
pub fn marshal_from<E, F, W>(
    frame: &F,
    index: i32,
    node: &ArgumentNode,
    writer: &mut W,
    boxed: bool,
) -> Result<(), ArgError>
where
    E: Endpoint + Clone + PartialEq,
    F: CallFrame<E>,
    W: WireWrite,
{
    assert_slot_type(node, frame, index, boxed)?;
    let value = frame
        .get_slot(index)
        .ok_or(ArgError::HostTypeMismatch { slot: "call-frame slot has no value set" })?;
    container::unbox_value(node, value, writer)
}

fn assert_slot_type<E, F: CallFrame<E>>(node: &ArgumentNode, frame: &F, index: i32, boxed: bool) -> Result<(), ArgError> {
    let declared = frame
        .slot_type(index)
        .ok_or(ArgError::HostTypeMismatch { slot: "call-frame index out of range" })?;
    let expected = expected_code(node, boxed);
    if declared != expected {
        return Err(ArgError::HostTypeMismatch { slot: "call-frame slot type does not match argument node" });
    }
    Ok(())
}
