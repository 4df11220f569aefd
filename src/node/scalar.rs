//! `ScalarCodec`: boxing (unmarshal) and unboxing (marshal) of the twelve
//! D-Bus scalar types to and from [`HostValue`] (§4.3).
//!
//! Grounded in the teacher crate's `arg::basic_impl` (`dbus/src/arg/basic_impl.rs`),
//! which implements `Arg`/`Get`/`Append` per primitive type over the same
//! 64-bit transfer convention this module uses through [`WireScalar`]. Two
//! scalar codes need more than the transfer slot: `o` constructs a sibling
//! [`Proxy`] (§4.3, grounded in `Proxy::path`) and `g` constructs a fresh,
//! detached [`ArgumentNode`] (grounded in `Signature::as_str` parsed back
//! through `dbus::arg::Iter`'s own recursive descent).

use crate::error::ArgError;
use crate::host::HostValue;
use crate::node::{ArgumentNode, HostClass};
use crate::proxy::{Endpoint, Proxy};
use crate::signature::ArgType;
use crate::strings::ObjectPathBuf;
use crate::wire::{WireRead, WireScalar, WireWrite};

/// The host class a given scalar D-Bus type boxes to (§3.2 `hostClass`,
/// §4.3's unbox table).
pub fn host_class_of(t: ArgType) -> HostClass {
    match t {
        ArgType::Byte | ArgType::Int16 | ArgType::UInt16 | ArgType::Int32 | ArgType::UInt32 | ArgType::Int64 | ArgType::UInt64 => {
            HostClass::IntegerNumber
        }
        ArgType::Boolean => HostClass::Boolean,
        ArgType::Double => HostClass::FloatingPoint,
        ArgType::String => HostClass::StringLike,
        ArgType::ObjectPath => HostClass::Proxy,
        ArgType::Signature => HostClass::SignatureObject,
        // Recognized as a scalar code but not implemented (§3.1): a unix-fd
        // never reaches a host class of its own.
        ArgType::UnixFd => HostClass::None,
        _ => HostClass::None,
    }
}

/// Boxes the scalar value at the read cursor into a [`HostValue`] (§4.3
/// "box"). `current_proxy` is the enclosing proxy, needed only to
/// construct a sibling for `o` (object path); every other scalar ignores
/// it. Does not advance the cursor — callers `next()` it themselves, per
/// `MessageIterator`'s contract.
pub fn box_scalar<E: Endpoint + Clone, R: WireRead>(
    node: &ArgumentNode,
    reader: &R,
    current_proxy: Option<&Proxy<E>>,
) -> Result<HostValue<E>, ArgError> {
    let found = reader.arg_type().ok_or(ArgError::WireTypeMismatch(crate::error::TypeMismatchError {
        expected: node.dbus_type,
        found: node.dbus_type,
    }))?;
    if found != node.dbus_type {
        return Err(ArgError::WireTypeMismatch(crate::error::TypeMismatchError {
            expected: node.dbus_type,
            found,
        }));
    }
    let raw = reader
        .get_basic()
        .ok_or(ArgError::HostTypeMismatch { slot: "scalar transfer slot" })?;

    Ok(match node.dbus_type {
        ArgType::Byte => HostValue::Byte(expect_i64(&raw)? as u8),
        ArgType::Boolean => HostValue::Bool(expect_i64(&raw)? != 0),
        ArgType::Int16 => HostValue::Int16(expect_i64(&raw)? as i16),
        ArgType::UInt16 => HostValue::UInt16(expect_i64(&raw)? as u16),
        ArgType::Int32 => HostValue::Int32(expect_i64(&raw)? as i32),
        ArgType::UInt32 => HostValue::UInt32(expect_i64(&raw)? as u32),
        ArgType::Int64 => HostValue::Int64(expect_i64(&raw)?),
        ArgType::UInt64 => HostValue::UInt64(expect_i64(&raw)? as u64),
        ArgType::UnixFd => return Err(ArgError::HostTypeMismatch { slot: "unix-fd is recognized but not implemented" }),
        ArgType::Double => HostValue::Double(raw.as_f64().ok_or(ArgError::HostTypeMismatch { slot: "f64" })?),
        ArgType::String => HostValue::Str(expect_str(&raw)?.to_string()),
        ArgType::ObjectPath => {
            let path = ObjectPathBuf::new(expect_str(&raw)?.to_string())
                .map_err(ArgError::UnrepresentableValue)?;
            let proxy = current_proxy
                .ok_or(ArgError::HostTypeMismatch { slot: "no enclosing proxy to bind object path to" })?
                .sibling(path);
            HostValue::ObjectPath(proxy)
        }
        ArgType::Signature => {
            let boxed = ArgumentNode::named_from_signature(expect_str(&raw)?, None)?;
            HostValue::Signature(Box::new(boxed))
        }
        _ => return Err(ArgError::HostTypeMismatch { slot: "not a scalar type" }),
    })
}

/// Unboxes a [`HostValue`] back onto the write cursor (§4.3 "unbox").
pub fn unbox_scalar<E: Endpoint + Clone, W: WireWrite>(
    node: &ArgumentNode,
    value: &HostValue<E>,
    writer: &mut W,
) -> Result<(), ArgError> {
    let slot = match node.dbus_type {
        ArgType::Byte | ArgType::Boolean | ArgType::Int16 | ArgType::UInt16 | ArgType::Int32 | ArgType::UInt32
        | ArgType::Int64 | ArgType::UInt64 => WireScalar::I64(
            value
                .as_i64()
                .ok_or(ArgError::HostTypeMismatch { slot: "expected an integer-like host value" })?,
        ),
        ArgType::UnixFd => return Err(ArgError::HostTypeMismatch { slot: "unix-fd is recognized but not implemented" }),
        ArgType::Double => WireScalar::F64(
            value.as_f64().ok_or(ArgError::HostTypeMismatch { slot: "expected a floating-point host value" })?,
        ),
        ArgType::String => WireScalar::Str(
            value
                .as_str()
                .ok_or(ArgError::HostTypeMismatch { slot: "expected a string host value" })?
                .to_string(),
        ),
        ArgType::ObjectPath => match value {
            HostValue::ObjectPath(p) => WireScalar::Str(p.path.as_str().to_string()),
            _ => return Err(ArgError::HostTypeMismatch { slot: "expected an object-path host value" }),
        },
        ArgType::Signature => match value {
            HostValue::Signature(n) => WireScalar::Str(n.signature()),
            _ => return Err(ArgError::HostTypeMismatch { slot: "expected a signature host value" }),
        },
        _ => return Err(ArgError::HostTypeMismatch { slot: "not a scalar type" }),
    };
    writer.append_basic(slot)
}

fn expect_i64(raw: &WireScalar) -> Result<i64, ArgError> {
    raw.as_i64().ok_or(ArgError::HostTypeMismatch { slot: "i64 transfer slot" })
}

fn expect_str(raw: &WireScalar) -> Result<&str, ArgError> {
    raw.as_str().ok_or(ArgError::HostTypeMismatch { slot: "string transfer slot" })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::wire::{VecIter, VecIterAppend};

    #[derive(Clone, Debug, PartialEq)]
    struct FakeEndpoint(u64);
    impl Endpoint for FakeEndpoint {
        fn endpoint_id(&self) -> u64 {
            self.0
        }
    }

    fn proxy() -> Proxy<FakeEndpoint> {
        Proxy::new("org.example.Foo", FakeEndpoint(1), ObjectPathBuf::new("/a").unwrap())
    }

    #[test]
    fn box_and_unbox_integer_round_trips() {
        let node = ArgumentNode::from_signature("u").unwrap();
        let mut w = VecIterAppend::new();
        let v: HostValue<FakeEndpoint> = HostValue::UInt32(7);
        unbox_scalar(&node, &v, &mut w).unwrap();
        let tokens = w.into_tokens();
        let r = VecIter::new(&tokens).with_scalar_hint(ArgType::UInt32);
        let boxed = box_scalar(&node, &r, None).unwrap();
        assert_eq!(boxed, v);
    }

    #[test]
    fn box_object_path_binds_to_current_proxy() {
        let node = ArgumentNode::from_signature("o").unwrap();
        let mut w = VecIterAppend::new();
        w.append_basic(WireScalar::Str("/b".into())).unwrap();
        let tokens = w.into_tokens();
        let r = VecIter::new(&tokens).with_scalar_hint(ArgType::ObjectPath);
        let p = proxy();
        let boxed = box_scalar::<FakeEndpoint, _>(&node, &r, Some(&p)).unwrap();
        match boxed {
            HostValue::ObjectPath(sibling) => {
                assert!(sibling.has_same_scope_as(&p));
                assert_eq!(sibling.path.as_str(), "/b");
            }
            _ => panic!("expected ObjectPath"),
        }
    }

    #[test]
    fn box_object_path_without_proxy_fails() {
        let node = ArgumentNode::from_signature("o").unwrap();
        let mut w = VecIterAppend::new();
        w.append_basic(WireScalar::Str("/b".into())).unwrap();
        let tokens = w.into_tokens();
        let r = VecIter::new(&tokens).with_scalar_hint(ArgType::ObjectPath);
        let result = box_scalar::<FakeEndpoint, _>(&node, &r, None);
        assert!(result.is_err());
    }

    #[test]
    fn box_signature_builds_fresh_node() {
        let node = ArgumentNode::from_signature("g").unwrap();
        let mut w = VecIterAppend::new();
        w.append_basic(WireScalar::Str("a{sv}".into())).unwrap();
        let tokens = w.into_tokens();
        let r = VecIter::new(&tokens).with_scalar_hint(ArgType::Signature);
        let boxed = box_scalar::<FakeEndpoint, _>(&node, &r, None).unwrap();
        match boxed {
            HostValue::Signature(n) => assert_eq!(n.signature(), "a{sv}"),
            _ => panic!("expected Signature"),
        }
    }

    #[test]
    fn unix_fd_is_recognized_but_errors_cleanly() {
        let node = ArgumentNode::from_signature("h").unwrap();
        assert_eq!(host_class_of(ArgType::UnixFd), HostClass::None);
        let mut w = VecIterAppend::new();
        w.append_basic(WireScalar::I64(3)).unwrap();
        let tokens = w.into_tokens();
        let r = VecIter::new(&tokens).with_scalar_hint(ArgType::UnixFd);
        assert!(box_scalar::<FakeEndpoint, _>(&node, &r, None).is_err());

        let mut w2 = VecIterAppend::new();
        let v: HostValue<FakeEndpoint> = HostValue::UInt32(3);
        assert!(unbox_scalar(&node, &v, &mut w2).is_err());
    }

    #[test]
    fn wire_type_mismatch_is_reported() {
        let node = ArgumentNode::from_signature("u").unwrap();
        let mut w = VecIterAppend::new();
        w.append_basic(WireScalar::Str("not a u32".into())).unwrap();
        let tokens = w.into_tokens();
        let r = VecIter::new(&tokens).with_scalar_hint(ArgType::String);
        let result = box_scalar::<FakeEndpoint, _>(&node, &r, None);
        assert!(matches!(result, Err(ArgError::WireTypeMismatch(_))));
    }
}
