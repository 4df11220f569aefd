//! Property-based coverage of the signature round-trip law (§8 P3) and the
//! scalar box/unbox identity law (§8 P5), via `quickcheck`.
//!
//! Grounded in the sibling pack example `dbus-native`, the one pure
//! (no-FFI) D-Bus wire crate in the retrieval pack that reaches for
//! `quickcheck` as a dev-dependency; ordinary unit tests stay inline in
//! each module's trailing `mod test` per the teacher crate's own
//! convention (§4.7.4), and only these two laws — which quantify over a
//! whole family of inputs rather than a handful of examples — live here.

use dbus_argtree::wire::{VecIter, VecIterAppend, WireScalar};
use dbus_argtree::{ArgType, ArgumentNode, Endpoint, HostValue, Proxy};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

/// A signature string guaranteed to validate as exactly one complete D-Bus
/// type, generated with bounded recursion depth so shrinking/generation
/// terminates.
#[derive(Clone, Debug)]
struct ValidSignature(String);

const SCALARS: &[char] = &['y', 'b', 'n', 'q', 'i', 'u', 'x', 't', 'd', 's', 'o', 'g'];

/// Picks an index `< n` using only the portable `Arbitrary` surface (no
/// assumption about `Gen`'s internal RNG beyond what quickcheck guarantees
/// for `u8`/`bool`), so this stays stable across quickcheck point releases.
fn pick(g: &mut Gen, n: usize) -> usize {
    (u8::arbitrary(g) as usize) % n
}

fn gen_signature(g: &mut Gen, depth: u32) -> String {
    // At depth 0, only scalars and `v` are offered, so every recursive
    // descent is guaranteed to bottom out.
    let kind = if depth == 0 { pick(g, 2) } else { pick(g, 5) };
    match kind {
        0 => SCALARS[pick(g, SCALARS.len())].to_string(),
        1 => "v".to_string(),
        2 => format!("a{}", gen_signature(g, depth - 1)),
        3 => {
            let n = 1 + pick(g, 3);
            let mut s = String::from("(");
            for _ in 0..n {
                s.push_str(&gen_signature(g, depth - 1));
            }
            s.push(')');
            s
        }
        4 => {
            let key = SCALARS[pick(g, SCALARS.len())];
            format!("a{{{}{}}}", key, gen_signature(g, depth - 1))
        }
        _ => unreachable!(),
    }
}

impl Arbitrary for ValidSignature {
    fn arbitrary(g: &mut Gen) -> ValidSignature {
        ValidSignature(gen_signature(g, 3))
    }
}

#[quickcheck]
fn prop_signature_round_trip(sig: ValidSignature) -> bool {
    let node = ArgumentNode::from_signature(&sig.0).expect("generator only emits valid signatures");
    node.signature() == sig.0
}

#[derive(Clone, Debug)]
struct FakeEndpoint(u64);
impl Endpoint for FakeEndpoint {
    fn endpoint_id(&self) -> u64 {
        self.0
    }
}
impl PartialEq for FakeEndpoint {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

fn box_unbox_round_trip(code: ArgType, value: HostValue<FakeEndpoint>) -> bool {
    let node = ArgumentNode::from_signature(&code.to_string()).unwrap();
    let mut w = VecIterAppend::new();
    dbus_argtree::node::scalar::unbox_scalar(&node, &value, &mut w).unwrap();
    let tokens = w.into_tokens();
    let r = VecIter::new(&tokens).with_scalar_hint(code);
    let boxed = dbus_argtree::node::scalar::box_scalar::<FakeEndpoint, _>(&node, &r, None).unwrap();
    boxed == value
}

#[quickcheck]
fn prop_box_identity_byte(v: u8) -> bool {
    box_unbox_round_trip(ArgType::Byte, HostValue::Byte(v))
}

#[quickcheck]
fn prop_box_identity_int16(v: i16) -> bool {
    box_unbox_round_trip(ArgType::Int16, HostValue::Int16(v))
}

#[quickcheck]
fn prop_box_identity_uint16(v: u16) -> bool {
    box_unbox_round_trip(ArgType::UInt16, HostValue::UInt16(v))
}

#[quickcheck]
fn prop_box_identity_int32(v: i32) -> bool {
    box_unbox_round_trip(ArgType::Int32, HostValue::Int32(v))
}

#[quickcheck]
fn prop_box_identity_uint32(v: u32) -> bool {
    box_unbox_round_trip(ArgType::UInt32, HostValue::UInt32(v))
}

#[quickcheck]
fn prop_box_identity_int64(v: i64) -> bool {
    box_unbox_round_trip(ArgType::Int64, HostValue::Int64(v))
}

#[quickcheck]
fn prop_box_identity_uint64(v: u64) -> bool {
    box_unbox_round_trip(ArgType::UInt64, HostValue::UInt64(v))
}

#[quickcheck]
fn prop_box_identity_bool(v: bool) -> bool {
    box_unbox_round_trip(ArgType::Boolean, HostValue::Bool(v))
}

#[quickcheck]
fn prop_box_identity_string(v: String) -> bool {
    box_unbox_round_trip(ArgType::String, HostValue::Str(v))
}

#[test]
fn box_identity_int64_max() {
    assert!(box_unbox_round_trip(ArgType::Int64, HostValue::Int64(i64::MAX)));
}

#[test]
fn box_identity_byte_255() {
    assert!(box_unbox_round_trip(ArgType::Byte, HostValue::Byte(255)));
}

#[test]
fn signature_box_preserves_nested_signature() {
    let node = ArgumentNode::from_signature("g").unwrap();
    let mut w = VecIterAppend::new();
    w.append_basic(WireScalar::Str("(ss)".into())).unwrap();
    let tokens = w.into_tokens();
    let r = VecIter::new(&tokens).with_scalar_hint(ArgType::Signature);
    let boxed = dbus_argtree::node::scalar::box_scalar::<FakeEndpoint, _>(&node, &r, None).unwrap();
    match boxed {
        HostValue::Signature(n) => assert_eq!(n.signature(), "(ss)"),
        _ => panic!("expected Signature"),
    }
}

#[test]
fn object_path_boxing_yields_sibling_proxy() {
    use dbus_argtree::strings::ObjectPathBuf;
    let node = ArgumentNode::from_signature("o").unwrap();
    let proxy = Proxy::new("org.example.Svc", FakeEndpoint(1), ObjectPathBuf::new("/a").unwrap());
    let mut w = VecIterAppend::new();
    w.append_basic(WireScalar::Str("/".into())).unwrap();
    let tokens = w.into_tokens();
    let r = VecIter::new(&tokens).with_scalar_hint(ArgType::ObjectPath);
    let boxed = dbus_argtree::node::scalar::box_scalar::<FakeEndpoint, _>(&node, &r, Some(&proxy)).unwrap();
    match boxed {
        HostValue::ObjectPath(p) => {
            assert!(p.has_same_scope_as(&proxy));
            assert_eq!(p.path.as_str(), "/");
        }
        _ => panic!("expected ObjectPath"),
    }
}
