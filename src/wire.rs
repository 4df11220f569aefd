//! The `MessageIterator` abstraction (§3.3, §6.2) and a small in-memory
//! reference transport implementing it.
//!
//! The teacher crate couples its `Iter`/`IterAppend` types directly to
//! libdbus's `DBusMessageIter` via FFI (`dbus/src/arg/msgarg.rs`). This core
//! is explicitly decoupled from any transport (§1 Non-goals: "No I/O; the
//! core operates purely over an abstract iterator supplied by the
//! transport"), so the same read/write shape is exposed here as two plain
//! Rust traits instead. `VecIter`/`VecIterAppend` is the reference transport
//! used by this crate's own tests and by embedders with no D-Bus daemon at
//! hand; a real binding would implement these traits over its own FFI
//! iterator instead.

use crate::error::ArgError;
use crate::signature::ArgType;

/// The 64-bit-wide transfer slot described in §4.3, widened with the two
/// pointer-sized string-bearing cases D-Bus also treats as basic types.
#[derive(Clone, Debug, PartialEq)]
pub enum WireScalar {
    I64(i64),
    F64(f64),
    Str(String),
}

impl WireScalar {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            WireScalar::I64(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            WireScalar::F64(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            WireScalar::Str(v) => Some(v),
            _ => None,
        }
    }
}

/// Read side of a `MessageIterator`: `argType`, `getBasic`, `recurse`, `next`.
pub trait WireRead: Sized {
    /// The D-Bus type at the cursor, or `None` if the cursor is past the
    /// last argument at this nesting level.
    fn arg_type(&self) -> Option<ArgType>;

    /// Reads the scalar value at the cursor without advancing. Only valid
    /// when `arg_type()` names a scalar code.
    fn get_basic(&self) -> Option<WireScalar>;

    /// For a container at the cursor, an independent cursor over its
    /// contents. `None` for scalars.
    fn recurse(&self) -> Option<Self>;

    /// When `arg_type()` is `Variant`, the signature of the single complete
    /// type embedded in the wire alongside it (the variant's self-describing
    /// signature, §4.4.4). `None` otherwise. Needed to build the transient
    /// node a variant unmarshals through, since `arg_type()` alone only
    /// reports the outer container code, not a full nested signature.
    fn variant_signature(&self) -> Option<&str>;

    /// Advances past the argument at the cursor. Returns `true` if another
    /// argument follows at this nesting level.
    fn next(&mut self) -> bool;
}

/// Write side of a `MessageIterator`: `openContainer`, `appendBasic`, `closeContainer`.
pub trait WireWrite: Sized {
    fn append_basic(&mut self, v: WireScalar) -> Result<(), ArgError>;

    /// Opens a nested container of the given kind. `signature` is the
    /// element/variant signature for arrays and variants, `None` for
    /// dict-entries and structs (§6.2).
    fn open_container(&mut self, kind: ArgType, signature: Option<&str>) -> Result<Self, ArgError>;

    /// Closes a container previously returned by `open_container`, folding
    /// its contents into `self`. `kind`/`signature` must be the same values
    /// passed to the matching `open_container` call. Every `open_container`
    /// must be matched by exactly one `close_container` on the same writer,
    /// on every exit path (§5, §8 P9) — see [`ContainerGuard`] for the RAII
    /// helper that guarantees this.
    fn close_container(&mut self, kind: ArgType, signature: Option<&str>, sub: Self) -> Result<(), ArgError>;
}

/// A scoped guard pairing one `open_container` with its `close_container`.
///
/// The source relies on exception unwinding to run the matching close when
/// marshalling a container element fails partway through (§9: "a direct
/// translation uses a scoped resource guard for the open/close pair"). This
/// is that guard: callers `open` a sub-writer, do fallible work with it
/// through [`ContainerGuard::writer`], then `finish` to close it. If the
/// guard is dropped without `finish` (an error propagated via `?`), `Drop`
/// closes the container so the open/close count never desyncs, discarding
/// any close-time error per §5 ("the error close may itself return an
/// out-of-memory indication — it is intentionally ignored").
pub struct ContainerGuard<'a, W: WireWrite> {
    parent: &'a mut W,
    kind: ArgType,
    signature: Option<String>,
    sub: Option<W>,
}

impl<'a, W: WireWrite> ContainerGuard<'a, W> {
    pub fn open(parent: &'a mut W, kind: ArgType, signature: Option<&str>) -> Result<Self, ArgError> {
        let sub = parent.open_container(kind, signature)?;
        Ok(ContainerGuard { parent, kind, signature: signature.map(String::from), sub: Some(sub) })
    }

    /// The sub-writer to append container elements to.
    pub fn writer(&mut self) -> &mut W {
        self.sub.as_mut().expect("ContainerGuard used after finish")
    }

    /// Closes the container normally, propagating a close-time error.
    pub fn finish(mut self) -> Result<(), ArgError> {
        let sub = self.sub.take().expect("ContainerGuard finished twice");
        self.parent.close_container(self.kind, self.signature.as_deref(), sub)
    }
}

impl<'a, W: WireWrite> Drop for ContainerGuard<'a, W> {
    fn drop(&mut self) {
        if let Some(sub) = self.sub.take() {
            let _ = self.parent.close_container(self.kind, self.signature.as_deref(), sub);
        }
    }
}

/// One token in the reference in-memory wire representation. A marshalled
/// message is a flat token stream; `Open`/`Close` bracket a container's
/// contents the way parentheses bracket a struct's textual signature.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Basic(WireScalar),
    Open(ArgType, Option<String>, Vec<Token>),
}

fn token_arg_type(t: &Token) -> ArgType {
    match t {
        Token::Basic(WireScalar::I64(_)) | Token::Basic(WireScalar::F64(_)) | Token::Basic(WireScalar::Str(_)) => {
            // Callers distinguish exact scalar code by context (the static
            // tree type); the token stream itself only remembers "basic".
            // Containers are the only case `arg_type` must recover exactly.
            ArgType::Byte
        }
        Token::Open(k, _, _) => *k,
    }
}

/// A read cursor over an in-memory token buffer. The reference `WireRead`.
#[derive(Clone, Debug)]
pub struct VecIter<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// When set, overrides the reported scalar arg_type (since `Token`
    /// itself doesn't carry it); set by the node that owns this cursor.
    scalar_hint: Option<ArgType>,
}

impl<'a> VecIter<'a> {
    pub fn new(tokens: &'a [Token]) -> VecIter<'a> {
        VecIter { tokens, pos: 0, scalar_hint: None }
    }

    /// Declares the exact scalar type code the next `Basic` token should be
    /// reported as. The static argument tree always knows this from its own
    /// shape, so real callers set it before reading; it only affects
    /// `arg_type()`'s return for `Token::Basic`.
    pub fn with_scalar_hint(mut self, hint: ArgType) -> Self {
        self.scalar_hint = Some(hint);
        self
    }
}

impl<'a> WireRead for VecIter<'a> {
    fn arg_type(&self) -> Option<ArgType> {
        let t = self.tokens.get(self.pos)?;
        Some(match t {
            Token::Open(k, _, _) => *k,
            Token::Basic(_) => self.scalar_hint.unwrap_or(token_arg_type(t)),
        })
    }

    fn get_basic(&self) -> Option<WireScalar> {
        match self.tokens.get(self.pos)? {
            Token::Basic(v) => Some(v.clone()),
            Token::Open(..) => None,
        }
    }

    fn recurse(&self) -> Option<VecIter<'a>> {
        match self.tokens.get(self.pos)? {
            Token::Open(_, _, inner) => Some(VecIter::new(inner)),
            Token::Basic(_) => None,
        }
    }

    fn variant_signature(&self) -> Option<&str> {
        match self.tokens.get(self.pos)? {
            Token::Open(ArgType::Variant, Some(sig), _) => Some(sig.as_str()),
            _ => None,
        }
    }

    fn next(&mut self) -> bool {
        self.pos += 1;
        self.pos < self.tokens.len()
    }
}

/// A write cursor accumulating an in-memory token buffer. The reference `WireWrite`.
#[derive(Debug, Default)]
pub struct VecIterAppend {
    tokens: Vec<Token>,
}

impl VecIterAppend {
    pub fn new() -> VecIterAppend {
        VecIterAppend { tokens: Vec::new() }
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

impl WireWrite for VecIterAppend {
    fn append_basic(&mut self, v: WireScalar) -> Result<(), ArgError> {
        self.tokens.push(Token::Basic(v));
        Ok(())
    }

    fn open_container(&mut self, _kind: ArgType, _signature: Option<&str>) -> Result<VecIterAppend, ArgError> {
        Ok(VecIterAppend::new())
    }

    fn close_container(&mut self, kind: ArgType, signature: Option<&str>, sub: VecIterAppend) -> Result<(), ArgError> {
        self.tokens.push(Token::Open(kind, signature.map(String::from), sub.tokens));
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_basic_scalar() {
        let mut w = VecIterAppend::new();
        w.append_basic(WireScalar::I64(42)).unwrap();
        let tokens = w.into_tokens();
        let r = VecIter::new(&tokens);
        assert_eq!(r.get_basic(), Some(WireScalar::I64(42)));
    }

    #[test]
    fn container_guard_closes_on_success() {
        let mut w = VecIterAppend::new();
        {
            let mut guard = ContainerGuard::open(&mut w, ArgType::Struct, None).unwrap();
            guard.writer().append_basic(WireScalar::I64(1)).unwrap();
            guard.finish().unwrap();
        }
        assert_eq!(w.tokens().len(), 1);
    }

    #[test]
    fn container_guard_closes_on_early_return() {
        fn fails(w: &mut VecIterAppend) -> Result<(), ArgError> {
            let mut guard = ContainerGuard::open(w, ArgType::Struct, None)?;
            guard.writer().append_basic(WireScalar::I64(1))?;
            Err(ArgError::OutOfWireSpace)?;
            guard.finish()
        }
        let mut w = VecIterAppend::new();
        assert!(fails(&mut w).is_err());
        // The guard's Drop still closed the container: exactly one token at
        // the top level, not zero and not a dangling open.
        assert_eq!(w.tokens().len(), 1);
    }

    #[test]
    fn recurse_and_next_over_struct() {
        let mut inner = VecIterAppend::new();
        inner.append_basic(WireScalar::I64(1)).unwrap();
        inner.append_basic(WireScalar::I64(2)).unwrap();
        let mut outer = VecIterAppend::new();
        outer.close_container(ArgType::Struct, None, inner).unwrap();
        outer.append_basic(WireScalar::Str("tail".into())).unwrap();
        let tokens = outer.into_tokens();
        let mut r = VecIter::new(&tokens);
        assert_eq!(r.arg_type(), Some(ArgType::Struct));
        let mut sub = r.recurse().unwrap();
        assert_eq!(sub.get_basic(), Some(WireScalar::I64(1)));
        assert!(sub.next());
        assert_eq!(sub.get_basic(), Some(WireScalar::I64(2)));
        assert!(!sub.next());
        assert!(r.next());
        assert_eq!(r.get_basic(), Some(WireScalar::Str("tail".into())));
    }
}
