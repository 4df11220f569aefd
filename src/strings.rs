//! Validated string wrappers for the two D-Bus scalar types whose wire
//! representation is "a string with extra syntax rules": object paths and
//! signatures.
//!
//! Grounded in the teacher crate's `strings.rs`, which wraps these in a
//! `dstring_wrapper!` macro backed by libdbus's own validation functions.
//! This core has no FFI boundary (§3.3: it operates over an abstract
//! iterator only), so validation is reimplemented in pure Rust here; the
//! `no-string-validation` feature flag is kept under the same name and for
//! the same reason — letting embedders skip the check in hot paths where
//! the string is already known-valid (e.g. echoed back from the bus).

use std::fmt;

use crate::error::SignatureError;

/// An owned, validated D-Bus object path, e.g. `/org/freedesktop/DBus`.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ObjectPathBuf(String);

impl ObjectPathBuf {
    /// Validates and wraps `s`. With the `no-string-validation` feature,
    /// syntax is not checked (the caller vouches for it).
    pub fn new<S: Into<String>>(s: S) -> Result<ObjectPathBuf, String> {
        let s = s.into();
        #[cfg(not(feature = "no-string-validation"))]
        validate_object_path(&s)?;
        Ok(ObjectPathBuf(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectPathBuf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ObjectPathBuf> for String {
    fn from(p: ObjectPathBuf) -> String {
        p.0
    }
}

#[cfg(not(feature = "no-string-validation"))]
fn validate_object_path(s: &str) -> Result<(), String> {
    if !s.starts_with('/') {
        return Err(format!("object path {:?} must start with '/'", s));
    }
    if s.len() > 1 && s.ends_with('/') {
        return Err(format!("object path {:?} must not end with '/'", s));
    }
    if s == "/" {
        return Ok(());
    }
    for element in s[1..].split('/') {
        if element.is_empty() {
            return Err(format!("object path {:?} has an empty element", s));
        }
        if !element.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
            return Err(format!("object path {:?} has an invalid element {:?}", s, element));
        }
    }
    Ok(())
}

/// An owned, validated D-Bus signature: zero or more complete types, total
/// length at most 255 bytes per the D-Bus specification.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SignatureString(String);

impl SignatureString {
    pub fn new<S: Into<String>>(s: S) -> Result<SignatureString, SignatureError> {
        let s = s.into();
        #[cfg(not(feature = "no-string-validation"))]
        {
            if s.len() > 255 {
                return Err(SignatureError::UnbalancedContainer('\0'));
            }
            crate::signature::split_signature(&s)?;
        }
        Ok(SignatureString(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignatureString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}
