//! Heap-allocated string objects.
//!
//! The only object kind this language produces is an interned string.
//! `ObjString` is always reached through an `Rc`, and the VM's intern
//! [`Table`](crate::table::Table) is the single owner that keeps every
//! distinct string alive for the life of the VM (see that module's docs
//! for how bulk teardown falls out of that ownership shape for free).

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// FNV-1a, 32-bit offset basis and prime, as specified for the intern
/// table's hash function.
const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Hash raw bytes with FNV-1a.
pub fn fnv1a_hash(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// An interned, immutable string.
///
/// Two `ObjString`s with equal bytes are never simultaneously live: the
/// intern table guarantees at most one heap allocation per distinct byte
/// sequence, so identity (`Rc::ptr_eq`) and content equality coincide.
#[derive(Debug)]
pub struct ObjString {
    pub bytes: Box<str>,
    pub hash: u32,
}

impl ObjString {
    pub fn new(bytes: impl Into<Box<str>>) -> Rc<ObjString> {
        let bytes = bytes.into();
        let hash = fnv1a_hash(bytes.as_bytes());
        Rc::new(ObjString { bytes, hash })
    }

    pub fn as_str(&self) -> &str {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Display for ObjString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.bytes)
    }
}

/// Byte-content equality, independent of interning. Used only by the
/// table's probe sequence while a candidate string isn't yet interned
/// (see [`Table::find_key`](crate::table::Table::find_key)).
impl PartialEq for ObjString {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.bytes == other.bytes
    }
}
impl Eq for ObjString {}

impl Hash for ObjString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a_matches_known_vector() {
        // Empty string hashes to the offset basis itself.
        assert_eq!(fnv1a_hash(b""), FNV_OFFSET_BASIS);
    }

    #[test]
    fn fnv1a_is_deterministic_and_sensitive_to_every_byte() {
        assert_eq!(fnv1a_hash(b"foo"), fnv1a_hash(b"foo"));
        assert_ne!(fnv1a_hash(b"foo"), fnv1a_hash(b"fop"));
        assert_ne!(fnv1a_hash(b"foo"), fnv1a_hash(b"foo "));
    }

    #[test]
    fn obj_string_round_trips_bytes() {
        let s = ObjString::new("hello");
        assert_eq!(s.as_str(), "hello");
        assert_eq!(s.len(), 5);
        assert_eq!(s.hash, fnv1a_hash(b"hello"));
    }
}
