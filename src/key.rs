//! Key wrappers with canonical hashing.
//!
//! A map key must hash identically for every pair of values its equality
//! treats as equal. `f64` has no such `Hash` impl in Rust, and its textual
//! form is not a safe stand-in: distinct values can print alike and equal
//! values (`0.0`, `-0.0`) print differently. [`FloatKey`] fixes a single
//! canonical bit pattern per value and hashes and compares on that.

use std::hash::{Hash, Hasher};

/// Canonical bit pattern shared by every NaN.
const CANONICAL_NAN: u64 = 0x7ff8_0000_0000_0000;

/// An `f64` usable as a map key.
///
/// Equality and hashing use the value's bit pattern after canonicalization:
/// `-0.0` equals `0.0`, every NaN equals every other NaN, and any two other
/// values are equal only if they are bit-for-bit identical.
///
/// ```rust
/// use concmap::{ConcurrentMap, FloatKey};
///
/// let map = ConcurrentMap::new();
/// map.set(FloatKey::new(0.1), "a");
/// map.set(FloatKey::new(0.1000000000000001), "b");
/// assert_eq!(map.get(&FloatKey::new(0.1)), Some("a"));
/// assert_eq!(map.len(), 2);
/// ```
#[derive(Clone, Copy)]
pub struct FloatKey(f64);

impl FloatKey {
    /// Wrap a float.
    pub fn new(value: f64) -> Self {
        FloatKey(value)
    }

    /// The wrapped float, as given.
    pub fn get(self) -> f64 {
        self.0
    }

    /// Bit pattern used for equality and hashing.
    #[inline]
    pub fn canonical_bits(self) -> u64 {
        if self.0.is_nan() {
            CANONICAL_NAN
        } else if self.0 == 0.0 {
            0
        } else {
            self.0.to_bits()
        }
    }
}

impl PartialEq for FloatKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_bits() == other.canonical_bits()
    }
}

impl Eq for FloatKey {}

impl Hash for FloatKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_bits().hash(state);
    }
}

impl From<f64> for FloatKey {
    fn from(value: f64) -> Self {
        FloatKey(value)
    }
}

impl std::fmt::Debug for FloatKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FloatKey({:?})", self.0)
    }
}

impl std::fmt::Display for FloatKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}
