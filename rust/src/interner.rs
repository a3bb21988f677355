//! String interning for resource identifiers.
//!
//! Berth identifiers are interned once per planning run so run-scoped state can
//! be indexed by a dense integer instead of hashing strings on every lookup.

use rustc_hash::FxHashMap;

/// Interned identifier (u32 for compact storage and fast hashing).
pub type IdInt = u32;

/// Maps identifier strings to dense integers in first-seen order.
#[derive(Debug, Clone)]
pub struct IdInterner {
    to_int: FxHashMap<String, IdInt>,
}

impl IdInterner {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_int: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Intern a string, returning its integer ID.
    /// If already interned, returns the existing ID.
    pub fn intern(&mut self, s: &str) -> IdInt {
        if let Some(&id) = self.to_int.get(s) {
            return id;
        }
        let id = self.to_int.len() as IdInt;
        self.to_int.insert(s.to_string(), id);
        id
    }

    /// Intern a string that must not have been seen before.
    ///
    /// Returns `None` if the string is already interned.
    pub fn intern_unique(&mut self, s: &str) -> Option<IdInt> {
        if self.to_int.contains_key(s) {
            return None;
        }
        Some(self.intern(s))
    }

    #[inline]
    pub fn get(&self, s: &str) -> Option<IdInt> {
        self.to_int.get(s).copied()
    }
}

impl Default for IdInterner {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}
