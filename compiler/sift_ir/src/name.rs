//! Interned identifiers.

use rustc_hash::FxHashMap;
use std::fmt;

/// An interned identifier: a `u32` index into a [`StringInterner`].
///
/// Equality and hashing are O(1); the text is recovered with
/// [`StringInterner::lookup`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Name(u32);

impl Name {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

/// String interner mapping identifier text to compact [`Name`]s.
///
/// The generator is single-threaded, so no interior mutability is needed:
/// the lexer interns with `&mut`, later phases only look names up.
#[derive(Default)]
pub struct StringInterner {
    strings: Vec<String>,
    table: FxHashMap<String, Name>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `s`, returning the existing `Name` if already present.
    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(&name) = self.table.get(s) {
            return name;
        }
        let name = Name(u32::try_from(self.strings.len()).unwrap_or(u32::MAX));
        self.strings.push(s.to_owned());
        self.table.insert(s.to_owned(), name);
        name
    }

    /// Resolve a `Name` back to its text.
    #[inline]
    pub fn lookup(&self, name: Name) -> &str {
        &self.strings[name.index()]
    }

    /// Look up a string that may already be interned, without interning it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.table.get(s).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn intern_is_idempotent() {
        let mut interner = StringInterner::new();
        let a = interner.intern("state");
        let b = interner.intern("state");
        assert_eq!(a, b);
        assert_eq!(interner.lookup(a), "state");
    }

    #[test]
    fn distinct_strings_distinct_names() {
        let mut interner = StringInterner::new();
        let a = interner.intern("x");
        let b = interner.intern("y");
        assert_ne!(a, b);
        assert_eq!(interner.get("x"), Some(a));
        assert_eq!(interner.get("z"), None);
    }
}
