//! The scoped symbol table used during resolution.

use crate::{DeclId, Name};
use rustc_hash::FxHashMap;

/// A stack of lexical scopes, each mapping a name to the declaration it
/// binds.
///
/// Lookup walks inner to outer and stops at the first scope binding the
/// name; kind checking (variable vs. type vs. constant) is the resolver's
/// job, since it has arena access.
#[derive(Default)]
pub struct SymbolTable {
    scopes: Vec<FxHashMap<Name, DeclId>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Pop the innermost scope, releasing its bindings.
    ///
    /// # Panics
    /// Panics if no scope is open; scopes are always opened and closed in
    /// matched pairs by the resolver.
    pub fn close_scope(&mut self) {
        assert!(self.scopes.pop().is_some(), "close_scope with no open scope");
    }

    /// Bind `name` in the innermost scope. Returns the declaration it
    /// shadowed *within the same scope*, if any - callers treat that as a
    /// duplicate-definition error.
    pub fn declare(&mut self, name: Name, decl: DeclId) -> Option<DeclId> {
        let scope = self
            .scopes
            .last_mut()
            .expect("declare with no open scope");
        scope.insert(name, decl)
    }

    /// Find the innermost binding of `name`.
    pub fn lookup(&self, name: Name) -> Option<DeclId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).copied())
    }

    /// Whether only the global scope is open.
    pub fn is_global_scope(&self) -> bool {
        self.scopes.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StringInterner;
    use pretty_assertions::assert_eq;

    #[test]
    fn inner_scope_shadows_outer() {
        let mut interner = StringInterner::new();
        let x = interner.intern("x");

        let mut symtab = SymbolTable::new();
        symtab.open_scope();
        assert_eq!(symtab.declare(x, DeclId::new(0)), None);
        symtab.open_scope();
        assert_eq!(symtab.declare(x, DeclId::new(1)), None);
        assert_eq!(symtab.lookup(x), Some(DeclId::new(1)));
        symtab.close_scope();
        assert_eq!(symtab.lookup(x), Some(DeclId::new(0)));
    }

    #[test]
    fn redeclaration_in_same_scope_is_reported() {
        let mut interner = StringInterner::new();
        let x = interner.intern("x");

        let mut symtab = SymbolTable::new();
        symtab.open_scope();
        assert_eq!(symtab.declare(x, DeclId::new(0)), None);
        assert_eq!(symtab.declare(x, DeclId::new(1)), Some(DeclId::new(0)));
    }

    #[test]
    fn lookup_misses_closed_scopes() {
        let mut interner = StringInterner::new();
        let x = interner.intern("x");

        let mut symtab = SymbolTable::new();
        symtab.open_scope();
        symtab.open_scope();
        symtab.declare(x, DeclId::new(7));
        symtab.close_scope();
        assert_eq!(symtab.lookup(x), None);
        assert!(symtab.is_global_scope());
    }
}
