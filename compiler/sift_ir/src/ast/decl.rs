//! Declaration nodes.

use crate::{ExprId, Name, Span, TypeId};

/// A named declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decl {
    pub name: Name,
    pub kind: DeclKind,
    pub span: Span,
}

/// What a declaration introduces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeclKind {
    /// `const N: 4` - a compile-time constant.
    Const { value: ExprId },

    /// `type t: ...` - a named type.
    Type { value: TypeId },

    /// A variable. State variables live in the packed state vector at
    /// `offset` (assigned by reindex); rule/function locals and record
    /// fields have `state_variable == false` and a meaningless offset.
    Var {
        ty: TypeId,
        state_variable: bool,
        offset: u64,
    },

    /// `alias a: expr` - a name for an lvalue or value, re-evaluated at
    /// each use site.
    Alias { value: ExprId },

    /// A function parameter. `by_ref` parameters are passed as handles and
    /// writable; value parameters are read-only scalars.
    Param { ty: TypeId, by_ref: bool },

    /// A quantifier loop variable.
    Binding { ty: BindingType },

    /// A member of an enum type, usable as a constant of that type.
    EnumMember { ty: TypeId, index: u64 },
}

/// The domain of a quantifier binding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BindingType {
    /// Bound to a type's values; the binding has that type.
    Type(TypeId),
    /// Bound by explicit from/to/by expressions; the binding is a bare
    /// number with no declared type.
    Numeric,
}

impl Decl {
    /// The declared type of this declaration, if it has one.
    ///
    /// Constants and numeric bindings are untyped numbers; aliases take the
    /// type of their target expression (resolved by the arena, not here).
    pub fn declared_type(&self) -> Option<TypeId> {
        match self.kind {
            DeclKind::Var { ty, .. } | DeclKind::Param { ty, .. } | DeclKind::EnumMember { ty, .. } => {
                Some(ty)
            }
            DeclKind::Binding {
                ty: BindingType::Type(ty),
            } => Some(ty),
            _ => None,
        }
    }

    /// Whether this declaration names a state variable.
    pub fn is_state_variable(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Var {
                state_variable: true,
                ..
            }
        )
    }
}

/// Convenience for error messages: a short noun for the declaration kind.
pub fn decl_kind_noun(kind: &DeclKind) -> &'static str {
    match kind {
        DeclKind::Const { .. } => "constant",
        DeclKind::Type { .. } => "type",
        DeclKind::Var { .. } => "variable",
        DeclKind::Alias { .. } => "alias",
        DeclKind::Param { .. } => "parameter",
        DeclKind::Binding { .. } => "quantified variable",
        DeclKind::EnumMember { .. } => "enum member",
    }
}
