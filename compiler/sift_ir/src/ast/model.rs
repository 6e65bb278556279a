//! Functions and the top-level model.

use crate::{DeclId, FunctionId, Name, RuleId, Span, StmtId, TypeId};

/// A function or procedure definition.
///
/// Procedures are functions with no return type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    pub name: Name,
    /// `Param` declarations, in order.
    pub params: Vec<DeclId>,
    pub return_type: Option<TypeId>,
    /// Local declarations.
    pub decls: Vec<DeclId>,
    pub body: Vec<StmtId>,
    pub span: Span,
}

/// The whole model: ordered declarations, functions and rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Model {
    pub decls: Vec<DeclId>,
    pub functions: Vec<FunctionId>,
    pub rules: Vec<RuleId>,
    /// Total packed width of the state vector, set by reindex.
    pub state_size_bits: u64,
    pub span: Span,
}
