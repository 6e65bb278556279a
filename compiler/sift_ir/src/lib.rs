//! sift IR - the typed model representation
//!
//! This crate contains the core data structures shared by every phase of the
//! generator:
//!
//! - Spans for source locations
//! - Interned identifiers (`Name`)
//! - The flat node arena (`Ast`) and its typed indices
//! - AST nodes for declarations, types, expressions, statements and rules
//! - The scoped symbol table used during resolution
//! - Read-only visitor traversal
//!
//! # Design
//!
//! Nodes never own other nodes directly. Every node lives in the `Ast` arena
//! and refers to its children through typed `u32` indices (`ExprId`,
//! `TypeId`, ...). Resolved references - an identifier's declaration, a named
//! type's referent - are plain `DeclId` back-references, which is sound
//! because the arena is append-only and the node graph is acyclic.
//!
//! "Cloning" a node is a value copy; structural equality is provided by the
//! arena (`Ast::expr_eq` and friends) and compares shape, not spans.

mod arena;
pub mod ast;
mod ids;
mod name;
mod span;
mod symtab;
pub mod visitor;

pub use arena::Ast;
pub use ast::{
    decl_kind_noun, BinaryOp, BindingType, Decl, DeclKind, Expr, ExprKind, Function, IfClause,
    Model, Property, PropertyCategory, PutArg, QuantKind, Quantifier, QuantifierKind, Rule,
    RuleKind, Stmt, StmtKind, SwitchCase, TypeExpr, TypeKind, UnaryOp,
};
pub use ids::{DeclId, ExprId, FunctionId, QuantifierId, RuleId, StmtId, TypeId};
pub use name::{Name, StringInterner};
pub use span::Span;
pub use symtab::SymbolTable;
