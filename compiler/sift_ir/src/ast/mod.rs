//! AST node definitions.
//!
//! One module per node category, mirroring the language surface:
//!
//! - [`decl`]: constants, types, variables, aliases, parameters, bindings
//! - [`types`]: ranges, enums, scalarsets, arrays, records, named types
//! - [`expr`]: expressions and operators
//! - [`stmt`]: statements
//! - [`rule`]: quantifiers, properties, rules
//! - [`model`]: functions and the top-level model
//!
//! Derived operations that need to chase child indices (widths, bounds,
//! constant folding, structural equality) are implemented on the
//! [`Ast`](crate::Ast) arena in the corresponding module.

mod decl;
mod expr;
mod model;
mod rule;
mod stmt;
mod types;

pub use decl::{decl_kind_noun, BindingType, Decl, DeclKind};
pub use expr::{BinaryOp, Expr, ExprKind, QuantKind, UnaryOp};
pub use model::{Function, Model};
pub use rule::{Property, PropertyCategory, Quantifier, QuantifierKind, Rule, RuleKind};
pub use stmt::{IfClause, PutArg, Stmt, StmtKind, SwitchCase};
pub use types::{TypeExpr, TypeKind};
