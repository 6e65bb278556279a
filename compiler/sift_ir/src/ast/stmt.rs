//! Statement nodes.

use super::rule::Property;
use crate::{DeclId, ExprId, FunctionId, Name, QuantifierId, Span, StmtId};

/// A statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// One arm of an `if` statement. The final clause of an `if` may have no
/// condition, in which case it is the `else` arm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IfClause {
    pub condition: Option<ExprId>,
    pub body: Vec<StmtId>,
    pub span: Span,
}

/// One arm of a `switch` statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwitchCase {
    pub matches: Vec<ExprId>,
    pub body: Vec<StmtId>,
}

/// Argument to a `put` statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PutArg {
    Value(ExprId),
    Text(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StmtKind {
    /// `lhs := rhs`
    Assignment { lhs: ExprId, rhs: ExprId },

    /// `clear x` - zero the designated bits, making every contained value
    /// undefined.
    Clear { target: ExprId },

    /// `undefine x` - same bit effect as `clear`; kept distinct for
    /// intent.
    Undefine { target: ExprId },

    /// A call to a procedure (a function used for effect).
    Call {
        name: Name,
        referent: Option<FunctionId>,
        args: Vec<ExprId>,
    },

    /// `return` / `return expr`. Value-carrying returns are only legal
    /// inside functions.
    Return { value: Option<ExprId> },

    /// `for q do body endfor`
    For {
        quantifier: QuantifierId,
        body: Vec<StmtId>,
    },

    /// `if c1 then ... elsif c2 then ... else ... endif`
    If { clauses: Vec<IfClause> },

    /// `switch e case a, b: ... else ... endswitch`
    Switch {
        value: ExprId,
        cases: Vec<SwitchCase>,
        default: Vec<StmtId>,
    },

    /// `while c do body endwhile`
    While {
        condition: ExprId,
        body: Vec<StmtId>,
    },

    /// `alias a: e do body endalias`
    Alias {
        aliases: Vec<DeclId>,
        body: Vec<StmtId>,
    },

    /// `error "message"` - unconditionally report an error on this path.
    Error { message: String },

    /// `assert e "msg"` / `assume e "msg"` embedded in a body.
    Property { property: Property, message: String },

    /// `put e` / `put "text"`
    Put { arg: PutArg },
}
