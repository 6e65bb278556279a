//! Expression nodes and their derived operations.

use crate::{Ast, BindingType, DeclKind, ExprId, FunctionId, Name, QuantifierId, Span, TypeId};

/// An expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprKind {
    /// A decimal literal. Untyped; bounds come from context.
    Number(i64),

    /// A reference to a declaration, resolved during symbol resolution.
    Ident {
        name: Name,
        referent: Option<crate::DeclId>,
    },

    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },

    Unary {
        op: UnaryOp,
        operand: ExprId,
    },

    /// `cond ? lhs : rhs`
    Ternary {
        cond: ExprId,
        lhs: ExprId,
        rhs: ExprId,
    },

    /// `array[index]`
    Element {
        array: ExprId,
        index: ExprId,
    },

    /// `record.field`
    Field {
        record: ExprId,
        field: Name,
    },

    /// `forall q do body endforall` / `exists q do body endexists`
    Quantified {
        kind: QuantKind,
        quantifier: QuantifierId,
        body: ExprId,
    },

    /// A call to a function with a return type.
    Call {
        name: Name,
        referent: Option<FunctionId>,
        args: Vec<ExprId>,
    },

    /// `isundefined(x)` - true when the underlying bits are all zero.
    IsUndefined(ExprId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QuantKind {
    Forall,
    Exists,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Implies,
    Eq,
    Neq,
    Lt,
    Leq,
    Gt,
    Geq,
}

impl BinaryOp {
    /// Operators producing a number from two numbers.
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }

    /// Operators producing a boolean from two booleans.
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or | BinaryOp::Implies)
    }

    /// Operators producing a boolean from two comparable values.
    pub fn is_comparison(self) -> bool {
        !self.is_arithmetic() && !self.is_logical()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl Ast {
    /// The resolved type of an expression, `None` for untyped numbers.
    ///
    /// Meaningful only after symbol resolution; unresolved identifiers are
    /// untyped.
    pub fn expr_type(&self, expr: ExprId) -> Option<TypeId> {
        match &self.expr(expr).kind {
            ExprKind::Number(_) => None,
            ExprKind::Ident { referent, .. } => {
                let decl = self.decl((*referent)?);
                match &decl.kind {
                    DeclKind::Alias { value } => self.expr_type(*value),
                    DeclKind::Binding {
                        ty: BindingType::Numeric,
                    }
                    | DeclKind::Const { .. } => None,
                    _ => decl.declared_type(),
                }
            }
            ExprKind::Binary { op, lhs, rhs } => {
                if op.is_arithmetic() {
                    self.expr_type(*lhs).or_else(|| self.expr_type(*rhs))
                } else {
                    Some(self.boolean)
                }
            }
            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Not => Some(self.boolean),
                UnaryOp::Neg => self.expr_type(*operand),
            },
            ExprKind::Ternary { lhs, rhs, .. } => {
                self.expr_type(*lhs).or_else(|| self.expr_type(*rhs))
            }
            ExprKind::Element { array, .. } => {
                let array_ty = self.resolve_type(self.expr_type(*array)?);
                match &self.type_expr(array_ty).kind {
                    super::TypeKind::Array { element, .. } => Some(*element),
                    _ => None,
                }
            }
            ExprKind::Field { record, field } => {
                let record_ty = self.expr_type(*record)?;
                let (_, decl) = self.record_field(record_ty, *field)?;
                self.decl(decl).declared_type()
            }
            ExprKind::Quantified { .. } | ExprKind::IsUndefined(_) => Some(self.boolean),
            ExprKind::Call { referent, .. } => self.function((*referent)?).return_type,
        }
    }

    /// Whether the expression's value is statically computable.
    pub fn constant(&self, expr: ExprId) -> bool {
        match &self.expr(expr).kind {
            ExprKind::Number(_) => true,
            ExprKind::Ident { referent, .. } => match referent.map(|d| &self.decl(d).kind) {
                Some(DeclKind::Const { value }) => self.constant(*value),
                Some(DeclKind::EnumMember { .. }) => true,
                Some(DeclKind::Alias { value }) => self.constant(*value),
                _ => false,
            },
            ExprKind::Binary { lhs, rhs, .. } => self.constant(*lhs) && self.constant(*rhs),
            ExprKind::Unary { operand, .. } => self.constant(*operand),
            ExprKind::Ternary { cond, lhs, rhs } => {
                self.constant(*cond) && self.constant(*lhs) && self.constant(*rhs)
            }
            _ => false,
        }
    }

    /// Evaluate a constant expression.
    ///
    /// Booleans fold to 0/1. `None` when the expression is not constant or
    /// folding hits a division by zero or an `i128` overflow.
    pub fn constant_fold(&self, expr: ExprId) -> Option<i128> {
        match &self.expr(expr).kind {
            ExprKind::Number(n) => Some(i128::from(*n)),
            ExprKind::Ident { referent, .. } => match referent.map(|d| &self.decl(d).kind) {
                Some(DeclKind::Const { value }) => self.constant_fold(*value),
                Some(DeclKind::EnumMember { index, .. }) => Some(i128::from(*index)),
                Some(DeclKind::Alias { value }) => self.constant_fold(*value),
                _ => None,
            },
            ExprKind::Binary { op, lhs, rhs } => {
                let l = self.constant_fold(*lhs)?;
                let r = self.constant_fold(*rhs)?;
                match op {
                    BinaryOp::Add => l.checked_add(r),
                    BinaryOp::Sub => l.checked_sub(r),
                    BinaryOp::Mul => l.checked_mul(r),
                    BinaryOp::Div => l.checked_div(r),
                    BinaryOp::Mod => l.checked_rem(r),
                    BinaryOp::And => Some(i128::from(l != 0 && r != 0)),
                    BinaryOp::Or => Some(i128::from(l != 0 || r != 0)),
                    BinaryOp::Implies => Some(i128::from(l == 0 || r != 0)),
                    BinaryOp::Eq => Some(i128::from(l == r)),
                    BinaryOp::Neq => Some(i128::from(l != r)),
                    BinaryOp::Lt => Some(i128::from(l < r)),
                    BinaryOp::Leq => Some(i128::from(l <= r)),
                    BinaryOp::Gt => Some(i128::from(l > r)),
                    BinaryOp::Geq => Some(i128::from(l >= r)),
                }
            }
            ExprKind::Unary { op, operand } => {
                let v = self.constant_fold(*operand)?;
                match op {
                    UnaryOp::Not => Some(i128::from(v == 0)),
                    UnaryOp::Neg => v.checked_neg(),
                }
            }
            ExprKind::Ternary { cond, lhs, rhs } => {
                if self.constant_fold(*cond)? != 0 {
                    self.constant_fold(*lhs)
                } else {
                    self.constant_fold(*rhs)
                }
            }
            _ => None,
        }
    }

    /// Whether the expression designates a writable location.
    pub fn is_lvalue(&self, expr: ExprId) -> bool {
        match &self.expr(expr).kind {
            ExprKind::Ident { referent, .. } => match referent.map(|d| &self.decl(d).kind) {
                Some(DeclKind::Var { .. }) => true,
                Some(DeclKind::Param { by_ref, .. }) => *by_ref,
                Some(DeclKind::Alias { value }) => self.is_lvalue(*value),
                _ => false,
            },
            ExprKind::Element { array, .. } => self.is_lvalue(*array),
            ExprKind::Field { record, .. } => self.is_lvalue(*record),
            _ => false,
        }
    }

    /// Structural equality: same shape and children, spans and resolution
    /// state ignored.
    pub fn expr_eq(&self, a: ExprId, b: ExprId) -> bool {
        if a == b {
            return true;
        }
        match (&self.expr(a).kind, &self.expr(b).kind) {
            (ExprKind::Number(x), ExprKind::Number(y)) => x == y,
            (ExprKind::Ident { name: x, .. }, ExprKind::Ident { name: y, .. }) => x == y,
            (
                ExprKind::Binary {
                    op: ao,
                    lhs: al,
                    rhs: ar,
                },
                ExprKind::Binary {
                    op: bo,
                    lhs: bl,
                    rhs: br,
                },
            ) => ao == bo && self.expr_eq(*al, *bl) && self.expr_eq(*ar, *br),
            (
                ExprKind::Unary {
                    op: ao,
                    operand: ax,
                },
                ExprKind::Unary {
                    op: bo,
                    operand: bx,
                },
            ) => ao == bo && self.expr_eq(*ax, *bx),
            (
                ExprKind::Ternary {
                    cond: ac,
                    lhs: al,
                    rhs: ar,
                },
                ExprKind::Ternary {
                    cond: bc,
                    lhs: bl,
                    rhs: br,
                },
            ) => self.expr_eq(*ac, *bc) && self.expr_eq(*al, *bl) && self.expr_eq(*ar, *br),
            (
                ExprKind::Element {
                    array: aa,
                    index: ai,
                },
                ExprKind::Element {
                    array: ba,
                    index: bi,
                },
            ) => self.expr_eq(*aa, *ba) && self.expr_eq(*ai, *bi),
            (
                ExprKind::Field {
                    record: ar,
                    field: af,
                },
                ExprKind::Field {
                    record: br,
                    field: bf,
                },
            ) => af == bf && self.expr_eq(*ar, *br),
            (ExprKind::IsUndefined(ax), ExprKind::IsUndefined(bx)) => self.expr_eq(*ax, *bx),
            (
                ExprKind::Call {
                    name: an, args: aa, ..
                },
                ExprKind::Call {
                    name: bn, args: ba, ..
                },
            ) => {
                an == bn
                    && aa.len() == ba.len()
                    && aa.iter().zip(ba).all(|(&x, &y)| self.expr_eq(x, y))
            }
            _ => false,
        }
    }
}
