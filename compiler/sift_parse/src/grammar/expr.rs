//! Expression parsing.
//!
//! Precedence, loosest first: `?:`, `->`, `|`, `&`, comparisons, `+ -`,
//! `* / %`, unary `! -`, postfix `[...]` and `.field`.

use super::Parser;
use crate::token::TokenKind;
use sift_diagnostic::Result;
use sift_ir::{
    BinaryOp, BindingType, Decl, DeclKind, Expr, ExprId, ExprKind, QuantKind, Quantifier,
    QuantifierId, QuantifierKind, UnaryOp,
};

impl Parser<'_> {
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId> {
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> Result<ExprId> {
        let cond = self.parse_implies()?;
        if !self.cursor.eat(&TokenKind::Question) {
            return Ok(cond);
        }
        let lhs = self.parse_expr()?;
        self.cursor.expect(&TokenKind::Colon, "ternary expression")?;
        let rhs = self.parse_expr()?;
        let span = self.ast.expr(cond).span.merge(self.ast.expr(rhs).span);
        Ok(self.ast.alloc_expr(Expr {
            kind: ExprKind::Ternary { cond, lhs, rhs },
            span,
        }))
    }

    fn parse_implies(&mut self) -> Result<ExprId> {
        let lhs = self.parse_or()?;
        if !self.cursor.eat(&TokenKind::Implies) {
            return Ok(lhs);
        }
        // right-associative: a -> b -> c is a -> (b -> c)
        let rhs = self.parse_implies()?;
        let span = self.ast.expr(lhs).span.merge(self.ast.expr(rhs).span);
        Ok(self.ast.alloc_expr(Expr {
            kind: ExprKind::Binary {
                op: BinaryOp::Implies,
                lhs,
                rhs,
            },
            span,
        }))
    }

    fn parse_or(&mut self) -> Result<ExprId> {
        let mut lhs = self.parse_and()?;
        while self.cursor.eat(&TokenKind::Pipe) {
            let rhs = self.parse_and()?;
            lhs = self.binary(BinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<ExprId> {
        let mut lhs = self.parse_comparison()?;
        while self.cursor.eat(&TokenKind::Amp) {
            let rhs = self.parse_comparison()?;
            lhs = self.binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_comparison(&mut self) -> Result<ExprId> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.cursor.current().kind {
                TokenKind::Eq => BinaryOp::Eq,
                TokenKind::Neq => BinaryOp::Neq,
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Leq => BinaryOp::Leq,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Geq => BinaryOp::Geq,
                _ => return Ok(lhs),
            };
            self.cursor.bump();
            let rhs = self.parse_additive()?;
            lhs = self.binary(op, lhs, rhs);
        }
    }

    fn parse_additive(&mut self) -> Result<ExprId> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.cursor.current().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.cursor.bump();
            let rhs = self.parse_multiplicative()?;
            lhs = self.binary(op, lhs, rhs);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<ExprId> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.cursor.current().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => return Ok(lhs),
            };
            self.cursor.bump();
            let rhs = self.parse_unary()?;
            lhs = self.binary(op, lhs, rhs);
        }
    }

    fn parse_unary(&mut self) -> Result<ExprId> {
        let start = self.cursor.current_span();
        let op = match self.cursor.current().kind {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            _ => None,
        };
        if let Some(op) = op {
            self.cursor.bump();
            let operand = self.parse_unary()?;
            let span = start.merge(self.ast.expr(operand).span);
            return Ok(self.ast.alloc_expr(Expr {
                kind: ExprKind::Unary { op, operand },
                span,
            }));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<ExprId> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.cursor.eat(&TokenKind::LBracket) {
                let index = self.parse_expr()?;
                let end = self.cursor.expect(&TokenKind::RBracket, "index expression")?;
                let span = self.ast.expr(expr).span.merge(end);
                expr = self.ast.alloc_expr(Expr {
                    kind: ExprKind::Element { array: expr, index },
                    span,
                });
            } else if self.cursor.eat(&TokenKind::Dot) {
                let (field, end) = self.cursor.expect_ident("field expression")?;
                let span = self.ast.expr(expr).span.merge(end);
                expr = self.ast.alloc_expr(Expr {
                    kind: ExprKind::Field {
                        record: expr,
                        field,
                    },
                    span,
                });
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<ExprId> {
        let start = self.cursor.current_span();
        match self.cursor.current().kind {
            TokenKind::Number(value) => {
                self.cursor.bump();
                Ok(self.ast.alloc_expr(Expr {
                    kind: ExprKind::Number(value),
                    span: start,
                }))
            }
            TokenKind::Ident(name) => {
                self.cursor.bump();
                if self.cursor.eat(&TokenKind::LParen) {
                    let mut args = Vec::new();
                    if !self.cursor.at(&TokenKind::RParen) {
                        args.push(self.parse_expr()?);
                        while self.cursor.eat(&TokenKind::Comma) {
                            args.push(self.parse_expr()?);
                        }
                    }
                    let end = self.cursor.expect(&TokenKind::RParen, "call expression")?;
                    return Ok(self.ast.alloc_expr(Expr {
                        kind: ExprKind::Call {
                            name,
                            referent: None,
                            args,
                        },
                        span: start.merge(end),
                    }));
                }
                Ok(self.ast.alloc_expr(Expr {
                    kind: ExprKind::Ident {
                        name,
                        referent: None,
                    },
                    span: start,
                }))
            }
            TokenKind::LParen => {
                self.cursor.bump();
                let expr = self.parse_expr()?;
                self.cursor.expect(&TokenKind::RParen, "parenthesized expression")?;
                Ok(expr)
            }
            TokenKind::Forall | TokenKind::Exists => {
                let kind = if matches!(self.cursor.current().kind, TokenKind::Forall) {
                    QuantKind::Forall
                } else {
                    QuantKind::Exists
                };
                self.cursor.bump();
                let quantifier = self.parse_quantifier()?;
                self.cursor.expect(&TokenKind::Do, "quantified expression")?;
                let body = self.parse_expr()?;
                let end = self.cursor.expect(&TokenKind::End, "quantified expression")?;
                Ok(self.ast.alloc_expr(Expr {
                    kind: ExprKind::Quantified {
                        kind,
                        quantifier,
                        body,
                    },
                    span: start.merge(end),
                }))
            }
            TokenKind::IsUndefined => {
                self.cursor.bump();
                self.cursor.expect(&TokenKind::LParen, "isundefined")?;
                let operand = self.parse_expr()?;
                let end = self.cursor.expect(&TokenKind::RParen, "isundefined")?;
                Ok(self.ast.alloc_expr(Expr {
                    kind: ExprKind::IsUndefined(operand),
                    span: start.merge(end),
                }))
            }
            _ => Err(self.cursor.expected("an expression", "expression")),
        }
    }

    /// quantifier := name ":" typeexpr
    ///             | name ":=" expr "to" expr ["by" expr]
    pub(crate) fn parse_quantifier(&mut self) -> Result<QuantifierId> {
        let (name, span) = self.cursor.expect_ident("quantifier")?;
        if self.cursor.eat(&TokenKind::Assign) {
            let from = self.parse_expr()?;
            self.cursor.expect(&TokenKind::To, "quantifier bounds")?;
            let to = self.parse_expr()?;
            let step = if self.cursor.eat(&TokenKind::By) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            let binding = self.ast.alloc_decl(Decl {
                name,
                kind: DeclKind::Binding {
                    ty: BindingType::Numeric,
                },
                span,
            });
            return Ok(self.ast.alloc_quantifier(Quantifier {
                binding,
                kind: QuantifierKind::Bounds { from, to, step },
                span,
            }));
        }
        self.cursor.expect(&TokenKind::Colon, "quantifier")?;
        let ty = self.parse_type_expr()?;
        let binding = self.ast.alloc_decl(Decl {
            name,
            kind: DeclKind::Binding {
                ty: BindingType::Type(ty),
            },
            span,
        });
        Ok(self.ast.alloc_quantifier(Quantifier {
            binding,
            kind: QuantifierKind::Over(ty),
            span,
        }))
    }

    fn binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        let span = self.ast.expr(lhs).span.merge(self.ast.expr(rhs).span);
        self.ast.alloc_expr(Expr {
            kind: ExprKind::Binary { op, lhs, rhs },
            span,
        })
    }
}
