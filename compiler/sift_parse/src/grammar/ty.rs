//! Type expression parsing.

use super::Parser;
use crate::token::TokenKind;
use sift_diagnostic::Result;
use sift_ir::{Decl, DeclKind, TypeExpr, TypeId, TypeKind};

impl Parser<'_> {
    /// typeexpr := expr ".." expr
    ///           | "enum" "{" name {"," name} "}"
    ///           | "scalarset" "(" expr ")"
    ///           | "array" "[" typeexpr "]" "of" typeexpr
    ///           | "record" fields "end"
    ///           | name
    pub(crate) fn parse_type_expr(&mut self) -> Result<TypeId> {
        let start = self.cursor.current_span();
        match self.cursor.current().kind {
            TokenKind::Enum => {
                self.cursor.bump();
                self.cursor.expect(&TokenKind::LBrace, "enum type")?;
                let mut members = vec![self.cursor.expect_ident("enum type")?];
                while self.cursor.eat(&TokenKind::Comma) {
                    members.push(self.cursor.expect_ident("enum type")?);
                }
                let end = self.cursor.expect(&TokenKind::RBrace, "enum type")?;
                Ok(self.ast.alloc_type(TypeExpr {
                    kind: TypeKind::Enum { members },
                    span: start.merge(end),
                }))
            }
            TokenKind::Scalarset => {
                self.cursor.bump();
                self.cursor.expect(&TokenKind::LParen, "scalarset type")?;
                let bound = self.parse_expr()?;
                let end = self.cursor.expect(&TokenKind::RParen, "scalarset type")?;
                Ok(self.ast.alloc_type(TypeExpr {
                    kind: TypeKind::Scalarset { bound },
                    span: start.merge(end),
                }))
            }
            TokenKind::Array => {
                self.cursor.bump();
                self.cursor.expect(&TokenKind::LBracket, "array type")?;
                let index = self.parse_type_expr()?;
                self.cursor.expect(&TokenKind::RBracket, "array type")?;
                self.cursor.expect(&TokenKind::Of, "array type")?;
                let element = self.parse_type_expr()?;
                let span = start.merge(self.ast.type_expr(element).span);
                Ok(self.ast.alloc_type(TypeExpr {
                    kind: TypeKind::Array { index, element },
                    span,
                }))
            }
            TokenKind::Record => {
                self.cursor.bump();
                let mut fields = Vec::new();
                while self.at_decl_start() {
                    let mut names = vec![self.cursor.expect_ident("record field")?];
                    while self.cursor.eat(&TokenKind::Comma) {
                        names.push(self.cursor.expect_ident("record field")?);
                    }
                    self.cursor.expect(&TokenKind::Colon, "record field")?;
                    let ty = self.parse_type_expr()?;
                    self.cursor.expect(&TokenKind::Semi, "record field")?;
                    for (name, span) in names {
                        fields.push(self.ast.alloc_decl(Decl {
                            name,
                            kind: DeclKind::Var {
                                ty,
                                state_variable: false,
                                offset: 0,
                            },
                            span,
                        }));
                    }
                }
                let end = self.cursor.expect(&TokenKind::End, "record type")?;
                Ok(self.ast.alloc_type(TypeExpr {
                    kind: TypeKind::Record { fields },
                    span: start.merge(end),
                }))
            }
            TokenKind::Ident(name) => {
                // `name` alone is a type reference; anything else beginning
                // with an identifier is the low bound of a range
                if !matches!(self.cursor.peek().kind, TokenKind::DotDot) {
                    // an expression-valued bound can still start with an
                    // identifier (e.g. `0..N-1` reversed); ranges are
                    // detected by the `..` after a full expression below
                    let checkpoint_is_plain_reference = matches!(
                        self.cursor.peek().kind,
                        TokenKind::Semi
                            | TokenKind::RBracket
                            | TokenKind::RParen
                            | TokenKind::Eof
                            | TokenKind::Of
                            | TokenKind::Do
                    );
                    if checkpoint_is_plain_reference {
                        let span = self.cursor.bump().span;
                        return Ok(self.ast.alloc_type(TypeExpr {
                            kind: TypeKind::Named {
                                name,
                                referent: None,
                            },
                            span,
                        }));
                    }
                }
                self.parse_range_type()
            }
            _ => self.parse_range_type(),
        }
    }

    /// range := expr ".." expr
    fn parse_range_type(&mut self) -> Result<TypeId> {
        let start = self.cursor.current_span();
        let min = self.parse_expr()?;
        self.cursor.expect(&TokenKind::DotDot, "range type")?;
        let max = self.parse_expr()?;
        let span = start.merge(self.ast.expr(max).span);
        Ok(self.ast.alloc_type(TypeExpr {
            kind: TypeKind::Range { min, max },
            span,
        }))
    }
}
