//! Statement parsing.

use super::Parser;
use crate::token::TokenKind;
use sift_diagnostic::Result;
use sift_ir::{
    Decl, DeclKind, IfClause, Property, PropertyCategory, PutArg, Stmt, StmtId, StmtKind,
    SwitchCase,
};

impl Parser<'_> {
    /// Parse `;`-separated statements until a block terminator (`end`,
    /// `else`, `elsif`, `case`) or end of input.
    pub(crate) fn parse_stmts(&mut self) -> Result<Vec<StmtId>> {
        let mut stmts = Vec::new();
        loop {
            if matches!(
                self.cursor.current().kind,
                TokenKind::End
                    | TokenKind::Else
                    | TokenKind::Elsif
                    | TokenKind::Case
                    | TokenKind::Eof
            ) {
                return Ok(stmts);
            }
            stmts.push(self.parse_stmt()?);
            if !self.cursor.eat(&TokenKind::Semi) {
                return Ok(stmts);
            }
        }
    }

    fn parse_stmt(&mut self) -> Result<StmtId> {
        let start = self.cursor.current_span();
        let kind = match self.cursor.current().kind {
            TokenKind::Clear => {
                self.cursor.bump();
                let target = self.parse_expr()?;
                StmtKind::Clear { target }
            }
            TokenKind::Undefine => {
                self.cursor.bump();
                let target = self.parse_expr()?;
                StmtKind::Undefine { target }
            }
            TokenKind::Return => {
                self.cursor.bump();
                let value = if matches!(
                    self.cursor.current().kind,
                    TokenKind::Semi | TokenKind::End | TokenKind::Else | TokenKind::Elsif
                ) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                StmtKind::Return { value }
            }
            TokenKind::Error => {
                self.cursor.bump();
                let message = self
                    .cursor
                    .eat_text()
                    .ok_or_else(|| self.cursor.expected("string", "error statement"))?;
                StmtKind::Error { message }
            }
            TokenKind::Assert | TokenKind::Assume => {
                let category = if matches!(self.cursor.current().kind, TokenKind::Assert) {
                    PropertyCategory::Assertion
                } else {
                    PropertyCategory::Assumption
                };
                self.cursor.bump();
                let expr = self.parse_expr()?;
                let message = self.cursor.eat_text().unwrap_or_default();
                StmtKind::Property {
                    property: Property { category, expr },
                    message,
                }
            }
            TokenKind::Put => {
                self.cursor.bump();
                let arg = match self.cursor.eat_text() {
                    Some(text) => PutArg::Text(text),
                    None => PutArg::Value(self.parse_expr()?),
                };
                StmtKind::Put { arg }
            }
            TokenKind::For => {
                self.cursor.bump();
                let quantifier = self.parse_quantifier()?;
                self.cursor.expect(&TokenKind::Do, "for statement")?;
                let body = self.parse_stmts()?;
                self.cursor.expect(&TokenKind::End, "for statement")?;
                StmtKind::For { quantifier, body }
            }
            TokenKind::While => {
                self.cursor.bump();
                let condition = self.parse_expr()?;
                self.cursor.expect(&TokenKind::Do, "while statement")?;
                let body = self.parse_stmts()?;
                self.cursor.expect(&TokenKind::End, "while statement")?;
                StmtKind::While { condition, body }
            }
            TokenKind::If => self.parse_if()?,
            TokenKind::Switch => self.parse_switch()?,
            TokenKind::Alias => {
                self.cursor.bump();
                let aliases = self.parse_alias_bindings()?;
                self.cursor.expect(&TokenKind::Do, "alias statement")?;
                let body = self.parse_stmts()?;
                self.cursor.expect(&TokenKind::End, "alias statement")?;
                StmtKind::Alias { aliases, body }
            }
            TokenKind::Ident(name) => {
                if matches!(self.cursor.peek().kind, TokenKind::LParen) {
                    // procedure call
                    self.cursor.bump();
                    self.cursor.bump();
                    let mut args = Vec::new();
                    if !self.cursor.at(&TokenKind::RParen) {
                        args.push(self.parse_expr()?);
                        while self.cursor.eat(&TokenKind::Comma) {
                            args.push(self.parse_expr()?);
                        }
                    }
                    self.cursor.expect(&TokenKind::RParen, "procedure call")?;
                    StmtKind::Call {
                        name,
                        referent: None,
                        args,
                    }
                } else {
                    let lhs = self.parse_expr()?;
                    self.cursor.expect(&TokenKind::Assign, "assignment")?;
                    let rhs = self.parse_expr()?;
                    StmtKind::Assignment { lhs, rhs }
                }
            }
            _ => return Err(self.cursor.expected("a statement", "statement list")),
        };

        let span = start.merge(self.cursor.current_span());
        Ok(self.ast.alloc_stmt(Stmt { kind, span }))
    }

    /// if := "if" expr "then" stmts {"elsif" expr "then" stmts} ["else" stmts] "end"
    fn parse_if(&mut self) -> Result<StmtKind> {
        self.cursor.expect(&TokenKind::If, "if statement")?;
        let mut clauses = Vec::new();

        let span = self.cursor.current_span();
        let condition = self.parse_expr()?;
        self.cursor.expect(&TokenKind::Then, "if statement")?;
        let body = self.parse_stmts()?;
        clauses.push(IfClause {
            condition: Some(condition),
            body,
            span,
        });

        loop {
            if self.cursor.eat(&TokenKind::Elsif) {
                let span = self.cursor.current_span();
                let condition = self.parse_expr()?;
                self.cursor.expect(&TokenKind::Then, "elsif clause")?;
                let body = self.parse_stmts()?;
                clauses.push(IfClause {
                    condition: Some(condition),
                    body,
                    span,
                });
            } else if self.cursor.eat(&TokenKind::Else) {
                let span = self.cursor.current_span();
                let body = self.parse_stmts()?;
                clauses.push(IfClause {
                    condition: None,
                    body,
                    span,
                });
                self.cursor.expect(&TokenKind::End, "if statement")?;
                return Ok(StmtKind::If { clauses });
            } else {
                self.cursor.expect(&TokenKind::End, "if statement")?;
                return Ok(StmtKind::If { clauses });
            }
        }
    }

    /// switch := "switch" expr {"case" expr {"," expr} ":" stmts} ["else" stmts] "end"
    fn parse_switch(&mut self) -> Result<StmtKind> {
        self.cursor.expect(&TokenKind::Switch, "switch statement")?;
        let value = self.parse_expr()?;
        let mut cases = Vec::new();
        let mut default = Vec::new();
        loop {
            if self.cursor.eat(&TokenKind::Case) {
                let mut matches = vec![self.parse_expr()?];
                while self.cursor.eat(&TokenKind::Comma) {
                    matches.push(self.parse_expr()?);
                }
                self.cursor.expect(&TokenKind::Colon, "case clause")?;
                let body = self.parse_stmts()?;
                cases.push(SwitchCase { matches, body });
            } else if self.cursor.eat(&TokenKind::Else) {
                default = self.parse_stmts()?;
                self.cursor.expect(&TokenKind::End, "switch statement")?;
                return Ok(StmtKind::Switch {
                    value,
                    cases,
                    default,
                });
            } else {
                self.cursor.expect(&TokenKind::End, "switch statement")?;
                return Ok(StmtKind::Switch {
                    value,
                    cases,
                    default,
                });
            }
        }
    }

    /// alias-bindings := name ":" expr {";" name ":" expr}
    pub(crate) fn parse_alias_bindings(&mut self) -> Result<Vec<sift_ir::DeclId>> {
        let mut aliases = Vec::new();
        loop {
            let (name, span) = self.cursor.expect_ident("alias binding")?;
            self.cursor.expect(&TokenKind::Colon, "alias binding")?;
            let value = self.parse_expr()?;
            aliases.push(self.ast.alloc_decl(Decl {
                name,
                kind: DeclKind::Alias { value },
                span,
            }));
            // a trailing `;` before `do` is tolerated
            if !self.cursor.eat(&TokenKind::Semi) || self.cursor.at(&TokenKind::Do) {
                return Ok(aliases);
            }
        }
    }
}
