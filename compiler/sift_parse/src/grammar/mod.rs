//! Grammar productions.
//!
//! Recursive descent over the token stream. Each module extends [`Parser`]
//! with methods for one construct family:
//!
//! - [`ty`]: type expressions
//! - [`expr`]: expressions (precedence climbing)
//! - [`stmt`]: statements
//! - [`rule`]: rules, startstates, properties, rulesets, functions
//!
//! The parser allocates nodes straight into the [`Ast`] arena and leaves
//! all referents unresolved; resolution is a separate pass.

mod expr;
mod rule;
mod stmt;
mod ty;

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};
use sift_diagnostic::Result;
use sift_ir::{Ast, Decl, DeclKind, Model, StringInterner};

pub struct Parser<'a> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) ast: &'a mut Ast,
    pub(crate) interner: &'a mut StringInterner,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], ast: &'a mut Ast, interner: &'a mut StringInterner) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            ast,
            interner,
        }
    }

    /// model := { const-section | type-section | var-section | function | rule } EOF
    pub fn parse_model(&mut self) -> Result<Model> {
        let start = self.cursor.current_span();
        let mut decls = Vec::new();
        let mut functions = Vec::new();
        let mut rules = Vec::new();

        loop {
            match self.cursor.current().kind {
                TokenKind::Const => {
                    self.cursor.bump();
                    self.parse_const_section(&mut decls)?;
                }
                TokenKind::Type => {
                    self.cursor.bump();
                    self.parse_type_section(&mut decls)?;
                }
                TokenKind::Var => {
                    self.cursor.bump();
                    self.parse_var_section(&mut decls, true)?;
                }
                TokenKind::Function | TokenKind::Procedure => {
                    functions.push(self.parse_function()?);
                }
                TokenKind::Rule
                | TokenKind::StartState
                | TokenKind::Invariant
                | TokenKind::Assume
                | TokenKind::Ruleset
                | TokenKind::Alias => {
                    rules.push(self.parse_rule()?);
                    self.cursor.eat(&TokenKind::Semi);
                }
                TokenKind::Eof => break,
                _ => {
                    return Err(self
                        .cursor
                        .expected("a declaration, function or rule", "model"))
                }
            }
        }

        let span = start.merge(self.cursor.current_span());
        Ok(Model {
            decls,
            functions,
            rules,
            state_size_bits: 0,
            span,
        })
    }

    /// const-section := { name ":" expr ";" }+
    pub(crate) fn parse_const_section(
        &mut self,
        decls: &mut Vec<sift_ir::DeclId>,
    ) -> Result<()> {
        while self.at_decl_start() {
            let (name, span) = self.cursor.expect_ident("constant declaration")?;
            self.cursor.expect(&TokenKind::Colon, "constant declaration")?;
            let value = self.parse_expr()?;
            self.cursor.expect(&TokenKind::Semi, "constant declaration")?;
            decls.push(self.ast.alloc_decl(Decl {
                name,
                kind: DeclKind::Const { value },
                span,
            }));
        }
        Ok(())
    }

    /// type-section := { name ":" typeexpr ";" }+
    pub(crate) fn parse_type_section(
        &mut self,
        decls: &mut Vec<sift_ir::DeclId>,
    ) -> Result<()> {
        while self.at_decl_start() {
            let (name, span) = self.cursor.expect_ident("type declaration")?;
            self.cursor.expect(&TokenKind::Colon, "type declaration")?;
            let value = self.parse_type_expr()?;
            self.cursor.expect(&TokenKind::Semi, "type declaration")?;
            decls.push(self.ast.alloc_decl(Decl {
                name,
                kind: DeclKind::Type { value },
                span,
            }));
        }
        Ok(())
    }

    /// var-section := { name {"," name} ":" typeexpr ";" }+
    pub(crate) fn parse_var_section(
        &mut self,
        decls: &mut Vec<sift_ir::DeclId>,
        state_variable: bool,
    ) -> Result<()> {
        while self.at_decl_start() {
            let mut names = vec![self.cursor.expect_ident("variable declaration")?];
            while self.cursor.eat(&TokenKind::Comma) {
                names.push(self.cursor.expect_ident("variable declaration")?);
            }
            self.cursor.expect(&TokenKind::Colon, "variable declaration")?;
            let ty = self.parse_type_expr()?;
            self.cursor.expect(&TokenKind::Semi, "variable declaration")?;
            for (name, span) in names {
                decls.push(self.ast.alloc_decl(Decl {
                    name,
                    kind: DeclKind::Var {
                        ty,
                        state_variable,
                        offset: 0,
                    },
                    span,
                }));
            }
        }
        Ok(())
    }

    /// Whether the cursor sits at `name :` or `name ,` - the start of a
    /// declaration item rather than the next section or construct.
    pub(crate) fn at_decl_start(&self) -> bool {
        matches!(self.cursor.current().kind, TokenKind::Ident(_))
            && matches!(
                self.cursor.peek().kind,
                TokenKind::Colon | TokenKind::Comma
            )
    }

    /// Local declaration sections inside rules and functions.
    pub(crate) fn parse_local_decls(&mut self) -> Result<Vec<sift_ir::DeclId>> {
        let mut decls = Vec::new();
        loop {
            match self.cursor.current().kind {
                TokenKind::Const => {
                    self.cursor.bump();
                    self.parse_const_section(&mut decls)?;
                }
                TokenKind::Type => {
                    self.cursor.bump();
                    self.parse_type_section(&mut decls)?;
                }
                TokenKind::Var => {
                    self.cursor.bump();
                    self.parse_var_section(&mut decls, false)?;
                }
                _ => return Ok(decls),
            }
        }
    }
}
