//! Rule, startstate, property, ruleset and function parsing.

use super::Parser;
use crate::token::TokenKind;
use sift_diagnostic::Result;
use sift_ir::{
    Decl, DeclKind, Function, FunctionId, Property, PropertyCategory, Rule, RuleId, RuleKind,
};

impl Parser<'_> {
    pub(crate) fn parse_rule(&mut self) -> Result<RuleId> {
        let start = self.cursor.current_span();
        let kind = match self.cursor.current().kind {
            TokenKind::Rule => {
                self.cursor.bump();
                let name = self.parse_rule_name();
                let guard = if self.cursor.eat(&TokenKind::Guard) {
                    None
                } else {
                    let guard = self.parse_expr()?;
                    self.cursor.expect(&TokenKind::Guard, "rule")?;
                    Some(guard)
                };
                let decls = self.parse_local_decls()?;
                self.cursor.eat(&TokenKind::Begin);
                let body = self.parse_stmts()?;
                self.cursor.expect(&TokenKind::End, "rule")?;
                RuleKind::Simple {
                    name,
                    guard,
                    decls,
                    body,
                    aliases: Vec::new(),
                    quantifiers: Vec::new(),
                }
            }
            TokenKind::StartState => {
                self.cursor.bump();
                let name = self.parse_rule_name();
                let decls = self.parse_local_decls()?;
                self.cursor.eat(&TokenKind::Begin);
                let body = self.parse_stmts()?;
                self.cursor.expect(&TokenKind::End, "startstate")?;
                RuleKind::StartState {
                    name,
                    decls,
                    body,
                    aliases: Vec::new(),
                    quantifiers: Vec::new(),
                }
            }
            TokenKind::Invariant | TokenKind::Assume => {
                let category = if matches!(self.cursor.current().kind, TokenKind::Invariant) {
                    PropertyCategory::Invariant
                } else {
                    PropertyCategory::Assumption
                };
                self.cursor.bump();
                let name = self.parse_rule_name();
                let expr = self.parse_expr()?;
                RuleKind::Property {
                    name,
                    property: Property { category, expr },
                    aliases: Vec::new(),
                    quantifiers: Vec::new(),
                }
            }
            TokenKind::Ruleset => {
                self.cursor.bump();
                let mut quantifiers = vec![self.parse_quantifier()?];
                while self.cursor.eat(&TokenKind::Semi) && !self.cursor.at(&TokenKind::Do) {
                    quantifiers.push(self.parse_quantifier()?);
                }
                self.cursor.expect(&TokenKind::Do, "ruleset")?;
                let rules = self.parse_nested_rules()?;
                self.cursor.expect(&TokenKind::End, "ruleset")?;
                RuleKind::Ruleset { quantifiers, rules }
            }
            TokenKind::Alias => {
                self.cursor.bump();
                let aliases = self.parse_alias_bindings()?;
                self.cursor.expect(&TokenKind::Do, "alias rule")?;
                let rules = self.parse_nested_rules()?;
                self.cursor.expect(&TokenKind::End, "alias rule")?;
                RuleKind::AliasGroup { aliases, rules }
            }
            _ => return Err(self.cursor.expected("a rule", "rule list")),
        };

        let span = start.merge(self.cursor.current_span());
        Ok(self.ast.alloc_rule(Rule { kind, span }))
    }

    fn parse_nested_rules(&mut self) -> Result<Vec<RuleId>> {
        let mut rules = Vec::new();
        while matches!(
            self.cursor.current().kind,
            TokenKind::Rule
                | TokenKind::StartState
                | TokenKind::Invariant
                | TokenKind::Assume
                | TokenKind::Ruleset
                | TokenKind::Alias
        ) {
            rules.push(self.parse_rule()?);
            self.cursor.eat(&TokenKind::Semi);
        }
        Ok(rules)
    }

    /// Optional quoted rule name, interned.
    fn parse_rule_name(&mut self) -> Option<sift_ir::Name> {
        let text = self.cursor.eat_text()?;
        Some(self.interner.intern(&text))
    }

    /// function := "function" name "(" params ")" ":" typeexpr ";" decls ["begin"] stmts "end" [";"]
    /// procedure := "procedure" name "(" params ")" ";" decls ["begin"] stmts "end" [";"]
    pub(crate) fn parse_function(&mut self) -> Result<FunctionId> {
        let start = self.cursor.current_span();
        let is_function = matches!(self.cursor.current().kind, TokenKind::Function);
        self.cursor.bump();

        let (name, _) = self.cursor.expect_ident("function definition")?;
        self.cursor.expect(&TokenKind::LParen, "function definition")?;
        let mut params = Vec::new();
        if !self.cursor.at(&TokenKind::RParen) {
            loop {
                let by_ref = self.cursor.eat(&TokenKind::Var);
                let mut names = vec![self.cursor.expect_ident("parameter")?];
                while self.cursor.eat(&TokenKind::Comma) {
                    names.push(self.cursor.expect_ident("parameter")?);
                }
                self.cursor.expect(&TokenKind::Colon, "parameter")?;
                let ty = self.parse_type_expr()?;
                for (name, span) in names {
                    params.push(self.ast.alloc_decl(Decl {
                        name,
                        kind: DeclKind::Param { ty, by_ref },
                        span,
                    }));
                }
                if !self.cursor.eat(&TokenKind::Semi) {
                    break;
                }
            }
        }
        self.cursor.expect(&TokenKind::RParen, "function definition")?;

        let return_type = if is_function {
            self.cursor.expect(&TokenKind::Colon, "function return type")?;
            Some(self.parse_type_expr()?)
        } else {
            None
        };
        self.cursor.expect(&TokenKind::Semi, "function definition")?;

        let decls = self.parse_local_decls()?;
        self.cursor.eat(&TokenKind::Begin);
        let body = self.parse_stmts()?;
        let end = self.cursor.expect(&TokenKind::End, "function definition")?;
        self.cursor.eat(&TokenKind::Semi);

        Ok(self.ast.alloc_function(Function {
            name,
            params,
            return_type,
            decls,
            body,
            span: start.merge(end),
        }))
    }
}
