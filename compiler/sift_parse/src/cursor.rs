//! Token cursor for navigating the lexed stream.

use crate::token::{Token, TokenKind};
use sift_diagnostic::Diagnostic;
use sift_ir::{Name, Span};

/// Position tracking over the token list. The last token is always `Eof`,
/// so `current()` is total.
pub struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        debug_assert!(matches!(
            tokens.last().map(|t| &t.kind),
            Some(TokenKind::Eof)
        ));
        Cursor { tokens, pos: 0 }
    }

    #[inline]
    pub fn current(&self) -> &'a Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// One-token lookahead.
    #[inline]
    pub fn peek(&self) -> &'a Token {
        let i = (self.pos + 1).min(self.tokens.len() - 1);
        &self.tokens[i]
    }

    #[inline]
    pub fn bump(&mut self) -> &'a Token {
        let token = self.current();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Whether the current token has the same discriminant as `kind`.
    #[inline]
    pub fn at(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    pub fn at_eof(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    /// Consume the current token if it matches.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Require and consume a token, or fail with expected/found context.
    pub fn expect(&mut self, kind: &TokenKind, context: &str) -> Result<Span, Diagnostic> {
        if self.at(kind) {
            Ok(self.bump().span)
        } else {
            Err(self.expected(kind.describe(), context))
        }
    }

    /// Require and consume an identifier.
    pub fn expect_ident(&mut self, context: &str) -> Result<(Name, Span), Diagnostic> {
        match self.current().kind {
            TokenKind::Ident(name) => {
                let span = self.bump().span;
                Ok((name, span))
            }
            _ => Err(self.expected("identifier", context)),
        }
    }

    /// Consume a string literal if present.
    pub fn eat_text(&mut self) -> Option<String> {
        match &self.current().kind {
            TokenKind::Text(value) => {
                let value = value.clone();
                self.bump();
                Some(value)
            }
            _ => None,
        }
    }

    pub fn expected(&self, expected: &str, context: &str) -> Diagnostic {
        Diagnostic::syntax(
            self.current_span(),
            format!(
                "expected {expected} in {context}, found {}",
                self.current().kind.describe()
            ),
        )
    }
}
