//! Hand-written lexer.
//!
//! A single pass over the source bytes producing spanned tokens with
//! interned identifiers. Comments (`--` to end of line, `/* ... */`) and
//! whitespace are skipped; the token stream always ends with `Eof`.

use crate::token::{Token, TokenKind};
use sift_diagnostic::Diagnostic;
use sift_ir::{Span, StringInterner};

pub fn lex(source: &str, interner: &mut StringInterner) -> Result<Vec<Token>, Diagnostic> {
    Lexer {
        source: source.as_bytes(),
        pos: 0,
        interner,
    }
    .run()
}

struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    interner: &'a mut StringInterner,
}

impl Lexer<'_> {
    fn run(mut self) -> Result<Vec<Token>, Diagnostic> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let start = self.pos;
            let Some(byte) = self.peek() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    span: Span::point(start as u32),
                });
                return Ok(tokens);
            };

            let kind = match byte {
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.ident(),
                b'0'..=b'9' => self.number(start)?,
                b'"' => self.text(start)?,
                _ => self.operator(start)?,
            };
            tokens.push(Token {
                kind,
                span: Span::new(start as u32, self.pos as u32),
            });
        }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.source.get(self.pos + ahead).copied()
    }

    #[inline]
    fn bump(&mut self) {
        self.pos += 1;
    }

    fn skip_trivia(&mut self) -> Result<(), Diagnostic> {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r' | b'\n') => self.bump(),
                Some(b'-') if self.peek_at(1) == Some(b'-') => {
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.bump();
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let start = self.pos;
                    self.bump();
                    self.bump();
                    loop {
                        match self.peek() {
                            Some(b'*') if self.peek_at(1) == Some(b'/') => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            Some(_) => self.bump(),
                            None => {
                                return Err(Diagnostic::syntax(
                                    Span::new(start as u32, self.pos as u32),
                                    "unterminated block comment",
                                ))
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn ident(&mut self) -> TokenKind {
        let start = self.pos;
        while matches!(self.peek(), Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_')) {
            self.bump();
        }
        // already validated as ASCII by the byte ranges above
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or_default();
        TokenKind::keyword(text).unwrap_or_else(|| TokenKind::Ident(self.interner.intern(text)))
    }

    fn number(&mut self, start: usize) -> Result<TokenKind, Diagnostic> {
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.bump();
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or_default();
        let value: i64 = text.parse().map_err(|_| {
            Diagnostic::syntax(
                Span::new(start as u32, self.pos as u32),
                format!("numeric literal {text} out of range"),
            )
        })?;
        Ok(TokenKind::Number(value))
    }

    fn text(&mut self, start: usize) -> Result<TokenKind, Diagnostic> {
        self.bump(); // opening quote
        let mut value = String::new();
        loop {
            match self.peek() {
                Some(b'"') => {
                    self.bump();
                    return Ok(TokenKind::Text(value));
                }
                Some(b'\\') => {
                    self.bump();
                    match self.peek() {
                        Some(b'"') => value.push('"'),
                        Some(b'\\') => value.push('\\'),
                        Some(b'n') => value.push('\n'),
                        Some(other) => value.push(other as char),
                        None => break,
                    }
                    self.bump();
                }
                Some(b'\n') | None => break,
                Some(other) => {
                    value.push(other as char);
                    self.bump();
                }
            }
        }
        Err(Diagnostic::syntax(
            Span::new(start as u32, self.pos as u32),
            "unterminated string literal",
        ))
    }

    fn operator(&mut self, start: usize) -> Result<TokenKind, Diagnostic> {
        let two = |a: u8, b: u8, lexer: &Self| lexer.peek() == Some(a) && lexer.peek_at(1) == Some(b);

        // three-byte guard arrow first
        if self.peek() == Some(b'=') && self.peek_at(1) == Some(b'=') && self.peek_at(2) == Some(b'>')
        {
            self.pos += 3;
            return Ok(TokenKind::Guard);
        }

        let kind = if two(b':', b'=', self) {
            self.pos += 2;
            TokenKind::Assign
        } else if two(b'.', b'.', self) {
            self.pos += 2;
            TokenKind::DotDot
        } else if two(b'-', b'>', self) {
            self.pos += 2;
            TokenKind::Implies
        } else if two(b'!', b'=', self) {
            self.pos += 2;
            TokenKind::Neq
        } else if two(b'<', b'=', self) {
            self.pos += 2;
            TokenKind::Leq
        } else if two(b'>', b'=', self) {
            self.pos += 2;
            TokenKind::Geq
        } else {
            let single = match self.peek() {
                Some(b':') => TokenKind::Colon,
                Some(b';') => TokenKind::Semi,
                Some(b',') => TokenKind::Comma,
                Some(b'.') => TokenKind::Dot,
                Some(b'(') => TokenKind::LParen,
                Some(b')') => TokenKind::RParen,
                Some(b'[') => TokenKind::LBracket,
                Some(b']') => TokenKind::RBracket,
                Some(b'{') => TokenKind::LBrace,
                Some(b'}') => TokenKind::RBrace,
                Some(b'?') => TokenKind::Question,
                Some(b'=') => TokenKind::Eq,
                Some(b'<') => TokenKind::Lt,
                Some(b'>') => TokenKind::Gt,
                Some(b'+') => TokenKind::Plus,
                Some(b'-') => TokenKind::Minus,
                Some(b'*') => TokenKind::Star,
                Some(b'/') => TokenKind::Slash,
                Some(b'%') => TokenKind::Percent,
                Some(b'&') => TokenKind::Amp,
                Some(b'|') => TokenKind::Pipe,
                Some(b'!') => TokenKind::Bang,
                Some(other) => {
                    return Err(Diagnostic::syntax(
                        Span::new(start as u32, start as u32 + 1),
                        format!("unexpected character `{}`", other as char),
                    ))
                }
                None => TokenKind::Eof,
            };
            self.bump();
            single
        };
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut interner = StringInterner::new();
        lex(source, &mut interner)
            .expect("lex failure")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lex_declaration() {
        let mut interner = StringInterner::new();
        let tokens = lex("var x: 0..1;", &mut interner).expect("lex failure");
        let x = interner.get("x").expect("x interned");
        assert_eq!(
            tokens.iter().map(|t| t.kind.clone()).collect::<Vec<_>>(),
            vec![
                TokenKind::Var,
                TokenKind::Ident(x),
                TokenKind::Colon,
                TokenKind::Number(0),
                TokenKind::DotDot,
                TokenKind::Number(1),
                TokenKind::Semi,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_guard_arrow_before_eq() {
        let mut interner = StringInterner::new();
        let tokens = lex("x = 0 ==> y", &mut interner).expect("lex failure");
        let x = interner.get("x").expect("x interned");
        let y = interner.get("y").expect("y interned");
        assert_eq!(
            tokens.into_iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::Ident(x),
                TokenKind::Eq,
                TokenKind::Number(0),
                TokenKind::Guard,
                TokenKind::Ident(y),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("-- line\n/* block\n*/ 42"),
            vec![TokenKind::Number(42), TokenKind::Eof]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds(r#""a\"b""#),
            vec![TokenKind::Text("a\"b".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut interner = StringInterner::new();
        assert!(lex("\"oops", &mut interner).is_err());
    }

    #[test]
    fn spans_cover_lexemes() {
        let mut interner = StringInterner::new();
        let tokens = lex("rule", &mut interner).expect("lex failure");
        assert_eq!(tokens[0].span, Span::new(0, 4));
    }
}
