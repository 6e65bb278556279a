//! Emitter state: the output buffer plus everything needed to render
//! model constructs into C.

use crate::CodegenOptions;
use sift_diagnostic::{Diagnostic, Result};
use sift_ir::{Ast, DeclId, Model, Name, Span, StringInterner, TypeId};

pub struct Emitter<'a> {
    pub ast: &'a Ast,
    pub model: &'a Model,
    pub interner: &'a StringInterner,
    pub options: &'a CodegenOptions,
    out: String,
    indent: usize,
    temp_counter: u32,
}

impl<'a> Emitter<'a> {
    pub fn new(
        ast: &'a Ast,
        model: &'a Model,
        interner: &'a StringInterner,
        options: &'a CodegenOptions,
    ) -> Self {
        Emitter {
            ast,
            model,
            interner,
            options,
            out: String::with_capacity(64 * 1024),
            indent: 0,
            temp_counter: 0,
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    // output helpers

    pub fn write(&mut self, s: &str) {
        self.out.push_str(s);
    }

    pub fn writeln(&mut self, s: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(s);
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        debug_assert!(self.indent > 0, "dedent at zero indentation");
        self.indent = self.indent.saturating_sub(1);
    }

    /// A fresh identifier with the given stem, unique within this unit.
    pub fn fresh(&mut self, stem: &str) -> String {
        let n = self.temp_counter;
        self.temp_counter += 1;
        format!("{stem}{n}")
    }

    // naming

    /// C name of a declared value (`ru_` prefix, as in the generated
    /// constants of the emitted unit).
    pub fn mangle(&self, name: Name) -> String {
        format!("ru_{}", self.interner.lookup(name))
    }

    /// C name of a declaration.
    pub fn decl_c_name(&self, decl: DeclId) -> String {
        self.mangle(self.ast.decl(decl).name)
    }

    /// C name of a function.
    pub fn function_c_name(&self, name: Name) -> String {
        format!("ru_f_{}", self.interner.lookup(name))
    }

    // type bound rendering

    pub fn type_lower_bound_c(&self, ty: TypeId, span: Span) -> Result<String> {
        let lb = self
            .ast
            .type_lower_bound(ty)
            .ok_or_else(|| self.internal(span, "type has no constant lower bound"))?;
        Ok(format!("VALUE_C({lb})"))
    }

    pub fn type_upper_bound_c(&self, ty: TypeId, span: Span) -> Result<String> {
        let ub = self
            .ast
            .type_upper_bound(ty)
            .ok_or_else(|| self.internal(span, "type has no constant upper bound"))?;
        Ok(format!("VALUE_C({ub})"))
    }

    pub fn type_width_c(&self, ty: TypeId, span: Span) -> Result<u64> {
        self.ast
            .type_width(ty)
            .ok_or_else(|| self.internal(span, "type has no computable width"))
    }

    /// Failures here mean validation let something through; report them as
    /// located type errors rather than panicking.
    pub fn internal(&self, span: Span, message: &str) -> Diagnostic {
        Diagnostic::type_error(span, format!("code generation failed: {message}"))
    }
}

/// Escape a string for inclusion in a C string literal.
pub fn escape_c(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn escape_handles_quotes_and_control_characters() {
        assert_eq!(escape_c("plain"), "plain");
        assert_eq!(escape_c("a\"b"), "a\\\"b");
        assert_eq!(escape_c("line\nbreak"), "line\\nbreak");
        assert_eq!(escape_c("bell\x07"), "bell\\x07");
    }
}
