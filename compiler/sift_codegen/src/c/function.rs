//! Constants and function definitions.

use crate::Emitter;
use sift_diagnostic::Result;
use sift_ir::{DeclKind, FunctionId};

impl Emitter<'_> {
    /// One `ru_` constant per top-level const declaration. References fold
    /// the value inline; the definitions document the model in the output.
    pub(crate) fn emit_constants(&mut self) -> Result<()> {
        let model = self.model;
        let mut any = false;
        for &decl in &model.decls {
            let d = self.ast.decl(decl);
            let DeclKind::Const { value } = d.kind else {
                continue;
            };
            let v = self
                .ast
                .constant_fold(value)
                .ok_or_else(|| self.internal(d.span, "non-constant const"))?;
            let name = self.decl_c_name(decl);
            self.writeln(&format!(
                "static const value_t {name} __attribute__((unused)) = VALUE_C({v});"
            ));
            any = true;
        }
        if any {
            self.blank();
        }
        Ok(())
    }

    pub(crate) fn emit_functions(&mut self) -> Result<()> {
        let model = self.model;
        for &function in &model.functions {
            self.emit_function(function)?;
        }
        Ok(())
    }

    fn emit_function(&mut self, function: FunctionId) -> Result<()> {
        let f = self.ast.function(function).clone();
        let name = self.function_c_name(f.name);

        let ret = if f.return_type.is_some() {
            "value_t"
        } else {
            "void"
        };

        let mut params = vec!["const struct state *s".to_owned()];
        for &param in &f.params {
            let d = self.ast.decl(param);
            let DeclKind::Param { ty, by_ref } = d.kind else {
                return Err(self.internal(d.span, "non-parameter in parameter list"));
            };
            let p_name = self.decl_c_name(param);
            if by_ref {
                params.push(format!("struct handle *{p_name}"));
            } else if self.ast.type_is_simple(ty) {
                params.push(format!("value_t {p_name}"));
            } else {
                // read-only aggregate view
                params.push(format!("struct handle {p_name}"));
            }
        }

        self.writeln(&format!(
            "static {ret} __attribute__((unused)) {name}({}) {{",
            params.join(", ")
        ));
        self.indent();
        self.writeln("(void)s;");
        for &decl in &f.decls {
            self.local_decl(decl)?;
        }
        self.stmts(&f.body)?;
        if f.return_type.is_some() {
            // value functions must not fall off the end
            self.writeln(&format!(
                "error(s, true, \"function {} reached its end without returning a value\");",
                self.interner.lookup(f.name)
            ));
        }
        self.dedent();
        self.writeln("}");
        self.blank();
        Ok(())
    }
}
