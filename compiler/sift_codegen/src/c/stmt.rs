//! Statement rendering.

use crate::context::escape_c;
use crate::Emitter;
use sift_diagnostic::Result;
use sift_ir::{DeclId, DeclKind, PropertyCategory, PutArg, StmtId, StmtKind};

impl Emitter<'_> {
    pub fn stmts(&mut self, stmts: &[StmtId]) -> Result<()> {
        for &stmt in stmts {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    pub fn stmt(&mut self, stmt: StmtId) -> Result<()> {
        let span = self.ast.stmt(stmt).span;
        match self.ast.stmt(stmt).kind.clone() {
            StmtKind::Assignment { lhs, rhs } => {
                let target_ty = self
                    .ast
                    .expr_type(lhs)
                    .ok_or_else(|| self.internal(span, "assignment to an untyped target"))?;
                if self.ast.type_is_simple(target_ty) {
                    let lb = self.type_lower_bound_c(target_ty, span)?;
                    let ub = self.type_upper_bound_c(target_ty, span)?;
                    let target = self.lvalue(lhs)?;
                    let value = self.rvalue(rhs)?;
                    self.writeln(&format!("handle_write(s, {lb}, {ub}, {target}, {value});"));
                } else {
                    // aggregate assignment is a bit copy
                    let target = self.lvalue(lhs)?;
                    let source = self.rvalue(rhs)?;
                    self.writeln(&format!("handle_copy({target}, {source});"));
                }
                Ok(())
            }

            StmtKind::Clear { target } | StmtKind::Undefine { target } => {
                let handle = self.lvalue(target)?;
                self.writeln(&format!("handle_zero({handle});"));
                Ok(())
            }

            StmtKind::Call {
                name,
                referent,
                args,
            } => {
                let function =
                    referent.ok_or_else(|| self.internal(span, "unresolved procedure call"))?;
                let call = self.call(name, function, &args)?;
                self.writeln(&format!("{call};"));
                Ok(())
            }

            StmtKind::Return { value } => {
                match value {
                    Some(value) => {
                        let v = self.rvalue(value)?;
                        self.writeln(&format!("return {v};"));
                    }
                    None => self.writeln("return;"),
                }
                Ok(())
            }

            StmtKind::For { quantifier, body } => {
                let (open, close) = self.quantifier_loop(quantifier)?;
                self.writeln(&open);
                self.indent();
                self.stmts(&body)?;
                self.dedent();
                self.writeln(&close);
                Ok(())
            }

            StmtKind::If { clauses } => {
                for (i, clause) in clauses.iter().enumerate() {
                    match clause.condition {
                        Some(condition) => {
                            let c = self.rvalue(condition)?;
                            if i == 0 {
                                self.writeln(&format!("if ({c}) {{"));
                            } else {
                                self.writeln(&format!("}} else if ({c}) {{"));
                            }
                        }
                        None => self.writeln("} else {"),
                    }
                    self.indent();
                    self.stmts(&clause.body)?;
                    self.dedent();
                }
                self.writeln("}");
                Ok(())
            }

            StmtKind::Switch {
                value,
                cases,
                default,
            } => {
                let scrutinee = self.fresh("scrutinee");
                let v = self.rvalue(value)?;
                self.writeln("{");
                self.indent();
                self.writeln(&format!("const value_t {scrutinee} = {v};"));
                let mut first = true;
                for case in &cases {
                    let mut matches = Vec::new();
                    for &m in &case.matches {
                        let m = self.rvalue(m)?;
                        matches.push(format!("{scrutinee} == {m}"));
                    }
                    let test = matches.join(" || ");
                    if first {
                        self.writeln(&format!("if ({test}) {{"));
                        first = false;
                    } else {
                        self.writeln(&format!("}} else if ({test}) {{"));
                    }
                    self.indent();
                    self.stmts(&case.body)?;
                    self.dedent();
                }
                if !default.is_empty() {
                    if first {
                        self.writeln("{");
                    } else {
                        self.writeln("} else {");
                    }
                    self.indent();
                    self.stmts(&default)?;
                    self.dedent();
                }
                if !first || !default.is_empty() {
                    self.writeln("}");
                }
                self.dedent();
                self.writeln("}");
                Ok(())
            }

            StmtKind::While { condition, body } => {
                let c = self.rvalue(condition)?;
                self.writeln(&format!("while ({c}) {{"));
                self.indent();
                self.stmts(&body)?;
                self.dedent();
                self.writeln("}");
                Ok(())
            }

            StmtKind::Alias { aliases, body } => {
                self.writeln("{");
                self.indent();
                for alias in aliases {
                    self.alias_binding(alias)?;
                }
                self.stmts(&body)?;
                self.dedent();
                self.writeln("}");
                Ok(())
            }

            StmtKind::Error { message } => {
                self.writeln(&format!(
                    "error(s, true, \"%s\", \"{}\");",
                    escape_c(&message)
                ));
                Ok(())
            }

            StmtKind::Property { property, message } => {
                let e = self.rvalue(property.expr)?;
                match property.category {
                    PropertyCategory::Assumption => {
                        self.writeln(&format!("if (!{e}) {{"));
                        self.indent();
                        self.writeln("assumption_failed();");
                        self.dedent();
                        self.writeln("}");
                    }
                    _ => {
                        let what = if message.is_empty() {
                            "assertion failed".to_owned()
                        } else {
                            format!("assertion failed: {}", escape_c(&message))
                        };
                        self.writeln(&format!("if (!{e}) {{"));
                        self.indent();
                        self.writeln(&format!("error(s, true, \"%s\", \"{what}\");"));
                        self.dedent();
                        self.writeln("}");
                    }
                }
                Ok(())
            }

            StmtKind::Put { arg } => {
                match arg {
                    PutArg::Value(expr) => {
                        let v = self.rvalue(expr)?;
                        self.writeln(&format!("printf(\"%\" PRIVAL, (value_t)({v}));"));
                    }
                    PutArg::Text(text) => {
                        self.writeln(&format!("printf(\"%s\", \"{}\");", escape_c(&text)));
                    }
                }
                Ok(())
            }
        }
    }

    /// Materialize an alias binding. Lvalue targets become handles bound
    /// once at this point; pure values become `value_t` locals.
    pub fn alias_binding(&mut self, alias: DeclId) -> Result<()> {
        let decl = self.ast.decl(alias);
        let span = decl.span;
        let name = self.decl_c_name(alias);
        let DeclKind::Alias { value } = decl.kind else {
            return Err(self.internal(span, "non-alias declaration in alias position"));
        };
        if self.ast.is_lvalue(value) {
            let handle = self.lvalue(value)?;
            self.writeln(&format!("struct handle {name} = {handle};"));
        } else {
            let v = self.rvalue(value)?;
            self.writeln(&format!("value_t {name} = {v};"));
        }
        self.writeln(&format!("(void){name};"));
        Ok(())
    }

    /// Materialize a rule or function local declaration.
    pub fn local_decl(&mut self, decl: DeclId) -> Result<()> {
        let d = self.ast.decl(decl);
        let span = d.span;
        match d.kind {
            DeclKind::Var { ty, .. } => {
                let width = self.type_width_c(ty, span)?;
                let name = self.decl_c_name(decl);
                self.writeln(&format!(
                    "uint8_t {name}_data[BITS_TO_BYTES((size_t){width})] = {{ 0 }};"
                ));
                self.writeln(&format!(
                    "struct handle {name} = {{ .base = {name}_data, .offset = 0, .width = (size_t){width} }};"
                ));
                Ok(())
            }
            // local constants are folded at every use; local types emit
            // nothing
            DeclKind::Const { .. } | DeclKind::Type { .. } => Ok(()),
            _ => Err(self.internal(span, "unsupported local declaration")),
        }
    }
}
