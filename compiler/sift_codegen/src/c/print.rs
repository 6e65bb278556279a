//! The generated `state_print`: walks the model's state variables in
//! declaration order, printing each component by its type. In diff mode a
//! component is elided when it matches the preceding state; in
//! machine-readable mode components print as XML tags.

use crate::context::escape_c;
use crate::Emitter;
use sift_diagnostic::Result;
use sift_ir::{DeclKind, Span, TypeId, TypeKind};

/// An accumulating `printf` call for the component name: literal text
/// interleaved with runtime `value_t` parameters (array indices).
#[derive(Clone, Default)]
struct NamePrintf {
    format: String,
    params: Vec<String>,
}

impl NamePrintf {
    fn literal(text: &str) -> Self {
        NamePrintf {
            format: escape_c(text),
            params: Vec::new(),
        }
    }

    fn push_str(&mut self, text: &str) {
        self.format.push_str(&escape_c(text));
    }

    fn push_val(&mut self, expr: &str) {
        self.format.push_str("%\" PRIVAL \"");
        self.params.push(format!("(value_t)({expr})"));
    }

    fn render(&self) -> String {
        if self.params.is_empty() {
            format!("fprintf(stderr, \"{}\")", self.format)
        } else {
            format!(
                "fprintf(stderr, \"{}\", {})",
                self.format,
                self.params.join(", ")
            )
        }
    }
}

impl Emitter<'_> {
    pub(crate) fn emit_state_print(&mut self) -> Result<()> {
        let model = self.model;

        self.writeln("static void state_print(const struct state *s) {");
        self.indent();
        self.writeln("const struct state *previous __attribute__((unused)) =");
        self.writeln("    COUNTEREXAMPLE_DIFF ? s->previous : NULL;");
        self.writeln("(void)s;");

        for &decl in &model.decls {
            let d = self.ast.decl(decl);
            let DeclKind::Var {
                ty,
                state_variable: true,
                offset,
            } = d.kind
            else {
                continue;
            };
            let width = self.type_width_c(ty, d.span)?;
            let handle = format!(
                "((struct handle){{ .base = (uint8_t *)s->data, .offset = (size_t){offset}, .width = (size_t){width} }})"
            );
            let prefix = NamePrintf::literal(self.interner.lookup(d.name));
            self.print_type(ty, &prefix, &handle, d.span)?;
        }

        self.dedent();
        self.writeln("}");
        Ok(())
    }

    fn print_type(
        &mut self,
        ty: TypeId,
        prefix: &NamePrintf,
        handle: &str,
        span: Span,
    ) -> Result<()> {
        let resolved = self.ast.resolve_type(ty);
        match self.ast.type_expr(resolved).kind.clone() {
            TypeKind::Range { .. } => {
                let lb = self.type_lower_bound_c(resolved, span)?;
                let ub = self.type_upper_bound_c(resolved, span)?;
                let value = format!(
                    "fprintf(stderr, \"%\" PRIVAL, decode_value({lb}, {ub}, v));"
                );
                self.print_leaf(prefix, handle, &[value]);
                Ok(())
            }

            TypeKind::Scalarset { .. } => {
                self.print_leaf(
                    prefix,
                    handle,
                    &["fprintf(stderr, \"%\" PRIVAL, v - 1);".to_owned()],
                );
                Ok(())
            }

            TypeKind::Enum { members } => {
                let mut lines = Vec::new();
                for (i, (name, _)) in members.iter().enumerate() {
                    let text = escape_c(self.interner.lookup(*name));
                    if i == 0 {
                        lines.push(format!(
                            "if (v == VALUE_C(1)) {{ fprintf(stderr, \"%s\", \"{text}\"); }}"
                        ));
                    } else {
                        lines.push(format!(
                            "else if (v == VALUE_C({})) {{ fprintf(stderr, \"%s\", \"{text}\"); }}",
                            i + 1
                        ));
                    }
                }
                lines.push("else { ASSERT(false && \"illegal value for enum\"); }".to_owned());
                self.print_leaf(prefix, handle, &lines);
                Ok(())
            }

            TypeKind::Array { index, element } => {
                let element_width = self.type_width_c(element, span)?;
                let index_resolved = self.ast.resolve_type(index);
                match self.ast.type_expr(index_resolved).kind.clone() {
                    TypeKind::Enum { members } => {
                        // one statically-named component per member
                        for (i, (name, _)) in members.iter().enumerate() {
                            let mut p = prefix.clone();
                            p.push_str(&format!("[{}]", self.interner.lookup(*name)));
                            let child = self.narrow_handle(
                                handle,
                                &format!("(size_t){}", i as u64 * element_width),
                                element_width,
                            );
                            self.print_type(element, &p, &child, span)?;
                        }
                        Ok(())
                    }
                    _ => {
                        // ranges and scalarsets loop over the index domain
                        let lb = self
                            .ast
                            .type_lower_bound(index_resolved)
                            .ok_or_else(|| self.internal(span, "array index has no bounds"))?;
                        let count = self
                            .ast
                            .type_count(index_resolved)
                            .ok_or_else(|| self.internal(span, "array index has no count"))?;
                        let counter = self.fresh("i");
                        self.writeln(&format!(
                            "for (size_t {counter} = 0; {counter} < (size_t){count}; {counter}++) {{"
                        ));
                        self.indent();
                        let mut p = prefix.clone();
                        p.push_str("[");
                        if matches!(
                            self.ast.type_expr(index_resolved).kind,
                            TypeKind::Scalarset { .. }
                        ) {
                            p.push_val(&counter);
                        } else {
                            p.push_val(&format!("(value_t){counter} + VALUE_C({lb})"));
                        }
                        p.push_str("]");
                        let child = self.narrow_handle(
                            handle,
                            &format!("{counter} * (size_t){element_width}"),
                            element_width,
                        );
                        self.print_type(element, &p, &child, span)?;
                        self.dedent();
                        self.writeln("}");
                        Ok(())
                    }
                }
            }

            TypeKind::Record { fields } => {
                let mut offset = 0u64;
                for field in fields {
                    let f = self.ast.decl(field);
                    let field_ty = f
                        .declared_type()
                        .ok_or_else(|| self.internal(f.span, "record field with no type"))?;
                    let field_width = self.type_width_c(field_ty, f.span)?;
                    let mut p = prefix.clone();
                    p.push_str(&format!(".{}", self.interner.lookup(f.name)));
                    let child =
                        self.narrow_handle(handle, &format!("(size_t){offset}"), field_width);
                    self.print_type(field_ty, &p, &child, f.span)?;
                    offset += field_width;
                }
                Ok(())
            }

            TypeKind::Named { .. } => Err(self.internal(span, "unresolved type in state print")),
        }
    }

    /// A handle over a sub-range of `handle`, at a possibly-dynamic bit
    /// offset.
    fn narrow_handle(&self, handle: &str, offset_expr: &str, width: u64) -> String {
        format!(
            "((struct handle){{ .base = {handle}.base, .offset = {handle}.offset + ({offset_expr}), .width = (size_t){width} }})"
        )
    }

    /// The shared leaf shape: read raw, compare against the previous state
    /// in diff mode, then print the component name and its value.
    fn print_leaf(&mut self, prefix: &NamePrintf, handle: &str, value_lines: &[String]) {
        let prev_handle = format!(
            "((struct handle){{ .base = (uint8_t *)previous->data + ({handle}.base - (const uint8_t *)s->data), .offset = {handle}.offset, .width = {handle}.width }})"
        );

        self.writeln("{");
        self.indent();
        self.writeln(&format!("value_t v = handle_read_raw({handle});"));
        self.writeln("value_t v_previous = 0;");
        self.writeln("if (previous != NULL) {");
        self.indent();
        self.writeln(&format!("v_previous = handle_read_raw({prev_handle});"));
        self.dedent();
        self.writeln("}");
        self.writeln("if (previous == NULL || v != v_previous) {");
        self.indent();
        self.writeln("if (MACHINE_READABLE_OUTPUT) {");
        self.indent();
        self.writeln("fprintf(stderr, \"<state_component name=\\\"\");");
        self.writeln(&format!("{};", prefix.render()));
        self.writeln("fprintf(stderr, \"\\\" value=\\\"\");");
        self.dedent();
        self.writeln("} else {");
        self.indent();
        self.writeln("fprintf(stderr, \"\\t\");");
        self.writeln(&format!("{};", prefix.render()));
        self.writeln("fprintf(stderr, \": \");");
        self.dedent();
        self.writeln("}");
        self.writeln("if (v == 0) {");
        self.indent();
        self.writeln("fprintf(stderr, \"Undefined\");");
        self.dedent();
        self.writeln("}");
        for line in value_lines {
            if line.starts_with("else") {
                self.writeln(line);
            } else {
                self.writeln(&format!("else {line}"));
            }
        }
        self.writeln("if (MACHINE_READABLE_OUTPUT) {");
        self.indent();
        self.writeln("fprintf(stderr, \"\\\"/>\");");
        self.dedent();
        self.writeln("}");
        self.writeln("fprintf(stderr, \"\\n\");");
        self.dedent();
        self.writeln("}");
        self.dedent();
        self.writeln("}");
    }
}
