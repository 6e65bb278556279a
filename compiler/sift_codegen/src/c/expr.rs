//! Expression rendering.
//!
//! Two entry points, mirroring the two contexts an expression can appear
//! in: [`Emitter::rvalue`] produces a `value_t` for simple-typed
//! expressions and a `struct handle` for aggregates; [`Emitter::lvalue`]
//! produces a writable `struct handle`. State variable access is always a
//! compositional handle expression - variables inline their (offset,
//! width), array indexing wraps `handle_index`, field access wraps
//! `handle_narrow`.

use crate::context::escape_c;
use crate::Emitter;
use sift_diagnostic::Result;
use sift_ir::{
    BinaryOp, DeclId, DeclKind, ExprId, ExprKind, QuantKind, QuantifierId, QuantifierKind,
    TypeKind, UnaryOp,
};

impl Emitter<'_> {
    pub fn rvalue(&mut self, expr: ExprId) -> Result<String> {
        let span = self.ast.expr(expr).span;
        match self.ast.expr(expr).kind.clone() {
            ExprKind::Number(n) => Ok(format!("VALUE_C({n})")),

            ExprKind::Ident { name, referent } => {
                let decl =
                    referent.ok_or_else(|| self.internal(span, "unresolved identifier"))?;
                match self.ast.decl(decl).kind {
                    DeclKind::Const { value } => {
                        let v = self
                            .ast
                            .constant_fold(value)
                            .ok_or_else(|| self.internal(span, "non-constant const"))?;
                        Ok(format!("VALUE_C({v})"))
                    }
                    DeclKind::EnumMember { index, .. } => Ok(format!("VALUE_C({index})")),
                    DeclKind::Var { .. } => {
                        let handle = self.lvalue(expr)?;
                        self.read_wrap(expr, handle)
                    }
                    DeclKind::Param { by_ref, .. } => {
                        if by_ref {
                            let handle = format!("(*{})", self.mangle(name));
                            self.read_wrap(expr, handle)
                        } else {
                            // a scalar, or a read-only aggregate view
                            Ok(self.mangle(name))
                        }
                    }
                    DeclKind::Binding { .. } => Ok(self.mangle(name)),
                    DeclKind::Alias { value } => {
                        if self.ast.is_lvalue(value) {
                            // materialized as a handle
                            self.read_wrap(expr, self.mangle(name))
                        } else {
                            // materialized as a value
                            Ok(self.mangle(name))
                        }
                    }
                    DeclKind::Type { .. } => {
                        Err(self.internal(span, "type used as an expression"))
                    }
                }
            }

            ExprKind::Binary { op, lhs, rhs } => {
                let l = self.rvalue(lhs)?;
                let r = self.rvalue(rhs)?;
                Ok(match op {
                    BinaryOp::Add => format!("add(s, {l}, {r})"),
                    BinaryOp::Sub => format!("sub(s, {l}, {r})"),
                    BinaryOp::Mul => format!("mul(s, {l}, {r})"),
                    BinaryOp::Div => format!("divide(s, {l}, {r})"),
                    BinaryOp::Mod => format!("mod(s, {l}, {r})"),
                    BinaryOp::And => format!("({l} && {r})"),
                    BinaryOp::Or => format!("({l} || {r})"),
                    BinaryOp::Implies => format!("(!{l} || {r})"),
                    BinaryOp::Eq => format!("({l} == {r})"),
                    BinaryOp::Neq => format!("({l} != {r})"),
                    BinaryOp::Lt => format!("({l} < {r})"),
                    BinaryOp::Leq => format!("({l} <= {r})"),
                    BinaryOp::Gt => format!("({l} > {r})"),
                    BinaryOp::Geq => format!("({l} >= {r})"),
                })
            }

            ExprKind::Unary { op, operand } => {
                let v = self.rvalue(operand)?;
                Ok(match op {
                    UnaryOp::Not => format!("(!{v})"),
                    UnaryOp::Neg => format!("negate(s, {v})"),
                })
            }

            ExprKind::Ternary { cond, lhs, rhs } => {
                let c = self.rvalue(cond)?;
                let l = self.rvalue(lhs)?;
                let r = self.rvalue(rhs)?;
                Ok(format!("({c} ? {l} : {r})"))
            }

            ExprKind::Element { .. } => {
                let handle = self.element_handle(expr, false)?;
                self.read_wrap(expr, handle)
            }

            ExprKind::Field { .. } => {
                let handle = self.field_handle(expr, false)?;
                self.read_wrap(expr, handle)
            }

            ExprKind::Quantified {
                kind,
                quantifier,
                body,
            } => self.quantified(kind, quantifier, body),

            ExprKind::Call {
                name,
                referent,
                args,
            } => {
                let function =
                    referent.ok_or_else(|| self.internal(span, "unresolved function call"))?;
                self.call(name, function, &args)
            }

            ExprKind::IsUndefined(operand) => {
                let handle = self.lvalue(operand)?;
                Ok(format!("(handle_read_raw({handle}) == 0)"))
            }
        }
    }

    pub fn lvalue(&mut self, expr: ExprId) -> Result<String> {
        let span = self.ast.expr(expr).span;
        match self.ast.expr(expr).kind.clone() {
            ExprKind::Ident { name, referent } => {
                let decl =
                    referent.ok_or_else(|| self.internal(span, "unresolved identifier"))?;
                match self.ast.decl(decl).kind {
                    DeclKind::Var {
                        ty,
                        state_variable,
                        offset,
                    } => {
                        if state_variable {
                            let width = self.type_width_c(ty, span)?;
                            Ok(format!(
                                "((struct handle){{ .base = (uint8_t *)s->data, .offset = (size_t){offset}, .width = (size_t){width} }})"
                            ))
                        } else {
                            // locals are materialized handles
                            Ok(self.mangle(name))
                        }
                    }
                    DeclKind::Param { by_ref: true, .. } => Ok(format!("(*{})", self.mangle(name))),
                    DeclKind::Alias { value } => {
                        if self.ast.is_lvalue(value) {
                            Ok(self.mangle(name))
                        } else {
                            Err(self.internal(span, "alias of a non-assignable expression used as lvalue"))
                        }
                    }
                    _ => Err(self.internal(span, "invalid expression used as lvalue")),
                }
            }
            ExprKind::Element { .. } => self.element_handle(expr, true),
            ExprKind::Field { .. } => self.field_handle(expr, true),
            _ => Err(self.internal(span, "invalid expression used as lvalue")),
        }
    }

    /// Wrap a handle in `handle_read` when the expression is simple-typed;
    /// aggregates are passed around as bare handles.
    fn read_wrap(&self, expr: ExprId, handle: String) -> Result<String> {
        let span = self.ast.expr(expr).span;
        match self.ast.expr_type(expr) {
            Some(ty) if self.ast.type_is_simple(ty) => {
                let lb = self.type_lower_bound_c(ty, span)?;
                let ub = self.type_upper_bound_c(ty, span)?;
                Ok(format!("handle_read(s, {lb}, {ub}, {handle})"))
            }
            Some(_) => Ok(handle),
            None => Err(self.internal(span, "state access with no type")),
        }
    }

    /// `handle_index(s, width, min, max, <root>, <index>)`
    fn element_handle(&mut self, expr: ExprId, lvalue: bool) -> Result<String> {
        let span = self.ast.expr(expr).span;
        let ExprKind::Element { array, index } = self.ast.expr(expr).kind.clone() else {
            return Err(self.internal(span, "not an element expression"));
        };

        let array_ty = self
            .ast
            .expr_type(array)
            .ok_or_else(|| self.internal(span, "indexing an untyped value"))?;
        let resolved = self.ast.resolve_type(array_ty);
        let &TypeKind::Array {
            index: index_ty,
            element,
        } = &self.ast.type_expr(resolved).kind
        else {
            return Err(self.internal(span, "indexing a non-array value"));
        };

        let element_width = self.type_width_c(element, span)?;
        let min = self
            .ast
            .type_lower_bound(index_ty)
            .ok_or_else(|| self.internal(span, "array index type has no bounds"))?;
        let max = self
            .ast
            .type_upper_bound(index_ty)
            .ok_or_else(|| self.internal(span, "array index type has no bounds"))?;

        let root = if lvalue {
            self.lvalue(array)?
        } else {
            self.rvalue(array)?
        };
        let i = self.rvalue(index)?;

        Ok(format!(
            "handle_index(s, (size_t){element_width}, VALUE_C({min}), VALUE_C({max}), {root}, {i})"
        ))
    }

    /// `handle_narrow(<root>, offset, width)`
    fn field_handle(&mut self, expr: ExprId, lvalue: bool) -> Result<String> {
        let span = self.ast.expr(expr).span;
        let ExprKind::Field { record, field } = self.ast.expr(expr).kind.clone() else {
            return Err(self.internal(span, "not a field expression"));
        };

        let record_ty = self
            .ast
            .expr_type(record)
            .ok_or_else(|| self.internal(span, "field access on an untyped value"))?;
        let (offset, field_decl) = self
            .ast
            .record_field(record_ty, field)
            .ok_or_else(|| self.internal(span, "field not found in record"))?;
        let field_ty = self
            .ast
            .decl(field_decl)
            .declared_type()
            .ok_or_else(|| self.internal(span, "field with no type"))?;
        let width = self.type_width_c(field_ty, span)?;

        let root = if lvalue {
            self.lvalue(record)?
        } else {
            self.rvalue(record)?
        };

        Ok(format!(
            "handle_narrow({root}, (size_t){offset}, (size_t){width})"
        ))
    }

    /// forall/exists compile to the same loop with a short-circuit flag.
    fn quantified(
        &mut self,
        kind: QuantKind,
        quantifier: QuantifierId,
        body: ExprId,
    ) -> Result<String> {
        let result = self.fresh("result");
        let (open, close) = self.quantifier_loop(quantifier)?;
        let b = self.rvalue(body)?;
        Ok(match kind {
            QuantKind::Forall => format!(
                "({{ bool {result} = true; {open} if (!{b}) {{ {result} = false; break; }} {close} {result}; }})"
            ),
            QuantKind::Exists => format!(
                "({{ bool {result} = false; {open} if ({b}) {{ {result} = true; break; }} {close} {result}; }})"
            ),
        })
    }

    /// The loop head and tail for a quantifier. The binding is a `value_t`
    /// named after the quantified variable.
    pub fn quantifier_loop(&mut self, quantifier: QuantifierId) -> Result<(String, String)> {
        let q = self.ast.quantifier(quantifier).clone();
        let binder = self.decl_c_name(q.binding);
        match q.kind {
            QuantifierKind::Over(ty) => {
                let span = self.ast.type_expr(ty).span;
                let lb = self.type_lower_bound_c(ty, span)?;
                let ub = self.type_upper_bound_c(ty, span)?;
                Ok((
                    format!("for (value_t {binder} = {lb}; {binder} <= {ub}; {binder}++) {{"),
                    "}".to_owned(),
                ))
            }
            QuantifierKind::Bounds { from, to, step } => {
                let lo = self.fresh("lb");
                let hi = self.fresh("ub");
                let st = self.fresh("step");
                // constant bounds fold to literals; ruleset loops are
                // emitted in contexts with no state in scope
                let from_v = self.bound_value(from)?;
                let to_v = self.bound_value(to)?;
                let step_v = match step {
                    Some(step) => self.bound_value(step)?,
                    None => "VALUE_C(1)".to_owned(),
                };
                Ok((
                    format!(
                        "{{ const value_t {lo} = {from_v}; const value_t {hi} = {to_v}; const value_t {st} = {step_v}; \
                         for (value_t {binder} = {lo}; {st} > 0 ? {binder} <= {hi} : {binder} >= {hi}; {binder} += {st}) {{"
                    ),
                    "} }".to_owned(),
                ))
            }
        }
    }

    /// A quantifier bound: folded when constant, otherwise rendered as a
    /// runtime expression (legal only where a state is in scope).
    fn bound_value(&mut self, expr: ExprId) -> Result<String> {
        match self.ast.constant_fold(expr) {
            Some(v) => Ok(format!("VALUE_C({v})")),
            None => self.rvalue(expr),
        }
    }

    /// A call. By-reference arguments need an addressable handle, so calls
    /// with any such argument become a statement expression with handle
    /// temporaries.
    pub fn call(
        &mut self,
        name: sift_ir::Name,
        function: sift_ir::FunctionId,
        args: &[ExprId],
    ) -> Result<String> {
        let f_name = self.function_c_name(name);
        let params: Vec<DeclId> = self.ast.function(function).params.clone();

        let mut setup = Vec::new();
        let mut rendered = Vec::new();
        for (&param, &arg) in params.iter().zip(args) {
            match self.ast.decl(param).kind {
                DeclKind::Param { by_ref: true, .. } => {
                    let temp = self.fresh("ref");
                    let handle = self.lvalue(arg)?;
                    setup.push(format!("struct handle {temp} = {handle};"));
                    rendered.push(format!("&{temp}"));
                }
                _ => rendered.push(self.rvalue(arg)?),
            }
        }

        let mut all_args = vec!["s".to_owned()];
        all_args.extend(rendered);
        let call = format!("{f_name}({})", all_args.join(", "));

        if setup.is_empty() {
            Ok(call)
        } else {
            Ok(format!("({{ {} {call}; }})", setup.join(" ")))
        }
    }

    /// The display name of a rule for runtime messages.
    pub fn rule_display_name(&self, name: Option<sift_ir::Name>, fallback: &str) -> String {
        match name {
            Some(name) => escape_c(self.interner.lookup(name)),
            None => fallback.to_owned(),
        }
    }
}
