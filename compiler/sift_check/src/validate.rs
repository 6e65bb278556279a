//! Validation of the resolved model.
//!
//! Enforces the language rules that resolution alone cannot: constants
//! where constants are required, boolean guards and conditions, index and
//! assignment compatibility, and the no-value-return rule inside rules and
//! startstates. Traversal of a rule body deliberately does not descend
//! into called functions; a function's own body is validated once, with
//! function context.

use sift_diagnostic::{Diagnostic, Result};
use sift_ir::{
    Ast, DeclId, DeclKind, ExprId, ExprKind, Function, Model, QuantifierId, QuantifierKind,
    RuleId, RuleKind, StmtId, StmtKind, StringInterner, TypeId, TypeKind, UnaryOp, PutArg,
};

/// Where a statement lives, for return checking.
#[derive(Copy, Clone)]
enum Context<'f> {
    Rule,
    Function(&'f Function),
}

pub fn validate(ast: &Ast, model: &Model, interner: &StringInterner) -> Result<()> {
    let v = Validator { ast, interner };
    for &decl in &model.decls {
        v.validate_decl(decl)?;
    }
    for &function in &model.functions {
        let f = ast.function(function);
        for &param in &f.params {
            v.validate_decl(param)?;
        }
        for &decl in &f.decls {
            v.validate_decl(decl)?;
        }
        for &stmt in &f.body {
            v.validate_stmt(stmt, Context::Function(f))?;
        }
    }
    for &rule in &model.rules {
        v.validate_rule(rule)?;
    }
    Ok(())
}

struct Validator<'a> {
    ast: &'a Ast,
    interner: &'a StringInterner,
}

impl Validator<'_> {
    fn validate_decl(&self, decl: DeclId) -> Result<()> {
        let d = self.ast.decl(decl);
        match &d.kind {
            DeclKind::Const { value } => {
                if !self.ast.constant(*value) {
                    return Err(Diagnostic::type_error(
                        self.ast.expr(*value).span,
                        "const definition is not a constant",
                    ));
                }
                if self.ast.constant_fold(*value).is_none() {
                    return Err(Diagnostic::type_error(
                        self.ast.expr(*value).span,
                        "overflow while evaluating constant",
                    ));
                }
                self.validate_expr(*value)
            }
            DeclKind::Type { value } => self.validate_type(*value),
            DeclKind::Var { ty, .. } | DeclKind::Param { ty, .. } => self.validate_type(*ty),
            DeclKind::Alias { value } => self.validate_expr(*value),
            DeclKind::Binding { .. } | DeclKind::EnumMember { .. } => Ok(()),
        }
    }

    fn validate_type(&self, ty: TypeId) -> Result<()> {
        let t = self.ast.type_expr(ty);
        match &t.kind {
            TypeKind::Range { min, max } => {
                for &bound in [min, max] {
                    if !self.ast.constant(bound) {
                        return Err(Diagnostic::type_error(
                            self.ast.expr(bound).span,
                            "range bound is not a constant",
                        ));
                    }
                    self.validate_expr(bound)?;
                }
                Ok(())
            }
            TypeKind::Scalarset { bound } => {
                if !self.ast.constant(*bound) {
                    return Err(Diagnostic::type_error(
                        self.ast.expr(*bound).span,
                        "scalarset bound is not a constant",
                    ));
                }
                if self.ast.constant_fold(*bound).is_some_and(|b| b < 1) {
                    return Err(Diagnostic::type_error(
                        self.ast.expr(*bound).span,
                        "scalarset bound must be positive",
                    ));
                }
                self.validate_expr(*bound)
            }
            TypeKind::Array { index, element } => {
                if !self.ast.type_is_simple(*index) {
                    return Err(Diagnostic::type_error(
                        self.ast.type_expr(*index).span,
                        "array index type must be a simple type",
                    ));
                }
                self.validate_type(*index)?;
                self.validate_type(*element)
            }
            TypeKind::Record { fields } => {
                for &field in fields {
                    self.validate_decl(field)?;
                }
                Ok(())
            }
            TypeKind::Enum { .. } | TypeKind::Named { .. } => Ok(()),
        }
    }

    fn validate_expr(&self, expr: ExprId) -> Result<()> {
        let e = self.ast.expr(expr);
        match &e.kind {
            ExprKind::Number(_) | ExprKind::Ident { .. } => Ok(()),
            ExprKind::Binary { op, lhs, rhs } => {
                self.validate_expr(*lhs)?;
                self.validate_expr(*rhs)?;
                if op.is_logical() {
                    self.require_boolean(*lhs, "logical operand")?;
                    self.require_boolean(*rhs, "logical operand")?;
                }
                Ok(())
            }
            ExprKind::Unary { op, operand } => {
                self.validate_expr(*operand)?;
                if matches!(op, UnaryOp::Not) {
                    self.require_boolean(*operand, "operand of `!`")?;
                }
                Ok(())
            }
            ExprKind::Ternary { cond, lhs, rhs } => {
                self.validate_expr(*cond)?;
                self.require_boolean(*cond, "ternary condition")?;
                self.validate_expr(*lhs)?;
                self.validate_expr(*rhs)
            }
            ExprKind::Element { array, index } => {
                self.validate_expr(*array)?;
                self.validate_expr(*index)?;
                let Some(array_ty) = self.ast.expr_type(*array) else {
                    return Err(Diagnostic::type_error(
                        e.span,
                        "cannot index into a non-array value",
                    ));
                };
                let resolved = self.ast.resolve_type(array_ty);
                let TypeKind::Array { index: index_ty, .. } =
                    &self.ast.type_expr(resolved).kind
                else {
                    return Err(Diagnostic::type_error(
                        e.span,
                        "cannot index into a non-array value",
                    ));
                };
                if !self
                    .ast
                    .type_assignable(*index_ty, self.ast.expr_type(*index))
                {
                    return Err(Diagnostic::type_error(
                        self.ast.expr(*index).span,
                        "index expression incompatible with the array's index type",
                    ));
                }
                Ok(())
            }
            ExprKind::Field { record, field } => {
                self.validate_expr(*record)?;
                let record_ty = self.ast.expr_type(*record).ok_or_else(|| {
                    Diagnostic::type_error(
                        e.span,
                        "left hand side of field expression is not a record",
                    )
                })?;
                let resolved = self.ast.resolve_type(record_ty);
                if !matches!(self.ast.type_expr(resolved).kind, TypeKind::Record { .. }) {
                    return Err(Diagnostic::type_error(
                        e.span,
                        "left hand side of field expression is not a record",
                    ));
                }
                if self.ast.record_field(record_ty, *field).is_none() {
                    return Err(Diagnostic::type_error(
                        e.span,
                        format!(
                            "no field named {} in record",
                            self.interner.lookup(*field)
                        ),
                    ));
                }
                Ok(())
            }
            ExprKind::Quantified {
                quantifier, body, ..
            } => {
                self.validate_quantifier(*quantifier, false)?;
                self.validate_expr(*body)?;
                self.require_boolean(*body, "quantified expression body")
            }
            ExprKind::Call { referent, args, .. } => {
                for &arg in args {
                    self.validate_expr(arg)?;
                }
                if let Some(function) = referent {
                    self.validate_call_args(e.span, *function, args)?;
                }
                Ok(())
            }
            ExprKind::IsUndefined(operand) => {
                self.validate_expr(*operand)?;
                if !self.ast.is_lvalue(*operand) {
                    return Err(Diagnostic::type_error(
                        self.ast.expr(*operand).span,
                        "isundefined requires a variable",
                    ));
                }
                Ok(())
            }
        }
    }

    fn validate_call_args(
        &self,
        span: sift_ir::Span,
        function: sift_ir::FunctionId,
        args: &[ExprId],
    ) -> Result<()> {
        let f = self.ast.function(function);
        if f.params.len() != args.len() {
            return Err(Diagnostic::type_error(
                span,
                format!(
                    "{} expects {} arguments, given {}",
                    self.interner.lookup(f.name),
                    f.params.len(),
                    args.len()
                ),
            ));
        }
        for (&param, &arg) in f.params.iter().zip(args) {
            if let DeclKind::Param { by_ref: true, .. } = self.ast.decl(param).kind {
                if !self.ast.is_lvalue(arg) {
                    return Err(Diagnostic::type_error(
                        self.ast.expr(arg).span,
                        "var parameter requires a variable argument",
                    ));
                }
            }
        }
        Ok(())
    }

    fn validate_quantifier(&self, quantifier: QuantifierId, require_constant: bool) -> Result<()> {
        let q = self.ast.quantifier(quantifier);
        match &q.kind {
            QuantifierKind::Over(ty) => {
                self.validate_type(*ty)?;
                if !self.ast.type_is_simple(*ty) {
                    return Err(Diagnostic::type_error(
                        self.ast.type_expr(*ty).span,
                        "quantifier type must be a simple type",
                    ));
                }
                Ok(())
            }
            QuantifierKind::Bounds { from, to, step } => {
                let mut bounds = vec![*from, *to];
                bounds.extend(*step);
                for bound in bounds {
                    self.validate_expr(bound)?;
                    if require_constant && !self.ast.constant(bound) {
                        return Err(Diagnostic::type_error(
                            self.ast.expr(bound).span,
                            "non-constant quantifier expression as ruleset parameter",
                        ));
                    }
                }
                Ok(())
            }
        }
    }

    fn validate_stmt(&self, stmt: StmtId, context: Context<'_>) -> Result<()> {
        let s = self.ast.stmt(stmt);
        match &s.kind {
            StmtKind::Assignment { lhs, rhs } => {
                self.validate_expr(*lhs)?;
                self.validate_expr(*rhs)?;
                if !self.ast.is_lvalue(*lhs) {
                    return Err(Diagnostic::type_error(
                        self.ast.expr(*lhs).span,
                        "assignment to a non-assignable expression",
                    ));
                }
                let lhs_ty = self.ast.expr_type(*lhs);
                match lhs_ty {
                    Some(ty) if self.ast.type_is_simple(ty) => {
                        if !self.ast.type_assignable(ty, self.ast.expr_type(*rhs)) {
                            return Err(Diagnostic::type_error(
                                self.ast.expr(*rhs).span,
                                "assigned value incompatible with the target's type",
                            ));
                        }
                    }
                    Some(ty) => {
                        // aggregate assignment copies bits; shapes must match
                        let matches = self
                            .ast
                            .expr_type(*rhs)
                            .is_some_and(|rhs_ty| self.ast.type_eq(ty, rhs_ty));
                        if !matches {
                            return Err(Diagnostic::type_error(
                                self.ast.expr(*rhs).span,
                                "aggregate assignment between incompatible types",
                            ));
                        }
                    }
                    None => {}
                }
                Ok(())
            }
            StmtKind::Clear { target } | StmtKind::Undefine { target } => {
                self.validate_expr(*target)?;
                if !self.ast.is_lvalue(*target) {
                    return Err(Diagnostic::type_error(
                        self.ast.expr(*target).span,
                        "operand must be a variable",
                    ));
                }
                Ok(())
            }
            StmtKind::Call { referent, args, .. } => {
                for &arg in args {
                    self.validate_expr(arg)?;
                }
                if let Some(function) = referent {
                    self.validate_call_args(s.span, *function, args)?;
                }
                Ok(())
            }
            StmtKind::Return { value } => match (context, value) {
                (Context::Rule, Some(_)) => Err(Diagnostic::semantic(
                    s.span,
                    "return statement in rule or startstate returns a value",
                )),
                (Context::Function(f), Some(value)) => {
                    self.validate_expr(*value)?;
                    if f.return_type.is_none() {
                        return Err(Diagnostic::semantic(
                            s.span,
                            "return statement in procedure returns a value",
                        ));
                    }
                    Ok(())
                }
                (Context::Function(f), None) => {
                    if f.return_type.is_some() {
                        return Err(Diagnostic::semantic(
                            s.span,
                            "return statement in function is missing a value",
                        ));
                    }
                    Ok(())
                }
                (Context::Rule, None) => Ok(()),
            },
            StmtKind::For { quantifier, body } => {
                self.validate_quantifier(*quantifier, false)?;
                self.validate_stmts(body, context)
            }
            StmtKind::If { clauses } => {
                for (i, clause) in clauses.iter().enumerate() {
                    match clause.condition {
                        Some(condition) => {
                            self.validate_expr(condition)?;
                            self.require_boolean(condition, "if condition")?;
                        }
                        None => {
                            // only the trailing else may be unconditioned
                            if i + 1 != clauses.len() {
                                return Err(Diagnostic::semantic(
                                    clause.span,
                                    "unconditioned clause before the end of an if statement",
                                ));
                            }
                        }
                    }
                    self.validate_stmts(&clause.body, context)?;
                }
                Ok(())
            }
            StmtKind::Switch {
                value,
                cases,
                default,
            } => {
                self.validate_expr(*value)?;
                for case in cases {
                    for &m in &case.matches {
                        self.validate_expr(m)?;
                    }
                    self.validate_stmts(&case.body, context)?;
                }
                self.validate_stmts(default, context)
            }
            StmtKind::While { condition, body } => {
                self.validate_expr(*condition)?;
                self.require_boolean(*condition, "while condition")?;
                self.validate_stmts(body, context)
            }
            StmtKind::Alias { aliases, body } => {
                for &alias in aliases {
                    self.validate_decl(alias)?;
                }
                self.validate_stmts(body, context)
            }
            StmtKind::Property { property, .. } => {
                self.validate_expr(property.expr)?;
                self.require_boolean(property.expr, "property expression")
            }
            StmtKind::Put { arg } => match arg {
                PutArg::Value(expr) => self.validate_expr(*expr),
                PutArg::Text(_) => Ok(()),
            },
            StmtKind::Error { .. } => Ok(()),
        }
    }

    fn validate_stmts(&self, stmts: &[StmtId], context: Context<'_>) -> Result<()> {
        for &stmt in stmts {
            self.validate_stmt(stmt, context)?;
        }
        Ok(())
    }

    fn validate_rule(&self, rule: RuleId) -> Result<()> {
        match &self.ast.rule(rule).kind {
            RuleKind::Simple {
                guard, decls, body, ..
            } => {
                if let Some(guard) = guard {
                    self.validate_expr(*guard)?;
                    self.require_boolean(*guard, "rule guard")?;
                }
                for &decl in decls {
                    self.validate_decl(decl)?;
                }
                self.validate_stmts(body, Context::Rule)
            }
            RuleKind::StartState { decls, body, .. } => {
                for &decl in decls {
                    self.validate_decl(decl)?;
                }
                self.validate_stmts(body, Context::Rule)
            }
            RuleKind::Property { property, .. } => {
                self.validate_expr(property.expr)?;
                self.require_boolean(property.expr, "property expression")
            }
            RuleKind::AliasGroup { aliases, rules } => {
                for &alias in aliases {
                    self.validate_decl(alias)?;
                }
                for &rule in rules {
                    self.validate_rule(rule)?;
                }
                Ok(())
            }
            RuleKind::Ruleset { quantifiers, rules } => {
                for &quantifier in quantifiers {
                    self.validate_quantifier(quantifier, true)?;
                }
                for &rule in rules {
                    self.validate_rule(rule)?;
                }
                Ok(())
            }
        }
    }

    fn require_boolean(&self, expr: ExprId, what: &str) -> Result<()> {
        let is_boolean = self
            .ast
            .expr_type(expr)
            .is_some_and(|ty| self.ast.type_is_boolean(ty));
        if is_boolean {
            Ok(())
        } else {
            Err(Diagnostic::type_error(
                self.ast.expr(expr).span,
                format!("{what} must be a boolean"),
            ))
        }
    }
}
