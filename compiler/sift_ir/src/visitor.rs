//! Read-only AST traversal.
//!
//! Override `visit_*` methods for custom behavior at specific nodes and
//! call the matching `walk_*` function to continue into children. Defaults
//! recurse everywhere, with one deliberate exception: walking a call visits
//! its arguments but never the callee's body - functions are traversed once,
//! from the model, so analyses like the rule return-checker stop at function
//! boundaries for free.

use crate::ast::{
    DeclKind, ExprKind, Function, Model, PutArg, QuantifierKind, Rule, RuleKind, StmtKind,
    TypeKind,
};
use crate::{Ast, DeclId, ExprId, QuantifierId, RuleId, StmtId, TypeId};

pub trait Visitor: Sized {
    fn visit_model(&mut self, ast: &Ast, model: &Model) {
        walk_model(self, ast, model);
    }

    fn visit_decl(&mut self, ast: &Ast, decl: DeclId) {
        walk_decl(self, ast, decl);
    }

    fn visit_type(&mut self, ast: &Ast, ty: TypeId) {
        walk_type(self, ast, ty);
    }

    fn visit_expr(&mut self, ast: &Ast, expr: ExprId) {
        walk_expr(self, ast, expr);
    }

    fn visit_stmt(&mut self, ast: &Ast, stmt: StmtId) {
        walk_stmt(self, ast, stmt);
    }

    fn visit_quantifier(&mut self, ast: &Ast, quantifier: QuantifierId) {
        walk_quantifier(self, ast, quantifier);
    }

    fn visit_function(&mut self, ast: &Ast, function: &Function) {
        walk_function(self, ast, function);
    }

    fn visit_rule(&mut self, ast: &Ast, rule: RuleId) {
        walk_rule(self, ast, ast.rule(rule));
    }
}

pub fn walk_model<V: Visitor>(visitor: &mut V, ast: &Ast, model: &Model) {
    for &decl in &model.decls {
        visitor.visit_decl(ast, decl);
    }
    for &function in &model.functions {
        visitor.visit_function(ast, ast.function(function));
    }
    for &rule in &model.rules {
        visitor.visit_rule(ast, rule);
    }
}

pub fn walk_decl<V: Visitor>(visitor: &mut V, ast: &Ast, decl: DeclId) {
    match &ast.decl(decl).kind {
        DeclKind::Const { value } | DeclKind::Alias { value } => visitor.visit_expr(ast, *value),
        DeclKind::Type { value } => visitor.visit_type(ast, *value),
        DeclKind::Var { ty, .. } | DeclKind::Param { ty, .. } | DeclKind::EnumMember { ty, .. } => {
            visitor.visit_type(ast, *ty);
        }
        DeclKind::Binding { ty } => {
            if let crate::BindingType::Type(ty) = ty {
                visitor.visit_type(ast, *ty);
            }
        }
    }
}

pub fn walk_type<V: Visitor>(visitor: &mut V, ast: &Ast, ty: TypeId) {
    match &ast.type_expr(ty).kind {
        TypeKind::Range { min, max } => {
            visitor.visit_expr(ast, *min);
            visitor.visit_expr(ast, *max);
        }
        TypeKind::Scalarset { bound } => visitor.visit_expr(ast, *bound),
        TypeKind::Array { index, element } => {
            visitor.visit_type(ast, *index);
            visitor.visit_type(ast, *element);
        }
        TypeKind::Record { fields } => {
            for &field in fields {
                visitor.visit_decl(ast, field);
            }
        }
        TypeKind::Enum { .. } | TypeKind::Named { .. } => {}
    }
}

pub fn walk_expr<V: Visitor>(visitor: &mut V, ast: &Ast, expr: ExprId) {
    match &ast.expr(expr).kind {
        ExprKind::Number(_) | ExprKind::Ident { .. } => {}
        ExprKind::Binary { lhs, rhs, .. } => {
            visitor.visit_expr(ast, *lhs);
            visitor.visit_expr(ast, *rhs);
        }
        ExprKind::Unary { operand, .. } => visitor.visit_expr(ast, *operand),
        ExprKind::Ternary { cond, lhs, rhs } => {
            visitor.visit_expr(ast, *cond);
            visitor.visit_expr(ast, *lhs);
            visitor.visit_expr(ast, *rhs);
        }
        ExprKind::Element { array, index } => {
            visitor.visit_expr(ast, *array);
            visitor.visit_expr(ast, *index);
        }
        ExprKind::Field { record, .. } => visitor.visit_expr(ast, *record),
        ExprKind::Quantified {
            quantifier, body, ..
        } => {
            visitor.visit_quantifier(ast, *quantifier);
            visitor.visit_expr(ast, *body);
        }
        ExprKind::Call { args, .. } => {
            for &arg in args {
                visitor.visit_expr(ast, arg);
            }
        }
        ExprKind::IsUndefined(operand) => visitor.visit_expr(ast, *operand),
    }
}

pub fn walk_stmt<V: Visitor>(visitor: &mut V, ast: &Ast, stmt: StmtId) {
    match &ast.stmt(stmt).kind {
        StmtKind::Assignment { lhs, rhs } => {
            visitor.visit_expr(ast, *lhs);
            visitor.visit_expr(ast, *rhs);
        }
        StmtKind::Clear { target } | StmtKind::Undefine { target } => {
            visitor.visit_expr(ast, *target);
        }
        StmtKind::Call { args, .. } => {
            for &arg in args {
                visitor.visit_expr(ast, arg);
            }
        }
        StmtKind::Return { value } => {
            if let Some(value) = value {
                visitor.visit_expr(ast, *value);
            }
        }
        StmtKind::For { quantifier, body } => {
            visitor.visit_quantifier(ast, *quantifier);
            for &stmt in body {
                visitor.visit_stmt(ast, stmt);
            }
        }
        StmtKind::If { clauses } => {
            for clause in clauses {
                if let Some(condition) = clause.condition {
                    visitor.visit_expr(ast, condition);
                }
                for &stmt in &clause.body {
                    visitor.visit_stmt(ast, stmt);
                }
            }
        }
        StmtKind::Switch {
            value,
            cases,
            default,
        } => {
            visitor.visit_expr(ast, *value);
            for case in cases {
                for &m in &case.matches {
                    visitor.visit_expr(ast, m);
                }
                for &stmt in &case.body {
                    visitor.visit_stmt(ast, stmt);
                }
            }
            for &stmt in default {
                visitor.visit_stmt(ast, stmt);
            }
        }
        StmtKind::While { condition, body } => {
            visitor.visit_expr(ast, *condition);
            for &stmt in body {
                visitor.visit_stmt(ast, stmt);
            }
        }
        StmtKind::Alias { aliases, body } => {
            for &alias in aliases {
                visitor.visit_decl(ast, alias);
            }
            for &stmt in body {
                visitor.visit_stmt(ast, stmt);
            }
        }
        StmtKind::Property { property, .. } => visitor.visit_expr(ast, property.expr),
        StmtKind::Put { arg } => {
            if let PutArg::Value(expr) = arg {
                visitor.visit_expr(ast, *expr);
            }
        }
        StmtKind::Error { .. } => {}
    }
}

pub fn walk_quantifier<V: Visitor>(visitor: &mut V, ast: &Ast, quantifier: QuantifierId) {
    let q = ast.quantifier(quantifier);
    visitor.visit_decl(ast, q.binding);
    match &q.kind {
        QuantifierKind::Over(ty) => visitor.visit_type(ast, *ty),
        QuantifierKind::Bounds { from, to, step } => {
            visitor.visit_expr(ast, *from);
            visitor.visit_expr(ast, *to);
            if let Some(step) = step {
                visitor.visit_expr(ast, *step);
            }
        }
    }
}

pub fn walk_function<V: Visitor>(visitor: &mut V, ast: &Ast, function: &Function) {
    for &param in &function.params {
        visitor.visit_decl(ast, param);
    }
    if let Some(ret) = function.return_type {
        visitor.visit_type(ast, ret);
    }
    for &decl in &function.decls {
        visitor.visit_decl(ast, decl);
    }
    for &stmt in &function.body {
        visitor.visit_stmt(ast, stmt);
    }
}

pub fn walk_rule<V: Visitor>(visitor: &mut V, ast: &Ast, rule: &Rule) {
    match &rule.kind {
        RuleKind::Simple {
            guard,
            decls,
            body,
            aliases,
            quantifiers,
            ..
        } => {
            for &q in quantifiers {
                visitor.visit_quantifier(ast, q);
            }
            for &a in aliases {
                visitor.visit_decl(ast, a);
            }
            if let Some(guard) = guard {
                visitor.visit_expr(ast, *guard);
            }
            for &decl in decls {
                visitor.visit_decl(ast, decl);
            }
            for &stmt in body {
                visitor.visit_stmt(ast, stmt);
            }
        }
        RuleKind::StartState {
            decls,
            body,
            aliases,
            quantifiers,
            ..
        } => {
            for &q in quantifiers {
                visitor.visit_quantifier(ast, q);
            }
            for &a in aliases {
                visitor.visit_decl(ast, a);
            }
            for &decl in decls {
                visitor.visit_decl(ast, decl);
            }
            for &stmt in body {
                visitor.visit_stmt(ast, stmt);
            }
        }
        RuleKind::Property {
            property,
            aliases,
            quantifiers,
            ..
        } => {
            for &q in quantifiers {
                visitor.visit_quantifier(ast, q);
            }
            for &a in aliases {
                visitor.visit_decl(ast, a);
            }
            visitor.visit_expr(ast, property.expr);
        }
        RuleKind::AliasGroup { aliases, rules } => {
            for &a in aliases {
                visitor.visit_decl(ast, a);
            }
            for &rule in rules {
                visitor.visit_rule(ast, rule);
            }
        }
        RuleKind::Ruleset { quantifiers, rules } => {
            for &q in quantifiers {
                visitor.visit_quantifier(ast, q);
            }
            for &rule in rules {
                visitor.visit_rule(ast, rule);
            }
        }
    }
}
