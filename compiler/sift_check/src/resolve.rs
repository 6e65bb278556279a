//! Symbol resolution.
//!
//! Walks the model with a scoped symbol table, populating the `referent`
//! field of every identifier and named type. Top-level declarations are
//! visible to everything declared after them; enum members become global
//! constants of their enum type.

use rustc_hash::{FxHashMap, FxHashSet};
use sift_diagnostic::{Diagnostic, Result};
use sift_ir::{
    decl_kind_noun, Ast, Decl, DeclId, DeclKind, ExprId, ExprKind, FunctionId, Model, Name,
    QuantifierId, QuantifierKind, RuleId, RuleKind, Span, StmtId, StmtKind, SymbolTable, TypeId,
    TypeKind, PutArg, StringInterner,
};
use tracing::debug;

pub struct Resolver<'a> {
    ast: &'a mut Ast,
    interner: &'a StringInterner,
    symtab: SymbolTable,
    functions: FxHashMap<Name, FunctionId>,
    /// Types already resolved. Variable lists share one type node
    /// (`var a, b: t`), and an enum must only declare its members once.
    resolved_types: FxHashSet<TypeId>,
}

impl<'a> Resolver<'a> {
    pub fn new(ast: &'a mut Ast, interner: &'a StringInterner) -> Self {
        Resolver {
            ast,
            interner,
            symtab: SymbolTable::new(),
            functions: FxHashMap::default(),
            resolved_types: FxHashSet::default(),
        }
    }

    pub fn resolve_model(mut self, model: &Model) -> Result<()> {
        self.symtab.open_scope();

        for &builtin in &self.ast.builtin_decls.clone() {
            self.declare(builtin)?;
        }

        for &decl in &model.decls {
            self.resolve_decl(decl)?;
            self.declare(decl)?;
        }

        for &function in &model.functions {
            let f = self.ast.function(function);
            let name = f.name;
            if self.functions.insert(name, function).is_some() {
                return Err(Diagnostic::resolution(
                    self.ast.function(function).span,
                    format!("function {} redefined", self.interner.lookup(name)),
                ));
            }
            self.resolve_function(function)?;
        }

        for &rule in &model.rules {
            self.resolve_rule(rule)?;
        }

        self.symtab.close_scope();
        debug!("resolved all symbols");
        Ok(())
    }

    fn declare(&mut self, decl: DeclId) -> Result<()> {
        let name = self.ast.decl(decl).name;
        if self.symtab.declare(name, decl).is_some() {
            return Err(Diagnostic::resolution(
                self.ast.decl(decl).span,
                format!("{} redefined", self.interner.lookup(name)),
            ));
        }
        Ok(())
    }

    fn resolve_decl(&mut self, decl: DeclId) -> Result<()> {
        match self.ast.decl(decl).kind {
            DeclKind::Const { value } | DeclKind::Alias { value } => self.resolve_expr(value),
            DeclKind::Type { value } => self.resolve_type(value),
            DeclKind::Var { ty, .. } | DeclKind::Param { ty, .. } => self.resolve_type(ty),
            DeclKind::Binding { .. } | DeclKind::EnumMember { .. } => Ok(()),
        }
    }

    fn resolve_type(&mut self, ty: TypeId) -> Result<()> {
        if !self.resolved_types.insert(ty) {
            return Ok(());
        }
        match self.ast.type_expr(ty).kind.clone() {
            TypeKind::Range { min, max } => {
                self.resolve_expr(min)?;
                self.resolve_expr(max)
            }
            TypeKind::Scalarset { bound } => self.resolve_expr(bound),
            TypeKind::Array { index, element } => {
                self.resolve_type(index)?;
                self.resolve_type(element)
            }
            TypeKind::Record { fields } => {
                let mut seen = FxHashSet::default();
                for field in fields {
                    let field_decl = self.ast.decl(field);
                    if !seen.insert(field_decl.name) {
                        return Err(Diagnostic::resolution(
                            field_decl.span,
                            format!(
                                "duplicate field {} in record",
                                self.interner.lookup(field_decl.name)
                            ),
                        ));
                    }
                    self.resolve_decl(field)?;
                }
                Ok(())
            }
            TypeKind::Enum { members } => {
                // enum members become constants in the enclosing scope
                for (index, (name, span)) in members.iter().enumerate() {
                    let member = self.ast.alloc_decl(Decl {
                        name: *name,
                        kind: DeclKind::EnumMember {
                            ty,
                            index: index as u64,
                        },
                        span: *span,
                    });
                    self.declare(member)?;
                }
                Ok(())
            }
            TypeKind::Named { name, .. } => {
                let referent = self.lookup(name, self.ast.type_expr(ty).span)?;
                if !matches!(self.ast.decl(referent).kind, DeclKind::Type { .. }) {
                    return Err(Diagnostic::resolution(
                        self.ast.type_expr(ty).span,
                        format!(
                            "{} is a {}, not a type",
                            self.interner.lookup(name),
                            decl_kind_noun(&self.ast.decl(referent).kind)
                        ),
                    ));
                }
                match &mut self.ast.type_expr_mut(ty).kind {
                    TypeKind::Named { referent: slot, .. } => *slot = Some(referent),
                    _ => unreachable!("node kind changed during resolution"),
                }
                Ok(())
            }
        }
    }

    fn resolve_expr(&mut self, expr: ExprId) -> Result<()> {
        match self.ast.expr(expr).kind.clone() {
            ExprKind::Number(_) => Ok(()),
            ExprKind::Ident { name, .. } => {
                let referent = self.lookup(name, self.ast.expr(expr).span)?;
                if matches!(self.ast.decl(referent).kind, DeclKind::Type { .. }) {
                    return Err(Diagnostic::resolution(
                        self.ast.expr(expr).span,
                        format!(
                            "type {} used in an expression",
                            self.interner.lookup(name)
                        ),
                    ));
                }
                match &mut self.ast.expr_mut(expr).kind {
                    ExprKind::Ident { referent: slot, .. } => *slot = Some(referent),
                    _ => unreachable!("node kind changed during resolution"),
                }
                Ok(())
            }
            ExprKind::Binary { lhs, rhs, .. } => {
                self.resolve_expr(lhs)?;
                self.resolve_expr(rhs)
            }
            ExprKind::Unary { operand, .. } | ExprKind::IsUndefined(operand) => {
                self.resolve_expr(operand)
            }
            ExprKind::Ternary { cond, lhs, rhs } => {
                self.resolve_expr(cond)?;
                self.resolve_expr(lhs)?;
                self.resolve_expr(rhs)
            }
            ExprKind::Element { array, index } => {
                self.resolve_expr(array)?;
                self.resolve_expr(index)
            }
            ExprKind::Field { record, .. } => self.resolve_expr(record),
            ExprKind::Quantified {
                quantifier, body, ..
            } => {
                self.symtab.open_scope();
                self.resolve_quantifier(quantifier)?;
                self.resolve_expr(body)?;
                self.symtab.close_scope();
                Ok(())
            }
            ExprKind::Call { name, args, .. } => {
                for arg in args {
                    self.resolve_expr(arg)?;
                }
                let function = self.lookup_function(name, self.ast.expr(expr).span)?;
                if self.ast.function(function).return_type.is_none() {
                    return Err(Diagnostic::resolution(
                        self.ast.expr(expr).span,
                        format!(
                            "procedure {} called in an expression",
                            self.interner.lookup(name)
                        ),
                    ));
                }
                match &mut self.ast.expr_mut(expr).kind {
                    ExprKind::Call { referent, .. } => *referent = Some(function),
                    _ => unreachable!("node kind changed during resolution"),
                }
                Ok(())
            }
        }
    }

    fn resolve_stmt(&mut self, stmt: StmtId) -> Result<()> {
        match self.ast.stmt(stmt).kind.clone() {
            StmtKind::Assignment { lhs, rhs } => {
                self.resolve_expr(lhs)?;
                self.resolve_expr(rhs)
            }
            StmtKind::Clear { target } | StmtKind::Undefine { target } => {
                self.resolve_expr(target)
            }
            StmtKind::Call { name, args, .. } => {
                for arg in args {
                    self.resolve_expr(arg)?;
                }
                let function = self.lookup_function(name, self.ast.stmt(stmt).span)?;
                match &mut self.ast.stmt_mut(stmt).kind {
                    StmtKind::Call { referent, .. } => *referent = Some(function),
                    _ => unreachable!("node kind changed during resolution"),
                }
                Ok(())
            }
            StmtKind::Return { value } => value.map_or(Ok(()), |v| self.resolve_expr(v)),
            StmtKind::For { quantifier, body } => {
                self.symtab.open_scope();
                self.resolve_quantifier(quantifier)?;
                self.resolve_stmts(&body)?;
                self.symtab.close_scope();
                Ok(())
            }
            StmtKind::If { clauses } => {
                for clause in clauses {
                    if let Some(condition) = clause.condition {
                        self.resolve_expr(condition)?;
                    }
                    self.resolve_stmts(&clause.body)?;
                }
                Ok(())
            }
            StmtKind::Switch {
                value,
                cases,
                default,
            } => {
                self.resolve_expr(value)?;
                for case in cases {
                    for m in case.matches {
                        self.resolve_expr(m)?;
                    }
                    self.resolve_stmts(&case.body)?;
                }
                self.resolve_stmts(&default)
            }
            StmtKind::While { condition, body } => {
                self.resolve_expr(condition)?;
                self.resolve_stmts(&body)
            }
            StmtKind::Alias { aliases, body } => {
                self.symtab.open_scope();
                for alias in aliases {
                    self.resolve_decl(alias)?;
                    self.declare(alias)?;
                }
                self.resolve_stmts(&body)?;
                self.symtab.close_scope();
                Ok(())
            }
            StmtKind::Property { property, .. } => self.resolve_expr(property.expr),
            StmtKind::Put { arg } => match arg {
                PutArg::Value(expr) => self.resolve_expr(expr),
                PutArg::Text(_) => Ok(()),
            },
            StmtKind::Error { .. } => Ok(()),
        }
    }

    fn resolve_stmts(&mut self, stmts: &[StmtId]) -> Result<()> {
        for &stmt in stmts {
            self.resolve_stmt(stmt)?;
        }
        Ok(())
    }

    fn resolve_quantifier(&mut self, quantifier: QuantifierId) -> Result<()> {
        let q = self.ast.quantifier(quantifier).clone();
        match q.kind {
            QuantifierKind::Over(ty) => self.resolve_type(ty)?,
            QuantifierKind::Bounds { from, to, step } => {
                self.resolve_expr(from)?;
                self.resolve_expr(to)?;
                if let Some(step) = step {
                    self.resolve_expr(step)?;
                }
            }
        }
        self.declare(q.binding)
    }

    fn resolve_function(&mut self, function: FunctionId) -> Result<()> {
        let f = self.ast.function(function).clone();
        self.symtab.open_scope();
        for &param in &f.params {
            self.resolve_decl(param)?;
            self.declare(param)?;
        }
        if let Some(ret) = f.return_type {
            self.resolve_type(ret)?;
        }
        for &decl in &f.decls {
            self.resolve_decl(decl)?;
            self.declare(decl)?;
        }
        self.resolve_stmts(&f.body)?;
        self.symtab.close_scope();
        Ok(())
    }

    fn resolve_rule(&mut self, rule: RuleId) -> Result<()> {
        match self.ast.rule(rule).kind.clone() {
            RuleKind::Simple {
                guard, decls, body, ..
            } => {
                self.symtab.open_scope();
                if let Some(guard) = guard {
                    self.resolve_expr(guard)?;
                }
                for decl in decls {
                    self.resolve_decl(decl)?;
                    self.declare(decl)?;
                }
                self.resolve_stmts(&body)?;
                self.symtab.close_scope();
                Ok(())
            }
            RuleKind::StartState { decls, body, .. } => {
                self.symtab.open_scope();
                for decl in decls {
                    self.resolve_decl(decl)?;
                    self.declare(decl)?;
                }
                self.resolve_stmts(&body)?;
                self.symtab.close_scope();
                Ok(())
            }
            RuleKind::Property { property, .. } => self.resolve_expr(property.expr),
            RuleKind::AliasGroup { aliases, rules } => {
                self.symtab.open_scope();
                for alias in aliases {
                    self.resolve_decl(alias)?;
                    self.declare(alias)?;
                }
                for rule in rules {
                    self.resolve_rule(rule)?;
                }
                self.symtab.close_scope();
                Ok(())
            }
            RuleKind::Ruleset { quantifiers, rules } => {
                self.symtab.open_scope();
                for quantifier in quantifiers {
                    self.resolve_quantifier(quantifier)?;
                }
                for rule in rules {
                    self.resolve_rule(rule)?;
                }
                self.symtab.close_scope();
                Ok(())
            }
        }
    }

    fn lookup(&self, name: Name, span: Span) -> Result<DeclId> {
        self.symtab.lookup(name).ok_or_else(|| {
            Diagnostic::resolution(
                span,
                format!("unknown symbol: {}", self.interner.lookup(name)),
            )
        })
    }

    fn lookup_function(&self, name: Name, span: Span) -> Result<FunctionId> {
        self.functions.get(&name).copied().ok_or_else(|| {
            Diagnostic::resolution(
                span,
                format!("unknown function: {}", self.interner.lookup(name)),
            )
        })
    }
}
