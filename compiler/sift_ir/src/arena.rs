//! The flat node arena.

use crate::ast::{Decl, DeclKind, Expr, Function, Quantifier, Rule, Stmt, TypeExpr, TypeKind};
use crate::{
    DeclId, ExprId, FunctionId, Name, QuantifierId, RuleId, Span, StmtId, StringInterner, TypeId,
};

/// Owner of every AST node. Nodes refer to each other through typed ids.
///
/// Created with the built-in `boolean` type (an enum of `false`, `true`)
/// and its member constants already allocated; the resolver seeds the
/// global scope with them.
pub struct Ast {
    exprs: Vec<Expr>,
    types: Vec<TypeExpr>,
    stmts: Vec<Stmt>,
    decls: Vec<Decl>,
    quantifiers: Vec<Quantifier>,
    functions: Vec<Function>,
    rules: Vec<Rule>,

    /// The built-in boolean type.
    pub boolean: TypeId,
    /// The `boolean` type declaration plus the `false` and `true` member
    /// constants, for scope seeding.
    pub builtin_decls: Vec<DeclId>,
}

impl Ast {
    pub fn new(interner: &mut StringInterner) -> Self {
        let mut ast = Ast {
            exprs: Vec::new(),
            types: Vec::new(),
            stmts: Vec::new(),
            decls: Vec::new(),
            quantifiers: Vec::new(),
            functions: Vec::new(),
            rules: Vec::new(),
            boolean: TypeId::new(0),
            builtin_decls: Vec::new(),
        };

        let false_name = interner.intern("false");
        let true_name = interner.intern("true");
        let boolean_name = interner.intern("boolean");

        let boolean = ast.alloc_type(TypeExpr {
            kind: TypeKind::Enum {
                members: vec![(false_name, Span::DUMMY), (true_name, Span::DUMMY)],
            },
            span: Span::DUMMY,
        });
        ast.boolean = boolean;

        let boolean_decl = ast.alloc_decl(Decl {
            name: boolean_name,
            kind: DeclKind::Type { value: boolean },
            span: Span::DUMMY,
        });
        let false_decl = ast.alloc_decl(Decl {
            name: false_name,
            kind: DeclKind::EnumMember {
                ty: boolean,
                index: 0,
            },
            span: Span::DUMMY,
        });
        let true_decl = ast.alloc_decl(Decl {
            name: true_name,
            kind: DeclKind::EnumMember {
                ty: boolean,
                index: 1,
            },
            span: Span::DUMMY,
        });
        ast.builtin_decls = vec![boolean_decl, false_decl, true_decl];

        ast
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(self.exprs.len());
        self.exprs.push(expr);
        id
    }

    pub fn alloc_type(&mut self, ty: TypeExpr) -> TypeId {
        let id = TypeId::new(self.types.len());
        self.types.push(ty);
        id
    }

    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId::new(self.stmts.len());
        self.stmts.push(stmt);
        id
    }

    pub fn alloc_decl(&mut self, decl: Decl) -> DeclId {
        let id = DeclId::new(self.decls.len());
        self.decls.push(decl);
        id
    }

    pub fn alloc_quantifier(&mut self, quantifier: Quantifier) -> QuantifierId {
        let id = QuantifierId::new(self.quantifiers.len());
        self.quantifiers.push(quantifier);
        id
    }

    pub fn alloc_function(&mut self, function: Function) -> FunctionId {
        let id = FunctionId::new(self.functions.len());
        self.functions.push(function);
        id
    }

    pub fn alloc_rule(&mut self, rule: Rule) -> RuleId {
        let id = RuleId::new(self.rules.len());
        self.rules.push(rule);
        id
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn expr_mut(&mut self, id: ExprId) -> &mut Expr {
        &mut self.exprs[id.index()]
    }

    #[inline]
    pub fn type_expr(&self, id: TypeId) -> &TypeExpr {
        &self.types[id.index()]
    }

    #[inline]
    pub fn type_expr_mut(&mut self, id: TypeId) -> &mut TypeExpr {
        &mut self.types[id.index()]
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    #[inline]
    pub fn stmt_mut(&mut self, id: StmtId) -> &mut Stmt {
        &mut self.stmts[id.index()]
    }

    #[inline]
    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    #[inline]
    pub fn decl_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id.index()]
    }

    #[inline]
    pub fn quantifier(&self, id: QuantifierId) -> &Quantifier {
        &self.quantifiers[id.index()]
    }

    #[inline]
    pub fn function(&self, id: FunctionId) -> &Function {
        &self.functions[id.index()]
    }

    #[inline]
    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id.index()]
    }

    /// Number of declarations allocated so far.
    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    /// Look up a declaration's name text.
    pub fn decl_name<'a>(&self, id: DeclId, interner: &'a StringInterner) -> &'a str {
        interner.lookup(self.decl(id).name)
    }

    /// The name of a quantifier's binding.
    pub fn quantifier_name(&self, id: QuantifierId) -> Name {
        self.decl(self.quantifier(id).binding).name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtins_are_seeded() {
        let mut interner = StringInterner::new();
        let ast = Ast::new(&mut interner);
        assert_eq!(ast.builtin_decls.len(), 3);
        assert!(ast.type_is_boolean(ast.boolean));
        assert_eq!(ast.type_count(ast.boolean), Some(2));
        // two values plus the undefined encoding fit in two bits
        assert_eq!(ast.type_width(ast.boolean), Some(2));
        assert_eq!(ast.type_lower_bound(ast.boolean), Some(0));
        assert_eq!(ast.type_upper_bound(ast.boolean), Some(1));
    }
}
