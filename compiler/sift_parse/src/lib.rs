//! Parser for the sift model language.
//!
//! A hand-written lexer and recursive-descent parser producing nodes in the
//! shared [`Ast`] arena. All symbol references come out unresolved; the
//! `sift_check` crate resolves and validates them.

mod cursor;
mod grammar;
mod lexer;
mod token;

pub use grammar::Parser;
pub use token::{Token, TokenKind};

use sift_diagnostic::Result;
use sift_ir::{Ast, Model, StringInterner};
use tracing::debug;

/// Parse a whole model.
pub fn parse(source: &str, ast: &mut Ast, interner: &mut StringInterner) -> Result<Model> {
    let tokens = lexer::lex(source, interner)?;
    debug!(tokens = tokens.len(), "lexed model source");
    let mut parser = Parser::new(&tokens, ast, interner);
    let model = parser.parse_model()?;
    debug!(
        decls = model.decls.len(),
        functions = model.functions.len(),
        rules = model.rules.len(),
        "parsed model"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sift_ir::{
        BinaryOp, DeclKind, ExprKind, PropertyCategory, QuantifierKind, RuleKind, StmtKind,
        TypeKind,
    };

    fn parse_ok(source: &str) -> (Ast, Model, StringInterner) {
        let mut interner = StringInterner::new();
        let mut ast = Ast::new(&mut interner);
        let model = parse(source, &mut ast, &mut interner).expect("parse failure");
        (ast, model, interner)
    }

    #[test]
    fn parse_counter_model() {
        let (ast, model, interner) = parse_ok(
            "var x: 0..1;\n\
             startstate begin x := 0 end;\n\
             rule \"step up\" x = 0 ==> begin x := 1 end;\n\
             rule \"step down\" x = 1 ==> begin x := 0 end;\n\
             invariant \"bounded\" x <= 1;\n",
        );
        assert_eq!(model.decls.len(), 1);
        assert_eq!(model.rules.len(), 4);

        let x = interner.get("x").expect("x interned");
        let decl = ast.decl(model.decls[0]);
        assert_eq!(decl.name, x);
        assert!(decl.is_state_variable());

        match &ast.rule(model.rules[1]).kind {
            RuleKind::Simple { guard, body, .. } => {
                let guard = guard.expect("rule has a guard");
                assert!(matches!(
                    ast.expr(guard).kind,
                    ExprKind::Binary {
                        op: BinaryOp::Eq,
                        ..
                    }
                ));
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected a simple rule, got {other:?}"),
        }

        match &ast.rule(model.rules[3]).kind {
            RuleKind::Property { property, .. } => {
                assert_eq!(property.category, PropertyCategory::Invariant);
            }
            other => panic!("expected an invariant, got {other:?}"),
        }
    }

    #[test]
    fn parse_type_declarations() {
        let (ast, model, _) = parse_ok(
            "const N: 4;\n\
             type id: 0..N-1;\n\
             color: enum { red, green };\n\
             board: array [id] of color;\n\
             cell: record c: color; owner: id; end;\n",
        );
        assert_eq!(model.decls.len(), 5);
        let DeclKind::Type { value } = ast.decl(model.decls[4]).kind else {
            panic!("expected a type declaration");
        };
        match &ast.type_expr(value).kind {
            TypeKind::Record { fields } => assert_eq!(fields.len(), 2),
            other => panic!("expected a record, got {other:?}"),
        }
    }

    #[test]
    fn parse_ruleset_with_quantifier() {
        let (ast, model, _) = parse_ok(
            "const N: 3;\n\
             var x: array [0..N-1] of 0..7;\n\
             ruleset i: 0..N-1 do\n\
               rule \"bump\" x[i] < 7 ==> begin x[i] := x[i] + 1 end;\n\
             end;\n",
        );
        match &ast.rule(model.rules[0]).kind {
            RuleKind::Ruleset { quantifiers, rules } => {
                assert_eq!(quantifiers.len(), 1);
                assert_eq!(rules.len(), 1);
                assert!(matches!(
                    ast.quantifier(quantifiers[0]).kind,
                    QuantifierKind::Over(_)
                ));
            }
            other => panic!("expected a ruleset, got {other:?}"),
        }
    }

    #[test]
    fn parse_function_with_params() {
        let (ast, model, interner) = parse_ok(
            "function inc(var v: 0..7; amount: 0..3): 0..7;\n\
             begin\n\
               return v + amount;\n\
             end;\n",
        );
        assert_eq!(model.functions.len(), 1);
        let function = ast.function(model.functions[0]);
        assert_eq!(interner.lookup(function.name), "inc");
        assert_eq!(function.params.len(), 2);
        assert!(function.return_type.is_some());
        let DeclKind::Param { by_ref, .. } = ast.decl(function.params[0]).kind else {
            panic!("expected a parameter");
        };
        assert!(by_ref);
    }

    #[test]
    fn parse_control_flow_statements() {
        let (ast, model, _) = parse_ok(
            "var x: 0..10;\n\
             rule \"busy\" true ==> begin\n\
               if x = 0 then x := 1; elsif x = 1 then x := 2; else x := 0; end;\n\
               for i := 0 to 3 do x := i; end;\n\
               while x > 0 do x := x - 1; end;\n\
               switch x case 0, 1: x := 2; else x := 0; end;\n\
             end;\n",
        );
        let RuleKind::Simple { body, .. } = &ast.rule(model.rules[0]).kind else {
            panic!("expected a simple rule");
        };
        assert_eq!(body.len(), 4);
        assert!(matches!(ast.stmt(body[0]).kind, StmtKind::If { .. }));
        assert!(matches!(ast.stmt(body[1]).kind, StmtKind::For { .. }));
        assert!(matches!(ast.stmt(body[2]).kind, StmtKind::While { .. }));
        assert!(matches!(ast.stmt(body[3]).kind, StmtKind::Switch { .. }));
    }

    #[test]
    fn parse_quantified_expressions() {
        let (ast, model, _) = parse_ok(
            "const N: 3;\n\
             var x: array [0..N-1] of 0..7;\n\
             invariant \"all small\" forall i: 0..N-1 do x[i] < 7 end;\n",
        );
        let RuleKind::Property { property, .. } = &ast.rule(model.rules[0]).kind else {
            panic!("expected a property rule");
        };
        assert!(matches!(
            ast.expr(property.expr).kind,
            ExprKind::Quantified { .. }
        ));
    }

    #[test]
    fn precedence_of_implication_and_comparison() {
        let (ast, model, _) = parse_ok("var x: 0..4;\ninvariant x = 1 -> x < 3;\n");
        let RuleKind::Property { property, .. } = &ast.rule(model.rules[0]).kind else {
            panic!("expected a property rule");
        };
        let &ExprKind::Binary { op, lhs, rhs } = &ast.expr(property.expr).kind else {
            panic!("expected a binary expression");
        };
        assert_eq!(op, BinaryOp::Implies);
        assert!(matches!(
            ast.expr(lhs).kind,
            ExprKind::Binary {
                op: BinaryOp::Eq,
                ..
            }
        ));
        assert!(matches!(
            ast.expr(rhs).kind,
            ExprKind::Binary {
                op: BinaryOp::Lt,
                ..
            }
        ));
    }

    #[test]
    fn error_has_location_context() {
        let mut interner = StringInterner::new();
        let mut ast = Ast::new(&mut interner);
        let err = parse("var x 0..1;", &mut ast, &mut interner).expect_err("should not parse");
        assert!(err.message.contains("expected"), "message: {}", err.message);
        assert!(err.span.is_some());
    }

    #[test]
    fn alias_rule_distributes() {
        let (ast, model, _) = parse_ok(
            "var x: 0..3;\n\
             alias y: x do\n\
               rule \"bump\" y < 3 ==> begin y := y + 1 end;\n\
             end;\n",
        );
        match &ast.rule(model.rules[0]).kind {
            RuleKind::AliasGroup { aliases, rules } => {
                assert_eq!(aliases.len(), 1);
                assert_eq!(rules.len(), 1);
            }
            other => panic!("expected an alias rule, got {other:?}"),
        }
    }
}
