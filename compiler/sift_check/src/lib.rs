//! Resolution, validation and state layout for sift models.
//!
//! [`analyze`] runs the three passes in order on a freshly parsed model:
//! resolve symbols, validate language rules, assign state variable bit
//! offsets. After it returns the model is ready for code generation.

mod reindex;
mod resolve;
mod validate;

pub use reindex::reindex;
pub use resolve::Resolver;
pub use validate::validate;

use sift_diagnostic::Result;
use sift_ir::{Ast, Model, StringInterner};

/// Resolve, validate and reindex a parsed model.
pub fn analyze(ast: &mut Ast, model: &mut Model, interner: &StringInterner) -> Result<()> {
    Resolver::new(ast, interner).resolve_model(model)?;
    validate(ast, model, interner)?;
    reindex(ast, model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sift_diagnostic::Category;
    use sift_ir::DeclKind;

    fn analyzed(source: &str) -> (Ast, Model) {
        let mut interner = StringInterner::new();
        let mut ast = Ast::new(&mut interner);
        let mut model = sift_parse::parse(source, &mut ast, &mut interner).expect("parse failure");
        analyze(&mut ast, &mut model, &interner).expect("analysis failure");
        (ast, model)
    }

    fn analysis_error(source: &str) -> sift_diagnostic::Diagnostic {
        let mut interner = StringInterner::new();
        let mut ast = Ast::new(&mut interner);
        let mut model = sift_parse::parse(source, &mut ast, &mut interner).expect("parse failure");
        analyze(&mut ast, &mut model, &interner).expect_err("analysis should fail")
    }

    #[test]
    fn offsets_are_disjoint_and_ordered() {
        let (ast, model) = analyzed(
            "var a: 0..1;\n\
             var b: 0..255;\n\
             var c: boolean;\n\
             startstate begin a := 0 end;\n",
        );
        let mut offsets = Vec::new();
        for &decl in &model.decls {
            let DeclKind::Var { ty, offset, .. } = ast.decl(decl).kind else {
                panic!("expected a state variable");
            };
            let width = ast.type_width(ty).expect("width");
            offsets.push((offset, width));
        }
        // 0..1 needs 2 bits (3 encodings), 0..255 needs 9, boolean needs 2
        assert_eq!(offsets, vec![(0, 2), (2, 9), (11, 2)]);
        assert_eq!(model.state_size_bits, 13);

        // pairwise disjoint
        for (i, &(o1, w1)) in offsets.iter().enumerate() {
            for &(o2, _) in &offsets[i + 1..] {
                assert!(o1 + w1 <= o2);
            }
        }
    }

    #[test]
    fn reindex_is_idempotent() {
        let mut interner = StringInterner::new();
        let mut ast = Ast::new(&mut interner);
        let mut model = sift_parse::parse(
            "var a: 0..7;\nvar b: 0..7;\nstartstate begin a := 0 end;\n",
            &mut ast,
            &mut interner,
        )
        .expect("parse failure");
        analyze(&mut ast, &mut model, &interner).expect("analysis failure");
        let first = model.state_size_bits;
        reindex(&mut ast, &mut model).expect("reindex failure");
        assert_eq!(model.state_size_bits, first);
    }

    #[test]
    fn unknown_symbol_is_a_resolution_error() {
        let err = analysis_error("var x: 0..1;\nrule \"r\" y = 0 ==> begin x := 1 end;\n");
        assert_eq!(err.category, Category::Resolution);
        assert!(err.message.contains("unknown symbol"));
    }

    #[test]
    fn non_constant_const_is_rejected() {
        let err = analysis_error("var x: 0..1;\nconst K: x;\nstartstate begin x := 0 end;\n");
        assert_eq!(err.category, Category::Type);
    }

    #[test]
    fn return_with_value_in_rule_is_rejected() {
        let err = analysis_error(
            "var x: 0..1;\nrule \"r\" true ==> begin return 3 end;\n",
        );
        assert_eq!(err.category, Category::Semantic);
        assert!(err.message.contains("rule or startstate"));
    }

    #[test]
    fn return_with_value_in_called_function_is_fine() {
        // the return checker must stop at function boundaries
        let (_, model) = analyzed(
            "var x: 0..7;\n\
             function next(v: 0..7): 0..7; begin return v + 1 end;\n\
             rule \"step\" x < 7 ==> begin x := next(x) end;\n\
             startstate begin x := 0 end;\n",
        );
        assert_eq!(model.functions.len(), 1);
    }

    #[test]
    fn non_boolean_guard_is_rejected() {
        let err = analysis_error("var x: 0..3;\nrule \"r\" x + 1 ==> begin x := 0 end;\n");
        assert_eq!(err.category, Category::Type);
        assert!(err.message.contains("guard"));
    }

    #[test]
    fn non_constant_ruleset_parameter_is_rejected() {
        let err = analysis_error(
            "var x: 0..3;\n\
             ruleset i := 0 to x do\n\
               rule \"r\" true ==> begin x := i end;\n\
             end;\n",
        );
        assert_eq!(err.category, Category::Type);
        assert!(err.message.contains("ruleset"));
    }

    #[test]
    fn incompatible_index_type_is_rejected() {
        let err = analysis_error(
            "type color: enum { red, green };\n\
             var a: array [color] of 0..3;\n\
             var i: 0..1;\n\
             rule \"r\" true ==> begin a[i] := 0 end;\n",
        );
        assert_eq!(err.category, Category::Type);
        assert!(err.message.contains("index"));
    }

    #[test]
    fn enum_members_resolve_globally() {
        let (ast, model) = analyzed(
            "type color: enum { red, green };\n\
             var c: color;\n\
             startstate begin c := red end;\n\
             rule \"flip\" c = red ==> begin c := green end;\n\
             invariant c = red | c = green;\n",
        );
        assert_eq!(model.rules.len(), 3);
        // enum width: 2 members + undefined = 2 bits
        assert_eq!(model.state_size_bits, 2);
        let DeclKind::Var { ty, .. } = ast.decl(model.decls[1]).kind else {
            panic!("expected var");
        };
        assert_eq!(ast.type_upper_bound(ty), Some(1));
    }

    #[test]
    fn duplicate_declaration_is_rejected() {
        let err = analysis_error("var x: 0..1;\nvar x: 0..1;\nstartstate begin x := 0 end;\n");
        assert_eq!(err.category, Category::Resolution);
        assert!(err.message.contains("redefined"));
    }

    #[test]
    fn constant_fold_matches_direct_evaluation() {
        let (ast, model) = analyzed(
            "const A: 3 + 4 * 2;\n\
             const B: (10 / 3) % 2;\n\
             const C: 2 > 1 ? -5 : 5;\n\
             var x: 0..20;\n\
             startstate begin x := A end;\n",
        );
        let folds: Vec<i128> = model
            .decls
            .iter()
            .take(3)
            .map(|&d| {
                let DeclKind::Const { value } = ast.decl(d).kind else {
                    panic!("expected const");
                };
                ast.constant_fold(value).expect("constant")
            })
            .collect();
        assert_eq!(folds, vec![11, 1, -5]);
    }

    #[test]
    fn alias_rule_and_ruleset_flatten_with_scopes() {
        let (ast, model) = analyzed(
            "const N: 2;\n\
             var a: array [0..N-1] of 0..3;\n\
             ruleset i: 0..N-1 do\n\
               alias cell: a[i] do\n\
                 rule \"bump\" cell < 3 ==> begin cell := cell + 1 end;\n\
               end;\n\
             end;\n",
        );
        let flat = ast.flatten_rule(model.rules[0]);
        assert_eq!(flat.len(), 1);
        match &flat[0].kind {
            sift_ir::RuleKind::Simple {
                aliases,
                quantifiers,
                ..
            } => {
                assert_eq!(aliases.len(), 1);
                assert_eq!(quantifiers.len(), 1);
            }
            other => panic!("expected a simple rule, got {other:?}"),
        }
    }
}
