//! C code emission.
//!
//! Translates a resolved, validated, reindexed model into a single C
//! translation unit: a configuration prelude, the fixed exploration runtime
//! (embedded from `resources/runtime.c`), and the model-specific generated
//! code - constants, functions, guard/rule/startstate/property functions,
//! `init`, `explore` and `state_print`.
//!
//! Emission is deterministic: the same model and options produce
//! byte-identical output.

mod c;
mod context;

pub use context::Emitter;

use bitflags::bitflags;
use sift_diagnostic::Result;
use sift_ir::visitor::{walk_rule, walk_stmt, Visitor};
use sift_ir::{Ast, Model, PropertyCategory, RuleKind, StmtKind, StringInterner};
use std::io::Write;
use std::path::Path;
use tracing::debug;

bitflags! {
    /// Runtime trace categories, selectable with `--trace`.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct TraceFlags: u32 {
        const HANDLE_READS = 1;
        const HANDLE_WRITES = 2;
        const QUEUE = 4;
        const SET = 8;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ColorMode {
    On,
    Off,
    #[default]
    Auto,
}

/// Width of the checker's value scalar.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ValueType {
    Int8,
    Int16,
    Int32,
    #[default]
    Int64,
}

impl ValueType {
    /// The C type name.
    pub fn c_type(self) -> &'static str {
        match self {
            ValueType::Int8 => "int8_t",
            ValueType::Int16 => "int16_t",
            ValueType::Int32 => "int32_t",
            ValueType::Int64 => "int64_t",
        }
    }

    /// Prefix of the companion `<stdint.h>` macros (`INT8`, `INT16`, ...).
    pub fn macro_prefix(self) -> &'static str {
        match self {
            ValueType::Int8 => "INT8",
            ValueType::Int16 => "INT16",
            ValueType::Int32 => "INT32",
            ValueType::Int64 => "INT64",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum DeadlockDetection {
    Stuck,
    /// Accepted for compatibility; behaves as `Stuck`.
    Stuttering,
    #[default]
    Off,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum CounterexampleTrace {
    #[default]
    Full,
    /// Elide state components unchanged from the preceding state.
    Diff,
    Off,
}

/// Everything the emitter needs to know beyond the model itself.
#[derive(Clone, Debug)]
pub struct CodegenOptions {
    pub threads: usize,
    pub max_errors: u64,
    pub sandbox: bool,
    pub color: ColorMode,
    /// Initial seen-set allocation, in bytes.
    pub set_capacity: u64,
    /// Occupancy percentage that triggers expansion.
    pub set_expand_threshold: u8,
    pub value_type: ValueType,
    pub traces: TraceFlags,
    pub deadlock_detection: DeadlockDetection,
    pub counterexample: CounterexampleTrace,
    pub machine_readable: bool,
    pub overflow_checks: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        CodegenOptions {
            threads: 1,
            max_errors: 1,
            sandbox: false,
            color: ColorMode::Auto,
            set_capacity: 8 * 1024 * 1024,
            set_expand_threshold: 65,
            value_type: ValueType::default(),
            traces: TraceFlags::empty(),
            deadlock_detection: DeadlockDetection::default(),
            counterexample: CounterexampleTrace::default(),
            machine_readable: false,
            overflow_checks: true,
        }
    }
}

/// Generate the checker source as a string.
pub fn generate_checker(
    ast: &Ast,
    model: &Model,
    interner: &StringInterner,
    options: &CodegenOptions,
) -> Result<String> {
    let mut emitter = Emitter::new(ast, model, interner, options);
    emitter.emit_translation_unit()?;
    Ok(emitter.finish())
}

/// Generate the checker and write it to `path`.
pub fn output_checker(
    path: &Path,
    ast: &Ast,
    model: &Model,
    interner: &StringInterner,
    options: &CodegenOptions,
) -> Result<()> {
    let source = generate_checker(ast, model, interner, options)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(source.as_bytes())?;
    debug!(path = %path.display(), bytes = source.len(), "wrote checker");
    Ok(())
}

/// Number of assumptions in the model: top-level assumption properties plus
/// assumption statements embedded in bodies.
pub fn assumption_count(ast: &Ast, model: &Model) -> usize {
    struct Counter {
        count: usize,
    }

    impl Visitor for Counter {
        fn visit_stmt(&mut self, ast: &Ast, stmt: sift_ir::StmtId) {
            if let StmtKind::Property { property, .. } = &ast.stmt(stmt).kind {
                if property.category == PropertyCategory::Assumption {
                    self.count += 1;
                }
            }
            walk_stmt(self, ast, stmt);
        }

        fn visit_rule(&mut self, ast: &Ast, rule: sift_ir::RuleId) {
            if let RuleKind::Property { property, .. } = &ast.rule(rule).kind {
                if property.category == PropertyCategory::Assumption {
                    self.count += 1;
                }
            }
            walk_rule(self, ast, ast.rule(rule));
        }
    }

    let mut counter = Counter { count: 0 };
    counter.visit_model(ast, model);
    counter.count
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn checker_for(source: &str, options: &CodegenOptions) -> String {
        let mut interner = StringInterner::new();
        let mut ast = Ast::new(&mut interner);
        let mut model = sift_parse::parse(source, &mut ast, &mut interner).expect("parse failure");
        sift_check::analyze(&mut ast, &mut model, &interner).expect("analysis failure");
        generate_checker(&ast, &model, &interner, options).expect("codegen failure")
    }

    const COUNTER: &str = "var x: 0..1;\n\
        startstate begin x := 0 end;\n\
        rule \"up\" x = 0 ==> begin x := 1 end;\n\
        rule \"down\" x = 1 ==> begin x := 0 end;\n\
        invariant \"bounded\" x <= 1;\n";

    #[test]
    fn counter_model_emits_expected_shape() {
        let options = CodegenOptions {
            threads: 2,
            ..CodegenOptions::default()
        };
        let c = checker_for(COUNTER, &options);

        // configuration constants
        assert!(c.contains("#define STATE_SIZE_BITS 2"));
        assert!(c.contains("#define THREADS 2"));
        assert!(c.contains("#define MAX_ERRORS 1"));
        assert!(c.contains("typedef int64_t value_t;"));

        // runtime template landed
        assert!(c.contains("static bool set_insert(struct state *s, size_t *count)"));
        assert!(c.contains("static void rendezvous_opt_out(void)"));
        assert!(c.contains("MurmurHash64A"));

        // generated model code
        assert!(c.contains("static bool guard_0("));
        assert!(c.contains("static void rule_0("));
        assert!(c.contains("static void startstate_0("));
        assert!(c.contains("static bool property_0("));
        assert!(c.contains("static void init(void)"));
        assert!(c.contains("static _Noreturn void explore(void)"));
        assert!(c.contains("static void state_print(const struct state *s)"));

        // state access goes through handles
        assert!(c.contains("handle_read(s, VALUE_C(0), VALUE_C(1),"));
        assert!(c.contains("handle_write(s, VALUE_C(0), VALUE_C(1),"));
        assert!(c.contains(".base = (uint8_t *)s->data, .offset = (size_t)0, .width = (size_t)2"));
    }

    #[test]
    fn emission_is_deterministic() {
        let options = CodegenOptions::default();
        assert_eq!(checker_for(COUNTER, &options), checker_for(COUNTER, &options));
    }

    #[test]
    fn consts_emit_ru_prefixed_values() {
        let c = checker_for(
            "const N: 3;\nvar x: 0..N;\nstartstate begin x := 0 end;\n",
            &CodegenOptions::default(),
        );
        assert!(c.contains("static const value_t ru_N __attribute__((unused)) = VALUE_C(3);"));
    }

    #[test]
    fn value_type_selection_changes_scalar() {
        let options = CodegenOptions {
            value_type: ValueType::Int16,
            ..CodegenOptions::default()
        };
        let c = checker_for(COUNTER, &options);
        assert!(c.contains("typedef int16_t value_t;"));
        assert!(c.contains("#define VALUE_MAX INT16_MAX"));
        assert!(c.contains("#define PRIVAL PRId16"));
    }

    #[test]
    fn assumptions_are_counted() {
        let mut interner = StringInterner::new();
        let mut ast = Ast::new(&mut interner);
        let mut model = sift_parse::parse(
            "var x: 0..3;\n\
             startstate begin x := 0 end;\n\
             rule \"r\" true ==> begin assume x < 3 \"small\"; x := x + 1 end;\n\
             assume \"never big\" x < 3;\n",
            &mut ast,
            &mut interner,
        )
        .expect("parse failure");
        sift_check::analyze(&mut ast, &mut model, &interner).expect("analysis failure");
        assert_eq!(assumption_count(&ast, &model), 2);
    }

    #[test]
    fn ruleset_rules_get_quantifier_parameters() {
        let c = checker_for(
            "const N: 2;\n\
             var a: array [0..N-1] of 0..3;\n\
             startstate begin for i: 0..N-1 do a[i] := 0 end end;\n\
             ruleset i: 0..N-1 do\n\
               rule \"bump\" a[i] < 3 ==> begin a[i] := a[i] + 1 end;\n\
             end;\n",
            &CodegenOptions::default(),
        );
        assert!(c.contains("static bool guard_0(const struct state *s, value_t ru_i)"));
        assert!(c.contains("handle_index(s,"));
    }

    #[test]
    fn functions_thread_state_and_parameters() {
        let c = checker_for(
            "var x: 0..7;\n\
             function next(v: 0..7): 0..7; begin return v + 1 end;\n\
             procedure bump(var v: 0..7); begin v := v + 1 end;\n\
             startstate begin x := 0 end;\n\
             rule \"step\" x < 7 ==> begin x := next(x); bump(x) end;\n",
            &CodegenOptions::default(),
        );
        assert!(c.contains(
            "static value_t __attribute__((unused)) ru_f_next(const struct state *s, value_t ru_v)"
        ));
        assert!(c.contains(
            "static void __attribute__((unused)) ru_f_bump(const struct state *s, struct handle *ru_v)"
        ));
        // by-reference arguments pass a handle pointer via a temporary
        assert!(c.contains("struct handle ref"));
        assert!(c.contains("ru_f_next(s, handle_read(s, VALUE_C(0), VALUE_C(7),"));
    }

    #[test]
    fn record_fields_compose_with_handle_narrow() {
        let c = checker_for(
            "type pair: record lo: 0..3; hi: 0..3; end;\n\
             var p: pair;\n\
             startstate begin p.lo := 0; p.hi := 0 end;\n\
             rule \"swap\" p.lo < 3 ==> begin p.lo := p.hi end;\n",
            &CodegenOptions::default(),
        );
        // lo sits at offset 0, hi after lo's 3 bits
        assert!(c.contains("handle_narrow("));
        assert!(c.contains("(size_t)0, (size_t)3)"));
        assert!(c.contains("(size_t)3, (size_t)3)"));
    }

    #[test]
    fn assumption_statements_discard_without_error() {
        let c = checker_for(
            "var x: 0..3;\n\
             startstate begin x := 0 end;\n\
             rule \"step\" true ==> begin assume x < 3 \"still small\"; x := x + 1 end;\n",
            &CodegenOptions::default(),
        );
        assert!(c.contains("assumption_failed();"));
        assert!(c.contains("#define ASSUMPTION_COUNT 1"));
    }

    #[test]
    fn undefine_and_clear_zero_the_bits() {
        let c = checker_for(
            "var x: 0..3;\n\
             startstate begin x := 0 end;\n\
             rule \"forget\" true ==> begin undefine x end;\n\
             rule \"reset\" true ==> begin clear x end;\n",
            &CodegenOptions::default(),
        );
        // one zeroing call per rule, beyond the runtime's definition
        assert_eq!(c.matches("handle_zero(((struct handle)").count(), 2);
    }

    #[test]
    fn traces_and_deadlock_options_land_in_defines() {
        let options = CodegenOptions {
            traces: TraceFlags::QUEUE | TraceFlags::SET,
            deadlock_detection: DeadlockDetection::Stuck,
            ..CodegenOptions::default()
        };
        let c = checker_for(COUNTER, &options);
        assert!(c.contains("#define TRACES_ENABLED 12"));
        assert!(c.contains("#define DEADLOCK_DETECTION 1"));
        assert!(c.contains("deadlock"));
    }
}
