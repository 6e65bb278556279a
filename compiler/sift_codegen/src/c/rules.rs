//! Rule compilation: guard/action/startstate/property functions plus the
//! generated `init` and `explore`.

use crate::{DeadlockDetection, Emitter};
use sift_diagnostic::Result;
use sift_ir::{DeclId, ExprId, PropertyCategory, QuantifierId, Rule, RuleKind, StmtId};

/// A flattened simple rule ready for emission.
struct FlatSimple {
    display: String,
    guard: Option<ExprId>,
    decls: Vec<DeclId>,
    body: Vec<StmtId>,
    aliases: Vec<DeclId>,
    quantifiers: Vec<QuantifierId>,
}

struct FlatStart {
    display: String,
    decls: Vec<DeclId>,
    body: Vec<StmtId>,
    aliases: Vec<DeclId>,
    quantifiers: Vec<QuantifierId>,
}

struct FlatProperty {
    display: String,
    expr: ExprId,
    category: PropertyCategory,
    aliases: Vec<DeclId>,
    quantifiers: Vec<QuantifierId>,
}

struct FlatModel {
    simples: Vec<FlatSimple>,
    startstates: Vec<FlatStart>,
    /// Invariants and assertions, checked against every state.
    invariants: Vec<FlatProperty>,
    /// Assumptions, pruning states they reject.
    assumptions: Vec<FlatProperty>,
}

impl Emitter<'_> {
    fn flatten_model(&self) -> FlatModel {
        let mut flat = FlatModel {
            simples: Vec::new(),
            startstates: Vec::new(),
            invariants: Vec::new(),
            assumptions: Vec::new(),
        };

        for &rule in &self.model.rules {
            for r in self.ast.flatten_rule(rule) {
                self.collect_flat(r, &mut flat);
            }
        }
        flat
    }

    fn collect_flat(&self, rule: Rule, flat: &mut FlatModel) {
        match rule.kind {
            RuleKind::Simple {
                name,
                guard,
                decls,
                body,
                aliases,
                quantifiers,
            } => {
                let display =
                    self.rule_display_name(name, &format!("rule {}", flat.simples.len()));
                flat.simples.push(FlatSimple {
                    display,
                    guard,
                    decls,
                    body,
                    aliases,
                    quantifiers,
                });
            }
            RuleKind::StartState {
                name,
                decls,
                body,
                aliases,
                quantifiers,
            } => {
                let display = self
                    .rule_display_name(name, &format!("startstate {}", flat.startstates.len()));
                flat.startstates.push(FlatStart {
                    display,
                    decls,
                    body,
                    aliases,
                    quantifiers,
                });
            }
            RuleKind::Property {
                name,
                property,
                aliases,
                quantifiers,
            } => {
                let bucket = if property.category == PropertyCategory::Assumption {
                    &mut flat.assumptions
                } else {
                    &mut flat.invariants
                };
                let display =
                    self.rule_display_name(name, &format!("property {}", bucket.len()));
                bucket.push(FlatProperty {
                    display,
                    expr: property.expr,
                    category: property.category,
                    aliases,
                    quantifiers,
                });
            }
            // flatten_rule only yields the three flat kinds
            RuleKind::AliasGroup { .. } | RuleKind::Ruleset { .. } => {}
        }
    }

    /// Parameter list for a rule function: the state plus one `value_t`
    /// per quantified variable.
    fn rule_params(&self, quantifiers: &[QuantifierId]) -> String {
        let mut params = vec!["const struct state *s".to_owned()];
        for &q in quantifiers {
            let binder = self.decl_c_name(self.ast.quantifier(q).binding);
            params.push(format!("value_t {binder}"));
        }
        params.join(", ")
    }

    /// Argument list matching [`Self::rule_params`].
    fn rule_args(&self, state: &str, quantifiers: &[QuantifierId]) -> String {
        let mut args = vec![state.to_owned()];
        for &q in quantifiers {
            args.push(self.decl_c_name(self.ast.quantifier(q).binding));
        }
        args.join(", ")
    }

    /// Open one loop per quantifier, innermost last. Constant bounds fold
    /// to literals so the loops are usable where no state is in scope.
    fn open_quantifiers(&mut self, quantifiers: &[QuantifierId]) -> Result<Vec<String>> {
        let mut closes = Vec::new();
        for &q in quantifiers {
            let (open, close) = self.quantifier_loop(q)?;
            self.writeln(&open);
            self.indent();
            closes.push(close);
        }
        Ok(closes)
    }

    fn close_quantifiers(&mut self, closes: Vec<String>) {
        for close in closes.into_iter().rev() {
            self.dedent();
            self.writeln(&close);
        }
    }

    pub(crate) fn emit_rules(&mut self) -> Result<()> {
        let flat = self.flatten_model();

        for (i, start) in flat.startstates.iter().enumerate() {
            self.writeln(&format!("/* startstate \"{}\" */", start.display));
            self.writeln(&format!(
                "static void startstate_{i}({}) {{",
                self.rule_params(&start.quantifiers)
            ));
            self.indent();
            for &alias in &start.aliases {
                self.alias_binding(alias)?;
            }
            for &decl in &start.decls {
                self.local_decl(decl)?;
            }
            self.stmts(&start.body)?;
            self.dedent();
            self.writeln("}");
            self.blank();
        }

        for (i, simple) in flat.simples.iter().enumerate() {
            self.writeln(&format!("/* rule \"{}\" */", simple.display));
            self.writeln(&format!(
                "static bool guard_{i}({}) {{",
                self.rule_params(&simple.quantifiers)
            ));
            self.indent();
            for &alias in &simple.aliases {
                self.alias_binding(alias)?;
            }
            match simple.guard {
                Some(guard) => {
                    let g = self.rvalue(guard)?;
                    self.writeln(&format!("return {g};"));
                }
                None => self.writeln("return true;"),
            }
            self.dedent();
            self.writeln("}");
            self.blank();

            self.writeln(&format!(
                "static void rule_{i}({}) {{",
                self.rule_params(&simple.quantifiers)
            ));
            self.indent();
            for &alias in &simple.aliases {
                self.alias_binding(alias)?;
            }
            for &decl in &simple.decls {
                self.local_decl(decl)?;
            }
            self.stmts(&simple.body)?;
            self.dedent();
            self.writeln("}");
            self.blank();
        }

        for (i, property) in flat.invariants.iter().enumerate() {
            self.writeln(&format!("/* invariant \"{}\" */", property.display));
            self.writeln(&format!(
                "static bool property_{i}({}) {{",
                self.rule_params(&property.quantifiers)
            ));
            self.indent();
            for &alias in &property.aliases {
                self.alias_binding(alias)?;
            }
            let e = self.rvalue(property.expr)?;
            self.writeln(&format!("return {e};"));
            self.dedent();
            self.writeln("}");
            self.blank();
        }

        for (i, property) in flat.assumptions.iter().enumerate() {
            self.writeln(&format!("/* assumption \"{}\" */", property.display));
            self.writeln(&format!(
                "static bool assumption_{i}({}) {{",
                self.rule_params(&property.quantifiers)
            ));
            self.indent();
            for &alias in &property.aliases {
                self.alias_binding(alias)?;
            }
            let e = self.rvalue(property.expr)?;
            self.writeln(&format!("return {e};"));
            self.dedent();
            self.writeln("}");
            self.blank();
        }

        self.emit_init(&flat)?;
        self.emit_explore(&flat)?;
        Ok(())
    }

    /// `init`: one candidate state per startstate per quantifier tuple,
    /// run, deduplicated and enqueued.
    fn emit_init(&mut self, flat: &FlatModel) -> Result<()> {
        self.writeln("static void init(void) {");
        self.indent();
        for (i, start) in flat.startstates.iter().enumerate() {
            self.writeln(&format!("/* startstate \"{}\" */", start.display));
            let closes = self.open_quantifiers(&start.quantifiers)?;
            self.writeln("{");
            self.indent();
            self.writeln("struct state *s = state_new();");
            self.writeln("bool discard = false;");
            self.writeln("if (JMP_BUF_NEEDED) {");
            self.indent();
            self.writeln("if (setjmp(checkpoint)) {");
            self.indent();
            self.writeln("/* a startstate body raised an error; drop the candidate */");
            self.writeln("free(s);");
            self.writeln("discard = true;");
            self.dedent();
            self.writeln("}");
            self.dedent();
            self.writeln("}");
            self.writeln("if (!discard) {");
            self.indent();
            let args = self.rule_args("s", &start.quantifiers);
            self.writeln(&format!("startstate_{i}({args});"));
            self.writeln("size_t size;");
            self.writeln("if (set_insert(s, &size)) {");
            self.indent();
            self.writeln("(void)queue_enqueue(s, 0);");
            self.dedent();
            self.writeln("} else {");
            self.indent();
            self.writeln("free(s);");
            self.dedent();
            self.writeln("}");
            self.dedent();
            self.writeln("}");
            self.dedent();
            self.writeln("}");
            self.close_quantifiers(closes);
        }
        self.dedent();
        self.writeln("}");
        self.blank();
        Ok(())
    }

    /// The breadth-first worker loop.
    fn emit_explore(&mut self, flat: &FlatModel) -> Result<()> {
        let deadlock = !matches!(self.options.deadlock_detection, DeadlockDetection::Off);
        let has_assumptions = !flat.assumptions.is_empty();

        self.writeln("static _Noreturn void explore(void) {");
        self.indent();
        self.blank();
        self.writeln("/* Errors and failed assumptions resume from here. */");
        self.writeln("if (JMP_BUF_NEEDED) {");
        self.indent();
        self.writeln("(void)setjmp(checkpoint);");
        self.dedent();
        self.writeln("}");
        self.blank();
        self.writeln("for (;;) {");
        self.indent();
        self.blank();
        self.writeln("if (error_count >= MAX_ERRORS) {");
        self.indent();
        self.writeln("exit_with(EXIT_FAILURE);");
        self.dedent();
        self.writeln("}");
        self.blank();
        self.writeln("size_t queue_id = thread_id;");
        self.writeln("const struct state *s = queue_dequeue(&queue_id);");
        self.writeln("if (s == NULL) {");
        self.indent();
        self.writeln("break;");
        self.dedent();
        self.writeln("}");
        self.blank();
        self.writeln("states_processed++;");
        self.blank();

        for (i, property) in flat.invariants.iter().enumerate() {
            let quantifiers = property.quantifiers.clone();
            let label = if property.category == PropertyCategory::Invariant {
                "invariant"
            } else {
                "assertion"
            };
            self.writeln(&format!("/* {label} \"{}\" */", property.display));
            let closes = self.open_quantifiers(&quantifiers)?;
            let args = self.rule_args("s", &quantifiers);
            self.writeln(&format!("if (!property_{i}({args})) {{"));
            self.indent();
            self.writeln(&format!(
                "error(s, true, \"{label} %s failed\", \"{}\");",
                property.display
            ));
            self.dedent();
            self.writeln("}");
            self.close_quantifiers(closes);
            self.blank();
        }

        if has_assumptions {
            self.writeln("bool assumptions_hold = true;");
            for (i, property) in flat.assumptions.iter().enumerate() {
                let quantifiers = property.quantifiers.clone();
                self.writeln(&format!("/* assumption \"{}\" */", property.display));
                let closes = self.open_quantifiers(&quantifiers)?;
                let args = self.rule_args("s", &quantifiers);
                self.writeln(&format!("if (!assumption_{i}({args})) {{"));
                self.indent();
                self.writeln("assumptions_hold = false;");
                self.dedent();
                self.writeln("}");
                self.close_quantifiers(closes);
            }
            self.writeln("if (!assumptions_hold) {");
            self.indent();
            self.writeln("/* prune without counting an error */");
            self.writeln("continue;");
            self.dedent();
            self.writeln("}");
            self.blank();
        }

        if deadlock {
            self.writeln("bool fired_any = false;");
            self.blank();
        }

        for (i, simple) in flat.simples.iter().enumerate() {
            let quantifiers = simple.quantifiers.clone();
            self.writeln(&format!("/* rule \"{}\" */", simple.display));
            let closes = self.open_quantifiers(&quantifiers)?;
            let guard_args = self.rule_args("s", &quantifiers);
            self.writeln(&format!("if (guard_{i}({guard_args})) {{"));
            self.indent();
            if deadlock {
                self.writeln("fired_any = true;");
            }
            self.writeln("struct state *n = state_dup(s);");
            let rule_args = self.rule_args("n", &quantifiers);
            self.writeln(&format!("rule_{i}({rule_args});"));
            self.writeln("rules_fired_local++;");
            self.writeln("size_t size;");
            self.writeln("if (set_insert(n, &size)) {");
            self.indent();
            self.writeln("size_t enqueued = queue_enqueue(n, state_hash(n) % THREADS);");
            self.writeln("if (THREADS > 1 && thread_id == 0 && phase == WARMUP &&");
            self.writeln("    enqueued >= WARMUP_QUEUE_THRESHOLD) {");
            self.indent();
            self.writeln("start_secondary_threads();");
            self.writeln("phase = RUN;");
            self.dedent();
            self.writeln("}");
            self.dedent();
            self.writeln("} else {");
            self.indent();
            self.writeln("free(n);");
            self.dedent();
            self.writeln("}");
            self.dedent();
            self.writeln("}");
            self.close_quantifiers(closes);
            self.blank();
        }

        if deadlock {
            self.writeln("if (!fired_any) {");
            self.indent();
            self.writeln("error(s, true, \"deadlock\");");
            self.dedent();
            self.writeln("}");
            self.blank();
        }

        self.writeln("if (thread_id == 0 && states_processed % 65536 == 0) {");
        self.indent();
        self.writeln("print_lock();");
        self.writeln(
            "printf(\"\\t%zu states explored in %llus, with %\" PRIuMAX \" rules fired and \"",
        );
        self.writeln("       \"%zu states in the queue.\\n\", local_seen->count, gettime(),");
        self.writeln("       rules_fired_local, queue_size_estimate());");
        self.writeln("print_unlock();");
        self.dedent();
        self.writeln("}");
        self.dedent();
        self.writeln("}");
        self.blank();
        self.writeln("exit_with(error_count == 0 ? EXIT_SUCCESS : EXIT_FAILURE);");
        self.dedent();
        self.writeln("}");
        self.blank();
        Ok(())
    }
}
