//! The generated prelude: includes, configuration constants and the
//! embedded runtime template.

use crate::{assumption_count, ColorMode, CounterexampleTrace, DeadlockDetection, Emitter};
use sift_diagnostic::Result;

/// The fixed exploration kernel, emitted verbatim after the prelude.
const RUNTIME: &str = include_str!("../../resources/runtime.c");

impl Emitter<'_> {
    pub(crate) fn emit_prelude(&mut self) -> Result<()> {
        self.writeln("/* Generated by sift. Do not edit. */");
        self.blank();

        for header in [
            "assert.h",
            "inttypes.h",
            "limits.h",
            "pthread.h",
            "setjmp.h",
            "stdarg.h",
            "stdatomic.h",
            "stdbool.h",
            "stddef.h",
            "stdint.h",
            "stdio.h",
            "stdlib.h",
            "string.h",
            "time.h",
            "unistd.h",
        ] {
            self.writeln(&format!("#include <{header}>"));
        }
        self.blank();

        // sandbox support headers; the filter code is compiled in whether
        // or not SANDBOX_ENABLED is set
        self.writeln("#ifdef __APPLE__");
        self.writeln("  #include <sandbox.h>");
        self.writeln("#endif");
        self.writeln("#ifdef __linux__");
        self.writeln("  #include <linux/filter.h>");
        self.writeln("  #include <linux/seccomp.h>");
        self.writeln("  #include <linux/version.h>");
        self.writeln("  #include <sys/prctl.h>");
        self.writeln("  #include <sys/syscall.h>");
        self.writeln("#endif");
        self.blank();

        // the value scalar
        let vt = self.options.value_type;
        self.writeln(&format!("typedef {} value_t;", vt.c_type()));
        self.writeln(&format!("#define PRIVAL PRId{}", &vt.macro_prefix()[3..]));
        self.writeln(&format!("#define VALUE_MIN {}_MIN", vt.macro_prefix()));
        self.writeln(&format!("#define VALUE_MAX {}_MAX", vt.macro_prefix()));
        self.writeln(&format!("#define VALUE_C {}_C", vt.macro_prefix()));
        self.blank();

        // model and option constants
        self.writeln(&format!(
            "#define STATE_SIZE_BITS {}",
            self.model.state_size_bits
        ));
        self.writeln(&format!("#define THREADS {}", self.options.threads.max(1)));
        self.writeln(&format!("#define MAX_ERRORS {}", self.options.max_errors));
        self.writeln(&format!(
            "#define ASSUMPTION_COUNT {}",
            assumption_count(self.ast, self.model)
        ));
        self.writeln(&format!(
            "#define SET_CAPACITY ((size_t){})",
            self.options.set_capacity
        ));
        self.writeln(&format!(
            "#define SET_EXPAND_THRESHOLD {}",
            self.options.set_expand_threshold
        ));
        self.writeln(&format!(
            "#define SANDBOX_ENABLED {}",
            i32::from(self.options.sandbox)
        ));
        self.writeln(&format!(
            "#define MACHINE_READABLE_OUTPUT {}",
            i32::from(self.options.machine_readable)
        ));
        self.writeln(&format!(
            "#define COUNTEREXAMPLE_ENABLED {}",
            i32::from(!matches!(self.options.counterexample, CounterexampleTrace::Off))
        ));
        self.writeln(&format!(
            "#define COUNTEREXAMPLE_DIFF {}",
            i32::from(matches!(self.options.counterexample, CounterexampleTrace::Diff))
        ));
        self.writeln(&format!(
            "#define DEADLOCK_DETECTION {}",
            i32::from(!matches!(
                self.options.deadlock_detection,
                DeadlockDetection::Off
            ))
        ));
        self.writeln(&format!(
            "#define OVERFLOW_CHECKS {}",
            i32::from(self.options.overflow_checks)
        ));
        self.writeln("enum { WARMUP_QUEUE_THRESHOLD = 32 };");
        self.blank();

        // colour mode
        self.writeln("enum { OFF = 0, ON = 1, AUTO = 2 };");
        let color = match self.options.color {
            ColorMode::On => "ON",
            ColorMode::Off => "OFF",
            ColorMode::Auto => "AUTO",
        };
        self.writeln(&format!("enum {{ COLOR = {color} }};"));
        self.blank();

        // trace categories
        self.writeln("enum trace_category_t {");
        self.writeln("  TC_HANDLE_READS = 1,");
        self.writeln("  TC_HANDLE_WRITES = 2,");
        self.writeln("  TC_QUEUE = 4,");
        self.writeln("  TC_SET = 8,");
        self.writeln("};");
        self.writeln(&format!(
            "#define TRACES_ENABLED {}",
            self.options.traces.bits()
        ));
        self.blank();

        Ok(())
    }

    pub(crate) fn emit_runtime(&mut self) {
        self.write(RUNTIME);
        self.blank();
    }
}
