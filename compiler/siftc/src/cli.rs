//! Command line surface.

use clap::{Parser, ValueEnum};
use sift_codegen::{
    CodegenOptions, ColorMode, CounterexampleTrace, DeadlockDetection, TraceFlags, ValueType,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sift",
    version,
    about = "Generate an explicit-state model checker from a model description",
    long_about = "Reads a model description and emits a self-contained C program that \
                  explores the model's state space breadth-first and reports \
                  counterexample traces for violated properties."
)]
pub struct Cli {
    /// Input model file (stdin when omitted).
    pub input: Option<PathBuf>,

    /// Output C file (defaults to the input with a .c extension).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Worker threads in the generated checker.
    #[arg(long, default_value_t = default_threads())]
    pub threads: usize,

    /// Errors to report before the checker gives up.
    #[arg(long, default_value_t = 1)]
    pub max_errors: u64,

    /// Sandbox the generated checker (seccomp on Linux, the OS sandbox on
    /// macOS).
    #[arg(long, value_enum, default_value = "auto")]
    pub sandbox: Toggle,

    /// Colour in the checker's output.
    #[arg(long, value_enum, default_value = "auto")]
    pub color: Toggle,

    /// Initial seen-set allocation, in bytes.
    #[arg(long, default_value_t = 8 * 1024 * 1024)]
    pub set_capacity: u64,

    /// Seen-set occupancy (percent) that triggers expansion.
    #[arg(long, default_value_t = 65, value_parser = clap::value_parser!(u8).range(1..100))]
    pub set_expand_threshold: u8,

    /// Width of the checker's value scalar.
    #[arg(long, value_enum, default_value = "int64")]
    pub value_type: ValueTypeArg,

    /// Runtime trace categories (comma separated):
    /// handle_reads, handle_writes, queue, set, all.
    #[arg(long, value_delimiter = ',')]
    pub trace: Vec<TraceCategory>,

    /// Report states with no enabled outgoing rule.
    #[arg(long, value_enum, default_value = "off")]
    pub deadlock_detection: DeadlockArg,

    /// Accepted for compatibility; no reduction is performed.
    #[arg(long, value_enum, default_value = "off")]
    pub symmetry_reduction: SymmetryArg,

    /// Counterexample trace printing.
    #[arg(long, value_enum, default_value = "full")]
    pub counterexample_trace: CounterexampleArg,

    /// Emit machine-readable (XML) state components.
    #[arg(long)]
    pub machine_readable: bool,

    /// Check integer arithmetic for overflow at run time.
    #[arg(long, value_enum, default_value = "on")]
    pub overflow_checks: OnOff,

    /// Simplify expressions with an external SMT solver before emission.
    /// The solver integration is not bundled; enabling this logs a warning.
    #[arg(long, value_enum, default_value = "off")]
    pub smt_simplification: OnOff,

    /// Suppress informational output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose diagnostics from the generator itself.
    #[arg(short, long)]
    pub verbose: bool,
}

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
    Auto,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OnOff {
    On,
    Off,
}

impl OnOff {
    pub fn enabled(self) -> bool {
        self == OnOff::On
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ValueTypeArg {
    Int8,
    Int16,
    Int32,
    Int64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TraceCategory {
    #[value(name = "handle_reads")]
    HandleReads,
    #[value(name = "handle_writes")]
    HandleWrites,
    Queue,
    Set,
    All,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DeadlockArg {
    Stuck,
    Stuttering,
    Off,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SymmetryArg {
    Heuristic,
    Exhaustive,
    Off,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum CounterexampleArg {
    Full,
    Diff,
    Off,
}

impl Cli {
    /// Lower the CLI surface into emitter options.
    pub fn codegen_options(&self) -> CodegenOptions {
        let mut traces = TraceFlags::empty();
        for category in &self.trace {
            traces |= match category {
                TraceCategory::HandleReads => TraceFlags::HANDLE_READS,
                TraceCategory::HandleWrites => TraceFlags::HANDLE_WRITES,
                TraceCategory::Queue => TraceFlags::QUEUE,
                TraceCategory::Set => TraceFlags::SET,
                TraceCategory::All => TraceFlags::all(),
            };
        }

        CodegenOptions {
            threads: self.threads.max(1),
            max_errors: self.max_errors.max(1),
            sandbox: match self.sandbox {
                Toggle::On => true,
                Toggle::Off => false,
                // sandboxing is only implemented for the platforms we can
                // see at generation time
                Toggle::Auto => cfg!(any(target_os = "linux", target_os = "macos")),
            },
            color: match self.color {
                Toggle::On => ColorMode::On,
                Toggle::Off => ColorMode::Off,
                Toggle::Auto => ColorMode::Auto,
            },
            set_capacity: self.set_capacity,
            set_expand_threshold: self.set_expand_threshold,
            value_type: match self.value_type {
                ValueTypeArg::Int8 => ValueType::Int8,
                ValueTypeArg::Int16 => ValueType::Int16,
                ValueTypeArg::Int32 => ValueType::Int32,
                ValueTypeArg::Int64 => ValueType::Int64,
            },
            traces,
            deadlock_detection: match self.deadlock_detection {
                DeadlockArg::Stuck => DeadlockDetection::Stuck,
                DeadlockArg::Stuttering => DeadlockDetection::Stuttering,
                DeadlockArg::Off => DeadlockDetection::Off,
            },
            counterexample: match self.counterexample_trace {
                CounterexampleArg::Full => CounterexampleTrace::Full,
                CounterexampleArg::Diff => CounterexampleTrace::Diff,
                CounterexampleArg::Off => CounterexampleTrace::Off,
            },
            machine_readable: self.machine_readable,
            overflow_checks: self.overflow_checks.enabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn trace_categories_accumulate() {
        let cli = Cli::parse_from([
            "sift",
            "--trace",
            "queue,set",
            "--deadlock-detection",
            "stuck",
            "model.m",
        ]);
        let options = cli.codegen_options();
        assert_eq!(options.traces, TraceFlags::QUEUE | TraceFlags::SET);
        assert_eq!(options.deadlock_detection, DeadlockDetection::Stuck);
    }

    #[test]
    fn defaults_match_documentation() {
        let cli = Cli::parse_from(["sift", "model.m"]);
        let options = cli.codegen_options();
        assert_eq!(options.max_errors, 1);
        assert_eq!(options.set_expand_threshold, 65);
        assert!(options.overflow_checks);
        assert_eq!(options.counterexample, CounterexampleTrace::Full);
        assert!(options.traces.is_empty());
    }
}
