//! Read/max accumulator function emission.
//!
//! Every counter gets a read function and, when it has a non-percentage max
//! equation, a max function. Counters whose equations hash the same share a
//! single function: the code pass emits the body once and the header pass
//! declares the remaining symbols as aliases of the first one.

mod cache;

pub use cache::FuncCache;

use perfgen_model::{Counter, DataType, Generation, MetricSet};
use tracing::debug;

use crate::Result;
use crate::config::EmitConfig;
use crate::prelude::{gen_banner, include_guard};
use crate::rpn::{compile_equation, write_equation};
use crate::writer::CodeWriter;

/// Percentage callback data types, in emission order.
const PERCENTAGE_TYPES: [DataType; 2] = [DataType::Float, DataType::Uint64];

/// Generated equations header and source.
#[derive(Clone, Debug, Default)]
pub struct EquationsOutput {
    pub header: String,
    pub code: String,
}

/// Generate the equations header and source for `gens`.
///
/// `header_name` is the header's base name, used for the `#include` in the
/// source and for the include guard.
///
/// # Errors
///
/// Fails if any read or max equation does not compile.
pub fn generate_equations(
    gens: &[Generation],
    config: &EmitConfig,
    header_name: &str,
) -> Result<EquationsOutput> {
    let code = EquationEmitter::new(config, FuncCache::new()).emit_code(gens, header_name)?;
    let header = EquationEmitter::new(config, FuncCache::new()).emit_header(gens, header_name);
    Ok(EquationsOutput { header, code })
}

fn percentage_sym(data_type: DataType) -> String {
    format!("percentage_max_callback_{data_type}")
}

/// Write a read/max function signature; `terminator` follows the last
/// parameter line (`""` for definitions, `";"` for prototypes).
fn write_signature(w: &mut CodeWriter, data_type: DataType, sym: &str, terminator: &str) {
    w.line(data_type.c_type());
    w.line(format!("{sym}(const struct intel_perf *perf,"));
    w.indent(sym.len() + 1);
    w.line("const struct intel_perf_metric_set *metric_set,");
    w.line(format!("uint64_t *accumulator){terminator}"));
    w.outdent(sym.len() + 1);
}

/// One emission pass over all generations.
pub struct EquationEmitter {
    w: CodeWriter,
    cache: FuncCache,
}

impl EquationEmitter {
    #[must_use]
    pub fn new(config: &EmitConfig, cache: FuncCache) -> Self {
        let mut w = config.writer();
        w.frag(&gen_banner(&config.generator));
        w.blank();
        Self { w, cache }
    }

    /// Emit the source file.
    ///
    /// # Errors
    ///
    /// Fails if any equation does not compile.
    pub fn emit_code(mut self, gens: &[Generation], header_name: &str) -> Result<String> {
        self.w.line("#include <stdlib.h>");
        self.w.line("#include <string.h>");
        self.w.blank();
        self.w.line("#include <i915_drm.h>");
        self.w.blank();
        self.w.line("#include \"i915/perf.h\"");
        self.w.line(format!("#include \"{header_name}\""));
        self.w.blank();
        self.w.line("#define MIN(x, y) (((x) < (y)) ? (x) : (y))");
        self.w.line("#define MAX(a, b) (((a) > (b)) ? (a) : (b))");

        for data_type in PERCENTAGE_TYPES {
            self.w.blank();
            write_signature(&mut self.w, data_type, &percentage_sym(data_type), "");
            self.w.line("{");
            self.w.indent(4);
            self.w.line("return 100;");
            self.w.outdent(4);
            self.w.line("}");
        }

        for generation in gens {
            let before = self.cache.len();
            for set in generation.sets() {
                for counter in set.counters() {
                    self.emit_function(
                        set,
                        counter,
                        &counter.read_sym,
                        counter.read_hash(),
                        &counter.equation,
                    )?;
                    if let (Some(equation), Some(hash)) =
                        (counter.max_equation_text(), counter.max_hash())
                    {
                        self.emit_function(set, counter, &counter.max_sym, hash, equation)?;
                    }
                }
            }
            debug!(
                chipset = %generation.chipset,
                functions = self.cache.len() - before,
                "emitted equation functions"
            );
        }

        Ok(self.w.take_output())
    }

    fn emit_function(
        &mut self,
        set: &MetricSet,
        counter: &Counter,
        sym: &str,
        hash: &str,
        equation: &str,
    ) -> Result<()> {
        if self.cache.lookup(counter.data_type, hash).is_some() {
            return Ok(());
        }
        let compiled = compile_equation(set, counter, equation)?;

        self.w.blank();
        self.w.line(format!("/* {} :: {} */", set.name, counter.name));
        write_signature(&mut self.w, counter.data_type, sym, "");
        self.w.line("{");
        self.w.indent(4);
        write_equation(&mut self.w, &compiled);
        self.w.outdent(4);
        self.w.line("}");

        self.cache.record(counter.data_type, hash, sym);
        Ok(())
    }

    /// Emit the header file.
    #[must_use]
    pub fn emit_header(mut self, gens: &[Generation], header_name: &str) -> String {
        let guard = format!("__{}__", include_guard(header_name));
        self.w.line(format!("#ifndef {guard}"));
        self.w.line(format!("#define {guard}"));
        self.w.blank();
        self.w.line("#include <stddef.h>");
        self.w.line("#include <stdint.h>");
        self.w.line("#include <stdbool.h>");
        self.w.blank();
        self.w.line("struct intel_perf;");
        self.w.line("struct intel_perf_metric_set;");
        self.w.blank();
        for data_type in PERCENTAGE_TYPES {
            write_signature(&mut self.w, data_type, &percentage_sym(data_type), ";");
        }
        self.w.blank();

        let mut aliases = 0usize;
        for generation in gens {
            for set in generation.sets() {
                for counter in set.counters() {
                    aliases +=
                        usize::from(self.declare(counter, &counter.read_sym, counter.read_hash()));
                    if let (Some(_), Some(hash)) =
                        (counter.max_equation_text(), counter.max_hash())
                    {
                        aliases += usize::from(self.declare(counter, &counter.max_sym, hash));
                    }
                }
            }
        }
        debug!(functions = self.cache.len(), aliases, "declared equation functions");

        self.w.line(format!("#endif /* {guard} */"));
        self.w.take_output()
    }

    /// Declare `sym`, as an alias when an equivalent function was already
    /// declared. Returns whether an alias was written.
    fn declare(&mut self, counter: &Counter, sym: &str, hash: &str) -> bool {
        let alias = match self.cache.lookup(counter.data_type, hash) {
            Some(target) => {
                let target = target.to_string();
                self.w.line(format!("#define {sym} \\"));
                self.w.indent(4);
                self.w.line(target);
                self.w.outdent(4);
                true
            }
            None => {
                write_signature(&mut self.w, counter.data_type, sym, ";");
                self.cache.record(counter.data_type, hash, sym);
                false
            }
        };
        self.w.blank();
        alias
    }
}
