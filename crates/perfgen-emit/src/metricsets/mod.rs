//! Metric set registration emission.
//!
//! Generates, for one chipset, a registration function per metric set that
//! fills in the set's OA layout and its logical counters, guard functions
//! for counters with an availability expression, and the chipset's
//! `intel_perf_load_metrics_*` entry point.

mod layout;

pub use layout::{OaLayout, RAW_SIZE};

use perfgen_model::{Counter, Generation, MetricSet};
use tracing::debug;

use crate::Result;
use crate::config::EmitConfig;
use crate::prelude::{c_string, gen_banner, include_guard};
use crate::rpn::splice_expression;
use crate::writer::CodeWriter;

/// Base names of the headers the generated source includes.
#[derive(Clone, Copy, Debug)]
pub struct MetricSetIncludes<'a> {
    /// The metric sets header itself.
    pub header: &'a str,
    pub equations: &'a str,
    pub registers: &'a str,
}

/// Generated metric sets header and source.
#[derive(Clone, Debug)]
pub struct MetricSetsOutput {
    pub header: String,
    pub code: String,
    pub layout: OaLayout,
}

/// Generate the metric set registration header and source for `generation`.
///
/// # Errors
///
/// Fails when no OA layout matches the chipset and sub-format, or when an
/// availability expression cannot be spliced.
pub fn generate_metric_sets(
    generation: &Generation,
    config: &EmitConfig,
    includes: &MetricSetIncludes<'_>,
    sub_format: Option<&str>,
) -> Result<MetricSetsOutput> {
    let layout = OaLayout::select(&generation.chipset, sub_format)?;
    debug!(chipset = %generation.chipset, ?layout, "selected OA layout");

    let mut emitter = MetricSetEmitter {
        w: config.writer(),
        chipset: &generation.chipset,
        layout,
    };
    emitter.banner(&config.generator);
    emitter.emit_code(generation, includes)?;
    let code = emitter.w.take_output();

    let mut w = config.writer();
    w.frag(&gen_banner(&config.generator));
    w.blank();
    write_header(&mut w, &generation.chipset, includes.header);

    Ok(MetricSetsOutput {
        header: w.take_output(),
        code,
        layout,
    })
}

fn write_header(w: &mut CodeWriter, chipset: &str, header_name: &str) {
    let guard = include_guard(header_name);
    w.line(format!("#ifndef {guard}"));
    w.line(format!("#define {guard}"));
    w.blank();
    w.line("#include \"i915/perf.h\"");
    w.blank();
    w.line(format!("void intel_perf_load_metrics_{chipset}(struct intel_perf *perf);"));
    w.blank();
    w.line(format!("#endif /* {guard} */"));
}

/// `INTEL_PERF_LOGICAL_COUNTER_TYPE_*` suffix for a semantic type.
fn semantic_type(semantic: &str) -> String {
    match semantic {
        "duration" => "RAW".to_string(),
        "ratio" => "EVENT".to_string(),
        other => other.to_uppercase(),
    }
}

/// `INTEL_PERF_LOGICAL_COUNTER_UNIT_*` suffix.
fn units(units: &str) -> String {
    units.replace(' ', "_").to_uppercase()
}

struct MetricSetEmitter<'a> {
    w: CodeWriter,
    chipset: &'a str,
    layout: OaLayout,
}

impl MetricSetEmitter<'_> {
    fn banner(&mut self, generator: &str) {
        self.w.frag(&gen_banner(generator));
        self.w.blank();
    }

    fn emit_code(&mut self, generation: &Generation, includes: &MetricSetIncludes<'_>) -> Result<()> {
        for header in ["stddef.h", "stdint.h", "stdlib.h", "stdbool.h", "assert.h"] {
            self.w.line(format!("#include <{header}>"));
        }
        self.w.blank();
        self.w.line("#include \"i915_drm.h\"");
        self.w.blank();
        for header in [includes.header, includes.equations, includes.registers] {
            self.w.line(format!("#include \"{header}\""));
        }

        for set in generation.sets() {
            let counters = set.sorted_counters();
            let guarded = self.emit_guards(set, &counters)?;
            self.emit_set(set, &counters);
            debug!(
                set = %set.name,
                counters = counters.len(),
                guarded,
                "emitted metric set registration"
            );
        }

        self.w.blank();
        self.w.line("void");
        self.w.line(format!(
            "intel_perf_load_metrics_{}(struct intel_perf *perf)",
            self.chipset
        ));
        self.w.line("{");
        self.w.indent(4);
        for set in generation.sets() {
            self.w.line(format!("{}(perf);", self.register_fn(set)));
        }
        self.w.outdent(4);
        self.w.line("}");
        Ok(())
    }

    fn register_fn(&self, set: &MetricSet) -> String {
        format!("{}_add_{}_metric_set", self.chipset, set.underscore_name)
    }

    fn guard_fn(&self, set: &MetricSet, counter: &Counter) -> String {
        format!(
            "{}__{}__{}__available",
            self.chipset, set.underscore_name, counter.underscore_name
        )
    }

    /// Emit a guard function for every counter with an availability
    /// expression. Returns how many were written.
    fn emit_guards(&mut self, set: &MetricSet, counters: &[&Counter]) -> Result<usize> {
        let mut guarded = 0;
        for counter in counters {
            let Some(availability) = &counter.availability else {
                continue;
            };
            let lines = splice_expression(set, &counter.name, availability)?.guard_lines();

            self.w.blank();
            self.w.line("static bool");
            self.w.line(format!(
                "{}(const struct intel_perf *perf)",
                self.guard_fn(set, counter)
            ));
            self.w.line("{");
            self.w.indent(4);
            self.w.line(format!("/* {availability} */"));
            let last = lines.len() - 1;
            for (i, line) in lines.iter().enumerate() {
                let head = if i == 0 { "return " } else { "       " };
                let tail = if i == last { ";" } else { " &&" };
                self.w.line(format!("{head}{line}{tail}"));
            }
            self.w.outdent(4);
            self.w.line("}");
            guarded += 1;
        }
        Ok(guarded)
    }

    fn emit_set(&mut self, set: &MetricSet, counters: &[&Counter]) {
        let n = counters.len();

        self.w.blank();
        self.w.line("static void");
        self.w.line(format!("{}(struct intel_perf *perf)", self.register_fn(set)));
        self.w.line("{");
        self.w.indent(4);

        self.w.line("struct intel_perf_metric_set *metric_set;");
        self.w.line("struct intel_perf_logical_counter *counter;");
        self.w.blank();
        self.w.line("metric_set = calloc(1, sizeof(*metric_set));");
        self.w.line(format!("metric_set->name = \"{}\";", c_string(&set.name)));
        self.w.line(format!(
            "metric_set->symbol_name = \"{}\";",
            c_string(&set.symbol_name)
        ));
        self.w.line(format!(
            "metric_set->hw_config_guid = \"{}\";",
            c_string(&set.hw_config_guid)
        ));
        self.w.line(format!(
            "metric_set->counters = calloc({n}, sizeof(struct intel_perf_logical_counter));"
        ));
        self.w.line("metric_set->n_counters = 0;");
        self.w.line("metric_set->perf_oa_metrics_set = 0; // determined at runtime");
        self.layout.write(&mut self.w);

        self.w.line(format!(
            "{}_{}_add_registers(perf, metric_set);",
            self.chipset, set.underscore_name
        ));
        self.w.line("intel_perf_add_metric_set(perf, metric_set);");

        for counter in counters {
            self.w.blank();
            if counter.availability.is_some() {
                self.w.line(format!("if ({}(perf)) {{", self.guard_fn(set, counter)));
                self.w.indent(4);
                self.emit_counter(counter);
                self.w.outdent(4);
                self.w.line("}");
            } else {
                self.emit_counter(counter);
            }
        }

        self.w.blank();
        self.w.line(format!("assert(metric_set->n_counters <= {n});"));
        self.w.outdent(4);
        self.w.line("}");
    }

    fn emit_counter(&mut self, counter: &Counter) {
        let data_type = counter.data_type;
        let w = &mut self.w;
        w.line("counter = &metric_set->counters[metric_set->n_counters++];");
        w.line("counter->metric_set = metric_set;");
        w.line(format!("counter->name = \"{}\";", c_string(&counter.name)));
        w.line(format!(
            "counter->symbol_name = \"{}\";",
            c_string(&counter.symbol_name)
        ));
        w.line(format!("counter->desc = \"{}\";", c_string(&counter.description)));
        w.line(format!(
            "counter->type = INTEL_PERF_LOGICAL_COUNTER_TYPE_{};",
            semantic_type(&counter.semantic_type)
        ));
        w.line(format!(
            "counter->storage = INTEL_PERF_LOGICAL_COUNTER_STORAGE_{};",
            data_type.as_str().to_uppercase()
        ));
        w.line(format!(
            "counter->unit = INTEL_PERF_LOGICAL_COUNTER_UNIT_{};",
            units(&counter.units)
        ));
        w.line(format!("counter->read_{data_type} = {};", counter.read_sym));
        w.line(format!("counter->max_{data_type} = {};", counter.max_sym));
        w.line(format!(
            "intel_perf_add_logical_counter(perf, counter, \"{}\");",
            c_string(&counter.mdapi_group)
        ));
    }
}
