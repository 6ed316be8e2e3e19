//! Generation pipeline - XML → model → C.

use std::path::PathBuf;

use perfgen_emit::interp::{EvalContext, Value, eval_compiled};
use perfgen_emit::rpn::{compile_equation, splice_expression};
use perfgen_emit::{
    EmitConfig, MetricSetIncludes, OaLayout, generate_equations, generate_metric_sets,
};
use perfgen_model::{Counter, Generation, MetricSet};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::output::{file_name, with_cleanup, write_file};
use crate::{Error, Result};

/// Load XML documents, in parallel, keeping the order of `paths`.
///
/// # Errors
///
/// Fails with [`Error::MissingInput`] before parsing anything if a path is
/// not a file, otherwise with the first model error in `paths` order.
pub fn load_generations(paths: &[PathBuf]) -> Result<Vec<Generation>> {
    if let Some(missing) = paths.iter().find(|path| !path.is_file()) {
        return Err(Error::MissingInput(missing.clone()));
    }
    let gens = paths
        .par_iter()
        .map(|path| Generation::load(path))
        .collect::<Vec<_>>()
        .into_iter()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    for generation in &gens {
        debug!(
            source = %generation.source.display(),
            chipset = %generation.chipset,
            sets = generation.sets().len(),
            counters = generation.counter_count(),
            "loaded generation"
        );
    }
    Ok(gens)
}

/// What a successful run produced.
#[derive(Clone, Debug, Default)]
pub struct Summary {
    pub generations: usize,
    pub sets: usize,
    pub counters: usize,
    pub outputs: Vec<PathBuf>,
}

impl Summary {
    fn new(gens: &[Generation]) -> Self {
        Self {
            generations: gens.len(),
            sets: gens.iter().map(|g| g.sets().len()).sum(),
            counters: gens.iter().map(Generation::counter_count).sum(),
            outputs: Vec::new(),
        }
    }
}

/// `equations` invocation.
#[derive(Clone, Debug)]
pub struct EquationsJob {
    pub header: PathBuf,
    pub code: PathBuf,
    pub xml_files: Vec<PathBuf>,
    pub config: EmitConfig,
}

/// Generate the equations header and source.
///
/// # Errors
///
/// Fails on usage, model, emission or I/O errors; both output paths are
/// removed in that case.
pub fn generate_equation_files(job: &EquationsJob) -> Result<Summary> {
    with_cleanup(&[&job.header, &job.code], || {
        let header_name = file_name(&job.header)?;
        let gens = load_generations(&job.xml_files)?;
        let out = generate_equations(&gens, &job.config, &header_name)?;

        write_file(&job.header, &out.header)?;
        write_file(&job.code, &out.code)?;

        let mut summary = Summary::new(&gens);
        summary.outputs = vec![job.header.clone(), job.code.clone()];
        info!(
            generations = summary.generations,
            counters = summary.counters,
            header = %job.header.display(),
            code = %job.code.display(),
            "generated equations"
        );
        Ok(summary)
    })
}

/// `metricsets` invocation.
#[derive(Clone, Debug)]
pub struct MetricSetsJob {
    pub header: PathBuf,
    pub code: PathBuf,
    pub equations_include: PathBuf,
    pub registers_include: PathBuf,
    pub xml_file: PathBuf,
    pub sub_format: Option<String>,
    pub config: EmitConfig,
}

/// Generate one chipset's metric set registration header and source.
///
/// # Errors
///
/// Fails on usage, model, emission or I/O errors; both output paths are
/// removed in that case.
pub fn generate_metric_set_files(job: &MetricSetsJob) -> Result<Summary> {
    with_cleanup(&[&job.header, &job.code], || {
        let header = file_name(&job.header)?;
        let equations = file_name(&job.equations_include)?;
        let registers = file_name(&job.registers_include)?;
        if !job.xml_file.is_file() {
            return Err(Error::MissingInput(job.xml_file.clone()));
        }
        let generation = Generation::load(&job.xml_file)?;

        let includes = MetricSetIncludes {
            header: &header,
            equations: &equations,
            registers: &registers,
        };
        let out = generate_metric_sets(
            &generation,
            &job.config,
            &includes,
            job.sub_format.as_deref(),
        )?;

        write_file(&job.header, &out.header)?;
        write_file(&job.code, &out.code)?;

        let mut summary = Summary::new(std::slice::from_ref(&generation));
        summary.outputs = vec![job.header.clone(), job.code.clone()];
        info!(
            chipset = %generation.chipset,
            sets = summary.sets,
            counters = summary.counters,
            layout = ?out.layout,
            "generated metric sets"
        );
        Ok(summary)
    })
}

/// Result of validating XML documents without generating code.
#[derive(Clone, Debug, Default)]
pub struct CheckReport {
    pub summary: Summary,
    /// Read and max equations compiled and evaluated.
    pub equations: usize,
    /// Availability expressions spliced.
    pub guards: usize,
}

/// Validate XML documents: build the model, compile every equation and
/// availability expression, and evaluate every compiled equation against a
/// zeroed accumulator of the chipset's OA layout.
///
/// # Errors
///
/// Returns the first problem found.
pub fn check(paths: &[PathBuf], sub_format: Option<&str>) -> Result<CheckReport> {
    let gens = load_generations(paths)?;
    let mut report = CheckReport {
        summary: Summary::new(&gens),
        ..CheckReport::default()
    };

    for generation in &gens {
        let layout = OaLayout::select(&generation.chipset, sub_format)?;
        let mut ctx = EvalContext::for_layout(layout).with_all_hw_vars(Value::U64(1));
        for set in generation.sets() {
            for counter in set.counters() {
                ctx = ctx.with_counter(&counter.var(), Value::U64(1));
            }
            for counter in set.counters() {
                report.equations += check_counter(set, counter, &ctx)?;
                if let Some(availability) = &counter.availability {
                    splice_expression(set, &counter.name, availability)?;
                    report.guards += 1;
                }
            }
        }
        debug!(
            source = %generation.source.display(),
            ?layout,
            "checked generation"
        );
    }

    info!(
        generations = report.summary.generations,
        sets = report.summary.sets,
        counters = report.summary.counters,
        equations = report.equations,
        guards = report.guards,
        "check passed"
    );
    Ok(report)
}

/// Compile and evaluate a counter's equations; returns how many there were.
fn check_counter(set: &MetricSet, counter: &Counter, ctx: &EvalContext) -> Result<usize> {
    let equations =
        std::iter::once(counter.equation.as_str()).chain(counter.max_equation_text());
    let mut checked = 0;
    for equation in equations {
        let compiled = compile_equation(set, counter, equation)?;
        eval_compiled(&compiled, ctx).map_err(|source| Error::Eval {
            set: set.name.clone(),
            counter: counter.name.clone(),
            equation: equation.to_string(),
            source,
        })?;
        checked += 1;
    }
    Ok(checked)
}
