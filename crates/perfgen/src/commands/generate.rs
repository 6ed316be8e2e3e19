//! Equations and metricsets commands.

use std::path::{Path, PathBuf};

use perfgen::{EmitConfig, EquationsJob, MetricSetsJob, Summary};

use super::fail;
use crate::cli::EXIT_SUCCESS;
use crate::terminal::{Spinner, path_output};

/// Arguments of the `metricsets` command.
pub struct MetricSetsArgs<'a> {
    pub header: &'a Path,
    pub code: &'a Path,
    pub equations_include: &'a Path,
    pub registers_include: &'a Path,
    pub xml_file: &'a Path,
    pub sub_format: Option<&'a str>,
    pub use_tabs: bool,
}

fn report(spinner: &Spinner, message: &str, summary: &Summary, silent: bool) -> i32 {
    spinner.finish_with_success(message);
    if !silent {
        for path in &summary.outputs {
            path_output(path);
        }
    }
    EXIT_SUCCESS
}

/// Handle the `equations` command.
pub fn cmd_equations(
    header: &Path,
    code: &Path,
    use_tabs: bool,
    xml_files: &[PathBuf],
    silent: bool,
) -> i32 {
    let spinner = Spinner::new(
        format!("Generating equations for {} file(s)", xml_files.len()),
        silent,
    );
    let job = EquationsJob {
        header: header.to_path_buf(),
        code: code.to_path_buf(),
        xml_files: xml_files.to_vec(),
        config: EmitConfig::default().with_use_tabs(use_tabs),
    };

    match perfgen::generate_equation_files(&job) {
        Ok(summary) => report(
            &spinner,
            &format!(
                "Generated equations for {} counters in {} generation(s)",
                summary.counters, summary.generations
            ),
            &summary,
            silent,
        ),
        Err(err) => fail(&spinner, "equations generation", &err),
    }
}

/// Handle the `metricsets` command.
pub fn cmd_metricsets(args: &MetricSetsArgs<'_>, silent: bool) -> i32 {
    let spinner = Spinner::new(
        format!("Generating metric sets from {}", args.xml_file.display()),
        silent,
    );
    let job = MetricSetsJob {
        header: args.header.to_path_buf(),
        code: args.code.to_path_buf(),
        equations_include: args.equations_include.to_path_buf(),
        registers_include: args.registers_include.to_path_buf(),
        xml_file: args.xml_file.to_path_buf(),
        sub_format: args.sub_format.map(str::to_string),
        config: EmitConfig::default().with_use_tabs(args.use_tabs),
    };

    match perfgen::generate_metric_set_files(&job) {
        Ok(summary) => report(
            &spinner,
            &format!(
                "Generated {} metric set(s) with {} counters",
                summary.sets, summary.counters
            ),
            &summary,
            silent,
        ),
        Err(err) => fail(&spinner, "metric set generation", &err),
    }
}
