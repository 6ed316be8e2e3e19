//! Command implementations.
//!
//! Each submodule handles one CLI command.

mod check;
mod generate;

use tracing::error;

use crate::cli::{Cli, Commands, EXIT_FAILURE, EXIT_USAGE};
use crate::terminal::Spinner;

/// Dispatch CLI command to the appropriate handler.
pub fn run_command(cli: &Cli) -> i32 {
    match &cli.command {
        Commands::Equations {
            header,
            code,
            use_tabs,
            xml_files,
        } => generate::cmd_equations(header, code, *use_tabs, xml_files, cli.silent),
        Commands::Metricsets {
            header,
            code,
            equations_include,
            registers_include,
            xml_file,
            sub_format,
            use_tabs,
        } => generate::cmd_metricsets(
            &generate::MetricSetsArgs {
                header,
                code,
                equations_include,
                registers_include,
                xml_file,
                sub_format: sub_format.as_deref(),
                use_tabs: *use_tabs,
            },
            cli.silent,
        ),
        Commands::Check {
            sub_format,
            xml_files,
        } => check::cmd_check(xml_files, sub_format.as_deref(), cli.silent),
    }
}

/// Report a failed command and pick its exit code.
fn fail(spinner: &Spinner, what: &str, err: &perfgen::Error) -> i32 {
    spinner.finish_with_failure(&format!("{what} failed"));
    error!(error = %err, "{what} failed");
    if err.is_usage() {
        EXIT_USAGE
    } else {
        EXIT_FAILURE
    }
}
