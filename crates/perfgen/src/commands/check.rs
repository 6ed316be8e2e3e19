//! Check command.

use std::path::PathBuf;

use super::fail;
use crate::cli::EXIT_SUCCESS;
use crate::terminal::Spinner;

/// Handle the `check` command.
pub fn cmd_check(xml_files: &[PathBuf], sub_format: Option<&str>, silent: bool) -> i32 {
    let spinner = Spinner::new(format!("Checking {} file(s)", xml_files.len()), silent);
    match perfgen::check(xml_files, sub_format) {
        Ok(report) => {
            spinner.finish_with_success(&format!(
                "{} equations and {} availability guards in {} metric set(s) are valid",
                report.equations, report.guards, report.summary.sets
            ));
            EXIT_SUCCESS
        }
        Err(err) => fail(&spinner, "check", &err),
    }
}
