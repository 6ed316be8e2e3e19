//! CLI definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for invalid invocations, matching clap's usage errors.
pub const EXIT_USAGE: i32 = 2;

#[derive(Parser)]
#[command(name = "perfgen")]
#[command(about = "OA metric set code generator - compiles counter XML to C")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output (only show errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub silent: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate read/max equation functions for one or more chipsets
    Equations {
        /// Header file to write
        #[arg(long, value_name = "FILE")]
        header: PathBuf,

        /// C file to write
        #[arg(long, value_name = "FILE")]
        code: PathBuf,

        /// Indent generated code with tabs
        #[arg(long)]
        use_tabs: bool,

        /// Metric description XML files
        #[arg(value_name = "XML", required = true)]
        xml_files: Vec<PathBuf>,
    },
    /// Generate metric set registration for one chipset
    Metricsets {
        /// Header file to write
        #[arg(long, value_name = "FILE")]
        header: PathBuf,

        /// C file to write
        #[arg(long, value_name = "FILE")]
        code: PathBuf,

        /// Equations header to include
        #[arg(long, value_name = "FILE")]
        equations_include: PathBuf,

        /// Registers header to include
        #[arg(long, value_name = "FILE")]
        registers_include: PathBuf,

        /// Metric description XML file
        #[arg(long, value_name = "XML")]
        xml_file: PathBuf,

        /// OA report sub-format (oa, oar)
        #[arg(long, value_name = "NAME")]
        sub_format: Option<String>,

        /// Indent generated code with tabs
        #[arg(long)]
        use_tabs: bool,
    },
    /// Validate metric description XML files without writing anything
    Check {
        /// OA report sub-format (oa, oar)
        #[arg(long, value_name = "NAME")]
        sub_format: Option<String>,

        /// Metric description XML files
        #[arg(value_name = "XML", required = true)]
        xml_files: Vec<PathBuf>,
    },
}

impl Cli {
    /// Default `tracing` directive for the verbosity flags.
    pub const fn log_directive(&self) -> &'static str {
        if self.verbose {
            "perfgen=debug"
        } else if self.silent {
            "perfgen=error"
        } else {
            "perfgen=info"
        }
    }
}
