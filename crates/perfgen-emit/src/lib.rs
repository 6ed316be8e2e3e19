//! C code emission for OA counter equations and metric sets.
//!
//! - [`rpn`]: operator tables, equation compiler and availability splicer
//! - [`interp`]: reference interpreter for compiled equations
//! - [`equations`]: deduplicated read/max accumulator functions
//! - [`metricsets`]: per-chipset metric set registration

mod config;
pub mod equations;
pub mod interp;
pub mod metricsets;
mod prelude;
pub mod rpn;
mod writer;

pub use config::*;
pub use equations::{EquationsOutput, FuncCache, generate_equations};
pub use metricsets::{MetricSetIncludes, MetricSetsOutput, OaLayout, generate_metric_sets};
pub use prelude::{c_string, include_guard};
pub use writer::CodeWriter;

use thiserror::Error;

/// Code emission errors.
#[derive(Error, Debug)]
pub enum EmitError {
    #[error("Failed to resolve variable {variable} in equation \"{equation}\" for {set} :: {counter}")]
    UnresolvedVariable {
        set: String,
        counter: String,
        variable: String,
        equation: String,
    },
    #[error(
        "Counter reference {variable} is not allowed in expression \"{equation}\" for {set} :: {counter}"
    )]
    CounterInExpression {
        set: String,
        counter: String,
        variable: String,
        equation: String,
    },
    #[error("Spurious RPN code for {set} :: {counter}: {reason}, in the equation \"{equation}\"")]
    MalformedEquation {
        set: String,
        counter: String,
        equation: String,
        reason: String,
    },
    #[error("No OA layout for chipset {chipset} with sub-format {sub_format}")]
    UnsupportedLayout { chipset: String, sub_format: String },
}

pub type Result<T> = std::result::Result<T, EmitError>;
