//! perfgen - OA metric set code generator
//!
//! Compiles XML descriptions of OA counter metric sets into the C sources
//! the i915 perf library builds: deduplicated read/max equation functions
//! and per-chipset metric set registration.
//!
//! # Example
//!
//! ```ignore
//! use perfgen::{EmitConfig, EquationsJob, generate_equation_files};
//!
//! let job = EquationsJob {
//!     header: "i915_perf_equations.h".into(),
//!     code: "i915_perf_equations.c".into(),
//!     xml_files: vec!["oa-tglgt1.xml".into()],
//!     config: EmitConfig::default(),
//! };
//! let summary = generate_equation_files(&job)?;
//! ```

// Re-export from sub-crates
pub use perfgen_emit::{
    EmitConfig, EmitError, EquationsOutput, MetricSetIncludes, MetricSetsOutput, OaLayout,
    generate_equations, generate_metric_sets,
};
pub use perfgen_model::{Counter, DataType, Generation, MetricSet, ModelError};

mod error;
mod output;
mod pipeline;

pub use error::{Error, Result};
pub use pipeline::*;
