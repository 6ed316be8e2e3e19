//! Metric set model for OA counter code generation.
//!
//! Parses XML metric descriptions into strongly-typed records:
//! - [`Generation`]: one chipset's metric sets (one XML document)
//! - [`MetricSet`]: counters sharing a hardware config GUID
//! - [`Counter`]: read/max RPN equations plus derived symbols and hashes
//!
//! Counter references (`$SymbolName`) are resolved when a set is built and
//! canonicalized into read/max hashes used to deduplicate emitted functions.

mod counter;
mod generation;
mod hash;
pub mod hw_vars;
mod set;
pub mod xml;

pub use counter::*;
pub use generation::*;
pub use hw_vars::HwVar;
pub use set::*;

use std::path::PathBuf;

use thiserror::Error;

/// Model construction errors.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{source_name}: XML error: {source}")]
    Xml {
        source_name: String,
        #[source]
        source: roxmltree::Error,
    },
    #[error("{source_name}:{line}: <{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        source_name: String,
        line: u32,
        element: &'static str,
        attribute: &'static str,
    },
    #[error("{source_name}: no <set> elements found")]
    NoSets { source_name: String },
    #[error("Unhandled data type \"{data_type}\" for {set} :: {counter}")]
    UnknownDataType {
        set: String,
        counter: String,
        data_type: String,
    },
    #[error("Duplicate counter symbol '{symbol}' in set {set}")]
    DuplicateCounter { set: String, symbol: String },
    #[error("Failed to resolve variable {variable} in equation \"{equation}\" for {set} :: {counter}")]
    UnresolvedReference {
        set: String,
        counter: String,
        variable: String,
        equation: String,
    },
    #[error("Circular counter reference in set {set}: {}", .chain.join(" -> "))]
    CircularReference { set: String, chain: Vec<String> },
}

pub type Result<T> = std::result::Result<T, ModelError>;
