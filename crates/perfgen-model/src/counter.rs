//! Hardware performance counters.

use std::fmt;

use crate::xml::CounterDesc;

/// Max equation text marking a percentage counter.
pub const PERCENTAGE_MAX: &str = "100";

/// Max symbol used when a counter has no max equation.
pub const UNDEFINED_MAX_SYM: &str = "NULL /* undefined */";

/// Storage type of a counter value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Uint64,
    Float,
}

impl DataType {
    /// Parse the XML `data_type` attribute.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "uint64" => Some(Self::Uint64),
            "float" => Some(Self::Float),
            _ => None,
        }
    }

    /// Name as written in the XML and in generated field names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uint64 => "uint64",
            Self::Float => "float",
        }
    }

    /// C return type of read/max functions.
    #[must_use]
    pub const fn c_type(self) -> &'static str {
        match self {
            Self::Uint64 => "uint64_t",
            Self::Float => "double",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A counter's max equation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MaxEquation {
    /// `"100"`: handled by the shared `percentage_max_callback_*` functions.
    Percentage,
    Equation(String),
}

impl MaxEquation {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if text == PERCENTAGE_MAX {
            Self::Percentage
        } else {
            Self::Equation(text.to_string())
        }
    }
}

/// One hardware performance counter of a metric set.
#[derive(Clone, Debug)]
pub struct Counter {
    pub symbol_name: String,
    pub underscore_name: String,
    pub name: String,
    pub description: String,
    pub equation: String,
    pub max_equation: Option<MaxEquation>,
    pub data_type: DataType,
    pub semantic_type: String,
    pub units: String,
    pub availability: Option<String>,
    pub mdapi_group: String,
    /// Name of the generated read function.
    pub read_sym: String,
    /// Name of the max function (or the shared/undefined fallback).
    pub max_sym: String,
    pub(crate) read_hash: String,
    pub(crate) max_hash: Option<String>,
}

impl Counter {
    pub(crate) fn new(chipset: &str, set_underscore: &str, desc: CounterDesc) -> Self {
        let underscore_name = desc
            .underscore_name
            .unwrap_or_else(|| underscore_name(&desc.symbol_name));
        let max_equation = desc.max_equation.as_deref().map(MaxEquation::parse);

        let read_sym = format!("{chipset}__{set_underscore}__{underscore_name}__read");
        let max_sym = match &max_equation {
            None => UNDEFINED_MAX_SYM.to_string(),
            Some(MaxEquation::Percentage) => {
                format!("percentage_max_callback_{}", desc.data_type)
            }
            Some(MaxEquation::Equation(_)) => {
                format!("{chipset}__{set_underscore}__{underscore_name}__max")
            }
        };

        Self {
            symbol_name: desc.symbol_name,
            underscore_name,
            name: desc.name,
            description: desc.description,
            equation: desc.equation,
            max_equation,
            data_type: desc.data_type,
            semantic_type: desc.semantic_type,
            units: desc.units,
            availability: desc.availability,
            mdapi_group: desc.mdapi_group,
            read_sym,
            max_sym,
            read_hash: String::new(),
            max_hash: None,
        }
    }

    /// Token other equations use to reference this counter.
    #[must_use]
    pub fn var(&self) -> String {
        format!("${}", self.symbol_name)
    }

    /// Read equation with counter references replaced by their own hashes.
    #[must_use]
    pub fn read_hash(&self) -> &str {
        &self.read_hash
    }

    /// Canonical max equation; `None` without a max equation or for percentages.
    #[must_use]
    pub fn max_hash(&self) -> Option<&str> {
        self.max_hash.as_deref()
    }

    /// Max equation text when it needs a generated function.
    #[must_use]
    pub fn max_equation_text(&self) -> Option<&str> {
        match &self.max_equation {
            Some(MaxEquation::Equation(eq)) => Some(eq),
            _ => None,
        }
    }
}

/// Derive a snake_case identifier from a CamelCase symbol name.
#[must_use]
pub fn underscore_name(symbol: &str) -> String {
    let mut out = String::with_capacity(symbol.len() + 4);
    let mut prev: Option<char> = None;
    for c in symbol.chars() {
        if c.is_ascii_uppercase()
            && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
        {
            out.push('_');
        }
        out.push(c.to_ascii_lowercase());
        prev = Some(c);
    }
    out
}
