//! Chipset generations.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::set::MetricSet;
use crate::xml::parse_sets;
use crate::{ModelError, Result};

/// All metric sets of one chipset, loaded from a single XML document.
#[derive(Clone, Debug)]
pub struct Generation {
    /// Lower-cased chipset of the first set, e.g. `"tglgt1"`.
    pub chipset: String,
    /// Document the generation was loaded from.
    pub source: PathBuf,
    sets: Vec<MetricSet>,
}

impl Generation {
    /// Load a generation from an XML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the model cannot be built.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Build a generation from XML text.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed XML, missing attributes or unresolvable
    /// equations.
    pub fn parse(text: &str, source: impl Into<PathBuf>) -> Result<Self> {
        let source = source.into();
        let source_name = source.display().to_string();
        let descs = parse_sets(text, &source_name)?;

        let Some(first) = descs.first() else {
            return Err(ModelError::NoSets { source_name });
        };
        let chipset = first.chipset.to_lowercase();

        let mut sets = Vec::with_capacity(descs.len());
        for desc in descs {
            if !desc.chipset.eq_ignore_ascii_case(&chipset) {
                warn!(
                    source = %source_name,
                    line = desc.line,
                    set = %desc.name,
                    set_chipset = %desc.chipset,
                    chipset = %chipset,
                    "set declares a different chipset"
                );
            }
            let set = MetricSet::new(&chipset, desc)?;
            debug!(chipset = %chipset, set = %set.name, counters = set.len(), "built metric set");
            sets.push(set);
        }

        debug!(source = %source_name, chipset = %chipset, sets = sets.len(), "loaded generation");
        Ok(Self {
            chipset,
            source,
            sets,
        })
    }

    /// Metric sets in document order.
    #[must_use]
    pub fn sets(&self) -> &[MetricSet] {
        &self.sets
    }

    /// Total number of counters across all sets.
    #[must_use]
    pub fn counter_count(&self) -> usize {
        self.sets.iter().map(MetricSet::len).sum()
    }
}
