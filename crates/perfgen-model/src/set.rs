//! Metric sets.

use rustc_hash::FxHashMap;

use crate::counter::Counter;
use crate::hash::HashResolver;
use crate::xml::SetDesc;
use crate::{ModelError, Result};

/// A named group of counters sharing a hardware config and accumulator layout.
#[derive(Clone, Debug)]
pub struct MetricSet {
    /// Chipset of the owning generation (lower case).
    pub chipset: String,
    pub name: String,
    pub symbol_name: String,
    pub underscore_name: String,
    pub hw_config_guid: String,
    counters: Vec<Counter>,
    /// `$SymbolName` -> index into `counters`.
    counter_vars: FxHashMap<String, usize>,
}

impl MetricSet {
    /// Build a set and resolve the hashes of all its counters.
    ///
    /// # Errors
    ///
    /// Fails on duplicate counter symbols, unresolvable `$` references and
    /// circular references between counters.
    pub fn new(chipset: &str, desc: SetDesc) -> Result<Self> {
        let mut counters = Vec::with_capacity(desc.counters.len());
        let mut counter_vars = FxHashMap::default();

        for counter_desc in desc.counters {
            let counter = Counter::new(chipset, &desc.underscore_name, counter_desc);
            if counter_vars.insert(counter.var(), counters.len()).is_some() {
                return Err(ModelError::DuplicateCounter {
                    set: desc.name,
                    symbol: counter.symbol_name,
                });
            }
            counters.push(counter);
        }

        let mut hashes = Vec::with_capacity(counters.len());
        {
            let mut resolver = HashResolver::new(&desc.name, &counters, &counter_vars);
            for idx in 0..counters.len() {
                hashes.push((resolver.read_hash(idx)?, resolver.max_hash(idx)?));
            }
        }
        for (counter, (read_hash, max_hash)) in counters.iter_mut().zip(hashes) {
            counter.read_hash = read_hash;
            counter.max_hash = max_hash;
        }

        Ok(Self {
            chipset: chipset.to_string(),
            name: desc.name,
            symbol_name: desc.symbol_name,
            underscore_name: desc.underscore_name,
            hw_config_guid: desc.hw_config_guid,
            counters,
            counter_vars,
        })
    }

    /// Counters in document order.
    #[must_use]
    pub fn counters(&self) -> &[Counter] {
        &self.counters
    }

    /// Resolve a `$SymbolName` token to a counter of this set.
    #[must_use]
    pub fn counter_by_var(&self, var: &str) -> Option<&Counter> {
        self.counter_vars.get(var).map(|&idx| &self.counters[idx])
    }

    /// Counters ordered by symbol name (byte-wise, case-sensitive).
    #[must_use]
    pub fn sorted_counters(&self) -> Vec<&Counter> {
        let mut sorted: Vec<&Counter> = self.counters.iter().collect();
        sorted.sort_by(|a, b| a.symbol_name.cmp(&b.symbol_name));
        sorted
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}
