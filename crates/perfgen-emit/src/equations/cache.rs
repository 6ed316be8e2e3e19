//! Emitted-function memo table.

use perfgen_model::DataType;
use rustc_hash::FxHashMap;

/// Maps `(data type, equation hash)` to the symbol of the function already
/// emitted for it.
///
/// Hashes alone are not enough: the same equation returning `uint64_t` and
/// `double` needs two functions. Each emission pass owns a fresh cache.
#[derive(Debug, Default)]
pub struct FuncCache {
    funcs: FxHashMap<DataType, FxHashMap<String, String>>,
}

impl FuncCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lookup(&self, data_type: DataType, hash: &str) -> Option<&str> {
        self.funcs
            .get(&data_type)
            .and_then(|by_hash| by_hash.get(hash))
            .map(String::as_str)
    }

    /// Record `sym` as the function for `hash`. An existing entry is kept.
    pub fn record(&mut self, data_type: DataType, hash: &str, sym: &str) {
        self.funcs
            .entry(data_type)
            .or_default()
            .entry(hash.to_string())
            .or_insert_with(|| sym.to_string());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.funcs.values().map(FxHashMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
