//! Canonical equation hashes.
//!
//! A hash is the equation with every counter reference replaced by the
//! referenced counter's own read hash, so two counters computing the same
//! quantity under different names end up with equal hashes.

use rustc_hash::FxHashMap;

use crate::counter::Counter;
use crate::hw_vars;
use crate::{ModelError, Result};

enum HashState {
    Pending,
    InProgress,
    Done(String),
}

/// Resolves read hashes on demand, memoizing each exactly once.
pub(crate) struct HashResolver<'a> {
    set_name: &'a str,
    counters: &'a [Counter],
    vars: &'a FxHashMap<String, usize>,
    states: Vec<HashState>,
    /// Counters whose read hash is being computed, outermost first.
    stack: Vec<usize>,
}

impl<'a> HashResolver<'a> {
    pub(crate) fn new(
        set_name: &'a str,
        counters: &'a [Counter],
        vars: &'a FxHashMap<String, usize>,
    ) -> Self {
        Self {
            set_name,
            counters,
            vars,
            states: counters.iter().map(|_| HashState::Pending).collect(),
            stack: Vec::new(),
        }
    }

    pub(crate) fn read_hash(&mut self, idx: usize) -> Result<String> {
        match &self.states[idx] {
            HashState::Done(hash) => return Ok(hash.clone()),
            HashState::InProgress => return Err(self.cycle_error(idx)),
            HashState::Pending => {}
        }

        self.states[idx] = HashState::InProgress;
        self.stack.push(idx);
        let counters = self.counters;
        let hash = self.canonicalize(idx, &counters[idx].equation)?;
        self.stack.pop();
        self.states[idx] = HashState::Done(hash.clone());
        Ok(hash)
    }

    pub(crate) fn max_hash(&mut self, idx: usize) -> Result<Option<String>> {
        let counters = self.counters;
        counters[idx]
            .max_equation_text()
            .map(|eq| self.canonicalize(idx, eq))
            .transpose()
    }

    fn canonicalize(&mut self, idx: usize, equation: &str) -> Result<String> {
        let mut tokens = Vec::new();
        for token in equation.split_whitespace() {
            if !token.starts_with('$') || hw_vars::lookup(token).is_some() {
                tokens.push(token.to_string());
            } else if let Some(&referenced) = self.vars.get(token) {
                tokens.push(self.read_hash(referenced)?);
            } else {
                return Err(ModelError::UnresolvedReference {
                    set: self.set_name.to_string(),
                    counter: self.counters[idx].name.clone(),
                    variable: token.to_string(),
                    equation: equation.to_string(),
                });
            }
        }
        Ok(tokens.join(" "))
    }

    fn cycle_error(&self, idx: usize) -> ModelError {
        let start = self.stack.iter().position(|&i| i == idx).unwrap_or(0);
        let chain = self.stack[start..]
            .iter()
            .chain(std::iter::once(&idx))
            .map(|&i| self.counters[i].symbol_name.clone())
            .collect();
        ModelError::CircularReference {
            set: self.set_name.to_string(),
            chain,
        }
    }
}
