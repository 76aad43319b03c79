use super::{Definition, DefinitionKind};
use crate::language::{errors::ResolveResult, types::Type};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, trace};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub name: String,
    pub args: Vec<Type>,
    pub kind: DefinitionKind,
}

impl CacheKey {
    pub fn new(name: impl Into<String>, args: &[Type], kind: DefinitionKind) -> Self {
        Self {
            name: name.into(),
            args: args.to_vec(),
            kind,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Default)]
struct CacheState {
    generation: u64,
    entries: HashMap<CacheKey, Arc<Definition>>,
    hits: u64,
    misses: u64,
}

#[derive(Default)]
pub struct DefinitionCache {
    state: Mutex<CacheState>,
}

impl DefinitionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached definition for `key`, or runs `build` and stores
    /// its result. The lock is held across `build`, so concurrent queries for
    /// the same key never build twice.
    pub fn get_or_build<F>(
        &self,
        key: CacheKey,
        generation: u64,
        build: F,
    ) -> ResolveResult<Arc<Definition>>
    where
        F: FnOnce() -> ResolveResult<Definition>,
    {
        let mut state = self.state.lock();
        if state.generation != generation {
            if !state.entries.is_empty() {
                debug!(
                    stale = state.entries.len(),
                    from = state.generation,
                    to = generation,
                    "dropping stale definitions"
                );
            }
            state.entries.clear();
            state.generation = generation;
        }
        if let Some(definition) = state.entries.get(&key) {
            let definition = Arc::clone(definition);
            state.hits += 1;
            trace!(type_name = %key.name, kind = %key.kind, "definition cache hit");
            return Ok(definition);
        }
        state.misses += 1;
        let definition = Arc::new(build()?);
        state.entries.insert(key, Arc::clone(&definition));
        Ok(definition)
    }

    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            entries: state.entries.len(),
            hits: state.hits,
            misses: state.misses,
        }
    }
}
