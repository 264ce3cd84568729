//! Evaluator cache.
//!
//! Compiled evaluators are memoized by [`CacheKey`]. Entries are created on
//! first use and live as long as the cache; nothing is evicted.
//!
//! Every key owns a slot holding the evaluator once built and a build lock.
//! Concurrent misses on the same key queue on that slot's lock, so a builder
//! runs at most once per key and every caller receives the same `Arc`. The map
//! itself is only locked long enough to fetch or insert a slot, so builders may
//! use the cache for other keys. A failed build stores nothing.

use crate::error::QueryResult;
use crate::evaluator::FilterSpec;
use crate::record::{Record, Value};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Kind of evaluator a key refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvaluatorKind {
    GroupKey,
    Filter,
}

/// Identifies a compiled evaluator: record type, evaluator kind and the
/// caller's specification in the order it was given.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    record_type: TypeId,
    record_name: &'static str,
    kind: EvaluatorKind,
    fields: Vec<String>,
    /// Candidate values per field; empty for group keys
    candidates: Vec<Vec<Value>>,
}

impl CacheKey {
    pub fn group_key<R: Record, S: AsRef<str>>(fields: &[S]) -> Self {
        Self {
            record_type: TypeId::of::<R>(),
            record_name: R::schema().name(),
            kind: EvaluatorKind::GroupKey,
            fields: fields.iter().map(|f| f.as_ref().to_string()).collect(),
            candidates: Vec::new(),
        }
    }

    /// Filter keys carry the candidate values as well as the field names, so
    /// filters over the same fields with different allow-lists stay distinct.
    pub fn filter<R: Record>(spec: &FilterSpec) -> Self {
        let (fields, candidates) = spec
            .iter()
            .map(|(name, values)| (name.to_string(), values.to_vec()))
            .unzip();
        Self {
            record_type: TypeId::of::<R>(),
            record_name: R::schema().name(),
            kind: EvaluatorKind::Filter,
            fields,
            candidates,
        }
    }

    pub fn record_type(&self) -> TypeId {
        self.record_type
    }

    pub fn kind(&self) -> EvaluatorKind {
        self.kind
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EvaluatorKind::GroupKey => {
                write!(f, "{}/group[{}]", self.record_name, self.fields.join(","))
            }
            EvaluatorKind::Filter => {
                write!(f, "{}/filter[", self.record_name)?;
                for (i, (field, values)) in self.fields.iter().zip(&self.candidates).enumerate() {
                    if i > 0 {
                        f.write_str(";")?;
                    }
                    let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                    write!(f, "{}={}", field, values.join("|"))?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that had to run a builder
    pub misses: u64,
    /// Builders that succeeded and were stored
    pub builds: u64,
    pub entries: usize,
}

type SlotKey = (TypeId, CacheKey);
type Evaluator = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
struct Slot {
    evaluator: OnceLock<Evaluator>,
    building: Mutex<()>,
}

/// Thread-safe memo of compiled evaluators
pub struct EvaluatorCache {
    entries: DashMap<SlotKey, Arc<Slot>>,
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
}

impl EvaluatorCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            builds: AtomicU64::new(0),
        }
    }

    /// Return the evaluator stored under `key`, running `build` to create it
    /// on the first request.
    ///
    /// `build` is never called on a hit and at most once per key overall.
    /// Errors from `build` are returned as-is and nothing is stored. `build`
    /// may request other keys from this cache but must not request `key`
    /// itself.
    pub fn get_or_build<E, F>(&self, key: CacheKey, build: F) -> QueryResult<Arc<E>>
    where
        E: Send + Sync + 'static,
        F: FnOnce() -> QueryResult<E>,
    {
        let slot_key = (TypeId::of::<E>(), key);

        let existing = self.entries.get(&slot_key).map(|slot| slot.value().clone());
        let slot = match existing {
            Some(slot) => slot,
            None => self
                .entries
                .entry(slot_key.clone())
                .or_default()
                .value()
                .clone(),
        };

        if let Some(evaluator) = slot.evaluator.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            log::trace!("evaluator cache hit: {}", slot_key.1);
            return Ok(downcast(evaluator.clone()));
        }

        let _building = slot.building.lock();
        // Built by another caller while we waited for the slot
        if let Some(evaluator) = slot.evaluator.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(downcast(evaluator.clone()));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        log::debug!("building evaluator: {}", slot_key.1);
        match build() {
            Ok(evaluator) => {
                let evaluator: Evaluator = Arc::new(evaluator);
                let evaluator = slot.evaluator.get_or_init(|| evaluator).clone();
                self.builds.fetch_add(1, Ordering::Relaxed);
                Ok(downcast(evaluator))
            }
            Err(e) => {
                self.entries.remove_if(&slot_key, |_, stored| {
                    Arc::ptr_eq(stored, &slot) && stored.evaluator.get().is_none()
                });
                Err(e)
            }
        }
    }

    /// Check whether an evaluator of type `E` is stored under `key`
    pub fn contains<E: Send + Sync + 'static>(&self, key: &CacheKey) -> bool {
        self.entries
            .get(&(TypeId::of::<E>(), key.clone()))
            .is_some_and(|slot| slot.evaluator.get().is_some())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

impl Default for EvaluatorCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EvaluatorCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluatorCache")
            .field("stats", &self.stats())
            .finish()
    }
}

fn downcast<E: Send + Sync + 'static>(evaluator: Evaluator) -> Arc<E> {
    match evaluator.downcast::<E>() {
        Ok(evaluator) => evaluator,
        Err(_) => unreachable!("cache slots are keyed by evaluator type"),
    }
}
