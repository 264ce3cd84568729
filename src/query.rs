//! Query façade: groups and filters record collections by field names given
//! at run time.
//!
//! Evaluators are resolved through the engine's [`EvaluatorCache`], so a
//! specification is only turned into an evaluator the first time it is seen.
//! Specification errors are reported before any record is examined.

pub mod config;

pub use config::{QueryConfig, DEFAULT_PARALLEL_THRESHOLD};

use crate::error::QueryResult;
use crate::evaluator::{
    build_filter_predicate, build_group_key_selector, CacheKey, CompositeKey, EvaluatorCache,
    FilterPredicate, FilterSpec, GroupKeySelector,
};
use crate::record::Record;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

/// Records sharing one composite key
#[derive(Debug, Clone, PartialEq)]
pub struct Group<'a, R> {
    pub key: CompositeKey,
    /// Members in their original relative order
    pub members: Vec<&'a R>,
}

impl<'a, R> Group<'a, R> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Entry point for late-bound grouping and filtering.
///
/// Cloning an engine is cheap; clones share the same cache.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    cache: Arc<EvaluatorCache>,
    config: QueryConfig,
}

impl QueryEngine {
    /// Create an engine with its own empty cache and the default configuration
    pub fn new() -> Self {
        Self::with_cache(Arc::new(EvaluatorCache::new()))
    }

    /// Create an engine backed by an existing cache
    pub fn with_cache(cache: Arc<EvaluatorCache>) -> Self {
        Self {
            cache,
            config: QueryConfig::default(),
        }
    }

    pub fn with_config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cache(&self) -> &Arc<EvaluatorCache> {
        &self.cache
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Get the cached selector for `fields`, building it on first use
    pub fn group_key_selector<R: Record, S: AsRef<str>>(
        &self,
        fields: &[S],
    ) -> QueryResult<Arc<GroupKeySelector<R>>> {
        self.cache.get_or_build(CacheKey::group_key::<R, S>(fields), || {
            build_group_key_selector(R::schema(), fields)
        })
    }

    /// Get the cached predicate for `spec`, building it on first use
    pub fn filter_predicate<R: Record>(
        &self,
        spec: &FilterSpec,
    ) -> QueryResult<Arc<FilterPredicate<R>>> {
        self.cache
            .get_or_build(CacheKey::filter::<R>(spec), || {
                build_filter_predicate(R::schema(), spec)
            })
    }

    /// Group `records` by the given fields.
    ///
    /// Groups appear in the order their key first occurs in `records`.
    pub fn group_by<'a, R: Record, S: AsRef<str>>(
        &self,
        records: &'a [R],
        fields: &[S],
    ) -> QueryResult<Vec<Group<'a, R>>> {
        let selector = self.group_key_selector::<R, S>(fields)?;
        Ok(self.apply_group_key(&selector, records))
    }

    /// Keep the records matching `spec`, preserving their relative order
    pub fn filter<'a, R: Record>(
        &self,
        records: &'a [R],
        spec: &FilterSpec,
    ) -> QueryResult<Vec<&'a R>> {
        let predicate = self.filter_predicate::<R>(spec)?;
        Ok(self.apply_filter(&predicate, records))
    }

    /// Filter `records` by `spec`, then group the survivors by `fields`.
    ///
    /// Both evaluators are resolved before any record is examined.
    pub fn filter_then_group<'a, R: Record, S: AsRef<str>>(
        &self,
        records: &'a [R],
        spec: &FilterSpec,
        fields: &[S],
    ) -> QueryResult<Vec<Group<'a, R>>> {
        let predicate = self.filter_predicate::<R>(spec)?;
        let selector = self.group_key_selector::<R, S>(fields)?;

        let filtered = self.apply_filter(&predicate, records);
        Ok(self.group_slice(&selector, &filtered, |chunk| {
            collect_groups(&selector, chunk.iter().copied())
        }))
    }

    /// Apply an already built predicate
    pub fn apply_filter<'a, R: Record>(
        &self,
        predicate: &FilterPredicate<R>,
        records: &'a [R],
    ) -> Vec<&'a R> {
        let partitions = self.config.partitions_for(records.len());
        if partitions <= 1 {
            return records
                .iter()
                .filter(|record| predicate.evaluate(record))
                .collect();
        }

        log::debug!(
            "filtering {} records across {} partitions",
            records.len(),
            partitions
        );
        // rayon collects in input order
        records
            .par_iter()
            .with_min_len(records.len().div_ceil(partitions))
            .filter(|record| predicate.evaluate(record))
            .collect()
    }

    /// Apply an already built group-key selector
    pub fn apply_group_key<'a, R: Record>(
        &self,
        selector: &GroupKeySelector<R>,
        records: &'a [R],
    ) -> Vec<Group<'a, R>> {
        self.group_slice(selector, records, |chunk| collect_groups(selector, chunk))
    }

    /// Group `items` sequentially, or per contiguous chunk on the rayon pool
    /// followed by an order-preserving merge.
    fn group_slice<'s, 'a, T, R, F>(
        &self,
        selector: &GroupKeySelector<R>,
        items: &'s [T],
        group_chunk: F,
    ) -> Vec<Group<'a, R>>
    where
        T: Sync,
        R: Record,
        F: Fn(&'s [T]) -> Vec<Group<'a, R>> + Sync,
    {
        let partitions = self.config.partitions_for(items.len());
        if partitions <= 1 {
            return group_chunk(items);
        }

        log::debug!(
            "grouping {} records by ({}) across {} partitions",
            items.len(),
            selector.field_names().join(", "),
            partitions
        );
        let chunk_len = items.len().div_ceil(partitions);
        let parts = items
            .par_chunks(chunk_len)
            .map(&group_chunk)
            .collect::<Vec<_>>();
        merge_groups(parts)
    }
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_groups<'a, R: Record>(
    selector: &GroupKeySelector<R>,
    records: impl IntoIterator<Item = &'a R>,
) -> Vec<Group<'a, R>> {
    let mut index: HashMap<CompositeKey, usize> = HashMap::new();
    let mut groups: Vec<Group<'a, R>> = Vec::new();

    for record in records {
        let key = selector.select(record);
        match index.get(&key) {
            Some(&i) => groups[i].members.push(record),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(Group {
                    key,
                    members: vec![record],
                });
            }
        }
    }

    groups
}

/// Merge per-partition groups, keeping first-occurrence order across partitions
fn merge_groups<'a, R>(parts: Vec<Vec<Group<'a, R>>>) -> Vec<Group<'a, R>> {
    let mut parts = parts.into_iter();
    let mut merged = match parts.next() {
        Some(first) => first,
        None => return Vec::new(),
    };

    let mut index: HashMap<CompositeKey, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, group)| (group.key.clone(), i))
        .collect();

    for part in parts {
        for group in part {
            match index.get(&group.key) {
                Some(&i) => merged[i].members.extend(group.members),
                None => {
                    index.insert(group.key.clone(), merged.len());
                    merged.push(group);
                }
            }
        }
    }

    merged
}
