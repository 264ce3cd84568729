//! Filter predicates built from field-name to candidate-value maps.
//!
//! A built predicate accepts a record iff, for every field in the spec, the
//! record's value equals at least one of that field's candidates. A field
//! with no candidates therefore rejects every record, and an empty spec
//! accepts every record.

use crate::error::{QueryError, QueryResult};
use crate::record::{Field, RecordSchema, Value};
use std::fmt;

/// Ordered mapping from field name to the values that field may take
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterSpec {
    entries: Vec<(String, Vec<Value>)>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an allow-list for `name`, builder style
    pub fn field<I, V>(mut self, name: impl Into<String>, candidates: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.insert(name, candidates);
        self
    }

    /// Set the allow-list for `name`.
    ///
    /// Setting a field that is already present replaces its candidates and
    /// keeps its position.
    pub fn insert<I, V>(&mut self, name: impl Into<String>, candidates: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let name = name.into();
        let candidates: Vec<Value> = candidates.into_iter().map(Into::into).collect();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = candidates,
            None => self.entries.push((name, candidates)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[Value]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, I, V> FromIterator<(K, I)> for FilterSpec
where
    K: Into<String>,
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        let mut spec = FilterSpec::new();
        for (name, candidates) in iter {
            spec.insert(name, candidates);
        }
        spec
    }
}

struct FieldClause<R> {
    field: Field<R>,
    candidates: Vec<Value>,
}

impl<R> FieldClause<R> {
    #[inline]
    fn matches(&self, record: &R) -> bool {
        let value = self.field.get(record);
        self.candidates.iter().any(|c| value == *c)
    }
}

/// Boolean predicate over records: AND across fields, OR within a field
pub struct FilterPredicate<R: 'static> {
    clauses: Vec<FieldClause<R>>,
}

impl<R: 'static> FilterPredicate<R> {
    /// Test a record against the predicate
    #[inline]
    pub fn evaluate(&self, record: &R) -> bool {
        self.clauses.iter().all(|clause| clause.matches(record))
    }

    /// True when no field was constrained; every record passes
    pub fn is_identity(&self) -> bool {
        self.clauses.is_empty()
    }

    /// True when some field has no candidates; no record passes
    pub fn is_unsatisfiable(&self) -> bool {
        self.clauses.iter().any(|c| c.candidates.is_empty())
    }
}

impl<R: 'static> fmt::Debug for FilterPredicate<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for clause in &self.clauses {
            list.entry(&(clause.field.name(), &clause.candidates));
        }
        list.finish()
    }
}

/// Build a predicate for `spec`, coercing every candidate to its field's type.
pub fn build_filter_predicate<R: 'static>(
    schema: &RecordSchema<R>,
    spec: &FilterSpec,
) -> QueryResult<FilterPredicate<R>> {
    let mut clauses = Vec::with_capacity(spec.len());

    for (name, candidates) in spec.iter() {
        let field = *schema.resolve(name)?;
        let target = field.data_type();

        let candidates = candidates
            .iter()
            .map(|value| {
                value.coerce(target).ok_or_else(|| QueryError::Coercion {
                    field: name.to_string(),
                    value: value.clone(),
                    target,
                })
            })
            .collect::<QueryResult<Vec<_>>>()?;

        clauses.push(FieldClause { field, candidates });
    }

    Ok(FilterPredicate { clauses })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::people::Person;
    use crate::record::{DataType, Record};

    fn sample() -> Vec<Person> {
        vec![
            Person::new("John", "USA", 20, 90, 10),
            Person::new("Emma", "USA", 30, 85, 20),
            Person::new("Luis", "Mexico", 20, 95, 5),
        ]
    }

    fn apply<'a>(predicate: &FilterPredicate<Person>, people: &'a [Person]) -> Vec<&'a Person> {
        people.iter().filter(|p| predicate.evaluate(p)).collect()
    }

    #[test]
    fn test_single_field_filter() -> QueryResult<()> {
        let people = sample();
        let spec = FilterSpec::new().field("Country", ["USA"]);
        let predicate = build_filter_predicate(Person::schema(), &spec)?;
        let result = apply(&predicate, &people);
        assert_eq!(result, vec![&people[0], &people[1]]);
        Ok(())
    }

    #[test]
    fn test_and_across_fields_or_within() -> QueryResult<()> {
        let people = sample();
        let spec = FilterSpec::new()
            .field("Country", ["USA", "Mexico"])
            .field("Age", [20, 25]);
        let predicate = build_filter_predicate(Person::schema(), &spec)?;
        let result = apply(&predicate, &people);
        assert_eq!(result, vec![&people[0], &people[2]]);
        Ok(())
    }

    #[test]
    fn test_empty_spec_accepts_everything() -> QueryResult<()> {
        let people = sample();
        let predicate = build_filter_predicate(Person::schema(), &FilterSpec::new())?;
        assert!(predicate.is_identity());
        assert_eq!(apply(&predicate, &people).len(), people.len());
        Ok(())
    }

    #[test]
    fn test_empty_candidates_reject_everything() -> QueryResult<()> {
        let people = sample();
        let spec = FilterSpec::new()
            .field("Country", ["USA"])
            .field("Age", Vec::<i32>::new());
        let predicate = build_filter_predicate(Person::schema(), &spec)?;
        assert!(predicate.is_unsatisfiable());
        assert!(apply(&predicate, &people).is_empty());
        Ok(())
    }

    #[test]
    fn test_candidates_are_coerced() -> QueryResult<()> {
        let people = sample();
        let spec = FilterSpec::new().field("Age", ["30"]);
        let predicate = build_filter_predicate(Person::schema(), &spec)?;
        assert_eq!(apply(&predicate, &people), vec![&people[1]]);
        Ok(())
    }

    #[test]
    fn test_coercion_error() {
        let spec = FilterSpec::new().field("Age", ["twenty"]);
        let err = build_filter_predicate(Person::schema(), &spec).unwrap_err();
        assert_eq!(
            err,
            QueryError::Coercion {
                field: "Age".to_string(),
                value: Value::from("twenty"),
                target: DataType::Int32,
            }
        );
    }

    #[test]
    fn test_unknown_field() {
        let spec = FilterSpec::new().field("Planet", ["Mars"]);
        let err = build_filter_predicate(Person::schema(), &spec).unwrap_err();
        assert!(matches!(err, QueryError::FieldNotFound { ref field, .. } if field == "Planet"));
    }

    #[test]
    fn test_spec_insert_replaces_in_place() {
        let mut spec = FilterSpec::new()
            .field("Country", ["USA"])
            .field("Age", [20]);
        spec.insert("Country", ["Canada", "UK"]);

        assert_eq!(spec.len(), 2);
        assert_eq!(spec.field_names().collect::<Vec<_>>(), vec!["Country", "Age"]);
        assert_eq!(
            spec.get("Country"),
            Some(&[Value::from("Canada"), Value::from("UK")][..])
        );
    }

    #[test]
    fn test_spec_from_iterator() {
        let spec: FilterSpec = vec![("Country", vec!["USA"]), ("Name", vec!["Wei", "Anna"])]
            .into_iter()
            .collect();
        assert_eq!(spec.field_names().collect::<Vec<_>>(), vec!["Country", "Name"]);
        assert_eq!(spec.get("Name").map(|v| v.len()), Some(2));
    }
}
