//! Composite group-key selectors built from a list of field names.

use crate::error::{QueryError, QueryResult};
use crate::record::{Field, RecordSchema, Value};
use std::fmt;

/// Ordered field values identifying a group.
///
/// Two records belong to the same group iff every position of their keys is
/// equal. The key holds any number of values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey(Vec<Value>);

impl CompositeKey {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn get(&self, position: usize) -> Option<&Value> {
        self.0.get(position)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.0
    }
}

impl From<Vec<Value>> for CompositeKey {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [single] = self.0.as_slice() {
            return write!(f, "{}", single);
        }
        f.write_str("(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str(")")
    }
}

/// Produces the composite key of a record from pre-resolved field accessors
pub struct GroupKeySelector<R: 'static> {
    fields: Vec<Field<R>>,
    names: Vec<String>,
}

impl<R: 'static> GroupKeySelector<R> {
    /// Compute the composite key of `record`
    pub fn select(&self, record: &R) -> CompositeKey {
        CompositeKey(self.fields.iter().map(|f| f.get(record).to_value()).collect())
    }

    /// Field names as requested by the caller, one per key position
    pub fn field_names(&self) -> &[String] {
        &self.names
    }

    pub fn fields(&self) -> &[Field<R>] {
        &self.fields
    }

    pub fn arity(&self) -> usize {
        self.fields.len()
    }
}

impl<R: 'static> fmt::Debug for GroupKeySelector<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupKeySelector")
            .field("fields", &self.names)
            .finish()
    }
}

/// Build a selector for the given ordered field names.
///
/// Fails with `EmptyFieldList` for an empty list and `FieldNotFound` for the
/// first name the schema does not know.
pub fn build_group_key_selector<R: 'static, S: AsRef<str>>(
    schema: &RecordSchema<R>,
    field_names: &[S],
) -> QueryResult<GroupKeySelector<R>> {
    if field_names.is_empty() {
        return Err(QueryError::EmptyFieldList);
    }

    let mut fields = Vec::with_capacity(field_names.len());
    let mut names = Vec::with_capacity(field_names.len());
    for name in field_names {
        let name = name.as_ref();
        fields.push(*schema.resolve(name)?);
        names.push(name.to_string());
    }

    Ok(GroupKeySelector { fields, names })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::people::Person;
    use crate::record::Record;

    #[test]
    fn test_select_single_field() -> QueryResult<()> {
        let selector = build_group_key_selector(Person::schema(), &["Country"])?;
        let key = selector.select(&Person::new("Emma", "USA", 20, 90, 5));
        assert_eq!(key, CompositeKey::new(vec![Value::from("USA")]));
        assert_eq!(key.to_string(), "USA");
        assert_eq!(selector.arity(), 1);
        Ok(())
    }

    #[test]
    fn test_select_preserves_field_order() -> QueryResult<()> {
        let person = Person::new("Emma", "USA", 20, 90, 5);
        let forward = build_group_key_selector(Person::schema(), &["Country", "Age"])?;
        let reverse = build_group_key_selector(Person::schema(), &["Age", "Country"])?;

        assert_eq!(
            forward.select(&person).values(),
            &[Value::from("USA"), Value::Int32(20)]
        );
        assert_eq!(
            reverse.select(&person).values(),
            &[Value::Int32(20), Value::from("USA")]
        );
        assert_eq!(forward.select(&person).to_string(), "(USA, 20)");
        assert_eq!(reverse.field_names(), &["Age", "Country"]);
        Ok(())
    }

    #[test]
    fn test_key_equality_is_positional() -> QueryResult<()> {
        let selector = build_group_key_selector(Person::schema(), &["Country", "Age"])?;
        let a = Person::new("Emma", "USA", 20, 90, 5);
        let b = Person::new("John", "USA", 20, 81, 40);
        let c = Person::new("Luis", "USA", 30, 90, 5);
        assert_eq!(selector.select(&a), selector.select(&b));
        assert_ne!(selector.select(&a), selector.select(&c));
        Ok(())
    }

    #[test]
    fn test_no_arity_limit() -> QueryResult<()> {
        let names: Vec<&str> = ["Name", "Country", "Age", "Expected", "Missing"]
            .iter()
            .copied()
            .cycle()
            .take(12)
            .collect();
        let selector = build_group_key_selector(Person::schema(), &names)?;
        let key = selector.select(&Person::new("Wei", "China", 40, 85, 3));
        assert_eq!(key.len(), 12);
        assert_eq!(key.get(8), Some(&Value::Int32(85)));
        assert_eq!(key.get(10), Some(&Value::from("Wei")));
        Ok(())
    }

    #[test]
    fn test_empty_field_list() {
        let names: [&str; 0] = [];
        let err = build_group_key_selector(Person::schema(), &names).unwrap_err();
        assert_eq!(err, QueryError::EmptyFieldList);
    }

    #[test]
    fn test_unknown_field() {
        let err = build_group_key_selector(Person::schema(), &["Country", "Height"]).unwrap_err();
        assert_eq!(
            err,
            QueryError::FieldNotFound {
                record: "Person",
                field: "Height".to_string(),
            }
        );
    }
}
