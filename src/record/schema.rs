//! Record type descriptors and field resolution.

use crate::error::{QueryError, QueryResult};
use crate::record::{DataType, ValueRef};
use std::any::TypeId;
use std::fmt;

/// Reads one field out of a record.
pub type Accessor<R> = for<'a> fn(&'a R) -> ValueRef<'a>;

/// A named, typed field of a record type
pub struct Field<R> {
    name: &'static str,
    data_type: DataType,
    accessor: Accessor<R>,
}

impl<R> Field<R> {
    pub fn new(name: &'static str, data_type: DataType, accessor: Accessor<R>) -> Self {
        Self {
            name,
            data_type,
            accessor,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type every value produced by this field's accessor has (or NULL)
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn accessor(&self) -> Accessor<R> {
        self.accessor
    }

    /// Read this field from `record`
    #[inline]
    pub fn get<'a>(&self, record: &'a R) -> ValueRef<'a> {
        (self.accessor)(record)
    }
}

impl<R> Clone for Field<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Field<R> {}

impl<R> fmt::Debug for Field<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("data_type", &self.data_type)
            .finish()
    }
}

/// Describes the shape of a record type: its identity and its fields.
///
/// A schema is built once per record type and handed out as a `'static`
/// reference by [`Record::schema`].
pub struct RecordSchema<R: 'static> {
    name: &'static str,
    type_id: TypeId,
    fields: Vec<Field<R>>,
}

impl<R: 'static> RecordSchema<R> {
    pub fn new(name: &'static str, fields: Vec<Field<R>>) -> Self {
        Self {
            name,
            type_id: TypeId::of::<R>(),
            fields,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn fields(&self) -> &[Field<R>] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Resolve a field by name.
    ///
    /// An exact match wins; otherwise the first field whose name matches
    /// ignoring ASCII case is returned.
    pub fn resolve(&self, name: &str) -> QueryResult<&Field<R>> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .or_else(|| self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name)))
            .ok_or_else(|| QueryError::FieldNotFound {
                record: self.name,
                field: name.to_string(),
            })
    }
}

impl<R: 'static> fmt::Debug for RecordSchema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSchema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish()
    }
}

/// A record type that can be grouped and filtered by field name
pub trait Record: Sized + Send + Sync + 'static {
    fn schema() -> &'static RecordSchema<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    struct Sensor {
        site: String,
        reading: i32,
        online: bool,
    }

    fn site(s: &Sensor) -> ValueRef<'_> {
        ValueRef::String(&s.site)
    }

    fn reading(s: &Sensor) -> ValueRef<'_> {
        ValueRef::Int32(s.reading)
    }

    fn online(s: &Sensor) -> ValueRef<'_> {
        ValueRef::Boolean(s.online)
    }

    impl Record for Sensor {
        fn schema() -> &'static RecordSchema<Self> {
            static SCHEMA: OnceLock<RecordSchema<Sensor>> = OnceLock::new();
            SCHEMA.get_or_init(|| {
                RecordSchema::new(
                    "Sensor",
                    vec![
                        Field::new("Site", DataType::Varchar, site),
                        Field::new("Reading", DataType::Int32, reading),
                        Field::new("Online", DataType::Boolean, online),
                    ],
                )
            })
        }
    }

    fn sensor() -> Sensor {
        Sensor {
            site: "north".to_string(),
            reading: 17,
            online: true,
        }
    }

    #[test]
    fn test_resolve_exact() -> QueryResult<()> {
        let field = Sensor::schema().resolve("Reading")?;
        assert_eq!(field.name(), "Reading");
        assert_eq!(field.data_type(), DataType::Int32);
        assert_eq!(field.get(&sensor()), ValueRef::Int32(17));
        Ok(())
    }

    #[test]
    fn test_resolve_ignores_case() -> QueryResult<()> {
        let field = Sensor::schema().resolve("site")?;
        assert_eq!(field.name(), "Site");
        assert_eq!(field.get(&sensor()), ValueRef::String("north"));
        Ok(())
    }

    #[test]
    fn test_resolve_unknown_field() {
        let err = Sensor::schema().resolve("Altitude").unwrap_err();
        assert_eq!(
            err,
            QueryError::FieldNotFound {
                record: "Sensor",
                field: "Altitude".to_string(),
            }
        );
    }

    #[test]
    fn test_schema_identity() {
        let schema = Sensor::schema();
        assert_eq!(schema.name(), "Sensor");
        assert_eq!(schema.type_id(), TypeId::of::<Sensor>());
        assert_eq!(
            schema.field_names().collect::<Vec<_>>(),
            vec!["Site", "Reading", "Online"]
        );
        assert!(std::ptr::eq(schema, Sensor::schema()));
    }
}
