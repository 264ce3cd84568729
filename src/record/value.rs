use std::fmt;

/// Data types a record field can declare
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Boolean = 1,
    Int32 = 2,
    Varchar = 4,
}

impl DataType {
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Boolean => "Boolean",
            DataType::Int32 => "Int32",
            DataType::Varchar => "Varchar",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Owned field value, used for composite keys and filter candidates
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Null,
    Boolean(bool),
    Int32(i32),
    String(String),
}

impl Value {
    /// Get the data type of this value
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Int32(_) => Some(DataType::Int32),
            Value::String(_) => Some(DataType::Varchar),
        }
    }

    /// Check if this value is compatible with the given data type
    pub fn is_compatible_with(&self, data_type: DataType) -> bool {
        match (self, data_type) {
            (Value::Null, _) => true, // NULL is compatible with any type
            (Value::Boolean(_), DataType::Boolean) => true,
            (Value::Int32(_), DataType::Int32) => true,
            (Value::String(_), DataType::Varchar) => true,
            _ => false,
        }
    }

    /// Borrow this value as a `ValueRef`
    pub fn as_value_ref(&self) -> ValueRef<'_> {
        match self {
            Value::Null => ValueRef::Null,
            Value::Boolean(b) => ValueRef::Boolean(*b),
            Value::Int32(i) => ValueRef::Int32(*i),
            Value::String(s) => ValueRef::String(s),
        }
    }

    /// Convert this value to `target`, returning `None` when no conversion exists.
    ///
    /// NULL converts to NULL for every type. Strings are parsed (`" 42 "` becomes
    /// `Int32(42)`, `"TRUE"` becomes `Boolean(true)`); integers convert to booleans
    /// by comparing against zero and booleans to integers as 1/0.
    ///
    /// NULL is accepted for numeric and boolean targets too, even where the
    /// record field itself can never hold NULL, so such a candidate matches nothing.
    pub fn coerce(&self, target: DataType) -> Option<Value> {
        if self.is_compatible_with(target) {
            return Some(self.clone());
        }

        match (self, target) {
            (Value::Int32(i), DataType::Varchar) => Some(Value::String(i.to_string())),
            (Value::Boolean(b), DataType::Varchar) => {
                Some(Value::String(if *b { "True" } else { "False" }.to_string()))
            }
            (Value::String(s), DataType::Int32) => s.trim().parse().ok().map(Value::Int32),
            (Value::String(s), DataType::Boolean) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("true") {
                    Some(Value::Boolean(true))
                } else if s.eq_ignore_ascii_case("false") {
                    Some(Value::Boolean(false))
                } else {
                    None
                }
            }
            (Value::Int32(i), DataType::Boolean) => Some(Value::Boolean(*i != 0)),
            (Value::Boolean(b), DataType::Int32) => Some(Value::Int32(i32::from(*b))),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_value_ref().fmt(f)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int32(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Borrowed field value as produced by a field accessor.
///
/// Accessors hand out `ValueRef`s so that filtering compares against string
/// fields without cloning them; grouping converts to `Value` with `to_value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueRef<'a> {
    Null,
    Boolean(bool),
    Int32(i32),
    String(&'a str),
}

impl ValueRef<'_> {
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            ValueRef::Null => None,
            ValueRef::Boolean(_) => Some(DataType::Boolean),
            ValueRef::Int32(_) => Some(DataType::Int32),
            ValueRef::String(_) => Some(DataType::Varchar),
        }
    }

    pub fn to_value(&self) -> Value {
        match *self {
            ValueRef::Null => Value::Null,
            ValueRef::Boolean(b) => Value::Boolean(b),
            ValueRef::Int32(i) => Value::Int32(i),
            ValueRef::String(s) => Value::String(s.to_string()),
        }
    }
}

impl PartialEq<Value> for ValueRef<'_> {
    fn eq(&self, other: &Value) -> bool {
        *self == other.as_value_ref()
    }
}

impl<'a> From<&'a str> for ValueRef<'a> {
    fn from(value: &'a str) -> Self {
        ValueRef::String(value)
    }
}

impl From<i32> for ValueRef<'_> {
    fn from(value: i32) -> Self {
        ValueRef::Int32(value)
    }
}

impl From<bool> for ValueRef<'_> {
    fn from(value: bool) -> Self {
        ValueRef::Boolean(value)
    }
}

impl fmt::Display for ValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueRef::Null => f.write_str("NULL"),
            ValueRef::Boolean(b) => write!(f, "{}", b),
            ValueRef::Int32(i) => write!(f, "{}", i),
            ValueRef::String(s) => f.write_str(s),
        }
    }
}
