//! Record model: field values, record type descriptors and field resolution.

pub mod schema;
pub mod value;

pub use schema::{Accessor, Field, Record, RecordSchema};
pub use value::{DataType, Value, ValueRef};
