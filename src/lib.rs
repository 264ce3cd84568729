//! Group and filter in-memory records by field names chosen at run time.
//!
//! A [`QueryEngine`] turns a field specification into an evaluator once,
//! caches it, and applies it to record slices:
//!
//! ```
//! use fieldquery::{FilterSpec, QueryEngine};
//! use fieldquery::people::Person;
//!
//! let people = vec![
//!     Person::new("John", "USA", 20, 90, 10),
//!     Person::new("Emma", "USA", 30, 85, 20),
//!     Person::new("Luis", "Mexico", 20, 95, 5),
//! ];
//!
//! let engine = QueryEngine::new();
//! let americans = engine.filter(&people, &FilterSpec::new().field("Country", ["USA"]))?;
//! assert_eq!(americans.len(), 2);
//!
//! let groups = engine.group_by(&people, &["Country"])?;
//! assert_eq!(groups.len(), 2);
//! # Ok::<(), fieldquery::QueryError>(())
//! ```

pub mod error;
pub mod evaluator;
pub mod people;
pub mod query;
pub mod record;

pub use error::{QueryError, QueryResult};
pub use evaluator::{CacheKey, CacheStats, CompositeKey, EvaluatorCache, FilterSpec};
pub use query::{Group, QueryConfig, QueryEngine};
pub use record::{DataType, Field, Record, RecordSchema, Value, ValueRef};
