//! Sample `Person` record type and a synthetic people generator.

use crate::record::{DataType, Field, Record, RecordSchema, ValueRef};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::OnceLock;

pub const NAMES: [&str; 15] = [
    "John", "Emma", "Luis", "Sofia", "Wei", "Aisha", "Igor", "Maria", "James", "Yuki", "Hassan",
    "Anna", "Carlos", "Nina", "Ahmed",
];

pub const COUNTRIES: [&str; 15] = [
    "USA",
    "UK",
    "Spain",
    "China",
    "Japan",
    "Brazil",
    "India",
    "Germany",
    "Canada",
    "Australia",
    "France",
    "Mexico",
    "Italy",
    "Russia",
    "Sweden",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub name: String,
    pub country: String,
    pub age: i32,
    /// Number of data points expected for this person
    pub expected: i32,
    /// Number of data points missing for this person
    pub missing: i32,
}

impl Person {
    pub fn new(
        name: impl Into<String>,
        country: impl Into<String>,
        age: i32,
        expected: i32,
        missing: i32,
    ) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            age,
            expected,
            missing,
        }
    }
}

fn name(p: &Person) -> ValueRef<'_> {
    ValueRef::String(&p.name)
}

fn country(p: &Person) -> ValueRef<'_> {
    ValueRef::String(&p.country)
}

fn age(p: &Person) -> ValueRef<'_> {
    ValueRef::Int32(p.age)
}

fn expected(p: &Person) -> ValueRef<'_> {
    ValueRef::Int32(p.expected)
}

fn missing(p: &Person) -> ValueRef<'_> {
    ValueRef::Int32(p.missing)
}

impl Record for Person {
    fn schema() -> &'static RecordSchema<Self> {
        static SCHEMA: OnceLock<RecordSchema<Person>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            RecordSchema::new(
                "Person",
                vec![
                    Field::new("Name", DataType::Varchar, name),
                    Field::new("Country", DataType::Varchar, country),
                    Field::new("Age", DataType::Int32, age),
                    Field::new("Expected", DataType::Int32, expected),
                    Field::new("Missing", DataType::Int32, missing),
                ],
            )
        })
    }
}

/// Generates random people drawn from fixed name and country pools
pub struct PeopleGenerator {
    rng: StdRng,
}

impl PeopleGenerator {
    /// Create a generator seeded from the operating system
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a generator that always produces the same sequence for `seed`
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_person(&mut self) -> Person {
        Person {
            name: NAMES[self.rng.gen_range(0..NAMES.len())].to_string(),
            country: COUNTRIES[self.rng.gen_range(0..COUNTRIES.len())].to_string(),
            age: self.rng.gen_range(18..80),
            expected: self.rng.gen_range(80..100),
            missing: self.rng.gen_range(0..100),
        }
    }

    pub fn generate(&mut self, count: usize) -> Vec<Person> {
        (0..count).map(|_| self.next_person()).collect()
    }
}

impl Default for PeopleGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Value;

    #[test]
    fn test_generated_people_within_ranges() {
        let people = PeopleGenerator::with_seed(7).generate(500);
        assert_eq!(people.len(), 500);
        for p in &people {
            assert!(NAMES.contains(&p.name.as_str()));
            assert!(COUNTRIES.contains(&p.country.as_str()));
            assert!((18..80).contains(&p.age));
            assert!((80..100).contains(&p.expected));
            assert!((0..100).contains(&p.missing));
        }
    }

    #[test]
    fn test_seeded_generation_is_repeatable() {
        let a = PeopleGenerator::with_seed(42).generate(50);
        let b = PeopleGenerator::with_seed(42).generate(50);
        assert_eq!(a, b);
    }

    #[test]
    fn test_person_schema_accessors() -> anyhow::Result<()> {
        let p = Person::new("Wei", "China", 33, 90, 12);
        let schema = Person::schema();
        assert_eq!(schema.resolve("Name")?.get(&p), Value::from("Wei"));
        assert_eq!(schema.resolve("Country")?.get(&p), Value::from("China"));
        assert_eq!(schema.resolve("Age")?.get(&p), Value::Int32(33));
        assert_eq!(schema.resolve("Expected")?.get(&p), Value::Int32(90));
        assert_eq!(schema.resolve("Missing")?.get(&p), Value::Int32(12));
        Ok(())
    }
}
