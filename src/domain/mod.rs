//! Domain model: value objects and the stateful aggregates built on them.

pub mod aggregates;
pub mod value_objects;
