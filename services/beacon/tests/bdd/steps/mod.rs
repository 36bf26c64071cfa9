//! BDD step definitions for beacon

pub mod destination_steps;
pub mod schema_steps;
