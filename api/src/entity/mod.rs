//! SeaORM entities
//!
//! Table models used by the PostgreSQL adapters. Domain code never sees
//! these; adapters convert them into `crate::domain::entities`.

pub mod groups;
pub mod matches;
pub mod players;

