//! PostgreSQL adapters
//!
//! Implementations of repository traits using SeaORM and PostgreSQL.

pub mod group_repo;
pub mod match_repo;
pub mod player_repo;


pub use group_repo::PostgresGroupRepository;
pub use match_repo::PostgresMatchRepository;
pub use player_repo::PostgresPlayerRepository;
