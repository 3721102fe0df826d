//! SeaORM entity definitions for PostgreSQL database.

pub mod comment;
pub mod incident;
pub mod incident_file;
pub mod user;
