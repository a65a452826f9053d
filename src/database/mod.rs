//! Módulo de base de datos
//!
//! Maneja la conexión y el schema de PostgreSQL

pub mod connection;
pub mod migrations;

pub use connection::DatabaseConnection;
pub use migrations::run_migrations;
