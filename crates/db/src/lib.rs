//! bouncer-db – Datenbank-Abstraktion
//!
//! Dieses Crate stellt das Repository-Pattern bereit, das die
//! SQLite-Persistenz hinter schmalen Traits verbirgt. bouncer-auth
//! kennt nur die Traits; Tests arbeiten gegen In-Memory-SQLite oder
//! eigene Fakes.

pub mod error;
pub mod models;
pub mod repository;
pub mod sqlite;

// Bequeme Re-Exporte
pub use error::{DbError, DbResult};
pub use repository::{ActionTokenRepository, DatabaseConfig, KontoRepository};
pub use sqlite::SqliteDb;
