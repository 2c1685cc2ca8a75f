//! SQLite-Implementierung der Repositories

mod konten;
mod pool;
mod tokens;

pub use pool::SqliteDb;
