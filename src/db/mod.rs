//! Database module: item records and their SQLite storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and their JSON shape
//! - `schema.rs`: SQL DDL for initializing (and explicitly resetting) the table
//! - `sqlite.rs`: pooled storage handle

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{Item, ItemType, NewItem};
pub use schema::{SQLITE_INIT, SQLITE_RESET};
pub use sqlite::{ItemsStorage, SqlitePool};
