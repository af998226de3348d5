//! SQLite persistence: schema DDL, migrations, and the record store.

pub mod database;
pub mod schema;

pub use database::{Database, ImportRecord, NewDog};
