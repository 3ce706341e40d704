/// Store abstraction and its in-memory and SQLite backends.
pub mod admin_store;
/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
