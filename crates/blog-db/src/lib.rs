//! Database layer for the blog service.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization,
//! and embedded SQL migrations. The `posts` table, and anything added to the
//! store later, is created through versioned migrations managed by this crate.
//!
//! # Design decisions
//!
//! - **SQLite with WAL mode**: the store is a single on-disk file with no
//!   external database process. WAL mode allows concurrent readers with a
//!   single writer; SQLite itself serializes conflicting writes.
//! - **`r2d2` connection pool**: the pool is the one storage handle shared by
//!   every request. It is constructed explicitly at startup and dropped at
//!   shutdown.
//! - **Embedded migrations**: SQL files are compiled into the binary via
//!   `include_str!`, so the schema ships with the server.

mod migrations;
mod pool;

pub use migrations::{ensure_schema, run_migrations, MigrationError, SchemaError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
