//! # req-db
//!
//! libSQL database operations for ReqSmith state and the semantic cache.
//!
//! Handles all relational state: epics, user stories, Gherkin scenarios,
//! their embeddings, and the semantic cache rows the pipeline consults
//! before calling the LLM.
//!
//! Uses the `libsql` crate: a local file (or `:memory:` for tests),
//! embedded migrations, and per-connection foreign keys.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle for all ReqSmith state operations.
///
/// Wraps a libSQL database and connection. Repo methods are implemented as
/// `impl ReqDb` blocks in [`repos`].
pub struct ReqDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl ReqDb {
    /// Open a local-only database at the given path.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        tracing::debug!(path, "opening local database");
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let req_db = Self { db, conn };
        req_db.run_migrations().await?;
        Ok(req_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
