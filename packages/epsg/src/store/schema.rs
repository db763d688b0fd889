//! SQLite schema for the registry tables.
//!
//! All statements run inside a caller-supplied transaction so that schema
//! re-creation can be combined with the bulk insert that follows it.

use rusqlite::{Connection, OptionalExtension, Transaction};

use crate::error::{EpsgError, Result};

pub const SCHEMA_VERSION: i64 = 1;

/// Create tables, indexes and the version record if missing.
pub fn create_schema(transaction: &Transaction<'_>) -> Result<()> {
    run_step(
        transaction,
        "create dictionary_entries",
        "CREATE TABLE IF NOT EXISTS dictionary_entries (
            identifier TEXT PRIMARY KEY CHECK (length(trim(identifier)) > 0),
            class TEXT NOT NULL,
            name TEXT,
            body TEXT NOT NULL
        ) WITHOUT ROWID",
    )?;
    run_step(
        transaction,
        "index dictionary_entries",
        "CREATE INDEX IF NOT EXISTS idx_dictionary_entries_class
            ON dictionary_entries(class, identifier)",
    )?;
    run_step(
        transaction,
        "create entity_references",
        "CREATE TABLE IF NOT EXISTS entity_references (
            source TEXT NOT NULL,
            field TEXT NOT NULL,
            position INTEGER NOT NULL,
            target TEXT NOT NULL,
            PRIMARY KEY (source, field, position),
            FOREIGN KEY (source) REFERENCES dictionary_entries(identifier) ON DELETE CASCADE
        ) WITHOUT ROWID",
    )?;
    run_step(
        transaction,
        "index entity_references",
        "CREATE INDEX IF NOT EXISTS idx_entity_references_target
            ON entity_references(target, source)",
    )?;
    ensure_schema_version(transaction)
}

/// Drop every registry table.
pub fn drop_schema(transaction: &Transaction<'_>) -> Result<()> {
    run_step(
        transaction,
        "drop entity_references",
        "DROP TABLE IF EXISTS entity_references",
    )?;
    run_step(
        transaction,
        "drop dictionary_entries",
        "DROP TABLE IF EXISTS dictionary_entries",
    )?;
    run_step(
        transaction,
        "drop schema version",
        "DROP TABLE IF EXISTS epsg_schema_version",
    )
}

/// Whether the registry tables exist. Rejects databases written by another
/// schema version.
pub fn schema_present(connection: &Connection) -> Result<bool> {
    let tables: i64 = connection
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type = 'table' AND name IN ('dictionary_entries', 'epsg_schema_version')",
            [],
            |row| row.get(0),
        )
        .map_err(EpsgError::persistence("inspect schema"))?;
    if tables < 2 {
        return Ok(false);
    }

    let version: Option<i64> = connection
        .query_row("SELECT version FROM epsg_schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()
        .map_err(EpsgError::persistence("read schema version"))?;
    match version {
        Some(SCHEMA_VERSION) => Ok(true),
        Some(found) => Err(EpsgError::SchemaVersion {
            expected: SCHEMA_VERSION,
            found,
        }),
        None => Ok(false),
    }
}

fn ensure_schema_version(transaction: &Transaction<'_>) -> Result<()> {
    run_step(
        transaction,
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS epsg_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0),
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        ) WITHOUT ROWID",
    )?;

    let existing: Option<i64> = transaction
        .query_row("SELECT version FROM epsg_schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()
        .map_err(EpsgError::persistence("read schema version"))?;

    match existing {
        Some(SCHEMA_VERSION) => Ok(()),
        Some(found) => Err(EpsgError::SchemaVersion {
            expected: SCHEMA_VERSION,
            found,
        }),
        None => {
            transaction
                .execute(
                    "INSERT INTO epsg_schema_version (version) VALUES (?1)",
                    [SCHEMA_VERSION],
                )
                .map_err(EpsgError::persistence("record schema version"))?;
            Ok(())
        }
    }
}

fn run_step(transaction: &Transaction<'_>, step: &'static str, sql: &str) -> Result<()> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(EpsgError::persistence(step))
}
