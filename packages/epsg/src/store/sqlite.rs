//! SQLite-backed entity store.
//!
//! Every variant shares the `dictionary_entries` table: the `class` column
//! is the discriminator and `body` holds the entity as JSON. References are
//! mirrored into `entity_references` for reverse lookups.

use std::path::Path;

use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Transaction};

use super::schema::{create_schema, drop_schema, schema_present};
use super::EntityStore;
use crate::config::StoreConfig;
use crate::error::{EpsgError, Result};
use crate::schema::{Entity, EntityClass};

/// Entity store over a single SQLite connection.
///
/// A database without registry tables reads as empty; the first write
/// creates the schema.
pub struct SqliteStore {
    connection: Connection,
    initialised: bool,
}

impl SqliteStore {
    /// Open the database described by `config`.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        match config {
            StoreConfig::InMemory => Self::open_in_memory(),
            StoreConfig::File(path) => Self::open_path(path),
        }
    }

    /// Private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let connection =
            Connection::open_in_memory().map_err(EpsgError::persistence("open in-memory database"))?;
        Self::from_connection(connection)
    }

    /// Database file at `path`, created if missing.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Opening registry database");
        let connection = Connection::open(path).map_err(EpsgError::persistence("open database"))?;
        Self::from_connection(connection)
    }

    fn from_connection(connection: Connection) -> Result<Self> {
        connection
            .pragma_update(None, "foreign_keys", true)
            .map_err(EpsgError::persistence("enable foreign keys"))?;
        let initialised = schema_present(&connection)?;
        Ok(Self {
            connection,
            initialised,
        })
    }

    fn transaction(&mut self) -> Result<Transaction<'_>> {
        self.connection
            .transaction()
            .map_err(EpsgError::persistence("begin transaction"))
    }

    fn ensure_schema(&mut self) -> Result<()> {
        if self.initialised {
            return Ok(());
        }
        let transaction = self.transaction()?;
        create_schema(&transaction)?;
        transaction
            .commit()
            .map_err(EpsgError::persistence("commit schema"))?;
        self.initialised = true;
        Ok(())
    }

    fn load_bodies(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Entity>> {
        if !self.initialised {
            return Ok(Vec::new());
        }
        let mut statement = self
            .connection
            .prepare(sql)
            .map_err(EpsgError::persistence("prepare entity query"))?;
        let bodies = statement
            .query_map(params, |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(EpsgError::persistence("query entities"))?;
        bodies.iter().map(|body| decode(body)).collect()
    }

    fn load_strings(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<String>> {
        if !self.initialised {
            return Ok(Vec::new());
        }
        let mut statement = self
            .connection
            .prepare(sql)
            .map_err(EpsgError::persistence("prepare identifier query"))?;
        let rows = statement
            .query_map(params, |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(EpsgError::persistence("query identifiers"))?;
        Ok(rows)
    }
}

fn decode(body: &str) -> Result<Entity> {
    Ok(serde_json::from_str(body)?)
}

/// Insert `entity` and its references. With `upsert`, an existing row for
/// the same identifier is replaced; otherwise it is a duplicate.
fn insert_entity(transaction: &Transaction<'_>, entity: &Entity, upsert: bool) -> Result<()> {
    let identifier = entity.identifier();
    let body = serde_json::to_string(entity)?;

    let sql = if upsert {
        "INSERT INTO dictionary_entries (identifier, class, name, body) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(identifier) DO UPDATE SET
            class = excluded.class, name = excluded.name, body = excluded.body"
    } else {
        "INSERT INTO dictionary_entries (identifier, class, name, body) VALUES (?1, ?2, ?3, ?4)"
    };
    transaction
        .prepare_cached(sql)
        .and_then(|mut statement| {
            statement.execute(params![identifier, entity.kind().as_str(), entity.name(), body])
        })
        .map_err(|source| match source {
            rusqlite::Error::SqliteFailure(ref err, _)
                if err.code == ErrorCode::ConstraintViolation
                    && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                EpsgError::DuplicateIdentifier(identifier.to_string())
            }
            source => EpsgError::Persistence {
                operation: "insert entity",
                source,
            },
        })?;

    transaction
        .execute(
            "DELETE FROM entity_references WHERE source = ?1",
            [identifier],
        )
        .map_err(EpsgError::persistence("clear references"))?;
    let mut insert_reference = transaction
        .prepare_cached(
            "INSERT INTO entity_references (source, field, position, target)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(EpsgError::persistence("prepare insert reference"))?;
    for reference in entity.references() {
        insert_reference
            .execute(params![
                identifier,
                reference.field,
                reference.position,
                reference.target.as_str()
            ])
            .map_err(EpsgError::persistence("insert reference"))?;
    }
    Ok(())
}

impl EntityStore for SqliteStore {
    fn recreate_schema(&mut self) -> Result<()> {
        let transaction = self.transaction()?;
        drop_schema(&transaction)?;
        create_schema(&transaction)?;
        transaction
            .commit()
            .map_err(EpsgError::persistence("commit schema"))?;
        self.initialised = true;
        Ok(())
    }

    fn replace_all<'e, I>(&mut self, entities: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'e Entity>,
    {
        let transaction = self.transaction()?;
        drop_schema(&transaction)?;
        create_schema(&transaction)?;

        let mut inserted = 0;
        for entity in entities {
            insert_entity(&transaction, entity, false)?;
            inserted += 1;
        }

        transaction
            .commit()
            .map_err(EpsgError::persistence("commit bulk insert"))?;
        self.initialised = true;
        tracing::info!(entities = inserted, "Replaced registry contents");
        Ok(inserted)
    }

    fn get(&self, identifier: &str) -> Result<Option<Entity>> {
        if !self.initialised {
            return Ok(None);
        }
        let body: Option<String> = self
            .connection
            .query_row(
                "SELECT body FROM dictionary_entries WHERE identifier = ?1",
                [identifier],
                |row| row.get(0),
            )
            .optional()
            .map_err(EpsgError::persistence("get entity"))?;
        body.as_deref().map(decode).transpose()
    }

    fn put(&mut self, entity: &Entity) -> Result<()> {
        self.ensure_schema()?;
        let transaction = self.transaction()?;
        insert_entity(&transaction, entity, true)?;
        transaction
            .commit()
            .map_err(EpsgError::persistence("commit entity"))
    }

    fn put_all<'e, I>(&mut self, entities: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'e Entity>,
    {
        self.ensure_schema()?;
        let transaction = self.transaction()?;
        let mut written = 0;
        for entity in entities {
            insert_entity(&transaction, entity, true)?;
            written += 1;
        }
        transaction
            .commit()
            .map_err(EpsgError::persistence("commit entities"))?;
        Ok(written)
    }

    fn remove(&mut self, identifier: &str) -> Result<bool> {
        if !self.initialised {
            return Ok(false);
        }
        let transaction = self.transaction()?;
        transaction
            .execute(
                "DELETE FROM entity_references WHERE source = ?1",
                [identifier],
            )
            .map_err(EpsgError::persistence("delete references"))?;
        let removed = transaction
            .execute(
                "DELETE FROM dictionary_entries WHERE identifier = ?1",
                [identifier],
            )
            .map_err(EpsgError::persistence("delete entity"))?;
        transaction
            .commit()
            .map_err(EpsgError::persistence("commit delete"))?;
        Ok(removed > 0)
    }

    fn contains(&self, identifier: &str) -> Result<bool> {
        if !self.initialised {
            return Ok(false);
        }
        let found: Option<i64> = self
            .connection
            .query_row(
                "SELECT 1 FROM dictionary_entries WHERE identifier = ?1 LIMIT 1",
                [identifier],
                |row| row.get(0),
            )
            .optional()
            .map_err(EpsgError::persistence("check entity"))?;
        Ok(found.is_some())
    }

    fn count(&self) -> Result<usize> {
        if !self.initialised {
            return Ok(0);
        }
        let count: i64 = self
            .connection
            .query_row("SELECT COUNT(*) FROM dictionary_entries", [], |row| {
                row.get(0)
            })
            .map_err(EpsgError::persistence("count entities"))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn identifiers(&self) -> Result<Vec<String>> {
        self.load_strings(
            "SELECT identifier FROM dictionary_entries ORDER BY identifier",
            [],
        )
    }

    fn entries(&self) -> Result<Vec<Entity>> {
        self.load_bodies(
            "SELECT body FROM dictionary_entries ORDER BY identifier",
            [],
        )
    }

    fn query(&self, class: EntityClass) -> Result<Vec<Entity>> {
        if class == EntityClass::Any {
            return self.entries();
        }
        let kinds = class.kinds();
        let placeholders = vec!["?"; kinds.len()].join(", ");
        let sql = format!(
            "SELECT body FROM dictionary_entries WHERE class IN ({placeholders}) ORDER BY identifier"
        );
        self.load_bodies(&sql, params_from_iter(kinds.iter().map(|kind| kind.as_str())))
    }

    fn referenced_by(&self, identifier: &str) -> Result<Vec<String>> {
        self.load_strings(
            "SELECT DISTINCT source FROM entity_references WHERE target = ?1 ORDER BY source",
            [identifier],
        )
    }

    fn clear(&mut self) -> Result<()> {
        if !self.initialised {
            return Ok(());
        }
        let transaction = self.transaction()?;
        transaction
            .execute("DELETE FROM entity_references", [])
            .map_err(EpsgError::persistence("clear references"))?;
        transaction
            .execute("DELETE FROM dictionary_entries", [])
            .map_err(EpsgError::persistence("clear entities"))?;
        transaction
            .commit()
            .map_err(EpsgError::persistence("commit clear"))
    }

    fn is_initialised(&self) -> bool {
        self.initialised
    }
}
