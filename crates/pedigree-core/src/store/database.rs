//! SQLite storage layer for pedigree records.
//!
//! Each public method opens its own connection, so callers never manage
//! connection lifetime. Parent assignments run the write-time cycle guard
//! before touching the relation; the tree builder trusts whatever this layer
//! has persisted.

use std::path::PathBuf;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::errors::{PedigreeError, PedigreeResult};
use crate::guards::{clamp_limit, MAX_LINEAGE_WALK, MAX_SEARCH_LIMIT};
use crate::models::{ImportWarning, KennelRef, PedigreeEntity, Sex};
use crate::store::schema;
use crate::tree::builder::RecordResolver;
use crate::tree::lineage::creates_cycle;
use crate::tree::slots::ParentStep;

// ---------------------------------------------------------------------------
// Helper: tilde expansion
// ---------------------------------------------------------------------------

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            let mut expanded = PathBuf::from(home);
            if path.len() > 2 {
                expanded.push(&path[2..]);
            }
            return expanded;
        }
    }
    PathBuf::from(path)
}

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// Fields for inserting a dog record. Parent links are assigned separately
/// through [`Database::set_parent`] so every write passes the cycle guard.
#[derive(Clone, Debug, Default)]
pub struct NewDog {
    pub name: String,
    /// Canonicalized champion title ("ch", "gr ch"), when known.
    pub title: Option<String>,
    pub sex: Sex,
    pub image_url: Option<String>,
    pub profile_url: Option<String>,
    pub kennel_id: Option<i64>,
}

/// One recorded import, with its warnings decoded from storage.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportRecord {
    pub id: i64,
    pub source_url: String,
    pub content_hash: String,
    pub root_dog_id: Option<i64>,
    pub warnings: Vec<ImportWarning>,
    pub created_at: String,
}

// ---------------------------------------------------------------------------
// Database
// ---------------------------------------------------------------------------

/// SQLite store for dogs, kennels, and import provenance.
pub struct Database {
    db_path: PathBuf,
}

impl Database {
    /// Create a new `Database`. The path is expanded and parent directories
    /// are created if they do not already exist.
    pub fn new(db_path: impl AsRef<std::path::Path>) -> PedigreeResult<Self> {
        let db_str = db_path.as_ref().to_string_lossy();
        let expanded = expand_tilde(&db_str);
        let resolved = if expanded.is_absolute() {
            expanded
        } else {
            std::env::current_dir()?.join(&expanded)
        };
        if let Some(parent) = resolved.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self { db_path: resolved })
    }

    /// The resolved database path.
    pub fn db_path(&self) -> &std::path::Path {
        &self.db_path
    }

    /// Open a new SQLite connection to `self.db_path`, enable `foreign_keys`,
    /// and return it.
    fn connect(&self) -> PedigreeResult<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(conn)
    }

    // -----------------------------------------------------------------------
    // Schema / meta
    // -----------------------------------------------------------------------

    /// Initialise the database schema: set WAL mode, create all tables and
    /// indexes, then run pending migrations.
    pub fn init_schema(&self) -> PedigreeResult<()> {
        let conn = self.connect()?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        for stmt in schema::SCHEMA_STATEMENTS {
            conn.execute_batch(stmt)?;
        }
        schema::migrate_schema(&conn)?;
        Ok(())
    }

    /// Get a single meta value by key, or `None`.
    pub fn get_meta(&self, key: &str) -> PedigreeResult<Option<String>> {
        let conn = self.connect()?;
        let value = conn
            .query_row(
                "SELECT value FROM meta WHERE key = ?1 LIMIT 1;",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Upsert a single meta key/value pair.
    pub fn set_meta(&self, key: &str, value: &str) -> PedigreeResult<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO meta(key, value) VALUES(?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            params![key, value],
        )?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Kennels
    // -----------------------------------------------------------------------

    /// Find-or-create a kennel by name and return its id. Names are unique;
    /// repeated calls with the same name return the same id.
    pub fn upsert_kennel(&self, name: &str) -> PedigreeResult<i64> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(PedigreeError::Validation(
                "kennel name must not be empty".to_string(),
            ));
        }
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO kennels(name) VALUES(?1) ON CONFLICT(name) DO NOTHING;",
            params![trimmed],
        )?;
        let id = conn.query_row(
            "SELECT id FROM kennels WHERE name = ?1;",
            params![trimmed],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Look up a kennel by exact name.
    pub fn find_kennel(&self, name: &str) -> PedigreeResult<Option<KennelRef>> {
        let conn = self.connect()?;
        let found = conn
            .query_row(
                "SELECT id, name FROM kennels WHERE name = ?1;",
                params![name.trim()],
                |row| {
                    Ok(KennelRef {
                        id: Some(row.get(0)?),
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    /// All kennels, ordered by name.
    pub fn list_kennels(&self) -> PedigreeResult<Vec<KennelRef>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT id, name FROM kennels ORDER BY name;")?;
        let rows = stmt.query_map([], |row| {
            Ok(KennelRef {
                id: Some(row.get(0)?),
                name: row.get(1)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    // -----------------------------------------------------------------------
    // Dogs
    // -----------------------------------------------------------------------

    /// Insert a dog record and return its id.
    pub fn create_dog(&self, dog: &NewDog) -> PedigreeResult<i64> {
        if dog.name.trim().is_empty() {
            return Err(PedigreeError::Validation(
                "dog name must not be empty".to_string(),
            ));
        }
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO dogs (name, title, sex, image_url, profile_url, kennel_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                dog.name.trim(),
                dog.title,
                dog.sex.as_str(),
                dog.image_url,
                dog.profile_url,
                dog.kennel_id,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Fetch a dog with its kennel affiliation resolved.
    pub fn get_dog(&self, id: i64) -> PedigreeResult<Option<PedigreeEntity>> {
        let conn = self.connect()?;
        let found = conn
            .query_row(
                "SELECT d.id, d.name, d.sex, d.image_url, d.profile_url, \
                        d.father_id, d.mother_id, d.kennel_id, k.name \
                 FROM dogs d LEFT JOIN kennels k ON k.id = d.kennel_id \
                 WHERE d.id = ?1;",
                params![id],
                entity_from_row,
            )
            .optional()?;
        Ok(found)
    }

    /// Case-insensitive substring search over dog names, newest first.
    /// `limit` is clamped to `1..=MAX_SEARCH_LIMIT`.
    pub fn search_dogs(&self, query: &str, limit: i64) -> PedigreeResult<Vec<PedigreeEntity>> {
        let conn = self.connect()?;
        let pattern = format!("%{}%", query.trim());
        let mut stmt = conn.prepare(
            "SELECT d.id, d.name, d.sex, d.image_url, d.profile_url, \
                    d.father_id, d.mother_id, d.kennel_id, k.name \
             FROM dogs d LEFT JOIN kennels k ON k.id = d.kennel_id \
             WHERE d.name LIKE ?1 \
             ORDER BY d.id DESC LIMIT ?2;",
        )?;
        let rows = stmt.query_map(
            params![pattern, clamp_limit(limit, MAX_SEARCH_LIMIT)],
            entity_from_row,
        )?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Replace a dog's descriptive fields. Parent links are untouched; use
    /// [`Database::set_parent`] for those.
    pub fn update_dog(&self, id: i64, dog: &NewDog) -> PedigreeResult<()> {
        if dog.name.trim().is_empty() {
            return Err(PedigreeError::Validation(
                "dog name must not be empty".to_string(),
            ));
        }
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE dogs SET name = ?1, title = ?2, sex = ?3, image_url = ?4, \
             profile_url = ?5, kennel_id = ?6, updated_at = CURRENT_TIMESTAMP \
             WHERE id = ?7;",
            params![
                dog.name.trim(),
                dog.title,
                dog.sex.as_str(),
                dog.image_url,
                dog.profile_url,
                dog.kennel_id,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(PedigreeError::Validation(format!("no dog with id {id}")));
        }
        Ok(())
    }

    /// Delete a dog. References to it from other records (children's parent
    /// links, import provenance) are cleared, not cascaded.
    pub fn delete_dog(&self, id: i64) -> PedigreeResult<()> {
        let conn = self.connect()?;
        conn.execute(
            "UPDATE dogs SET father_id = NULL, updated_at = CURRENT_TIMESTAMP \
             WHERE father_id = ?1;",
            params![id],
        )?;
        conn.execute(
            "UPDATE dogs SET mother_id = NULL, updated_at = CURRENT_TIMESTAMP \
             WHERE mother_id = ?1;",
            params![id],
        )?;
        conn.execute(
            "UPDATE imports SET root_dog_id = NULL WHERE root_dog_id = ?1;",
            params![id],
        )?;
        let deleted = conn.execute("DELETE FROM dogs WHERE id = ?1;", params![id])?;
        if deleted == 0 {
            return Err(PedigreeError::Validation(format!("no dog with id {id}")));
        }
        Ok(())
    }

    /// Assign or clear one parent link.
    ///
    /// Both records must exist, and the assignment must not make the dog its
    /// own ancestor; violations are reported as validation errors and
    /// nothing is written.
    pub fn set_parent(
        &self,
        dog_id: i64,
        step: ParentStep,
        parent_id: Option<i64>,
    ) -> PedigreeResult<()> {
        if self.get_dog(dog_id)?.is_none() {
            return Err(PedigreeError::Validation(format!(
                "no dog with id {dog_id}"
            )));
        }
        if let Some(parent_id) = parent_id {
            if self.get_dog(parent_id)?.is_none() {
                return Err(PedigreeError::Validation(format!(
                    "no dog with id {parent_id} to assign as parent"
                )));
            }
            if creates_cycle(self, dog_id, parent_id, MAX_LINEAGE_WALK) {
                return Err(PedigreeError::Validation(format!(
                    "assigning {parent_id} as a parent of {dog_id} would create an ancestry cycle"
                )));
            }
        }

        let column = match step {
            ParentStep::Father => "father_id",
            ParentStep::Mother => "mother_id",
        };
        let conn = self.connect()?;
        conn.execute(
            &format!(
                "UPDATE dogs SET {column} = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2;"
            ),
            params![parent_id, dog_id],
        )?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Import provenance
    // -----------------------------------------------------------------------

    /// Record one import with its source, content hash, and warnings.
    pub fn record_import(
        &self,
        source_url: &str,
        content_hash: &str,
        root_dog_id: Option<i64>,
        warnings: &[ImportWarning],
    ) -> PedigreeResult<i64> {
        let conn = self.connect()?;
        let warnings_json = serde_json::to_string(warnings)?;
        conn.execute(
            "INSERT INTO imports (source_url, content_hash, root_dog_id, warnings_json) \
             VALUES (?1, ?2, ?3, ?4);",
            params![source_url, content_hash, root_dog_id, warnings_json],
        )?;
        let id = conn.last_insert_rowid();
        info!(
            "recorded import {id} from {source_url} ({} warnings)",
            warnings.len()
        );
        Ok(id)
    }

    /// Recent imports, newest first. `limit` is clamped like search.
    pub fn list_imports(&self, limit: i64) -> PedigreeResult<Vec<ImportRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, source_url, content_hash, root_dog_id, warnings_json, created_at \
             FROM imports ORDER BY id DESC LIMIT ?1;",
        )?;
        let rows = stmt.query_map(params![clamp_limit(limit, MAX_SEARCH_LIMIT)], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<i64>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (id, source_url, content_hash, root_dog_id, warnings_json, created_at) = row?;
            out.push(ImportRecord {
                id,
                source_url,
                content_hash,
                root_dog_id,
                warnings: serde_json::from_str(&warnings_json)?,
                created_at,
            });
        }
        Ok(out)
    }

    // -----------------------------------------------------------------------
    // Backup
    // -----------------------------------------------------------------------

    /// Create a backup of the database at `destination` using the SQLite
    /// backup API. Returns the resolved path.
    pub fn backup_to(&self, destination: impl AsRef<std::path::Path>) -> PedigreeResult<PathBuf> {
        let backup_path = expand_tilde(&destination.as_ref().to_string_lossy());
        let resolved = if backup_path.is_absolute() {
            backup_path
        } else {
            std::env::current_dir()?.join(&backup_path)
        };
        if let Some(parent) = resolved.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let src_conn = self.connect()?;
        let mut dst_conn = Connection::open(&resolved)?;
        let backup = rusqlite::backup::Backup::new(&src_conn, &mut dst_conn)?;
        backup.run_to_completion(100, std::time::Duration::from_millis(10), None)?;
        Ok(resolved)
    }

    /// Restore the database from a backup file.
    pub fn restore_from(&self, source: impl AsRef<std::path::Path>) -> PedigreeResult<()> {
        let source_path = expand_tilde(&source.as_ref().to_string_lossy());
        let resolved = if source_path.is_absolute() {
            source_path
        } else {
            std::env::current_dir()?.join(&source_path)
        };
        if !resolved.exists() {
            return Err(PedigreeError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Backup file does not exist: {}", resolved.display()),
            )));
        }
        let src_conn = Connection::open(&resolved)?;
        let mut dst_conn = self.connect()?;
        let backup = rusqlite::backup::Backup::new(&src_conn, &mut dst_conn)?;
        backup.run_to_completion(100, std::time::Duration::from_millis(10), None)?;
        Ok(())
    }
}

fn entity_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PedigreeEntity> {
    let kennel_id: Option<i64> = row.get(7)?;
    let kennel_name: Option<String> = row.get(8)?;
    let sex_text: String = row.get(2)?;
    Ok(PedigreeEntity {
        id: row.get(0)?,
        name: row.get(1)?,
        sex: Sex::parse(&sex_text),
        image_url: row.get(3)?,
        profile_url: row.get(4)?,
        father_id: row.get(5)?,
        mother_id: row.get(6)?,
        kennel: match (kennel_id, kennel_name) {
            (Some(id), Some(name)) => Some(KennelRef { id: Some(id), name }),
            _ => None,
        },
    })
}

/// The tree builder resolves parent ids straight through the store.
impl RecordResolver for Database {
    fn resolve_by_id(&self, id: i64) -> PedigreeResult<Option<PedigreeEntity>> {
        self.get_dog(id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
