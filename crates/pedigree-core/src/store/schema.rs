//! SQLite schema DDL and migration framework for the pedigree store.

use rusqlite::Connection;

use crate::errors::PedigreeResult;

/// Current schema version. Migrations run from whatever the DB currently
/// reports up to this value.
pub const SCHEMA_VERSION: i32 = 3;

/// Core DDL statements: 5 CREATE TABLE + 6 CREATE INDEX.
///
/// Executed with `CREATE … IF NOT EXISTS` so they are safe to replay on an
/// already-initialised database.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    // ── tables (5) ──────────────────────────────────────────────────────
    "CREATE TABLE IF NOT EXISTS meta (
        key TEXT PRIMARY KEY,
        value TEXT
    );",
    "CREATE TABLE IF NOT EXISTS kennels (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP
    );",
    "CREATE TABLE IF NOT EXISTS dogs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        title TEXT,
        sex TEXT NOT NULL DEFAULT 'unknown',
        image_url TEXT,
        profile_url TEXT,
        father_id INTEGER REFERENCES dogs(id),
        mother_id INTEGER REFERENCES dogs(id),
        kennel_id INTEGER REFERENCES kennels(id),
        created_at TEXT DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT DEFAULT CURRENT_TIMESTAMP
    );",
    "CREATE TABLE IF NOT EXISTS imports (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        source_url TEXT NOT NULL,
        content_hash TEXT NOT NULL,
        root_dog_id INTEGER REFERENCES dogs(id),
        warnings_json TEXT NOT NULL DEFAULT '[]',
        created_at TEXT DEFAULT CURRENT_TIMESTAMP
    );",
    "CREATE TABLE IF NOT EXISTS migration_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        from_version INTEGER NOT NULL,
        to_version INTEGER NOT NULL,
        status TEXT NOT NULL,
        error_message TEXT,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP
    );",
    // ── indexes (6) ─────────────────────────────────────────────────────
    "CREATE INDEX IF NOT EXISTS idx_dogs_name ON dogs(name);",
    "CREATE INDEX IF NOT EXISTS idx_dogs_father ON dogs(father_id);",
    "CREATE INDEX IF NOT EXISTS idx_dogs_mother ON dogs(mother_id);",
    "CREATE INDEX IF NOT EXISTS idx_dogs_kennel ON dogs(kennel_id);",
    "CREATE INDEX IF NOT EXISTS idx_imports_source ON imports(source_url, created_at);",
    "CREATE INDEX IF NOT EXISTS idx_imports_hash ON imports(content_hash);",
];

// ─── Migration framework ────────────────────────────────────────────────────

/// Run all pending migrations from the current stored version up to
/// [`SCHEMA_VERSION`]. Each step is wrapped in a SAVEPOINT so a failure
/// rolls back only that single step.
pub fn migrate_schema(conn: &Connection) -> PedigreeResult<()> {
    let mut current_version = get_schema_version(conn);

    while current_version < SCHEMA_VERSION {
        let next_version = current_version + 1;
        conn.execute_batch("SAVEPOINT pedigree_migrate_step;")?;

        let step_result = (|| -> PedigreeResult<()> {
            match next_version {
                1 => migrate_to_v1(conn)?,
                2 => migrate_to_v2(conn)?,
                3 => migrate_to_v3(conn)?,
                _ => {} // future versions: no-op until migration is defined
            }
            set_schema_version(conn, next_version)?;
            record_migration_step(conn, current_version, next_version, "success", None)?;
            conn.execute_batch("RELEASE SAVEPOINT pedigree_migrate_step;")?;
            Ok(())
        })();

        match step_result {
            Ok(()) => {
                current_version = next_version;
            }
            Err(e) => {
                // Roll back just this step, then release the savepoint.
                let _ = conn.execute_batch("ROLLBACK TO SAVEPOINT pedigree_migrate_step;");
                let _ = conn.execute_batch("RELEASE SAVEPOINT pedigree_migrate_step;");
                let _ = record_migration_step(
                    conn,
                    current_version,
                    next_version,
                    "failed",
                    Some(&e.to_string()),
                );
                return Err(e);
            }
        }
    }

    Ok(())
}

/// Read the current schema version from `meta`.
/// Returns 0 when the key is absent or unparseable.
fn get_schema_version(conn: &Connection) -> i32 {
    let result: Result<String, _> = conn.query_row(
        "SELECT value FROM meta WHERE key = 'schema_version';",
        [],
        |row| row.get(0),
    );
    match result {
        Ok(v) => v.parse::<i32>().unwrap_or(0),
        Err(_) => 0,
    }
}

/// Upsert the `schema_version` key in `meta`.
fn set_schema_version(conn: &Connection, version: i32) -> PedigreeResult<()> {
    conn.execute(
        "INSERT INTO meta(key, value) \
         VALUES('schema_version', ?1) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
        rusqlite::params![version.to_string()],
    )?;
    Ok(())
}

/// Insert one row into `migration_history` (best-effort; never fails the
/// caller).
fn record_migration_step(
    conn: &Connection,
    from_v: i32,
    to_v: i32,
    status: &str,
    error_msg: Option<&str>,
) -> PedigreeResult<()> {
    conn.execute(
        "INSERT INTO migration_history(from_version, to_version, status, error_message) \
         VALUES (?1, ?2, ?3, ?4);",
        rusqlite::params![from_v, to_v, status, error_msg],
    )?;
    Ok(())
}

// ─── Individual migration steps ─────────────────────────────────────────────

/// v0 -> v1: baseline, no-op.
fn migrate_to_v1(_conn: &Connection) -> PedigreeResult<()> {
    // Intentionally empty -- baseline schema already created by SCHEMA_STATEMENTS.
    Ok(())
}

/// v1 -> v2: create the `imports` provenance table and its source index.
fn migrate_to_v2(conn: &Connection) -> PedigreeResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS imports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source_url TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            root_dog_id INTEGER REFERENCES dogs(id),
            warnings_json TEXT NOT NULL DEFAULT '[]',
            created_at TEXT DEFAULT CURRENT_TIMESTAMP
        );",
    )?;
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_imports_source \
         ON imports(source_url, created_at);",
    )?;
    Ok(())
}

/// v2 -> v3: add the content-hash index for duplicate-import lookups.
fn migrate_to_v3(conn: &Connection) -> PedigreeResult<()> {
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_imports_hash ON imports(content_hash);",
    )?;
    Ok(())
}
