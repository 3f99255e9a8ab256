// ── Local cache ──
//
// SQLite-backed storage for selected bridges and the last known state of
// their lights. Schema changes are handled destructively: when the stored
// `user_version` differs from `SCHEMA_VERSION`, both tables are dropped and
// recreated. The cache holds nothing that can't be fetched again.

mod bridges;
mod lights;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use tracing::{debug, warn};

use crate::error::CoreError;

const SCHEMA_VERSION: i32 = 2;

const SCHEMA: &str = "
CREATE TABLE bridge_info (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    hostname   TEXT    NOT NULL UNIQUE,
    bridge_id  TEXT    NOT NULL,
    app_key    TEXT    NOT NULL DEFAULT '',
    client_key TEXT    NOT NULL DEFAULT '',
    port       INTEGER NOT NULL,
    selected   INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE light_info (
    id         TEXT    PRIMARY KEY NOT NULL,
    color      INTEGER,
    label      TEXT    NOT NULL,
    owner      TEXT    NOT NULL,
    is_hue     INTEGER NOT NULL,
    power      INTEGER NOT NULL,
    brightness REAL    NOT NULL,
    v1_id      TEXT    NOT NULL
);
";

/// Handle to the cache database.
///
/// The connection sits behind a mutex; every call holds it only for the
/// duration of a single statement or transaction. Concurrent writers are
/// serialized and the last write wins.
#[derive(Debug)]
pub struct Cache {
    conn: Mutex<Connection>,
}

impl Cache {
    /// Open (or create) the cache at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "opening cache");
        Self::from_connection(Connection::open(path)?)
    }

    /// Open a private in-memory cache.
    pub fn open_in_memory() -> Result<Self, CoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, CoreError> {
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.conn
            .lock()
            .map_err(|_| CoreError::Internal("cache lock poisoned".into()))
    }
}

fn migrate(conn: &Connection) -> Result<(), CoreError> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version == SCHEMA_VERSION {
        return Ok(());
    }

    if version != 0 {
        warn!(
            found = version,
            expected = SCHEMA_VERSION,
            "cache schema changed, discarding cached data"
        );
    }

    conn.execute_batch(&format!(
        "BEGIN;
         DROP TABLE IF EXISTS bridge_info;
         DROP TABLE IF EXISTS light_info;
         {SCHEMA}
         PRAGMA user_version = {SCHEMA_VERSION};
         COMMIT;"
    ))?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{BridgeInfo, LightInfo};

    #[test]
    fn fresh_cache_is_empty() {
        let cache = Cache::open_in_memory().unwrap();
        assert!(cache.bridges().unwrap().is_empty());
        assert!(cache.lights().unwrap().is_empty());
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("huecolors.db");

        {
            let cache = Cache::open(&path).unwrap();
            cache
                .insert_or_update(&BridgeInfo::selected("192.168.1.20", "abc"))
                .unwrap();
        }

        let cache = Cache::open(&path).unwrap();
        let bridges = cache.bridges().unwrap();
        assert_eq!(bridges.len(), 1);
        assert_eq!(bridges[0].hostname, "192.168.1.20");
    }

    #[test]
    fn schema_mismatch_recreates_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huecolors.db");

        {
            let cache = Cache::open(&path).unwrap();
            cache
                .insert_or_update_light(&LightInfo {
                    color: None,
                    label: "Lamp 1".into(),
                    owner: "device-1".into(),
                    is_hue: false,
                    power: true,
                    brightness: 50.0,
                    v1_id: "/lights/1".into(),
                    id: "light-1".into(),
                })
                .unwrap();
            let conn = cache.conn().unwrap();
            conn.execute_batch("PRAGMA user_version = 99;").unwrap();
        }

        let cache = Cache::open(&path).unwrap();
        assert!(cache.lights().unwrap().is_empty());

        let conn = cache.conn().unwrap();
        let version: i32 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }
}
