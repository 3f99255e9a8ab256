// Bridge rows

use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

use super::Cache;
use crate::error::CoreError;
use crate::model::BridgeInfo;

const COLUMNS: &str = "id, hostname, bridge_id, app_key, client_key, port";

fn bridge_from_row(row: &Row<'_>) -> rusqlite::Result<BridgeInfo> {
    Ok(BridgeInfo {
        id: row.get(0)?,
        hostname: row.get(1)?,
        bridge_id: row.get(2)?,
        app_key: row.get(3)?,
        client_key: row.get(4)?,
        port: row.get(5)?,
    })
}

impl Cache {
    /// All known bridges, in insertion order.
    pub fn bridges(&self) -> Result<Vec<BridgeInfo>, CoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM bridge_info ORDER BY id"))?;
        let rows = stmt.query_map([], bridge_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn bridge_by_hostname(&self, hostname: &str) -> Result<Option<BridgeInfo>, CoreError> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM bridge_info WHERE hostname = ?1"),
                [hostname],
                bridge_from_row,
            )
            .optional()?)
    }

    /// The bridge holding an application key, if any. When several do, the
    /// most recently selected wins.
    pub fn bridge_with_credentials(&self) -> Result<Option<BridgeInfo>, CoreError> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                &format!(
                    "SELECT {COLUMNS} FROM bridge_info
                     WHERE app_key <> ''
                     ORDER BY selected DESC, id DESC LIMIT 1"
                ),
                [],
                bridge_from_row,
            )
            .optional()?)
    }

    /// The bridge most recently passed to [`Cache::select`], if any.
    pub fn selected_bridge(&self) -> Result<Option<BridgeInfo>, CoreError> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                &format!(
                    "SELECT {COLUMNS} FROM bridge_info
                     WHERE selected > 0
                     ORDER BY selected DESC LIMIT 1"
                ),
                [],
                bridge_from_row,
            )
            .optional()?)
    }

    /// Insert `bridge`, or overwrite the row with the same hostname while
    /// keeping its id. Returns the stored row.
    pub fn insert_or_update(&self, bridge: &BridgeInfo) -> Result<BridgeInfo, CoreError> {
        let conn = self.conn()?;
        let stored = upsert(&conn, bridge)?;
        debug!(hostname = %stored.hostname, id = stored.id, "bridge stored");
        Ok(stored)
    }

    /// Upsert `bridge` and mark it as the latest selection.
    pub fn select(&self, bridge: &BridgeInfo) -> Result<BridgeInfo, CoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        upsert(&tx, bridge)?;
        tx.execute(
            "UPDATE bridge_info
             SET selected = (SELECT MAX(selected) FROM bridge_info) + 1
             WHERE hostname = ?1",
            [&bridge.hostname],
        )?;
        let stored = find(&tx, &bridge.hostname)?;
        tx.commit()?;
        debug!(hostname = %stored.hostname, id = stored.id, "bridge selected");
        Ok(stored)
    }
}

fn upsert(conn: &Connection, bridge: &BridgeInfo) -> rusqlite::Result<BridgeInfo> {
    conn.execute(
        "INSERT INTO bridge_info (hostname, bridge_id, app_key, client_key, port)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(hostname) DO UPDATE SET
           bridge_id  = excluded.bridge_id,
           app_key    = excluded.app_key,
           client_key = excluded.client_key,
           port       = excluded.port",
        params![
            bridge.hostname,
            bridge.bridge_id,
            bridge.app_key,
            bridge.client_key,
            bridge.port
        ],
    )?;
    find(conn, &bridge.hostname)
}

fn find(conn: &Connection, hostname: &str) -> rusqlite::Result<BridgeInfo> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM bridge_info WHERE hostname = ?1"),
        [hostname],
        bridge_from_row,
    )
}
