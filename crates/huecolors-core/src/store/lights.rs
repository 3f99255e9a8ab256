// Light rows

use rusqlite::{OptionalExtension, Row, params};
use tracing::debug;

use super::Cache;
use crate::error::CoreError;
use crate::model::{LightInfo, Rgb};

const COLUMNS: &str = "id, color, label, owner, is_hue, power, brightness, v1_id";

const UPSERT: &str = "
INSERT INTO light_info (id, color, label, owner, is_hue, power, brightness, v1_id)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
ON CONFLICT(id) DO UPDATE SET
  color      = excluded.color,
  label      = excluded.label,
  owner      = excluded.owner,
  is_hue     = excluded.is_hue,
  power      = excluded.power,
  brightness = excluded.brightness,
  v1_id      = excluded.v1_id";

fn light_from_row(row: &Row<'_>) -> rusqlite::Result<LightInfo> {
    let color: Option<u32> = row.get(1)?;
    Ok(LightInfo {
        id: row.get(0)?,
        color: color.map(Rgb::from_packed),
        label: row.get(2)?,
        owner: row.get(3)?,
        is_hue: row.get(4)?,
        power: row.get(5)?,
        brightness: row.get(6)?,
        v1_id: row.get(7)?,
    })
}

fn upsert(conn: &rusqlite::Connection, light: &LightInfo) -> rusqlite::Result<usize> {
    conn.execute(
        UPSERT,
        params![
            light.id,
            light.color.map(Rgb::packed),
            light.label,
            light.owner,
            light.is_hue,
            light.power,
            light.brightness,
            light.v1_id
        ],
    )
}

impl Cache {
    /// All cached lights, in the order they were first stored.
    pub fn lights(&self) -> Result<Vec<LightInfo>, CoreError> {
        self.query_lights(&format!("SELECT {COLUMNS} FROM light_info ORDER BY rowid"))
    }

    /// Cached lights that accept color commands.
    pub fn hue_lights(&self) -> Result<Vec<LightInfo>, CoreError> {
        self.query_lights(&format!(
            "SELECT {COLUMNS} FROM light_info WHERE is_hue = 1 ORDER BY rowid"
        ))
    }

    pub fn light(&self, id: &str) -> Result<Option<LightInfo>, CoreError> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM light_info WHERE id = ?1"),
                [id],
                light_from_row,
            )
            .optional()?)
    }

    /// Insert or fully overwrite the row with `light.id`.
    pub fn insert_or_update_light(&self, light: &LightInfo) -> Result<(), CoreError> {
        let conn = self.conn()?;
        upsert(&conn, light)?;
        debug!(id = %light.id, "light stored");
        Ok(())
    }

    /// Upsert every light in one transaction.
    pub fn insert_or_update_lights(&self, lights: &[LightInfo]) -> Result<(), CoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for light in lights {
            upsert(&tx, light)?;
        }
        tx.commit()?;
        debug!(count = lights.len(), "lights stored");
        Ok(())
    }

    /// Remove every cached light. The next load re-lists them from the bridge.
    pub fn clear_lights(&self) -> Result<usize, CoreError> {
        let conn = self.conn()?;
        Ok(conn.execute("DELETE FROM light_info", [])?)
    }

    fn query_lights(&self, sql: &str) -> Result<Vec<LightInfo>, CoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], light_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
