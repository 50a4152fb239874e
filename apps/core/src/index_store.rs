use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::config::Config;
use crate::usage_store::{StoreError, UsageMap, UsagePersistence, UsageRecord};

pub fn open_memory() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_file(path: &Path) -> Result<Connection, StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn open_from_config(cfg: &Config) -> Result<Connection, StoreError> {
    open_file(&cfg.usage_path)
}

fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS usage (
            id TEXT PRIMARY KEY,
            count INTEGER NOT NULL,
            last_used_epoch_secs REAL NOT NULL
        )",
        [],
    )?;
    Ok(())
}

pub fn load_usages(db: &Connection) -> Result<UsageMap, StoreError> {
    let mut stmt = db.prepare("SELECT id, count, last_used_epoch_secs FROM usage")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, f64>(2)?,
        ))
    })?;

    let mut records = UsageMap::new();
    for row in rows {
        let (id, count, last_used_epoch_secs) = row?;
        let Some(count) = u32::try_from(count).ok().filter(|count| *count > 0) else {
            log::warn!("skipping usage row with invalid count id={id} count={count}");
            continue;
        };
        records.insert(
            id,
            UsageRecord {
                count,
                last_used_epoch_secs,
            },
        );
    }
    Ok(records)
}

/// Replaces the whole table with `records` in one transaction.
pub fn save_usages(db: &Connection, records: &UsageMap) -> Result<(), StoreError> {
    let tx = db.unchecked_transaction()?;
    tx.execute("DELETE FROM usage", [])?;
    {
        let mut insert = tx.prepare(
            "INSERT INTO usage (id, count, last_used_epoch_secs) VALUES (?1, ?2, ?3)",
        )?;
        for (id, record) in records {
            insert.execute(params![id, record.count, record.last_used_epoch_secs])?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub fn get_usage(db: &Connection, id: &str) -> Result<Option<UsageRecord>, StoreError> {
    let record = db
        .query_row(
            "SELECT count, last_used_epoch_secs FROM usage WHERE id = ?1",
            params![id],
            |row| {
                Ok(UsageRecord {
                    count: row.get(0)?,
                    last_used_epoch_secs: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(record)
}

pub struct SqliteUsagePersistence {
    db: Connection,
}

impl SqliteUsagePersistence {
    pub fn new(db: Connection) -> Self {
        Self { db }
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self::new(open_file(path)?))
    }

    pub fn connection(&self) -> &Connection {
        &self.db
    }
}

impl UsagePersistence for SqliteUsagePersistence {
    fn load(&self) -> Result<UsageMap, StoreError> {
        load_usages(&self.db)
    }

    fn save(&self, records: &UsageMap) -> Result<(), StoreError> {
        save_usages(&self.db, records)
    }
}
