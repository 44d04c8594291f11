//! sqlite-adapter — SQLite implementation of the ActionStore port.
//!
//! Purpose
//! - Provide a durable, file-based action log so the service runs locally
//!   without any other infrastructure.
//! - Implements the `ActionStore` trait from the `domain` crate. Rows are only
//!   ever inserted; nothing in this adapter updates or deletes them.
//!
//! Notes
//! - Uses `rusqlite` with the `bundled` feature for portability.
//! - Stores timestamps as milliseconds since UNIX_EPOCH (i64).
//! - Payloads are stored as JSON text.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use domain::{Action, ActionResult, ActionStore, ActionType, CoreError, Owner, Slug};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SELECT_COLUMNS: &str = "SELECT id, action_type, url_key, long_url, response_json, response_code, timestamp, owner FROM url_actions";

/// SQLite-backed action log.
pub struct SqliteActionStore {
    conn: std::sync::Mutex<Connection>,
}

impl SqliteActionStore {
    /// Open (or create) a SQLite database at the given path and ensure schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(map_sqerr)?;
        // Other processes (server, cli) may hold the write lock briefly.
        conn.busy_timeout(BUSY_TIMEOUT).map_err(map_sqerr)?;
        init_schema(&conn)?;
        Ok(Self { conn: std::sync::Mutex::new(conn) })
    }

    /// Private in-memory database; contents vanish with the store.
    pub fn in_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(map_sqerr)?;
        init_schema(&conn)?;
        Ok(Self { conn: std::sync::Mutex::new(conn) })
    }

    /// Construct from env var `DB_PATH` (defaults to `./data/url_actions.db`).
    pub fn from_env() -> Result<Self, CoreError> {
        let path = std::env::var("DB_PATH").unwrap_or_else(|_| "./data/url_actions.db".to_string());
        Self::open_creating_dirs(path)
    }

    /// Open at `path`, creating the parent directory first if needed.
    pub fn open_creating_dirs<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        if let Some(dir) = path.as_ref().parent() { let _ = std::fs::create_dir_all(dir); }
        Self::new(path)
    }

    fn select(&self, where_clause: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Action>, CoreError> {
        let conn = self.conn.lock().map_err(|_| CoreError::Repository("mutex poisoned".into()))?;
        let sql = format!("{SELECT_COLUMNS} {where_clause}");
        let mut stmt = conn.prepare(&sql).map_err(map_sqerr)?;
        let mut rows = stmt.query(params).map_err(map_sqerr)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(map_sqerr)? {
            out.push(row_to_action(row)?);
        }
        Ok(out)
    }
}

fn init_schema(conn: &Connection) -> Result<(), CoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS url_actions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            action_type TEXT NOT NULL CHECK (action_type IN ('create', 'update', 'delete')),
            url_key TEXT NOT NULL,
            long_url TEXT,
            response_json TEXT NOT NULL,
            response_code INTEGER NOT NULL,
            timestamp INTEGER NOT NULL,
            owner TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_url_actions_owner ON url_actions(owner, timestamp, id);
        CREATE INDEX IF NOT EXISTS idx_url_actions_owner_key ON url_actions(owner, url_key);
        "#
    ).map_err(map_sqerr)?;
    Ok(())
}

fn map_sqerr<E: std::fmt::Display>(e: E) -> CoreError { CoreError::Repository(format!("sqlite error: {e}")) }

fn system_time_to_millis(t: SystemTime) -> i64 { t.duration_since(UNIX_EPOCH).unwrap_or(Duration::from_millis(0)).as_millis() as i64 }
fn millis_to_system_time(ms: i64) -> SystemTime { UNIX_EPOCH + Duration::from_millis(ms.max(0) as u64) }

fn row_to_action(row: &rusqlite::Row) -> Result<Action, CoreError> {
    let id: i64 = row.get(0).map_err(map_sqerr)?;
    let action_str: String = row.get(1).map_err(map_sqerr)?;
    let key_str: String = row.get(2).map_err(map_sqerr)?;
    let long_url: Option<String> = row.get(3).map_err(map_sqerr)?;
    let payload_str: String = row.get(4).map_err(map_sqerr)?;
    let code: i64 = row.get(5).map_err(map_sqerr)?;
    let ts: i64 = row.get(6).map_err(map_sqerr)?;
    let owner_str: String = row.get(7).map_err(map_sqerr)?;

    let action_type = ActionType::parse(&action_str)
        .ok_or_else(|| CoreError::Repository(format!("bad action_type in db: {action_str}")))?;
    let url_key = Slug::new(key_str).map_err(|e| CoreError::Repository(format!("bad url_key in db: {e}")))?;
    let owner = Owner::new(owner_str).map_err(|_| CoreError::Repository("bad owner in db".into()))?;
    // Payloads are opaque; keep unparseable text as a JSON string rather than failing the read.
    let response_payload = serde_json::from_str(&payload_str).unwrap_or(serde_json::Value::String(payload_str));
    let response_status = u16::try_from(code).map_err(|_| CoreError::Repository(format!("bad response_code in db: {code}")))?;

    Ok(Action {
        id,
        action_type,
        url_key,
        long_url,
        response_payload,
        response_status,
        timestamp: millis_to_system_time(ts),
        owner,
    })
}

impl ActionStore for SqliteActionStore {
    fn append(&self, result: ActionResult, owner: &Owner, at: SystemTime) -> Result<Action, CoreError> {
        let key = result.check_required()?.clone();
        let payload = serde_json::to_string(&result.response_payload).map_err(|e| CoreError::Validation(format!("payload: {e}")))?;

        let mut conn = self.conn.lock().map_err(|_| CoreError::Repository("mutex poisoned".into()))?;
        // Take the write lock up front so the read below cannot race another connection.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate).map_err(map_sqerr)?;
        // Clamp so insertion order and timestamp order agree; the newest row holds the maximum.
        let last: Option<i64> = tx
            .query_row("SELECT timestamp FROM url_actions ORDER BY id DESC LIMIT 1", [], |r| r.get(0))
            .optional()
            .map_err(map_sqerr)?;
        let ts = system_time_to_millis(at).max(last.unwrap_or(0));
        tx.execute(
            "INSERT INTO url_actions(action_type, url_key, long_url, response_json, response_code, timestamp, owner) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                result.action_type.as_str(),
                key.as_str(),
                result.long_url,
                payload,
                result.response_status as i64,
                ts,
                owner.as_str(),
            ],
        ).map_err(map_sqerr)?;
        let id = tx.last_insert_rowid();
        tx.commit().map_err(map_sqerr)?;

        Ok(Action {
            id,
            action_type: result.action_type,
            url_key: key,
            long_url: result.long_url,
            response_payload: result.response_payload,
            response_status: result.response_status,
            timestamp: millis_to_system_time(ts),
            owner: owner.clone(),
        })
    }

    fn query_recent(&self, owner: &Owner, limit: usize) -> Result<Vec<Action>, CoreError> {
        self.select(
            "WHERE owner = ?1 ORDER BY timestamp DESC, id DESC LIMIT ?2",
            &[&owner.as_str(), &(limit as i64)],
        )
    }

    fn query_by_key(&self, owner: &Owner, key: &Slug) -> Result<Vec<Action>, CoreError> {
        self.select(
            "WHERE owner = ?1 AND url_key = ?2 ORDER BY timestamp DESC, id DESC",
            &[&owner.as_str(), &key.as_str()],
        )
    }

    fn query_all(&self, owner: &Owner) -> Result<Vec<Action>, CoreError> {
        self.select("WHERE owner = ?1 ORDER BY timestamp DESC, id DESC", &[&owner.as_str()])
    }
}
