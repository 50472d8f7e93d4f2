//! SQLite store behind the audit log: `<vault_dir>/audit.db`, owner-only.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::Connection;

use super::{AuditEvent, Operation};
use crate::errors::{Result, WalletSealError};
use crate::signing::Chain;

const DB_FILE: &str = "audit.db";

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS wallet_events (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    at_ms      INTEGER NOT NULL,
    operation  TEXT NOT NULL,
    wallet     TEXT NOT NULL,
    chain      TEXT,
    signer     TEXT,
    tx_hash    TEXT,
    note       TEXT
);
CREATE INDEX IF NOT EXISTS wallet_events_wallet ON wallet_events (wallet, at_ms);";

/// A stored event, as read back for display.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub wallet: String,
    pub chain: Option<String>,
    pub signer: Option<String>,
    pub tx_hash: Option<String>,
    pub note: Option<String>,
}

/// Which events to read back. Unset fields match everything.
#[derive(Debug, Clone)]
pub struct AuditFilter {
    pub wallet: Option<String>,
    pub chain: Option<Chain>,
    pub operation: Option<Operation>,
    pub since: Option<DateTime<Utc>>,
    /// Most recent `limit` matches.
    pub limit: usize,
}

impl Default for AuditFilter {
    fn default() -> Self {
        Self {
            wallet: None,
            chain: None,
            operation: None,
            since: None,
            limit: 50,
        }
    }
}

impl AuditFilter {
    /// `WHERE` clause and its positional parameters.
    fn to_sql(&self) -> (String, Vec<Value>) {
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        let mut push = |column: &str, value: Value| {
            params.push(value);
            clauses.push(format!("{column} ?{}", params.len()));
        };
        if let Some(wallet) = &self.wallet {
            push("wallet =", Value::Text(wallet.clone()));
        }
        if let Some(chain) = self.chain {
            push("chain =", Value::Text(chain.to_string()));
        }
        if let Some(op) = self.operation {
            push("operation =", Value::Text(op.as_str().to_string()));
        }
        if let Some(since) = self.since {
            push("at_ms >=", Value::Integer(since.timestamp_millis()));
        }

        let clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        (clause, params)
    }
}

/// Handle on an open audit database.
pub struct AuditLog {
    conn: Connection,
}

impl AuditLog {
    /// Open (or create) the database in `vault_dir`.
    ///
    /// `None` means the log is unavailable; callers carry on without it.
    pub fn open(vault_dir: &Path) -> Option<Self> {
        let path = vault_dir.join(DB_FILE);
        let conn = Connection::open(&path).ok()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600));
        }

        conn.execute_batch(SCHEMA).ok()?;
        Some(Self { conn })
    }

    /// Append one event. Write errors are traced, never returned.
    pub fn log(&self, event: &AuditEvent) {
        let result = self.conn.execute(
            "INSERT INTO wallet_events (at_ms, operation, wallet, chain, signer, tx_hash, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                Utc::now().timestamp_millis(),
                event.operation.as_str(),
                event.wallet,
                event.chain.map(|c| c.to_string()),
                event.signer,
                event.tx_hash,
                event.note,
            ],
        );
        if let Err(e) = result {
            tracing::debug!(error = %e, operation = %event.operation, "audit insert failed");
        }
    }

    /// Matching events, newest first.
    pub fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>> {
        let (clause, mut params) = filter.to_sql();
        params.push(Value::Integer(
            i64::try_from(filter.limit).unwrap_or(i64::MAX),
        ));
        let sql = format!(
            "SELECT id, at_ms, operation, wallet, chain, signer, tx_hash, note
             FROM wallet_events {clause}
             ORDER BY id DESC
             LIMIT ?{}",
            params.len()
        );

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| WalletSealError::AuditError(format!("query prepare: {e}")))?;

        let rows = stmt
            .query_map(rusqlite::params_from_iter(params.iter()), |row| {
                let at_ms: i64 = row.get(1)?;
                let timestamp = DateTime::from_timestamp_millis(at_ms).ok_or_else(|| {
                    rusqlite::Error::IntegralValueOutOfRange(1, at_ms)
                })?;
                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp,
                    operation: row.get(2)?,
                    wallet: row.get(3)?,
                    chain: row.get(4)?,
                    signer: row.get(5)?,
                    tx_hash: row.get(6)?,
                    note: row.get(7)?,
                })
            })
            .map_err(|e| WalletSealError::AuditError(format!("query exec: {e}")))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| WalletSealError::AuditError(format!("row read: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::SignedTransaction;
    use tempfile::TempDir;

    fn seeded() -> (TempDir, AuditLog) {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(dir.path()).unwrap();

        audit.log(&AuditEvent::new(Operation::Init, "main").note("imported secret"));
        audit.log(&AuditEvent::new(Operation::Address, "main").address(Chain::Ethereum, "0xf39F"));
        audit.log(&AuditEvent::new(Operation::Sign, "main").signed(&SignedTransaction {
            chain: Chain::Solana,
            signer: "Payer111".into(),
            raw: vec![0; 4],
            signature: vec![0; 64],
            tx_hash: "Sig111".into(),
        }));
        audit.log(&AuditEvent::new(Operation::Delete, "cold"));
        (dir, audit)
    }

    #[test]
    fn newest_first_with_all_columns() {
        let (_dir, audit) = seeded();
        let entries = audit.query(&AuditFilter::default()).unwrap();
        let ops: Vec<_> = entries.iter().map(|e| e.operation.as_str()).collect();
        assert_eq!(ops, ["delete", "sign", "address", "init"]);

        let sign = &entries[1];
        assert_eq!(sign.chain.as_deref(), Some("solana"));
        assert_eq!(sign.signer.as_deref(), Some("Payer111"));
        assert_eq!(sign.tx_hash.as_deref(), Some("Sig111"));
        assert_eq!(entries[3].note.as_deref(), Some("imported secret"));
    }

    #[test]
    fn filters_combine() {
        let (_dir, audit) = seeded();

        let main_only = AuditFilter {
            wallet: Some("main".into()),
            ..AuditFilter::default()
        };
        assert_eq!(audit.query(&main_only).unwrap().len(), 3);

        let ethereum = AuditFilter {
            chain: Some(Chain::Ethereum),
            ..main_only.clone()
        };
        let entries = audit.query(&ethereum).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, "address");

        let signs_on_cold = AuditFilter {
            wallet: Some("cold".into()),
            operation: Some(Operation::Sign),
            ..AuditFilter::default()
        };
        assert!(audit.query(&signs_on_cold).unwrap().is_empty());
    }

    #[test]
    fn limit_and_since() {
        let (_dir, audit) = seeded();

        let two = AuditFilter {
            limit: 2,
            ..AuditFilter::default()
        };
        assert_eq!(audit.query(&two).unwrap().len(), 2);

        let recent = AuditFilter {
            since: Some(Utc::now() - chrono::TimeDelta::hours(1)),
            ..AuditFilter::default()
        };
        assert_eq!(audit.query(&recent).unwrap().len(), 4);

        let future = AuditFilter {
            since: Some(Utc::now() + chrono::TimeDelta::hours(1)),
            ..AuditFilter::default()
        };
        assert!(audit.query(&future).unwrap().is_empty());
    }

    #[test]
    fn record_writes_through_the_module_entry_point() {
        let dir = TempDir::new().unwrap();
        crate::audit::record(dir.path(), &AuditEvent::new(Operation::RotateKey, "main"));
        let audit = AuditLog::open(dir.path()).unwrap();
        assert_eq!(audit.query(&AuditFilter::default()).unwrap()[0].operation, "rotate-key");
    }

    #[test]
    fn unavailable_directory_yields_none() {
        assert!(AuditLog::open(Path::new("/nonexistent/walletseal/audit")).is_none());
        // And recording there is a silent no-op.
        crate::audit::record(
            Path::new("/nonexistent/walletseal/audit"),
            &AuditEvent::new(Operation::Init, "main"),
        );
    }

    #[cfg(unix)]
    #[test]
    fn database_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let _audit = AuditLog::open(dir.path()).unwrap();
        let mode = std::fs::metadata(dir.path().join(DB_FILE))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
