//! History of wallet operations.
//!
//! Commands describe what they did as an [`AuditEvent`] and hand it to
//! [`record`]. With the `audit-log` feature the event lands in
//! `<vault_dir>/audit.db`; without it, `record` does nothing. Events hold
//! the wallet name, the chain and public facts (signer address, transaction
//! hash). There is no field for a password, a secret or a raw transaction.

#[cfg(feature = "audit-log")]
mod db;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};

use crate::errors::{Result, WalletSealError};
use crate::signing::{Chain, SignedTransaction};

#[cfg(feature = "audit-log")]
pub use db::{AuditEntry, AuditFilter, AuditLog};

/// Operations that leave an audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Operation {
    Init,
    Address,
    Sign,
    RotateKey,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Init => "init",
            Operation::Address => "address",
            Operation::Sign => "sign",
            Operation::RotateKey => "rotate-key",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = WalletSealError;

    fn from_str(s: &str) -> Result<Self> {
        [
            Operation::Init,
            Operation::Address,
            Operation::Sign,
            Operation::RotateKey,
            Operation::Delete,
        ]
        .into_iter()
        .find(|op| op.as_str() == s)
        .ok_or_else(|| WalletSealError::AuditError(format!("unknown operation '{s}'")))
    }
}

/// One operation on one wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub operation: Operation,
    pub wallet: String,
    pub chain: Option<Chain>,
    pub signer: Option<String>,
    pub tx_hash: Option<String>,
    pub note: Option<String>,
}

impl AuditEvent {
    pub fn new(operation: Operation, wallet: &str) -> Self {
        Self {
            operation,
            wallet: wallet.to_string(),
            chain: None,
            signer: None,
            tx_hash: None,
            note: None,
        }
    }

    /// The address the wallet showed on `chain`.
    pub fn address(mut self, chain: Chain, address: &str) -> Self {
        self.chain = Some(chain);
        self.signer = Some(address.to_string());
        self
    }

    /// Chain, signer and transaction hash of a signed transaction.
    pub fn signed(mut self, signed: &SignedTransaction) -> Self {
        self.chain = Some(signed.chain);
        self.signer = Some(signed.signer.clone());
        self.tx_hash = Some(signed.tx_hash.clone());
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Append `event` to the audit log in `vault_dir`.
///
/// Never fails the calling command: an unavailable database is traced and
/// skipped.
pub fn record(vault_dir: &Path, event: &AuditEvent) {
    #[cfg(feature = "audit-log")]
    {
        match AuditLog::open(vault_dir) {
            Some(audit) => audit.log(event),
            None => tracing::debug!(dir = %vault_dir.display(), "audit log unavailable"),
        }
    }

    #[cfg(not(feature = "audit-log"))]
    let _ = (vault_dir, event);
}

/// Turn a look-back window like `7d`, `24h`, `30m` or `2w` into the
/// earliest timestamp it covers, counting back from `now`.
pub fn parse_since(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let input = input.trim();
    let invalid = || {
        WalletSealError::CommandFailed(format!(
            "invalid duration '{input}': use a count and a unit, e.g. 7d, 24h, 30m or 2w"
        ))
    };

    let unit = input.chars().last().ok_or_else(invalid)?;
    let count: i64 = input[..input.len() - unit.len_utf8()]
        .parse()
        .map_err(|_| invalid())?;
    if count < 0 {
        return Err(invalid());
    }

    let window = match unit {
        'm' => TimeDelta::try_minutes(count),
        'h' => TimeDelta::try_hours(count),
        'd' => TimeDelta::try_days(count),
        'w' => TimeDelta::try_weeks(count),
        _ => return Err(invalid()),
    };

    window
        .and_then(|w| now.checked_sub_signed(w))
        .ok_or_else(|| {
            WalletSealError::CommandFailed(format!("duration '{input}' reaches past the calendar"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noon() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn since_counts_back_from_now() {
        let now = noon();
        assert_eq!(parse_since("30m", now).unwrap(), now - TimeDelta::minutes(30));
        assert_eq!(parse_since("24h", now).unwrap(), now - TimeDelta::days(1));
        assert_eq!(parse_since(" 7d ", now).unwrap(), now - TimeDelta::days(7));
        assert_eq!(parse_since("2w", now).unwrap(), now - TimeDelta::days(14));
        assert_eq!(parse_since("0h", now).unwrap(), now);
    }

    #[test]
    fn since_rejects_malformed_windows() {
        for bad in ["", "d", "7", "7x", "-3d", "1.5h", "7dé", "é"] {
            assert!(parse_since(bad, noon()).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn since_overflow_is_an_error_not_a_panic() {
        let err = parse_since("999999999999999d", noon()).unwrap_err();
        assert!(matches!(err, WalletSealError::CommandFailed(_)));
        assert!(parse_since("9223372036854775807m", noon()).is_err());
        // In range for TimeDelta, but earlier than any representable date.
        assert!(parse_since("99999999999d", noon()).is_err());
    }

    #[test]
    fn operation_names_round_trip() {
        for op in [
            Operation::Init,
            Operation::Address,
            Operation::Sign,
            Operation::RotateKey,
            Operation::Delete,
        ] {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
        assert!("export".parse::<Operation>().is_err());
    }

    #[test]
    fn signed_event_carries_only_public_facts() {
        let signed = SignedTransaction {
            chain: Chain::Solana,
            signer: "payer".into(),
            raw: vec![1, 2, 3],
            signature: vec![4; 64],
            tx_hash: "sig58".into(),
        };
        let event = AuditEvent::new(Operation::Sign, "main").signed(&signed);
        assert_eq!(event.chain, Some(Chain::Solana));
        assert_eq!(event.signer.as_deref(), Some("payer"));
        assert_eq!(event.tx_hash.as_deref(), Some("sig58"));
        assert!(event.note.is_none());
    }
}
