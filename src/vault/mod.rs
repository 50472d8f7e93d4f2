//! Vault module: encrypted wallet secrets at rest.
//!
//! This module provides:
//! - The `EncryptedVault` record and its text wire form (`format`)
//! - Sealing, opening and re-sealing a secret under a password (`seal`)
//! - Atomic vault files on disk (`store`)

pub mod format;
pub mod seal;
pub mod store;

// Re-export the most commonly used items.
pub use format::{EncryptedVault, CURRENT_VERSION};
pub use store::{read_vault, write_vault, WalletInfo};
