//! The signing boundary.
//!
//! A vault starts out [`LockedVault`]. Unlocking it with the right password
//! yields an [`UnlockedVault`] that holds the decrypted secret for exactly
//! one signing operation. Signing consumes the unlocked state; so does
//! [`UnlockedVault::lock`]. Either way the secret is zeroized when the
//! value drops, including on every error path.
//!
//! Nothing in here performs I/O. Vaults come in by reference and signed
//! transactions go out by value.

pub mod ethereum;
pub mod key_material;
pub mod request;
pub mod rlp;
pub mod solana;

pub use ethereum::{Address, EthereumSigner, EthereumTransaction, FeeModel};
pub use key_material::{check_secret, generate_mnemonic};
pub use request::{Chain, SignedTransaction, SigningRequest};
pub use solana::{AccountMeta, Blockhash, Instruction, Pubkey, SolanaSigner, SolanaTransaction};

use tracing::{debug, info};

use crate::errors::SigningError;
use crate::secret::SecretBytes;
use crate::vault::EncryptedVault;

/// A vault whose secret is still encrypted.
#[derive(Debug, Clone, Copy)]
pub struct LockedVault<'a> {
    vault: &'a EncryptedVault,
}

impl<'a> LockedVault<'a> {
    pub fn new(vault: &'a EncryptedVault) -> Self {
        Self { vault }
    }

    /// Decrypt the vault.
    ///
    /// On failure nothing changes: the caller keeps this locked vault and
    /// may try again with another password.
    pub fn unlock(&self, password: &[u8]) -> Result<UnlockedVault<'a>, SigningError> {
        let secret = self.vault.open(password).map_err(SigningError::Unlock)?;
        debug!("vault unlocked");
        Ok(UnlockedVault {
            vault: self.vault,
            secret,
        })
    }

    pub fn vault(&self) -> &'a EncryptedVault {
        self.vault
    }
}

/// A vault with its plaintext secret in memory.
///
/// Deliberately neither `Clone` nor `Debug`-revealing: the secret lives in
/// one place and dies with this value.
pub struct UnlockedVault<'a> {
    vault: &'a EncryptedVault,
    secret: SecretBytes,
}

impl<'a> UnlockedVault<'a> {
    /// Sign one request, consuming the unlocked state.
    pub fn sign(self, request: SigningRequest) -> Result<SignedTransaction, SigningError> {
        let chain = request.chain();
        let signed = match &request {
            SigningRequest::Ethereum(tx) => {
                let signer = EthereumSigner::new(key_material::ethereum_key(&self.secret)?);
                signer.sign(tx)?
            }
            SigningRequest::Solana(tx) => {
                let signer = SolanaSigner::new(key_material::solana_key(&self.secret)?);
                signer.sign(tx)?
            }
        };

        info!(%chain, signer = %signed.signer, "transaction signed");
        Ok(signed)
    }

    /// The wallet's address on `chain`, without signing anything.
    pub fn address(&self, chain: Chain) -> Result<String, SigningError> {
        let address = address_for(&self.secret, chain)?;
        debug!(%chain, %address, "derived wallet address");
        Ok(address)
    }

    /// Drop the secret and return to the locked state.
    pub fn lock(self) -> LockedVault<'a> {
        LockedVault::new(self.vault)
    }
}

impl std::fmt::Debug for UnlockedVault<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnlockedVault")
            .field("secret", &self.secret)
            .finish_non_exhaustive()
    }
}

/// The address `secret` controls on `chain`, in the chain's native format.
pub fn address_for(secret: &SecretBytes, chain: Chain) -> Result<String, SigningError> {
    Ok(match chain {
        Chain::Ethereum => EthereumSigner::new(key_material::ethereum_key(secret)?)
            .address()
            .to_checksum(),
        Chain::Solana => SolanaSigner::new(key_material::solana_key(secret)?)
            .pubkey()
            .to_string(),
    })
}

/// Unlock `vault` with `password`, sign `request`, and lock again.
pub fn sign(
    vault: &EncryptedVault,
    password: &[u8],
    request: SigningRequest,
) -> Result<SignedTransaction, SigningError> {
    LockedVault::new(vault).unlock(password)?.sign(request)
}
