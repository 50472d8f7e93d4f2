//! Injected source of randomness for salts, IVs and fresh mnemonics.
//!
//! Nothing in the crypto layer reaches for a global RNG; every function
//! that needs entropy takes a `&dyn CryptoProvider`.  Production code uses
//! [`OsProvider`]; tests supply fixed or counting providers.

use rand::TryRngCore;

use crate::errors::CryptoError;

/// A cryptographically secure random source.
pub trait CryptoProvider: Send + Sync {
    /// Fill `dest` entirely with random bytes.
    fn fill_random(&self, dest: &mut [u8]) -> Result<(), CryptoError>;
}

/// The operating-system RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsProvider;

impl CryptoProvider for OsProvider {
    fn fill_random(&self, dest: &mut [u8]) -> Result<(), CryptoError> {
        rand::rngs::OsRng
            .try_fill_bytes(dest)
            .map_err(|e| CryptoError::Unavailable(format!("OS random source: {e}")))
    }
}

/// Draw a fixed-size array from `provider`.
pub(crate) fn random_array<const N: usize>(
    provider: &dyn CryptoProvider,
) -> Result<[u8; N], CryptoError> {
    let mut out = [0u8; N];
    provider.fill_random(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_provider_fills_buffer() {
        let a: [u8; 32] = random_array(&OsProvider).unwrap();
        let b: [u8; 32] = random_array(&OsProvider).unwrap();
        assert_ne!(a, b);
    }

    struct Broken;

    impl CryptoProvider for Broken {
        fn fill_random(&self, _dest: &mut [u8]) -> Result<(), CryptoError> {
            Err(CryptoError::Unavailable("no entropy".into()))
        }
    }

    #[test]
    fn provider_failure_propagates() {
        let result: Result<[u8; 12], _> = random_array(&Broken);
        assert!(matches!(result, Err(CryptoError::Unavailable(_))));
    }
}
