//! Signing identity.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized
//! - Only signatures and the public key leave the process

use ed25519_dalek::{Signer, SigningKey};

use crate::config::schema::IdentityConfig;
use crate::ledger::types::{AccountAddress, Ed25519Signature, LedgerError, LedgerResult};

/// Prefix used by some wallets when exporting ed25519 keys.
const KEY_EXPORT_PREFIX: &str = "ed25519-priv-";

/// Wallet holding an ed25519 key and the account it signs for.
#[derive(Clone)]
pub struct Wallet {
    signing_key: SigningKey,
    address: AccountAddress,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key and an account address.
    ///
    /// # Arguments
    /// * `private_key_hex` - 32-byte key as hex (with or without 0x prefix)
    /// * `account` - Account address the key is authorized for
    pub fn from_private_key(private_key_hex: &str, account: &str) -> LedgerResult<Self> {
        let key = private_key_hex.trim();
        let key = key.strip_prefix(KEY_EXPORT_PREFIX).unwrap_or(key);
        let key_hex = key.strip_prefix("0x").unwrap_or(key);

        let mut secret = [0u8; 32];
        hex::decode_to_slice(key_hex, &mut secret)
            .map_err(|e| LedgerError::Wallet(format!("Invalid private key format: {}", e)))?;

        let address: AccountAddress = account
            .parse()
            .map_err(|_| LedgerError::Wallet(format!("Invalid account address '{}'", account)))?;

        let wallet = Self {
            signing_key: SigningKey::from_bytes(&secret),
            address,
        };

        tracing::info!(address = %wallet.address, "Wallet initialized");
        Ok(wallet)
    }

    /// Load a wallet from the environment variables named by `identity`.
    pub fn from_env(identity: &IdentityConfig) -> LedgerResult<Self> {
        let read = |name: &str| {
            std::env::var(name).map_err(|_| {
                LedgerError::Wallet(format!("Environment variable {} not set", name))
            })
        };

        let private_key = read(&identity.private_key_env)?;
        let account = read(&identity.account_env)?;
        Self::from_private_key(&private_key, &account)
    }

    /// Get the wallet's account address.
    pub fn address(&self) -> AccountAddress {
        self.address
    }

    /// Public key as `0x`-prefixed hex.
    pub fn public_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signing_key.verifying_key().to_bytes()))
    }

    /// Sign a message, returning the 64-byte signature as `0x`-prefixed hex.
    pub fn sign(&self, message: &[u8]) -> String {
        let signature = self.signing_key.sign(message);
        format!("0x{}", hex::encode(signature.to_bytes()))
    }

    /// Signature over `message` paired with this wallet's public key.
    pub fn signature_for(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature {
            public_key: self.public_key_hex(),
            signature: self.sign(message),
        }
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("public_key", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}
