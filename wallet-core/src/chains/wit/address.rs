// wallet-core/src/chains/wit/address.rs
//
// Witnet Address Module
// Public Key (33B compressed) → SHA-256 → PKH (20B) → Bech32("wit", PKH)
//
// Lưu ý: PKH dùng SHA-256 cắt 20 bytes, KHÔNG phải HASH160 (HASH160 chỉ dùng
// cho fingerprint của extended key).

use crate::crypto::hash::sha256;
use crate::crypto::keys::PublicKey;
use crate::encoding::bech32;
use crate::error::TransactionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mainnet address prefix.
pub const MAINNET_HRP: &str = "wit";
/// Testnet address prefix.
pub const TESTNET_HRP: &str = "twit";

pub const PKH_LEN: usize = 20;

/// `SHA-256(compressed pubkey)[0..20]`
pub fn pubkey_to_pkh(public_key: &PublicKey) -> [u8; PKH_LEN] {
    let digest = sha256(&public_key.to_bytes(true));
    let mut pkh = [0u8; PKH_LEN];
    pkh.copy_from_slice(&digest[..PKH_LEN]);
    pkh
}

/// Bech32 address of a public key under `hrp`.
pub fn pubkey_to_address(public_key: &PublicKey, hrp: &str) -> String {
    bech32::encode_bytes(hrp, &pubkey_to_pkh(public_key))
}

/// Validated Witnet address: prefix + 20-byte public key hash.
///
/// Serialized (JSON) as its Bech32 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct WitAddress {
    hrp: String,
    pkh: [u8; PKH_LEN],
}

impl WitAddress {
    pub fn new(hrp: impl Into<String>, pkh: [u8; PKH_LEN]) -> Self {
        Self {
            hrp: hrp.into(),
            pkh,
        }
    }

    /// Mainnet address of `public_key`.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self::new(MAINNET_HRP, pubkey_to_pkh(public_key))
    }

    pub fn from_public_key_with_hrp(public_key: &PublicKey, hrp: &str) -> Self {
        Self::new(hrp, pubkey_to_pkh(public_key))
    }

    /// Parses and requires the given prefix.
    pub fn parse_with_hrp(s: &str, hrp: &str) -> Result<Self, TransactionError> {
        let address: Self = s.parse()?;
        if address.hrp != hrp {
            return Err(TransactionError::InvalidAddress(format!(
                "'{}' has prefix '{}', expected '{}'",
                s, address.hrp, hrp
            )));
        }
        Ok(address)
    }

    #[inline]
    pub fn hrp(&self) -> &str {
        &self.hrp
    }

    #[inline]
    pub fn pkh(&self) -> &[u8; PKH_LEN] {
        &self.pkh
    }

    /// `true` iff `s` parses as an address with a 20-byte payload.
    pub fn is_valid(s: &str) -> bool {
        s.parse::<Self>().is_ok()
    }
}

impl FromStr for WitAddress {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hrp, bytes) = bech32::decode_bytes(s, None)
            .map_err(|e| TransactionError::InvalidAddress(format!("'{}': {}", s, e)))?;
        let pkh: [u8; PKH_LEN] = bytes.as_slice().try_into().map_err(|_| {
            TransactionError::InvalidAddress(format!(
                "'{}' carries {} bytes, expected {}",
                s,
                bytes.len(),
                PKH_LEN
            ))
        })?;
        Ok(Self { hrp, pkh })
    }
}

impl fmt::Display for WitAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bech32::encode_bytes(&self.hrp, &self.pkh))
    }
}

impl From<WitAddress> for String {
    fn from(address: WitAddress) -> Self {
        address.to_string()
    }
}

impl TryFrom<String> for WitAddress {
    type Error = TransactionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
