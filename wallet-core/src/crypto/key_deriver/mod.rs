// wallet-core/src/crypto/key_deriver/mod.rs
//
// Key Derivation Engine - BIP-32 style HD tree on secp256k1
//
// Kiến trúc:
// ┌──────────────────────────────────────────────────────┐
// │  Seed (16..64 bytes, thường là BIP-39 seed 64 bytes) │
// │                    │ HMAC-SHA512("Bitcoin seed")     │
// │                    ▼                                 │
// │               Xprv (depth 0, path "m")               │
// │          child(i) │            │ to_xpub()           │
// │                   ▼            ▼                     │
// │            Xprv (depth+1)   Xpub (path "M")          │
// │                                │ child(i), i < 2^31  │
// │                                ▼                     │
// │                           Xpub (depth+1)             │
// └──────────────────────────────────────────────────────┘
//
// Chuỗi Base58Check (xprv.../xpub...) round-trip đầy đủ; dạng compact
// Bech32 "xprv1..." chỉ dành cho master key (xem `compact.rs`).

pub mod compact;
pub mod xprv;
pub mod xpub;

pub use xprv::Xprv;
pub use xpub::Xpub;

use super::curve::CurveRef;
use super::keys::{PrivateKey, PublicKey};
use super::paths::HARDENED_OFFSET;
use crate::encoding::base58;
use crate::error::{CryptoError, EncodingError, WalletError, WalletResult};

/// HMAC key for master key generation.
pub const MASTER_SEED_KEY: &[u8] = b"Bitcoin seed";

/// Consecutive indices skipped on an invalid child before giving up.
pub const MAX_INDEX_SKIPS: u32 = 8;

/// Serialized extended key body, without checksum.
pub const SERIALIZED_LEN: usize = 78;

pub const MIN_SEED_LEN: usize = 16;
pub const MAX_SEED_LEN: usize = 64;

// =============================================================================
// VERSION BYTES
// =============================================================================

/// Version prefixes of the Base58Check serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyVersions {
    pub private: [u8; 4],
    pub public: [u8; 4],
}

impl KeyVersions {
    /// `xprv` / `xpub`
    pub const MAINNET: Self = Self {
        private: [0x04, 0x88, 0xAD, 0xE4],
        public: [0x04, 0x88, 0xB2, 0x1E],
    };

    /// `tprv` / `tpub`
    pub const TESTNET: Self = Self {
        private: [0x04, 0x35, 0x83, 0x94],
        public: [0x04, 0x35, 0x87, 0xCF],
    };

    pub fn from_u32(private: u32, public: u32) -> Self {
        Self {
            private: private.to_be_bytes(),
            public: public.to_be_bytes(),
        }
    }
}

// =============================================================================
// SHARED METADATA
// =============================================================================

/// Tree position shared by [`Xprv`] and [`Xpub`].
///
/// Invariant: `depth == 0` ⇔ `index.is_none()` ⇔ `parent_fingerprint == [0; 4]`
/// ⇔ `path` is the bare root letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeyMeta {
    pub chain_code: [u8; 32],
    pub depth: u8,
    pub index: Option<u32>,
    pub parent_fingerprint: [u8; 4],
    pub path: String,
}

impl KeyMeta {
    pub fn root(chain_code: [u8; 32], root: char) -> Self {
        Self {
            chain_code,
            depth: 0,
            index: None,
            parent_fingerprint: [0; 4],
            path: root.to_string(),
        }
    }

    /// Metadata of the child at raw `index`.
    pub fn child(
        &self,
        chain_code: [u8; 32],
        index: u32,
        parent_fingerprint: [u8; 4],
    ) -> Result<Self, CryptoError> {
        let depth = self
            .depth
            .checked_add(1)
            .ok_or_else(|| CryptoError::KeyDerivation("maximum depth 255 reached".into()))?;
        let segment = if index >= HARDENED_OFFSET {
            format!("/{}h", index - HARDENED_OFFSET)
        } else {
            format!("/{}", index)
        };
        Ok(Self {
            chain_code,
            depth,
            index: Some(index),
            parent_fingerprint,
            path: format!("{}{}", self.path, segment),
        })
    }

    /// Same position rendered under another root letter.
    pub fn with_root(&self, root: char) -> Self {
        let mut meta = self.clone();
        let mut chars = meta.path.chars();
        chars.next();
        meta.path = format!("{}{}", root, chars.as_str());
        meta
    }

    #[inline]
    pub fn is_master(&self) -> bool {
        self.depth == 0 && self.index.is_none() && self.parent_fingerprint == [0; 4]
    }

    /// `version ‖ depth ‖ parent fp ‖ index ‖ chain code ‖ key data`
    pub fn serialize(&self, version: [u8; 4], key_data: &[u8; 33]) -> [u8; SERIALIZED_LEN] {
        let mut out = [0u8; SERIALIZED_LEN];
        out[0..4].copy_from_slice(&version);
        out[4] = self.depth;
        out[5..9].copy_from_slice(&self.parent_fingerprint);
        out[9..13].copy_from_slice(&self.index.unwrap_or(0).to_be_bytes());
        out[13..45].copy_from_slice(&self.chain_code);
        out[45..78].copy_from_slice(key_data);
        out
    }

    /// Parses the 78-byte body; returns version, metadata and key data.
    ///
    /// Non-root keys get the placeholder path `<root>/x/.../<index>` since
    /// their ancestors are unknown.
    pub fn deserialize(
        data: &[u8],
        root_for: impl Fn(&[u8; 4]) -> Option<char>,
    ) -> Result<([u8; 4], Self, [u8; 33]), CryptoError> {
        if data.len() != SERIALIZED_LEN {
            return Err(CryptoError::InvalidKeyFormat(format!(
                "extended key must be {} bytes, got {}",
                SERIALIZED_LEN,
                data.len()
            )));
        }
        let mut version = [0u8; 4];
        version.copy_from_slice(&data[0..4]);
        let root = root_for(&version).ok_or_else(|| {
            CryptoError::InvalidKeyFormat(format!("unknown version bytes {}", hex::encode(version)))
        })?;

        let depth = data[4];
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&data[5..9]);
        let raw_index = u32::from_be_bytes([data[9], data[10], data[11], data[12]]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&data[13..45]);
        let mut key_data = [0u8; 33];
        key_data.copy_from_slice(&data[45..78]);

        let meta = if depth == 0 {
            if parent_fingerprint != [0; 4] || raw_index != 0 {
                return Err(CryptoError::InvalidKeyFormat(
                    "root key with non-zero parent fingerprint or index".into(),
                ));
            }
            Self::root(chain_code, root)
        } else {
            if parent_fingerprint == [0; 4] {
                return Err(CryptoError::InvalidKeyFormat(
                    "derived key with zero parent fingerprint".into(),
                ));
            }
            let mut path = root.to_string();
            for _ in 1..depth {
                path.push_str("/x");
            }
            if raw_index >= HARDENED_OFFSET {
                path.push_str(&format!("/{}h", raw_index - HARDENED_OFFSET));
            } else {
                path.push_str(&format!("/{}", raw_index));
            }
            Self {
                chain_code,
                depth,
                index: Some(raw_index),
                parent_fingerprint,
                path,
            }
        };
        Ok((version, meta, key_data))
    }
}

/// Next index to try after an invalid child, never crossing the
/// hardened boundary.
pub(crate) fn next_child_index(index: u32) -> Option<u32> {
    let next = index.checked_add(1)?;
    if (index < HARDENED_OFFSET) != (next < HARDENED_OFFSET) {
        return None;
    }
    Some(next)
}

/// `16 ≤ len(seed) ≤ 64`
pub(crate) fn check_seed_len(seed: &[u8]) -> Result<(), CryptoError> {
    if !(MIN_SEED_LEN..=MAX_SEED_LEN).contains(&seed.len()) {
        return Err(CryptoError::InvalidSeedLength(seed.len()));
    }
    Ok(())
}

// =============================================================================
// EXTENDED KEY (decoded either way)
// =============================================================================

/// Result of decoding a Base58Check extended key of unknown kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtendedKey {
    Private(Xprv),
    Public(Xpub),
}

impl ExtendedKey {
    /// Decodes with mainnet or testnet version bytes.
    pub fn decode(curve: CurveRef, s: &str) -> WalletResult<Self> {
        Self::decode_with(curve, s, &[KeyVersions::MAINNET, KeyVersions::TESTNET])
    }

    /// Decodes and validates checksum, length, version and key material.
    pub fn decode_with(curve: CurveRef, s: &str, versions: &[KeyVersions]) -> WalletResult<Self> {
        let data = base58::check_decode(s)?;
        if data.len() != SERIALIZED_LEN {
            return Err(WalletError::Encoding(EncodingError::InvalidLength {
                expected: SERIALIZED_LEN,
                actual: data.len(),
            }));
        }

        let (version, meta, key_data) = KeyMeta::deserialize(&data, |v| {
            if versions.iter().any(|kv| &kv.private == v) {
                Some('m')
            } else if versions.iter().any(|kv| &kv.public == v) {
                Some('M')
            } else {
                None
            }
        })?;

        if versions.iter().any(|kv| kv.private == version) {
            if key_data[0] != 0x00 {
                return Err(WalletError::Crypto(CryptoError::InvalidKeyFormat(
                    "private key data must start with 0x00".into(),
                )));
            }
            let key = PrivateKey::from_bytes(curve, &key_data[1..])?;
            Ok(ExtendedKey::Private(Xprv::from_parts(key, meta)))
        } else {
            let key = PublicKey::from_bytes(curve, &key_data)?;
            Ok(ExtendedKey::Public(Xpub::from_parts(key, meta)))
        }
    }

    #[inline]
    pub fn is_private(&self) -> bool {
        matches!(self, ExtendedKey::Private(_))
    }

    pub fn depth(&self) -> u8 {
        match self {
            ExtendedKey::Private(k) => k.depth(),
            ExtendedKey::Public(k) => k.depth(),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            ExtendedKey::Private(k) => k.path(),
            ExtendedKey::Public(k) => k.path(),
        }
    }

    /// Public half (identity for an [`Xpub`]).
    pub fn to_xpub(&self) -> Xpub {
        match self {
            ExtendedKey::Private(k) => k.to_xpub(),
            ExtendedKey::Public(k) => k.clone(),
        }
    }

    pub fn into_xprv(self) -> Option<Xprv> {
        match self {
            ExtendedKey::Private(k) => Some(k),
            ExtendedKey::Public(_) => None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::curve::Curve;
    use std::sync::Arc;

    const V1_XPUB_M0H1: &str = "xpub6ASuArnXKPbfEwhqN6e3mwBcDTgzisQN1wXN9BJcM47sSikHjJf3UFHKkNAWbWMiGj7Wf5uMash7SyYq527Hqck2AxYysAA7xmALppuCkwQ";
    const V1_XPRV_M0H: &str = "xprv9uHRZZhk6KAJC1avXpDAp4MDc3sQKNxDiPvvkX8Br5ngLNv1TxvUxt4cV1rGL5hj6KCesnDYUhd7oWgT11eZG7XnxHrnYeSvkzY7d2bhkJ7";

    #[test]
    fn test_decode_dispatches_on_version() {
        let curve = Curve::secp256k1();
        let public = ExtendedKey::decode(Arc::clone(&curve), V1_XPUB_M0H1).unwrap();
        assert!(!public.is_private());
        assert_eq!(public.depth(), 2);
        assert_eq!(public.path(), "M/x/1");

        let private = ExtendedKey::decode(curve, V1_XPRV_M0H).unwrap();
        assert!(private.is_private());
        assert_eq!(private.path(), "m/0h");
        assert!(private.into_xprv().is_some());
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let curve = Curve::secp256k1();
        let mut data = base58::check_decode(V1_XPRV_M0H).unwrap();
        data[0] = 0x01;
        let forged = base58::check_encode(&data);
        assert!(matches!(
            ExtendedKey::decode(curve, &forged),
            Err(WalletError::Crypto(CryptoError::InvalidKeyFormat(_)))
        ));
    }

    #[test]
    fn test_decode_rejects_leftover_bytes() {
        let curve = Curve::secp256k1();
        let mut data = base58::check_decode(V1_XPRV_M0H).unwrap();
        data.push(0x00);
        let padded = base58::check_encode(&data);
        assert!(matches!(
            ExtendedKey::decode(curve, &padded),
            Err(WalletError::Encoding(EncodingError::InvalidLength { .. }))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_checksum() {
        let curve = Curve::secp256k1();
        let mut tampered = V1_XPRV_M0H.to_string();
        tampered.pop();
        tampered.push('8');
        assert!(ExtendedKey::decode(curve, &tampered).is_err());
    }

    #[test]
    fn test_root_invariant_enforced_on_decode() {
        let curve = Curve::secp256k1();
        let mut data = base58::check_decode(V1_XPRV_M0H).unwrap();
        // depth 0 but keep the parent fingerprint
        data[4] = 0;
        let forged = base58::check_encode(&data);
        assert!(ExtendedKey::decode(curve, &forged).is_err());
    }

    #[test]
    fn test_next_child_index_boundaries() {
        assert_eq!(next_child_index(0), Some(1));
        assert_eq!(next_child_index(HARDENED_OFFSET - 1), None);
        assert_eq!(next_child_index(HARDENED_OFFSET), Some(HARDENED_OFFSET + 1));
        assert_eq!(next_child_index(u32::MAX), None);
    }

    #[test]
    fn test_versions_from_u32() {
        assert_eq!(
            KeyVersions::from_u32(0x0488ADE4, 0x0488B21E),
            KeyVersions::MAINNET
        );
    }
}
