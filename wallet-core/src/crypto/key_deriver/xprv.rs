// wallet-core/src/crypto/key_deriver/xprv.rs
//
// Extended Private Key (xprv): seed → master, CKDpriv, Base58Check
// Reference: https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki

use super::xpub::Xpub;
use super::{
    check_seed_len, next_child_index, ExtendedKey, KeyMeta, KeyVersions, MASTER_SEED_KEY,
    MAX_INDEX_SKIPS,
};
use crate::chains::wit::address::{pubkey_to_address, MAINNET_HRP};
use crate::crypto::curve::CurveRef;
use crate::crypto::hash::{hash160, hmac_sha512};
use crate::crypto::keys::{PrivateKey, PublicKey};
use crate::crypto::mnemonic::Mnemonic;
use crate::crypto::paths::{DerivationPath, HARDENED_OFFSET};
use crate::encoding::base58;
use crate::error::{CryptoError, WalletError, WalletResult};
use num_bigint::BigUint;
use num_traits::Zero;
use std::fmt;
use zeroize::Zeroizing;

/// Extended private key: private scalar + chain code + tree position.
///
/// # Security
/// - Private key bytes are `Zeroizing` (see [`PrivateKey`])
/// - `Debug` prints the path only
#[derive(Clone, PartialEq, Eq)]
pub struct Xprv {
    key: PrivateKey,
    meta: KeyMeta,
}

impl fmt::Debug for Xprv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Xprv")
            .field("path", &self.meta.path)
            .field("depth", &self.meta.depth)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl Xprv {
    // =========================================================================
    // CONSTRUCTORS
    // =========================================================================

    /// Master key: `I = HMAC-SHA512("Bitcoin seed", seed)`.
    ///
    /// # Errors
    /// - `InvalidSeedLength` unless `16 <= len(seed) <= 64`
    /// - `KeyDerivation` if `I_L` is zero or not below N
    pub fn from_seed(curve: CurveRef, seed: &[u8]) -> Result<Self, CryptoError> {
        Self::from_seed_with_key(curve, seed, MASTER_SEED_KEY)
    }

    /// Same as [`Xprv::from_seed`] with a custom HMAC key.
    pub fn from_seed_with_key(
        curve: CurveRef,
        seed: &[u8],
        hmac_key: &[u8],
    ) -> Result<Self, CryptoError> {
        check_seed_len(seed)?;
        let (il, ir) = hmac_sha512(hmac_key, &[seed]);
        let il = Zeroizing::new(il);
        let key = PrivateKey::from_bytes(curve, &*il).map_err(|_| {
            CryptoError::KeyDerivation("master key is zero or exceeds the curve order".into())
        })?;
        log::debug!("derived master key from {}-byte seed", seed.len());
        Ok(Self {
            key,
            meta: KeyMeta::root(ir, 'm'),
        })
    }

    /// Mnemonic phrase → BIP-39 seed → master key.
    pub fn from_mnemonic(curve: CurveRef, phrase: &str, passphrase: &str) -> WalletResult<Self> {
        let seed = Mnemonic::to_seed(phrase, passphrase);
        Ok(Self::from_seed(curve, &*seed)?)
    }

    /// Decodes a Base58Check `xprv...` / `tprv...` string.
    pub fn decode(curve: CurveRef, s: &str) -> WalletResult<Self> {
        ExtendedKey::decode(curve, s)?.into_xprv().ok_or_else(|| {
            WalletError::Crypto(CryptoError::InvalidKeyFormat(
                "expected an extended private key".into(),
            ))
        })
    }

    pub(crate) fn from_parts(key: PrivateKey, meta: KeyMeta) -> Self {
        Self { key, meta }
    }

    // =========================================================================
    // GETTERS
    // =========================================================================

    #[inline]
    pub fn private_key(&self) -> &PrivateKey {
        &self.key
    }

    #[inline]
    pub fn public_key(&self) -> PublicKey {
        self.key.to_public()
    }

    #[inline]
    pub fn chain_code(&self) -> &[u8; 32] {
        &self.meta.chain_code
    }

    #[inline]
    pub fn depth(&self) -> u8 {
        self.meta.depth
    }

    /// Raw child index, `None` for the master key.
    #[inline]
    pub fn index(&self) -> Option<u32> {
        self.meta.index
    }

    #[inline]
    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.meta.parent_fingerprint
    }

    /// `m/...` with `h` marking hardened levels.
    #[inline]
    pub fn path(&self) -> &str {
        &self.meta.path
    }

    #[inline]
    pub fn is_master(&self) -> bool {
        self.meta.is_master()
    }

    /// HASH160 of the compressed public key.
    pub fn identifier(&self) -> [u8; 20] {
        hash160(&self.public_key().to_bytes(true))
    }

    pub fn fingerprint(&self) -> [u8; 4] {
        let id = self.identifier();
        [id[0], id[1], id[2], id[3]]
    }

    /// `wit1...` address of this node's key.
    pub fn address(&self) -> String {
        self.address_with_hrp(MAINNET_HRP)
    }

    pub fn address_with_hrp(&self, hrp: &str) -> String {
        pubkey_to_address(&self.public_key(), hrp)
    }

    // =========================================================================
    // DERIVATION
    // =========================================================================

    /// CKDpriv. Hardened iff `index >= 2^31`.
    ///
    /// If `I_L >= N` or the child scalar is zero, the next index is tried,
    /// at most [`MAX_INDEX_SKIPS`] times and never across the hardened
    /// boundary. The returned key records the index actually used.
    pub fn child(&self, index: u32) -> Result<Self, CryptoError> {
        let curve = self.key.curve();
        let n = curve.n();
        let parent = self.key.scalar();
        let parent_fingerprint = self.fingerprint();
        let parent_pubkey = self.public_key().to_bytes(true);

        let mut i = index;
        for attempt in 0..=MAX_INDEX_SKIPS {
            if attempt > 0 {
                i = next_child_index(i).ok_or_else(|| {
                    CryptoError::KeyDerivation(format!("no valid child near index {}", index))
                })?;
            }

            let index_bytes = i.to_be_bytes();
            let (il, ir) = if i >= HARDENED_OFFSET {
                let mut data = Zeroizing::new([0u8; 33]);
                data[1..].copy_from_slice(self.key.as_bytes());
                hmac_sha512(&self.meta.chain_code, &[&data[..], &index_bytes])
            } else {
                hmac_sha512(&self.meta.chain_code, &[&parent_pubkey, &index_bytes])
            };
            let il = Zeroizing::new(il);

            let tweak = BigUint::from_bytes_be(&*il);
            let scalar = (&tweak + &parent) % n;
            if &tweak >= n || scalar.is_zero() {
                log::warn!(
                    "invalid child at index {} of {}, skipping to the next index",
                    i,
                    self.meta.path
                );
                continue;
            }

            let key = PrivateKey::from_scalar_unchecked(curve.clone(), &scalar);
            let meta = self.meta.child(ir, i, parent_fingerprint)?;
            log::debug!("derived private child {}", meta.path);
            return Ok(Self { key, meta });
        }

        Err(CryptoError::KeyDerivation(format!(
            "no valid child within {} indices of {}",
            MAX_INDEX_SKIPS, index
        )))
    }

    /// Walks `path` from this key. A leading `m` is relative to `self`.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self, CryptoError> {
        let mut node = self.clone();
        for child in path {
            node = node.child(child.raw())?;
        }
        Ok(node)
    }

    /// Parses and walks a path string such as `m/3'/4919'/0'/0/0`.
    pub fn derive(&self, path: &str) -> Result<Self, CryptoError> {
        self.derive_path(&path.parse()?)
    }

    /// Neutered key, path root `M`.
    pub fn to_xpub(&self) -> Xpub {
        Xpub::from_parts(self.public_key(), self.meta.with_root('M'))
    }

    /// `self.to_xpub().child(index)`; hardened indices fail.
    pub fn to_child_xpub(&self, index: u32) -> Result<Xpub, CryptoError> {
        self.to_xpub().child(index)
    }

    // =========================================================================
    // SERIALIZATION
    // =========================================================================

    /// 78-byte body with `0x00 ‖ key` as key data.
    pub fn serialize(&self, versions: &KeyVersions) -> Zeroizing<[u8; 78]> {
        let mut key_data = Zeroizing::new([0u8; 33]);
        key_data[1..].copy_from_slice(self.key.as_bytes());
        Zeroizing::new(self.meta.serialize(versions.private, &key_data))
    }

    /// Base58Check `xprv...` (mainnet versions).
    pub fn encode(&self) -> Zeroizing<String> {
        self.encode_with(&KeyVersions::MAINNET)
    }

    pub fn encode_with(&self, versions: &KeyVersions) -> Zeroizing<String> {
        Zeroizing::new(base58::check_encode(&*self.serialize(versions)))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::curve::Curve;
    use num_traits::One;
    use std::str::FromStr;
    use std::sync::Arc;

    const V1_SEED: &str = "000102030405060708090a0b0c0d0e0f";
    const V1_M_XPRV: &str = "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi";
    const V1_M0H_XPRV: &str = "xprv9uHRZZhk6KAJC1avXpDAp4MDc3sQKNxDiPvvkX8Br5ngLNv1TxvUxt4cV1rGL5hj6KCesnDYUhd7oWgT11eZG7XnxHrnYeSvkzY7d2bhkJ7";

    const TEST_MNEMONIC: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn v1_master() -> Xprv {
        let seed = hex::decode(V1_SEED).unwrap();
        Xprv::from_seed(Curve::secp256k1(), &seed).unwrap()
    }

    #[test]
    fn test_bip32_vector1_master() {
        let master = v1_master();
        assert!(master.is_master());
        assert_eq!(master.path(), "m");
        assert_eq!(master.index(), None);
        assert_eq!(hex::encode(master.fingerprint()), "3442193e");
        assert_eq!(master.encode().as_str(), V1_M_XPRV);
    }

    #[test]
    fn test_bip32_vector1_hardened_child() {
        let child = v1_master().child(HARDENED_OFFSET).unwrap();
        assert_eq!(child.path(), "m/0h");
        assert_eq!(child.depth(), 1);
        assert_eq!(child.index(), Some(HARDENED_OFFSET));
        assert_eq!(hex::encode(child.parent_fingerprint()), "3442193e");
        assert_eq!(child.encode().as_str(), V1_M0H_XPRV);
        assert!(!child.is_master());
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let child = v1_master().derive("m/0'/1").unwrap();
        let decoded = Xprv::decode(Curve::secp256k1(), &child.encode()).unwrap();
        assert_eq!(decoded.private_key(), child.private_key());
        assert_eq!(decoded.chain_code(), child.chain_code());
        assert_eq!(decoded.index(), child.index());
        assert_eq!(decoded.parent_fingerprint(), child.parent_fingerprint());
        assert_eq!(decoded.path(), "m/x/1");
        assert_eq!(decoded.encode(), child.encode());

        let master = Xprv::decode(Curve::secp256k1(), V1_M_XPRV).unwrap();
        assert_eq!(master, v1_master());
    }

    #[test]
    fn test_seed_length_bounds() {
        let curve = Curve::secp256k1();
        assert_eq!(
            Xprv::from_seed(Arc::clone(&curve), &[1u8; 15]).unwrap_err(),
            CryptoError::InvalidSeedLength(15)
        );
        assert_eq!(
            Xprv::from_seed(Arc::clone(&curve), &[1u8; 65]).unwrap_err(),
            CryptoError::InvalidSeedLength(65)
        );
        assert!(Xprv::from_seed(Arc::clone(&curve), &[1u8; 16]).is_ok());
        assert!(Xprv::from_seed(curve, &[1u8; 64]).is_ok());
    }

    #[test]
    fn test_wallet_vector_addresses() {
        let master = Xprv::from_mnemonic(Curve::secp256k1(), TEST_MNEMONIC, "").unwrap();
        let first = master.derive("m/3'/4919'/0'/0/0").unwrap();
        let second = master.derive("m/3'/4919'/0'/0/1").unwrap();

        assert_eq!(first.address(), "wit174la8pevl74hczcpfepgmt036zkmjen4hu8zzs");
        assert_eq!(second.address(), "wit1cetlhcpqc3jxqxap6egql5py4jrgwnfzfsm6l7");
        assert_eq!(
            first.private_key().to_hex().as_str(),
            "663bb51d1a2f23e8732d224dbf399b39cc2fbe204797a1a779a965beeaad8a74"
        );
        assert_eq!(first.path(), "m/3h/4919h/0h/0/0");
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let a = v1_master().derive("m/44'/0'/5/7").unwrap();
        let b = v1_master().derive("m/44h/0h/5/7").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_matches_bip32_crate() {
        let seed = hex::decode(
            "fffcf9f6f3f0edeae7e4e1dedbd8d5d2cfccc9c6c3c0bdbab7b4b1aeaba8a5a29f9c999693908d8a8784817e7b7875726f6c696663605d5a5754514e4b484542",
        )
        .unwrap();
        let ours = Xprv::from_seed(Curve::secp256k1(), &seed)
            .unwrap()
            .derive("m/0/2147483647'/1/2147483646'/2")
            .unwrap();

        let path = bip32::DerivationPath::from_str("m/0/2147483647'/1/2147483646'/2").unwrap();
        let reference = bip32::XPrv::derive_from_path(&seed, &path).unwrap();
        assert_eq!(
            &ours.private_key().as_bytes()[..],
            &reference.private_key().to_bytes()[..]
        );
    }

    #[test]
    fn test_public_derivation_commutes() {
        let account = v1_master().derive("m/3'/4919'/0'").unwrap();
        for i in [0u32, 1, 17, 1000] {
            let via_private = account.child(i).unwrap().to_xpub();
            let via_public = account.to_xpub().child(i).unwrap();
            assert_eq!(via_private, via_public);
            assert_eq!(account.to_child_xpub(i).unwrap(), via_public);
        }
    }

    /// secp256k1 points with the order replaced by `n`, private key 1.
    /// A small `n` makes `I_L >= n` common.
    fn master_with_order(n: BigUint) -> Xprv {
        let secp = Curve::secp256k1();
        let (gx, gy) = secp.generator_coords();
        let curve = Curve::custom(
            "secp256k1-reduced-order",
            secp.p().clone(),
            secp.a().clone(),
            secp.b().clone(),
            (gx.clone(), gy.clone()),
            n,
        )
        .unwrap();
        let key = PrivateKey::from_int(curve, &BigUint::one()).unwrap();
        Xprv::from_parts(key, KeyMeta::root([7u8; 32], 'm'))
    }

    #[test]
    fn test_invalid_child_skips_to_next_index() {
        // half of all I_L values are >= 2^255
        let master = master_with_order(BigUint::one() << 255u32);
        let xpub = master.to_xpub();
        let mut skipped = 0;
        for i in 0u32..64 {
            match master.child(i) {
                Ok(child) => {
                    let used = child.index().unwrap();
                    assert!(used >= i && used <= i + MAX_INDEX_SKIPS);
                    assert_eq!(child.path(), format!("m/{}", used));
                    if used != i {
                        skipped += 1;
                    }
                    // both sides skip the same indices
                    assert_eq!(xpub.child(i).unwrap(), child.to_xpub());
                }
                Err(e) => {
                    assert!(matches!(e, CryptoError::KeyDerivation(_)));
                    assert!(xpub.child(i).is_err());
                }
            }
        }
        assert!(skipped > 0);
    }

    #[test]
    fn test_invalid_child_exhaustion() {
        // every I_L is >= 2
        let master = master_with_order(BigUint::from(2u32));
        assert!(matches!(master.child(0), Err(CryptoError::KeyDerivation(_))));
        assert!(matches!(master.to_xpub().child(0), Err(CryptoError::KeyDerivation(_))));

        // skipping never crosses into the hardened range or wraps past u32::MAX
        assert!(matches!(
            master.child(HARDENED_OFFSET - 1),
            Err(CryptoError::KeyDerivation(_))
        ));
        assert!(matches!(master.child(u32::MAX), Err(CryptoError::KeyDerivation(_))));
        assert!(matches!(
            master.derive("m/0"),
            Err(CryptoError::KeyDerivation(_))
        ));
    }

    #[test]
    fn test_to_child_xpub_rejects_hardened() {
        assert!(matches!(
            v1_master().to_child_xpub(HARDENED_OFFSET),
            Err(CryptoError::KeyDerivation(_))
        ));
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let out = format!("{:?}", v1_master());
        assert!(out.contains("REDACTED"));
        assert!(!out.contains("e8f32e72"));
    }
}
