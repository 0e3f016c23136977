// wallet-core/src/crypto/key_deriver/xpub.rs
//
// Extended Public Key (xpub): CKDpub, chỉ non-hardened children.

use super::{next_child_index, ExtendedKey, KeyMeta, KeyVersions, MAX_INDEX_SKIPS};
use crate::chains::wit::address::{pubkey_to_address, MAINNET_HRP};
use crate::crypto::curve::CurveRef;
use crate::crypto::hash::{hash160, hmac_sha512};
use crate::crypto::keys::PublicKey;
use crate::crypto::paths::HARDENED_OFFSET;
use crate::encoding::base58;
use crate::error::{CryptoError, WalletError, WalletResult};
use num_bigint::BigUint;

/// Extended public key. Path root is `M`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xpub {
    key: PublicKey,
    meta: KeyMeta,
}

impl Xpub {
    pub(crate) fn from_parts(key: PublicKey, meta: KeyMeta) -> Self {
        Self { key, meta }
    }

    /// Decodes a Base58Check `xpub...` / `tpub...`. An `xprv` is rejected
    /// with `InvalidKeyFormat`; neuter it with [`super::Xprv::to_xpub`] instead.
    pub fn decode(curve: CurveRef, s: &str) -> WalletResult<Self> {
        match ExtendedKey::decode(curve, s)? {
            ExtendedKey::Public(key) => Ok(key),
            ExtendedKey::Private(_) => Err(WalletError::Crypto(CryptoError::InvalidKeyFormat(
                "expected an extended public key".into(),
            ))),
        }
    }

    #[inline]
    pub fn public_key(&self) -> &PublicKey {
        &self.key
    }

    #[inline]
    pub fn chain_code(&self) -> &[u8; 32] {
        &self.meta.chain_code
    }

    #[inline]
    pub fn depth(&self) -> u8 {
        self.meta.depth
    }

    #[inline]
    pub fn index(&self) -> Option<u32> {
        self.meta.index
    }

    #[inline]
    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.meta.parent_fingerprint
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.meta.path
    }

    #[inline]
    pub fn is_master(&self) -> bool {
        self.meta.is_master()
    }

    pub fn identifier(&self) -> [u8; 20] {
        hash160(&self.key.to_bytes(true))
    }

    pub fn fingerprint(&self) -> [u8; 4] {
        let id = self.identifier();
        [id[0], id[1], id[2], id[3]]
    }

    pub fn address(&self) -> String {
        self.address_with_hrp(MAINNET_HRP)
    }

    pub fn address_with_hrp(&self, hrp: &str) -> String {
        pubkey_to_address(&self.key, hrp)
    }

    /// CKDpub: `K_child = I_L·G + K_par`.
    ///
    /// # Errors
    /// `KeyDerivation` for hardened indices. Invalid children are skipped
    /// like [`super::Xprv::child`].
    pub fn child(&self, index: u32) -> Result<Self, CryptoError> {
        if index >= HARDENED_OFFSET {
            return Err(CryptoError::KeyDerivation(format!(
                "cannot derive hardened child {} from a public key",
                index - HARDENED_OFFSET
            )));
        }

        let n = self.key.curve().n();
        let parent_pubkey = self.key.to_bytes(true);
        let parent_fingerprint = self.fingerprint();

        let mut i = index;
        for attempt in 0..=MAX_INDEX_SKIPS {
            if attempt > 0 {
                i = next_child_index(i).ok_or_else(|| {
                    CryptoError::KeyDerivation(format!("no valid child near index {}", index))
                })?;
            }

            let (il, ir) = hmac_sha512(&self.meta.chain_code, &[&parent_pubkey, &i.to_be_bytes()]);
            let tweak = BigUint::from_bytes_be(&il);
            if &tweak >= n {
                log::warn!("invalid public child at index {} of {}, skipping", i, self.meta.path);
                continue;
            }
            let key = match self.key.tweak_add(&tweak) {
                Ok(key) => key,
                Err(CryptoError::InvalidPoint(_)) => {
                    log::warn!("public child at index {} of {} is the identity, skipping", i, self.meta.path);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let meta = self.meta.child(ir, i, parent_fingerprint)?;
            return Ok(Self { key, meta });
        }

        Err(CryptoError::KeyDerivation(format!(
            "no valid child within {} indices of {}",
            MAX_INDEX_SKIPS, index
        )))
    }

    /// 78-byte body with the compressed public key as key data.
    pub fn serialize(&self, versions: &KeyVersions) -> [u8; 78] {
        self.meta.serialize(versions.public, &self.key.to_compressed())
    }

    /// Base58Check `xpub...` (mainnet versions).
    pub fn encode(&self) -> String {
        self.encode_with(&KeyVersions::MAINNET)
    }

    pub fn encode_with(&self, versions: &KeyVersions) -> String {
        base58::check_encode(&self.serialize(versions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::curve::Curve;
    use crate::crypto::key_deriver::Xprv;

    const V1_M_XPUB: &str = "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8";
    const V1_XPUB_M0H1: &str = "xpub6ASuArnXKPbfEwhqN6e3mwBcDTgzisQN1wXN9BJcM47sSikHjJf3UFHKkNAWbWMiGj7Wf5uMash7SyYq527Hqck2AxYysAA7xmALppuCkwQ";

    fn v1_master() -> Xprv {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        Xprv::from_seed(Curve::secp256k1(), &seed).unwrap()
    }

    #[test]
    fn test_master_xpub() {
        let xpub = v1_master().to_xpub();
        assert_eq!(xpub.encode(), V1_M_XPUB);
        assert_eq!(xpub.path(), "M");
        assert!(xpub.is_master());
    }

    #[test]
    fn test_public_child_matches_vector() {
        let m0h = v1_master().child(HARDENED_OFFSET).unwrap().to_xpub();
        let child = m0h.child(1).unwrap();
        assert_eq!(child.encode(), V1_XPUB_M0H1);
        assert_eq!(child.path(), "M/0h/1");
        assert_eq!(child.depth(), 2);
    }

    #[test]
    fn test_hardened_child_rejected() {
        let xpub = v1_master().to_xpub();
        assert!(matches!(
            xpub.child(HARDENED_OFFSET + 1),
            Err(CryptoError::KeyDerivation(_))
        ));
    }

    #[test]
    fn test_decode_roundtrip() {
        let decoded = Xpub::decode(Curve::secp256k1(), V1_M_XPUB).unwrap();
        assert_eq!(decoded, v1_master().to_xpub());

        let child = Xpub::decode(Curve::secp256k1(), V1_XPUB_M0H1).unwrap();
        assert_eq!(child.encode(), V1_XPUB_M0H1);
        assert_eq!(child.path(), "M/x/1");
    }

    #[test]
    fn test_decode_rejects_private() {
        let xprv = v1_master().encode();
        assert!(matches!(
            Xpub::decode(Curve::secp256k1(), &xprv),
            Err(WalletError::Crypto(CryptoError::InvalidKeyFormat(_)))
        ));
        let neutered = v1_master().to_xpub();
        assert_eq!(Xpub::decode(Curve::secp256k1(), &neutered.encode()).unwrap(), neutered);
    }

    #[test]
    fn test_address_matches_private_side() {
        let node = v1_master().derive("m/3'/4919'/0'/0/4").unwrap();
        assert_eq!(node.to_xpub().address(), node.address());
        assert_eq!(node.to_xpub().fingerprint(), node.fingerprint());
    }
}
