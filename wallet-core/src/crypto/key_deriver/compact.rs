// wallet-core/src/crypto/key_deriver/compact.rs
//
// Compact master key export: Bech32("xprv", depth ‖ chain code ‖ 0x00 ‖ key)
// Dạng này tương thích với ví cũ, chỉ dùng cho master key (depth 0).

use super::{KeyMeta, Xprv};
use crate::crypto::curve::CurveRef;
use crate::crypto::keys::PrivateKey;
use crate::encoding::bech32;
use crate::error::{CryptoError, EncodingError, WalletResult};
use zeroize::Zeroizing;

/// Default human-readable part of the compact form.
pub const COMPACT_XPRV_HRP: &str = "xprv";

/// `depth (1) ‖ chain code (32) ‖ 0x00 ‖ private key (32)`
pub const COMPACT_PAYLOAD_LEN: usize = 66;

impl Xprv {
    /// Bech32 compact export, e.g. `xprv1q...`.
    ///
    /// Only the depth, chain code and key are kept, so a derived key loses
    /// its position; [`Xprv::from_compact`] accepts master keys only.
    pub fn to_compact(&self, hrp: &str) -> Zeroizing<String> {
        let mut payload = Zeroizing::new([0u8; COMPACT_PAYLOAD_LEN]);
        payload[0] = self.depth();
        payload[1..33].copy_from_slice(self.chain_code());
        payload[34..].copy_from_slice(self.private_key().as_bytes());
        Zeroizing::new(bech32::encode_bytes(hrp, &*payload))
    }

    /// Parses the compact form back into a master key.
    ///
    /// # Errors
    /// - Bech32 errors (checksum, charset, wrong HRP)
    /// - `InvalidLength` unless the payload is 66 bytes
    /// - `InvalidKeyFormat` for depth != 0 or a missing `0x00` key prefix
    pub fn from_compact(curve: CurveRef, s: &str, hrp: &str) -> WalletResult<Self> {
        let (_, bytes) = bech32::decode_bytes(s, Some(hrp))?;
        let bytes = Zeroizing::new(bytes);
        if bytes.len() != COMPACT_PAYLOAD_LEN {
            return Err(EncodingError::InvalidLength {
                expected: COMPACT_PAYLOAD_LEN,
                actual: bytes.len(),
            }
            .into());
        }
        if bytes[0] != 0 {
            return Err(CryptoError::InvalidKeyFormat(format!(
                "compact key has depth {}, only master keys are supported",
                bytes[0]
            ))
            .into());
        }
        if bytes[33] != 0x00 {
            return Err(CryptoError::InvalidKeyFormat(
                "private key data must start with 0x00".into(),
            )
            .into());
        }

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&bytes[1..33]);
        let key = PrivateKey::from_bytes(curve, &bytes[34..])?;
        Ok(Xprv::from_parts(key, KeyMeta::root(chain_code, 'm')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::curve::Curve;
    use crate::error::WalletError;

    const V1_COMPACT: &str = "xprv1qzrnmlupcqh4y43rl50729n74sa9tgzfmc7nzja59m3z0lldxl2ssq8g7vh8y00v7sz34mav3ckf8jw9kg2rzwqhekcp59y5hytussmtx50zruuy";
    const LEGACY_COMPACT: &str = "xprv1qpujxsyd4hfu0dtwa524vac84e09mjsgnh5h9crl8wrqg58z5wmsuqqcxlqmar3fjhkprndzkpnp2xlze76g4hu7g7c4r4r2m2e6y8xlvu566tn6";

    fn v1_master() -> Xprv {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        Xprv::from_seed(Curve::secp256k1(), &seed).unwrap()
    }

    #[test]
    fn test_master_to_compact() {
        assert_eq!(v1_master().to_compact(COMPACT_XPRV_HRP).as_str(), V1_COMPACT);
    }

    #[test]
    fn test_from_compact_restores_master() {
        let restored = Xprv::from_compact(Curve::secp256k1(), V1_COMPACT, COMPACT_XPRV_HRP).unwrap();
        assert_eq!(restored, v1_master());
        assert!(restored.is_master());
    }

    #[test]
    fn test_legacy_export_imports() {
        let master =
            Xprv::from_compact(Curve::secp256k1(), LEGACY_COMPACT, COMPACT_XPRV_HRP).unwrap();
        assert_eq!(
            hex::encode(master.chain_code()),
            "7923408dadd3c7b56eed15567707ae5e5dca089de972e07f3b860450e2a3b70e"
        );
        assert_eq!(
            master.private_key().to_hex().as_str(),
            "1837c1be8e2995ec11cda2b066151be2cfb48adf9e47b151d46adab3a21cdf67"
        );
        assert_eq!(master.address(), "wit1k6g8xhm05evgqhgh2e7ehapld70tw0hmn9nvwy");
    }

    #[test]
    fn test_from_compact_rejects_derived_key() {
        let child = v1_master().child(1).unwrap();
        let compact = child.to_compact(COMPACT_XPRV_HRP);
        assert!(matches!(
            Xprv::from_compact(Curve::secp256k1(), &compact, COMPACT_XPRV_HRP),
            Err(WalletError::Crypto(CryptoError::InvalidKeyFormat(_)))
        ));
    }

    #[test]
    fn test_from_compact_rejects_wrong_prefix_and_length() {
        assert!(Xprv::from_compact(Curve::secp256k1(), V1_COMPACT, "tprv").is_err());

        let short = bech32::encode_bytes(COMPACT_XPRV_HRP, &[0u8; 65]);
        assert!(matches!(
            Xprv::from_compact(Curve::secp256k1(), &short, COMPACT_XPRV_HRP),
            Err(WalletError::Encoding(EncodingError::InvalidLength { .. }))
        ));
    }
}
