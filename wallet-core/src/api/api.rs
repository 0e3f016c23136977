// wallet-core/src/api/api.rs
//
// Public facade: tạo / khôi phục ví, derive địa chỉ, export / import master key.
// Mọi hàm nhận `WitChainConfig` để chọn mainnet / testnet.

use crate::chains::wit::signer::WitSigner;
use crate::chains::WitChainConfig;
use crate::crypto::key_deriver::{ExtendedKey, Xprv};
use crate::crypto::mnemonic::{WalletMnemonic, WordCount};
use crate::crypto::paths::change;
use crate::crypto::Curve;
use crate::error::{CryptoError, WalletError, WalletResult};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Kết quả tạo / khôi phục ví
///
/// # Security
/// `mnemonic` bị xóa khỏi bộ nhớ khi drop, Debug không in ra.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct WalletCredential {
    pub mnemonic: String,
    /// First receiving address (`<account>/0/0`).
    pub address: String,
    /// Base58Check xpub of the account node.
    pub account_xpub: String,
    pub account_path: String,
}

impl fmt::Debug for WalletCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletCredential")
            .field("mnemonic", &"[REDACTED]")
            .field("address", &self.address)
            .field("account_xpub", &self.account_xpub)
            .field("account_path", &self.account_path)
            .finish()
    }
}

// --- Key Management ---

/// New random English mnemonic and its first address.
pub fn create_wallet(
    config: &WitChainConfig,
    word_count: WordCount,
) -> WalletResult<WalletCredential> {
    let mnemonic = WalletMnemonic::with_word_count(word_count);
    credential_for(config, &mnemonic, None)
}

/// Validates `mnemonic` (any supported language) and rebuilds the wallet.
pub fn restore_wallet(
    config: &WitChainConfig,
    mnemonic: &str,
    passphrase: Option<&str>,
) -> WalletResult<WalletCredential> {
    let mnemonic = WalletMnemonic::from_phrase(mnemonic)?;
    credential_for(config, &mnemonic, passphrase)
}

fn credential_for(
    config: &WitChainConfig,
    mnemonic: &WalletMnemonic,
    passphrase: Option<&str>,
) -> WalletResult<WalletCredential> {
    let master = master_from_mnemonic(config, mnemonic, passphrase)?;
    let account = master.derive(&config.account_path)?;
    let first = account.child(change::EXTERNAL)?.child(0)?;
    Ok(WalletCredential {
        mnemonic: mnemonic.phrase().to_string(),
        address: first.address_with_hrp(&config.address_hrp),
        account_xpub: account.to_xpub().encode_with(&config.key_versions()),
        account_path: account.path().to_string(),
    })
}

/// Mnemonic → seed → master key, with the config's HMAC key.
pub fn master_from_mnemonic(
    config: &WitChainConfig,
    mnemonic: &WalletMnemonic,
    passphrase: Option<&str>,
) -> WalletResult<Xprv> {
    let seed = mnemonic.to_seed(passphrase);
    Ok(Xprv::from_seed_with_key(
        Curve::secp256k1(),
        &*seed,
        config.master_seed_key.as_bytes(),
    )?)
}

// --- Addresses ---

/// `count` addresses of the account starting at `start`.
///
/// # Arguments
/// * `chain` - `change::EXTERNAL` (nhận) hoặc `change::INTERNAL` (change)
pub fn derive_addresses(
    config: &WitChainConfig,
    master: &Xprv,
    chain: u32,
    start: u32,
    count: u32,
) -> WalletResult<Vec<String>> {
    let branch = master.derive(&config.account_path)?.child(chain)?;
    let end = start
        .checked_add(count)
        .ok_or_else(|| WalletError::Validation("address range overflows".into()))?;
    (start..end)
        .map(|i| {
            branch
                .child(i)
                .map(|k| k.address_with_hrp(&config.address_hrp))
                .map_err(WalletError::from)
        })
        .collect()
}

/// Same addresses from the account xpub alone (watch-only).
pub fn derive_addresses_from_xpub(
    config: &WitChainConfig,
    account_xpub: &str,
    chain: u32,
    start: u32,
    count: u32,
) -> WalletResult<Vec<String>> {
    let account = match ExtendedKey::decode_with(
        Curve::secp256k1(),
        account_xpub,
        &[config.key_versions()],
    )? {
        ExtendedKey::Public(xpub) => xpub,
        ExtendedKey::Private(xprv) => xprv.to_xpub(),
    };
    let branch = account.child(chain)?;
    let end = start
        .checked_add(count)
        .ok_or_else(|| WalletError::Validation("address range overflows".into()))?;
    (start..end)
        .map(|i| {
            branch
                .child(i)
                .map(|k| k.address_with_hrp(&config.address_hrp))
                .map_err(WalletError::from)
        })
        .collect()
}

/// Signer for one receiving address of the account.
pub fn signer_for(config: &WitChainConfig, master: &Xprv, index: u32) -> WalletResult<WitSigner> {
    let key = master
        .derive(&config.account_path)?
        .child(change::EXTERNAL)?
        .child(index)?;
    Ok(WitSigner::new(key.private_key().clone(), &config.address_hrp))
}

/// Private key hex at `path` (e.g. `m/3'/4919'/0'/0/0`).
pub fn get_private_key_from_mnemonic(
    config: &WitChainConfig,
    mnemonic: &str,
    path: &str,
) -> WalletResult<Zeroizing<String>> {
    let mnemonic = WalletMnemonic::from_phrase(mnemonic)?;
    let key = master_from_mnemonic(config, &mnemonic, None)?.derive(path)?;
    Ok(key.private_key().to_hex())
}

// --- Master Key Export / Import ---

/// Base58Check `xprv...` (or `tprv...` on testnet).
pub fn export_master_key(config: &WitChainConfig, master: &Xprv) -> Zeroizing<String> {
    master.encode_with(&config.key_versions())
}

/// Legacy compact `xprv1...` form. Master keys only.
pub fn export_compact_master_key(
    config: &WitChainConfig,
    master: &Xprv,
) -> WalletResult<Zeroizing<String>> {
    if !master.is_master() {
        return Err(CryptoError::InvalidKeyFormat(
            "compact export is only defined for master keys".into(),
        )
        .into());
    }
    Ok(master.to_compact(&config.compact_xprv_hrp))
}

/// Imports either export form; the compact form is tried when the string
/// carries the compact prefix followed by `1`.
pub fn import_master_key(config: &WitChainConfig, exported: &str) -> WalletResult<Xprv> {
    let trimmed = exported.trim();
    let compact_prefix = format!("{}1", config.compact_xprv_hrp);
    if trimmed.to_lowercase().starts_with(&compact_prefix) {
        return Xprv::from_compact(Curve::secp256k1(), trimmed, &config.compact_xprv_hrp);
    }
    match ExtendedKey::decode_with(Curve::secp256k1(), trimmed, &[config.key_versions()])? {
        ExtendedKey::Private(xprv) => Ok(xprv),
        ExtendedKey::Public(_) => Err(CryptoError::InvalidKeyFormat(
            "expected an extended private key".into(),
        )
        .into()),
    }
}

// --- Config Helpers ---

pub fn get_default_chains() -> Vec<WitChainConfig> {
    vec![WitChainConfig::mainnet(), WitChainConfig::testnet()]
}
