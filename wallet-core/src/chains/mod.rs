// src/chains/mod.rs
pub mod wit;

use crate::crypto::key_deriver::compact::COMPACT_XPRV_HRP;
use crate::crypto::key_deriver::{KeyVersions, MASTER_SEED_KEY};
use crate::crypto::paths::DerivationPaths;
use crate::error::{WalletError, WalletResult};
use crate::network::models::Balance;
use serde::{Deserialize, Serialize};
use wit::address::{MAINNET_HRP, TESTNET_HRP};
use wit::units::{format_units, WIT_DECIMALS, WIT_SYMBOL};

/// Số chữ số thập phân lớn nhất mà một `u64` còn biểu diễn được
const MAX_DECIMALS: u8 = 19;

// Cấu hình cho một mạng Witnet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitChainConfig {
    pub name: String,
    /// Address prefix (`wit` / `twit`)
    pub address_hrp: String,
    /// Prefix của compact master key export
    pub compact_xprv_hrp: String,
    /// Base58Check version của extended private key
    pub xprv_version: u32,
    /// Base58Check version của extended public key
    pub xpub_version: u32,
    /// HMAC key cho master key
    pub master_seed_key: String,
    /// Account path mặc định của ví
    pub account_path: String,
    /// JSON-RPC endpoint của node (`host:port`), xem `JsonRpcNode::for_chain`
    pub node_address: String,
    /// Ký hiệu hiển thị của số dư
    pub symbol: String,
    /// Số chữ số thập phân của một đơn vị raw (nanowit = 9)
    pub decimals: u8,
}

// Helper để tạo nhanh config cho các mạng
impl WitChainConfig {
    pub fn mainnet() -> Self {
        Self {
            name: "Witnet Mainnet".to_string(),
            address_hrp: MAINNET_HRP.to_string(),
            compact_xprv_hrp: COMPACT_XPRV_HRP.to_string(),
            xprv_version: u32::from_be_bytes(KeyVersions::MAINNET.private),
            xpub_version: u32::from_be_bytes(KeyVersions::MAINNET.public),
            master_seed_key: seed_key_string(),
            account_path: DerivationPaths::WIT_ACCOUNT_0.to_string(),
            node_address: "127.0.0.1:21338".to_string(),
            symbol: WIT_SYMBOL.to_string(),
            decimals: WIT_DECIMALS,
        }
    }

    pub fn testnet() -> Self {
        Self {
            name: "Witnet Testnet".to_string(),
            address_hrp: TESTNET_HRP.to_string(),
            xprv_version: u32::from_be_bytes(KeyVersions::TESTNET.private),
            xpub_version: u32::from_be_bytes(KeyVersions::TESTNET.public),
            ..Self::mainnet()
        }
    }

    /// Loads a custom config; every field is required.
    pub fn from_json(json: &str) -> WalletResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| WalletError::Validation(format!("invalid chain config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> WalletResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| WalletError::Validation(format!("cannot serialize chain config: {}", e)))
    }

    pub fn key_versions(&self) -> KeyVersions {
        KeyVersions::from_u32(self.xprv_version, self.xpub_version)
    }

    /// Raw amount formatted with this chain's decimals, e.g. `"1.5"`.
    pub fn format_amount(&self, raw: u64) -> String {
        format_units(raw, self.decimals)
    }

    pub fn balance(&self, raw: u64) -> Balance {
        Balance::new(raw, self.decimals, self.symbol.as_str())
    }

    fn validate(&self) -> WalletResult<()> {
        if self.address_hrp.is_empty() || self.compact_xprv_hrp.is_empty() {
            return Err(WalletError::Validation("HRP must not be empty".into()));
        }
        if self.xprv_version == self.xpub_version {
            return Err(WalletError::Validation(
                "private and public key versions must differ".into(),
            ));
        }
        if self.master_seed_key.is_empty() {
            return Err(WalletError::Validation("master seed key must not be empty".into()));
        }
        if self.node_address.is_empty() || self.symbol.is_empty() {
            return Err(WalletError::Validation(
                "node address and symbol must not be empty".into(),
            ));
        }
        // 10^20 > u64::MAX
        if self.decimals > MAX_DECIMALS {
            return Err(WalletError::Validation(format!(
                "decimals {} exceeds {}",
                self.decimals, MAX_DECIMALS
            )));
        }
        self.account_path
            .parse::<crate::crypto::paths::DerivationPath>()
            .map_err(|e| WalletError::Validation(format!("account path: {}", e)))?;
        Ok(())
    }
}

impl Default for WitChainConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}

fn seed_key_string() -> String {
    String::from_utf8_lossy(MASTER_SEED_KEY).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let main = WitChainConfig::mainnet();
        assert_eq!(main.address_hrp, "wit");
        assert_eq!(main.xprv_version, 0x0488ADE4);
        assert_eq!(main.xpub_version, 0x0488B21E);
        assert_eq!(main.master_seed_key, "Bitcoin seed");
        assert_eq!(main.account_path, "m/3'/4919'/0'");
        assert_eq!(main.node_address, "127.0.0.1:21338");
        assert_eq!(main.decimals, 9);
        assert_eq!(main.key_versions(), KeyVersions::MAINNET);
        assert_eq!(WitChainConfig::default(), main);

        let test = WitChainConfig::testnet();
        assert_eq!(test.address_hrp, "twit");
        assert_eq!(test.compact_xprv_hrp, "xprv");
        assert_eq!(test.key_versions(), KeyVersions::TESTNET);
    }

    #[test]
    fn test_amount_units() {
        let main = WitChainConfig::mainnet();
        assert_eq!(main.format_amount(1_500_000_000), "1.5");
        assert_eq!(main.format_amount(1), "0.000000001");
        assert_eq!(main.balance(2_000_000_000), Balance::from_nanowits(2_000_000_000));

        let mut custom = WitChainConfig::testnet();
        custom.symbol = "tWIT".into();
        custom.decimals = 2;
        assert_eq!(custom.format_amount(12_345), "123.45");
        let balance = custom.balance(12_345);
        assert_eq!(balance.symbol, "tWIT");
        assert_eq!(balance.decimals, 2);
        assert_eq!(balance.formatted, "123.45");
    }

    #[test]
    fn test_json_roundtrip() {
        let config = WitChainConfig::testnet();
        let json = config.to_json().unwrap();
        assert_eq!(WitChainConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(WitChainConfig::from_json("{}").is_err());

        let mut config = WitChainConfig::mainnet();
        config.account_path = "m/abc".into();
        assert!(matches!(
            WitChainConfig::from_json(&config.to_json().unwrap()),
            Err(WalletError::Validation(_))
        ));

        let mut config = WitChainConfig::mainnet();
        config.xpub_version = config.xprv_version;
        assert!(WitChainConfig::from_json(&config.to_json().unwrap()).is_err());

        let mut config = WitChainConfig::mainnet();
        config.node_address.clear();
        assert!(WitChainConfig::from_json(&config.to_json().unwrap()).is_err());

        let mut config = WitChainConfig::mainnet();
        config.decimals = 20;
        assert!(matches!(
            WitChainConfig::from_json(&config.to_json().unwrap()),
            Err(WalletError::Validation(_))
        ));
    }
}
