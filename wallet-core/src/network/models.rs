// wallet-core/src/network/models.rs
//
// Node-facing data models: JSON-RPC 2.0 envelope, UTXO info, balance.
//
// Tất cả structs đều:
// - Serialize/Deserialize theo đúng field names của node
// - Clone + Debug

use crate::chains::wit::transaction::{OutputPointer, VtTransaction};
use crate::chains::wit::units;
use crate::error::{TransactionError, WalletError, WalletResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Node methods the wallet uses.
pub mod methods {
    pub const GET_UTXO_INFO: &str = "getUtxoInfo";
    pub const INVENTORY: &str = "inventory";
}

// =============================================================================
// JSON-RPC ENVELOPE
// =============================================================================

/// `{"jsonrpc": "2.0", "method": ..., "params": ..., "id": 1}`
///
/// `params` is left out entirely when there are none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    pub id: u64,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id: 1,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    /// `getUtxoInfo(["wit1..."])`
    pub fn get_utxo_info(address: &str) -> Self {
        Self::new(
            methods::GET_UTXO_INFO,
            Some(Value::Array(vec![Value::String(address.to_string())])),
        )
    }

    /// `inventory({"transaction": {"ValueTransfer": ...}})`
    pub fn inventory(transaction: &VtTransaction) -> WalletResult<Self> {
        let item = serde_json::to_value(transaction.inventory_item())
            .map_err(|e| WalletError::Validation(format!("cannot serialize transaction: {}", e)))?;
        Ok(Self::new(methods::INVENTORY, Some(item)))
    }

    pub fn to_json(&self) -> WalletResult<String> {
        serde_json::to_string(self)
            .map_err(|e| WalletError::Validation(format!("cannot serialize request: {}", e)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Response envelope; exactly one of `result` / `error` is expected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
    #[serde(default)]
    pub id: Option<u64>,
}

impl JsonRpcResponse {
    pub fn from_json(s: &str) -> WalletResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| WalletError::Network(format!("malformed JSON-RPC response: {}", e)))
    }

    /// Typed `result`, or the node's error as `WalletError::Network`.
    pub fn into_result<T: DeserializeOwned>(self) -> WalletResult<T> {
        if let Some(err) = self.error {
            return Err(WalletError::Network(format!(
                "node error {}: {}",
                err.code, err.message
            )));
        }
        let result = self
            .result
            .ok_or_else(|| WalletError::Network("response has neither result nor error".into()))?;
        serde_json::from_value(result)
            .map_err(|e| WalletError::Network(format!("unexpected result shape: {}", e)))
    }
}

// =============================================================================
// UTXO
// =============================================================================

/// One unspent output as reported by `getUtxoInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub output_pointer: OutputPointer,
    pub value: u64,
    /// Unix seconds; spendable once `timelock < now`.
    #[serde(default)]
    pub timelock: u64,
}

impl Utxo {
    pub fn new(output_pointer: OutputPointer, value: u64, timelock: u64) -> Self {
        Self {
            output_pointer,
            value,
            timelock,
        }
    }

    #[inline]
    pub fn is_spendable(&self, now: u64) -> bool {
        self.timelock < now
    }
}

/// `getUtxoInfo` result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoInfo {
    #[serde(default)]
    pub collateral_min: u64,
    pub utxos: Vec<Utxo>,
}

impl UtxoInfo {
    /// Sum of every UTXO, locked or not.
    pub fn balance(&self) -> Result<u64, TransactionError> {
        total_value(&self.utxos)
    }
}

/// Checked sum of UTXO values.
pub fn total_value(utxos: &[Utxo]) -> Result<u64, TransactionError> {
    utxos
        .iter()
        .try_fold(0u64, |acc, u| acc.checked_add(u.value))
        .ok_or(TransactionError::ValueOverflow)
}

// =============================================================================
// BALANCE
// =============================================================================

/// Số dư: raw nanowits + dạng hiển thị
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    /// Số dư raw (nanowits)
    pub raw: u64,
    /// Đã format với decimals (e.g., "1.5")
    pub formatted: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Balance {
    pub fn new(raw: u64, decimals: u8, symbol: impl Into<String>) -> Self {
        Self {
            raw,
            formatted: units::format_units(raw, decimals),
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Balance in WIT from a nanowit amount.
    pub fn from_nanowits(raw: u64) -> Self {
        Self::new(raw, units::WIT_DECIMALS, units::WIT_SYMBOL)
    }

    pub fn zero(symbol: impl Into<String>, decimals: u8) -> Self {
        Self::new(0, decimals, symbol)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TXID: &str = "0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f";

    #[test]
    fn test_request_omits_missing_params() {
        let request = JsonRpcRequest::new("syncStatus", None);
        assert_eq!(
            request.to_json().unwrap(),
            r#"{"jsonrpc":"2.0","method":"syncStatus","id":1}"#
        );
    }

    #[test]
    fn test_get_utxo_info_request() {
        let request = JsonRpcRequest::get_utxo_info("wit1abc").with_id(7);
        assert_eq!(
            request.to_json().unwrap(),
            r#"{"jsonrpc":"2.0","method":"getUtxoInfo","params":["wit1abc"],"id":7}"#
        );
    }

    #[test]
    fn test_utxo_info_response() {
        let raw = json!({
            "jsonrpc": "2.0",
            "result": {
                "collateral_min": 1_000_000_000u64,
                "utxos": [
                    {"output_pointer": format!("{}:0", TXID), "value": 5, "timelock": 0},
                    {"output_pointer": format!("{}:3", TXID), "value": 7, "timelock": 1_600_000_000u64}
                ]
            },
            "id": 1
        })
        .to_string();
        let info: UtxoInfo = JsonRpcResponse::from_json(&raw).unwrap().into_result().unwrap();
        assert_eq!(info.collateral_min, 1_000_000_000);
        assert_eq!(info.utxos.len(), 2);
        assert_eq!(info.utxos[1].output_pointer.output_index(), 3);
        assert_eq!(info.balance().unwrap(), 12);
        assert!(info.utxos[0].is_spendable(1));
        assert!(!info.utxos[1].is_spendable(1_600_000_000));
        assert!(info.utxos[1].is_spendable(1_600_000_001));
    }

    #[test]
    fn test_error_response() {
        let raw = r#"{"jsonrpc":"2.0","error":{"code":-32601,"message":"Method not found"},"id":1}"#;
        let result: WalletResult<UtxoInfo> = JsonRpcResponse::from_json(raw).unwrap().into_result();
        assert!(matches!(result, Err(WalletError::Network(msg)) if msg.contains("-32601")));

        assert!(JsonRpcResponse::from_json("not json").is_err());
    }

    #[test]
    fn test_bad_output_pointer_rejected() {
        let raw = json!({"utxos": [{"output_pointer": "zz:0", "value": 1, "timelock": 0}]});
        assert!(serde_json::from_value::<UtxoInfo>(raw).is_err());
    }

    #[test]
    fn test_balance_overflow() {
        let pointer: OutputPointer = format!("{}:0", TXID).parse().unwrap();
        let info = UtxoInfo {
            collateral_min: 0,
            utxos: vec![Utxo::new(pointer, u64::MAX, 0), Utxo::new(pointer, 1, 0)],
        };
        assert_eq!(info.balance(), Err(TransactionError::ValueOverflow));
    }

    #[test]
    fn test_balance_formatting() {
        // 1 WIT = 1_000_000_000 nanowits (9 decimals)
        assert_eq!(Balance::from_nanowits(1_000_000_000).formatted, "1");
        assert_eq!(Balance::from_nanowits(1_500_000_000).formatted, "1.5");
        assert_eq!(Balance::from_nanowits(1_000).formatted, "0.000001");
        assert_eq!(Balance::zero("WIT", 9).formatted, "0");

        let balance = Balance::from_nanowits(42);
        assert_eq!(balance.symbol, "WIT");
        let json = serde_json::to_value(&balance).unwrap();
        assert_eq!(json["formatted"], "0.000000042");
    }
}
