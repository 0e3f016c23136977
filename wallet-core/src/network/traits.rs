// wallet-core/src/network/traits.rs

// Node Provider Trait - ranh giới I/O duy nhất của wallet core
//
// Core không sở hữu transport (TCP/HTTP, timeout, retry). Caller implement
// trait này và tự áp timeout/retry policy của mình.

use crate::chains::wit::transaction::VtTransaction;
use crate::chains::wit::units::{WIT_DECIMALS, WIT_SYMBOL};
use crate::chains::WitChainConfig;
use crate::error::WalletResult;
use crate::network::models::{Balance, JsonRpcRequest, JsonRpcResponse, UtxoInfo};
use async_trait::async_trait;
use serde_json::Value;

/// NodeProvider - những gì wallet cần từ một Witnet node
///
/// # Design Principles
/// - **Minimal**: chỉ `getUtxoInfo` và `inventory`
/// - **Async-First**: mọi network operation đều async
/// - **Error Handling**: lỗi transport/node trả về `WalletError::Network`
#[async_trait]
pub trait NodeProvider: Send + Sync {
    /// UTXOs của một địa chỉ bech32
    ///
    /// # Arguments
    /// * `address` - e.g. `wit1...`
    async fn get_utxo_info(&self, address: &str) -> WalletResult<UtxoInfo>;

    /// Gửi giao dịch đã ký lên node (`inventory`)
    ///
    /// # Returns
    /// Raw `result` của node
    async fn inventory(&self, transaction: &VtTransaction) -> WalletResult<Value>;

    /// Tổng số dư (kể cả UTXO còn bị time-lock)
    async fn get_balance(&self, address: &str) -> WalletResult<Balance> {
        let info = self.get_utxo_info(address).await?;
        Ok(Balance::from_nanowits(info.balance()?))
    }
}

/// Raw JSON-RPC round trip: one request line in, one response line out.
#[async_trait]
pub trait JsonRpcTransport: Send + Sync {
    /// # Arguments
    /// * `endpoint` - node address, e.g. `127.0.0.1:21338`
    async fn send(&self, endpoint: &str, request: String) -> WalletResult<String>;
}

/// [`NodeProvider`] over any [`JsonRpcTransport`].
#[derive(Debug, Clone)]
pub struct JsonRpcNode<T> {
    transport: T,
    endpoint: String,
    symbol: String,
    decimals: u8,
}

impl<T: JsonRpcTransport> JsonRpcNode<T> {
    /// Node at `endpoint`, balances in WIT.
    pub fn new(transport: T, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            symbol: WIT_SYMBOL.to_string(),
            decimals: WIT_DECIMALS,
        }
    }

    /// Node address and balance units from `config`.
    pub fn for_chain(transport: T, config: &WitChainConfig) -> Self {
        Self {
            transport,
            endpoint: config.node_address.clone(),
            symbol: config.symbol.clone(),
            decimals: config.decimals,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(&self, request: JsonRpcRequest) -> WalletResult<JsonRpcResponse> {
        log::debug!("node call: {} -> {}", request.method, self.endpoint);
        let raw = self.transport.send(&self.endpoint, request.to_json()?).await?;
        JsonRpcResponse::from_json(&raw)
    }
}

#[async_trait]
impl<T: JsonRpcTransport> NodeProvider for JsonRpcNode<T> {
    async fn get_utxo_info(&self, address: &str) -> WalletResult<UtxoInfo> {
        self.call(JsonRpcRequest::get_utxo_info(address))
            .await?
            .into_result()
    }

    async fn inventory(&self, transaction: &VtTransaction) -> WalletResult<Value> {
        self.call(JsonRpcRequest::inventory(transaction)?)
            .await?
            .into_result()
    }

    async fn get_balance(&self, address: &str) -> WalletResult<Balance> {
        let info = self.get_utxo_info(address).await?;
        Ok(Balance::new(info.balance()?, self.decimals, self.symbol.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WalletError;
    use std::sync::Mutex;

    /// Replays canned responses and records what was sent.
    struct ScriptedTransport {
        responses: Mutex<Vec<String>>,
        sent: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedTransport {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().rev().map(|s| s.to_string()).collect()),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl JsonRpcTransport for ScriptedTransport {
        async fn send(&self, endpoint: &str, request: String) -> WalletResult<String> {
            self.sent.lock().unwrap().push((endpoint.to_string(), request));
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| WalletError::Network("connection closed".into()))
        }
    }

    const UTXO_RESPONSE: &str = r#"{"jsonrpc":"2.0","result":{"collateral_min":1000000000,"utxos":[{"output_pointer":"0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f:1","value":1500000000,"timelock":0}]},"id":1}"#;

    #[tokio::test]
    async fn test_get_utxo_info_over_transport() {
        let node = JsonRpcNode::new(ScriptedTransport::new(&[UTXO_RESPONSE]), "10.0.0.1:21338");
        let info = node.get_utxo_info("wit1xyz").await.unwrap();
        assert_eq!(info.utxos.len(), 1);
        assert_eq!(info.utxos[0].value, 1_500_000_000);

        let sent = node.transport().sent.lock().unwrap().clone();
        assert_eq!(
            sent,
            vec![(
                "10.0.0.1:21338".to_string(),
                r#"{"jsonrpc":"2.0","method":"getUtxoInfo","params":["wit1xyz"],"id":1}"#.to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_default_get_balance() {
        let node = JsonRpcNode::new(ScriptedTransport::new(&[UTXO_RESPONSE]), "127.0.0.1:21338");
        let balance = node.get_balance("wit1xyz").await.unwrap();
        assert_eq!(balance.raw, 1_500_000_000);
        assert_eq!(balance.formatted, "1.5");
        assert_eq!(balance.symbol, "WIT");
    }

    #[tokio::test]
    async fn test_node_for_chain_uses_config() {
        let mut config = WitChainConfig::testnet();
        config.node_address = "192.168.1.20:21339".into();
        config.symbol = "tWIT".into();
        config.decimals = 6;

        let node = JsonRpcNode::for_chain(ScriptedTransport::new(&[UTXO_RESPONSE]), &config);
        assert_eq!(node.endpoint(), "192.168.1.20:21339");

        let balance = node.get_balance("twit1xyz").await.unwrap();
        assert_eq!(balance, config.balance(1_500_000_000));
        assert_eq!(balance.formatted, "1500");
        assert_eq!(balance.symbol, "tWIT");

        let sent = node.transport().sent.lock().unwrap().clone();
        assert_eq!(sent[0].0, "192.168.1.20:21339");
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let node = JsonRpcNode::new(ScriptedTransport::new(&[]), "127.0.0.1:21338");
        assert!(matches!(
            node.get_utxo_info("wit1xyz").await,
            Err(WalletError::Network(_))
        ));
    }
}
