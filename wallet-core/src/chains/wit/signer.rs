// wallet-core\src\chains\wit\signer.rs
//
// Witnet Signer Module - UTXO selection + Value Transfer signing
//
// Flow: balance check → chọn UTXO (nhỏ trước) → change về địa chỉ gửi
//       → encode body → SHA-256 → ký một lần → cùng KeyedSignature cho mọi input

use super::address::WitAddress;
use super::transaction::{
    Input, KeyedSignature, ValueTransferOutput, VtTransaction, VtTransactionBody,
};
use crate::crypto::keys::PrivateKey;
use crate::error::{TransactionError, WalletResult};
use crate::network::models::{total_value, Utxo};
use crate::network::traits::NodeProvider;
use serde_json::Value;

/// Result of building a value transfer.
///
/// Thiếu tiền không phải lỗi: caller nhận `InsufficientFunds` như một giá trị bình thường.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VttOutcome {
    Created {
        transaction: VtTransaction,
        /// UTXOs spent, in input order.
        selected: Vec<Utxo>,
        /// Value returned to the sender (0 = no change output).
        change: u64,
    },
    InsufficientFunds {
        balance: u64,
        required: u64,
    },
}

impl VttOutcome {
    pub fn transaction(&self) -> Option<&VtTransaction> {
        match self {
            VttOutcome::Created { transaction, .. } => Some(transaction),
            VttOutcome::InsufficientFunds { .. } => None,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, VttOutcome::Created { .. })
    }
}

/// Witnet Signer - ký offline cho một địa chỉ
///
/// # Security Architecture
/// - **No Debug Leak**: Debug chỉ hiển thị địa chỉ
/// - **Single Address**: mọi UTXO được tiêu thuộc về `address`, nên một chữ ký
///   trên body hash là hợp lệ cho từng input
pub struct WitSigner {
    key: PrivateKey,
    address: WitAddress,
}

impl std::fmt::Debug for WitSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WitSigner")
            .field("address", &self.address.to_string())
            .finish_non_exhaustive()
    }
}

impl WitSigner {
    /// # Arguments
    /// * `key` - khóa ký
    /// * `hrp` - prefix của địa chỉ gửi / change (`wit`, `twit`)
    pub fn new(key: PrivateKey, hrp: &str) -> Self {
        let address = WitAddress::from_public_key_with_hrp(&key.to_public(), hrp);
        Self { key, address }
    }

    #[inline]
    pub fn address(&self) -> &WitAddress {
        &self.address
    }

    /// Signs `SHA-256(body bytes)`.
    pub fn sign_body(&self, body: &VtTransactionBody) -> KeyedSignature {
        KeyedSignature::new(self.key.sign_hash(&body.hash()), self.key.to_public())
    }

    /// Builds and signs a value transfer from this signer's UTXOs.
    ///
    /// # Arguments
    /// * `utxos` - UTXOs of [`WitSigner::address`]
    /// * `outputs` - receivers, in order
    /// * `fee` - absolute fee in nanowits (inputs − outputs)
    /// * `now` - Unix seconds; a UTXO is spendable iff `timelock < now`
    ///
    /// # Errors
    /// - `EmptyOutputs` khi không có receiver
    /// - `ValueOverflow` khi tổng value vượt u64
    pub fn create_vtt(
        &self,
        utxos: &[Utxo],
        outputs: Vec<ValueTransferOutput>,
        fee: u64,
        now: u64,
    ) -> WalletResult<VttOutcome> {
        if outputs.is_empty() {
            return Err(TransactionError::EmptyOutputs.into());
        }
        let body = VtTransactionBody::new(Vec::new(), outputs);
        let required = body
            .total_output_value()?
            .checked_add(fee)
            .ok_or(TransactionError::ValueOverflow)?;

        let balance = total_value(utxos)?;
        if balance < required {
            log::debug!("insufficient funds: balance {} < required {}", balance, required);
            return Ok(VttOutcome::InsufficientFunds { balance, required });
        }

        let mut spendable: Vec<&Utxo> = utxos.iter().filter(|u| u.is_spendable(now)).collect();
        // stable: equal values keep node order
        spendable.sort_by_key(|u| u.value);

        let mut selected = Vec::new();
        let mut selected_total = 0u64;
        for utxo in spendable {
            if selected_total >= required {
                break;
            }
            selected_total += utxo.value;
            selected.push(utxo.clone());
        }
        log::debug!(
            "selected {} of {} UTXOs: {} nanowits for {} required",
            selected.len(),
            utxos.len(),
            selected_total,
            required
        );

        if selected_total < required {
            // Đủ tổng số dư nhưng phần còn lại đang bị time-lock.
            return Ok(VttOutcome::InsufficientFunds {
                balance: selected_total,
                required,
            });
        }

        let mut body = body;
        body.inputs = selected.iter().map(|u| Input::new(u.output_pointer)).collect();
        let change = selected_total - required;
        if change > 0 {
            body.outputs
                .push(ValueTransferOutput::new(self.address.clone(), change, 0));
        }

        let signature = self.sign_body(&body);
        let signatures = vec![signature; body.inputs.len()];
        let transaction = VtTransaction::new(body, signatures);
        log::debug!("built VTT {}", transaction.txid());

        Ok(VttOutcome::Created {
            transaction,
            selected,
            change,
        })
    }

    /// [`WitSigner::create_vtt`] with UTXOs fetched from `provider`.
    pub async fn create_vtt_with_provider<P: NodeProvider + ?Sized>(
        &self,
        provider: &P,
        outputs: Vec<ValueTransferOutput>,
        fee: u64,
        now: u64,
    ) -> WalletResult<VttOutcome> {
        let info = provider.get_utxo_info(&self.address.to_string()).await?;
        self.create_vtt(&info.utxos, outputs, fee, now)
    }
}

/// Gửi giao dịch đã ký qua `inventory`.
pub async fn send_vtt<P: NodeProvider + ?Sized>(
    provider: &P,
    transaction: &VtTransaction,
) -> WalletResult<Value> {
    log::debug!("sending VTT {}", transaction.txid());
    provider.inventory(transaction).await
}

/// One-shot form: signer address under the first output's prefix.
pub fn create_vtt(
    utxos: &[Utxo],
    outputs: Vec<ValueTransferOutput>,
    key: &PrivateKey,
    fee: u64,
    now: u64,
) -> WalletResult<VttOutcome> {
    let hrp = outputs
        .first()
        .map(|o| o.pkh.hrp().to_string())
        .ok_or(TransactionError::EmptyOutputs)?;
    WitSigner::new(key.clone(), &hrp).create_vtt(utxos, outputs, fee, now)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::wit::address::MAINNET_HRP;
    use crate::chains::wit::transaction::OutputPointer;
    use crate::crypto::curve::Curve;
    use crate::error::WalletError;
    use crate::network::models::UtxoInfo;
    use async_trait::async_trait;
    use k256::ecdsa::signature::hazmat::PrehashVerifier;
    use std::sync::Mutex;

    const PRIV_0: &str = "663bb51d1a2f23e8732d224dbf399b39cc2fbe204797a1a779a965beeaad8a74";
    const ADDR_0: &str = "wit174la8pevl74hczcpfepgmt036zkmjen4hu8zzs";
    const ADDR_1: &str = "wit1cetlhcpqc3jxqxap6egql5py4jrgwnfzfsm6l7";
    const NOW: u64 = 1_700_000_000;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn signer() -> WitSigner {
        let key = PrivateKey::from_hex(Curve::secp256k1(), PRIV_0).unwrap();
        WitSigner::new(key, MAINNET_HRP)
    }

    fn utxo(tag: u8, value: u64, timelock: u64) -> Utxo {
        Utxo::new(OutputPointer::new([tag; 32], u32::from(tag)), value, timelock)
    }

    fn pay(value: u64) -> Vec<ValueTransferOutput> {
        vec![ValueTransferOutput::new(ADDR_1.parse().unwrap(), value, 0)]
    }

    #[test]
    fn test_signer_address() {
        assert_eq!(signer().address().to_string(), ADDR_0);
        assert!(!format!("{:?}", signer()).contains(PRIV_0));
    }

    #[test]
    fn test_selects_smallest_first_with_change() {
        init_logger();
        let utxos = vec![utxo(1, 500, 0), utxo(2, 100, 0), utxo(3, 300, 0)];
        let outcome = signer().create_vtt(&utxos, pay(350), 10, NOW).unwrap();
        let VttOutcome::Created {
            transaction,
            selected,
            change,
        } = outcome
        else {
            panic!("expected a transaction");
        };

        // 100 + 300 = 400 ≥ 360
        assert_eq!(selected, vec![utxo(2, 100, 0), utxo(3, 300, 0)]);
        assert_eq!(change, 40);
        let inputs: Vec<_> = transaction.body.inputs.iter().map(|i| i.output_pointer).collect();
        assert_eq!(inputs, vec![utxo(2, 0, 0).output_pointer, utxo(3, 0, 0).output_pointer]);

        let outputs = &transaction.body.outputs;
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].pkh.to_string(), ADDR_1);
        assert_eq!(outputs[0].value, 350);
        assert_eq!(outputs[1].pkh.to_string(), ADDR_0);
        assert_eq!(outputs[1].value, 40);
        assert_eq!(outputs[1].time_lock, 0);
    }

    #[test]
    fn test_exact_amount_has_no_change() {
        let utxos = vec![utxo(1, 250, 0), utxo(2, 750, 0)];
        let outcome = signer().create_vtt(&utxos, pay(990), 10, NOW).unwrap();
        let VttOutcome::Created { transaction, change, .. } = outcome else {
            panic!("expected a transaction");
        };
        assert_eq!(change, 0);
        assert_eq!(transaction.body.outputs.len(), 1);
        assert_eq!(transaction.body.inputs.len(), 2);
    }

    #[test]
    fn test_same_signature_on_every_input() {
        let utxos = vec![utxo(1, 10, 0), utxo(2, 20, 0), utxo(3, 30, 0)];
        let outcome = signer().create_vtt(&utxos, pay(55), 0, NOW).unwrap();
        let tx = outcome.transaction().unwrap();
        assert_eq!(tx.signatures.len(), 3);
        assert!(tx.signatures.windows(2).all(|w| w[0] == w[1]));
        assert!(tx.verify_signatures());

        // k256 accepts it over the body hash
        let keyed = &tx.signatures[0];
        let vk = k256::ecdsa::VerifyingKey::from_sec1_bytes(&keyed.public_key().to_compressed())
            .unwrap();
        let sig = k256::ecdsa::Signature::from_der(&keyed.signature().to_der()).unwrap();
        vk.verify_prehash(&tx.body.hash(), &sig).unwrap();
    }

    #[test]
    fn test_insufficient_funds_is_a_value() {
        let utxos = vec![utxo(1, 100, 0), utxo(2, 200, 0)];
        assert_eq!(
            signer().create_vtt(&utxos, pay(295), 10, NOW).unwrap(),
            VttOutcome::InsufficientFunds {
                balance: 300,
                required: 305
            }
        );
        assert!(!signer().create_vtt(&[], pay(1), 0, NOW).unwrap().is_created());
    }

    #[test]
    fn test_locked_utxos_are_not_spent() {
        init_logger();
        let utxos = vec![utxo(1, 100, NOW + 60), utxo(2, 200, 0), utxo(3, 50, NOW)];
        // locked (and timelock == now) UTXOs count toward balance but are never selected
        assert_eq!(
            signer().create_vtt(&utxos, pay(250), 0, NOW).unwrap(),
            VttOutcome::InsufficientFunds {
                balance: 200,
                required: 250
            }
        );

        let outcome = signer().create_vtt(&utxos, pay(150), 0, NOW).unwrap();
        let VttOutcome::Created { selected, change, .. } = outcome else {
            panic!("expected a transaction");
        };
        assert_eq!(selected, vec![utxo(2, 200, 0)]);
        assert_eq!(change, 50);

        let later = signer().create_vtt(&utxos, pay(250), 0, NOW + 61).unwrap();
        assert!(later.is_created());
    }

    #[test]
    fn test_rejects_empty_outputs_and_overflow() {
        let utxos = vec![utxo(1, 100, 0)];
        assert_eq!(
            signer().create_vtt(&utxos, vec![], 0, NOW),
            Err(WalletError::Transaction(TransactionError::EmptyOutputs))
        );
        assert_eq!(
            signer().create_vtt(&utxos, pay(u64::MAX), 1, NOW),
            Err(WalletError::Transaction(TransactionError::ValueOverflow))
        );
    }

    #[test]
    fn test_free_function_uses_output_prefix() {
        let key = PrivateKey::from_hex(Curve::secp256k1(), PRIV_0).unwrap();
        let utxos = vec![utxo(1, 100, 0)];
        let outcome = create_vtt(&utxos, pay(60), &key, 0, NOW).unwrap();
        let tx = outcome.transaction().unwrap();
        assert_eq!(tx.body.outputs[1].pkh.to_string(), ADDR_0);
        assert!(create_vtt(&utxos, vec![], &key, 0, NOW).is_err());
    }

    struct MockNode {
        info: UtxoInfo,
        queried: Mutex<Vec<String>>,
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NodeProvider for MockNode {
        async fn get_utxo_info(&self, address: &str) -> WalletResult<UtxoInfo> {
            self.queried.lock().unwrap().push(address.to_string());
            Ok(self.info.clone())
        }

        async fn inventory(&self, transaction: &VtTransaction) -> WalletResult<Value> {
            self.sent.lock().unwrap().push(transaction.txid());
            Ok(Value::String(transaction.txid()))
        }
    }

    #[tokio::test]
    async fn test_create_and_send_with_provider() {
        let node = MockNode {
            info: UtxoInfo {
                collateral_min: 0,
                utxos: vec![utxo(1, 1_000, 0), utxo(2, 2_000, 0)],
            },
            queried: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        };
        let signer = signer();
        let outcome = signer
            .create_vtt_with_provider(&node, pay(1_500), 100, NOW)
            .await
            .unwrap();
        assert_eq!(node.queried.lock().unwrap().as_slice(), [ADDR_0.to_string()]);

        let tx = outcome.transaction().unwrap();
        let response = send_vtt(&node, tx).await.unwrap();
        assert_eq!(response, Value::String(tx.txid()));
        assert_eq!(node.sent.lock().unwrap().len(), 1);
    }
}
