// wallet-core/src/chains/wit/transaction.rs
//
// Value Transfer Transaction schema + protobuf wire encoding
//
// VTTransactionBody  { repeated Input inputs = 1; repeated ValueTransferOutput outputs = 2; }
// Input              { OutputPointer output_pointer = 1; }
// OutputPointer      { Hash transaction_id = 1; uint32 output_index = 2; }
// Hash               { bytes SHA256 = 1; }
// ValueTransferOutput{ PublicKeyHash pkh = 1; uint64 value = 2; uint64 time_lock = 3; }
// PublicKeyHash      { bytes hash = 1; }
// KeyedSignature     { Signature signature = 1; PublicKey public_key = 2; }
// Signature          { Secp256k1Signature Secp256k1 = 1; }   Secp256k1Signature { bytes der = 1; }
// PublicKey          { bytes public_key = 1; }
// VTTransaction      { VTTransactionBody body = 1; repeated KeyedSignature signatures = 2; }
//
// Body hash = SHA-256(body bytes) và đây chính là bytes được ký.

use super::address::{WitAddress, MAINNET_HRP, PKH_LEN};
use crate::crypto::hash::sha256;
use crate::crypto::keys::PublicKey;
use crate::crypto::signature::Signature;
use crate::encoding::wire::{
    unexpected_field, write_bytes_field, write_varint_field, write_varint_field_nonzero,
    FieldValue, WireDecode, WireEncode, WireReader,
};
use crate::error::{EncodingError, TransactionError};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const TXID_LEN: usize = 32;

fn expect_bytes<'a>(
    message: &str,
    field: u32,
    value: FieldValue<'a>,
) -> Result<&'a [u8], EncodingError> {
    match value {
        FieldValue::Bytes(bytes) => Ok(bytes),
        FieldValue::Varint(_) => Err(EncodingError::Wire(format!(
            "field {} of {} must be length-delimited",
            field, message
        ))),
    }
}

fn expect_varint(message: &str, field: u32, value: FieldValue<'_>) -> Result<u64, EncodingError> {
    match value {
        FieldValue::Varint(v) => Ok(v),
        FieldValue::Bytes(_) => Err(EncodingError::Wire(format!(
            "field {} of {} must be a varint",
            field, message
        ))),
    }
}

/// Single-field message `{ bytes = 1 }` of a fixed length.
fn decode_fixed<const N: usize>(message: &str, bytes: &[u8]) -> Result<[u8; N], EncodingError> {
    let mut reader = WireReader::new(bytes);
    let mut out = None;
    while let Some((field, value)) = reader.next_field()? {
        match field {
            1 => out = Some(expect_bytes(message, field, value)?),
            other => return Err(unexpected_field(message, other)),
        }
    }
    let raw = out.ok_or_else(|| EncodingError::Wire(format!("{} is empty", message)))?;
    raw.try_into().map_err(|_| EncodingError::InvalidLength {
        expected: N,
        actual: raw.len(),
    })
}

// =============================================================================
// OUTPUT POINTER / INPUT
// =============================================================================

/// Reference to a previous output: `<txid hex>:<index>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct OutputPointer {
    transaction_id: [u8; TXID_LEN],
    output_index: u32,
}

impl OutputPointer {
    pub fn new(transaction_id: [u8; TXID_LEN], output_index: u32) -> Self {
        Self {
            transaction_id,
            output_index,
        }
    }

    #[inline]
    pub fn transaction_id(&self) -> &[u8; TXID_LEN] {
        &self.transaction_id
    }

    #[inline]
    pub fn output_index(&self) -> u32 {
        self.output_index
    }
}

impl FromStr for OutputPointer {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = |why: &str| TransactionError::InvalidOutputPointer(format!("'{}': {}", s, why));
        let (txid, index) = s.split_once(':').ok_or_else(|| bad("missing ':'"))?;
        let bytes = hex::decode(txid).map_err(|_| bad("transaction id is not hex"))?;
        let transaction_id: [u8; TXID_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| bad("transaction id must be 32 bytes"))?;
        let output_index = index
            .parse::<u32>()
            .map_err(|_| bad("output index is not a u32"))?;
        Ok(Self::new(transaction_id, output_index))
    }
}

impl fmt::Display for OutputPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", hex::encode(self.transaction_id), self.output_index)
    }
}

impl From<OutputPointer> for String {
    fn from(pointer: OutputPointer) -> Self {
        pointer.to_string()
    }
}

impl TryFrom<String> for OutputPointer {
    type Error = TransactionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl WireEncode for OutputPointer {
    fn encode_to(&self, out: &mut Vec<u8>) {
        let mut hash = Vec::with_capacity(TXID_LEN + 2);
        write_bytes_field(&mut hash, 1, &self.transaction_id);
        write_bytes_field(out, 1, &hash);
        write_varint_field_nonzero(out, 2, u64::from(self.output_index));
    }
}

impl WireDecode for OutputPointer {
    fn decode(bytes: &[u8]) -> Result<Self, EncodingError> {
        const MSG: &str = "OutputPointer";
        let mut reader = WireReader::new(bytes);
        let mut transaction_id = None;
        let mut output_index = 0u32;
        while let Some((field, value)) = reader.next_field()? {
            match field {
                1 => {
                    let hash = expect_bytes(MSG, field, value)?;
                    transaction_id = Some(decode_fixed::<TXID_LEN>("Hash", hash)?);
                }
                2 => {
                    let v = expect_varint(MSG, field, value)?;
                    output_index = u32::try_from(v).map_err(|_| {
                        EncodingError::Wire(format!("output index {} exceeds u32", v))
                    })?;
                }
                other => return Err(unexpected_field(MSG, other)),
            }
        }
        let transaction_id = transaction_id
            .ok_or_else(|| EncodingError::Wire("OutputPointer without transaction id".into()))?;
        Ok(Self::new(transaction_id, output_index))
    }
}

/// Spends one previous output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    pub output_pointer: OutputPointer,
}

impl Input {
    pub fn new(output_pointer: OutputPointer) -> Self {
        Self { output_pointer }
    }
}

impl WireEncode for Input {
    fn encode_to(&self, out: &mut Vec<u8>) {
        write_bytes_field(out, 1, &self.output_pointer.to_wire_bytes());
    }
}

impl WireDecode for Input {
    fn decode(bytes: &[u8]) -> Result<Self, EncodingError> {
        let mut reader = WireReader::new(bytes);
        let mut output_pointer = None;
        while let Some((field, value)) = reader.next_field()? {
            match field {
                1 => {
                    output_pointer = Some(OutputPointer::decode(expect_bytes("Input", field, value)?)?)
                }
                other => return Err(unexpected_field("Input", other)),
            }
        }
        output_pointer
            .map(Self::new)
            .ok_or_else(|| EncodingError::Wire("Input without output pointer".into()))
    }
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Value sent to an address, spendable after `time_lock` (0 = immediately).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueTransferOutput {
    pub pkh: WitAddress,
    pub value: u64,
    #[serde(default)]
    pub time_lock: u64,
}

impl ValueTransferOutput {
    pub fn new(pkh: WitAddress, value: u64, time_lock: u64) -> Self {
        Self {
            pkh,
            value,
            time_lock,
        }
    }

    fn decode_with_hrp(bytes: &[u8], hrp: &str) -> Result<Self, EncodingError> {
        const MSG: &str = "ValueTransferOutput";
        let mut reader = WireReader::new(bytes);
        let mut pkh = None;
        let mut value = 0u64;
        let mut time_lock = 0u64;
        while let Some((field, v)) = reader.next_field()? {
            match field {
                1 => pkh = Some(decode_fixed::<PKH_LEN>("PublicKeyHash", expect_bytes(MSG, field, v)?)?),
                2 => value = expect_varint(MSG, field, v)?,
                3 => time_lock = expect_varint(MSG, field, v)?,
                other => return Err(unexpected_field(MSG, other)),
            }
        }
        let pkh = pkh.ok_or_else(|| EncodingError::Wire("output without pkh".into()))?;
        Ok(Self::new(WitAddress::new(hrp, pkh), value, time_lock))
    }
}

impl WireEncode for ValueTransferOutput {
    fn encode_to(&self, out: &mut Vec<u8>) {
        let mut pkh = Vec::with_capacity(PKH_LEN + 2);
        write_bytes_field(&mut pkh, 1, self.pkh.pkh());
        write_bytes_field(out, 1, &pkh);
        write_varint_field(out, 2, self.value);
        write_varint_field_nonzero(out, 3, self.time_lock);
    }
}

// =============================================================================
// BODY
// =============================================================================

/// Inputs and outputs, in order. Its hash is what gets signed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VtTransactionBody {
    pub inputs: Vec<Input>,
    pub outputs: Vec<ValueTransferOutput>,
}

impl VtTransactionBody {
    pub fn new(inputs: Vec<Input>, outputs: Vec<ValueTransferOutput>) -> Self {
        Self { inputs, outputs }
    }

    /// `SHA-256(body bytes)`
    pub fn hash(&self) -> [u8; 32] {
        let bytes = self.to_wire_bytes();
        log::trace!("VTT body: {} bytes", bytes.len());
        sha256(&bytes)
    }

    /// Transaction id, hex of [`VtTransactionBody::hash`].
    pub fn txid(&self) -> String {
        hex::encode(self.hash())
    }

    pub fn total_output_value(&self) -> Result<u64, TransactionError> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, o| acc.checked_add(o.value))
            .ok_or(TransactionError::ValueOverflow)
    }

    /// Decodes a body whose outputs render with `hrp`.
    pub fn decode_with_hrp(bytes: &[u8], hrp: &str) -> Result<Self, EncodingError> {
        const MSG: &str = "VTTransactionBody";
        let mut reader = WireReader::new(bytes);
        let mut body = Self::default();
        while let Some((field, value)) = reader.next_field()? {
            match field {
                1 => body.inputs.push(Input::decode(expect_bytes(MSG, field, value)?)?),
                2 => body
                    .outputs
                    .push(ValueTransferOutput::decode_with_hrp(expect_bytes(MSG, field, value)?, hrp)?),
                other => return Err(unexpected_field(MSG, other)),
            }
        }
        Ok(body)
    }
}

impl WireEncode for VtTransactionBody {
    fn encode_to(&self, out: &mut Vec<u8>) {
        for input in &self.inputs {
            write_bytes_field(out, 1, &input.to_wire_bytes());
        }
        for output in &self.outputs {
            write_bytes_field(out, 2, &output.to_wire_bytes());
        }
    }
}

impl WireDecode for VtTransactionBody {
    /// Outputs get the mainnet prefix.
    fn decode(bytes: &[u8]) -> Result<Self, EncodingError> {
        Self::decode_with_hrp(bytes, MAINNET_HRP)
    }
}

// =============================================================================
// SIGNATURES
// =============================================================================

/// Signature plus the public key that verifies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedSignature {
    signature: Signature,
    public_key: PublicKey,
}

impl KeyedSignature {
    pub fn new(signature: Signature, public_key: PublicKey) -> Self {
        Self {
            signature,
            public_key,
        }
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    #[inline]
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn verify(&self, hash: &[u8; 32]) -> bool {
        self.public_key.verify(hash, &self.signature)
    }
}

impl WireEncode for KeyedSignature {
    fn encode_to(&self, out: &mut Vec<u8>) {
        let mut secp = Vec::new();
        write_bytes_field(&mut secp, 1, &self.signature.to_der());
        let mut signature = Vec::new();
        write_bytes_field(&mut signature, 1, &secp);
        let mut public_key = Vec::new();
        write_bytes_field(&mut public_key, 1, &self.public_key.to_compressed());

        write_bytes_field(out, 1, &signature);
        write_bytes_field(out, 2, &public_key);
    }
}

#[derive(Serialize)]
struct PublicKeyJson<'a> {
    bytes: &'a [u8],
    compressed: u8,
}

#[derive(Serialize)]
struct Secp256k1Json {
    der: Vec<u8>,
}

#[derive(Serialize)]
struct SignatureJson {
    #[serde(rename = "Secp256k1")]
    secp256k1: Secp256k1Json,
}

#[derive(Serialize)]
struct KeyedSignatureJson<'a> {
    public_key: PublicKeyJson<'a>,
    signature: SignatureJson,
}

/// Node JSON form: byte arrays, the pubkey split into prefix and x.
impl Serialize for KeyedSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let compressed = self.public_key.to_compressed();
        KeyedSignatureJson {
            public_key: PublicKeyJson {
                bytes: &compressed[1..],
                compressed: compressed[0],
            },
            signature: SignatureJson {
                secp256k1: Secp256k1Json {
                    der: self.signature.to_der(),
                },
            },
        }
        .serialize(serializer)
    }
}

// =============================================================================
// TRANSACTION
// =============================================================================

/// Signed value transfer: one [`KeyedSignature`] per input, positionally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VtTransaction {
    pub body: VtTransactionBody,
    pub signatures: Vec<KeyedSignature>,
}

/// `{"transaction": {"ValueTransfer": {...}}}` as sent to `inventory`.
#[derive(Debug, Serialize)]
pub struct InventoryItem<'a> {
    transaction: InventoryTransaction<'a>,
}

#[derive(Debug, Serialize)]
enum InventoryTransaction<'a> {
    ValueTransfer(&'a VtTransaction),
}

impl VtTransaction {
    pub fn new(body: VtTransactionBody, signatures: Vec<KeyedSignature>) -> Self {
        Self { body, signatures }
    }

    /// Hex transaction id (hash of the body only).
    pub fn txid(&self) -> String {
        self.body.txid()
    }

    /// `true` iff there is one signature per input and all verify.
    pub fn verify_signatures(&self) -> bool {
        let hash = self.body.hash();
        self.signatures.len() == self.body.inputs.len()
            && self.signatures.iter().all(|s| s.verify(&hash))
    }

    pub fn inventory_item(&self) -> InventoryItem<'_> {
        InventoryItem {
            transaction: InventoryTransaction::ValueTransfer(self),
        }
    }
}

impl WireEncode for VtTransaction {
    fn encode_to(&self, out: &mut Vec<u8>) {
        write_bytes_field(out, 1, &self.body.to_wire_bytes());
        for signature in &self.signatures {
            write_bytes_field(out, 2, &signature.to_wire_bytes());
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
