// wallet-core/src/error.rs

use thiserror::Error;

pub type WalletResult<T> = std::result::Result<T, WalletError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("Mnemonic Error: {0}")]
    Mnemonic(#[from] MnemonicError),

    #[error("Cryptography Error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Encoding Error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Transaction Error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("Network Error: {0}")]
    Network(String),

    #[error("Validation Error: {0}")]
    Validation(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MnemonicError {
    #[error("Invalid word count: {0}. Expected 12, 15, 18, 21 or 24 words.")]
    InvalidWordCount(usize),

    #[error("Invalid entropy length: {0} bytes. Expected 16, 20, 24, 28 or 32.")]
    InvalidEntropyLength(usize),

    #[error("Word '{0}' not found in the wordlist.")]
    UnknownWord(String),

    #[error("Checksum validation failed.")]
    ChecksumFailed,

    #[error("Wordlist configuration error: {0}")]
    Configuration(String),

    #[error("Language not detected")]
    LanguageNotDetected,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Point ({0}) is not on the curve")]
    InvalidPoint(String),

    #[error("Invalid curve parameters: {0}")]
    InvalidCurve(String),

    #[error("Points belong to different curves")]
    CurveMismatch,

    #[error("Key is zero or not smaller than the curve order")]
    KeyTooLarge,

    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Invalid seed length: {0} bytes (must be between 16 and 64)")]
    InvalidSeedLength(usize),

    #[error("Malformed signature: {0}")]
    MalformedSignature(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Base58 decode error: {0}")]
    Base58Decode(String),

    #[error("Bech32 decode error: {0}")]
    Bech32Decode(String),

    /// Base58Check checksum mismatch. Bech32 checksum failures are `Bech32Decode`.
    #[error("Invalid checksum")]
    InvalidChecksum,

    #[error("Invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Wire format error: {0}")]
    Wire(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid output pointer: {0}")]
    InvalidOutputPointer(String),

    #[error("Transaction has no outputs")]
    EmptyOutputs,

    #[error("Value overflow while summing outputs")]
    ValueOverflow,
}
