// wallet-core/src/lib.rs

//! Witnet wallet core
//!
//! - [`crypto`]: secp256k1, ECDSA, BIP-39 mnemonics, BIP-32 extended keys
//! - [`encoding`]: Base58Check, Bech32, protobuf wire primitives
//! - [`chains`]: network presets and Witnet addresses / value transfers
//! - [`network`]: JSON-RPC models and the node provider boundary
//! - [`api`]: high-level wallet operations

pub mod api;
pub mod chains;
pub mod crypto;
pub mod encoding;
pub mod error;
pub mod network;

pub use chains::WitChainConfig;
pub use error::{WalletError, WalletResult};
