// wallet-core/src/chains/wit/mod.rs

//! Witnet Chain Support
//!
//! # Key Features
//! - **Address Derivation**: `wit1...` Bech32 addresses over a SHA-256 PKH via [`WitAddress`].
//! - **Transactions**: Value Transfer schema with byte-exact wire encoding via [`VtTransaction`].
//! - **Signing**: UTXO selection, change and signatures via [`WitSigner`].
//! - **Units**: nanowit ↔ WIT conversion via [`units`].

pub mod address;
pub mod signer;
pub mod transaction;
pub mod units;

// Re-exports for cleaner API access
pub use address::{pubkey_to_address, pubkey_to_pkh, WitAddress};
pub use signer::{create_vtt, send_vtt, VttOutcome, WitSigner};
pub use transaction::{
    Input, KeyedSignature, OutputPointer, ValueTransferOutput, VtTransaction, VtTransactionBody,
};
pub use units::{nanowit_to_wit, wit_to_nanowit};
