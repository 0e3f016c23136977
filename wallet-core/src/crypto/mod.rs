// wallet-core/src/crypto/mod.rs

//! Core Cryptography Module
//!
//! Everything here is built on an explicit [`Curve`] value shared by `Arc`:
//!
//! - **Curve / Point**: secp256k1 field and group arithmetic via [`curve`] and [`point`].
//! - **Keys & Signatures**: ECDSA with random nonces, low-S, DER/compact codecs via [`keys`] and [`signature`].
//! - **Mnemonic Generation**: BIP-39 phrases and seed stretching via [`Mnemonic`] / [`WalletMnemonic`].
//! - **Key Derivation**: BIP-32 extended keys via [`Xprv`] / [`Xpub`].
//! - **Derivation Paths**: Witnet path builders via [`DerivationPaths`].

pub mod curve;
pub mod hash;
pub mod key_deriver;
pub mod keys;
pub mod mnemonic;
pub mod paths;
pub mod point;
pub mod signature;

// Re-exports for cleaner API access
pub use curve::{Curve, CurveRef};
pub use key_deriver::{ExtendedKey, KeyVersions, Xprv, Xpub};
pub use keys::{PrivateKey, PublicKey};
pub use mnemonic::{Language, Mnemonic, WalletMnemonic, WordCount};
pub use paths::{ChildNumber, DerivationPath, DerivationPaths};
pub use point::Point;
pub use signature::Signature;
