// wallet-core/src/encoding/mod.rs

//! Byte/text codecs
//!
//! - **Base58Check**: extended key strings (`xprv...` / `xpub...`) via [`base58`].
//! - **Bech32**: `wit1...` addresses and the compact `xprv1...` master key via [`bech32`].
//! - **Wire**: protobuf-compatible primitives for transaction hashing via [`wire`].

pub mod base58;
pub mod bech32;
pub mod wire;

pub use wire::{WireDecode, WireEncode, WireReader};
