// wallet-core/src/api/mod.rs

//! Thin facade over the core: wallet creation / restore, address derivation,
//! master key export and import.

#[allow(clippy::module_inception)]
pub mod api;

pub use api::*;
