// wallet-core/src/network/mod.rs
//
// Network Module - Witnet node boundary
//
// Cung cấp:
// - Models: JSON-RPC envelope, UTXO info, balance
// - Traits: `NodeProvider` (thứ wallet cần từ node) + `JsonRpcTransport`

pub mod models;
pub mod traits;

// Re-export cho convenience
pub use models::*;
pub use traits::*;
