//! Domain clients over a [`ProtocolLayerClient`](crate::protocol::ProtocolLayerClient).
//!
//! Each client is constructed with the protocol client and the operational
//! account. Methods that omit a key or an account use the operational one
//! and delegate to their fully explicit counterpart.

mod account;
mod file;
mod nft;
mod smart_contract;

pub use account::AccountClient;
pub use file::FileClient;
pub use nft::NftClient;
pub use smart_contract::SmartContractClient;
