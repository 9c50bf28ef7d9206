//! Client library for the Hedera network.
//!
//! - [`protocol`]: one request/result pair per network operation and the
//!   [`ProtocolLayerClient`] that signs, submits and awaits them
//! - [`clients`]: domain clients with operator-defaulted keys
//! - [`verification`]: contract source verification against Sourcify

pub mod clients;
pub mod config;
pub mod crypto;
pub mod env_file;
pub mod error;
pub mod json;
pub mod protocol;
pub mod types;
pub mod verification;

#[cfg(test)]
pub(crate) mod testing;

pub use clients::{AccountClient, FileClient, NftClient, SmartContractClient};
pub use crypto::{PrivateKey, PublicKey};
pub use error::{HederaError, OperationFailure, Result, ValidationError};
pub use protocol::{
    HederaProtocolClient, ListenerHandle, NetworkTransport, ProtocolLayerClient,
    TransactionEvent, TransactionListener, TransactionResult, TransportError,
};
pub use types::{
    Account, AccountId, ContractId, FileId, Hbar, Status, StatusCategory, TokenId, TokenType,
    TransactionId,
};
pub use verification::{
    ContractVerificationClient, ContractVerificationState, ContractVerifier,
    SourcifyVerificationClient, VerificationError,
};
