//! # Protocol Layer
//!
//! One request/result pair per network operation, and the
//! [`ProtocolLayerClient`] interface that executes them.
//!
//! Every operation:
//! - takes a request that was validated when it was constructed
//! - signs with the operator key plus the keys the request names
//! - waits for the terminal receipt or query response
//! - reports transport, signing and encoding failures through [`HederaError`]
//!
//! A receipt that arrives with a non-success status is not an error: it is
//! returned in the result's `status`. Callers that need the payload use
//! [`TransactionResult::require_success`].

use async_trait::async_trait;
use std::sync::Arc;

use crate::crypto::PrivateKey;
use crate::error::{HederaError, OperationFailure, Result};
use crate::types::{Account, Status, TransactionId};

pub mod account;
pub mod client;
pub mod contract;
pub mod file;
pub mod listener;
pub mod token;
pub mod transport;

pub use account::{
    AccountBalanceRequest, AccountBalanceResponse, AccountCreateRequest, AccountCreateResult,
    AccountDeleteRequest, AccountDeleteResult,
};
pub use client::HederaProtocolClient;
pub use contract::{
    ContractCallRequest, ContractCallResult, ContractCreateRequest, ContractCreateResult,
    ContractDeleteRequest, ContractDeleteResult,
};
pub use file::{
    FileAppendRequest, FileAppendResult, FileContentsRequest, FileContentsResponse,
    FileCreateRequest, FileCreateResult, FileDeleteRequest, FileDeleteResult, FileInfoRequest,
    FileInfoResponse, FileUpdateRequest, FileUpdateResult,
};
pub use listener::{ListenerHandle, TransactionEvent, TransactionListener};
pub use token::{
    TokenAssociateRequest, TokenAssociateResult, TokenBurnRequest, TokenBurnResult,
    TokenCreateRequest, TokenCreateResult, TokenMintRequest, TokenMintResult,
    TokenTransferRequest, TokenTransferResult,
};
pub use transport::{NetworkTransport, TransportError};

use transport::{QueryKind, QueryResponse, TransactionBody, TransactionReceipt};

/// Shape shared by every result of a transaction-producing operation.
pub trait TransactionResult: Sized {
    /// Operation name used in errors and transaction events.
    const OPERATION: &'static str;

    fn transaction_id(&self) -> TransactionId;

    fn status(&self) -> Status;

    /// Turn an in-band rejection into the unified error.
    fn require_success(self) -> Result<Self> {
        if self.status().is_success() {
            Ok(self)
        } else {
            Err(HederaError::operation(
                Self::OPERATION,
                OperationFailure::Rejected {
                    transaction_id: self.transaction_id(),
                    status: self.status(),
                },
            ))
        }
    }
}

macro_rules! transaction_result {
    ($result:ty, $operation:literal) => {
        impl $crate::protocol::TransactionResult for $result {
            const OPERATION: &'static str = $operation;

            fn transaction_id(&self) -> $crate::types::TransactionId {
                self.transaction_id
            }

            fn status(&self) -> $crate::types::Status {
                self.status
            }
        }
    };
}
pub(crate) use transaction_result;

/// Handler for one transaction kind: how to build its body, who signs it and
/// how to read its receipt.
pub trait TransactionOperation: Send + Sync {
    type Output: TransactionResult + Send;

    fn body(&self, operator: &Account) -> TransactionBody;

    /// Keys that must sign in addition to the operator.
    fn signers(&self) -> Vec<&PrivateKey>;

    fn into_output(
        &self,
        receipt: TransactionReceipt,
    ) -> std::result::Result<Self::Output, OperationFailure>;
}

/// Handler for one query kind.
pub trait QueryOperation: Send + Sync {
    type Output: Send;

    const OPERATION: &'static str;

    fn query(&self) -> QueryKind;

    fn into_output(
        &self,
        response: QueryResponse,
    ) -> std::result::Result<Self::Output, OperationFailure>;
}

/// Receipt payload that must be present once the receipt reports success.
pub(crate) fn expect_on_success<T>(
    receipt: &TransactionReceipt,
    value: Option<T>,
    what: &str,
) -> std::result::Result<Option<T>, OperationFailure> {
    match (receipt.status.is_success(), value) {
        (true, None) => Err(OperationFailure::UnexpectedResponse(format!(
            "receipt for {} reports success but carries no {what}",
            receipt.transaction_id
        ))),
        (_, value) => Ok(value),
    }
}

/// Payload of a result that already passed [`TransactionResult::require_success`].
pub(crate) fn success_payload<T>(operation: &'static str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| {
        HederaError::operation(
            operation,
            OperationFailure::UnexpectedResponse("missing payload".to_string()),
        )
    })
}

pub(crate) fn unexpected_response(expected: &str, response: &QueryResponse) -> OperationFailure {
    OperationFailure::UnexpectedResponse(format!(
        "expected {expected} response, got {}",
        response.kind_name()
    ))
}

/// Interface for interacting with the network at the protocol level.
#[async_trait]
pub trait ProtocolLayerClient: Send + Sync {
    async fn execute_account_balance_query(
        &self,
        request: AccountBalanceRequest,
    ) -> Result<AccountBalanceResponse>;

    async fn execute_file_contents_query(
        &self,
        request: FileContentsRequest,
    ) -> Result<FileContentsResponse>;

    async fn execute_file_append_transaction(
        &self,
        request: FileAppendRequest,
    ) -> Result<FileAppendResult>;

    async fn execute_file_delete_transaction(
        &self,
        request: FileDeleteRequest,
    ) -> Result<FileDeleteResult>;

    async fn execute_file_create_transaction(
        &self,
        request: FileCreateRequest,
    ) -> Result<FileCreateResult>;

    async fn execute_file_update_transaction(
        &self,
        request: FileUpdateRequest,
    ) -> Result<FileUpdateResult>;

    async fn execute_file_info_query(&self, request: FileInfoRequest) -> Result<FileInfoResponse>;

    async fn execute_contract_create_transaction(
        &self,
        request: ContractCreateRequest,
    ) -> Result<ContractCreateResult>;

    async fn execute_contract_call_transaction(
        &self,
        request: ContractCallRequest,
    ) -> Result<ContractCallResult>;

    async fn execute_contract_delete_transaction(
        &self,
        request: ContractDeleteRequest,
    ) -> Result<ContractDeleteResult>;

    async fn execute_account_create_transaction(
        &self,
        request: AccountCreateRequest,
    ) -> Result<AccountCreateResult>;

    async fn execute_account_delete_transaction(
        &self,
        request: AccountDeleteRequest,
    ) -> Result<AccountDeleteResult>;

    async fn execute_token_create_transaction(
        &self,
        request: TokenCreateRequest,
    ) -> Result<TokenCreateResult>;

    async fn execute_token_associate_transaction(
        &self,
        request: TokenAssociateRequest,
    ) -> Result<TokenAssociateResult>;

    async fn execute_mint_token_transaction(
        &self,
        request: TokenMintRequest,
    ) -> Result<TokenMintResult>;

    async fn execute_burn_token_transaction(
        &self,
        request: TokenBurnRequest,
    ) -> Result<TokenBurnResult>;

    async fn execute_transfer_transaction_for_nft(
        &self,
        request: TokenTransferRequest,
    ) -> Result<TokenTransferResult>;

    /// Register a listener for every completed transaction.
    fn add_transaction_listener(&self, listener: Arc<dyn TransactionListener>) -> ListenerHandle;
}
