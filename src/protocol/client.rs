use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

use super::account::{
    AccountBalanceRequest, AccountBalanceResponse, AccountCreateRequest, AccountCreateResult,
    AccountDeleteRequest, AccountDeleteResult,
};
use super::contract::{
    ContractCallRequest, ContractCallResult, ContractCreateRequest, ContractCreateResult,
    ContractDeleteRequest, ContractDeleteResult,
};
use super::file::{
    FileAppendRequest, FileAppendResult, FileContentsRequest, FileContentsResponse,
    FileCreateRequest, FileCreateResult, FileDeleteRequest, FileDeleteResult, FileInfoRequest,
    FileInfoResponse, FileUpdateRequest, FileUpdateResult,
};
use super::listener::{ListenerHandle, ListenerRegistry, TransactionEvent, TransactionListener};
use super::token::{
    TokenAssociateRequest, TokenAssociateResult, TokenBurnRequest, TokenBurnResult,
    TokenCreateRequest, TokenCreateResult, TokenMintRequest, TokenMintResult,
    TokenTransferRequest, TokenTransferResult,
};
use super::transport::{
    NetworkTransport, Query, SignaturePair, SignedTransaction, TransactionBody, TransportError,
};
use super::{ProtocolLayerClient, QueryOperation, TransactionOperation, TransactionResult};
use crate::crypto::PrivateKey;
use crate::error::{HederaError, OperationFailure, Result};
use crate::json::canonical_bytes;
use crate::types::{Account, AccountId, Status, TransactionId};

/// Bytes covered by every signature of a transaction.
#[derive(Serialize)]
struct SignedPayload<'a> {
    transaction_id: &'a TransactionId,
    memo: &'a str,
    body: &'a TransactionBody,
}

/// Hands out strictly increasing valid-start times for one payer.
#[derive(Debug, Default)]
struct TransactionIdGenerator {
    last_nanos: AtomicI64,
}

impl TransactionIdGenerator {
    fn next(&self, payer: AccountId) -> TransactionId {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as i64)
            .unwrap_or_default();
        let previous = self
            .last_nanos
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        let nanos = now.max(previous + 1);
        TransactionId {
            account_id: payer,
            valid_start_seconds: nanos / 1_000_000_000,
            valid_start_nanos: (nanos % 1_000_000_000) as u32,
        }
    }
}

/// [`ProtocolLayerClient`] that signs as `operator` and submits through a
/// [`NetworkTransport`].
///
/// Safe to share between tasks: each call builds its own transaction, and
/// the listener registry is the only shared mutable state.
pub struct HederaProtocolClient<T: ?Sized> {
    transport: Arc<T>,
    operator: Account,
    memo: String,
    listeners: ListenerRegistry,
    transaction_ids: Arc<TransactionIdGenerator>,
}

impl<T: ?Sized> Clone for HederaProtocolClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            operator: self.operator.clone(),
            memo: self.memo.clone(),
            listeners: self.listeners.clone(),
            transaction_ids: Arc::clone(&self.transaction_ids),
        }
    }
}

impl<T: NetworkTransport + ?Sized> HederaProtocolClient<T> {
    pub fn new(transport: Arc<T>, operator: Account) -> Self {
        Self {
            transport,
            operator,
            memo: String::new(),
            listeners: ListenerRegistry::new(),
            transaction_ids: Arc::default(),
        }
    }

    /// Memo attached to every transaction this client submits.
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    pub fn operator(&self) -> &Account {
        &self.operator
    }

    fn sign<O: TransactionOperation>(
        &self,
        request: &O,
    ) -> std::result::Result<SignedTransaction, OperationFailure> {
        let transaction_id = self.transaction_ids.next(self.operator.account_id);
        let body = request.body(&self.operator);
        let body_bytes = canonical_bytes(&SignedPayload {
            transaction_id: &transaction_id,
            memo: &self.memo,
            body: &body,
        })
        .map_err(|e| OperationFailure::Encoding(e.to_string()))?;

        let mut keys: Vec<&PrivateKey> = vec![&self.operator.private_key];
        let mut seen = vec![self.operator.public_key.clone()];
        for key in request.signers() {
            let public_key = key.public_key();
            if !seen.contains(&public_key) {
                seen.push(public_key);
                keys.push(key);
            }
        }

        let signatures = keys
            .into_iter()
            .zip(seen)
            .map(|(key, public_key)| {
                key.sign(&body_bytes)
                    .map(|signature| SignaturePair {
                        public_key,
                        signature,
                    })
                    .map_err(OperationFailure::Signing)
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(SignedTransaction {
            transaction_id,
            memo: self.memo.clone(),
            body,
            body_bytes,
            signatures,
        })
    }

    fn notify(&self, operation: &'static str, transaction_id: TransactionId, status: Status) {
        self.listeners.notify(&TransactionEvent {
            operation,
            transaction_id,
            status,
        });
    }

    /// Sign, submit and wait for the receipt of one transaction.
    ///
    /// Listeners are notified once the outcome is known, before it is returned.
    async fn execute_transaction<O: TransactionOperation>(&self, request: O) -> Result<O::Output> {
        let operation = <O::Output as TransactionResult>::OPERATION;
        let transaction = self
            .sign(&request)
            .map_err(|e| HederaError::operation(operation, e))?;
        let transaction_id = transaction.transaction_id;

        debug!(
            operation,
            tx_id = %transaction_id,
            signatures = transaction.signatures.len(),
            "submitting transaction"
        );

        let receipt = match self.transport.submit_transaction(transaction).await {
            Ok(receipt) => receipt,
            Err(e) => {
                let status = match &e {
                    TransportError::PrecheckFailed(status) => *status,
                    _ => Status::TransportFailure,
                };
                warn!(operation, tx_id = %transaction_id, error = %e, "transaction failed");
                self.notify(operation, transaction_id, status);
                return Err(HederaError::operation(operation, e));
            }
        };

        let status = receipt.status;
        let outcome = if receipt.transaction_id != transaction_id {
            Err(OperationFailure::UnexpectedResponse(format!(
                "receipt for {} returned for {transaction_id}",
                receipt.transaction_id
            )))
        } else {
            request.into_output(receipt)
        };

        if status.is_success() {
            info!(operation, tx_id = %transaction_id, status = %status, "transaction complete");
        } else {
            warn!(operation, tx_id = %transaction_id, status = %status, "transaction rejected");
        }
        self.notify(operation, transaction_id, status);

        outcome.map_err(|e| HederaError::operation(operation, e))
    }

    async fn execute_query<Q: QueryOperation>(&self, request: Q) -> Result<Q::Output> {
        let query = Query {
            payer: self.operator.account_id,
            kind: request.query(),
        };
        debug!(operation = Q::OPERATION, query = ?query.kind, "running query");

        let response = self
            .transport
            .submit_query(query)
            .await
            .map_err(|e| HederaError::operation(Q::OPERATION, e))?;
        request
            .into_output(response)
            .map_err(|e| HederaError::operation(Q::OPERATION, e))
    }
}

#[async_trait]
impl<T: NetworkTransport + ?Sized> ProtocolLayerClient for HederaProtocolClient<T> {
    async fn execute_account_balance_query(
        &self,
        request: AccountBalanceRequest,
    ) -> Result<AccountBalanceResponse> {
        self.execute_query(request).await
    }

    async fn execute_file_contents_query(
        &self,
        request: FileContentsRequest,
    ) -> Result<FileContentsResponse> {
        self.execute_query(request).await
    }

    async fn execute_file_append_transaction(
        &self,
        request: FileAppendRequest,
    ) -> Result<FileAppendResult> {
        self.execute_transaction(request).await
    }

    async fn execute_file_delete_transaction(
        &self,
        request: FileDeleteRequest,
    ) -> Result<FileDeleteResult> {
        self.execute_transaction(request).await
    }

    async fn execute_file_create_transaction(
        &self,
        request: FileCreateRequest,
    ) -> Result<FileCreateResult> {
        self.execute_transaction(request).await
    }

    async fn execute_file_update_transaction(
        &self,
        request: FileUpdateRequest,
    ) -> Result<FileUpdateResult> {
        self.execute_transaction(request).await
    }

    async fn execute_file_info_query(&self, request: FileInfoRequest) -> Result<FileInfoResponse> {
        self.execute_query(request).await
    }

    async fn execute_contract_create_transaction(
        &self,
        request: ContractCreateRequest,
    ) -> Result<ContractCreateResult> {
        self.execute_transaction(request).await
    }

    async fn execute_contract_call_transaction(
        &self,
        request: ContractCallRequest,
    ) -> Result<ContractCallResult> {
        self.execute_transaction(request).await
    }

    async fn execute_contract_delete_transaction(
        &self,
        request: ContractDeleteRequest,
    ) -> Result<ContractDeleteResult> {
        self.execute_transaction(request).await
    }

    async fn execute_account_create_transaction(
        &self,
        request: AccountCreateRequest,
    ) -> Result<AccountCreateResult> {
        self.execute_transaction(request).await
    }

    async fn execute_account_delete_transaction(
        &self,
        request: AccountDeleteRequest,
    ) -> Result<AccountDeleteResult> {
        self.execute_transaction(request).await
    }

    async fn execute_token_create_transaction(
        &self,
        request: TokenCreateRequest,
    ) -> Result<TokenCreateResult> {
        self.execute_transaction(request).await
    }

    async fn execute_token_associate_transaction(
        &self,
        request: TokenAssociateRequest,
    ) -> Result<TokenAssociateResult> {
        self.execute_transaction(request).await
    }

    async fn execute_mint_token_transaction(
        &self,
        request: TokenMintRequest,
    ) -> Result<TokenMintResult> {
        self.execute_transaction(request).await
    }

    async fn execute_burn_token_transaction(
        &self,
        request: TokenBurnRequest,
    ) -> Result<TokenBurnResult> {
        self.execute_transaction(request).await
    }

    async fn execute_transfer_transaction_for_nft(
        &self,
        request: TokenTransferRequest,
    ) -> Result<TokenTransferResult> {
        self.execute_transaction(request).await
    }

    fn add_transaction_listener(&self, listener: Arc<dyn TransactionListener>) -> ListenerHandle {
        self.listeners.register(listener)
    }
}
