//! Boundary to the ledger network.
//!
//! The protocol client only needs a way to submit a signed transaction and
//! wait for its receipt, and a way to run a query. Connection setup, node
//! selection and wire-level retries belong to the [`NetworkTransport`]
//! implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use std::time::Duration;
use thiserror::Error;

use crate::crypto::PublicKey;
use crate::types::{
    AccountId, ContractId, FileId, Hbar, Status, TokenId, TokenType, TransactionId,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("network unavailable: {0}")]
    Unavailable(String),

    #[error("timed out after {0:?} waiting for finality")]
    Timeout(Duration),

    /// The node refused the transaction before it reached consensus, so no
    /// receipt exists.
    #[error("precheck failed with status {0}")]
    PrecheckFailed(Status),

    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait NetworkTransport: Send + Sync {
    /// Submit a signed transaction and wait for its receipt.
    async fn submit_transaction(
        &self,
        transaction: SignedTransaction,
    ) -> Result<TransactionReceipt, TransportError>;

    /// Run a query and wait for its response.
    async fn submit_query(&self, query: Query) -> Result<QueryResponse, TransportError>;
}

/// One variant per transaction kind the protocol client can submit.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionBody {
    FileCreate {
        #[serde_as(as = "Hex")]
        contents: Vec<u8>,
        keys: Vec<PublicKey>,
        expiration_time: Option<DateTime<Utc>>,
    },
    FileAppend {
        file_id: FileId,
        #[serde_as(as = "Hex")]
        contents: Vec<u8>,
    },
    FileUpdate {
        file_id: FileId,
        #[serde_as(as = "Option<Hex>")]
        contents: Option<Vec<u8>>,
        expiration_time: Option<DateTime<Utc>>,
    },
    FileDelete {
        file_id: FileId,
    },
    ContractCreate {
        bytecode_file_id: FileId,
        #[serde_as(as = "Hex")]
        constructor_parameters: Vec<u8>,
        gas: u64,
        admin_key: PublicKey,
    },
    ContractCall {
        contract_id: ContractId,
        #[serde_as(as = "Hex")]
        function_parameters: Vec<u8>,
        gas: u64,
        amount: Hbar,
    },
    ContractDelete {
        contract_id: ContractId,
        transfer_account_id: AccountId,
    },
    AccountCreate {
        key: PublicKey,
        initial_balance: Hbar,
    },
    AccountDelete {
        account_id: AccountId,
        transfer_account_id: AccountId,
    },
    TokenCreate {
        name: String,
        symbol: String,
        treasury_account_id: AccountId,
        token_type: TokenType,
        supply_key: Option<PublicKey>,
    },
    TokenAssociate {
        account_id: AccountId,
        token_ids: Vec<TokenId>,
    },
    TokenMint {
        token_id: TokenId,
        #[serde_as(as = "Vec<Hex>")]
        metadata: Vec<Vec<u8>>,
    },
    TokenBurn {
        token_id: TokenId,
        serials: Vec<u64>,
    },
    NftTransfer {
        token_id: TokenId,
        serials: Vec<u64>,
        sender: AccountId,
        receiver: AccountId,
    },
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePair {
    pub public_key: PublicKey,
    #[serde_as(as = "Hex")]
    pub signature: Vec<u8>,
}

/// A transaction ready for submission.
///
/// `body_bytes` is the canonical encoding every signature in `signatures`
/// was produced over.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTransaction {
    pub transaction_id: TransactionId,
    pub memo: String,
    pub body: TransactionBody,
    pub body_bytes: Vec<u8>,
    pub signatures: Vec<SignaturePair>,
}

impl SignedTransaction {
    /// Returns true when some signature in the map was made by `key`.
    pub fn is_signed_by(&self, key: &PublicKey) -> bool {
        self.signatures
            .iter()
            .any(|pair| &pair.public_key == key && key.verify(&self.body_bytes, &pair.signature))
    }
}

/// Result of a contract function execution.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractFunctionResult {
    pub gas_used: u64,
    #[serde_as(as = "Hex")]
    pub bytes: Vec<u8>,
    pub error_message: Option<String>,
}

/// Terminal receipt of a submitted transaction.
///
/// Entity fields are only populated for the transaction kinds that create
/// them and only when `status` is [`Status::Success`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_id: TransactionId,
    pub status: Status,
    #[serde(default)]
    pub account_id: Option<AccountId>,
    #[serde(default)]
    pub file_id: Option<FileId>,
    #[serde(default)]
    pub contract_id: Option<ContractId>,
    #[serde(default)]
    pub token_id: Option<TokenId>,
    #[serde(default)]
    pub serials: Vec<u64>,
    #[serde(default)]
    pub transaction_fee: Hbar,
    #[serde(default)]
    pub contract_function_result: Option<ContractFunctionResult>,
}

impl TransactionReceipt {
    pub fn new(transaction_id: TransactionId, status: Status) -> Self {
        Self {
            transaction_id,
            status,
            account_id: None,
            file_id: None,
            contract_id: None,
            token_id: None,
            serials: Vec::new(),
            transaction_fee: Hbar::ZERO,
            contract_function_result: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryKind {
    AccountBalance { account_id: AccountId },
    FileContents { file_id: FileId },
    FileInfo { file_id: FileId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub payer: AccountId,
    pub kind: QueryKind,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryResponse {
    AccountBalance {
        account_id: AccountId,
        hbars: Hbar,
    },
    FileContents {
        file_id: FileId,
        #[serde_as(as = "Hex")]
        contents: Vec<u8>,
    },
    FileInfo {
        file_id: FileId,
        size: u64,
        deleted: bool,
        expiration_time: DateTime<Utc>,
    },
}

impl QueryResponse {
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            QueryResponse::AccountBalance { .. } => "account_balance",
            QueryResponse::FileContents { .. } => "file_contents",
            QueryResponse::FileInfo { .. } => "file_info",
        }
    }
}
