//! Fixtures shared by the unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::crypto::PrivateKey;
use crate::protocol::transport::{
    ContractFunctionResult, NetworkTransport, Query, QueryKind, QueryResponse, SignedTransaction,
    TransactionBody, TransactionReceipt, TransportError,
};
use crate::types::{Account, AccountId, ContractId, FileId, Hbar, Status, TokenId, TransactionId};

pub(crate) fn test_key(seed: u8) -> PrivateKey {
    PrivateKey::ed25519_from_bytes(&[seed; 32]).unwrap()
}

pub(crate) fn operator() -> Account {
    Account::new(AccountId::from_num(2), test_key(1))
}

pub(crate) fn tx_id(n: u32) -> TransactionId {
    TransactionId {
        account_id: AccountId::from_num(2),
        valid_start_seconds: 1_700_000_000 + i64::from(n),
        valid_start_nanos: 0,
    }
}

enum Scripted {
    Fail(TransportError),
    Reject(Status),
    Respond(TransactionReceipt),
}

#[derive(Debug, Clone)]
pub(crate) struct StoredFile {
    pub contents: Vec<u8>,
    pub deleted: bool,
    pub expiration_time: DateTime<Utc>,
}

/// In-memory ledger standing in for the network.
///
/// Accepts every correctly signed transaction, assigns entity ids from 1001
/// upwards and keeps file contents so file operations can be read back.
/// Outcomes can be scripted per submission with `fail_next` and friends.
pub(crate) struct MockTransport {
    submitted: Mutex<Vec<SignedTransaction>>,
    queries: Mutex<Vec<Query>>,
    script: Mutex<VecDeque<Scripted>>,
    next_entity: AtomicU64,
    serials: Mutex<HashMap<TokenId, u64>>,
    files: Mutex<HashMap<FileId, StoredFile>>,
    balances: Mutex<HashMap<AccountId, Hbar>>,
    call_result: Mutex<ContractFunctionResult>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            submitted: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            script: Mutex::new(VecDeque::new()),
            next_entity: AtomicU64::new(1001),
            serials: Mutex::new(HashMap::new()),
            files: Mutex::new(HashMap::new()),
            balances: Mutex::new(HashMap::new()),
            call_result: Mutex::new(ContractFunctionResult {
                gas_used: 21_000,
                bytes: Vec::new(),
                error_message: None,
            }),
        }
    }

    pub fn fail_next(&self, error: TransportError) {
        self.script.lock().push_back(Scripted::Fail(error));
    }

    pub fn reject_next(&self, status: Status) {
        self.script.lock().push_back(Scripted::Reject(status));
    }

    pub fn respond_next(&self, receipt: TransactionReceipt) {
        self.script.lock().push_back(Scripted::Respond(receipt));
    }

    pub fn set_balance(&self, account_id: AccountId, hbars: Hbar) {
        self.balances.lock().insert(account_id, hbars);
    }

    pub fn set_call_result(&self, result: ContractFunctionResult) {
        *self.call_result.lock() = result;
    }

    pub fn submitted(&self) -> Vec<SignedTransaction> {
        self.submitted.lock().clone()
    }

    pub fn bodies(&self) -> Vec<TransactionBody> {
        self.submitted.lock().iter().map(|t| t.body.clone()).collect()
    }

    pub fn queries(&self) -> Vec<Query> {
        self.queries.lock().clone()
    }

    pub fn file(&self, file_id: FileId) -> Option<StoredFile> {
        self.files.lock().get(&file_id).cloned()
    }

    fn next_num(&self) -> u64 {
        self.next_entity.fetch_add(1, Ordering::SeqCst)
    }

    fn apply(&self, body: &TransactionBody, receipt: &mut TransactionReceipt) {
        match body {
            TransactionBody::FileCreate {
                contents,
                expiration_time,
                ..
            } => {
                let file_id = FileId::from_num(self.next_num());
                self.files.lock().insert(
                    file_id,
                    StoredFile {
                        contents: contents.clone(),
                        deleted: false,
                        expiration_time: expiration_time
                            .unwrap_or_else(|| Utc::now() + Duration::days(90)),
                    },
                );
                receipt.file_id = Some(file_id);
            }
            TransactionBody::FileAppend { file_id, contents } => {
                self.with_file(*file_id, receipt, |file| file.contents.extend(contents));
            }
            TransactionBody::FileUpdate {
                file_id,
                contents,
                expiration_time,
            } => {
                self.with_file(*file_id, receipt, |file| {
                    if let Some(contents) = contents {
                        file.contents = contents.clone();
                    }
                    if let Some(expiration_time) = expiration_time {
                        file.expiration_time = *expiration_time;
                    }
                });
            }
            TransactionBody::FileDelete { file_id } => {
                self.with_file(*file_id, receipt, |file| file.deleted = true);
            }
            TransactionBody::ContractCreate { .. } => {
                receipt.contract_id = Some(ContractId::from_num(self.next_num()));
            }
            TransactionBody::ContractCall { .. } => {
                receipt.contract_function_result = Some(self.call_result.lock().clone());
                receipt.transaction_fee = Hbar::from_tinybars(1_000);
            }
            TransactionBody::AccountCreate {
                initial_balance, ..
            } => {
                let account_id = AccountId::from_num(self.next_num());
                self.set_balance(account_id, *initial_balance);
                receipt.account_id = Some(account_id);
            }
            TransactionBody::TokenCreate { .. } => {
                receipt.token_id = Some(TokenId::from_num(self.next_num()));
            }
            TransactionBody::TokenMint { token_id, metadata } => {
                let mut serials = self.serials.lock();
                let last = serials.entry(*token_id).or_insert(0);
                receipt.serials = metadata
                    .iter()
                    .map(|_| {
                        *last += 1;
                        *last
                    })
                    .collect();
            }
            TransactionBody::ContractDelete { .. }
            | TransactionBody::AccountDelete { .. }
            | TransactionBody::TokenAssociate { .. }
            | TransactionBody::TokenBurn { .. }
            | TransactionBody::NftTransfer { .. } => {}
        }
    }

    fn with_file(
        &self,
        file_id: FileId,
        receipt: &mut TransactionReceipt,
        update: impl FnOnce(&mut StoredFile),
    ) {
        match self.files.lock().get_mut(&file_id) {
            Some(file) if file.deleted => receipt.status = Status::FileDeleted,
            Some(file) => update(file),
            None => receipt.status = Status::InvalidFileId,
        }
    }
}

#[async_trait]
impl NetworkTransport for MockTransport {
    async fn submit_transaction(
        &self,
        transaction: SignedTransaction,
    ) -> Result<TransactionReceipt, TransportError> {
        tokio::task::yield_now().await;

        let scripted = self.script.lock().pop_front();
        let transaction_id = transaction.transaction_id;
        let all_valid = transaction
            .signatures
            .iter()
            .all(|pair| pair.public_key.verify(&transaction.body_bytes, &pair.signature));
        let body = transaction.body.clone();
        self.submitted.lock().push(transaction);

        match scripted {
            Some(Scripted::Fail(e)) => return Err(e),
            Some(Scripted::Reject(status)) => {
                return Ok(TransactionReceipt::new(transaction_id, status))
            }
            Some(Scripted::Respond(receipt)) => return Ok(receipt),
            None => {}
        }
        if !all_valid {
            return Ok(TransactionReceipt::new(
                transaction_id,
                Status::InvalidSignature,
            ));
        }

        let mut receipt = TransactionReceipt::new(transaction_id, Status::Success);
        self.apply(&body, &mut receipt);
        Ok(receipt)
    }

    async fn submit_query(&self, query: Query) -> Result<QueryResponse, TransportError> {
        self.queries.lock().push(query.clone());
        {
            let mut script = self.script.lock();
            if matches!(script.front(), Some(Scripted::Fail(_))) {
                if let Some(Scripted::Fail(e)) = script.pop_front() {
                    return Err(e);
                }
            }
        }

        match query.kind {
            QueryKind::AccountBalance { account_id } => Ok(QueryResponse::AccountBalance {
                account_id,
                hbars: self
                    .balances
                    .lock()
                    .get(&account_id)
                    .copied()
                    .unwrap_or(Hbar::ZERO),
            }),
            QueryKind::FileContents { file_id } => {
                let file = self
                    .file(file_id)
                    .ok_or(TransportError::PrecheckFailed(Status::InvalidFileId))?;
                Ok(QueryResponse::FileContents {
                    file_id,
                    contents: file.contents,
                })
            }
            QueryKind::FileInfo { file_id } => {
                let file = self
                    .file(file_id)
                    .ok_or(TransportError::PrecheckFailed(Status::InvalidFileId))?;
                Ok(QueryResponse::FileInfo {
                    file_id,
                    size: file.contents.len() as u64,
                    deleted: file.deleted,
                    expiration_time: file.expiration_time,
                })
            }
        }
    }
}
