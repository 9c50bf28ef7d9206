use super::transport::{QueryKind, QueryResponse, TransactionBody, TransactionReceipt};
use super::{
    expect_on_success, transaction_result, unexpected_response, QueryOperation,
    TransactionOperation,
};
use crate::crypto::{PrivateKey, PublicKey};
use crate::error::{OperationFailure, ValidationError};
use crate::types::{Account, AccountId, Hbar, Status, TransactionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountBalanceRequest {
    account_id: AccountId,
}

impl AccountBalanceRequest {
    pub fn new(account_id: AccountId) -> Self {
        Self { account_id }
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountBalanceResponse {
    pub account_id: AccountId,
    pub hbars: Hbar,
}

impl QueryOperation for AccountBalanceRequest {
    type Output = AccountBalanceResponse;

    const OPERATION: &'static str = "AccountBalanceQuery";

    fn query(&self) -> QueryKind {
        QueryKind::AccountBalance {
            account_id: self.account_id,
        }
    }

    fn into_output(
        &self,
        response: QueryResponse,
    ) -> Result<AccountBalanceResponse, OperationFailure> {
        match response {
            QueryResponse::AccountBalance { account_id, hbars } => {
                Ok(AccountBalanceResponse { account_id, hbars })
            }
            other => Err(unexpected_response("account_balance", &other)),
        }
    }
}

/// Create an account controlled by `key`, funded by the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountCreateRequest {
    key: PublicKey,
    initial_balance: Hbar,
}

impl AccountCreateRequest {
    pub fn new(key: PublicKey, initial_balance: Hbar) -> Result<Self, ValidationError> {
        if initial_balance < Hbar::ZERO {
            return Err(ValidationError::invalid(
                "initial balance",
                format!("initial balance must not be negative (got {initial_balance})"),
            ));
        }
        Ok(Self {
            key,
            initial_balance,
        })
    }

    pub fn key(&self) -> &PublicKey {
        &self.key
    }

    pub fn initial_balance(&self) -> Hbar {
        self.initial_balance
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCreateResult {
    pub transaction_id: TransactionId,
    pub status: Status,
    pub account_id: Option<AccountId>,
}

transaction_result!(AccountCreateResult, "AccountCreate");

impl TransactionOperation for AccountCreateRequest {
    type Output = AccountCreateResult;

    fn body(&self, _operator: &Account) -> TransactionBody {
        TransactionBody::AccountCreate {
            key: self.key.clone(),
            initial_balance: self.initial_balance,
        }
    }

    fn signers(&self) -> Vec<&PrivateKey> {
        Vec::new()
    }

    fn into_output(
        &self,
        receipt: TransactionReceipt,
    ) -> Result<AccountCreateResult, OperationFailure> {
        let account_id = expect_on_success(&receipt, receipt.account_id, "account id")?;
        Ok(AccountCreateResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
            account_id,
        })
    }
}

/// Delete an account and move its remaining balance to `transfer_account_id`.
///
/// The deleted account's key must sign.
#[derive(Debug, Clone)]
pub struct AccountDeleteRequest {
    account_id: AccountId,
    account_key: PrivateKey,
    transfer_account_id: AccountId,
}

impl AccountDeleteRequest {
    pub fn new(
        account_id: AccountId,
        account_key: PrivateKey,
        transfer_account_id: AccountId,
    ) -> Result<Self, ValidationError> {
        if account_id == transfer_account_id {
            return Err(ValidationError::invalid(
                "transfer account id",
                format!("cannot transfer the balance of {account_id} to itself"),
            ));
        }
        Ok(Self {
            account_id,
            account_key,
            transfer_account_id,
        })
    }

    /// Delete the account held in `account`.
    pub fn for_account(
        account: &Account,
        transfer_account_id: AccountId,
    ) -> Result<Self, ValidationError> {
        Self::new(
            account.account_id,
            account.private_key.clone(),
            transfer_account_id,
        )
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn transfer_account_id(&self) -> AccountId {
        self.transfer_account_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDeleteResult {
    pub transaction_id: TransactionId,
    pub status: Status,
}

transaction_result!(AccountDeleteResult, "AccountDelete");

impl TransactionOperation for AccountDeleteRequest {
    type Output = AccountDeleteResult;

    fn body(&self, _operator: &Account) -> TransactionBody {
        TransactionBody::AccountDelete {
            account_id: self.account_id,
            transfer_account_id: self.transfer_account_id,
        }
    }

    fn signers(&self) -> Vec<&PrivateKey> {
        vec![&self.account_key]
    }

    fn into_output(
        &self,
        receipt: TransactionReceipt,
    ) -> Result<AccountDeleteResult, OperationFailure> {
        Ok(AccountDeleteResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
        })
    }
}
