use std::collections::BTreeSet;

use super::transport::{TransactionBody, TransactionReceipt};
use super::{expect_on_success, transaction_result, TransactionOperation};
use crate::crypto::PrivateKey;
use crate::error::{OperationFailure, ValidationError};
use crate::types::{Account, AccountId, Status, TokenId, TokenType, TransactionId};

/// Maximum length of a token name or symbol in bytes
pub const MAX_TOKEN_TEXT_SIZE: usize = 100;

/// Maximum size of one NFT metadata entry in bytes
pub const MAX_NFT_METADATA_SIZE: usize = 100;

/// Maximum number of NFTs minted in a single transaction
pub const MAX_MINT_BATCH_SIZE: usize = 10;

fn check_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if value.len() > MAX_TOKEN_TEXT_SIZE {
        return Err(ValidationError::TooLarge {
            field,
            max: MAX_TOKEN_TEXT_SIZE,
            actual: value.len(),
        });
    }
    Ok(())
}

fn check_serial(serial: u64) -> Result<(), ValidationError> {
    if serial == 0 {
        return Err(ValidationError::invalid(
            "serial number",
            "serial numbers start at 1",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct TokenCreateRequest {
    name: String,
    symbol: String,
    treasury_account_id: AccountId,
    treasury_key: PrivateKey,
    token_type: TokenType,
    supply_key: Option<PrivateKey>,
}

impl TokenCreateRequest {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        treasury_account_id: AccountId,
        treasury_key: PrivateKey,
        token_type: TokenType,
        supply_key: Option<PrivateKey>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let symbol = symbol.into();
        check_text("name", &name)?;
        check_text("symbol", &symbol)?;
        if token_type == TokenType::NonFungibleUnique && supply_key.is_none() {
            return Err(ValidationError::invalid(
                "supply key",
                "non-fungible tokens require a supply key",
            ));
        }
        Ok(Self {
            name,
            symbol,
            treasury_account_id,
            treasury_key,
            token_type,
            supply_key,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn treasury_account_id(&self) -> AccountId {
        self.treasury_account_id
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    pub fn supply_key(&self) -> Option<&PrivateKey> {
        self.supply_key.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCreateResult {
    pub transaction_id: TransactionId,
    pub status: Status,
    pub token_id: Option<TokenId>,
}

transaction_result!(TokenCreateResult, "TokenCreate");

impl TransactionOperation for TokenCreateRequest {
    type Output = TokenCreateResult;

    fn body(&self, _operator: &Account) -> TransactionBody {
        TransactionBody::TokenCreate {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            treasury_account_id: self.treasury_account_id,
            token_type: self.token_type,
            supply_key: self.supply_key.as_ref().map(PrivateKey::public_key),
        }
    }

    fn signers(&self) -> Vec<&PrivateKey> {
        vec![&self.treasury_key]
    }

    fn into_output(&self, receipt: TransactionReceipt) -> Result<TokenCreateResult, OperationFailure> {
        let token_id = expect_on_success(&receipt, receipt.token_id, "token id")?;
        Ok(TokenCreateResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
            token_id,
        })
    }
}

#[derive(Debug, Clone)]
pub struct TokenAssociateRequest {
    token_ids: Vec<TokenId>,
    account_id: AccountId,
    account_key: PrivateKey,
}

impl TokenAssociateRequest {
    pub fn new(
        token_id: TokenId,
        account_id: AccountId,
        account_key: PrivateKey,
    ) -> Result<Self, ValidationError> {
        Self::for_tokens(vec![token_id], account_id, account_key)
    }

    pub fn for_tokens(
        token_ids: Vec<TokenId>,
        account_id: AccountId,
        account_key: PrivateKey,
    ) -> Result<Self, ValidationError> {
        if token_ids.is_empty() {
            return Err(ValidationError::Empty { field: "token ids" });
        }
        Ok(Self {
            token_ids,
            account_id,
            account_key,
        })
    }

    pub fn token_ids(&self) -> &[TokenId] {
        &self.token_ids
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAssociateResult {
    pub transaction_id: TransactionId,
    pub status: Status,
}

transaction_result!(TokenAssociateResult, "TokenAssociate");

impl TransactionOperation for TokenAssociateRequest {
    type Output = TokenAssociateResult;

    fn body(&self, _operator: &Account) -> TransactionBody {
        TransactionBody::TokenAssociate {
            account_id: self.account_id,
            token_ids: self.token_ids.clone(),
        }
    }

    fn signers(&self) -> Vec<&PrivateKey> {
        vec![&self.account_key]
    }

    fn into_output(
        &self,
        receipt: TransactionReceipt,
    ) -> Result<TokenAssociateResult, OperationFailure> {
        Ok(TokenAssociateResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
        })
    }
}

#[derive(Debug, Clone)]
pub struct TokenMintRequest {
    token_id: TokenId,
    supply_key: PrivateKey,
    metadata: Vec<Vec<u8>>,
}

impl TokenMintRequest {
    pub fn new(
        token_id: TokenId,
        supply_key: PrivateKey,
        metadata: Vec<Vec<u8>>,
    ) -> Result<Self, ValidationError> {
        if metadata.is_empty() {
            return Err(ValidationError::Empty { field: "metadata" });
        }
        if metadata.len() > MAX_MINT_BATCH_SIZE {
            return Err(ValidationError::invalid(
                "metadata",
                format!(
                    "at most {MAX_MINT_BATCH_SIZE} NFTs can be minted at once, got {}",
                    metadata.len()
                ),
            ));
        }
        if let Some(entry) = metadata.iter().find(|m| m.len() > MAX_NFT_METADATA_SIZE) {
            return Err(ValidationError::TooLarge {
                field: "metadata",
                max: MAX_NFT_METADATA_SIZE,
                actual: entry.len(),
            });
        }
        Ok(Self {
            token_id,
            supply_key,
            metadata,
        })
    }

    pub fn token_id(&self) -> TokenId {
        self.token_id
    }

    pub fn metadata(&self) -> &[Vec<u8>] {
        &self.metadata
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMintResult {
    pub transaction_id: TransactionId,
    pub status: Status,
    pub serials: Vec<u64>,
}

transaction_result!(TokenMintResult, "TokenMint");

impl TransactionOperation for TokenMintRequest {
    type Output = TokenMintResult;

    fn body(&self, _operator: &Account) -> TransactionBody {
        TransactionBody::TokenMint {
            token_id: self.token_id,
            metadata: self.metadata.clone(),
        }
    }

    fn signers(&self) -> Vec<&PrivateKey> {
        vec![&self.supply_key]
    }

    fn into_output(&self, receipt: TransactionReceipt) -> Result<TokenMintResult, OperationFailure> {
        if receipt.status.is_success() && receipt.serials.len() != self.metadata.len() {
            return Err(OperationFailure::UnexpectedResponse(format!(
                "minted {} serials for {} metadata entries",
                receipt.serials.len(),
                self.metadata.len()
            )));
        }
        Ok(TokenMintResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
            serials: receipt.serials,
        })
    }
}

/// Burn a set of NFT serials. Order is irrelevant and duplicates collapse.
#[derive(Debug, Clone)]
pub struct TokenBurnRequest {
    token_id: TokenId,
    serials: BTreeSet<u64>,
    supply_key: PrivateKey,
}

impl TokenBurnRequest {
    pub fn new(
        token_id: TokenId,
        serials: impl IntoIterator<Item = u64>,
        supply_key: PrivateKey,
    ) -> Result<Self, ValidationError> {
        let serials: BTreeSet<u64> = serials.into_iter().collect();
        if serials.is_empty() {
            return Err(ValidationError::Empty { field: "serials" });
        }
        serials.iter().copied().try_for_each(check_serial)?;
        Ok(Self {
            token_id,
            serials,
            supply_key,
        })
    }

    pub fn token_id(&self) -> TokenId {
        self.token_id
    }

    pub fn serials(&self) -> &BTreeSet<u64> {
        &self.serials
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBurnResult {
    pub transaction_id: TransactionId,
    pub status: Status,
}

transaction_result!(TokenBurnResult, "TokenBurn");

impl TransactionOperation for TokenBurnRequest {
    type Output = TokenBurnResult;

    fn body(&self, _operator: &Account) -> TransactionBody {
        TransactionBody::TokenBurn {
            token_id: self.token_id,
            serials: self.serials.iter().copied().collect(),
        }
    }

    fn signers(&self) -> Vec<&PrivateKey> {
        vec![&self.supply_key]
    }

    fn into_output(&self, receipt: TransactionReceipt) -> Result<TokenBurnResult, OperationFailure> {
        Ok(TokenBurnResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
        })
    }
}

#[derive(Debug, Clone)]
pub struct TokenTransferRequest {
    token_id: TokenId,
    serials: Vec<u64>,
    sender: AccountId,
    receiver: AccountId,
    sender_key: PrivateKey,
}

impl TokenTransferRequest {
    pub fn new(
        token_id: TokenId,
        serials: Vec<u64>,
        sender: AccountId,
        receiver: AccountId,
        sender_key: PrivateKey,
    ) -> Result<Self, ValidationError> {
        if serials.is_empty() {
            return Err(ValidationError::Empty { field: "serials" });
        }
        serials.iter().copied().try_for_each(check_serial)?;
        if sender == receiver {
            return Err(ValidationError::invalid(
                "receiver",
                "sender and receiver must differ",
            ));
        }
        Ok(Self {
            token_id,
            serials,
            sender,
            receiver,
            sender_key,
        })
    }

    pub fn token_id(&self) -> TokenId {
        self.token_id
    }

    pub fn serials(&self) -> &[u64] {
        &self.serials
    }

    pub fn sender(&self) -> AccountId {
        self.sender
    }

    pub fn receiver(&self) -> AccountId {
        self.receiver
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransferResult {
    pub transaction_id: TransactionId,
    pub status: Status,
}

transaction_result!(TokenTransferResult, "TokenTransfer");

impl TransactionOperation for TokenTransferRequest {
    type Output = TokenTransferResult;

    fn body(&self, _operator: &Account) -> TransactionBody {
        TransactionBody::NftTransfer {
            token_id: self.token_id,
            serials: self.serials.clone(),
            sender: self.sender,
            receiver: self.receiver,
        }
    }

    fn signers(&self) -> Vec<&PrivateKey> {
        vec![&self.sender_key]
    }

    fn into_output(
        &self,
        receipt: TransactionReceipt,
    ) -> Result<TokenTransferResult, OperationFailure> {
        Ok(TokenTransferResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{operator, test_key};

    #[test]
    fn test_token_create_validation() {
        let key = test_key(1);
        let treasury = AccountId::from_num(1001);

        let err = TokenCreateRequest::new(
            "",
            "SYM",
            treasury,
            key.clone(),
            TokenType::NonFungibleUnique,
            Some(key.clone()),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "name" });

        let err = TokenCreateRequest::new(
            "Name",
            "x".repeat(101),
            treasury,
            key.clone(),
            TokenType::NonFungibleUnique,
            Some(key.clone()),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { field: "symbol", .. }));

        let err = TokenCreateRequest::new(
            "Name",
            "SYM",
            treasury,
            key.clone(),
            TokenType::NonFungibleUnique,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::Invalid { field: "supply key", .. }));
    }

    #[test]
    fn test_token_create_body_uses_public_supply_key() {
        let supply = test_key(2);
        let request = TokenCreateRequest::new(
            "Name",
            "SYM",
            AccountId::from_num(1001),
            test_key(1),
            TokenType::NonFungibleUnique,
            Some(supply.clone()),
        )
        .unwrap();

        match request.body(&operator()) {
            TransactionBody::TokenCreate { supply_key, .. } => {
                assert_eq!(supply_key, Some(supply.public_key()))
            }
            other => panic!("unexpected body {other:?}"),
        }
        assert_eq!(request.signers().len(), 1);
    }

    #[test]
    fn test_mint_validation() {
        let token = TokenId::from_num(1001);
        assert!(TokenMintRequest::new(token, test_key(1), vec![]).is_err());
        assert!(TokenMintRequest::new(token, test_key(1), vec![vec![0u8; 101]]).is_err());
        assert!(TokenMintRequest::new(token, test_key(1), vec![vec![1]; 11]).is_err());
        assert!(TokenMintRequest::new(token, test_key(1), vec![vec![1]; 10]).is_ok());
    }

    #[test]
    fn test_burn_collapses_duplicates_and_ignores_order() {
        let token = TokenId::from_num(1001);
        let a = TokenBurnRequest::new(token, [5, 3, 5], test_key(1)).unwrap();
        let b = TokenBurnRequest::new(token, [3, 5], test_key(1)).unwrap();

        assert_eq!(a.serials(), b.serials());
        assert_eq!(a.body(&operator()), b.body(&operator()));
    }

    #[test]
    fn test_burn_validation() {
        let token = TokenId::from_num(1001);
        assert!(TokenBurnRequest::new(token, Vec::new(), test_key(1)).is_err());
        assert!(TokenBurnRequest::new(token, [0, 1], test_key(1)).is_err());
    }

    #[test]
    fn test_transfer_validation() {
        let token = TokenId::from_num(1001);
        let a = AccountId::from_num(10);
        let b = AccountId::from_num(11);
        assert!(TokenTransferRequest::new(token, vec![], a, b, test_key(1)).is_err());
        assert!(TokenTransferRequest::new(token, vec![1], a, a, test_key(1)).is_err());
        assert!(TokenTransferRequest::new(token, vec![1], a, b, test_key(1)).is_ok());
    }

    #[test]
    fn test_mint_receipt_must_match_batch() {
        let request =
            TokenMintRequest::new(TokenId::from_num(1001), test_key(1), vec![vec![1], vec![2]])
                .unwrap();
        let tx_id = crate::testing::tx_id(1);

        let mut receipt = TransactionReceipt::new(tx_id, Status::Success);
        receipt.serials = vec![1];
        assert!(request.into_output(receipt).is_err());

        let receipt = TransactionReceipt::new(tx_id, Status::InvalidSignature);
        let result = request.into_output(receipt).unwrap();
        assert_eq!(result.status, Status::InvalidSignature);
        assert!(result.serials.is_empty());
    }
}
