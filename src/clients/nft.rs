use std::sync::Arc;

use crate::crypto::PrivateKey;
use crate::error::Result;
use crate::protocol::{
    success_payload, ProtocolLayerClient, TokenAssociateRequest, TokenBurnRequest,
    TokenCreateRequest, TokenCreateResult, TokenMintRequest, TokenMintResult,
    TokenTransferRequest, TransactionResult,
};
use crate::types::{Account, AccountId, TokenId, TokenType};

/// Create, mint, burn and move non-fungible tokens.
#[derive(Clone)]
pub struct NftClient {
    client: Arc<dyn ProtocolLayerClient>,
    operator: Account,
}

impl NftClient {
    pub fn new(client: Arc<dyn ProtocolLayerClient>, operator: Account) -> Self {
        Self { client, operator }
    }

    /// Create an NFT type with the operational account as treasury and supply key.
    pub async fn create_nft_type(&self, name: &str, symbol: &str) -> Result<TokenId> {
        self.create_nft_type_with_supply_key(name, symbol, self.operator.private_key.clone())
            .await
    }

    pub async fn create_nft_type_with_supply_key(
        &self,
        name: &str,
        symbol: &str,
        supply_key: PrivateKey,
    ) -> Result<TokenId> {
        self.create_nft_type_with_keys(
            name,
            symbol,
            self.operator.account_id,
            self.operator.private_key.clone(),
            supply_key,
        )
        .await
    }

    pub async fn create_nft_type_with_treasury(
        &self,
        name: &str,
        symbol: &str,
        treasury_account_id: AccountId,
        treasury_key: PrivateKey,
    ) -> Result<TokenId> {
        self.create_nft_type_with_keys(
            name,
            symbol,
            treasury_account_id,
            treasury_key,
            self.operator.private_key.clone(),
        )
        .await
    }

    pub async fn create_nft_type_with_keys(
        &self,
        name: &str,
        symbol: &str,
        treasury_account_id: AccountId,
        treasury_key: PrivateKey,
        supply_key: PrivateKey,
    ) -> Result<TokenId> {
        let request = TokenCreateRequest::new(
            name,
            symbol,
            treasury_account_id,
            treasury_key,
            TokenType::NonFungibleUnique,
            Some(supply_key),
        )?;
        let result = self
            .client
            .execute_token_create_transaction(request)
            .await?
            .require_success()?;
        success_payload(TokenCreateResult::OPERATION, result.token_id)
    }

    /// Associate the operational account with `token_id`.
    pub async fn associate_nft_with_operator(&self, token_id: TokenId) -> Result<()> {
        self.associate_nft(
            token_id,
            self.operator.account_id,
            self.operator.private_key.clone(),
        )
        .await
    }

    pub async fn associate_nft(
        &self,
        token_id: TokenId,
        account_id: AccountId,
        account_key: PrivateKey,
    ) -> Result<()> {
        let request = TokenAssociateRequest::new(token_id, account_id, account_key)?;
        self.client
            .execute_token_associate_transaction(request)
            .await?
            .require_success()?;
        Ok(())
    }

    /// Mint one NFT and return its serial number.
    pub async fn mint_nft(&self, token_id: TokenId, metadata: Vec<u8>) -> Result<u64> {
        self.mint_nft_with_key(token_id, self.operator.private_key.clone(), metadata)
            .await
    }

    pub async fn mint_nft_with_key(
        &self,
        token_id: TokenId,
        supply_key: PrivateKey,
        metadata: Vec<u8>,
    ) -> Result<u64> {
        let serials = self
            .mint_nfts_with_key(token_id, supply_key, vec![metadata])
            .await?;
        success_payload(TokenMintResult::OPERATION, serials.first().copied())
    }

    pub async fn mint_nfts(&self, token_id: TokenId, metadata: Vec<Vec<u8>>) -> Result<Vec<u64>> {
        self.mint_nfts_with_key(token_id, self.operator.private_key.clone(), metadata)
            .await
    }

    /// Mint one NFT per metadata entry, returning serials in the same order.
    pub async fn mint_nfts_with_key(
        &self,
        token_id: TokenId,
        supply_key: PrivateKey,
        metadata: Vec<Vec<u8>>,
    ) -> Result<Vec<u64>> {
        let request = TokenMintRequest::new(token_id, supply_key, metadata)?;
        let result = self
            .client
            .execute_mint_token_transaction(request)
            .await?
            .require_success()?;
        Ok(result.serials)
    }

    pub async fn burn_nfts(
        &self,
        token_id: TokenId,
        serials: impl IntoIterator<Item = u64>,
    ) -> Result<()> {
        self.burn_nfts_with_key(token_id, serials, self.operator.private_key.clone())
            .await
    }

    /// Burn a set of serials. Duplicates collapse and order does not matter.
    pub async fn burn_nfts_with_key(
        &self,
        token_id: TokenId,
        serials: impl IntoIterator<Item = u64>,
        supply_key: PrivateKey,
    ) -> Result<()> {
        let request = TokenBurnRequest::new(token_id, serials, supply_key)?;
        self.client
            .execute_burn_token_transaction(request)
            .await?
            .require_success()?;
        Ok(())
    }

    /// Send an NFT owned by the operational account to `to_account_id`.
    pub async fn transfer_nft_from_operator(
        &self,
        token_id: TokenId,
        serial: u64,
        to_account_id: AccountId,
    ) -> Result<()> {
        self.transfer_nfts_from_operator(token_id, vec![serial], to_account_id)
            .await
    }

    pub async fn transfer_nfts_from_operator(
        &self,
        token_id: TokenId,
        serials: Vec<u64>,
        to_account_id: AccountId,
    ) -> Result<()> {
        self.transfer_nfts(
            token_id,
            serials,
            self.operator.account_id,
            self.operator.private_key.clone(),
            to_account_id,
        )
        .await
    }

    pub async fn transfer_nft(
        &self,
        token_id: TokenId,
        serial: u64,
        from_account_id: AccountId,
        from_account_key: PrivateKey,
        to_account_id: AccountId,
    ) -> Result<()> {
        self.transfer_nfts(
            token_id,
            vec![serial],
            from_account_id,
            from_account_key,
            to_account_id,
        )
        .await
    }

    pub async fn transfer_nfts(
        &self,
        token_id: TokenId,
        serials: Vec<u64>,
        from_account_id: AccountId,
        from_account_key: PrivateKey,
        to_account_id: AccountId,
    ) -> Result<()> {
        let request = TokenTransferRequest::new(
            token_id,
            serials,
            from_account_id,
            to_account_id,
            from_account_key,
        )?;
        self.client
            .execute_transfer_transaction_for_nft(request)
            .await?
            .require_success()?;
        Ok(())
    }
}
