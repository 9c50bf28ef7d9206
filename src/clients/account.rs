use std::sync::Arc;

use crate::crypto::PrivateKey;
use crate::error::Result;
use crate::protocol::{
    success_payload, AccountBalanceRequest, AccountCreateRequest, AccountCreateResult,
    AccountDeleteRequest, ProtocolLayerClient, TransactionResult,
};
use crate::types::{Account, AccountId, Hbar};

#[derive(Clone)]
pub struct AccountClient {
    client: Arc<dyn ProtocolLayerClient>,
    operator: Account,
}

impl AccountClient {
    pub fn new(client: Arc<dyn ProtocolLayerClient>, operator: Account) -> Self {
        Self { client, operator }
    }

    /// Create an account controlled by `private_key`, funded from the operational account.
    pub async fn create_account(
        &self,
        private_key: PrivateKey,
        initial_balance: Hbar,
    ) -> Result<Account> {
        let request = AccountCreateRequest::new(private_key.public_key(), initial_balance)?;
        let result = self
            .client
            .execute_account_create_transaction(request)
            .await?
            .require_success()?;
        let account_id = success_payload(AccountCreateResult::OPERATION, result.account_id)?;
        Ok(Account::new(account_id, private_key))
    }

    /// Delete `account`, returning its balance to the operational account.
    pub async fn delete_account(&self, account: &Account) -> Result<()> {
        self.delete_account_to(account, self.operator.account_id)
            .await
    }

    pub async fn delete_account_to(
        &self,
        account: &Account,
        transfer_account_id: AccountId,
    ) -> Result<()> {
        let request = AccountDeleteRequest::for_account(account, transfer_account_id)?;
        self.client
            .execute_account_delete_transaction(request)
            .await?
            .require_success()?;
        Ok(())
    }

    pub async fn get_account_balance(&self, account_id: AccountId) -> Result<Hbar> {
        let response = self
            .client
            .execute_account_balance_query(AccountBalanceRequest::new(account_id))
            .await?;
        Ok(response.hbars)
    }

    pub async fn get_operator_account_balance(&self) -> Result<Hbar> {
        self.get_account_balance(self.operator.account_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::transport::TransactionBody;
    use crate::protocol::HederaProtocolClient;
    use crate::testing::{operator, test_key, MockTransport};

    fn account_client() -> (Arc<MockTransport>, AccountClient) {
        let mock = Arc::new(MockTransport::new());
        let protocol = HederaProtocolClient::new(Arc::clone(&mock), operator());
        (mock, AccountClient::new(Arc::new(protocol), operator()))
    }

    #[tokio::test]
    async fn test_create_account_returns_usable_account() {
        let (_mock, client) = account_client();
        let key = test_key(8);

        let account = client
            .create_account(key.clone(), Hbar::from_hbars(10))
            .await
            .unwrap();

        assert_eq!(account.public_key, key.public_key());
        assert_eq!(
            client.get_account_balance(account.account_id).await.unwrap(),
            Hbar::from_hbars(10)
        );
    }

    #[tokio::test]
    async fn test_delete_defaults_to_operator_and_signs_with_account_key() {
        let (mock, client) = account_client();
        let account = client
            .create_account(test_key(8), Hbar::ZERO)
            .await
            .unwrap();

        client.delete_account(&account).await.unwrap();

        let submitted = mock.submitted();
        let delete = submitted.last().unwrap();
        assert!(delete.is_signed_by(&account.public_key));
        assert_eq!(
            delete.body,
            TransactionBody::AccountDelete {
                account_id: account.account_id,
                transfer_account_id: operator().account_id,
            }
        );
    }

    #[tokio::test]
    async fn test_operator_balance() {
        let (mock, client) = account_client();
        mock.set_balance(operator().account_id, Hbar::from_hbars(1_000));

        assert_eq!(
            client.get_operator_account_balance().await.unwrap(),
            Hbar::from_hbars(1_000)
        );
        assert_eq!(mock.queries().len(), 1);
    }
}
