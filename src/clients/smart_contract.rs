use alloy::dyn_abi::DynSolValue;
use std::sync::Arc;

use super::FileClient;
use crate::error::Result;
use crate::protocol::transport::ContractFunctionResult;
use crate::protocol::{
    success_payload, ContractCallRequest, ContractCallResult, ContractCreateRequest,
    ContractCreateResult, ContractDeleteRequest, ProtocolLayerClient, TransactionResult,
};
use crate::types::{AccountId, ContractId, FileId};

/// Deploy, call and delete smart contracts.
#[derive(Clone)]
pub struct SmartContractClient {
    client: Arc<dyn ProtocolLayerClient>,
    files: FileClient,
}

impl SmartContractClient {
    pub fn new(client: Arc<dyn ProtocolLayerClient>) -> Self {
        Self {
            files: FileClient::new(Arc::clone(&client)),
            client,
        }
    }

    /// Deploy a contract whose bytecode is already stored in `bytecode_file_id`.
    pub async fn create_contract(
        &self,
        bytecode_file_id: FileId,
        params: &[DynSolValue],
    ) -> Result<ContractId> {
        let request = ContractCreateRequest::new(bytecode_file_id, params)?;
        let result = self
            .client
            .execute_contract_create_transaction(request)
            .await?
            .require_success()?;
        success_payload(ContractCreateResult::OPERATION, result.contract_id)
    }

    /// Store `bytecode` in a new file, then deploy from it.
    pub async fn create_contract_from_bytecode(
        &self,
        bytecode: &[u8],
        params: &[DynSolValue],
    ) -> Result<ContractId> {
        let file_id = self.files.create_file(bytecode).await?;
        self.create_contract(file_id, params).await
    }

    pub async fn call_contract_function(
        &self,
        contract_id: ContractId,
        function_name: &str,
        params: &[DynSolValue],
    ) -> Result<ContractFunctionResult> {
        let request = ContractCallRequest::new(contract_id, function_name, params)?;
        let result = self
            .client
            .execute_contract_call_transaction(request)
            .await?
            .require_success()?;
        success_payload(ContractCallResult::OPERATION, result.result)
    }

    pub async fn delete_contract(&self, contract_id: ContractId) -> Result<()> {
        self.execute_delete(ContractDeleteRequest::new(contract_id))
            .await
    }

    pub async fn delete_contract_to(
        &self,
        contract_id: ContractId,
        transfer_account_id: AccountId,
    ) -> Result<()> {
        self.execute_delete(ContractDeleteRequest::with_transfer_account(
            contract_id,
            transfer_account_id,
        ))
        .await
    }

    async fn execute_delete(&self, request: ContractDeleteRequest) -> Result<()> {
        self.client
            .execute_contract_delete_transaction(request)
            .await?
            .require_success()?;
        Ok(())
    }
}
