use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy::primitives::keccak256;

use super::transport::{ContractFunctionResult, TransactionBody, TransactionReceipt};
use super::{expect_on_success, transaction_result, TransactionOperation};
use crate::crypto::PrivateKey;
use crate::error::{OperationFailure, ValidationError};
use crate::types::{Account, AccountId, ContractId, FileId, Hbar, Status, TransactionId};

/// Gas used when a request does not specify its own limit.
pub const DEFAULT_GAS: u64 = 200_000;

/// ABI-encode parameters as a tuple, the layout used for constructor arguments.
fn encode_params(params: &[DynSolValue]) -> Vec<u8> {
    if params.is_empty() {
        return Vec::new();
    }
    DynSolValue::Tuple(params.to_vec()).abi_encode_params()
}

/// Canonical Solidity signature, for example `transfer(address,uint256)`.
fn function_signature(name: &str, params: &[DynSolValue]) -> Result<String, ValidationError> {
    let types = params
        .iter()
        .map(|param| {
            param.sol_type_name().map(|t| t.into_owned()).ok_or_else(|| {
                ValidationError::invalid(
                    "function parameters",
                    format!("cannot derive a Solidity type for {param:?}"),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("{name}({})", types.join(",")))
}

fn check_gas(gas: u64) -> Result<(), ValidationError> {
    if gas == 0 {
        return Err(ValidationError::invalid("gas", "gas must be positive"));
    }
    Ok(())
}

/// Deploy a contract whose bytecode was previously stored in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCreateRequest {
    bytecode_file_id: FileId,
    constructor_parameters: Vec<u8>,
    gas: u64,
}

impl ContractCreateRequest {
    pub fn new(bytecode_file_id: FileId, params: &[DynSolValue]) -> Result<Self, ValidationError> {
        Self::with_gas(bytecode_file_id, params, DEFAULT_GAS)
    }

    pub fn with_gas(
        bytecode_file_id: FileId,
        params: &[DynSolValue],
        gas: u64,
    ) -> Result<Self, ValidationError> {
        check_gas(gas)?;
        // rejects values without a nameable Solidity type
        function_signature("constructor", params)?;
        Ok(Self {
            bytecode_file_id,
            constructor_parameters: encode_params(params),
            gas,
        })
    }

    pub fn bytecode_file_id(&self) -> FileId {
        self.bytecode_file_id
    }

    pub fn constructor_parameters(&self) -> &[u8] {
        &self.constructor_parameters
    }

    pub fn gas(&self) -> u64 {
        self.gas
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCreateResult {
    pub transaction_id: TransactionId,
    pub status: Status,
    pub contract_id: Option<ContractId>,
}

transaction_result!(ContractCreateResult, "ContractCreate");

impl TransactionOperation for ContractCreateRequest {
    type Output = ContractCreateResult;

    fn body(&self, operator: &Account) -> TransactionBody {
        TransactionBody::ContractCreate {
            bytecode_file_id: self.bytecode_file_id,
            constructor_parameters: self.constructor_parameters.clone(),
            gas: self.gas,
            admin_key: operator.public_key.clone(),
        }
    }

    fn signers(&self) -> Vec<&PrivateKey> {
        Vec::new()
    }

    fn into_output(
        &self,
        receipt: TransactionReceipt,
    ) -> Result<ContractCreateResult, OperationFailure> {
        let contract_id = expect_on_success(&receipt, receipt.contract_id, "contract id")?;
        Ok(ContractCreateResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
            contract_id,
        })
    }
}

/// Execute a contract function as a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCallRequest {
    contract_id: ContractId,
    function_name: String,
    function_parameters: Vec<u8>,
    gas: u64,
    amount: Hbar,
}

impl ContractCallRequest {
    pub fn new(
        contract_id: ContractId,
        function_name: impl Into<String>,
        params: &[DynSolValue],
    ) -> Result<Self, ValidationError> {
        Self::with_options(contract_id, function_name, params, DEFAULT_GAS, Hbar::ZERO)
    }

    pub fn with_options(
        contract_id: ContractId,
        function_name: impl Into<String>,
        params: &[DynSolValue],
        gas: u64,
        amount: Hbar,
    ) -> Result<Self, ValidationError> {
        let function_name = function_name.into();
        if function_name.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "function name",
            });
        }
        let valid_identifier = function_name
            .chars()
            .enumerate()
            .all(|(i, c)| c == '_' || c == '$' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()));
        if !valid_identifier {
            return Err(ValidationError::invalid(
                "function name",
                format!("'{function_name}' is not a Solidity identifier"),
            ));
        }
        check_gas(gas)?;
        if amount < Hbar::ZERO {
            return Err(ValidationError::invalid("amount", "amount must not be negative"));
        }

        let signature = function_signature(&function_name, params)?;
        let mut function_parameters = keccak256(signature.as_bytes())[..4].to_vec();
        function_parameters.extend(encode_params(params));

        Ok(Self {
            contract_id,
            function_name,
            function_parameters,
            gas,
            amount,
        })
    }

    pub fn contract_id(&self) -> ContractId {
        self.contract_id
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Selector followed by the ABI-encoded arguments.
    pub fn function_parameters(&self) -> &[u8] {
        &self.function_parameters
    }

    pub fn gas(&self) -> u64 {
        self.gas
    }

    pub fn amount(&self) -> Hbar {
        self.amount
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCallResult {
    pub transaction_id: TransactionId,
    pub status: Status,
    pub cost: Hbar,
    pub result: Option<ContractFunctionResult>,
}

transaction_result!(ContractCallResult, "ContractCall");

impl ContractCallResult {
    pub fn gas_used(&self) -> Option<u64> {
        self.result.as_ref().map(|r| r.gas_used)
    }

    /// Decode the returned bytes against the expected output types.
    pub fn decode(&self, types: &[DynSolType]) -> Result<Vec<DynSolValue>, OperationFailure> {
        let bytes = self
            .result
            .as_ref()
            .map(|r| r.bytes.as_slice())
            .unwrap_or_default();
        if types.is_empty() {
            return Ok(Vec::new());
        }
        match DynSolType::Tuple(types.to_vec()).abi_decode_params(bytes) {
            Ok(DynSolValue::Tuple(values)) => Ok(values),
            Ok(other) => Ok(vec![other]),
            Err(e) => Err(OperationFailure::Encoding(e.to_string())),
        }
    }
}

impl TransactionOperation for ContractCallRequest {
    type Output = ContractCallResult;

    fn body(&self, _operator: &Account) -> TransactionBody {
        TransactionBody::ContractCall {
            contract_id: self.contract_id,
            function_parameters: self.function_parameters.clone(),
            gas: self.gas,
            amount: self.amount,
        }
    }

    fn signers(&self) -> Vec<&PrivateKey> {
        Vec::new()
    }

    fn into_output(
        &self,
        receipt: TransactionReceipt,
    ) -> Result<ContractCallResult, OperationFailure> {
        let result = expect_on_success(
            &receipt,
            receipt.contract_function_result.clone(),
            "contract function result",
        )?;
        Ok(ContractCallResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
            cost: receipt.transaction_fee,
            result,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractDeleteRequest {
    contract_id: ContractId,
    transfer_account_id: Option<AccountId>,
}

impl ContractDeleteRequest {
    /// Delete a contract, sending its remaining balance to the operator account.
    pub fn new(contract_id: ContractId) -> Self {
        Self {
            contract_id,
            transfer_account_id: None,
        }
    }

    pub fn with_transfer_account(contract_id: ContractId, transfer_account_id: AccountId) -> Self {
        Self {
            contract_id,
            transfer_account_id: Some(transfer_account_id),
        }
    }

    pub fn contract_id(&self) -> ContractId {
        self.contract_id
    }

    pub fn transfer_account_id(&self) -> Option<AccountId> {
        self.transfer_account_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDeleteResult {
    pub transaction_id: TransactionId,
    pub status: Status,
}

transaction_result!(ContractDeleteResult, "ContractDelete");

impl TransactionOperation for ContractDeleteRequest {
    type Output = ContractDeleteResult;

    fn body(&self, operator: &Account) -> TransactionBody {
        TransactionBody::ContractDelete {
            contract_id: self.contract_id,
            transfer_account_id: self.transfer_account_id.unwrap_or(operator.account_id),
        }
    }

    fn signers(&self) -> Vec<&PrivateKey> {
        Vec::new()
    }

    fn into_output(
        &self,
        receipt: TransactionReceipt,
    ) -> Result<ContractDeleteResult, OperationFailure> {
        Ok(ContractDeleteResult {
            transaction_id: receipt.transaction_id,
            status: receipt.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::operator;
    use alloy::primitives::U256;

    #[test]
    fn test_call_starts_with_selector() {
        let request = ContractCallRequest::new(
            ContractId::from_num(1001),
            "set",
            &[DynSolValue::Uint(U256::from(7u64), 256)],
        )
        .unwrap();

        let selector = &keccak256(b"set(uint256)")[..4];
        assert_eq!(&request.function_parameters()[..4], selector);
        // one static word after the selector
        assert_eq!(request.function_parameters().len(), 4 + 32);
    }

    #[test]
    fn test_call_without_params_is_just_selector() {
        let request = ContractCallRequest::new(ContractId::from_num(1001), "get", &[]).unwrap();
        assert_eq!(request.function_parameters(), &keccak256(b"get()")[..4]);
    }

    #[test]
    fn test_call_validation() {
        let contract = ContractId::from_num(1001);
        assert!(ContractCallRequest::new(contract, "", &[]).is_err());
        assert!(ContractCallRequest::new(contract, "1abc", &[]).is_err());
        assert!(ContractCallRequest::new(contract, "bad name", &[]).is_err());
        assert!(ContractCallRequest::with_options(contract, "get", &[], 0, Hbar::ZERO).is_err());
        assert!(
            ContractCallRequest::with_options(contract, "get", &[], 1, Hbar::from_tinybars(-1))
                .is_err()
        );
    }

    #[test]
    fn test_constructor_params_encoded() {
        let request = ContractCreateRequest::new(
            FileId::from_num(77),
            &[DynSolValue::String("hello".to_string())],
        )
        .unwrap();
        let decoded = DynSolType::Tuple(vec![DynSolType::String])
            .abi_decode_params(request.constructor_parameters())
            .unwrap();
        assert_eq!(
            decoded,
            DynSolValue::Tuple(vec![DynSolValue::String("hello".to_string())])
        );
    }

    #[test]
    fn test_call_result_decode() {
        let bytes = DynSolValue::Tuple(vec![DynSolValue::String("hi".to_string())]).abi_encode_params();
        let result = ContractCallResult {
            transaction_id: crate::testing::tx_id(1),
            status: Status::Success,
            cost: Hbar::ZERO,
            result: Some(ContractFunctionResult {
                gas_used: 21_000,
                bytes,
                error_message: None,
            }),
        };
        let values = result.decode(&[DynSolType::String]).unwrap();
        assert_eq!(values, vec![DynSolValue::String("hi".to_string())]);
        assert_eq!(result.gas_used(), Some(21_000));
    }

    #[test]
    fn test_delete_defaults_to_operator() {
        let operator = operator();
        let request = ContractDeleteRequest::new(ContractId::from_num(5));
        match request.body(&operator) {
            TransactionBody::ContractDelete {
                transfer_account_id,
                ..
            } => assert_eq!(transfer_account_id, operator.account_id),
            other => panic!("unexpected body {other:?}"),
        }
    }
}
