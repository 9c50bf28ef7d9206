//! Source verification of deployed contracts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::error::HederaError;
use crate::types::ContractId;

mod sourcify;

pub use sourcify::SourcifyVerificationClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractVerificationState {
    NotVerified,
    /// Sources match but the metadata hash differs.
    Partial,
    Full,
}

impl fmt::Display for ContractVerificationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContractVerificationState::NotVerified => "NOT_VERIFIED",
            ContractVerificationState::Partial => "PARTIAL",
            ContractVerificationState::Full => "FULL",
        })
    }
}

/// A verification service such as Sourcify.
#[async_trait]
pub trait ContractVerificationClient: Send + Sync {
    async fn check_verification(
        &self,
        contract_id: ContractId,
    ) -> crate::error::Result<ContractVerificationState>;

    /// Submit sources for verification and return the state the service reports afterwards.
    async fn verify(
        &self,
        contract_id: ContractId,
        contract_name: &str,
        files: &BTreeMap<String, String>,
    ) -> crate::error::Result<ContractVerificationState>;

    /// Whether the service holds `file_name` for the contract with exactly `file_content`.
    async fn check_verification_file(
        &self,
        contract_id: ContractId,
        file_name: &str,
        file_content: &str,
    ) -> crate::error::Result<bool>;
}

#[derive(Error, Debug)]
pub enum VerificationError {
    /// The verification service or network could not be reached.
    #[error(transparent)]
    Hedera(#[from] HederaError),

    #[error("contract {contract_id} is not fully verified, state is {state}")]
    NotFullyVerified {
        contract_id: ContractId,
        state: ContractVerificationState,
    },

    #[error("file {file_name} of contract {contract_id} is invalid")]
    InvalidFile {
        contract_id: ContractId,
        file_name: String,
    },
}

impl VerificationError {
    /// True when the service answered but the contract is not in the required state.
    pub fn is_illegal_state(&self) -> bool {
        !matches!(self, VerificationError::Hedera(_))
    }
}

/// Drives a contract to `FULL` verification and confirms each of its files.
#[derive(Clone)]
pub struct ContractVerifier {
    client: Arc<dyn ContractVerificationClient>,
}

impl ContractVerifier {
    pub fn new(client: Arc<dyn ContractVerificationClient>) -> Self {
        Self { client }
    }

    /// Verify a single-source contract from its Solidity source and compiler metadata.
    pub async fn do_full_verification_single(
        &self,
        contract_id: ContractId,
        contract_name: &str,
        contract_source: &str,
        contract_metadata: &str,
    ) -> Result<(), VerificationError> {
        let files = BTreeMap::from([
            (format!("{contract_name}.sol"), contract_source.to_string()),
            ("metadata.json".to_string(), contract_metadata.to_string()),
        ]);
        self.do_full_verification(contract_id, contract_name, &files)
            .await
    }

    /// Verification is attempted once. A contract that is not `FULL` afterwards
    /// fails without checking any file.
    pub async fn do_full_verification(
        &self,
        contract_id: ContractId,
        contract_name: &str,
        files: &BTreeMap<String, String>,
    ) -> Result<(), VerificationError> {
        let state = self.client.check_verification(contract_id).await?;
        if state == ContractVerificationState::Full {
            debug!(contract_id = %contract_id, "contract is already fully verified");
        } else {
            debug!(contract_id = %contract_id, state = %state, "starting verification");
            let state = self.client.verify(contract_id, contract_name, files).await?;
            if state != ContractVerificationState::Full {
                return Err(VerificationError::NotFullyVerified { contract_id, state });
            }
            info!(contract_id = %contract_id, "contract is now fully verified");
        }

        for (file_name, content) in files {
            if !self
                .client
                .check_verification_file(contract_id, file_name, content)
                .await?
            {
                return Err(VerificationError::InvalidFile {
                    contract_id,
                    file_name: file_name.clone(),
                });
            }
            debug!(contract_id = %contract_id, file = %file_name, "file verified");
        }
        Ok(())
    }
}
