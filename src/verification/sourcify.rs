use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

use super::{ContractVerificationClient, ContractVerificationState};
use crate::error::{HederaError, OperationFailure, Result};
use crate::types::ContractId;

const CHECK_VERIFICATION: &str = "CheckVerification";
const VERIFY: &str = "VerifyContract";
const CHECK_VERIFICATION_FILE: &str = "CheckVerificationFile";

#[derive(Serialize)]
struct VerifyRequest<'a> {
    address: String,
    chain: String,
    files: &'a BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct FilesResponse {
    #[serde(default)]
    files: Vec<SourceFile>,
}

#[derive(Deserialize)]
struct SourceFile {
    name: String,
    content: String,
}

fn state_from_match(status: &str) -> ContractVerificationState {
    match status {
        "perfect" | "full" => ContractVerificationState::Full,
        "partial" => ContractVerificationState::Partial,
        _ => ContractVerificationState::NotVerified,
    }
}

/// Match status reported for `chain_id` by `check-by-addresses`.
///
/// Newer servers nest one status per chain in `chainIds`, older ones put a
/// single `status` next to the address.
fn match_status(entry: &Value, chain_id: u64) -> Option<&str> {
    let chain = chain_id.to_string();
    let per_chain = entry
        .get("chainIds")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .find(|c| c.get("chainId").and_then(Value::as_str) == Some(chain.as_str()))
        .and_then(|c| c.get("status"))
        .and_then(Value::as_str);
    per_chain.or_else(|| entry.get("status").and_then(Value::as_str))
}

/// [`ContractVerificationClient`] for a Sourcify server, such as the one
/// behind HashScan.
#[derive(Clone)]
pub struct SourcifyVerificationClient {
    http: Client,
    base_url: String,
    chain_id: u64,
}

impl SourcifyVerificationClient {
    pub fn new(base_url: impl Into<String>, chain_id: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HederaError::operation("SourcifyClient", e))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            chain_id,
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn address(contract_id: ContractId) -> Result<String> {
        Ok(contract_id.to_solidity_address()?.to_string().to_lowercase())
    }

    async fn get_json(&self, operation: &'static str, url: String) -> Result<Value> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| HederaError::operation(operation, e))?;
        response
            .json()
            .await
            .map_err(|e| HederaError::operation(operation, e))
    }
}

fn unexpected(operation: &'static str, reason: String) -> HederaError {
    HederaError::operation(operation, OperationFailure::UnexpectedResponse(reason))
}

#[async_trait]
impl ContractVerificationClient for SourcifyVerificationClient {
    async fn check_verification(
        &self,
        contract_id: ContractId,
    ) -> Result<ContractVerificationState> {
        let address = Self::address(contract_id)?;
        let url = format!(
            "{}/check-by-addresses?addresses={address}&chainIds={}",
            self.base_url, self.chain_id
        );
        let body = self.get_json(CHECK_VERIFICATION, url).await?;
        let entry = body
            .as_array()
            .and_then(|entries| entries.first())
            .ok_or_else(|| unexpected(CHECK_VERIFICATION, format!("no entry for {address}")))?;

        let state = state_from_match(match_status(entry, self.chain_id).unwrap_or_default());
        debug!(contract_id = %contract_id, state = %state, "verification state");
        Ok(state)
    }

    async fn verify(
        &self,
        contract_id: ContractId,
        contract_name: &str,
        files: &BTreeMap<String, String>,
    ) -> Result<ContractVerificationState> {
        let request = VerifyRequest {
            address: Self::address(contract_id)?,
            chain: self.chain_id.to_string(),
            files,
        };
        debug!(
            contract_id = %contract_id,
            contract = contract_name,
            files = files.len(),
            "submitting sources for verification"
        );

        let response = self
            .http
            .post(format!("{}/verify", self.base_url))
            .json(&request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| HederaError::operation(VERIFY, e))?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| HederaError::operation(VERIFY, e))?;

        let status = body
            .get("result")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .and_then(|result| result.get("status"))
            .and_then(Value::as_str)
            .ok_or_else(|| unexpected(VERIFY, format!("no verification result in {body}")))?;
        Ok(state_from_match(status))
    }

    async fn check_verification_file(
        &self,
        contract_id: ContractId,
        file_name: &str,
        file_content: &str,
    ) -> Result<bool> {
        let url = format!(
            "{}/files/any/{}/{}",
            self.base_url,
            self.chain_id,
            Self::address(contract_id)?
        );
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| HederaError::operation(CHECK_VERIFICATION_FILE, e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        let files: FilesResponse = response
            .error_for_status()
            .map_err(|e| HederaError::operation(CHECK_VERIFICATION_FILE, e))?
            .json()
            .await
            .map_err(|e| HederaError::operation(CHECK_VERIFICATION_FILE, e))?;

        Ok(files
            .files
            .iter()
            .any(|file| file.name == file_name && file.content == file_content))
    }
}
