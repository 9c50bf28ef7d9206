use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::fmt;
use std::path::PathBuf;
use tracing::info;

use crate::crypto::PrivateKey;
use crate::env_file::EnvFile;
use crate::types::{Account, AccountId};

pub const ENV_ACCOUNT_ID: &str = "hedera.accountId";
pub const ENV_PRIVATE_KEY: &str = "hedera.privateKey";
pub const ENV_NETWORK: &str = "hedera.network";

pub const HASHSCAN_SOURCIFY_URL: &str = "https://server-verify.hashscan.io";
pub const LOCAL_SOURCIFY_URL: &str = "http://localhost:5555";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum HederaNetwork {
    Mainnet,
    #[default]
    Testnet,
    Previewnet,
    /// Local network started by the solo tooling.
    Solo,
}

impl HederaNetwork {
    /// EVM chain id of the network's JSON-RPC relay.
    pub fn chain_id(self) -> u64 {
        match self {
            HederaNetwork::Mainnet => 295,
            HederaNetwork::Testnet => 296,
            HederaNetwork::Previewnet => 297,
            HederaNetwork::Solo => 298,
        }
    }

    pub fn sourcify_url(self) -> &'static str {
        match self {
            HederaNetwork::Solo => LOCAL_SOURCIFY_URL,
            _ => HASHSCAN_SOURCIFY_URL,
        }
    }
}

impl fmt::Display for HederaNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => write!(f, "{self:?}"),
        }
    }
}

/// Operator and network arguments, flattened into each binary's CLI.
#[derive(Args, Debug, Clone, Default)]
pub struct HederaArgs {
    /// Operator account id, e.g. 0.0.1234
    #[arg(long, env = "HEDERA_ACCOUNT_ID")]
    pub account_id: Option<String>,

    /// Operator private key (DER or raw hex)
    #[arg(long, env = "HEDERA_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Network to connect to
    #[arg(long, env = "HEDERA_NETWORK", value_enum)]
    pub network: Option<HederaNetwork>,

    /// Sourcify server used for contract verification
    #[arg(long, env = "HEDERA_SOURCIFY_URL")]
    pub sourcify_url: Option<String>,

    /// Fallback file holding hedera.accountId and hedera.privateKey
    #[arg(long, default_value = ".env")]
    pub env_file: PathBuf,
}

/// Network endpoints, resolvable without any operator credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub network: HederaNetwork,
    pub sourcify_url: String,
    pub chain_id: u64,
}

impl NetworkConfig {
    /// Load with priority: CLI/env -> .env file -> defaults
    pub fn load(args: &HederaArgs) -> Result<Self> {
        Self::resolve(args, &EnvFile::load(&args.env_file)?)
    }

    fn resolve(args: &HederaArgs, env_file: &EnvFile) -> Result<Self> {
        let network = match args.network {
            Some(network) => network,
            None => match env_file.value(ENV_NETWORK) {
                Some(name) => HederaNetwork::from_str(&name, true)
                    .map_err(|e| anyhow::anyhow!("invalid network '{name}': {e}"))?,
                None => HederaNetwork::default(),
            },
        };
        let sourcify_url = args
            .sourcify_url
            .clone()
            .unwrap_or_else(|| network.sourcify_url().to_string());
        Ok(Self {
            network,
            sourcify_url,
            chain_id: network.chain_id(),
        })
    }
}

/// Operator identity plus network endpoints
#[derive(Debug, Clone)]
pub struct HederaConfig {
    pub operator: Account,
    pub network: NetworkConfig,
}

impl HederaConfig {
    /// Load configuration with priority: CLI/env -> .env file -> defaults
    pub fn load(args: HederaArgs) -> Result<Self> {
        let env_file = EnvFile::load(&args.env_file)?;
        let network = NetworkConfig::resolve(&args, &env_file)?;

        let account_id = args
            .account_id
            .or_else(|| env_file.value(ENV_ACCOUNT_ID))
            .with_context(|| {
                format!(
                    "operator account id not set: use HEDERA_ACCOUNT_ID or {ENV_ACCOUNT_ID} in {}",
                    env_file.path().display()
                )
            })?;
        let account_id: AccountId = account_id
            .parse()
            .with_context(|| format!("invalid operator account id '{account_id}'"))?;

        let private_key = args
            .private_key
            .or_else(|| env_file.value(ENV_PRIVATE_KEY))
            .with_context(|| {
                format!(
                    "operator private key not set: use HEDERA_PRIVATE_KEY or {ENV_PRIVATE_KEY} in {}",
                    env_file.path().display()
                )
            })?;
        let private_key: PrivateKey = private_key
            .parse()
            .context("invalid operator private key")?;

        info!(
            account_id = %account_id,
            network = %network.network,
            "loaded operator configuration"
        );

        Ok(Self {
            operator: Account::new(account_id, private_key),
            network,
        })
    }
}
