use anyhow::{Context, Result};
use clap::Parser;
use hedera_protocol::config::{HederaArgs, NetworkConfig};
use hedera_protocol::types::ContractId;
use hedera_protocol::verification::{ContractVerifier, SourcifyVerificationClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// CLI arguments for contract verification
#[derive(Parser, Debug)]
#[command(name = "verify_contract")]
#[command(about = "Verify a deployed contract's sources against a Sourcify server", long_about = None)]
struct CliArgs {
    /// Deployed contract, e.g. 0.0.5005
    #[arg(long)]
    contract_id: ContractId,

    /// Contract name as declared in the source
    #[arg(long)]
    contract_name: String,

    /// Solidity source file
    #[arg(long)]
    source: PathBuf,

    /// Compiler metadata JSON
    #[arg(long)]
    metadata: PathBuf,

    #[command(flatten)]
    hedera: HederaArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy()
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(true))
        .with(filter)
        .init();

    let cli_args = CliArgs::parse();
    let source = std::fs::read_to_string(&cli_args.source)
        .with_context(|| format!("reading {}", cli_args.source.display()))?;
    let metadata = std::fs::read_to_string(&cli_args.metadata)
        .with_context(|| format!("reading {}", cli_args.metadata.display()))?;
    let config = NetworkConfig::load(&cli_args.hedera)?;

    let client = SourcifyVerificationClient::new(config.sourcify_url.clone(), config.chain_id)?;
    let verifier = ContractVerifier::new(Arc::new(client));

    info!(
        contract_id = %cli_args.contract_id,
        network = %config.network,
        sourcify_url = %config.sourcify_url,
        "verifying contract"
    );
    match verifier
        .do_full_verification_single(
            cli_args.contract_id,
            &cli_args.contract_name,
            &source,
            &metadata,
        )
        .await
    {
        Ok(()) => {
            info!(contract_id = %cli_args.contract_id, "contract and all files verified");
            Ok(())
        }
        Err(e) => {
            error!(contract_id = %cli_args.contract_id, error = %e, "verification failed");
            Err(e.into())
        }
    }
}
