//! contract-deployer
//!
//! Compiles `contracts/SimpleStorage.sol`, deploys it to a local node, calls
//! `store(15)` and prints `retrieve()` before and after.
//!
//! ```text
//! source ─▶ solc ─▶ compiled_sol.json
//!                └▶ bytecode + ABI ─▶ deploy (nonce N) ─▶ retrieve()
//!                                   ─▶ store(15) (nonce N+1) ─▶ retrieve()
//! ```
//!
//! The signing key is read from `PRIVATE_KEY` (a `.env` file is honoured).

use clap::Parser;
use std::error::Error;
use std::path::PathBuf;

use contract_deployer::compiler::SvmSolc;
use contract_deployer::config::loader::{load_or_default, ConfigOverrides};
use contract_deployer::contract::format_values;
use contract_deployer::observability::logging::init_logging;
use contract_deployer::Deployer;

#[derive(Parser)]
#[command(name = "contract-deployer")]
#[command(about = "Compile, deploy and exercise a Solidity contract", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the node endpoint.
    #[arg(long)]
    rpc_url: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    if let Err(e) = run(cli).await {
        eprintln!("{}", error_message(e.as_ref()));
        std::process::exit(1);
    }
}

/// Exit message for a failed run; multi-line toolchain output is kept as is.
fn error_message(err: &dyn Error) -> String {
    format!("Error: {}", err)
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let overrides = ConfigOverrides {
        rpc_url: cli.rpc_url,
    };
    let config = load_or_default(cli.config.as_deref(), overrides)?;

    init_logging(&config.observability);
    tracing::info!(
        source = %config.compiler.source_path,
        rpc_url = %config.blockchain.rpc_url,
        chain_id = config.blockchain.chain_id,
        "contract-deployer v0.1.0 starting"
    );

    let compiler = SvmSolc::parse(&config.compiler.solc_version)?;
    let report = Deployer::new(config, compiler).run().await?;

    println!("{}", format_values(&report.initial_value));
    println!("{}", format_values(&report.final_value));

    tracing::info!(
        address = %report.contract_address,
        deploy_tx = %report.deploy_tx,
        call_tx = %report.call_tx,
        "Done"
    );
    Ok(())
}
