//! Operator CLI for the multi-chain transaction engine.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use multichain_tx::blockchain::{wait_for_confirmation, ChainClient};
use multichain_tx::config::{load_config, EngineConfig};
use multichain_tx::observability::{init_logging, metrics};
use multichain_tx::signing::EnvKeyResolver;
use multichain_tx::{ChainId, TransactionOrchestrator, TransactionRequest};

#[derive(Parser)]
#[command(name = "multichain-tx")]
#[command(about = "Build, sign and broadcast transactions on AccountChain and SequenceChain", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, default_value = "multichain-tx.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a transaction request read from a JSON file
    Execute {
        request: PathBuf,
        /// Give up after this many seconds
        #[arg(long, default_value_t = 60)]
        timeout_secs: u64,
        /// Poll for confirmation after a successful broadcast
        #[arg(long)]
        wait: bool,
    },
    /// Native or token balance of an address
    Balance {
        #[arg(long)]
        chain: ChainId,
        #[arg(long)]
        address: String,
        #[arg(long)]
        token: Option<String>,
    },
    /// Status of a broadcast transaction
    Status {
        #[arg(long)]
        chain: ChainId,
        #[arg(long)]
        hash: String,
    },
    /// Next nonce (AccountChain) or recent blockhash (SequenceChain)
    Nonce {
        #[arg(long)]
        chain: ChainId,
        #[arg(long)]
        address: String,
        /// Reseed the admin nonce cache from the chain
        #[arg(long)]
        reload: bool,
    },
    /// Latest block
    Block {
        #[arg(long)]
        chain: ChainId,
    },
}

type CliResult = Result<bool, Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load {}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_logging(&config.observability) {
        eprintln!("Error: failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }
    metrics::describe_metrics();

    match run(cli.command, config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: EngineConfig) -> CliResult {
    let keys = Arc::new(EnvKeyResolver::new(config.admin.clone()));
    let orchestrator = TransactionOrchestrator::from_config(&config, keys)?;

    match command {
        Commands::Execute {
            request,
            timeout_secs,
            wait,
        } => {
            let request: TransactionRequest =
                serde_json::from_str(&std::fs::read_to_string(&request)?)?;
            let result = orchestrator
                .execute_with_timeout(&request, Duration::from_secs(timeout_secs))
                .await;
            println!("{}", serde_json::to_string_pretty(&result)?);

            if let (true, Some(hash)) = (wait, result.transaction_hash()) {
                let client = orchestrator.registry().client(request.chain)?;
                let status = wait_for_confirmation(
                    client.as_ref(),
                    hash,
                    Duration::from_secs(2),
                    Duration::from_secs(timeout_secs),
                )
                .await?;
                println!("status: {:?}", status);
            }
            Ok(result.is_success())
        }
        Commands::Balance {
            chain,
            address,
            token,
        } => {
            let client = orchestrator.registry().client(chain)?;
            let balance = match token {
                Some(token) => client.get_token_balance(&token, &address).await?,
                None => client.get_balance(&address).await?,
            };
            println!("{}", balance.to_decimal_string());
            Ok(true)
        }
        Commands::Status { chain, hash } => {
            let client = orchestrator.registry().client(chain)?;
            println!("{:?}", client.get_status(&hash).await?);
            Ok(true)
        }
        Commands::Nonce {
            chain,
            address,
            reload,
        } => {
            if reload {
                let nonces = orchestrator
                    .nonce_allocator()
                    .ok_or("no nonce cache: account_chain is not enabled")?;
                println!("{}", nonces.force_reload(&address, chain).await?);
            } else {
                let client = orchestrator.registry().client(chain)?;
                println!("{:?}", client.get_sequence_number(&address).await?);
            }
            Ok(true)
        }
        Commands::Block { chain } => {
            let client: &Arc<dyn ChainClient> = orchestrator.registry().client(chain)?;
            let block = client.get_latest_block().await?;
            println!("{}", serde_json::to_string_pretty(&block)?);
            Ok(true)
        }
    }
}
