//! aptkit CLI
//!
//! One subcommand per workflow. Private keys are read from an environment
//! variable (`.env` is honoured) or a key file, never from a flag value.

mod config;

use anyhow::{Context, Result};
use aptkit::{
    AccountAddress, ClientConfig, MoveType, RegisterOutcome, RestClient, SubmissionResult, Workflows,
};
use clap::{Parser, Subcommand, ValueEnum};
use config::{ConnectionArgs, KeyArgs};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "aptkit", version)]
#[command(about = "Aptos accounts, balances and coin transactions", long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Log output format (stderr)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a mnemonic and derive its first account
    CreateAccount {
        /// Also print the private key
        #[arg(long)]
        show_private_key: bool,
    },
    /// Show the account behind a private key
    ImportAccount {
        #[command(flatten)]
        key: KeyArgs,
    },
    /// Sign a UTF-8 message
    Sign {
        #[command(flatten)]
        key: KeyArgs,
        #[arg(long)]
        message: String,
    },
    /// Native coin balance plus any extra coin types
    Balance {
        /// Account to query; defaults to the account of the private key
        #[arg(long)]
        address: Option<AccountAddress>,
        #[arg(long = "coin-type")]
        coin_types: Vec<MoveType>,
        #[command(flatten)]
        key: KeyArgs,
    },
    /// Send native coin
    TransferApt {
        #[command(flatten)]
        key: KeyArgs,
        #[arg(long)]
        to: AccountAddress,
        #[arg(long)]
        amount: u64,
    },
    /// Send a published coin to a registered recipient
    TransferToken {
        #[command(flatten)]
        key: KeyArgs,
        #[arg(long)]
        coin_type: MoveType,
        #[arg(long)]
        to: AccountAddress,
        #[arg(long)]
        amount: u64,
    },
    /// Register the account for a coin
    RegisterCoin {
        #[command(flatten)]
        key: KeyArgs,
        #[arg(long)]
        coin_type: MoveType,
    },
    /// Mint a managed coin (requires mint capability)
    MintCoin {
        #[command(flatten)]
        key: KeyArgs,
        #[arg(long)]
        coin_type: MoveType,
        /// Recipient; defaults to the minter
        #[arg(long)]
        to: Option<AccountAddress>,
        #[arg(long)]
        amount: u64,
    },
    /// Burn a managed coin (requires burn capability)
    BurnCoin {
        #[command(flatten)]
        key: KeyArgs,
        #[arg(long)]
        coin_type: MoveType,
        #[arg(long)]
        amount: u64,
    },
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "aptkit=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

fn print_submission(config: &ClientConfig, result: &SubmissionResult) {
    println!("Transaction hash: {}", result.hash);
    if config.node_url.is_none() {
        if let Some(url) = config.network.explorer_txn_url(&result.hash) {
            println!("Explorer: {}", url);
        }
    }
}

async fn connect(config: &ClientConfig) -> Result<RestClient> {
    RestClient::dial(config)
        .await
        .with_context(|| format!("cannot reach node at {}", config.rest_url()))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Command::CreateAccount { show_private_key } => {
            let created = aptkit::create_account()?;
            println!("Mnemonic: {}", created.mnemonic);
            println!("Path: {}", created.path);
            println!("Address: {}", created.account.address());
            println!("Public key: {}", created.account.public_key_hex());
            if show_private_key {
                println!("Private key: {}", created.account.private_key_hex());
            }
        }
        Command::ImportAccount { key } => {
            let account = key.load()?;
            println!("Address: {}", account.address());
            println!("Public key: {}", account.public_key_hex());
        }
        Command::Sign { key, message } => {
            let account = key.load()?;
            println!("{}", aptkit::sign_message(&account, message.as_bytes()));
        }
        Command::Balance {
            address,
            coin_types,
            key,
        } => {
            let address = match address {
                Some(address) => address,
                None => key.load()?.address(),
            };
            let config = cli.connection.resolve()?;
            let client = connect(&config).await?;

            let mut coins = vec![MoveType::aptos_coin()];
            coins.extend(coin_types.into_iter().filter(|c| !c.is_aptos_coin()));

            let balances = Workflows::new(&client)
                .balances(&address, &coins)
                .await
                .with_context(|| format!("cannot read balances of {}", address))?;
            for balance in balances {
                println!("{}: {} ({})", balance.coin_type, balance, balance.value);
            }
        }
        Command::TransferApt { key, to, amount } => {
            let account = key.load()?;
            let config = cli.connection.resolve()?;
            let client = connect(&config).await?;
            let result = Workflows::with_options(&client, config.transaction_options())
                .transfer_apt(&account, &to, amount)
                .await
                .context("transfer failed")?;
            print_submission(&config, &result);
        }
        Command::TransferToken {
            key,
            coin_type,
            to,
            amount,
        } => {
            let account = key.load()?;
            let config = cli.connection.resolve()?;
            let client = connect(&config).await?;
            let result = Workflows::with_options(&client, config.transaction_options())
                .transfer_token(&account, &coin_type, &to, amount)
                .await
                .context("token transfer failed")?;
            print_submission(&config, &result);
        }
        Command::RegisterCoin { key, coin_type } => {
            let account = key.load()?;
            let config = cli.connection.resolve()?;
            let client = connect(&config).await?;
            let outcome = Workflows::with_options(&client, config.transaction_options())
                .register_coin(&account, &coin_type)
                .await
                .context("registration failed")?;
            match outcome {
                RegisterOutcome::AlreadyRegistered => {
                    println!("{} is already registered for {}", account.address(), coin_type)
                }
                RegisterOutcome::Submitted(result) => print_submission(&config, &result),
            }
        }
        Command::MintCoin {
            key,
            coin_type,
            to,
            amount,
        } => {
            let account = key.load()?;
            let to = to.unwrap_or_else(|| account.address());
            let config = cli.connection.resolve()?;
            let client = connect(&config).await?;
            let result = Workflows::with_options(&client, config.transaction_options())
                .mint_coin(&account, &coin_type, &to, amount)
                .await
                .context("mint failed")?;
            print_submission(&config, &result);
        }
        Command::BurnCoin {
            key,
            coin_type,
            amount,
        } => {
            let account = key.load()?;
            let config = cli.connection.resolve()?;
            let client = connect(&config).await?;
            let result = Workflows::with_options(&client, config.transaction_options())
                .burn_coin(&account, &coin_type, amount)
                .await
                .context("burn failed")?;
            print_submission(&config, &result);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_transfer() {
        let cli = Cli::try_parse_from([
            "aptkit",
            "--network",
            "devnet",
            "transfer-apt",
            "--to",
            "0x1",
            "--amount",
            "10000",
        ])
        .unwrap();
        assert_eq!(cli.connection.network, Some(aptkit::Network::Devnet));
        match cli.command {
            Command::TransferApt { to, amount, key } => {
                assert_eq!(to, AccountAddress::ONE);
                assert_eq!(amount, 10_000);
                assert_eq!(key.key_env, config::DEFAULT_KEY_ENV);
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn test_parse_balance_coin_types() {
        let cli = Cli::try_parse_from([
            "aptkit",
            "balance",
            "--address",
            "0x1",
            "--coin-type",
            "0xcafe::moon_coin::MoonCoin",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Command::Balance { coin_types, .. } => {
                assert_eq!(coin_types.len(), 1);
                assert_eq!(coin_types[0].module(), "moon_coin");
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn test_rejects_bad_coin_type() {
        assert!(Cli::try_parse_from(["aptkit", "register-coin", "--coin-type", "nonsense"]).is_err());
    }
}
