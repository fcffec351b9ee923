use std::sync::Arc;

use hd_transfer::{
    BalanceScanner, Config, HttpRpcClient, KeyDeriver, LedgerClient, TransferEngine,
    TransferRequest,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage:
  hd-transfer scan
  hd-transfer balance <address>
  hd-transfer address <phrase-no> <index>
  hd-transfer reveal <phrase-no> <index>
  hd-transfer transfer <phrase-no> <index> <to> <amount>";

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hd_transfer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = parse_command(&args) else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(&config, command).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Scan,
    Balance { address: String },
    Address { phrase_no: usize, index: u32 },
    Reveal { phrase_no: usize, index: u32 },
    Transfer { phrase_no: usize, index: u32, to: String, amount: String },
}

/// Recognise the command line without touching the environment.
fn parse_command(args: &[String]) -> Option<Command> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let command = match args.as_slice() {
        ["scan"] => Command::Scan,
        ["balance", address] => Command::Balance { address: address.to_string() },
        ["address", phrase_no, index] => Command::Address {
            phrase_no: phrase_no.parse().ok()?,
            index: index.parse().ok()?,
        },
        ["reveal", phrase_no, index] => Command::Reveal {
            phrase_no: phrase_no.parse().ok()?,
            index: index.parse().ok()?,
        },
        ["transfer", phrase_no, index, to, amount] => Command::Transfer {
            phrase_no: phrase_no.parse().ok()?,
            index: index.parse().ok()?,
            to: to.to_string(),
            amount: amount.to_string(),
        },
        _ => return None,
    };
    Some(command)
}

async fn run(config: &Config, command: Command) -> CliResult {
    let deriver = KeyDeriver::new();
    let ledger: Arc<dyn LedgerClient> = Arc::new(HttpRpcClient::new(&config.ledger));

    match command {
        Command::Scan => {
            let scanner = BalanceScanner::new(deriver, ledger, config.wallet.clone());
            let wallets = scanner.scan(&config.seed_phrases).await?;
            if wallets.is_empty() {
                println!("no funded accounts in the first {} indices", config.wallet.max_index_per_phrase);
            }
            for w in wallets {
                println!("{}  #{:<3} {}  {}", w.seed_phrase_label, w.account_index, w.address, w.balance_display);
            }
        }
        Command::Balance { address } => {
            let scanner = BalanceScanner::new(deriver, ledger, config.wallet.clone());
            println!("{}", scanner.check_balance(&address).await?);
        }
        Command::Address { phrase_no, index } => {
            println!("{}", deriver.derive_address(phrase(config, phrase_no)?, index)?);
        }
        Command::Reveal { phrase_no, index } => {
            println!("{}", deriver.reveal_private_key(phrase(config, phrase_no)?, index)?);
        }
        Command::Transfer { phrase_no, index, to, amount } => {
            let request = TransferRequest {
                signer_seed_phrase: phrase(config, phrase_no)?.to_string(),
                signer_index: index,
                recipient_address: to,
                amount_display: amount,
            };
            let engine = TransferEngine::new(deriver, ledger, config.wallet.clone());
            let result = engine.transfer(&request).await?;
            println!("{} confirmed in block {}", result.transaction_hash, result.confirmed_block);
        }
    }
    Ok(())
}

fn phrase(config: &Config, number: usize) -> Result<&str, Box<dyn std::error::Error>> {
    config
        .seed_phrase(number)
        .ok_or_else(|| format!("no seed phrase #{} (have {})", number, config.seed_phrases.len()).into())
}
