use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "treasury-cli")]
#[command(about = "Operator CLI for the treasury engine", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show treasury balance, ledger total and target contracts
    Health,
    /// Submit an earning event
    Earn {
        /// Amount in USD, converted at the service's configured price
        #[arg(long, conflicts_with = "eth", required_unless_present = "eth")]
        usd: Option<f64>,
        /// Amount in ETH
        #[arg(long)]
        eth: Option<f64>,
        #[arg(long, default_value = "cli")]
        source: String,
    },
    /// Withdraw ETH to a wallet
    Withdraw {
        #[arg(long)]
        to: String,
        #[arg(long)]
        eth: f64,
    },
    /// Send ETH from the treasury to a contract
    Fund {
        #[arg(long)]
        contract: String,
        #[arg(long)]
        eth: f64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Health => client.get(format!("{base}/health")).send().await?,
        Commands::Earn { usd, eth, source } => {
            client
                .post(format!("{base}/api/earn"))
                .json(&json!({ "amountUSD": usd, "amountETH": eth, "source": source }))
                .send()
                .await?
        }
        Commands::Withdraw { to, eth } => {
            client
                .post(format!("{base}/api/withdraw"))
                .json(&json!({ "userWallet": to, "amountETH": eth, "source": "cli" }))
                .send()
                .await?
        }
        Commands::Fund { contract, eth } => {
            client
                .post(format!("{base}/api/fund/contract"))
                .json(&json!({ "contractAddress": contract, "amountETH": eth }))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let body = res.text().await?;

    let rendered = match serde_json::from_str::<Value>(&body) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => body,
    };

    if status.is_success() {
        println!("{rendered}");
        Ok(())
    } else {
        eprintln!("Error: treasury returned status {status}");
        eprintln!("{rendered}");
        std::process::exit(1);
    }
}
