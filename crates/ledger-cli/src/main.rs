use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "CLI client for the minimal ledger node")]
struct Cli {
    /// Node base URL (e.g. http://127.0.0.1:8080)
    #[arg(long, global = true, default_value = "http://127.0.0.1:8080")]
    node: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a transaction
    Submit {
        /// Sender
        #[arg(long)]
        sender: String,
        /// Recipient
        #[arg(long)]
        recipient: String,
        /// Amount
        #[arg(long, allow_hyphen_values = true)]
        amount: i64,
    },
    /// Run proof-of-work on the node and seal pending transactions
    Mine,
    /// Print the full chain
    Chain,
    /// Print the last block
    Head,
    /// Ask the node to re-check every link and proof
    Validate,
}

#[derive(Serialize)]
struct Tx {
    sender: String,
    recipient: String,
    amount: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let node = cli.node.trim_end_matches('/');
    let client = reqwest::Client::new();

    let request = match cli.cmd {
        Command::Submit {
            sender,
            recipient,
            amount,
        } => {
            let tx = Tx {
                sender,
                recipient,
                amount,
            };
            client.post(format!("{node}/transactions/new")).json(&tx)
        }
        Command::Mine => client.post(format!("{node}/mine")),
        Command::Chain => client.get(format!("{node}/chain")),
        Command::Head => client.get(format!("{node}/chain/head")),
        Command::Validate => client.get(format!("{node}/chain/validate")),
    };

    debug!(?request, "sending");
    let res = request.send().await?;
    let status = res.status();
    let body = res.text().await?;
    println!("status: {}", status);
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{body}"),
    }
    Ok(())
}
