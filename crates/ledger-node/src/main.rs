use clap::Parser;
use ledger_core::{constants::DEFAULT_DIFFICULTY, Difficulty, Ledger};
use ledger_node::{
    app,
    constants::{DEFAULT_LISTEN, DEFAULT_NODE_ID},
    AppState,
};
use std::net::SocketAddr;
use tracing::{info, Level};

#[derive(Parser, Debug)]
struct Args {
    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(long, default_value = DEFAULT_LISTEN)]
    listen: String,

    /// Leading zero hex digits required of each proof hash
    #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
    difficulty: usize,

    /// Identity credited with the mining reward
    #[arg(long, default_value = DEFAULT_NODE_ID)]
    node_id: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let difficulty = Difficulty::new(args.difficulty)?;
    let ledger = Ledger::with_difficulty(difficulty);
    info!(
        %difficulty,
        genesis = %ledger.last_block().hash(),
        "ledger created"
    );

    let state = AppState::new(ledger, args.node_id);

    let addr: SocketAddr = args.listen.parse()?;
    info!("ledger-node listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}
