mod cli;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();

    let (addr, config) = match cli::run() {
        cli::RunOutcome::Serve { addr, config } => (addr, config),
        cli::RunOutcome::Exit(code) => std::process::exit(code),
    };

    if let Err(err) = headsup::serve(addr, config).await {
        tracing::error!(error = %err, "headsup stopped");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
