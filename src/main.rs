use clap::Parser;
use std::process::ExitCode;
use ww_historian::commands::{execute, load_config, Cli};
use ww_historian::HistorianClient;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let client = match load_config(&cli).and_then(HistorianClient::new) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = execute(&client, &cli.command, cli.format);

    if cli.show_log {
        eprint!("{}", client.dump_log());
    }

    match result {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!("Query failed ({:?})", e.kind());
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
