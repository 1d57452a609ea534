use clap::Parser;
use docshelf_cli::Cli;
use docshelf_cli::EXIT_NOT_FOUND;
use docshelf_cli::is_not_found;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match cli.load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    // Logs go to stderr so stdout stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log.filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if is_not_found(&err) => {
            eprintln!("Not found: {err:#}");
            ExitCode::from(EXIT_NOT_FOUND)
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
