use clap::Parser;
use guardgate::cli;
use guardgate::errors::GatewayError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(!cli.no_color)
            .init();
    }

    let result = match cli.command {
        cli::Commands::Serve(args) => cli::serve::handle_serve(args).await,
        cli::Commands::Validate(args) => cli::validate::handle_validate(args).await,
        cli::Commands::Moderate(args) => cli::moderate::handle_moderate(args).await,
        cli::Commands::Providers(args) => cli::providers::handle_providers(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let exit_code = match &e {
            GatewayError::Config(_) | GatewayError::Yaml(_) => 2,
            _ => 1,
        };
        std::process::exit(exit_code);
    }
}
