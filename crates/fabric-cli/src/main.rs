use fabric_cli::run_cli;
use tracing::error;

#[tokio::main]
async fn main() {
    // Run CLI and handle errors
    if let Err(e) = run_cli().await {
        error!("CLI error: {}", e);

        // Exit with appropriate code based on error type
        let exit_code = match e {
            fabric_cli::CliError::Configuration(_) => 1,
            fabric_cli::CliError::Service(_) => 2,
            fabric_cli::CliError::CommandFailed { .. } => 3,
            fabric_cli::CliError::InvalidArgument { .. } => 4,
            fabric_cli::CliError::Io(_) => 5,
            fabric_cli::CliError::Fabric(_) => 6,
        };

        std::process::exit(exit_code);
    }
}
