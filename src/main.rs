use clap::Parser;
use nook::cli::commands::Cli;
use nook::cli::handlers;

fn main() {
    let cli = Cli::parse();
    nook::logging::init();

    if let Err(e) = handlers::dispatch(cli) {
        tracing::debug!(error = %e, "command failed");
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
