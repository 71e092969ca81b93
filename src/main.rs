//! `hsb` binary entry point.

use clap::Parser;

use homework_status_bot::cli_app::{self, Cli};

fn main() {
    // Real environment variables always win over `.env`.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if let Err(err) = cli_app::run(&cli) {
        eprintln!("hsb: {err}");
        std::process::exit(1);
    }
}
