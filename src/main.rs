//! Sembrar CLI — intent-driven Terraform provisioning.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "sembrar",
    version,
    about = "Intent-driven Terraform provisioning — typed intents, composed configs, driven lifecycles"
)]
struct Cli {
    #[command(subcommand)]
    command: sembrar::cli::Commands,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = sembrar::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
