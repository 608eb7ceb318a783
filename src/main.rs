//! Tern CLI — recipe-to-IR compiler for information-flow solving.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "tern",
    version,
    about = "Compile recipes into solver IR — stores, particles, capability edges, leak tracking"
)]
struct Cli {
    #[command(subcommand)]
    command: tern::cli::Commands,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = tern::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
