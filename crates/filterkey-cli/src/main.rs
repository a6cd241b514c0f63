//! filterkey command-line tool
//!
//! Encodes field and schema keys, lists filter operators, validates filter
//! values and converts filter sets between URLs and JSON.

mod commands;
mod config;
mod formatter;

use clap::Parser;
use filterkey_core::CodecConfig;

use crate::config::Args;

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("filterkey_cli=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = CodecConfig::from(args);
    let formatter = formatter::create_formatter(args.format);
    let output = commands::execute(&args.command, &config, &*formatter)?;
    println!("{}", output);
    Ok(())
}
