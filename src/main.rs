#![forbid(unsafe_code)]

//! prisoners: 100 prisoners problem simulator CLI entry point.

use clap::Parser;

mod cli_app;

fn main() {
    let args = cli_app::Cli::parse();
    if let Err(e) = cli_app::run(&args) {
        eprintln!("prisoners: {e}");
        std::process::exit(e.exit_code());
    }
}
