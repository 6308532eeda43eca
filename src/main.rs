//! # stackbuild CLI
//!
//! Binary entry point. Parses arguments with `clap`, runs the selected
//! command and turns any error into a message on stderr and an exit status.
//!
//! This is the only place that decides the exit status: library errors carry
//! their own code through [`stackbuild::Error::exit_code`], anything else
//! exits with 1.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use stackbuild::error::EXIT_FAILURE;

fn exit_code_for(error: &anyhow::Error) -> u8 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<stackbuild::Error>())
        .map_or(EXIT_FAILURE, stackbuild::Error::exit_code)
}

/// The error and its causes, skipping causes the message already includes.
fn report(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    for cause in error.chain().skip(1) {
        let cause = cause.to_string();
        if !message.contains(&cause) {
            message.push_str(": ");
            message.push_str(&cause);
        }
    }
    message
}

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", report(&e));
            ExitCode::from(exit_code_for(&e))
        }
    }
}
