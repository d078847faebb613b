//! Botaniq - Local-first plant care tracking

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = botaniq::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
