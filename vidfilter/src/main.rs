use std::process::ExitCode;

use tracing::error;

use vidfilter::cli::{self, Invocation};

fn main() -> ExitCode {
    let args = match cli::parse_from_env() {
        Ok(Invocation::Run(args)) => args,
        Ok(Invocation::HelpPrinted) => return ExitCode::SUCCESS,
        Err(e) => e.exit(),
    };

    match cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
