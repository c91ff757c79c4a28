use std::process::ExitCode;

use agentctl::cli::EXIT_FAILURE;
use agentctl::emit::{glue_error_record, print_error_record};

fn main() -> ExitCode {
    // One invocation per process; a current-thread runtime is enough
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            let err = anyhow::Error::new(err).context("Failed to build tokio runtime");
            print_error_record(&glue_error_record("Runtime", &err));
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    ExitCode::from(runtime.block_on(agentctl::run(std::env::args_os())))
}
