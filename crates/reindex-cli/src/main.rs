use reindex_core::logging;

mod cli;

use crate::cli::{is_reported, CliCommand};

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible; stderr if the state dir is unusable.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = CliCommand::run_from_args().await {
        if !is_reported(&err) {
            eprintln!("reindex error: {:#}", err);
        }
        std::process::exit(1);
    }
}
