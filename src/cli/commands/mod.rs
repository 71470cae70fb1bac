//! Command implementations for the decoder CLI
//!
//! Each command lives in its own module:
//! - `decode`: `metar` and `taf` commands for reports given as arguments
//! - `batch`: concurrent decoding of report files and stdin
//! - `shared`: logging, configuration and output helpers

pub mod batch;
pub mod decode;
pub mod shared;

use crate::Result;
use crate::cli::args::{Args, Commands};
use tokio_util::sync::CancellationToken;

/// Dispatch to the handler for the selected subcommand
pub async fn run(args: Args, cancellation_token: CancellationToken) -> Result<()> {
    match args.get_command() {
        Some(Commands::Metar(decode_args)) => decode::run_metar(decode_args).await,
        Some(Commands::Taf(decode_args)) => decode::run_taf(decode_args).await,
        Some(Commands::Batch(batch_args)) => batch::run_batch(batch_args, cancellation_token).await,
        None => Ok(()),
    }
}
