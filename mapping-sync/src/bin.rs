use std::process::ExitCode;

use clap::Parser;
use error_stack::ResultExt;
use mapping_sync::{
    cli::Cli,
    error::{ReportExt, Result, SyncError},
};
use mapping_sync_observability::init_tracing;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Cli::parse();
    run_with_args(args).await.to_exit_code()
}

async fn run_with_args(args: Cli) -> Result<()> {
    init_tracing()
        .change_context(SyncError::Fatal)
        .attach_printable("failed to initialize tracing")?;

    args.run().await
}
