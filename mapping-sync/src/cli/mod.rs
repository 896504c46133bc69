mod contract;
mod events;
mod rpc;
mod run;

use clap::{Parser, Subcommand};

use crate::error::Result;

pub use self::{contract::ContractArgs, events::EventsCommand, rpc::RpcArgs, run::RunCommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    subcommand: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download the directory named by the latest mapping update.
    Run(RunCommand),
    /// Print every event emitted by the contract.
    Events(EventsCommand),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.subcommand {
            Command::Run(command) => command.run().await.map(|_| ()),
            Command::Events(command) => command.run().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use assert_matches::assert_matches;
    use clap::Parser;

    use crate::error::SyncError;

    use super::{Cli, Command};

    const CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from([
            "mapping-sync",
            "run",
            "--rpc.url",
            "http://localhost:8545",
            "--contract.address",
            CONTRACT,
        ])
        .unwrap();

        let Command::Run(command) = cli.subcommand else {
            panic!("expected run command");
        };

        let config = command.to_sync_config().unwrap();
        assert_eq!(config.contract_address.to_string().to_lowercase(), CONTRACT);
        assert_eq!(config.from_block, 0);
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.event_name, "MappingUpdated");
        assert_eq!(config.value_field, "value");
        assert!(command.contract.descriptor().is_ok());
    }

    #[test]
    fn test_run_overrides() {
        let cli = Cli::try_parse_from([
            "mapping-sync",
            "run",
            "--rpc.url",
            "http://localhost:8545",
            "--contract.address",
            CONTRACT,
            "--from-block",
            "1200",
            "--output-dir",
            "/tmp/mappings",
            "--gateway.url",
            "http://localhost:8080",
        ])
        .unwrap();

        let Command::Run(command) = cli.subcommand else {
            panic!("expected run command");
        };

        let config = command.to_sync_config().unwrap();
        assert_eq!(config.from_block, 1200);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/mappings"));
    }

    #[test]
    fn test_invalid_contract_address() {
        let cli = Cli::try_parse_from([
            "mapping-sync",
            "run",
            "--rpc.url",
            "http://localhost:8545",
            "--contract.address",
            "0x1234",
        ])
        .unwrap();

        let Command::Run(command) = cli.subcommand else {
            panic!("expected run command");
        };

        let err = command.to_sync_config().unwrap_err();
        assert_matches!(err.current_context(), SyncError::Configuration);
    }

    #[test]
    fn test_missing_abi_file() {
        let cli = Cli::try_parse_from([
            "mapping-sync",
            "events",
            "--rpc.url",
            "http://localhost:8545",
            "--contract.address",
            CONTRACT,
            "--contract.abi",
            "/does/not/exist.json",
        ])
        .unwrap();

        let Command::Events(command) = cli.subcommand else {
            panic!("expected events command");
        };

        let err = command.contract.descriptor().unwrap_err();
        assert_matches!(err.current_context(), SyncError::Configuration);
    }
}
