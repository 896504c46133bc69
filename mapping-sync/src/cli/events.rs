use clap::Args;
use error_stack::ResultExt;

use crate::{
    collector::{EventCollector, EventQueryOutcome},
    error::{Result, SyncError},
};

use super::{contract::ContractArgs, rpc::RpcArgs};

/// Print the events emitted by the contract, grouped by event name.
#[derive(Args, Debug)]
pub struct EventsCommand {
    #[clap(flatten)]
    rpc: RpcArgs,
    #[clap(flatten)]
    pub(crate) contract: ContractArgs,
    /// Print every decoded occurrence, not only the counts.
    #[clap(long, action)]
    verbose: bool,
}

impl EventsCommand {
    pub async fn run(self) -> Result<()> {
        let descriptor = self.contract.descriptor()?;
        let provider = self.rpc.to_json_rpc_provider()?;
        let collector = EventCollector::new(provider, self.contract.address()?)
            .with_from_block(self.contract.from_block);

        let events = collector
            .collect(&descriptor)
            .await
            .change_context(SyncError::Configuration)?;

        println!("contract: {}", collector.contract_address());
        for (name, outcome) in events.iter() {
            match outcome {
                EventQueryOutcome::Collected(occurrences) => {
                    println!("{name}: {} events", occurrences.len());
                    if self.verbose {
                        for occurrence in occurrences {
                            println!("{:#?}", occurrence);
                        }
                    }
                }
                EventQueryOutcome::Failed(err) => {
                    println!("{name}: query failed: {}", err.current_context());
                }
            }
        }

        Ok(())
    }
}
