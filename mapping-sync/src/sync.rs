//! Fetch the directory published by the latest mapping update.
//!
//! A run goes through three steps:
//!
//!  - collect every event the contract defines,
//!  - pick the value of the most recent `MappingUpdated` event,
//!  - download the directory it names from the gateway.
//!
//! A contract without any mapping update is not an error: the run ends
//! after the second step with [SyncOutcome::NoMapping].
use std::path::PathBuf;

use error_stack::ResultExt;
use tracing::{info, warn};

use crate::{
    abi::ContractDescriptor,
    collector::{CollectError, CollectedEvents, EventCollector},
    error::{Result, SyncError},
    extract::extract_latest,
    gateway::{GatewayError, IpfsGateway},
    provider::{models::Address, LogSource},
};

pub const MAPPING_UPDATED_EVENT: &str = "MappingUpdated";
pub const MAPPING_VALUE_FIELD: &str = "value";

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Address of the mapping contract.
    pub contract_address: Address,
    /// First block to scan for events.
    pub from_block: u64,
    /// Where the downloaded archive is written.
    pub output_dir: PathBuf,
    /// Event that publishes new CIDs.
    pub event_name: String,
    /// String field of `event_name` that holds the CID.
    pub value_field: String,
}

impl SyncConfig {
    pub fn new(contract_address: Address) -> Self {
        Self {
            contract_address,
            from_block: 0,
            output_dir: PathBuf::from("."),
            event_name: MAPPING_UPDATED_EVENT.to_string(),
            value_field: MAPPING_VALUE_FIELD.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No mapping was ever published. Nothing was downloaded.
    NoMapping,
    /// The latest mapping was downloaded to `path`.
    Downloaded { cid: String, path: PathBuf },
}

pub struct MappingSync<S> {
    collector: EventCollector<S>,
    gateway: IpfsGateway,
    descriptor: ContractDescriptor,
    config: SyncConfig,
}

impl<S> MappingSync<S>
where
    S: LogSource,
{
    pub fn new(
        source: S,
        gateway: IpfsGateway,
        descriptor: ContractDescriptor,
        config: SyncConfig,
    ) -> Self {
        let collector =
            EventCollector::new(source, config.contract_address).with_from_block(config.from_block);
        Self {
            collector,
            gateway,
            descriptor,
            config,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Collect every event defined by the contract.
    pub async fn collect(&self) -> Result<CollectedEvents> {
        self.collector
            .collect(&self.descriptor)
            .await
            .map_err(|err| {
                let context = match err.current_context() {
                    CollectError::NoEventsDefined => SyncError::Configuration,
                    _ => SyncError::Fatal,
                };
                err.change_context(context)
            })
            .attach_printable("failed to collect contract events")
    }

    pub async fn run(&self) -> Result<SyncOutcome> {
        let events = self.collect().await?;

        let event_name = &self.config.event_name;
        if events.get(event_name).is_none() {
            warn!(event = %event_name, "event is not defined in the contract ABI");
        }

        let occurrences = events.occurrences(event_name);
        info!(event = %event_name, count = occurrences.len(), "found mapping events");

        let Some(cid) = extract_latest(occurrences, &self.config.value_field)
            .change_context(SyncError::InvalidArgument)?
        else {
            return Ok(SyncOutcome::NoMapping);
        };

        info!(cid, "latest mapping value");

        let path = self
            .gateway
            .fetch_directory(cid, &self.config.output_dir)
            .await
            .map_err(|err| {
                let context = match err.current_context() {
                    GatewayError::InvalidArgument => SyncError::InvalidArgument,
                    GatewayError::Retrieval { .. } => SyncError::Retrieval,
                    GatewayError::Transport => SyncError::Transport,
                    GatewayError::Io => SyncError::Io,
                    GatewayError::Configuration => SyncError::Configuration,
                };
                err.change_context(context)
            })
            .attach_printable("failed to download IPFS directory")?;

        Ok(SyncOutcome::Downloaded {
            cid: cid.to_string(),
            path,
        })
    }
}
