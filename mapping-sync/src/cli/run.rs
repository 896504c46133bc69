use std::path::PathBuf;

use clap::Args;
use error_stack::ResultExt;
use tracing::info;

use crate::{
    error::{Result, SyncError},
    gateway::{IpfsGateway, DEFAULT_GATEWAY_URL},
    sync::{MappingSync, SyncConfig, SyncOutcome, MAPPING_UPDATED_EVENT, MAPPING_VALUE_FIELD},
};

use super::{contract::ContractArgs, rpc::RpcArgs};

#[derive(Args, Debug)]
pub struct RunCommand {
    #[clap(flatten)]
    rpc: RpcArgs,
    #[clap(flatten)]
    pub(crate) contract: ContractArgs,

    /// IPFS HTTP gateway.
    #[arg(long = "gateway.url", env = "IPFS_GATEWAY_URL", default_value = DEFAULT_GATEWAY_URL)]
    gateway_url: String,

    /// Directory where the archive is written.
    #[arg(long, env = "OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Event that publishes the CID.
    #[arg(long, default_value = MAPPING_UPDATED_EVENT)]
    event: String,

    /// String field of the event that holds the CID.
    #[arg(long, default_value = MAPPING_VALUE_FIELD)]
    field: String,
}

impl RunCommand {
    pub fn to_sync_config(&self) -> Result<SyncConfig> {
        let mut config = SyncConfig::new(self.contract.address()?);
        config.from_block = self.contract.from_block;
        config.output_dir = self.output_dir.clone();
        config.event_name = self.event.clone();
        config.value_field = self.field.clone();
        Ok(config)
    }

    pub async fn run(self) -> Result<SyncOutcome> {
        let config = self.to_sync_config()?;
        let descriptor = self.contract.descriptor()?;
        let provider = self.rpc.to_json_rpc_provider()?;
        let gateway =
            IpfsGateway::from_url_str(&self.gateway_url).change_context(SyncError::Configuration)?;

        let rpc_url = provider.url().clone();
        let sync = MappingSync::new(provider, gateway, descriptor, config);

        info!(
            rpc = %rpc_url,
            contract = %sync.config().contract_address,
            from_block = sync.config().from_block,
            "starting mapping sync"
        );

        let outcome = sync.run().await?;

        match &outcome {
            SyncOutcome::NoMapping => info!("no mapping published, nothing to download"),
            SyncOutcome::Downloaded { cid, path } => {
                info!(cid, path = %path.display(), "mapping sync complete")
            }
        }

        Ok(outcome)
    }
}
