use std::path::PathBuf;

use clap::Args;
use error_stack::ResultExt;

use crate::{
    abi::ContractDescriptor,
    error::{Result, SyncError},
    provider::models::Address,
};

#[derive(Args, Debug, Clone)]
pub struct ContractArgs {
    /// Address of the mapping contract, `0x`-prefixed.
    #[arg(long = "contract.address", env = "CONTRACT_ADDRESS")]
    pub contract_address: String,

    /// Path to the contract JSON ABI. Defaults to the built-in mapping registry ABI.
    #[arg(long = "contract.abi", env = "CONTRACT_ABI")]
    pub contract_abi: Option<PathBuf>,

    /// First block to scan for events.
    #[arg(long = "from-block", env = "FROM_BLOCK", default_value = "0")]
    pub from_block: u64,
}

impl ContractArgs {
    pub fn address(&self) -> Result<Address> {
        self.contract_address
            .parse::<Address>()
            .change_context(SyncError::Configuration)
            .attach_printable("failed to parse contract address")
            .attach_printable_lazy(|| format!("address: {}", self.contract_address))
    }

    pub fn descriptor(&self) -> Result<ContractDescriptor> {
        let descriptor = match &self.contract_abi {
            Some(path) => ContractDescriptor::from_file(path),
            None => ContractDescriptor::mapping_registry(),
        };

        descriptor.change_context(SyncError::Configuration)
    }
}
