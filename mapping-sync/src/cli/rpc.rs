use clap::Args;
use error_stack::ResultExt;

use crate::{
    error::{Result, SyncError},
    provider::JsonRpcProvider,
};

#[derive(Args, Debug, Clone)]
pub struct RpcArgs {
    /// Ethereum RPC URL.
    #[arg(long = "rpc.url", env = "RPC_URL")]
    pub rpc_url: String,
}

impl RpcArgs {
    pub fn to_json_rpc_provider(&self) -> Result<JsonRpcProvider> {
        JsonRpcProvider::from_url_str(&self.rpc_url).change_context(SyncError::Configuration)
    }
}
