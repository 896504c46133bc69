use alloy_rpc_client::{ClientBuilder, RpcClient};
use async_trait::async_trait;
use error_stack::{Result, ResultExt};
use url::Url;

use super::{models, LogSource};

#[derive(Debug)]
pub enum JsonRpcProviderError {
    /// The request failed or the response could not be decoded.
    Request,
    /// The provider is misconfigured.
    Configuration,
}

/// JSON-RPC client for an Ethereum node.
///
/// Requests are sent once. Timeouts are whatever the underlying HTTP client provides.
#[derive(Clone)]
pub struct JsonRpcProvider {
    client: RpcClient,
    url: Url,
}

impl JsonRpcProvider {
    pub fn new(url: Url) -> Self {
        let client = ClientBuilder::default().http(url.clone());
        Self { client, url }
    }

    pub fn from_url_str(url: &str) -> Result<Self, JsonRpcProviderError> {
        let url = url
            .parse::<Url>()
            .change_context(JsonRpcProviderError::Configuration)
            .attach_printable("failed to parse RPC URL")
            .attach_printable_lazy(|| format!("url: {url}"))?;
        Ok(Self::new(url))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl LogSource for JsonRpcProvider {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_logs(
        &self,
        query: &models::LogQuery,
    ) -> Result<Vec<models::Log>, JsonRpcProviderError> {
        let filter = query.to_filter();

        self.client
            .request::<_, Vec<models::Log>>("eth_getLogs", (filter,))
            .await
            .change_context(JsonRpcProviderError::Request)
            .attach_printable("failed to get logs")
            .attach_printable_lazy(|| format!("address: {}", query.address))
            .attach_printable_lazy(|| format!("topic0: {}", query.topic0))
    }
}

impl error_stack::Context for JsonRpcProviderError {}

impl std::fmt::Display for JsonRpcProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonRpcProviderError::Request => write!(f, "failed to send request"),
            JsonRpcProviderError::Configuration => write!(f, "configuration error"),
        }
    }
}
