mod http;
pub mod models;

use async_trait::async_trait;
use error_stack::Result;

pub use self::http::{JsonRpcProvider, JsonRpcProviderError};
pub use self::models::LogQuery;

/// Source of historical contract logs.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Returns every log matching the query, in block order.
    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<models::Log>, JsonRpcProviderError>;
}
