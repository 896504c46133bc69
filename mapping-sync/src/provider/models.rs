pub use alloy_primitives::{Address, Bytes, LogData, B256};
pub use alloy_rpc_types_eth::{BlockNumberOrTag, Filter, Log};

/// Logs emitted by one contract with the given topic 0 over a block range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub address: Address,
    pub topic0: B256,
    pub from_block: BlockNumberOrTag,
    pub to_block: BlockNumberOrTag,
}

impl LogQuery {
    /// Query from `from_block` up to the latest block at query time.
    pub fn new(address: Address, topic0: B256, from_block: u64) -> Self {
        Self {
            address,
            topic0,
            from_block: BlockNumberOrTag::Number(from_block),
            to_block: BlockNumberOrTag::Latest,
        }
    }

    pub fn to_filter(&self) -> Filter {
        Filter::new()
            .address(self.address)
            .event_signature(self.topic0)
            .from_block(self.from_block)
            .to_block(self.to_block)
    }
}
