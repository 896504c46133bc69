use std::collections::BTreeMap;

use alloy_dyn_abi::{DynSolType, DynSolValue};
use error_stack::{Result, ResultExt};

use crate::{
    abi::{EventDefinition, ResolvedParam},
    provider::models::{Log, B256},
};

use super::CollectError;

/// One decoded occurrence of a contract event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventOccurrence {
    pub block_number: Option<u64>,
    pub log_index: Option<u64>,
    pub transaction_hash: Option<B256>,
    /// Decoded arguments by parameter name.
    ///
    /// Indexed parameters of dynamic type hold their 32-byte topic hash.
    pub args: BTreeMap<String, DynSolValue>,
}

impl EventOccurrence {
    pub fn arg(&self, name: &str) -> Option<&DynSolValue> {
        self.args.get(name)
    }

    pub fn string_arg(&self, name: &str) -> Option<&str> {
        self.arg(name).and_then(DynSolValue::as_str)
    }
}

/// Decodes a log emitted by `event`.
pub fn decode_log(event: &EventDefinition, log: &Log) -> Result<EventOccurrence, CollectError> {
    let topics = log.inner.data.topics();
    let data = &log.inner.data.data;

    let first_topic = if event.anonymous { 0 } else { 1 };
    let indexed_count = event.params.iter().filter(|param| param.indexed).count();

    if topics.len() != first_topic + indexed_count {
        return Err(CollectError::Decode)
            .attach_printable("log topic count does not match the event definition")
            .attach_printable_lazy(|| {
                format!(
                    "expected {} topics, found {}",
                    first_topic + indexed_count,
                    topics.len()
                )
            });
    }

    let data_types = event
        .params
        .iter()
        .filter(|param| !param.indexed)
        .map(|param| param.ty.clone())
        .collect::<Vec<_>>();

    let mut data_values = if data_types.is_empty() {
        Vec::new()
    } else {
        match DynSolType::Tuple(data_types)
            .abi_decode_sequence(data)
            .change_context(CollectError::Decode)
            .attach_printable("failed to decode log data")?
        {
            DynSolValue::Tuple(values) => values,
            value => vec![value],
        }
    }
    .into_iter();

    let mut topic_values = topics[first_topic..].iter();

    let mut args = BTreeMap::new();
    for (index, param) in event.params.iter().enumerate() {
        let value = if param.indexed {
            let topic = topic_values
                .next()
                .ok_or(CollectError::Decode)
                .attach_printable("missing indexed topic")?;
            decode_topic(param, topic)?
        } else {
            data_values
                .next()
                .ok_or(CollectError::Decode)
                .attach_printable("missing log data value")?
        };

        let key = if param.name.is_empty() {
            format!("arg{index}")
        } else {
            param.name.clone()
        };
        args.insert(key, value);
    }

    Ok(EventOccurrence {
        block_number: log.block_number,
        log_index: log.log_index,
        transaction_hash: log.transaction_hash,
        args,
    })
}

fn decode_topic(param: &ResolvedParam, topic: &B256) -> Result<DynSolValue, CollectError> {
    match param.ty {
        DynSolType::String
        | DynSolType::Bytes
        | DynSolType::Array(_)
        | DynSolType::FixedArray(_, _)
        | DynSolType::Tuple(_) => Ok(DynSolValue::FixedBytes(*topic, 32)),
        _ => param
            .ty
            .abi_decode(topic.as_slice())
            .change_context(CollectError::Decode)
            .attach_printable("failed to decode indexed topic")
            .attach_printable_lazy(|| format!("parameter: {}", param.name)),
    }
}

#[cfg(test)]
mod tests {
    use alloy_dyn_abi::DynSolValue;
    use alloy_primitives::{address, Address, LogData, U256};
    use assert_matches::assert_matches;

    use crate::{
        abi::ContractDescriptor,
        collector::CollectError,
        provider::models::{Log, B256},
    };

    use super::decode_log;

    fn new_log(topics: Vec<B256>, data: Vec<u8>) -> Log {
        Log {
            inner: alloy_primitives::Log {
                address: Address::ZERO,
                data: LogData::new_unchecked(topics, data.into()),
            },
            block_number: Some(7),
            log_index: Some(2),
            ..Default::default()
        }
    }

    #[test]
    fn test_decode_string_data() {
        let descriptor = ContractDescriptor::mapping_registry().unwrap();
        let event = descriptor.event("MappingUpdated").unwrap();

        let data = DynSolValue::Tuple(vec![DynSolValue::String("bafybeigdyrzt".to_string())])
            .abi_encode_params();
        let log = new_log(vec![event.selector], data);

        let occurrence = decode_log(event, &log).unwrap();
        assert_eq!(occurrence.block_number, Some(7));
        assert_eq!(occurrence.log_index, Some(2));
        assert_eq!(occurrence.string_arg("value"), Some("bafybeigdyrzt"));
    }

    #[test]
    fn test_decode_indexed_addresses() {
        let descriptor = ContractDescriptor::mapping_registry().unwrap();
        let event = descriptor.event("OwnershipTransferred").unwrap();

        let previous = address!("0000000000000000000000000000000000000000");
        let new = address!("00000000000000000000000000000000deadbeef");
        let log = new_log(
            vec![event.selector, previous.into_word(), new.into_word()],
            Vec::new(),
        );

        let occurrence = decode_log(event, &log).unwrap();
        assert_eq!(
            occurrence.arg("previousOwner"),
            Some(&DynSolValue::Address(previous))
        );
        assert_eq!(occurrence.arg("newOwner"), Some(&DynSolValue::Address(new)));
        assert_eq!(occurrence.string_arg("newOwner"), None);
    }

    #[test]
    fn test_decode_rejects_topic_mismatch() {
        let descriptor = ContractDescriptor::mapping_registry().unwrap();
        let event = descriptor.event("OwnershipTransferred").unwrap();

        let log = new_log(vec![event.selector], Vec::new());
        let err = decode_log(event, &log).unwrap_err();
        assert_matches!(err.current_context(), CollectError::Decode);
    }

    #[test]
    fn test_decode_rejects_malformed_data() {
        let descriptor = ContractDescriptor::mapping_registry().unwrap();
        let event = descriptor.event("MappingUpdated").unwrap();

        let log = new_log(vec![event.selector], vec![0xff; 7]);
        let err = decode_log(event, &log).unwrap_err();
        assert_matches!(err.current_context(), CollectError::Decode);
    }

    #[test]
    fn test_indexed_string_keeps_topic_hash() {
        let json = r#"[
            {
                "type": "event",
                "name": "Tagged",
                "inputs": [
                    { "name": "", "type": "string", "indexed": true },
                    { "name": "count", "type": "uint8", "indexed": false }
                ]
            }
        ]"#;
        let descriptor = ContractDescriptor::from_json(json).unwrap();
        let event = descriptor.event("Tagged").unwrap();

        let hash = B256::repeat_byte(0xab);
        let data = DynSolValue::Tuple(vec![DynSolValue::Uint(U256::from(3), 8)])
            .abi_encode_params();
        let log = new_log(vec![event.selector, hash], data);

        let occurrence = decode_log(event, &log).unwrap();
        assert_eq!(occurrence.arg("arg0"), Some(&DynSolValue::FixedBytes(hash, 32)));
        assert_matches!(occurrence.arg("count"), Some(DynSolValue::Uint(v, 8)) => {
            assert_eq!(v.to::<u8>(), 3);
        });
    }
}
