//! Collect historical contract events, one query per event type.
mod decode;

use std::collections::BTreeMap;

use error_stack::{Report, Result, ResultExt};
use tracing::{info, warn};

use crate::{
    abi::{ContractDescriptor, EventDefinition},
    provider::{models::Address, LogQuery, LogSource},
};

pub use self::decode::{decode_log, EventOccurrence};

#[derive(Debug)]
pub enum CollectError {
    /// The descriptor defines no events.
    NoEventsDefined,
    /// The node query for one event type failed.
    Query,
    /// A returned log does not match its event definition.
    Decode,
    /// The event cannot be selected by signature.
    Anonymous,
}

impl error_stack::Context for CollectError {}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::NoEventsDefined => write!(f, "no events found in the contract ABI"),
            CollectError::Query => write!(f, "failed to query event logs"),
            CollectError::Decode => write!(f, "failed to decode event log"),
            CollectError::Anonymous => write!(f, "anonymous events cannot be queried"),
        }
    }
}

/// Result of querying a single event type.
///
/// Failures are absorbed here so that one event type cannot block the others.
#[derive(Debug)]
pub enum EventQueryOutcome {
    Collected(Vec<EventOccurrence>),
    Failed(Report<CollectError>),
}

impl EventQueryOutcome {
    /// The collected occurrences. Empty if the query failed.
    pub fn occurrences(&self) -> &[EventOccurrence] {
        match self {
            EventQueryOutcome::Collected(occurrences) => occurrences,
            EventQueryOutcome::Failed(_) => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, EventQueryOutcome::Failed(_))
    }
}

/// Collected events, grouped by event name.
#[derive(Debug, Default)]
pub struct CollectedEvents {
    events: BTreeMap<String, EventQueryOutcome>,
}

impl CollectedEvents {
    pub fn get(&self, name: &str) -> Option<&EventQueryOutcome> {
        self.events.get(name)
    }

    /// Occurrences of the named event, or nothing if it is unknown or its query failed.
    pub fn occurrences(&self, name: &str) -> &[EventOccurrence] {
        self.get(name)
            .map(EventQueryOutcome::occurrences)
            .unwrap_or_default()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EventQueryOutcome)> {
        self.events
            .iter()
            .map(|(name, outcome)| (name.as_str(), outcome))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &Report<CollectError>)> {
        self.iter().filter_map(|(name, outcome)| match outcome {
            EventQueryOutcome::Failed(err) => Some((name, err)),
            EventQueryOutcome::Collected(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Queries a node for every event a contract defines.
pub struct EventCollector<S> {
    source: S,
    contract_address: Address,
    from_block: u64,
}

impl<S> EventCollector<S>
where
    S: LogSource,
{
    pub fn new(source: S, contract_address: Address) -> Self {
        Self {
            source,
            contract_address,
            from_block: 0,
        }
    }

    /// Only query logs from `from_block` onwards.
    pub fn with_from_block(mut self, from_block: u64) -> Self {
        self.from_block = from_block;
        self
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    /// Collect all logs for every named event in the descriptor.
    ///
    /// Event types are queried one after the other, from the first configured
    /// block up to the latest block.
    pub async fn collect(
        &self,
        descriptor: &ContractDescriptor,
    ) -> Result<CollectedEvents, CollectError> {
        if descriptor.event_entries().next().is_none() {
            return Err(CollectError::NoEventsDefined)
                .attach_printable_lazy(|| format!("contract: {}", self.contract_address));
        }

        let mut events = BTreeMap::new();

        for event in descriptor.events() {
            let outcome = match self.collect_event(event).await {
                Ok(occurrences) => {
                    info!(
                        event = %event.name,
                        count = occurrences.len(),
                        "found events"
                    );
                    EventQueryOutcome::Collected(occurrences)
                }
                Err(err) => {
                    warn!(event = %event.name, error = ?err, "failed to fetch events");
                    EventQueryOutcome::Failed(err)
                }
            };

            if events.insert(event.name.clone(), outcome).is_some() {
                warn!(event = %event.name, "event name defined more than once, keeping last");
            }
        }

        Ok(CollectedEvents { events })
    }

    async fn collect_event(
        &self,
        event: &EventDefinition,
    ) -> Result<Vec<EventOccurrence>, CollectError> {
        if event.anonymous {
            return Err(CollectError::Anonymous)
                .attach_printable_lazy(|| format!("event: {}", event.name));
        }

        let query = LogQuery::new(self.contract_address, event.selector, self.from_block);

        let logs = self
            .source
            .get_logs(&query)
            .await
            .change_context(CollectError::Query)
            .attach_printable_lazy(|| format!("event: {}", event.signature))?;

        logs.iter()
            .map(|log| decode_log(event, log))
            .collect::<Result<Vec<_>, CollectError>>()
            .attach_printable_lazy(|| format!("event: {}", event.signature))
    }
}
