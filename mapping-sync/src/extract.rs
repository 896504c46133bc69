//! Pick the most recent value of an event field.
use error_stack::{Result, ResultExt};

use crate::collector::EventOccurrence;

#[derive(Debug)]
pub struct ExtractError;

impl error_stack::Context for ExtractError {}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "latest event is missing a string field")
    }
}

/// Returns the string `field` of the last occurrence.
///
/// Occurrences are expected in the order the node returned them, oldest first.
/// Returns `Ok(None)` if there are no occurrences.
pub fn extract_latest<'a>(
    occurrences: &'a [EventOccurrence],
    field: &str,
) -> Result<Option<&'a str>, ExtractError> {
    let Some(latest) = occurrences.last() else {
        return Ok(None);
    };

    latest
        .string_arg(field)
        .map(Some)
        .ok_or(ExtractError)
        .attach_printable_lazy(|| format!("field: {field}"))
        .attach_printable_lazy(|| format!("block number: {:?}", latest.block_number))
}
