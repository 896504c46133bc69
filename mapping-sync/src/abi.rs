//! Contract interface descriptor.
//!
//! The descriptor is parsed from a standard Solidity JSON ABI. Event entries
//! are resolved once, when the descriptor is built, into [EventDefinition]s
//! that carry their parsed parameter types and topic 0 selector.
use std::{fs, path::Path};

use alloy_dyn_abi::DynSolType;
use alloy_primitives::{keccak256, B256};
use error_stack::{Result, ResultExt};
use serde::Deserialize;

/// ABI of the mapping registry contract.
pub const MAPPING_REGISTRY_ABI: &str = include_str!("../abi/MappingRegistry.json");

#[derive(Debug)]
pub enum AbiError {
    /// The ABI is not valid JSON or has an unexpected shape.
    Parse,
    /// A parameter type could not be resolved.
    InvalidType,
    /// The ABI file could not be read.
    Io,
}

impl error_stack::Context for AbiError {}

impl std::fmt::Display for AbiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbiError::Parse => write!(f, "failed to parse contract ABI"),
            AbiError::InvalidType => write!(f, "invalid ABI parameter type"),
            AbiError::Io => write!(f, "failed to read contract ABI"),
        }
    }
}

/// One entry of a JSON ABI, tagged by its `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AbiEntry {
    Constructor(ConstructorEntry),
    Error(ErrorEntry),
    Function(FunctionEntry),
    Event(EventEntry),
    Fallback(FallbackEntry),
    Receive(FallbackEntry),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    Nonpayable,
    Payable,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructorEntry {
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    pub state_mutability: Option<StateMutability>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEntry {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEntry {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
    pub state_mutability: Option<StateMutability>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEntry {
    /// Event name. Entries without a name are never queried.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<EventParam>,
    #[serde(default)]
    pub anonymous: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackEntry {
    pub state_mutability: Option<StateMutability>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub internal_type: Option<String>,
    #[serde(default)]
    pub components: Vec<AbiParam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventParam {
    #[serde(flatten)]
    pub param: AbiParam,
    #[serde(default)]
    pub indexed: bool,
}

/// An event parameter with its type parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedParam {
    pub name: String,
    pub ty: DynSolType,
    pub indexed: bool,
}

/// An event entry resolved for log queries and decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDefinition {
    pub name: String,
    pub anonymous: bool,
    pub params: Vec<ResolvedParam>,
    /// Canonical signature, e.g. `Transfer(address,address,uint256)`.
    pub signature: String,
    /// Keccak-256 hash of the signature, emitted as topic 0.
    pub selector: B256,
}

/// The static description of a contract's interface.
#[derive(Debug, Clone)]
pub struct ContractDescriptor {
    entries: Vec<AbiEntry>,
    events: Vec<EventDefinition>,
}

impl AbiParam {
    /// Returns the parameter type with tuple components expanded.
    fn expanded_type(&self) -> String {
        match self.ty.strip_prefix("tuple") {
            Some(suffix) => {
                let components = self
                    .components
                    .iter()
                    .map(AbiParam::expanded_type)
                    .collect::<Vec<_>>()
                    .join(",");
                format!("({components}){suffix}")
            }
            None => self.ty.clone(),
        }
    }

    pub fn resolve(&self) -> Result<DynSolType, AbiError> {
        let ty = self.expanded_type();
        ty.parse::<DynSolType>()
            .change_context(AbiError::InvalidType)
            .attach_printable_lazy(|| format!("type: {ty}"))
            .attach_printable_lazy(|| format!("parameter: {}", self.name))
    }
}

impl EventEntry {
    pub fn resolve(&self) -> Result<EventDefinition, AbiError> {
        let params = self
            .inputs
            .iter()
            .map(|input| -> Result<ResolvedParam, AbiError> {
                let ty = input.param.resolve()?;
                Ok(ResolvedParam {
                    name: input.param.name.clone(),
                    ty,
                    indexed: input.indexed,
                })
            })
            .collect::<Result<Vec<_>, AbiError>>()
            .attach_printable_lazy(|| format!("event: {}", self.name))?;

        let types = params
            .iter()
            .map(|param| param.ty.sol_type_name().into_owned())
            .collect::<Vec<_>>()
            .join(",");
        let signature = format!("{}({types})", self.name);
        let selector = keccak256(signature.as_bytes());

        Ok(EventDefinition {
            name: self.name.clone(),
            anonymous: self.anonymous,
            params,
            signature,
            selector,
        })
    }
}

impl ContractDescriptor {
    /// Builds a descriptor, resolving every named event entry.
    pub fn new(entries: Vec<AbiEntry>) -> Result<Self, AbiError> {
        let events = entries
            .iter()
            .filter_map(|entry| match entry {
                AbiEntry::Event(event) if !event.name.is_empty() => Some(event.resolve()),
                _ => None,
            })
            .collect::<Result<Vec<_>, AbiError>>()?;

        Ok(Self { entries, events })
    }

    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        let entries = serde_json::from_str::<Vec<AbiEntry>>(json)
            .change_context(AbiError::Parse)
            .attach_printable("expected a JSON array of ABI entries")?;
        Self::new(entries)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AbiError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .change_context(AbiError::Io)
            .attach_printable_lazy(|| format!("path: {}", path.display()))?;
        Self::from_json(&json).attach_printable_lazy(|| format!("path: {}", path.display()))
    }

    /// The descriptor of the mapping registry contract.
    pub fn mapping_registry() -> Result<Self, AbiError> {
        Self::from_json(MAPPING_REGISTRY_ABI)
    }

    pub fn entries(&self) -> &[AbiEntry] {
        &self.entries
    }

    /// Every event entry, including unnamed ones.
    pub fn event_entries(&self) -> impl Iterator<Item = &EventEntry> {
        self.entries.iter().filter_map(|entry| match entry {
            AbiEntry::Event(event) => Some(event),
            _ => None,
        })
    }

    /// Resolved definitions of the named events, in ABI order.
    pub fn events(&self) -> &[EventDefinition] {
        &self.events
    }

    pub fn event(&self, name: &str) -> Option<&EventDefinition> {
        self.events.iter().find(|event| event.name == name)
    }
}
