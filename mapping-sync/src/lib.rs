pub mod abi;
pub mod cli;
pub mod collector;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod provider;
pub mod sync;

pub use self::sync::{MappingSync, SyncConfig, SyncOutcome};
