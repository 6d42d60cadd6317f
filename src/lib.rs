//! NIT Checker Library
//!
//! Bulk lookups of taxpayer identifiers against a tax-registry API: a
//! registry client with token refresh, batching and retries, plus the record
//! cleaning, error classification and report writing around it.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod output;
pub mod profile;
pub mod record;
pub mod registry;
pub mod types;

pub use config::{AppConfig, AuthConfig};
pub use error::{CheckerError, QueryError, Result};
pub use logging::Logger;
pub use output::ReportWriter;
pub use record::{
    INSCRIPTION_ERROR_KEYS, accumulate_errors, clean_record, extract_errors, merge_records,
    without_keys,
};
pub use registry::{RegistryClient, RegistryClientBuilder};
pub use types::{ErrorEntry, ErrorMap, HealthStatus, Identifier, RecordMap};
