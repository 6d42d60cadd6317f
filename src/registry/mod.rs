//! Registry module for tax-registry API interactions
//!
//! This module provides authentication, token refresh, batching and retry
//! logic for querying registry services in bulk.

pub mod auth;
pub mod batch;
pub mod client;
pub mod retry;
pub mod token_manager;

pub use crate::config::AuthConfig;
pub use auth::Auth;
pub use batch::BatchPlan;
pub use client::{DEFAULT_SERVICES, RegistryClient, RegistryClientBuilder};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use token_manager::TokenManager;
