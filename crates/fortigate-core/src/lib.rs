//! # fortigate-core
//!
//! Core types and utilities for automating Fortigate appliances.
//!
//! This crate provides the shared error type, appliance and provisioning
//! configuration, HTTP client settings and the status classifier used by the
//! provisioning client.
//!
//! ## Modules
//!
//! - [`error`] - Error types for request and configuration failures
//! - [`status`] - HTTP status classification and operator status lines
//! - [`types`] - Locations and IP pool entries
//! - [`config`] - Appliance and provisioning configuration
//! - [`client`] - HTTP client settings
//! - [`query`] - CMDB query-string builder

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod status;
pub mod types;

// Re-export commonly used types
pub use config::{ApplianceConfig, ProvisioningConfig, ProvisioningRequest};
pub use error::{Error, Result};
pub use status::{check_status, check_status_raw, ApiStatus};
pub use types::{Location, PoolEntry, PoolInput};
