//! Provisioning client for Fortigate appliances.
//!
//! Creates address objects, service interfaces, and SG/RNI firewall policies
//! through the FortiOS REST API, and pulls configuration backups.

#![deny(missing_docs)]

pub mod client;
pub mod format;
pub mod models;
pub mod objects;

pub use client::{FortigateClient, FortigateClientBuilder};
pub use format::{PolicyFormat, PoolValidation};
pub use models::{
    AddressObject, CmdbResponse, ConfigBackup, InterfaceField, InterfaceReport, NetworkObjects,
    PolicyEntry, PolicyReport, Provisioned, SgPlacement, SgPolicyOutcome,
};
pub use objects::{address_object, network_objects, NetworkObjectPayload};

/// Convenient result alias that reuses the shared Fortigate error type.
pub type Result<T> = fortigate_core::Result<T>;
