//! Payload and pool helpers the client relies on but does not own.
//!
//! The JSON bodies for interfaces and policies follow site conventions that
//! live outside this crate, as does the derivation of an interface address
//! from the IP pools. The client only sends what these produce.

use crate::models::AddressObject;
use fortigate_core::PoolInput;
use serde_json::Value;

/// Builds interface and policy bodies for the CMDB endpoints.
#[cfg_attr(test, mockall::automock)]
pub trait PolicyFormat: Send + Sync {
    /// Body for `cmdb/system/interface`.
    fn interface_payload(
        &self,
        service_id: &str,
        pools: &PoolInput,
        vlan_id: Option<u16>,
        comment: &str,
    ) -> Value;

    /// Body for the SG policy referencing `objects`.
    fn sg_policy_payload(
        &self,
        service_id: &str,
        objects: &[AddressObject],
        src_interface: &str,
        dst_interface: &str,
    ) -> Value;

    /// Body for the RNI policy.
    fn rni_policy_payload(&self, service_id: &str) -> Value;
}

/// Derives interface attributes from the IP pools.
#[cfg_attr(test, mockall::automock)]
pub trait PoolValidation: Send + Sync {
    /// Interface `ip` value (`address netmask`) for the pools, if one can be
    /// derived.
    fn pool_netmask(&self, pools: &PoolInput) -> Option<String>;
}
