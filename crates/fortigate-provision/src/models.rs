//! Wire models and provisioning outcomes.

use chrono::{DateTime, Utc};
use fortigate_core::types::SG_POLICY_PREFIX;
use fortigate_core::{ApiStatus, Error, Location, PoolInput, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Firewall address object, as posted to `cmdb/firewall/address`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressObject {
    /// Object name, `{pool-name}-{subnet}`.
    pub name: String,
    /// Subnet in CIDR notation.
    pub subnet: String,
}

/// Envelope shared by every CMDB answer.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CmdbResponse<T> {
    /// HTTP method echoed by the appliance.
    #[serde(default)]
    pub http_method: Option<String>,
    /// Matching entries.
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    /// Virtual domain.
    #[serde(default)]
    pub vdom: Option<String>,
    /// `success` or `error`.
    #[serde(default)]
    pub status: Option<String>,
    /// HTTP status echoed in the body.
    #[serde(default)]
    pub http_status: Option<u16>,
    /// Appliance serial number.
    #[serde(default)]
    pub serial: Option<String>,
    /// Firmware version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Policy row as returned with `format=policyid|name|action`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyEntry {
    /// Policy id.
    pub policyid: u64,
    /// Policy name; unnamed policies come back empty.
    #[serde(default)]
    pub name: String,
    /// `accept` or `deny`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// First policy, in appliance order, whose name carries the SG prefix.
#[must_use]
pub fn first_sg_policy(policies: &[PolicyEntry]) -> Option<&PolicyEntry> {
    policies
        .iter()
        .find(|policy| policy.name.starts_with(SG_POLICY_PREFIX))
}

/// Interface attributes probed when an interface cannot be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceField {
    /// Interface name (at most 15 characters on the appliance)
    Name,
    /// VLAN id
    #[serde(rename = "vlanid")]
    VlanId,
    /// Address and netmask
    Ip,
    /// Alias
    Alias,
}

impl InterfaceField {
    /// Lookup order.
    pub const ALL: [Self; 4] = [Self::Name, Self::VlanId, Self::Ip, Self::Alias];

    /// CMDB attribute name.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::VlanId => "vlanid",
            Self::Ip => "ip",
            Self::Alias => "alias",
        }
    }
}

impl std::fmt::Display for InterfaceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// What the appliance already has that clashes with the requested interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterfaceReport {
    /// Attributes that matched exactly one existing interface, with the
    /// value the appliance holds.
    pub existing: BTreeMap<InterfaceField, String>,
    /// Attributes we had no value for; keyed to the pools of the request so
    /// an operator can fix the input.
    pub wrong: BTreeMap<InterfaceField, PoolInput>,
}

impl InterfaceReport {
    /// True when nothing was found and nothing was missing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.existing.is_empty() && self.wrong.is_empty()
    }
}

/// Existing policy with the requested name, if exactly one was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PolicyReport {
    /// Name of the existing policy.
    pub name: Option<String>,
}

/// Result of a create call that falls back to a lookup on failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Provisioned<R> {
    /// The appliance applied the change.
    Created,
    /// The appliance answered with something other than 200.
    Rejected {
        /// Classified status.
        status: ApiStatus,
        /// What the follow-up lookup found.
        existing: R,
    },
    /// The request never got an answer.
    Unreachable(Error),
}

impl<R> Provisioned<R> {
    /// True when the change was applied.
    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created)
    }
}

/// Address objects sent for the request's pools.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkObjects {
    /// Objects in pool order, returned whatever the appliance answered.
    pub objects: Vec<AddressObject>,
    /// Classified answer, or the failure that prevented one.
    pub outcome: Result<ApiStatus>,
}

impl NetworkObjects {
    /// Object names in pool order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.objects.iter().map(|object| object.name.as_str()).collect()
    }
}

/// Where the SG policy ended up.
#[derive(Debug, Clone, PartialEq)]
pub enum SgPlacement {
    /// Moved after the first existing SG policy.
    Moved {
        /// Id of the new policy.
        policy_id: u64,
        /// Id of the reference policy.
        after: u64,
        /// Classified answer to the move.
        status: ApiStatus,
    },
    /// Created but not moved: an id could not be resolved, or the new
    /// policy is itself the first SG policy.
    Unplaced {
        /// Id of the new policy, if found.
        policy_id: Option<u64>,
        /// Id of the reference policy, if found.
        reference: Option<u64>,
    },
    /// The appliance refused the policy.
    Rejected(ApiStatus),
    /// The policy create request never got an answer.
    Unreachable(Error),
    /// The policy was created but the move request never got an answer.
    MoveUnreachable {
        /// Id of the new policy.
        policy_id: u64,
        /// Id of the reference policy.
        after: u64,
        /// Transport failure.
        error: Error,
    },
}

/// Result of SG policy provisioning.
#[derive(Debug, Clone, PartialEq)]
pub struct SgPolicyOutcome {
    /// Address objects created beforehand.
    pub objects: NetworkObjects,
    /// Policy result.
    pub placement: SgPlacement,
}

/// Global configuration backup pulled from an appliance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBackup {
    /// Site of the appliance.
    pub location: Location,
    /// Appliance host.
    pub host: String,
    /// When the backup was received.
    pub fetched_at: DateTime<Utc>,
    /// Raw configuration text.
    pub body: String,
}

impl ConfigBackup {
    /// Suggested file name: `{location}-{host}-{YYYYMMDD-HHMMSS}.conf`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}-{}.conf",
            self.location,
            self.host.replace(':', "_"),
            self.fetched_at.format("%Y%m%d-%H%M%S")
        )
    }
}
