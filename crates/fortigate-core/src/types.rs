//! Core Fortigate provisioning types.
//!
//! This module provides the site locations an appliance can belong to and the
//! IP pool entries that drive address-object and interface provisioning.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Prefix shared by every SG policy this tool creates.
pub const SG_POLICY_PREFIX: &str = "sg-demo-";

/// Default virtual domain for CMDB requests.
pub const DEFAULT_VDOM: &str = "root";

/// Sites with a managed Fortigate appliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Colombia
    Colombia,
    /// Ecuador
    Ecuador,
    /// Guatemala
    Guatemala,
    /// Panama
    #[serde(alias = "panamá")]
    Panama,
}

impl Location {
    /// Returns the location tag as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Colombia => "colombia",
            Self::Ecuador => "ecuador",
            Self::Guatemala => "guatemala",
            Self::Panama => "panama",
        }
    }

    /// Returns all known locations.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Colombia, Self::Ecuador, Self::Guatemala, Self::Panama]
    }
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "colombia" => Ok(Self::Colombia),
            "ecuador" => Ok(Self::Ecuador),
            "guatemala" => Ok(Self::Guatemala),
            "panama" | "panamá" => Ok(Self::Panama),
            _ => Err(Error::ConfigError(format!("Unknown location: {s}"))),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A named IP pool: the service name and the subnet it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PoolEntryRepr")]
pub struct PoolEntry {
    /// Pool (service) name
    pub name: String,
    /// Subnet in CIDR notation, e.g. `10.0.0.0/24`
    pub subnet: String,
}

impl PoolEntry {
    /// Create a pool entry.
    #[must_use]
    pub fn new(name: impl Into<String>, subnet: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subnet: subnet.into(),
        }
    }
}

impl<N: Into<String>, S: Into<String>> From<(N, S)> for PoolEntry {
    fn from((name, subnet): (N, S)) -> Self {
        Self::new(name, subnet)
    }
}

/// Accepts both `["name", "subnet"]` and `{"name": ..., "subnet": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PoolEntryRepr {
    Pair(String, String),
    Named { name: String, subnet: String },
}

impl From<PoolEntryRepr> for PoolEntry {
    fn from(repr: PoolEntryRepr) -> Self {
        match repr {
            PoolEntryRepr::Pair(name, subnet) | PoolEntryRepr::Named { name, subnet } => {
                Self { name, subnet }
            }
        }
    }
}

/// IP pools supplied for a provisioning run.
///
/// Operators hand in either a single pair or a list of pairs; both shapes
/// are exposed uniformly through [`PoolInput::entries`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PoolInput {
    /// One `(name, subnet)` pair
    Single(PoolEntry),
    /// Several `(name, subnet)` pairs
    Many(Vec<PoolEntry>),
}

impl PoolInput {
    /// All entries, in the order they were supplied.
    #[must_use]
    pub fn entries(&self) -> &[PoolEntry] {
        match self {
            Self::Single(entry) => std::slice::from_ref(entry),
            Self::Many(entries) => entries,
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns true if no entries were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, PoolEntry> {
        self.entries().iter()
    }
}

impl From<PoolEntry> for PoolInput {
    fn from(entry: PoolEntry) -> Self {
        Self::Single(entry)
    }
}

impl From<Vec<PoolEntry>> for PoolInput {
    fn from(entries: Vec<PoolEntry>) -> Self {
        Self::Many(entries)
    }
}

impl<'a> IntoIterator for &'a PoolInput {
    type Item = &'a PoolEntry;
    type IntoIter = std::slice::Iter<'a, PoolEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
