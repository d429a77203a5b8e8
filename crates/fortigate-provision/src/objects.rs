//! IP pool to address-object formatting.

use crate::models::AddressObject;
use fortigate_core::{PoolEntry, PoolInput, Result};

/// Address objects ready to post, plus the same records for later reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkObjectPayload {
    /// JSON array body for `cmdb/firewall/address`.
    pub json: String,
    /// The objects in pool order.
    pub objects: Vec<AddressObject>,
}

/// Address object for a single pool entry.
#[must_use]
pub fn address_object(entry: &PoolEntry) -> AddressObject {
    AddressObject {
        name: format!("{}-{}", entry.name, entry.subnet),
        subnet: entry.subnet.clone(),
    }
}

/// Build one address object per pool entry.
///
/// A single pair and a one-element list produce identical output.
///
/// # Errors
///
/// Returns an error if the objects cannot be serialized.
pub fn network_objects(pools: &PoolInput) -> Result<NetworkObjectPayload> {
    let objects: Vec<AddressObject> = pools.iter().map(address_object).collect();
    let json = serde_json::to_string(&objects)?;
    Ok(NetworkObjectPayload { json, objects })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_pool_example() {
        let pools = PoolInput::from(PoolEntry::new("Service", "10.0.0.0/24"));
        let payload = network_objects(&pools).unwrap();

        assert_eq!(
            payload.json,
            r#"[{"name":"Service-10.0.0.0/24","subnet":"10.0.0.0/24"}]"#
        );
        let names: Vec<_> = payload.objects.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Service-10.0.0.0/24"]);
    }

    #[test]
    fn single_pair_and_list_normalize_identically() {
        let entry = PoolEntry::new("Service", "10.0.0.0/24");
        let single = network_objects(&PoolInput::Single(entry.clone())).unwrap();
        let list = network_objects(&PoolInput::Many(vec![entry])).unwrap();
        assert_eq!(single, list);
    }

    #[test]
    fn one_independent_record_per_pair() {
        let pools = PoolInput::from(vec![
            PoolEntry::new("Service", "10.0.0.0/24"),
            PoolEntry::new("Service", "10.0.1.0/24"),
            PoolEntry::new("Backup", "172.16.0.0/30"),
        ]);
        let mut payload = network_objects(&pools).unwrap();

        assert_eq!(payload.objects.len(), 3);
        assert_eq!(payload.objects[0].name, "Service-10.0.0.0/24");
        assert_eq!(payload.objects[1].name, "Service-10.0.1.0/24");
        assert_eq!(payload.objects[2].name, "Backup-172.16.0.0/30");
        assert_eq!(payload.objects[2].subnet, "172.16.0.0/30");

        payload.objects[0].name.push_str("-edited");
        payload.objects[0].subnet.clear();
        assert_eq!(payload.objects[1].name, "Service-10.0.1.0/24");
        assert_eq!(payload.objects[1].subnet, "10.0.1.0/24");
    }

    #[test]
    fn json_body_lists_every_object() {
        let pools = PoolInput::from(vec![
            PoolEntry::new("A", "10.0.0.0/24"),
            PoolEntry::new("B", "10.0.1.0/24"),
        ]);
        let payload = network_objects(&pools).unwrap();
        let parsed: Vec<AddressObject> = serde_json::from_str(&payload.json).unwrap();
        assert_eq!(parsed, payload.objects);
    }

    #[test]
    fn empty_pools_give_empty_array() {
        let payload = network_objects(&PoolInput::from(Vec::new())).unwrap();
        assert_eq!(payload.json, "[]");
        assert!(payload.objects.is_empty());
    }
}
