//! Partitioning of validated CIDRs into size-capped address groups.
//!
//! Partitioning is lossless and order preserving: concatenating the members of
//! all groups in sequence order gives back the input. Group names depend only
//! on the 1-based sequence number so that ACL rules referencing them survive a
//! change of id base or date.

use crate::config::Config;
use crate::error::IpGroupError;

/// Naming and sizing rules for address groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupLayout {
    name_prefix: String,
    base_id: u32,
    capacity: usize,
}

impl GroupLayout {
    pub fn new(
        name_prefix: impl Into<String>,
        base_id: u32,
        capacity: usize,
    ) -> Result<Self, IpGroupError> {
        if capacity == 0 {
            return Err(IpGroupError::Config(
                "group capacity must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            name_prefix: name_prefix.into(),
            base_id,
            capacity,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, IpGroupError> {
        Self::new(
            config.group_name_prefix.clone(),
            config.base_id,
            config.group_capacity,
        )
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Name of the group with the given 1-based sequence number.
    pub fn group_name(&self, sequence_number: usize) -> String {
        format!("{}-{}", self.name_prefix, sequence_number)
    }

    /// Id of the group with the given 1-based sequence number.
    pub fn group_id(&self, sequence_number: usize) -> u64 {
        u64::from(self.base_id) + sequence_number as u64 - 1
    }

    /// Names of the first `count` groups, in sequence order.
    pub fn group_names(&self, count: usize) -> Vec<String> {
        (1..=count).map(|n| self.group_name(n)).collect()
    }

    fn build_group(&self, sequence_number: usize, members: Vec<String>) -> AddressGroup {
        AddressGroup {
            sequence_number,
            id: self.group_id(sequence_number),
            name: self.group_name(sequence_number),
            members,
        }
    }
}

/// One chunk of the validated CIDR sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressGroup {
    pub sequence_number: usize,
    pub id: u64,
    pub name: String,
    pub members: Vec<String>,
}

/// Split `cidrs` into groups of exactly `layout.capacity()` members, with a
/// final smaller group for any remainder.
///
/// Empty input yields no groups.
pub fn partition(cidrs: &[String], layout: &GroupLayout) -> Vec<AddressGroup> {
    let mut groups = Vec::with_capacity(cidrs.len().div_ceil(layout.capacity));
    let mut pending: Vec<String> = Vec::with_capacity(layout.capacity);

    for cidr in cidrs {
        pending.push(cidr.clone());
        if pending.len() == layout.capacity {
            let members = std::mem::replace(&mut pending, Vec::with_capacity(layout.capacity));
            groups.push(layout.build_group(groups.len() + 1, members));
        }
    }

    if !pending.is_empty() {
        groups.push(layout.build_group(groups.len() + 1, pending));
    }

    groups
}
