//! Load zone identifiers.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DemandError, Result};

/// Identifier of one geographic load zone.
///
/// Zone geometries live with the external geospatial collaborator; the engine
/// only accounts demand against these names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneId(String);

impl ZoneId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ZoneId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// The set of zones covered by a run. Zone identifiers must be unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSet {
    zones: Vec<ZoneId>,
}

impl ZoneSet {
    pub fn new(mut zones: Vec<ZoneId>) -> Result<Self> {
        zones.sort();
        let mut seen: HashSet<&ZoneId> = HashSet::with_capacity(zones.len());
        for zone in &zones {
            if !seen.insert(zone) {
                return Err(DemandError::DuplicateZone { zone: zone.clone() });
            }
        }
        Ok(Self { zones })
    }

    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        Self::new(names.into_iter().map(ZoneId::from).collect())
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn contains(&self, zone: &ZoneId) -> bool {
        self.zones.binary_search(zone).is_ok()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ZoneId> {
        self.zones.iter()
    }

    /// Zones in sorted order, for deterministic iteration.
    pub fn as_slice(&self) -> &[ZoneId] {
        &self.zones
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_set_sorted_and_unique() {
        let zones = ZoneSet::from_names(["CA_PGE_BAY", "AZ_APS", "NV_S"]).unwrap();
        assert_eq!(zones.len(), 3);
        assert_eq!(zones.as_slice()[0].as_str(), "AZ_APS", "zones are sorted");
        assert!(zones.contains(&ZoneId::from("NV_S")));
        assert!(!zones.contains(&ZoneId::from("MEX_BAJA")));
    }

    #[test]
    fn test_duplicate_zone_rejected() {
        let err = ZoneSet::from_names(["AZ_APS", "AZ_APS"]).unwrap_err();
        assert!(matches!(err, DemandError::DuplicateZone { .. }));
    }
}
