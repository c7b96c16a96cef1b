//! Static type catalogs
//!
//! Unit, tech and upgrade descriptors are externally supplied lookup tables
//! keyed by integer id. They are loaded once (typically from a JSON document)
//! and read-only afterwards. An id with no entry resolves to a shared
//! "Unknown" sentinel rather than an error.

use crate::error::Result;
use crate::player::Race;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Type id the engine reports for mineral patches.
pub const MINERAL_FIELD_TYPE_ID: u16 = 176;

/// Type id the engine reports for vespene geysers.
pub const VESPENE_GEYSER_TYPE_ID: u16 = 188;

/// Descriptor for a unit type: name, tile footprint and category flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitTypeInfo {
    pub id: u16,
    pub name: String,
    /// Footprint width in tiles
    #[serde(default = "one")]
    pub tile_width: u8,
    /// Footprint height in tiles
    #[serde(default = "one")]
    pub tile_height: u8,
    /// Gathers resources (SCV, probe, drone)
    #[serde(default)]
    pub worker: bool,
    /// Resource drop-off center (command center, nexus, hatchery)
    #[serde(default)]
    pub center: bool,
    /// Provides supply (depot, pylon, overlord)
    #[serde(default)]
    pub supply: bool,
}

fn one() -> u8 {
    1
}

impl UnitTypeInfo {
    fn unknown() -> Self {
        Self {
            id: u16::MAX,
            name: "Unknown".into(),
            tile_width: 1,
            tile_height: 1,
            worker: false,
            center: false,
            supply: false,
        }
    }
}

/// Descriptor for a researchable tech type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechTypeInfo {
    pub id: u16,
    pub name: String,
}

/// Descriptor for an upgrade type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeTypeInfo {
    pub id: u16,
    pub name: String,
}

/// The three catalogs a session needs, bundled for loading and lookup.
#[derive(Debug, Serialize, Deserialize)]
pub struct Catalogs {
    #[serde(default, with = "table")]
    unit_types: HashMap<u16, UnitTypeInfo>,
    #[serde(default, with = "table")]
    tech_types: HashMap<u16, TechTypeInfo>,
    #[serde(default, with = "table")]
    upgrade_types: HashMap<u16, UpgradeTypeInfo>,
    #[serde(skip, default = "UnitTypeInfo::unknown")]
    unknown_unit: UnitTypeInfo,
}

/// Catalog tables are written as flat arrays of descriptors on disk and
/// indexed by id in memory.
mod table {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::HashMap;

    pub trait Keyed {
        fn key(&self) -> u16;
    }

    impl Keyed for super::UnitTypeInfo {
        fn key(&self) -> u16 {
            self.id
        }
    }

    impl Keyed for super::TechTypeInfo {
        fn key(&self) -> u16 {
            self.id
        }
    }

    impl Keyed for super::UpgradeTypeInfo {
        fn key(&self) -> u16 {
            self.id
        }
    }

    pub fn serialize<S, T>(map: &HashMap<u16, T>, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize + Keyed,
    {
        let mut entries: Vec<&T> = map.values().collect();
        entries.sort_by_key(|e| e.key());
        entries.serialize(ser)
    }

    pub fn deserialize<'de, D, T>(de: D) -> Result<HashMap<u16, T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Keyed,
    {
        let entries = Vec::<T>::deserialize(de)?;
        Ok(entries.into_iter().map(|e| (e.key(), e)).collect())
    }
}

impl Default for Catalogs {
    fn default() -> Self {
        Self {
            unit_types: HashMap::new(),
            tech_types: HashMap::new(),
            upgrade_types: HashMap::new(),
            unknown_unit: UnitTypeInfo::unknown(),
        }
    }
}

impl Catalogs {
    /// Empty catalogs. Every lookup resolves to the unknown sentinel.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load catalogs from a JSON document of the form
    /// `{"unit_types": [...], "tech_types": [...], "upgrade_types": [...]}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load catalogs from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Look up a unit type descriptor. Unknown ids resolve to the sentinel.
    pub fn unit_type(&self, id: u16) -> &UnitTypeInfo {
        self.unit_types.get(&id).unwrap_or(&self.unknown_unit)
    }

    /// Whether the catalog has a real entry for the given unit type id.
    pub fn knows_unit_type(&self, id: u16) -> bool {
        self.unit_types.contains_key(&id)
    }

    pub fn tech_type(&self, id: u16) -> Option<&TechTypeInfo> {
        self.tech_types.get(&id)
    }

    pub fn upgrade_type(&self, id: u16) -> Option<&UpgradeTypeInfo> {
        self.upgrade_types.get(&id)
    }

    pub fn unit_type_count(&self) -> usize {
        self.unit_types.len()
    }
}

/// Worker unit type id for the given race.
pub fn worker_type(race: Race) -> u16 {
    match race {
        Race::Zerg => 41,     // Drone
        Race::Terran => 7,    // SCV
        _ => 64,              // Probe
    }
}

/// Resource center unit type id for the given race.
pub fn center_type(race: Race) -> u16 {
    match race {
        Race::Zerg => 131,    // Hatchery
        Race::Terran => 106,  // Command Center
        _ => 154,             // Nexus
    }
}

/// Supply provider unit type id for the given race.
pub fn supply_type(race: Race) -> u16 {
    match race {
        Race::Zerg => 42,     // Overlord
        Race::Terran => 109,  // Supply Depot
        _ => 156,             // Pylon
    }
}
